//! HTML rendering for the transactions page.

use maud::{Markup, html};
use time::Date;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
};

use super::{
    core::Transaction,
    filter::{Filter, FilteredViews, format_date},
    saved_filters::{SavedFilter, saved_filters_view},
};

/// The max number of graphemes to display in the transaction table rows before
/// truncating and displaying ellipses.
const MAX_MEMO_GRAPHEMES: usize = 32;

/// The ID of the filter form, other forms include its fields with `hx-include`.
pub(crate) const FILTER_FORM_ID: &str = "filter-form";

/// Everything the transactions page shows.
pub(crate) struct TransactionsPage<'a> {
    pub filter: &'a Filter,
    pub views: &'a FilteredViews<'a>,
    /// The number of transactions in the store.
    pub total_count: usize,
    pub saved_filters: &'a [SavedFilter],
    /// The latest date that can be picked in the date inputs, today or the
    /// newest transaction's date when that is later.
    pub latest_date: Date,
}

fn amount_class(amount: f64) -> &'static str {
    if amount < 0.0 {
        "text-red-700 dark:text-red-300"
    } else {
        "text-green-700 dark:text-green-300"
    }
}

/// Renders the full transactions page.
pub(crate) fn transactions_view(page: &TransactionsPage) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW, !page.views.active.is_empty()).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full lg:max-w-5xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::IMPORT_VIEW) class=(LINK_STYLE)
                    {
                        "Import Transactions"
                    }
                }

                (filter_form_view(page.filter, page.latest_date))

                section class="space-y-2"
                {
                    h2 class="text-sm font-semibold" { "Saved filters" }

                    (saved_filters_view(page.saved_filters))
                    (save_filter_form_view())
                }

                (transactions_content_view(page.filter, page.views, page.total_count))
            }
        }
    };

    base("Transactions", &[], &content)
}

fn filter_form_view(filter: &Filter, latest_date: Date) -> Markup {
    let min_date = bounded_date(filter.min_date(), Date::MIN);
    let max_date = bounded_date(filter.max_date(), Date::MAX);
    let latest_date = format_date(latest_date);

    html! {
        form
            id=(FILTER_FORM_ID)
            hx-get=(endpoints::TRANSACTIONS_VIEW)
            hx-target="#transactions-content"
            hx-swap="outerHTML"
            hx-push-url="true"
            hx-trigger="input changed delay:300ms from:#filter, change"
            hx-target-error="#alert-container"
            class="grid grid-cols-1 gap-4 sm:grid-cols-3"
        {
            div
            {
                label for="filter" class=(FORM_LABEL_STYLE) { "Search memo or category" }

                input
                    id="filter"
                    type="search"
                    name="filter"
                    value=(filter.text())
                    placeholder="e.g. coffee"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="min_date" class=(FORM_LABEL_STYLE) { "From" }

                input
                    id="min_date"
                    type="date"
                    name="min_date"
                    value=[min_date]
                    max=(latest_date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="max_date" class=(FORM_LABEL_STYLE) { "To" }

                input
                    id="max_date"
                    type="date"
                    name="max_date"
                    value=[max_date]
                    max=(latest_date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }
    }
}

fn save_filter_form_view() -> Markup {
    html! {
        form
            hx-post=(endpoints::SAVED_FILTERS)
            hx-include={ "#" (FILTER_FORM_ID) }
            hx-target="#saved-filters"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="flex gap-2 items-end"
        {
            div class="grow"
            {
                label for="name" class="sr-only" { "Filter name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Name this filter"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Save filter" }
        }
    }
}

/// Renders the part of the page that changes with the filter: counts, bulk
/// actions and the table.
pub(crate) fn transactions_content_view(
    filter: &Filter,
    views: &FilteredViews,
    total_count: usize,
) -> Markup {
    let query = filter.to_query_string();
    let visualization_url = if query.is_empty() {
        endpoints::VISUALIZATION_VIEW.to_owned()
    } else {
        format!("{}?{query}", endpoints::VISUALIZATION_VIEW)
    };
    let empty_message = if total_count == 0 {
        "No transactions loaded yet. Import a CSV file to get started."
    } else {
        "No transactions match the filter."
    };

    html! {
        section id="transactions-content" class="space-y-4"
        {
            (transaction_counts_view(views, total_count, false))

            div class="flex flex-wrap gap-2 items-center"
            {
                button
                    type="button"
                    hx-post=(endpoints::IGNORE_FILTERED)
                    hx-include={ "#" (FILTER_FORM_ID) }
                    hx-target="#transactions-content"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    disabled[views.current.is_empty()]
                    class=(BUTTON_PRIMARY_STYLE)
                {
                    "Ignore filtered"
                }

                button
                    type="button"
                    hx-post=(endpoints::UNIGNORE_FILTERED)
                    hx-include={ "#" (FILTER_FORM_ID) }
                    hx-target="#transactions-content"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    disabled[views.current.is_empty()]
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Unignore filtered"
                }

                @if !views.current_active.is_empty() {
                    a href=(visualization_url) class=(LINK_STYLE) { "Visualize these transactions" }
                }
            }

            div class="overflow-x-auto rounded"
            {
                table class="w-full my-2 text-sm text-left rtl:text-right
                    text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Memo" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class="px-6 py-3 text-right" { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                        }
                    }

                    tbody
                    {
                        @for transaction in &views.current {
                            (transaction_row_view(transaction))
                        }

                        @if views.current.is_empty() {
                            tr
                            {
                                td
                                    colspan="5"
                                    data-empty-state="true"
                                    class="px-6 py-4 text-center"
                                {
                                    (empty_message)
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// The transaction counts and totals of the active transactions.
///
/// Set `swap_oob` when a single row changes so HTMX refreshes the counts too.
pub(crate) fn transaction_counts_view(
    views: &FilteredViews,
    total_count: usize,
    swap_oob: bool,
) -> Markup {
    let ignored_count = views.current.len() - views.current_active.len();
    let (income, expenses) = views
        .current_active
        .iter()
        .fold((0.0, 0.0), |(income, expenses), transaction| {
            if transaction.is_income() {
                (income + transaction.amount, expenses)
            } else {
                (income, expenses + transaction.amount)
            }
        });

    html! {
        div
            id="transaction-counts"
            hx-swap-oob=[swap_oob.then_some("true")]
            class="flex flex-wrap gap-x-6 gap-y-1 text-sm"
        {
            p
            {
                "Showing " (views.current.len()) " of " (total_count) " transactions"
                @if ignored_count > 0 {
                    " (" (ignored_count) " ignored)"
                }
            }

            p
            {
                "Income "
                span class=(amount_class(income)) { (format_currency(income)) }
            }

            p
            {
                "Expenses "
                span class=(amount_class(expenses)) { (format_currency(expenses)) }
            }

            p
            {
                "Net "
                span class=(amount_class(income + expenses)) { (format_currency(income + expenses)) }
            }
        }
    }
}

/// Renders a table row with a button that toggles whether the transaction is ignored.
pub(crate) fn transaction_row_view(transaction: &Transaction) -> Markup {
    let amount_str = format_currency(transaction.amount);
    let (memo, tooltip) = format_memo(&transaction.memo);
    let (toggle_route, toggle_label) = if transaction.ignored {
        (
            format_endpoint(endpoints::UNIGNORE_TRANSACTION, transaction.id),
            "Unignore",
        )
    } else {
        (
            format_endpoint(endpoints::IGNORE_TRANSACTION, transaction.id),
            "Ignore",
        )
    };
    let row_class = if transaction.ignored {
        "bg-white border-b dark:bg-gray-800 dark:border-gray-700 opacity-50 line-through"
    } else {
        TABLE_ROW_STYLE
    };

    html! {
        tr
            id={ "transaction-" (transaction.id) }
            class=(row_class)
            data-ignored=(transaction.ignored)
        {
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(format_date(transaction.date)) { (format_date(transaction.date)) }
            }
            td class=(TABLE_CELL_STYLE) title=[tooltip] { (memo) }
            td class=(TABLE_CELL_STYLE)
            {
                @if transaction.category.is_empty() {
                    span class="text-gray-400 dark:text-gray-500" { "-" }
                } @else {
                    span class=(CATEGORY_BADGE_STYLE) { (transaction.category) }
                }
            }
            td class={ "px-6 py-4 text-right " (amount_class(transaction.amount)) } { (amount_str) }
            td class=(TABLE_CELL_STYLE)
            {
                button
                    type="button"
                    hx-post=(toggle_route)
                    hx-include={ "#" (FILTER_FORM_ID) }
                    hx-target="closest tr"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    class=(LINK_STYLE)
                {
                    (toggle_label)
                }
            }
        }
    }
}

fn bounded_date(date: Date, unbounded: Date) -> Option<String> {
    (date != unbounded).then(|| format_date(date))
}

fn format_memo(memo: &str) -> (String, Option<&str>) {
    let memo_length = memo.graphemes(true).count();

    if memo_length <= MAX_MEMO_GRAPHEMES {
        (memo.to_owned(), None)
    } else {
        let truncated: String = memo.graphemes(true).take(MAX_MEMO_GRAPHEMES - 3).collect();
        let truncated = truncated + "...";
        (truncated, Some(memo))
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        test_utils::{assert_valid_html, coffee_and_salary_store},
        transaction::{Filter, FilteredViews},
    };

    use super::{TransactionsPage, format_memo, transaction_row_view, transactions_view};

    #[test]
    fn long_memo_is_truncated_with_tooltip() {
        let memo = "A very long memo describing a purchase at a shop";

        let (truncated, tooltip) = format_memo(memo);

        assert_eq!(truncated.chars().count(), 32);
        assert!(truncated.ends_with("..."));
        assert_eq!(tooltip, Some(memo));
    }

    #[test]
    fn short_memo_is_unchanged() {
        assert_eq!(format_memo("coffee"), ("coffee".to_owned(), None));
    }

    #[test]
    fn ignored_row_offers_unignore() {
        let mut store = coffee_and_salary_store();
        store.set_ignored(1, true).unwrap();

        let markup = transaction_row_view(store.get(1).unwrap()).into_string();
        let html = Html::parse_fragment(&format!("<table><tbody>{markup}</tbody></table>"));

        let button = html
            .select(&Selector::parse("button").unwrap())
            .next()
            .expect("toggle button missing");
        assert_eq!(
            button.value().attr("hx-post"),
            Some("/api/transactions/1/unignore")
        );
        assert_eq!(button.text().collect::<String>().trim(), "Unignore");
    }

    #[test]
    fn page_shows_counts_and_empty_state() {
        let store = coffee_and_salary_store();
        let filter = Filter::new("nothing matches this", time::Date::MIN, time::Date::MAX);
        let views = FilteredViews::new(store.all(), &filter);

        let markup = transactions_view(&TransactionsPage {
            filter: &filter,
            views: &views,
            total_count: store.len(),
            saved_filters: &[],
            latest_date: date!(2024 - 03 - 01),
        })
        .into_string();
        let html = Html::parse_document(&markup);

        assert_valid_html(&html);
        let counts = html
            .select(&Selector::parse("#transaction-counts").unwrap())
            .next()
            .expect("counts missing")
            .text()
            .collect::<String>();
        assert!(counts.contains("Showing 0 of 3 transactions"), "{counts}");
        let empty_state = html
            .select(&Selector::parse("[data-empty-state]").unwrap())
            .next()
            .expect("empty state missing");
        assert_eq!(
            empty_state.text().collect::<String>().trim(),
            "No transactions match the filter."
        );
    }
}
