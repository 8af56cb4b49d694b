//! Visualization HTTP handlers and view rendering.
//!
//! This module contains:
//! - The page that charts the active transactions matching a filter
//! - The JSON summary of the same data
//! - The query type shared by both

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE, HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, base, link,
    },
    navigation::NavBar,
    transaction::{Filter, FilterQuery, FilteredViews, TransactionStore},
};

use super::{
    aggregation::{Aggregation, MonthBreakdown, aggregate, month_breakdowns},
    bars::bar_chart_view,
    charts::{VisualizationChart, charts_script, charts_view, expenses_chart},
    grouping::GroupBy,
};

/// The state needed to chart transactions.
#[derive(Debug, Clone)]
pub struct VisualizationState {
    /// The transactions to chart.
    pub transaction_store: Arc<Mutex<TransactionStore>>,
}

impl FromRef<AppState> for VisualizationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// The grouping and filter in the visualization URLs.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct VisualizationQuery {
    /// How to break down expenses, "memo" if missing or blank.
    #[serde(default)]
    pub group_by: Option<String>,
    /// The transactions to chart.
    #[serde(flatten)]
    pub filter: FilterQuery,
}

impl VisualizationQuery {
    /// Validate the grouping and the filter.
    ///
    /// # Errors
    /// Returns [Error::InvalidGroupBy] for an unknown grouping and
    /// [Error::InvalidDate] for a malformed date.
    fn parse(self) -> Result<(Filter, GroupBy), Error> {
        let group_by = match self.group_by.as_deref().map(str::trim) {
            None | Some("") => GroupBy::default(),
            Some(text) => text.parse()?,
        };

        Ok((self.filter.into_filter()?, group_by))
    }
}

/// The monthly totals and breakdowns returned by the summary API.
#[derive(Debug, Serialize)]
pub struct Summary {
    /// The grouping used for the expense breakdowns.
    pub group_by: GroupBy,
    /// The number of transactions that were summed.
    pub transaction_count: usize,
    /// One entry per month with a transaction, oldest first.
    pub months: Vec<MonthBreakdown>,
}

/// Display charts of the active transactions that match the filter in the query string.
pub async fn get_visualization_page(
    State(state): State<VisualizationState>,
    Query(query): Query<VisualizationQuery>,
) -> Result<Response, Error> {
    let (filter, group_by) = query.parse()?;

    let store = state
        .transaction_store
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire transaction store lock: {error}"))
        .map_err(|_| Error::StoreLockError)?;

    let views = FilteredViews::new(store.all(), &filter);
    let nav_bar = NavBar::new(endpoints::VISUALIZATION_VIEW, !views.active.is_empty());

    if views.current_active.is_empty() {
        return Ok(visualization_no_data_view(nav_bar, &filter).into_response());
    }

    let aggregation = aggregate(&views.current_active, group_by);
    let breakdowns = month_breakdowns(&views.current_active, &aggregation);
    let charts = [VisualizationChart {
        id: "expenses-chart",
        options: expenses_chart(&aggregation, group_by).to_string(),
    }];

    Ok(visualization_view(VisualizationPage {
        nav_bar,
        filter: &filter,
        group_by,
        transaction_count: views.current_active.len(),
        aggregation: &aggregation,
        breakdowns: &breakdowns,
        charts: &charts,
    })
    .into_response())
}

/// Get the monthly totals of the active transactions matching the filter as JSON.
pub async fn get_summary(
    State(state): State<VisualizationState>,
    Query(query): Query<VisualizationQuery>,
) -> Result<Json<Summary>, Error> {
    let (filter, group_by) = query.parse()?;

    let store = state
        .transaction_store
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire transaction store lock: {error}"))
        .map_err(|_| Error::StoreLockError)?;

    let views = FilteredViews::new(store.all(), &filter);
    let aggregation = aggregate(&views.current_active, group_by);

    Ok(Json(Summary {
        group_by,
        transaction_count: views.current_active.len(),
        months: month_breakdowns(&views.current_active, &aggregation),
    }))
}

struct VisualizationPage<'a> {
    nav_bar: NavBar<'a>,
    filter: &'a Filter,
    group_by: GroupBy,
    transaction_count: usize,
    aggregation: &'a Aggregation,
    breakdowns: &'a [MonthBreakdown],
    charts: &'a [VisualizationChart],
}

fn visualization_view(page: VisualizationPage) -> Markup {
    let nav_bar = page.nav_bar.into_html();
    let transactions_url = transactions_url(page.filter);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full lg:max-w-5xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end gap-2"
                {
                    div
                    {
                        h1 class="text-xl font-bold" { "Visualization" }

                        p id="visualization-summary" class="text-sm text-gray-600 dark:text-gray-400"
                        {
                            "Charting " (page.transaction_count) " active "
                            (if page.transaction_count == 1 { "transaction" } else { "transactions" })
                            @if !page.filter.text().is_empty() {
                                " matching \"" (page.filter.text()) "\""
                            }
                            "."
                        }
                    }

                    a href=(transactions_url) class=(LINK_STYLE) { "Edit filter" }
                }

                (group_by_form_view(page.filter, page.group_by))

                (bar_chart_view(page.aggregation, page.breakdowns))

                (charts_view(page.charts))
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(page.charts),
    ];

    base("Visualization", &scripts, &content)
}

/// A form that reloads the page with a different grouping, keeping the filter.
fn group_by_form_view(filter: &Filter, selected: GroupBy) -> Markup {
    let query = FilterQuery::from(filter);

    html!(
        form
            id="group-by-form"
            method="get"
            action=(endpoints::VISUALIZATION_VIEW)
            class="flex flex-wrap gap-4 items-end"
        {
            @if let Some(text) = &query.filter {
                input type="hidden" name="filter" value=(text);
            }
            @if let Some(min_date) = &query.min_date {
                input type="hidden" name="min_date" value=(min_date);
            }
            @if let Some(max_date) = &query.max_date {
                input type="hidden" name="max_date" value=(max_date);
            }

            fieldset class="grow"
            {
                legend class="mb-2 text-sm font-medium" { "Group expenses by" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    @for group_by in GroupBy::ALL {
                        @let id = format!("group-by-{}", group_by.as_str());

                        input
                            id=(id)
                            type="radio"
                            name="group_by"
                            value=(group_by.as_str())
                            checked[group_by == selected]
                            onchange="this.form.submit()"
                            class=(FORM_RADIO_INPUT_STYLE);

                        label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (group_by.label()) }
                    }
                }
            }

            noscript
            {
                button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Apply" }
            }
        }
    )
}

fn visualization_no_data_view(nav_bar: NavBar, filter: &Filter) -> Markup {
    let nav_bar = nav_bar.into_html();
    let transactions_link = link(&transactions_url(filter), "transactions page");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 id="no-data" class="text-xl font-bold"
            {
                "Select at least one transaction"
            }

            p
            {
                "Charts will show up here once the filter matches a transaction that is not
                ignored. Change the filter or unignore transactions on the "
                (transactions_link) "."
            }
        }
    );

    base("Visualization", &[], &content)
}

fn transactions_url(filter: &Filter) -> String {
    let query = filter.to_query_string();

    if query.is_empty() {
        endpoints::TRANSACTIONS_VIEW.to_owned()
    } else {
        format!("{}?{query}", endpoints::TRANSACTIONS_VIEW)
    }
}
