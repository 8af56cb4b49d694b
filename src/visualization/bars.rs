//! Server-side SVG rendering of the monthly income, expense and net income bars.

use std::collections::HashMap;

use maud::{Markup, html};

use crate::html::format_currency;

use super::{
    aggregation::{Aggregation, MonthBreakdown, MonthKey},
    scale::{Bar, BarKind, ChartLayout, Margin},
};

/// The width of the SVG viewport.
pub(super) const CHART_WIDTH: f64 = 960.0;
/// The height of the SVG viewport.
pub(super) const CHART_HEIGHT: f64 = 480.0;
/// Roughly how many ticks the y axis gets.
const Y_TICK_COUNT: usize = 6;

/// Renders the monthly bars with hover tooltips built from `breakdowns`.
pub(super) fn bar_chart_view(aggregation: &Aggregation, breakdowns: &[MonthBreakdown]) -> Markup {
    let layout = ChartLayout::new(aggregation, CHART_WIDTH, CHART_HEIGHT, Margin::default());
    let breakdowns: HashMap<MonthKey, &MonthBreakdown> = breakdowns
        .iter()
        .map(|breakdown| (breakdown.month, breakdown))
        .collect();

    let left = layout.margin.left;
    let right = (layout.width - layout.margin.right).max(left);
    let baseline = layout.baseline();
    let label_y = (layout.height - layout.margin.bottom).max(layout.margin.top) + 20.0;
    let bandwidth = layout.x.bandwidth();

    html! {
        figure id="bar-chart" class="w-full"
        {
            svg
                viewBox={ "0 0 " (CHART_WIDTH) " " (CHART_HEIGHT) }
                role="img"
                aria-label="Income, expenses and net income by month"
                class="w-full h-auto text-gray-900 dark:text-white"
            {
                g class="y-axis" font-size="12" fill="currentColor"
                {
                    @for tick in layout.y.ticks(Y_TICK_COUNT) {
                        @let y = coordinate(layout.y.scale(tick));

                        line
                            x1=(coordinate(left))
                            x2=(coordinate(right))
                            y1=(y)
                            y2=(y)
                            stroke="currentColor"
                            stroke-opacity="0.1" {}

                        text
                            x=(coordinate(left - 6.0))
                            y=(y)
                            text-anchor="end"
                            dominant-baseline="middle"
                        {
                            (format_currency(tick))
                        }
                    }
                }

                g class="x-axis" font-size="12" fill="currentColor"
                {
                    @for month in layout.x.domain() {
                        @if let Some(x) = layout.x.position(month) {
                            text
                                x=(coordinate(x + bandwidth / 2.0))
                                y=(coordinate(label_y))
                                text-anchor="middle"
                            {
                                (month)
                            }
                        }
                    }
                }

                @for bar in &layout.bars {
                    (bar_view(bar, breakdowns.get(&bar.month).copied()))
                }

                line
                    class="zero-line"
                    x1=(coordinate(left))
                    x2=(coordinate(right))
                    y1=(coordinate(baseline))
                    y2=(coordinate(baseline))
                    stroke="gray" {}
            }

            figcaption class="flex gap-4 justify-center text-sm"
            {
                span class="text-green-600" { "Income" }
                span class="text-red-600" { "Expenses" }
                span class="text-blue-600" { "Net / Total" }
            }
        }
    }
}

fn bar_view(bar: &Bar, breakdown: Option<&MonthBreakdown>) -> Markup {
    let (kind, fill) = match bar.kind {
        BarKind::Income => ("income", "#16a34a"),
        BarKind::Expense => ("expense", "#dc2626"),
        BarKind::Net => ("net", "#2563eb"),
    };

    html! {
        rect
            data-kind=(kind)
            data-month=(bar.month)
            x=(coordinate(bar.x))
            y=(coordinate(bar.y))
            width=(coordinate(bar.width))
            height=(coordinate(bar.height))
            fill=(fill)
        {
            title { (tooltip(bar, breakdown)) }
        }
    }
}

/// The hover text of a bar: its total followed by the biggest contributors.
fn tooltip(bar: &Bar, breakdown: Option<&MonthBreakdown>) -> String {
    let mut lines = Vec::new();

    match bar.kind {
        BarKind::Income => {
            lines.push(format!("Income: {}", format_currency(bar.value)));

            for entry in breakdown.into_iter().flat_map(|b| &b.top_income) {
                lines.push(format!("{}: {}", entry.label, format_currency(entry.amount)));
            }
        }
        BarKind::Expense => {
            let total = breakdown.map_or(-bar.value, |b| b.expense_total);
            lines.push(format!("Expenses: {}", format_currency(total)));

            for entry in breakdown.into_iter().flat_map(|b| &b.top_expenses) {
                lines.push(format!("{}: {}", entry.label, format_currency(entry.amount)));
            }
        }
        BarKind::Net => lines.push(format!("Net / Total: {}", format_currency(bar.value))),
    }

    format!("{}\n{}", bar.month, lines.join("\n"))
}

fn coordinate(value: f64) -> String {
    format!("{value:.1}")
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        Transaction,
        visualization::{
            GroupBy, aggregate,
            aggregation::{MonthBreakdown, month_breakdowns},
        },
    };

    use super::bar_chart_view;

    fn render(transactions: &[Transaction]) -> Html {
        let transactions: Vec<&Transaction> = transactions.iter().collect();
        let aggregation = aggregate(&transactions, GroupBy::Memo);
        let breakdowns: Vec<MonthBreakdown> = month_breakdowns(&transactions, &aggregation);

        Html::parse_fragment(&bar_chart_view(&aggregation, &breakdowns).into_string())
    }

    fn bar_title(html: &Html, kind: &str) -> String {
        let selector = Selector::parse(&format!("rect[data-kind='{kind}'] title")).unwrap();

        html.select(&selector)
            .next()
            .unwrap_or_else(|| panic!("no {kind} bar in {}", html.html()))
            .text()
            .collect()
    }

    #[test]
    fn renders_three_bars_per_month() {
        let html = render(&[
            Transaction::build(-50.0, date!(2024 - 01 - 05), "coffee").finalize(1),
            Transaction::build(1000.0, date!(2024 - 01 - 20), "salary").finalize(2),
        ]);

        let bars = Selector::parse("rect[data-kind]").unwrap();
        assert_eq!(html.select(&bars).count(), 3);
        let zero_line = Selector::parse("line.zero-line").unwrap();
        assert!(html.select(&zero_line).next().is_some());
    }

    #[test]
    fn tooltips_list_totals_and_contributors() {
        let html = render(&[
            Transaction::build(-50.0, date!(2024 - 01 - 05), "coffee").finalize(1),
            Transaction::build(1000.0, date!(2024 - 01 - 20), "salary").finalize(2),
        ]);

        let income = bar_title(&html, "income");
        assert!(income.starts_with("2024/01\nIncome: $1,000.00"), "{income}");
        assert!(income.contains("salary: $1,000.00"), "{income}");

        let expense = bar_title(&html, "expense");
        assert!(expense.contains("Expenses: $50.00"), "{expense}");
        assert!(expense.contains("coffee: $50.00"), "{expense}");

        assert!(bar_title(&html, "net").contains("Net / Total: $950.00"));
    }

    #[test]
    fn month_labels_follow_chronological_order() {
        let html = render(&[
            Transaction::build(-400.0, date!(2024 - 02 - 01), "rent").finalize(1),
            Transaction::build(-50.0, date!(2024 - 01 - 05), "coffee").finalize(2),
        ]);

        let labels: Vec<String> = html
            .select(&Selector::parse("g.x-axis text").unwrap())
            .map(|label| label.text().collect())
            .collect();
        assert_eq!(labels, vec!["2024/01", "2024/02"]);
    }

    #[test]
    fn empty_aggregation_renders_axes_only() {
        let html = render(&[]);

        let bars = Selector::parse("rect").unwrap();
        assert_eq!(html.select(&bars).count(), 0);
    }
}
