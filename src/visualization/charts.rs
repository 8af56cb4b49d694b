//! ECharts configuration for the stacked monthly expenses chart.
//!
//! The chart options are generated with `charming` and serialized to JSON,
//! the browser initializes ECharts from the page's head script.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, JsFunction,
        Tooltip, Trigger,
    },
    series::bar,
};
use maud::{Markup, PreEscaped, html};

use crate::html::HeadElement;

use super::{
    aggregation::{Aggregation, top_expense_groups},
    grouping::GroupBy,
};

/// A chart with its HTML container ID and ECharts configuration.
pub(super) struct VisualizationChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for `charts`.
pub(super) fn charts_view(charts: &[VisualizationChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            @for chart in charts {
                div
                    id=(chart.id)
                    class="min-h-[420px] rounded dark:bg-gray-100"
                {}
            }
        }
    )
}

/// Generates the script that initializes an ECharts instance for each chart,
/// following the browser's dark mode setting and resizing with the window.
pub(super) fn charts_script(charts: &[VisualizationChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id,
                escape_script_text(&chart.options)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// Escapes `<` so text from imported memos cannot close the inline script.
///
/// `\u003c` is read back as `<` inside JavaScript string literals, and the
/// options never contain `<` outside of strings.
fn escape_script_text(options: &str) -> String {
    options.replace('<', "\\u003c")
}

/// Monthly expenses stacked by group, the biggest groups first.
pub(super) fn expenses_chart(aggregation: &Aggregation, group_by: GroupBy) -> Chart {
    let labels: Vec<String> = aggregation
        .months()
        .iter()
        .map(|month| month.to_string())
        .collect();
    let series_data = top_expense_groups(aggregation, group_by);

    let mut chart = Chart::new()
        .title(
            Title::new()
                .text("Monthly Expenses")
                .subtext(format!("Grouped by {}", group_by.label().to_lowercase()))
                .left(20)
                .top("1%"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().left(250).top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        );

    for (group, data) in series_data {
        chart = chart.series(
            bar::Bar::new()
                .name(group)
                .stack("Expenses")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(data),
        );
    }

    chart
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        Transaction,
        html::HeadElement,
        visualization::{GroupBy, aggregate},
    };

    use super::{VisualizationChart, charts_script, expenses_chart};

    #[test]
    fn expenses_chart_has_a_stacked_series_per_group() {
        let coffee = Transaction::build(-50.0, date!(2024 - 01 - 05), "coffee").finalize(1);
        let rent = Transaction::build(-400.0, date!(2024 - 02 - 01), "rent").finalize(2);
        let salary = Transaction::build(1000.0, date!(2024 - 01 - 20), "salary").finalize(3);
        let aggregation = aggregate(&[&coffee, &rent, &salary], GroupBy::Memo);

        let options = expenses_chart(&aggregation, GroupBy::Memo).to_string();

        assert!(options.contains("\"2024/01\""), "{options}");
        assert!(options.contains("\"2024/02\""), "{options}");
        assert!(options.contains("\"rent\""), "{options}");
        assert!(options.contains("\"coffee\""), "{options}");
        assert!(!options.contains("\"salary\""), "income has no series: {options}");
        assert!(options.contains("\"stack\""), "{options}");
    }

    #[test]
    fn memo_cannot_close_the_script_element() {
        let memo = "</script><b id=pwn>x</b>";
        let transaction = Transaction::build(-5.0, date!(2024 - 01 - 05), memo).finalize(1);
        let aggregation = aggregate(&[&transaction], GroupBy::Memo);
        let charts = [VisualizationChart {
            id: "expenses-chart",
            options: expenses_chart(&aggregation, GroupBy::Memo).to_string(),
        }];

        let HeadElement::ScriptSource(script) = charts_script(&charts) else {
            panic!("expected an inline script");
        };

        assert!(!script.0.contains("</"), "{}", script.0);
        assert!(script.0.contains("\\u003c/script>\\u003cb id=pwn>x\\u003c/b>"));

        let document = Html::parse_document(&format!(
            "<html><head><script>{}</script></head><body></body></html>",
            script.0
        ));
        assert_eq!(
            document.select(&Selector::parse("#pwn").unwrap()).count(),
            0
        );
        assert_eq!(document.select(&Selector::parse("script").unwrap()).count(), 1);
    }

    #[test]
    fn script_initializes_every_chart() {
        let charts = [VisualizationChart {
            id: "expenses-chart",
            options: "{}".to_owned(),
        }];

        let HeadElement::ScriptSource(script) = charts_script(&charts) else {
            panic!("expected an inline script");
        };

        assert!(script.0.contains("document.getElementById(\"expenses-chart\")"));
        assert!(script.0.starts_with("document.addEventListener('DOMContentLoaded'"));
    }
}
