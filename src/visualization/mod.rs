//! Monthly income, expense and net income charts.
//!
//! This module contains:
//! - Aggregation of transactions by month and by a secondary key
//! - Band and linear scales for laying out the bars
//! - SVG and ECharts rendering of the aggregated data
//! - Route handlers for the visualization page and the summary API

mod aggregation;
mod bars;
mod charts;
mod grouping;
mod handlers;
mod scale;

pub use aggregation::{Aggregation, MonthKey, aggregate};
pub use grouping::GroupBy;
pub use handlers::{get_summary, get_visualization_page};
pub use scale::{BandScale, ChartLayout, LinearScale, Margin};
