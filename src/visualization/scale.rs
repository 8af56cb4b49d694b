//! Maps months and amounts onto pixel coordinates for the income and expense bars.

use super::aggregation::{Aggregation, MonthKey};

/// The inner padding between month bands, as a fraction of the step between bands.
const BAND_PADDING: f64 = 0.1;

/// The space around the plot area kept free for the axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    /// Space above the plot area.
    pub top: f64,
    /// Space right of the plot area.
    pub right: f64,
    /// Space below the plot area.
    pub bottom: f64,
    /// Space left of the plot area.
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 50.0,
            right: 50.0,
            bottom: 50.0,
            left: 50.0,
        }
    }
}

/// Splits a pixel range into equal bands, one per value of an ordered domain.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale<K> {
    domain: Vec<K>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl<K: PartialEq> BandScale<K> {
    /// Create a band scale over `range` with `padding` between bands and none at the ends.
    ///
    /// A range that ends before it starts is treated as empty.
    pub fn new(domain: Vec<K>, range: (f64, f64), padding: f64) -> Self {
        let (start, end) = range;
        let length = (end - start).max(0.0);
        let count = domain.len() as f64;
        let step = length / (count - padding).max(1.0);

        Self {
            domain,
            start,
            step,
            bandwidth: step * (1.0 - padding),
        }
    }

    /// The left edge of the band for `key`, or `None` if `key` is not in the domain.
    pub fn position(&self, key: &K) -> Option<f64> {
        self.domain
            .iter()
            .position(|candidate| candidate == key)
            .map(|index| self.start + self.step * index as f64)
    }

    /// The width of each band.
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// The values of the domain in order.
    pub fn domain(&self) -> &[K] {
        &self.domain
    }
}

/// Maps amounts linearly onto a vertical pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    /// Create a scale mapping `domain` onto `range`.
    ///
    /// If the domain is empty every value maps to the start of the range.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// The pixel coordinate of `value`.
    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;

        if d1 == d0 {
            return r0;
        }

        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// The smallest and largest value of the domain.
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Roughly `count` evenly spaced, round values covering the domain.
    ///
    /// The spacing is 1, 2 or 5 times a power of ten.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (start, stop) = self.domain;

        if count == 0 || start == stop || !(stop - start).is_finite() {
            return vec![start];
        }

        let step = nice_step((stop - start) / count as f64);
        let first = (start / step).ceil() as i64;
        let last = (stop / step).floor() as i64;

        (first..=last).map(|i| i as f64 * step).collect()
    }
}

fn nice_step(raw_step: f64) -> f64 {
    let power = 10f64.powf(raw_step.log10().floor());
    let error = raw_step / power;

    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    factor * power
}

/// Which monthly total a bar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarKind {
    /// The month's income, drawn above the baseline.
    Income,
    /// The month's expenses, drawn below the baseline.
    Expense,
    /// The month's net income, drawn on the side of the baseline its sign says.
    Net,
}

/// A rectangle in the bar chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// The total the bar shows.
    pub kind: BarKind,
    /// The month the bar belongs to.
    pub month: MonthKey,
    /// The amount the bar represents.
    pub value: f64,
    /// The left edge.
    pub x: f64,
    /// The top edge.
    pub y: f64,
    /// The width, a third of the month's band.
    pub width: f64,
    /// The height, never negative.
    pub height: f64,
}

/// The scales and bars of the income, expense and net income chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    /// The width of the whole chart, margins included.
    pub width: f64,
    /// The height of the whole chart, margins included.
    pub height: f64,
    /// The space kept free for the axes.
    pub margin: Margin,
    /// Positions the months along the x axis.
    pub x: BandScale<MonthKey>,
    /// Positions amounts along the y axis.
    pub y: LinearScale,
    /// Up to three bars per month: income, expense and net.
    pub bars: Vec<Bar>,
}

impl ChartLayout {
    /// Lay out the monthly totals of `aggregation` in a `width` by `height` chart.
    ///
    /// The y domain always includes zero. A chart smaller than its margins
    /// collapses the plot area to zero size.
    pub fn new(aggregation: &Aggregation, width: f64, height: f64, margin: Margin) -> Self {
        let left = margin.left;
        let right = (width - margin.right).max(left);
        let top = margin.top;
        let bottom = (height - margin.bottom).max(top);

        let x = BandScale::new(aggregation.months(), (left, right), BAND_PADDING);

        let min_expense = aggregation.expenses.values().copied().fold(0.0, f64::min);
        let max_income = aggregation.income.values().copied().fold(0.0, f64::max);
        let y = LinearScale::new((min_expense, max_income), (bottom, top));

        let mut layout = Self {
            width,
            height,
            margin,
            x,
            y,
            bars: Vec::new(),
        };
        layout.bars = layout.build_bars(aggregation);

        layout
    }

    /// The y coordinate of zero, where the bars start.
    pub fn baseline(&self) -> f64 {
        self.y.scale(0.0)
    }

    fn build_bars(&self, aggregation: &Aggregation) -> Vec<Bar> {
        let width = self.x.bandwidth() / 3.0;
        let baseline = self.baseline();
        let mut bars = Vec::new();

        for month in self.x.domain() {
            let Some(band_start) = self.x.position(month) else {
                continue;
            };

            let mut push = |kind: BarKind, value: f64, offset: f64| {
                let scaled = self.y.scale(value);

                bars.push(Bar {
                    kind,
                    month: *month,
                    value,
                    x: band_start + offset * width,
                    y: scaled.min(baseline),
                    width,
                    height: (scaled - baseline).abs(),
                });
            };

            if let Some(&income) = aggregation.income.get(month) {
                push(BarKind::Income, income, 0.0);
            }

            if let Some(&expenses) = aggregation.expenses.get(month) {
                push(BarKind::Expense, expenses, 1.0);
            }

            if let Some(&net) = aggregation.net.get(month) {
                push(BarKind::Net, net, 2.0);
            }
        }

        bars
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Transaction,
        visualization::{GroupBy, aggregate},
    };

    use super::{BandScale, BarKind, ChartLayout, LinearScale, Margin};

    #[track_caller]
    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn band_scale_splits_range_with_inner_padding() {
        let scale = BandScale::new(vec!['a', 'b'], (0.0, 190.0), 0.1);

        // step = 190 / (2 - 0.1) = 100
        assert_close(scale.position(&'a').unwrap(), 0.0);
        assert_close(scale.position(&'b').unwrap(), 100.0);
        assert_close(scale.bandwidth(), 90.0);
        assert_eq!(scale.position(&'c'), None);
    }

    #[test]
    fn linear_scale_maps_domain_onto_inverted_range() {
        let scale = LinearScale::new((-100.0, 100.0), (450.0, 50.0));

        assert_close(scale.scale(-100.0), 450.0);
        assert_close(scale.scale(0.0), 250.0);
        assert_close(scale.scale(100.0), 50.0);
    }

    #[test]
    fn degenerate_domain_maps_to_bottom() {
        let scale = LinearScale::new((0.0, 0.0), (450.0, 50.0));

        assert!(scale.scale(0.0).is_finite());
        assert_eq!(scale.scale(0.0), 450.0);
        assert_eq!(scale.ticks(5), vec![0.0]);
    }

    #[test]
    fn ticks_are_round_numbers() {
        let scale = LinearScale::new((-50.0, 1000.0), (450.0, 50.0));

        assert_eq!(
            scale.ticks(5),
            vec![0.0, 200.0, 400.0, 600.0, 800.0, 1000.0]
        );
    }

    #[test]
    fn small_chart_collapses_to_zero_size() {
        let layout = ChartLayout::new(&Default::default(), 60.0, 60.0, Margin::default());

        assert_eq!(layout.x.bandwidth(), 0.0);
        assert_eq!(layout.baseline(), 50.0);
        assert!(layout.bars.is_empty());
    }

    #[test]
    fn coffee_and_salary_bars() {
        let coffee = Transaction::build(-50.0, date!(2024 - 01 - 05), "coffee").finalize(1);
        let salary = Transaction::build(1000.0, date!(2024 - 01 - 20), "salary").finalize(2);
        let aggregation = aggregate(&[&coffee, &salary], GroupBy::Memo);

        let layout = ChartLayout::new(&aggregation, 350.0, 1150.0, Margin::default());

        // The y domain is [-50, 1000] over [1100, 50], i.e. one pixel per dollar.
        assert_close(layout.baseline(), 1050.0);
        assert_eq!(layout.bars.len(), 3);
        let bandwidth = layout.x.bandwidth();
        assert_close(bandwidth, 225.0);

        let income = layout.bars[0];
        assert_eq!(income.kind, BarKind::Income);
        assert_close(income.x, 50.0);
        assert_close(income.y, 50.0);
        assert_close(income.height, 1000.0);
        assert_close(income.width, 75.0);

        let expense = layout.bars[1];
        assert_eq!(expense.kind, BarKind::Expense);
        assert_close(expense.x, 125.0);
        assert_close(expense.y, 1050.0);
        assert_close(expense.height, 50.0);

        let net = layout.bars[2];
        assert_eq!(net.kind, BarKind::Net);
        assert_close(net.x, 200.0);
        assert_close(net.y, 100.0);
        assert_close(net.height, 950.0);
    }

    #[test]
    fn negative_net_hangs_below_baseline() {
        let rent = Transaction::build(-400.0, date!(2024 - 02 - 01), "rent").finalize(1);
        let aggregation = aggregate(&[&rent], GroupBy::Memo);

        let layout = ChartLayout::new(&aggregation, 350.0, 500.0, Margin::default());

        // Without income the top of the chart is zero.
        assert_close(layout.baseline(), 50.0);
        let net = layout.bars.iter().find(|bar| bar.kind == BarKind::Net).unwrap();
        assert_close(net.y, 50.0);
        assert_close(net.height, 400.0);
        assert!(layout.bars.iter().all(|bar| bar.kind != BarKind::Income));
    }
}
