//! Monthly aggregation of transactions for the charts.
//!
//! Provides functions to sum income, expenses and net income by month, break
//! down each month's expenses by a secondary key, and rank the biggest
//! contributors for the chart tooltips.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    fmt::Display,
};

use serde::{Serialize, Serializer};
use time::Date;

use crate::Transaction;

use super::grouping::{GroupBy, weekday_position};

/// The number of expense groups listed for each month.
pub const EXPENSE_BREAKDOWN_LIMIT: usize = 10;
/// The number of individual income transactions listed for each month.
pub const INCOME_BREAKDOWN_LIMIT: usize = 5;
/// The number of groups that get their own series in the stacked expenses chart.
pub const TOP_GROUPS_LIMIT: usize = 10;
/// The series that the remaining groups are folded into.
pub const OTHER_LABEL: &str = "Other";

/// A calendar month, ordered chronologically and displayed as "YYYY/MM".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u8,
}

impl MonthKey {
    /// The month that `date` falls in.
    pub fn of(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month() as u8,
        }
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month of the year, 1 for January through 12 for December.
    pub fn month(&self) -> u8 {
        self.month
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}/{:02}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Income, expenses and net income summed by month.
///
/// The income and expense maps only contain months that have income or
/// expenses respectively. `net` contains every month with a transaction.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Aggregation {
    /// The sum of negative amounts per month, always zero or less.
    pub expenses: BTreeMap<MonthKey, f64>,
    /// The sum of zero and positive amounts per month.
    pub income: BTreeMap<MonthKey, f64>,
    /// The sum of all amounts per month.
    pub net: BTreeMap<MonthKey, f64>,
    /// The magnitude of each month's expenses, summed by the secondary key.
    pub expenses_by_group: BTreeMap<MonthKey, HashMap<String, f64>>,
}

impl Aggregation {
    /// Every month with at least one transaction, in chronological order.
    pub fn months(&self) -> Vec<MonthKey> {
        self.net.keys().copied().collect()
    }

    /// Whether no transactions were aggregated.
    pub fn is_empty(&self) -> bool {
        self.net.is_empty()
    }
}

/// Sum `transactions` by month, grouping expenses by the key `group_by` extracts.
///
/// Every transaction lands in exactly one of income or expenses, so
/// `income[m] + expenses[m] == net[m]` with missing entries counting as zero.
pub fn aggregate(transactions: &[&Transaction], group_by: GroupBy) -> Aggregation {
    let mut aggregation = Aggregation::default();

    for transaction in transactions {
        let month = MonthKey::of(transaction.date);

        *aggregation.net.entry(month).or_insert(0.0) += transaction.amount;

        if transaction.is_income() {
            *aggregation.income.entry(month).or_insert(0.0) += transaction.amount;
        } else {
            *aggregation.expenses.entry(month).or_insert(0.0) += transaction.amount;
            *aggregation
                .expenses_by_group
                .entry(month)
                .or_default()
                .entry(group_by.key(transaction))
                .or_insert(0.0) -= transaction.amount;
        }
    }

    aggregation
}

/// A labelled amount in a tooltip breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownEntry {
    /// The group key or memo.
    pub label: String,
    /// The amount, expenses are given as positive magnitudes.
    pub amount: f64,
}

/// The totals of a month and the biggest contributors to them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBreakdown {
    /// The month being summarised.
    pub month: MonthKey,
    /// Total income, zero if there was none.
    pub income: f64,
    /// Total expenses, zero or less.
    pub expenses: f64,
    /// Income plus expenses.
    pub net: f64,
    /// The biggest expense groups by magnitude.
    pub top_expenses: Vec<BreakdownEntry>,
    /// The magnitude of all expenses, including groups left out of `top_expenses`.
    pub expense_total: f64,
    /// The biggest individual income transactions.
    pub top_income: Vec<BreakdownEntry>,
}

/// Build the tooltip breakdowns for every month in `aggregation`.
///
/// `transactions` must be the list `aggregation` was built from.
pub fn month_breakdowns(
    transactions: &[&Transaction],
    aggregation: &Aggregation,
) -> Vec<MonthBreakdown> {
    let mut income_by_month: HashMap<MonthKey, Vec<&Transaction>> = HashMap::new();

    for transaction in transactions.iter().copied().filter(|t| t.is_income()) {
        income_by_month
            .entry(MonthKey::of(transaction.date))
            .or_default()
            .push(transaction);
    }

    aggregation
        .net
        .iter()
        .map(|(&month, &net)| {
            let groups = aggregation.expenses_by_group.get(&month);

            MonthBreakdown {
                month,
                income: aggregation.income.get(&month).copied().unwrap_or(0.0),
                expenses: aggregation.expenses.get(&month).copied().unwrap_or(0.0),
                net,
                top_expenses: groups
                    .map(top_expense_breakdown)
                    .unwrap_or_default(),
                expense_total: groups.map(|groups| groups.values().sum()).unwrap_or(0.0),
                top_income: income_by_month
                    .remove(&month)
                    .map(top_income_breakdown)
                    .unwrap_or_default(),
            }
        })
        .collect()
}

/// The biggest expense groups of a month, by descending magnitude and then by key.
fn top_expense_breakdown(groups: &HashMap<String, f64>) -> Vec<BreakdownEntry> {
    let mut groups: Vec<(&String, &f64)> = groups.iter().collect();
    groups.sort_by(|(key_a, amount_a), (key_b, amount_b)| {
        descending(**amount_a, **amount_b).then_with(|| key_a.cmp(key_b))
    });

    groups
        .into_iter()
        .take(EXPENSE_BREAKDOWN_LIMIT)
        .map(|(label, &amount)| BreakdownEntry {
            label: label.clone(),
            amount,
        })
        .collect()
}

/// The largest income transactions of a month, biggest first.
fn top_income_breakdown(mut transactions: Vec<&Transaction>) -> Vec<BreakdownEntry> {
    // Stable, so equal amounts keep load order.
    transactions.sort_by(|a, b| descending(a.amount, b.amount));

    transactions
        .into_iter()
        .take(INCOME_BREAKDOWN_LIMIT)
        .map(|transaction| BreakdownEntry {
            label: transaction.memo.clone(),
            amount: transaction.amount,
        })
        .collect()
}

/// A series of the stacked expenses chart: the group and its monthly
/// expense magnitudes, `None` for months without expenses in the group.
pub type GroupSeries = (String, Vec<Option<f64>>);

/// The expense series for the stacked chart, one value per month of `aggregation`.
///
/// Groups are ranked by their total over all months and the top
/// [TOP_GROUPS_LIMIT] get their own series, the rest are folded into
/// [OTHER_LABEL]. Weekday groups are listed Monday to Sunday instead.
pub fn top_expense_groups(aggregation: &Aggregation, group_by: GroupBy) -> Vec<GroupSeries> {
    let months = aggregation.months();

    let mut totals: HashMap<&str, f64> = HashMap::new();
    for groups in aggregation.expenses_by_group.values() {
        for (key, amount) in groups {
            *totals.entry(key.as_str()).or_insert(0.0) += amount;
        }
    }

    let mut ranked: Vec<(&str, f64)> = totals.into_iter().collect();
    ranked.sort_by(|(key_a, amount_a), (key_b, amount_b)| {
        descending(*amount_a, *amount_b).then_with(|| key_a.cmp(key_b))
    });

    let folded: Vec<&str> = ranked
        .iter()
        .skip(TOP_GROUPS_LIMIT)
        .map(|(key, _)| *key)
        .collect();
    let mut top: Vec<&str> = ranked
        .iter()
        .take(TOP_GROUPS_LIMIT)
        .map(|(key, _)| *key)
        .collect();

    if group_by == GroupBy::Weekday {
        top.sort_by_key(|key| weekday_position(key));
    }

    let monthly_values = |keys: &[&str]| -> Vec<Option<f64>> {
        months
            .iter()
            .map(|month| {
                let groups = aggregation.expenses_by_group.get(month)?;
                let total: f64 = keys.iter().filter_map(|key| groups.get(*key)).sum();
                (total != 0.0).then_some(total)
            })
            .collect()
    };

    let mut series: Vec<GroupSeries> = top
        .iter()
        .map(|key| ((*key).to_owned(), monthly_values(&[*key])))
        .collect();

    if !folded.is_empty() {
        series.push((OTHER_LABEL.to_owned(), monthly_values(&folded)));
    }

    series
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
