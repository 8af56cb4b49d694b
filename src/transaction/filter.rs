//! Memo/category text search and date range filtering of transactions.

use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::Error;

use super::core::Transaction;

/// The date format used in URLs and date inputs, e.g. "2024-01-31".
const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Selects transactions whose memo or category contains some text and whose
/// date falls within an inclusive range.
///
/// The default filter matches every transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// The search text as the user typed it.
    text: String,
    /// The lowercased search text used for matching.
    needle: String,
    /// The earliest date to include.
    min_date: Date,
    /// The latest date to include.
    max_date: Date,
}

impl Default for Filter {
    fn default() -> Self {
        Self::new("", Date::MIN, Date::MAX)
    }
}

impl Filter {
    /// Create a filter for transactions mentioning `text` between `min_date` and `max_date`, inclusive.
    ///
    /// `text` is matched as a raw substring, surrounding whitespace included.
    pub fn new(text: &str, min_date: Date, max_date: Date) -> Self {
        Self {
            text: text.to_owned(),
            needle: text.to_lowercase(),
            min_date,
            max_date,
        }
    }

    /// The search text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The earliest date included by the filter.
    pub fn min_date(&self) -> Date {
        self.min_date
    }

    /// The latest date included by the filter.
    pub fn max_date(&self) -> Date {
        self.max_date
    }

    /// Whether the filter lets every transaction through.
    pub fn is_unbounded(&self) -> bool {
        self.needle.is_empty() && self.min_date == Date::MIN && self.max_date == Date::MAX
    }

    /// Whether `transaction` satisfies the text and both date bounds.
    ///
    /// Empty search text matches everything, including empty memos and categories.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        let text_matches = self.needle.is_empty()
            || transaction.memo.to_lowercase().contains(&self.needle)
            || transaction.category.to_lowercase().contains(&self.needle);

        text_matches && transaction.date >= self.min_date && transaction.date <= self.max_date
    }

    /// The query string that reproduces this filter, without the leading '?'.
    ///
    /// Unbounded dates are left out.
    pub fn to_query_string(&self) -> String {
        let query = FilterQuery::from(self);

        serde_urlencoded::to_string(&query)
            .inspect_err(|error| tracing::error!("could not encode filter {self:?}: {error}"))
            .unwrap_or_default()
    }
}

/// The subsets of a transaction list that the views are built from.
///
/// Every list keeps the order of the input.
#[derive(Debug)]
pub struct FilteredViews<'a> {
    /// Transactions matching the filter, ignored transactions included.
    pub current: Vec<&'a Transaction>,
    /// Transactions that are not ignored, regardless of the filter.
    pub active: Vec<&'a Transaction>,
    /// Transactions that match the filter and are not ignored.
    pub current_active: Vec<&'a Transaction>,
}

impl<'a> FilteredViews<'a> {
    /// Split `transactions` into the filtered, active and filtered-active views.
    pub fn new(transactions: &'a [Transaction], filter: &Filter) -> Self {
        let current: Vec<&Transaction> = transactions.iter().filter(|t| filter.matches(t)).collect();
        let active = transactions.iter().filter(|t| !t.ignored).collect();
        let current_active = current.iter().copied().filter(|t| !t.ignored).collect();

        Self {
            current,
            active,
            current_active,
        }
    }
}

/// The filter as it appears in URL query strings and form bodies.
///
/// Missing or blank dates mean the range is open on that side.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterQuery {
    /// Text to search for in memos and categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// The earliest date to include, formatted as "YYYY-MM-DD".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    /// The latest date to include, formatted as "YYYY-MM-DD".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
}

impl FilterQuery {
    /// Validate the query and turn it into a [Filter].
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if a date is present but not formatted as "YYYY-MM-DD".
    pub fn into_filter(self) -> Result<Filter, Error> {
        let min_date = parse_optional_date(self.min_date.as_deref())?.unwrap_or(Date::MIN);
        let max_date = parse_optional_date(self.max_date.as_deref())?.unwrap_or(Date::MAX);

        Ok(Filter::new(
            self.filter.as_deref().unwrap_or_default(),
            min_date,
            max_date,
        ))
    }
}

impl From<&Filter> for FilterQuery {
    fn from(filter: &Filter) -> Self {
        let bounded = |date: Date, unbounded: Date| {
            (date != unbounded).then(|| format_date(date))
        };

        Self {
            filter: (!filter.text.is_empty()).then(|| filter.text.clone()),
            min_date: bounded(filter.min_date, Date::MIN),
            max_date: bounded(filter.max_date, Date::MAX),
        }
    }
}

/// Format `date` the way date inputs and filter queries expect it.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

fn parse_optional_date(text: Option<&str>) -> Result<Option<Date>, Error> {
    match text.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => Date::parse(text, DATE_FORMAT)
            .map(Some)
            .map_err(|error| {
                tracing::debug!("could not parse date {text:?}: {error}");
                Error::InvalidDate(text.to_owned())
            }),
    }
}
