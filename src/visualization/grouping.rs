//! The secondary keys that expenses can be broken down by.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::Weekday;

use crate::{Error, Transaction};

/// The label for transactions with an empty category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";
/// The label for transactions with an empty memo.
pub const NO_MEMO_LABEL: &str = "(no memo)";

/// How to group expenses within a month.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum GroupBy {
    /// Group by the transaction's memo.
    #[default]
    Memo,
    /// Group by the transaction's category.
    Category,
    /// Group by the day of the week the transaction happened on.
    Weekday,
}

impl GroupBy {
    /// Every grouping, in the order they are offered to the user.
    pub const ALL: [GroupBy; 3] = [GroupBy::Memo, GroupBy::Category, GroupBy::Weekday];

    /// The key that `transaction` is grouped under.
    pub fn key(self, transaction: &Transaction) -> String {
        match self {
            GroupBy::Memo if transaction.memo.is_empty() => NO_MEMO_LABEL.to_owned(),
            GroupBy::Memo => transaction.memo.clone(),
            GroupBy::Category if transaction.category.is_empty() => {
                UNCATEGORIZED_LABEL.to_owned()
            }
            GroupBy::Category => transaction.category.clone(),
            GroupBy::Weekday => weekday_label(transaction.date.weekday()).to_owned(),
        }
    }

    /// The value used in query strings, e.g. "memo".
    pub fn as_str(self) -> &'static str {
        match self {
            GroupBy::Memo => "memo",
            GroupBy::Category => "category",
            GroupBy::Weekday => "weekday",
        }
    }

    /// The name shown to the user, e.g. "Memo".
    pub fn label(self) -> &'static str {
        match self {
            GroupBy::Memo => "Memo",
            GroupBy::Category => "Category",
            GroupBy::Weekday => "Weekday",
        }
    }
}

impl Display for GroupBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memo" => Ok(GroupBy::Memo),
            "category" => Ok(GroupBy::Category),
            "weekday" => Ok(GroupBy::Weekday),
            _ => Err(Error::InvalidGroupBy(s.to_owned())),
        }
    }
}

impl TryFrom<String> for GroupBy {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The short English name of `weekday`, e.g. "Mon".
pub fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}

/// The position of a weekday label in a Monday-first week, `None` for other text.
pub fn weekday_position(label: &str) -> Option<u8> {
    ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
        .iter()
        .position(|day| *day == label)
        .map(|position| position as u8)
}
