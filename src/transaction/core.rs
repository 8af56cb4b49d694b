//! Defines the core data models for transactions.

use serde::Serialize;
use time::Date;

/// The ID the store assigns to a transaction when it is loaded.
pub type TransactionId = u64;

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Transactions are only ever created by the [crate::transaction::TransactionStore],
/// use [Transaction::build] to describe a transaction that should be loaded into the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction, unique within the store.
    pub id: TransactionId,
    /// The amount of money spent or earned in this transaction.
    ///
    /// Negative amounts are expenses, zero and positive amounts are income.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub memo: String,
    /// The category of the transaction, e.g. "Groceries". Empty if unknown.
    pub category: String,
    /// Whether the transaction is excluded from the active views.
    pub ignored: bool,
    /// The hash of the source record, used to detect duplicate imports.
    #[serde(skip)]
    pub import_id: Option<i64>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(amount: f64, date: Date, memo: &str) -> NewTransaction {
        NewTransaction {
            amount,
            date,
            memo: memo.to_owned(),
            category: String::new(),
            import_id: None,
        }
    }

    /// Whether the transaction counts towards income, i.e. the amount is not negative.
    pub fn is_income(&self) -> bool {
        self.amount >= 0.0
    }
}

/// A transaction that has been validated but not yet given an ID by the store.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// use finview::Transaction;
///
/// let new_transaction = Transaction::build(-45.99, date!(2025-01-15), "Coffee")
///     .category("Eating out")
///     .import_id(Some(987654321));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The monetary amount of the transaction.
    ///
    /// Positive values represent income/credits, negative values represent
    /// expenses/debits.
    pub amount: f64,
    /// The date when the transaction occurred.
    pub date: Date,
    /// A human-readable description of the transaction.
    pub memo: String,
    /// The category of the transaction, empty if the source did not provide one.
    pub category: String,
    /// Optional unique identifier for imported transactions.
    ///
    /// The store refuses a second transaction with the same import ID, which
    /// makes importing the same CSV file twice harmless.
    pub import_id: Option<i64>,
}

impl NewTransaction {
    /// Set the category for the transaction.
    pub fn category(mut self, category: &str) -> Self {
        category.clone_into(&mut self.category);
        self
    }

    /// Set the import ID for the transaction.
    pub fn import_id(mut self, import_id: Option<i64>) -> Self {
        self.import_id = import_id;
        self
    }

    pub(crate) fn finalize(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            amount: self.amount,
            date: self.date,
            memo: self.memo,
            category: self.category,
            ignored: false,
            import_id: self.import_id,
        }
    }
}
