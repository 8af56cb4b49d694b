//! The in-memory store that owns every loaded transaction.

use std::collections::{HashMap, HashSet};

use time::Date;

use crate::Error;

use super::core::{NewTransaction, Transaction, TransactionId};

/// The number of transactions added and skipped by [TransactionStore::insert_all].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Transactions added to the store.
    pub inserted: usize,
    /// Transactions skipped because their import ID was already in the store.
    pub duplicates: usize,
}

/// Holds the full set of transactions in load order.
///
/// The only mutations after loading are [TransactionStore::ignore],
/// [TransactionStore::unignore] and [TransactionStore::set_ignored].
/// Transactions are never removed or reordered.
#[derive(Debug, Default)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
    index_by_id: HashMap<TransactionId, usize>,
    import_ids: HashSet<i64>,
    next_id: TransactionId,
}

impl TransactionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Add a transaction to the store and give it the next ID.
    ///
    /// # Errors
    /// Returns [Error::DuplicateImportId] if a transaction with the same import ID was already added.
    pub fn insert(&mut self, new_transaction: NewTransaction) -> Result<&Transaction, Error> {
        if let Some(import_id) = new_transaction.import_id {
            if !self.import_ids.insert(import_id) {
                return Err(Error::DuplicateImportId);
            }
        }

        let id = self.next_id.max(1);
        self.next_id = id + 1;

        let index = self.transactions.len();
        self.transactions.push(new_transaction.finalize(id));
        self.index_by_id.insert(id, index);

        Ok(&self.transactions[index])
    }

    /// Add many transactions, skipping the ones that were imported before.
    pub fn insert_all(&mut self, new_transactions: Vec<NewTransaction>) -> ImportSummary {
        let mut summary = ImportSummary::default();

        for new_transaction in new_transactions {
            match self.insert(new_transaction) {
                Ok(_) => summary.inserted += 1,
                Err(_) => summary.duplicates += 1,
            }
        }

        summary
    }

    /// Every transaction in load order, ignored ones included.
    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The transactions that are not ignored, in load order.
    pub fn active(&self) -> Vec<&Transaction> {
        self.transactions.iter().filter(|t| !t.ignored).collect()
    }

    /// Get a transaction by its ID.
    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.index_by_id
            .get(&id)
            .map(|&index| &self.transactions[index])
    }

    /// The number of transactions in the store.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the store holds no transactions at all.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// The earliest and latest transaction dates, or `None` for an empty store.
    pub fn date_bounds(&self) -> Option<(Date, Date)> {
        let first = self.transactions.first()?.date;

        Some(
            self.transactions
                .iter()
                .fold((first, first), |(min, max), transaction| {
                    (min.min(transaction.date), max.max(transaction.date))
                }),
        )
    }

    /// Mark every transaction in `ids` as ignored.
    ///
    /// Unknown IDs are skipped. Returns how many transactions changed state,
    /// so applying the same list twice returns zero the second time.
    pub fn ignore(&mut self, ids: &[TransactionId]) -> usize {
        self.set_ignored_many(ids, true)
    }

    /// Clear the ignored flag on every transaction in `ids`.
    ///
    /// Unknown IDs are skipped. Returns how many transactions changed state.
    pub fn unignore(&mut self, ids: &[TransactionId]) -> usize {
        self.set_ignored_many(ids, false)
    }

    /// Set the ignored flag of a single transaction.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` does not refer to a transaction in the store.
    pub fn set_ignored(&mut self, id: TransactionId, ignored: bool) -> Result<&Transaction, Error> {
        let index = *self.index_by_id.get(&id).ok_or(Error::NotFound)?;
        let transaction = &mut self.transactions[index];
        transaction.ignored = ignored;

        Ok(transaction)
    }

    fn set_ignored_many(&mut self, ids: &[TransactionId], ignored: bool) -> usize {
        let mut changed = 0;

        for id in ids {
            let Some(&index) = self.index_by_id.get(id) else {
                tracing::debug!("skipping unknown transaction {id}");
                continue;
            };

            let transaction = &mut self.transactions[index];
            if transaction.ignored != ignored {
                transaction.ignored = ignored;
                changed += 1;
            }
        }

        changed
    }
}
