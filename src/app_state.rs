//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use crate::{Error, TransactionStore, timezone::get_local_offset, transaction::SavedFilters};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// Every loaded transaction and its ignored flag.
    pub transaction_store: Arc<Mutex<TransactionStore>>,

    /// The filters the user has saved by name.
    pub saved_filters: Arc<Mutex<SavedFilters>>,
}

impl AppState {
    /// Create a new [AppState] serving the transactions in `transaction_store`.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezoneError] if `local_timezone` is not a known timezone.
    pub fn new(transaction_store: TransactionStore, local_timezone: &str) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
        }

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            transaction_store: Arc::new(Mutex::new(transaction_store)),
            saved_filters: Arc::new(Mutex::new(SavedFilters::default())),
        })
    }
}
