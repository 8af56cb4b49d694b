use time::macros::date;

use crate::{AppState, Transaction, TransactionStore};

/// A store with a January coffee expense and salary, plus a February rent payment.
pub(crate) fn coffee_and_salary_store() -> TransactionStore {
    let mut store = TransactionStore::new();

    store.insert_all(vec![
        Transaction::build(-50.0, date!(2024 - 01 - 05), "coffee").category("Eating Out"),
        Transaction::build(1000.0, date!(2024 - 01 - 20), "salary").category("Work"),
        Transaction::build(-400.0, date!(2024 - 02 - 01), "rent").category("Housing"),
    ]);

    store
}

pub(crate) fn test_state(store: TransactionStore) -> AppState {
    AppState::new(store, "Etc/UTC").expect("Could not create app state")
}
