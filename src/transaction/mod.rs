//! Transaction management for the finance viewer.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` builder
//! - The in-memory `TransactionStore` and its ignored flags
//! - Text and date range filtering, and saved filters
//! - View handlers for the transactions page

mod core;
mod filter;
mod ignore_endpoint;
mod saved_filters;
mod store;
mod transactions_page;
mod view;

pub use core::{NewTransaction, Transaction, TransactionId};
pub use filter::{Filter, FilterQuery, FilteredViews};
pub use ignore_endpoint::{
    ignore_filtered_endpoint, ignore_transaction_endpoint, unignore_filtered_endpoint,
    unignore_transaction_endpoint,
};
pub use saved_filters::{SavedFilters, save_filter_endpoint};
pub use store::{ImportSummary, TransactionStore};
pub use transactions_page::get_transactions_page;
