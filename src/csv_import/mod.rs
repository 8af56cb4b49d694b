//! Loading transactions from CSV files, either uploaded through the import
//! page or given on the command line.

mod csv;
mod import_page;
mod import_transactions;

pub use csv::parse_csv;
pub use import_page::get_import_page;
pub use import_transactions::import_transactions;
