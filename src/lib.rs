//! Finview is a web app for reviewing your personal finances.
//!
//! Transactions are loaded from CSV files into memory. The app lets you
//! search and ignore transactions, and charts your income, expenses and net
//! income month by month, broken down by memo, category or weekday.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod csv_import;
mod endpoints;
mod html;
mod internal_server_error;
mod navigation;
mod not_found;
mod routing;
mod timezone;
mod transaction;
mod visualization;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use csv_import::parse_csv;
pub use routing::build_router;
pub use transaction::{
    Filter, FilteredViews, ImportSummary, NewTransaction, Transaction, TransactionId,
    TransactionStore,
};
pub use visualization::{
    Aggregation, BandScale, ChartLayout, GroupBy, LinearScale, Margin, MonthKey, aggregate,
};

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFound};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The multipart form could not be parsed as a list of CSV files.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// The multipart form did not contain a CSV file.
    #[error("File is not a CSV")]
    NotCSV,

    /// The CSV had issues that prevented it from being parsed.
    #[error("Could not parse the CSV file: {0}")]
    InvalidCSV(String),

    /// A transaction with the same import ID has already been loaded.
    ///
    /// When importing transactions from a CSV file, an import ID is used to
    /// uniquely identify each transaction. Rejecting duplicate import IDs
    /// avoids loading the same transaction twice when the user imports CSV
    /// files that overlap in time.
    #[error("the import ID already exists in the store")]
    DuplicateImportId,

    /// The chart grouping is not one of "memo", "category" or "weekday".
    #[error("unknown grouping \"{0}\", expected one of memo, category or weekday")]
    InvalidGroupBy(String),

    /// A date in a filter was not formatted as "YYYY-MM-DD".
    #[error("invalid date \"{0}\", expected a date like 2024-01-31")]
    InvalidDate(String),

    /// A filter was saved without a name.
    #[error("filter name cannot be empty")]
    EmptyFilterName,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Could not acquire the lock on shared state, another request panicked while holding it.
    #[error("could not acquire the transaction store lock")]
    StoreLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFound.into_response(),
            Error::InvalidGroupBy(_) | Error::InvalidDate(_) => (
                StatusCode::BAD_REQUEST,
                InternalServerError {
                    description: "Invalid request",
                    fix: &self.to_string(),
                }
                .into_html(),
            )
                .into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::StoreLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an alert fragment for HTMX requests.
    fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Transaction not found".to_owned(),
                    details: "The transaction could not be found. Try refreshing the page."
                        .to_owned(),
                },
            ),
            Error::InvalidDate(text) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid date".to_owned(),
                    details: format!("\"{text}\" is not a date, use the format 2024-01-31."),
                },
            ),
            Error::InvalidGroupBy(text) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid grouping".to_owned(),
                    details: format!(
                        "\"{text}\" is not a valid grouping, choose memo, category or weekday."
                    ),
                },
            ),
            Error::EmptyFilterName => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "Give the filter a name before saving it.".to_owned(),
                },
            ),
            Error::NotCSV => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "File type must be CSV.".to_owned(),
                },
            ),
            Error::InvalidCSV(details) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Failed to parse CSV".to_owned(),
                    details,
                },
            ),
            Error::MultipartError(details) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not read the uploaded files".to_owned(),
                    details,
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    #[test]
    fn invalid_group_by_is_a_bad_request() {
        let response = Error::InvalidGroupBy("amount".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_alert_has_not_found_status() {
        let response = Error::NotFound.into_alert_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn lock_error_is_internal_server_error() {
        let response = Error::StoreLockError.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
