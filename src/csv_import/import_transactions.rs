use std::{
    sync::{Arc, Mutex, OnceLock},
    time::Duration,
};

use axum::{
    extract::{FromRef, Multipart, State, multipart::Field},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use numfmt::{Formatter, Precision};

use crate::{
    AppState, Error,
    alert::Alert,
    csv_import::csv::parse_csv,
    endpoints,
    navigation::NavBar,
    transaction::{ImportSummary, TransactionStore},
};

/// The state needed for importing transactions.
#[derive(Debug, Clone)]
pub struct ImportState {
    /// The store the imported transactions are added to.
    pub transaction_store: Arc<Mutex<TransactionStore>>,
}

impl FromRef<AppState> for ImportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// Route handler for importing transactions from CSV files.
///
/// Every file is parsed before any transaction is added, so a malformed file
/// leaves the store untouched. Rows that were imported before are skipped.
pub async fn import_transactions(
    State(state): State<ImportState>,
    mut multipart: Multipart,
) -> Result<Response, Response> {
    let start_time = std::time::Instant::now();
    let mut transactions = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(error) => {
                tracing::error!("Could not read multipart form: {error}");
                return Err(Error::MultipartError(error.body_text()).into_alert_response());
            }
        };

        let csv_data = parse_multipart_field(field)
            .await
            .inspect_err(|error| tracing::debug!("Failed to parse multipart field: {error}"))
            .map_err(Error::into_alert_response)?;

        let parsed = parse_csv(&csv_data)
            .inspect_err(|error| tracing::debug!("Failed to parse CSV: {error}"))
            .map_err(Error::into_alert_response)?;

        transactions.extend(parsed);
    }

    let mut store = state.transaction_store.lock().map_err(|error| {
        tracing::error!("could not acquire transaction store lock: {error}");
        Error::StoreLockError.into_alert_response()
    })?;

    let summary = store.insert_all(transactions);
    let nav_bar = NavBar::new(endpoints::IMPORT_VIEW, !store.active().is_empty())
        .swap_oob()
        .into_html();
    let alert = import_success_alert(&summary, start_time.elapsed());

    Ok((
        StatusCode::CREATED,
        maud::html! {
            (alert.into_markup())
            (nav_bar)
        },
    )
        .into_response())
}

/// Creates a success alert describing how many transactions were added and skipped.
fn import_success_alert(summary: &ImportSummary, duration: Duration) -> Alert {
    let formatter = get_thousands_separator_formatter();
    let duration_ms = formatter.fmt_string(duration.as_millis());
    let inserted = formatter.fmt_string(summary.inserted);
    let duplicates = formatter.fmt_string(summary.duplicates);

    tracing::info!(
        "Import completed in {duration_ms}ms: {inserted} transactions imported, {duplicates} duplicates skipped"
    );

    match (summary.inserted, summary.duplicates) {
        (0, _) => Alert::Success {
            message: "Import completed".to_owned(),
            details: format!(
                "No new transactions were imported ({duplicates} duplicates skipped). \
                Completed in {duration_ms}ms."
            ),
        },
        (_, 0) => Alert::Success {
            message: "Import completed successfully!".to_owned(),
            details: format!("Imported {inserted} transactions in {duration_ms}ms."),
        },
        _ => Alert::Success {
            message: "Import completed successfully!".to_owned(),
            details: format!(
                "Imported {inserted} transactions and skipped {duplicates} duplicates \
                in {duration_ms}ms."
            ),
        },
    }
}

fn get_thousands_separator_formatter() -> &'static Formatter {
    static FORMATTER: OnceLock<Formatter> = OnceLock::new();

    FORMATTER.get_or_init(|| {
        Formatter::new()
            .separator(',')
            .unwrap_or_else(|error| {
                tracing::error!("could not set thousands separator: {error}");
                Formatter::new()
            })
            .precision(Precision::Decimals(0))
    })
}

async fn parse_multipart_field(field: Field<'_>) -> Result<String, Error> {
    if field.content_type() != Some("text/csv") {
        return Err(Error::NotCSV);
    }

    let file_name = match field.file_name() {
        Some(file_name) => file_name.to_owned(),
        None => {
            tracing::error!("Could not get file name from multipart form field: {field:#?}");
            return Err(Error::MultipartError(
                "Could not get file name from multipart form field".to_owned(),
            ));
        }
    };
    let data = match field.text().await {
        Ok(data) => data,
        Err(error) => {
            tracing::error!("Could not read data from multipart form field: {error}");
            return Err(Error::MultipartError(
                "Could not read data from multipart form field.".to_owned(),
            ));
        }
    };

    tracing::debug!("Received file '{}' that is {} bytes", file_name, data.len());

    Ok(data)
}
