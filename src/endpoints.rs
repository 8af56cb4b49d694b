//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}/ignore',
//! use [format_endpoint].

/// The root route which redirects to the transactions page.
pub const ROOT: &str = "/";
/// The page for searching and ignoring transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page with the monthly income and expense charts.
pub const VISUALIZATION_VIEW: &str = "/visualization";
/// The page for importing transactions from CSV files.
pub const IMPORT_VIEW: &str = "/import";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to ignore a single transaction.
pub const IGNORE_TRANSACTION: &str = "/api/transactions/{transaction_id}/ignore";
/// The route to stop ignoring a single transaction.
pub const UNIGNORE_TRANSACTION: &str = "/api/transactions/{transaction_id}/unignore";
/// The route to ignore every transaction matching a filter.
pub const IGNORE_FILTERED: &str = "/api/transactions/ignore";
/// The route to stop ignoring every transaction matching a filter.
pub const UNIGNORE_FILTERED: &str = "/api/transactions/unignore";
/// The route to save the current filter under a name.
pub const SAVED_FILTERS: &str = "/api/filters";
/// The route for the monthly totals as JSON.
pub const SUMMARY_API: &str = "/api/summary";
/// The route to upload CSV files for importing transactions.
pub const IMPORT: &str = "/api/import";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/transactions/{transaction_id}/ignore',
/// '{transaction_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: u64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::VISUALIZATION_VIEW);
        assert_endpoint_is_valid_uri(endpoints::IMPORT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::IGNORE_TRANSACTION, 1));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::UNIGNORE_TRANSACTION, 1));
        assert_endpoint_is_valid_uri(endpoints::IGNORE_FILTERED);
        assert_endpoint_is_valid_uri(endpoints::UNIGNORE_FILTERED);
        assert_endpoint_is_valid_uri(endpoints::SAVED_FILTERS);
        assert_endpoint_is_valid_uri(endpoints::SUMMARY_API);
        assert_endpoint_is_valid_uri(endpoints::IMPORT);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint(endpoints::IGNORE_TRANSACTION, 42);

        assert_eq!(formatted_path, "/api/transactions/42/ignore");
    }
}
