//! Defines the route handler for the page that displays transactions as a table.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use axum_htmx::HxRequest;

use crate::{AppState, Error, timezone::current_local_date};

use super::{
    filter::{FilterQuery, FilteredViews},
    saved_filters::SavedFilters,
    store::TransactionStore,
    view::{TransactionsPage, transactions_content_view, transactions_view},
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The transactions to display.
    pub transaction_store: Arc<Mutex<TransactionStore>>,
    /// The filters listed above the table.
    pub saved_filters: Arc<Mutex<SavedFilters>>,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            transaction_store: state.transaction_store.clone(),
            saved_filters: state.saved_filters.clone(),
        }
    }
}

/// Render the transactions matching the filter in the query string.
///
/// HTMX requests only get the table and counts so the filter form keeps focus.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    HxRequest(is_htmx_request): HxRequest,
    Query(query): Query<FilterQuery>,
) -> Response {
    let filter = match query.into_filter() {
        Ok(filter) => filter,
        Err(error) if is_htmx_request => return error.into_alert_response(),
        Err(error) => return error.into_response(),
    };

    let today = match current_local_date(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_response(),
    };

    let store = match state.transaction_store.lock() {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not acquire transaction store lock: {error}");
            return Error::StoreLockError.into_response();
        }
    };

    let saved_filters = match state.saved_filters.lock() {
        Ok(saved_filters) => saved_filters,
        Err(error) => {
            tracing::error!("could not acquire saved filters lock: {error}");
            return Error::StoreLockError.into_response();
        }
    };

    let views = FilteredViews::new(store.all(), &filter);
    // Scheduled payments can be dated after today.
    let latest_date = store
        .date_bounds()
        .map_or(today, |(_, newest)| newest.max(today));

    if is_htmx_request {
        return transactions_content_view(&filter, &views, store.len()).into_response();
    }

    transactions_view(&TransactionsPage {
        filter: &filter,
        views: &views,
        total_count: store.len(),
        saved_filters: saved_filters.as_slice(),
        latest_date,
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Query, State},
        http::StatusCode,
    };
    use axum_htmx::HxRequest;
    use scraper::Selector;

    use time::macros::date;

    use crate::{
        Transaction,
        test_utils::{
            assert_content_type, assert_status_ok, assert_valid_html, coffee_and_salary_store,
            parse_html_document, parse_html_fragment, test_state,
        },
        transaction::FilterQuery,
    };

    use super::{TransactionsViewState, get_transactions_page};

    fn get_state() -> TransactionsViewState {
        let state = test_state(coffee_and_salary_store());

        TransactionsViewState {
            local_timezone: state.local_timezone,
            transaction_store: state.transaction_store,
            saved_filters: state.saved_filters,
        }
    }

    fn row_count(html: &scraper::Html) -> usize {
        html.select(&Selector::parse("tbody tr[id^='transaction-']").unwrap())
            .count()
    }

    #[tokio::test]
    async fn renders_all_transactions_without_filter() {
        let response = get_transactions_page(
            State(get_state()),
            HxRequest(false),
            Query(FilterQuery::default()),
        )
        .await;

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(row_count(&html), 3);
    }

    #[tokio::test]
    async fn htmx_request_gets_filtered_partial() {
        let query = FilterQuery {
            filter: Some("cof".to_owned()),
            ..Default::default()
        };

        let response =
            get_transactions_page(State(get_state()), HxRequest(true), Query(query)).await;

        assert_status_ok(&response);
        let html = parse_html_fragment(response).await;
        assert!(
            html.select(&Selector::parse("nav").unwrap())
                .next()
                .is_none(),
            "partial should not include the navigation bar"
        );
        assert_eq!(row_count(&html), 1);
    }

    #[tokio::test]
    async fn date_inputs_reach_future_transactions() {
        let mut store = coffee_and_salary_store();
        store.insert_all(vec![Transaction::build(
            -120.0,
            date!(2999 - 01 - 01),
            "insurance",
        )]);
        let state = test_state(store);
        let state = TransactionsViewState {
            local_timezone: state.local_timezone,
            transaction_store: state.transaction_store,
            saved_filters: state.saved_filters,
        };

        let response = get_transactions_page(
            State(state),
            HxRequest(false),
            Query(FilterQuery::default()),
        )
        .await;

        let html = parse_html_document(response).await;
        for id in ["min_date", "max_date"] {
            let input = html
                .select(&Selector::parse(&format!("input#{id}")).unwrap())
                .next()
                .unwrap_or_else(|| panic!("{id} input missing"));
            assert_eq!(input.value().attr("max"), Some("2999-01-01"));
        }
    }

    #[tokio::test]
    async fn malformed_date_is_bad_request() {
        let query = FilterQuery {
            min_date: Some("yesterday".to_owned()),
            ..Default::default()
        };

        let response =
            get_transactions_page(State(get_state()), HxRequest(false), Query(query)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
