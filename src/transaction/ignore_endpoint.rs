//! Route handlers for ignoring transactions and bringing them back.
//!
//! Ignored transactions stay in the store and on the transactions page, but
//! are left out of the totals and charts.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::html;

use crate::{AppState, Error, endpoints, navigation::NavBar};

use super::{
    core::TransactionId,
    filter::{FilterQuery, FilteredViews},
    store::TransactionStore,
    view::{transaction_counts_view, transaction_row_view, transactions_content_view},
};

/// The state needed to ignore or unignore transactions.
#[derive(Debug, Clone)]
pub struct IgnoreState {
    /// The store holding the ignored flags.
    pub transaction_store: Arc<Mutex<TransactionStore>>,
}

impl FromRef<AppState> for IgnoreState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// A route handler for ignoring a single transaction.
///
/// Responds with the updated table row, plus the counts and navigation bar
/// as out-of-band swaps. The form carries the filter of the page the row is on.
pub async fn ignore_transaction_endpoint(
    State(state): State<IgnoreState>,
    Path(transaction_id): Path<TransactionId>,
    Form(query): Form<FilterQuery>,
) -> Response {
    set_ignored(state, transaction_id, true, query)
}

/// A route handler for unignoring a single transaction.
///
/// See [ignore_transaction_endpoint] for the response.
pub async fn unignore_transaction_endpoint(
    State(state): State<IgnoreState>,
    Path(transaction_id): Path<TransactionId>,
    Form(query): Form<FilterQuery>,
) -> Response {
    set_ignored(state, transaction_id, false, query)
}

/// A route handler that ignores every transaction matching the filter in the form.
///
/// Responds with the refreshed transactions table.
pub async fn ignore_filtered_endpoint(
    State(state): State<IgnoreState>,
    Form(query): Form<FilterQuery>,
) -> Response {
    set_filtered_ignored(state, true, query)
}

/// A route handler that unignores every transaction matching the filter in the form.
pub async fn unignore_filtered_endpoint(
    State(state): State<IgnoreState>,
    Form(query): Form<FilterQuery>,
) -> Response {
    set_filtered_ignored(state, false, query)
}

fn set_ignored(
    state: IgnoreState,
    transaction_id: TransactionId,
    ignored: bool,
    query: FilterQuery,
) -> Response {
    let filter = match query.into_filter() {
        Ok(filter) => filter,
        Err(error) => return error.into_alert_response(),
    };

    let mut store = match state.transaction_store.lock() {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not acquire transaction store lock: {error}");
            return Error::StoreLockError.into_alert_response();
        }
    };

    let row = match store.set_ignored(transaction_id, ignored) {
        Ok(transaction) => transaction_row_view(transaction),
        Err(error) => {
            tracing::debug!("could not set ignored flag on transaction {transaction_id}: {error}");
            return error.into_alert_response();
        }
    };

    tracing::info!("set ignored={ignored} on transaction {transaction_id}");

    let views = FilteredViews::new(store.all(), &filter);
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW, !views.active.is_empty())
        .swap_oob()
        .into_html();

    html! {
        (row)
        (transaction_counts_view(&views, store.len(), true))
        (nav_bar)
    }
    .into_response()
}

fn set_filtered_ignored(state: IgnoreState, ignored: bool, query: FilterQuery) -> Response {
    let filter = match query.into_filter() {
        Ok(filter) => filter,
        Err(error) => return error.into_alert_response(),
    };

    let mut store = match state.transaction_store.lock() {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not acquire transaction store lock: {error}");
            return Error::StoreLockError.into_alert_response();
        }
    };

    let ids: Vec<TransactionId> = store
        .all()
        .iter()
        .filter(|transaction| filter.matches(transaction))
        .map(|transaction| transaction.id)
        .collect();

    let changed = if ignored {
        store.ignore(&ids)
    } else {
        store.unignore(&ids)
    };

    tracing::info!(
        "set ignored={ignored} on {changed} of {} filtered transactions",
        ids.len()
    );

    let views = FilteredViews::new(store.all(), &filter);
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW, !views.active.is_empty())
        .swap_oob()
        .into_html();

    html! {
        (transactions_content_view(&filter, &views, store.len()))
        (nav_bar)
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use scraper::Selector;

    use crate::{
        test_utils::{assert_status_ok, coffee_and_salary_store, parse_html_fragment},
        transaction::{FilterQuery, TransactionStore},
    };

    use super::{
        IgnoreState, ignore_filtered_endpoint, ignore_transaction_endpoint,
        unignore_filtered_endpoint, unignore_transaction_endpoint,
    };

    fn get_state() -> IgnoreState {
        IgnoreState {
            transaction_store: Arc::new(Mutex::new(coffee_and_salary_store())),
        }
    }

    fn active_memos(store: &Arc<Mutex<TransactionStore>>) -> Vec<String> {
        store
            .lock()
            .unwrap()
            .active()
            .iter()
            .map(|transaction| transaction.memo.clone())
            .collect()
    }

    #[tokio::test]
    async fn ignoring_coffee_leaves_other_transactions_active() {
        let state = get_state();

        let response = ignore_transaction_endpoint(
            State(state.clone()),
            Path(1),
            Form(FilterQuery::default()),
        )
        .await;

        assert_status_ok(&response);
        assert_eq!(active_memos(&state.transaction_store), vec!["salary", "rent"]);
        let html = parse_html_fragment(response).await;
        let counts = html
            .select(&Selector::parse("#transaction-counts").unwrap())
            .next()
            .expect("counts missing");
        assert_eq!(counts.value().attr("hx-swap-oob"), Some("true"));
        assert!(
            counts
                .text()
                .collect::<String>()
                .contains("(1 ignored)")
        );
    }

    #[tokio::test]
    async fn unignore_restores_transaction() {
        let state = get_state();
        ignore_transaction_endpoint(State(state.clone()), Path(1), Form(FilterQuery::default()))
            .await;

        let response = unignore_transaction_endpoint(
            State(state.clone()),
            Path(1),
            Form(FilterQuery::default()),
        )
        .await;

        assert_status_ok(&response);
        assert_eq!(
            active_memos(&state.transaction_store),
            vec!["coffee", "salary", "rent"]
        );
    }

    #[tokio::test]
    async fn ignoring_unknown_transaction_is_not_found() {
        let response = ignore_transaction_endpoint(
            State(get_state()),
            Path(999),
            Form(FilterQuery::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ignore_filtered_only_touches_matching_transactions() {
        let state = get_state();
        let query = FilterQuery {
            filter: Some("o".to_owned()),
            min_date: Some("2024-01-01".to_owned()),
            max_date: Some("2024-01-31".to_owned()),
        };

        let response = ignore_filtered_endpoint(State(state.clone()), Form(query)).await;

        assert_status_ok(&response);
        // "coffee" and "Work" both contain an "o", rent is outside the range.
        assert_eq!(active_memos(&state.transaction_store), vec!["rent"]);
    }

    #[tokio::test]
    async fn ignore_filtered_twice_is_idempotent() {
        let state = get_state();
        let query = FilterQuery {
            filter: Some("rent".to_owned()),
            ..Default::default()
        };

        ignore_filtered_endpoint(State(state.clone()), Form(query.clone())).await;
        let response = ignore_filtered_endpoint(State(state.clone()), Form(query)).await;

        assert_status_ok(&response);
        assert_eq!(
            active_memos(&state.transaction_store),
            vec!["coffee", "salary"]
        );
    }

    #[tokio::test]
    async fn unignore_filtered_restores_everything() {
        let state = get_state();
        ignore_filtered_endpoint(State(state.clone()), Form(FilterQuery::default())).await;
        assert!(active_memos(&state.transaction_store).is_empty());

        let response =
            unignore_filtered_endpoint(State(state.clone()), Form(FilterQuery::default())).await;

        assert_status_ok(&response);
        assert_eq!(active_memos(&state.transaction_store).len(), 3);
        let html = parse_html_fragment(response).await;
        assert_eq!(
            html.select(&Selector::parse("tbody tr[data-ignored='false']").unwrap())
                .count(),
            3
        );
    }

    #[tokio::test]
    async fn malformed_date_is_bad_request() {
        let query = FilterQuery {
            max_date: Some("31/01/2024".to_owned()),
            ..Default::default()
        };

        let response = ignore_filtered_endpoint(State(get_state()), Form(query)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
