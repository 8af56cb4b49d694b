//! Application router configuration.

use std::path::Path;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    csv_import::{get_import_page, import_transactions},
    endpoints,
    not_found::get_404_not_found,
    transaction::{
        get_transactions_page, ignore_filtered_endpoint, ignore_transaction_endpoint,
        save_filter_endpoint, unignore_filtered_endpoint, unignore_transaction_endpoint,
    },
    visualization::{get_summary, get_visualization_page},
};

/// Return a router with all the app's routes.
///
/// Files under `static_dir` are served from [endpoints::STATIC].
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::VISUALIZATION_VIEW, get(get_visualization_page))
        .route(endpoints::IMPORT_VIEW, get(get_import_page))
        .route(
            endpoints::IGNORE_TRANSACTION,
            post(ignore_transaction_endpoint),
        )
        .route(
            endpoints::UNIGNORE_TRANSACTION,
            post(unignore_transaction_endpoint),
        )
        .route(endpoints::IGNORE_FILTERED, post(ignore_filtered_endpoint))
        .route(endpoints::UNIGNORE_FILTERED, post(unignore_filtered_endpoint))
        .route(endpoints::SAVED_FILTERS, post(save_filter_endpoint))
        .route(endpoints::SUMMARY_API, get(get_summary))
        .route(endpoints::IMPORT, post(import_transactions))
        .nest_service(endpoints::STATIC, ServeDir::new(static_dir))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the transactions page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::TRANSACTIONS_VIEW)
}


#[cfg(test)]
mod router_tests {
    use std::path::Path;

    use axum_test::TestServer;
    use serde_json::Value;

    use crate::{
        endpoints::{self, format_endpoint},
        routing::build_router,
        test_utils::{coffee_and_salary_store, test_state},
    };

    fn get_test_server() -> TestServer {
        let app = build_router(test_state(coffee_and_salary_store()), Path::new("static/"));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn serves_transactions_page() {
        let server = get_test_server();

        let response = server.get(endpoints::TRANSACTIONS_VIEW).await;

        response.assert_status_ok();
        assert!(response.text().contains("coffee"));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server
            .get("/definitely/not/a/page")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn summary_reflects_ignored_transactions() {
        let server = get_test_server();

        server
            .post(&format_endpoint(endpoints::IGNORE_TRANSACTION, 1))
            .form(&[("filter", "")])
            .await
            .assert_status_ok();

        let summary: Value = server
            .get(endpoints::SUMMARY_API)
            .add_query_param("group_by", "category")
            .await
            .json();

        assert_eq!(summary["group_by"], "category");
        assert_eq!(summary["transaction_count"], 2);
    }
}
