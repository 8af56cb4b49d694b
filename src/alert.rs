//! Alert system for displaying success and error messages to users.
//!
//! Alerts are swapped into the `#alert-container` element of the base page
//! by HTMX, either as the normal response or as the error target.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

/// An alert message with styling determined by the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A green alert with a message and some details.
    Success {
        /// The headline of the alert.
        message: String,
        /// Extra information shown below the headline.
        details: String,
    },
    /// A red alert with a message and some details.
    Error {
        /// The headline of the alert.
        message: String,
        /// Extra information shown below the headline.
        details: String,
    },
    /// A red alert with only a message.
    ErrorSimple {
        /// The headline of the alert.
        message: String,
    },
}

impl Alert {
    /// Render the alert as an out-of-band swap for the alert container.
    pub fn into_markup(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::Success { message, details } => (
                "text-green-800 border-green-300 bg-green-50 \
                dark:bg-gray-800 dark:text-green-400 dark:border-green-800",
                message,
                details,
            ),
            Alert::Error { message, details } => (
                "text-red-800 border-red-300 bg-red-50 \
                dark:bg-gray-800 dark:text-red-400 dark:border-red-800",
                message,
                details,
            ),
            Alert::ErrorSimple { message } => (
                "text-red-800 border-red-300 bg-red-50 \
                dark:bg-gray-800 dark:text-red-400 dark:border-red-800",
                message,
                String::new(),
            ),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div
                    role="alert"
                    class={ "p-4 mb-4 text-sm border rounded " (container_style) }
                {
                    div class="flex items-start justify-between"
                    {
                        span class="font-medium" { (message) }

                        button
                            type="button"
                            aria-label="Close"
                            onclick="this.closest('#alert-container').classList.add('hidden')"
                            class="ms-3 font-bold"
                        {
                            "×"
                        }
                    }

                    @if !details.is_empty() {
                        p class="mt-1" { (details) }
                    }
                }
            }
        }
    }

    /// Render the alert as an HTML response body.
    pub fn into_html(self) -> Html<String> {
        Html(self.into_markup().into_string())
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        let status_code = match self {
            Alert::Success { .. } => StatusCode::OK,
            Alert::Error { .. } | Alert::ErrorSimple { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status_code, self.into_html()).into_response()
    }
}
