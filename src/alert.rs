//! Alert messages for reporting a failed form submission.
//!
//! Alerts are swapped into the `#alert-container` element in
//! [base](crate::html::base) via htmx's `hx-target-error` attribute.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// An alert message to display to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Error { message: String, details: String },
    ErrorSimple { message: String },
}

const ERROR_ALERT_STYLE: &str = "flex items-start justify-between p-4 mb-4 text-sm \
    border rounded-lg text-red-800 border-red-300 bg-red-50 dark:bg-gray-800 \
    dark:text-red-400 dark:border-red-800";

impl Alert {
    pub fn into_html(self) -> Markup {
        let (message, details) = match self {
            Alert::Error { message, details } => (message, details),
            Alert::ErrorSimple { message } => (message, String::new()),
        };

        // Template adapted from https://flowbite.com/docs/components/alerts/
        html!(
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div
                    role="alert"
                    class=(ERROR_ALERT_STYLE)
                {
                    div
                    {
                        span class="font-medium" { (message) }

                        @if !details.is_empty() {
                            p class="mt-1" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Close"
                        class="ms-4 font-bold"
                        onclick="this.closest('#alert-container').classList.add('hidden')"
                    {
                        "×"
                    }
                }
            }
        )
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}
