//! Full pages shown when a request cannot be served.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// A page explaining what went wrong and what the user can do about it.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPage {
    status: StatusCode,
    title: &'static str,
    description: String,
    fix: String,
}

impl ErrorPage {
    /// A route or family that does not exist.
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            title: "Not Found",
            description: "Something's missing.".to_owned(),
            fix: "Sorry, we can't find that page. Check the address or go back to the family list."
                .to_owned(),
        }
    }

    /// An error the user cannot fix themselves.
    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            title: "Internal Server Error",
            description: "Sorry, something went wrong.".to_owned(),
            fix: "Try again later or check the server logs".to_owned(),
        }
    }

    /// The server was started with a timezone that `time-tz` does not know.
    pub fn invalid_timezone(timezone: &str) -> Self {
        Self {
            description: "Invalid Timezone Settings".to_owned(),
            fix: format!(
                "Could not get local timezone \"{timezone}\". Restart the server with \
                a valid, canonical timezone name such as \"Asia/Kolkata\"."
            ),
            ..Self::internal()
        }
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        let page = error_view(
            self.title,
            self.status.as_str(),
            &self.description,
            &self.fix,
        );

        (self.status, Html(page.into_string())).into_response()
    }
}

/// The fallback handler for routes that do not exist.
pub async fn get_404_not_found() -> Response {
    ErrorPage::not_found().into_response()
}
