//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, error_page::ErrorPage};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create a family name.
    #[error("Family name cannot be empty")]
    EmptyFamilyName,

    /// A negative number was used for the land area of a family.
    #[error("Land area cannot be negative, got {0}")]
    NegativeLandArea(f64),

    /// A payment of zero or less was recorded.
    ///
    /// A negative payment would silently charge the family instead of
    /// crediting them, so it is rejected outright.
    #[error("Payment amount must be greater than zero, got {0}")]
    NonPositivePayment(f64),

    /// A periodic fee rate of zero or less was given.
    #[error("Rate per acre must be greater than zero, got {0}")]
    NonPositiveRate(f64),

    /// A number was NaN or infinite.
    #[error("{0} is not a finite number")]
    NonFiniteNumber(f64),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to change the balance of a family that does not exist.
    #[error("tried to update a family that is not in the database")]
    UpdateMissingFamily,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => ErrorPage::not_found().into_response(),
            Error::InvalidTimezoneError(timezone) => {
                ErrorPage::invalid_timezone(&timezone).into_response()
            }
            Error::DatabaseLockError => ErrorPage::internal().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                ErrorPage::internal().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Restart the server with \
                        a valid, canonical timezone name such as \"Asia/Kolkata\"."
                    ),
                },
            ),
            Error::DatabaseLockError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::ErrorSimple {
                    message: "The database is unavailable, try again later".to_owned(),
                },
            ),
            Error::NotFound | Error::UpdateMissingFamily => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not find family".to_owned(),
                    details: "The family could not be found. \
                    Go back to the family list and select the family again."
                        .to_owned(),
                },
            ),
            error @ (Error::EmptyFamilyName
            | Error::NegativeLandArea(_)
            | Error::NonPositivePayment(_)
            | Error::NonPositiveRate(_)
            | Error::NonFiniteNumber(_)) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid input".to_owned(),
                    details: error.to_string(),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
