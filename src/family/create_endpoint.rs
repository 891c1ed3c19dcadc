//! Defines the endpoint for adding a family.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints, family::create_page::add_family_form_view, ledger::add_family,
    timezone::local_now, validation::AddFamilyForm,
};

/// The state needed to add a family.
#[derive(Debug, Clone)]
pub struct AddFamilyState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AddFamilyState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for adding a family, redirects to the families view on success.
///
/// Invalid input re-renders the form with an error message for each invalid field.
pub async fn add_family_endpoint(
    State(state): State<AddFamilyState>,
    Form(form): Form<AddFamilyForm>,
) -> Response {
    let new_family = match form.validate() {
        Ok(new_family) => new_family,
        Err(errors) => {
            tracing::debug!("Rejected family form {form:?}: {errors}");
            return add_family_form_view(&form, &errors).into_response();
        }
    };

    let now = match local_now(&state.local_timezone) {
        Ok(now) => now,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match add_family(new_family, now, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::FAMILIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not add family with {form:?}: {error}");
            error.into_alert_response()
        }
    }
}
