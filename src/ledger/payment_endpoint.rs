//! Defines the endpoint for recording a payment from a family.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::FamilyId,
    endpoints::{self, format_endpoint},
    family::payment_form_view,
    ledger::record_payment,
    timezone::local_now,
    validation::PaymentForm,
};

/// The state needed to record a payment.
#[derive(Debug, Clone)]
pub struct RecordPaymentState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RecordPaymentState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for recording a payment, redirects to the family's page on success.
pub async fn record_payment_endpoint(
    State(state): State<RecordPaymentState>,
    Path(family_id): Path<FamilyId>,
    Form(form): Form<PaymentForm>,
) -> Response {
    let amount = match form.validate() {
        Ok(amount) => amount,
        Err(errors) => {
            tracing::debug!("Rejected payment form {form:?} for family {family_id}: {errors}");
            return payment_form_view(family_id, &form, &errors).into_response();
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

    match record_payment(family_id, amount, now, &connection) {
        Ok(_) => (
            HxRedirect(format_endpoint(endpoints::FAMILY_VIEW, family_id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingFamily) => {
            tracing::warn!("Tried to record a payment for missing family {family_id}");
            Error::UpdateMissingFamily.into_alert_response()
        }
        Err(error) => {
            tracing::error!("Could not record payment for family {family_id}: {error}");
            error.into_alert_response()
        }
    }
}
