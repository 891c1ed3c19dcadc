//! The page and endpoint for charging a periodic fee to every family.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    family::count_families,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FieldAttributes, base, form_field,
        loading_spinner, rupee_input_styles,
    },
    ledger::apply_periodic_fee,
    navigation::NavBar,
    timezone::local_now,
    validation::{PeriodicFeeForm, ValidationErrors},
};

/// The state needed for the collection page and endpoint.
#[derive(Debug, Clone)]
pub struct CollectionState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CollectionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for charging a periodic fee.
pub async fn get_new_collection_page(
    State(state): State<CollectionState>,
) -> Result<Response, Error> {
    let family_count = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        count_families(&connection)
            .inspect_err(|error| tracing::error!("could not count families: {error}"))?
    };

    Ok(new_collection_view(family_count).into_response())
}

fn new_collection_view(family_count: u32) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_COLLECTION_VIEW).into_html();
    let form = collection_form_view(&PeriodicFeeForm::default(), &ValidationErrors::default());

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            p class="w-full mb-4 text-sm text-gray-600 dark:text-gray-400"
            {
                "The fee is charged to all " (family_count) " families, "
                "in proportion to the land they hold. Families without land are not charged."
            }

            (form)
        }
    };

    base("New Collection", &[rupee_input_styles()], &content)
}

fn collection_form_view(form: &PeriodicFeeForm, errors: &ValidationErrors) -> Markup {
    let spinner = loading_spinner();

    html! {
        form
            hx-post=(endpoints::COLLECTIONS_API)
            hx-confirm="Add periodic fee to ALL families?"
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            h2 class="text-xl font-bold" { "New Collection" }

            (form_field(
                "rate",
                "Rate per Acre",
                &form.rate,
                errors.get("rate"),
                FieldAttributes {
                    placeholder: "0.00",
                    required: true,
                    autofocus: true,
                    numeric: true,
                    currency: true,
                },
            ))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="inline htmx-indicator" { (spinner) }
                " Apply to All Families"
            }
        }
    }
}

/// A route handler for charging a periodic fee, redirects to the families view on success.
pub async fn create_collection_endpoint(
    State(state): State<CollectionState>,
    Form(form): Form<PeriodicFeeForm>,
) -> Response {
    let rate = match form.validate() {
        Ok(rate) => rate,
        Err(errors) => {
            tracing::debug!("Rejected periodic fee form {form:?}: {errors}");
            return collection_form_view(&form, &errors).into_response();
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

    match apply_periodic_fee(rate, now, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::FAMILIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not apply a periodic fee of {rate}/acre: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod new_collection_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        db::initialize,
        endpoints,
        ledger::collection::{CollectionState, get_new_collection_page},
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_status_ok,
            assert_valid_html, must_get_form, parse_html_document,
        },
    };

    #[tokio::test]
    async fn render_page() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let state = CollectionState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = get_new_collection_page(State(state)).await.unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::COLLECTIONS_API, "hx-post");
        assert_eq!(
            form.value().attr("hx-confirm"),
            Some("Add periodic fee to ALL families?")
        );
        assert_form_input(&form, "rate", "text");
        assert_form_submit_button(&form);
        let intro = html
            .select(&Selector::parse("p").unwrap())
            .next()
            .unwrap()
            .text()
            .collect::<String>();
        assert!(intro.contains("all 0 families"), "got {intro:?}");
    }
}
