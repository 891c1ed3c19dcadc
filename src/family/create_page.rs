//! Defines the route handler for the page for adding a family.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FieldAttributes, base, form_field,
        loading_spinner, rupee_input_styles,
    },
    navigation::NavBar,
    validation::{AddFamilyForm, ValidationErrors},
};

/// Renders the page for adding a family.
pub async fn get_add_family_page() -> Response {
    add_family_view().into_response()
}

fn add_family_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_FAMILY_VIEW).into_html();
    let form = add_family_form_view(&AddFamilyForm::default(), &ValidationErrors::default());

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Add Family", &[rupee_input_styles()], &content)
}

/// The form for adding a family, filled with the values in `form`.
///
/// Fields with an entry in `errors` show the error message below the input.
pub(crate) fn add_family_form_view(form: &AddFamilyForm, errors: &ValidationErrors) -> Markup {
    let spinner = loading_spinner();

    html! {
        form
            hx-post=(endpoints::FAMILIES_API)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            h2 class="text-xl font-bold" { "Add Family" }

            (form_field(
                "name",
                "Family Name",
                &form.name,
                errors.get("name"),
                FieldAttributes {
                    placeholder: "Family Name",
                    required: true,
                    autofocus: true,
                    ..Default::default()
                },
            ))

            (form_field(
                "land_area",
                "Land Area (acres)",
                &form.land_area,
                errors.get("land_area"),
                FieldAttributes {
                    placeholder: "0.0",
                    required: true,
                    numeric: true,
                    ..Default::default()
                },
            ))

            (form_field(
                "opening_due",
                "Opening Balance (optional)",
                &form.opening_due,
                errors.get("opening_due"),
                FieldAttributes {
                    placeholder: "0.00",
                    numeric: true,
                    currency: true,
                    ..Default::default()
                },
            ))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="inline htmx-indicator" { (spinner) }
                " Add Family"
            }
        }
    }
}
