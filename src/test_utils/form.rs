use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let got = form
        .value()
        .attr(attribute)
        .unwrap_or_else(|| panic!("{attribute} attribute missing"));

    assert_eq!(
        got, endpoint,
        "want form with attribute {attribute}=\"{endpoint}\", got {got:?}"
    );
}

/// Assert that `form` has a required input called `name` of type `type_`.
#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    let selector = Selector::parse(&format!("input[name=\"{name}\"]")).unwrap();
    let input = form
        .select(&selector)
        .next()
        .unwrap_or_else(|| panic!("No input found with name \"{name}\""));

    let input_type = input.value().attr("type").unwrap_or_default();
    assert_eq!(
        input_type, type_,
        "want input {name} with type \"{type_}\", got {input_type:?}"
    );
    assert!(
        input.value().attr("required").is_some(),
        "want input with name {name} to have the required attribute but got none"
    );
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    let submit_button = form
        .select(&Selector::parse("button").unwrap())
        .next()
        .expect("No button found");

    assert_eq!(
        submit_button.value().attr("type").unwrap_or_default(),
        "submit",
        "want submit button with type=\"submit\""
    );
}

/// Assert that the error shown under the input `field` reads `want`.
#[track_caller]
pub(crate) fn assert_field_error(form: &ElementRef<'_>, field: &str, want: &str) {
    let selector = Selector::parse(&format!("[data-field-error=\"{field}\"]")).unwrap();
    let got = form
        .select(&selector)
        .next()
        .unwrap_or_else(|| panic!("No error message found for {field}"))
        .text()
        .collect::<String>();

    assert_eq!(want, got.trim());
}

/// The names of the fields that have an error message, in page order.
pub(crate) fn field_error_names(form: &ElementRef<'_>) -> Vec<String> {
    form.select(&Selector::parse("[data-field-error]").unwrap())
        .filter_map(|error| error.value().attr("data-field-error"))
        .map(str::to_owned)
        .collect()
}
