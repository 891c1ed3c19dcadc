//! Assertions shared by the handler and view tests.

#![allow(missing_docs)]

mod form;
mod html;
mod http;

pub(crate) use form::{
    assert_field_error, assert_form_input, assert_form_submit_button, assert_hx_endpoint,
    field_error_names, must_get_form,
};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment};
pub(crate) use http::{assert_content_type, assert_hx_redirect, assert_status_ok};
