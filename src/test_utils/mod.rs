#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;
pub(crate) mod transactions;

pub(crate) use form::{
    assert_form_input_with_value, assert_form_submit_button, assert_hx_endpoint, must_get_form,
    must_get_form_by_id,
};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment};
pub(crate) use http::{assert_content_type, assert_status_ok, get_header};
pub(crate) use transactions::{coffee_and_salary_store, test_state};
