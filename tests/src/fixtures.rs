//! Test fixtures and payload builders.

use serde_json::{json, Map, Value};

pub const CHROME_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const FIREFOX_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
pub const EDGE_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Edge/119.0";

/// A typical contact form that passes validation.
pub fn contact_form() -> Value {
    json!({
        "name": "Jo Smith",
        "email": "jo@example.com",
        "subject": "Hello",
        "message": "Line one\nLine two"
    })
}

/// Wrap form data in a submit request body.
pub fn submit_body(form_data: Value) -> Value {
    json!({ "form_data": form_data })
}

/// Submit request body with a form id.
pub fn submit_body_with_form(form_data: Value, form_id: &str) -> Value {
    json!({ "form_data": form_data, "form_id": form_id })
}

/// A contact form submit body as raw bytes.
pub fn contact_payload() -> String {
    submit_body(contact_form()).to_string()
}

/// Form data with `n` plain text fields.
pub fn many_fields(n: usize) -> Value {
    let fields: Map<String, Value> = (0..n)
        .map(|i| (format!("field_{i}"), json!("value")))
        .collect();
    Value::Object(fields)
}
