//! `302 Found` redirects.
//!
//! SAML2 consumers expect plain 302s across the handshake, while axum's
//! `Redirect::to` answers 303.

use axum::{
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

/// Redirect with `302 Found` to `location`.
///
/// Bytes that cannot appear in a header value are percent-encoded.
pub fn found(location: &str) -> Response {
    let value = HeaderValue::from_str(location).unwrap_or_else(|_| {
        HeaderValue::from_str(&encode_unsafe(location)).unwrap_or(HeaderValue::from_static("/"))
    });
    (StatusCode::FOUND, [(LOCATION, value)]).into_response()
}

fn encode_unsafe(location: &str) -> String {
    let mut out = String::with_capacity(location.len());
    for byte in location.bytes() {
        if (0x21..=0x7e).contains(&byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
