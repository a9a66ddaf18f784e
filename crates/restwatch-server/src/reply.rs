//! Response helpers: JSON bodies and the JSON error envelope.

use std::io;

use axum::http::{header, HeaderValue, StatusCode};
use serde::Serialize;
use serde_json::json;

use crate::http::{write_all, ResponseSink};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Write `body` with the given status and content type.
pub fn bytes(
    sink: &mut dyn ResponseSink,
    status: StatusCode,
    content_type: &'static str,
    body: &[u8],
) -> io::Result<()> {
    sink.headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    sink.write_status(status);
    write_all(sink, body)
}

/// Serialize `value` as the JSON response body.
pub fn json<T: Serialize + ?Sized>(
    sink: &mut dyn ResponseSink,
    status: StatusCode,
    value: &T,
) -> io::Result<()> {
    let body = serde_json::to_vec(value).map_err(io::Error::other)?;
    bytes(sink, status, JSON_CONTENT_TYPE, &body)
}

/// Send `{"httpStatus": <code>, "error": "<msg>"}` and log the error.
pub fn error(sink: &mut dyn ResponseSink, status: StatusCode, msg: &str) {
    tracing::error!(status = status.as_u16(), error = %msg, "request failed");

    let envelope = json!({
        "httpStatus": status.as_u16(),
        "error": msg,
    });
    sink.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    if let Err(e) = json(sink, status, &envelope) {
        tracing::debug!(error = %e, "error envelope write failed");
    }
}
