use std::io;

use axum::{
    body::Body,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use bytes::BytesMut;

use super::ResponseSink;

/// Sink that collects the whole response before handing it to axum.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
    limit: Option<usize>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept at most `limit` body bytes; writes past it come up short and
    /// then fail with `WriteZero`.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Status that will be sent; `200` once anything was written.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_response(self) -> Response {
        let mut res = Response::new(Body::from(self.body.freeze()));
        *res.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *res.headers_mut() = self.headers;
        res
    }
}

impl ResponseSink for BufferedResponse {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        } else {
            tracing::debug!(%status, "superfluous write_status ignored");
        }
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        let n = match self.limit {
            Some(limit) => {
                let room = limit.saturating_sub(self.body.len());
                if room == 0 && !buf.is_empty() {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "response body limit reached",
                    ));
                }
                room.min(buf.len())
            }
            None => buf.len(),
        };
        self.body.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}
