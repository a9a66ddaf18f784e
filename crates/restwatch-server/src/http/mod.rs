//! Transport-facing abstractions the instrumentation layer is written against.
//!
//! A `Handler` takes an `HttpRequest` and writes its answer into a
//! `ResponseSink`. The axum adapter in `router` turns these into real HTTP
//! traffic through `StreamingResponse`; `BufferedResponse` runs a handler
//! without a connection.

mod buffered;
mod request;
mod streaming;

use std::io;

use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode};

pub use buffered::BufferedResponse;
pub use request::HttpRequest;
pub use streaming::{ResponseHead, StreamingResponse};

/// Where a handler writes status, headers and body.
///
/// Sink rules: only the first `write_status` is effective, and a body
/// write with no prior status commits `200 OK`.
pub trait ResponseSink: Send {
    fn headers(&self) -> &HeaderMap;
    fn headers_mut(&mut self) -> &mut HeaderMap;
    fn write_status(&mut self, status: StatusCode);
    /// Write part of the body; returns how many bytes were accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Complete the response. Later writes fail.
    fn finish(&mut self) {}
}

/// Anything that can answer a request.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn serve(&self, req: &HttpRequest, sink: &mut dyn ResponseSink);

    /// Route template this request resolves to, if the handler knows it.
    fn route(&self, _req: &HttpRequest) -> Option<&'static str> {
        None
    }
}

/// Write the whole buffer, retrying short writes.
pub fn write_all(sink: &mut dyn ResponseSink, mut buf: &[u8]) -> io::Result<()> {
    while !buf.is_empty() {
        match sink.write(buf) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "response sink accepted no bytes",
                ))
            }
            Ok(n) => buf = &buf[n..],
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
