use std::io;

use axum::http::{HeaderMap, StatusCode};

use crate::http::ResponseSink;

/// What passed through one `ResponseRecorder`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallStats {
    status: Option<StatusCode>,
    bytes_written: u64,
}

impl CallStats {
    /// Captured status, `0` while nothing has been written.
    pub fn status_code(&self) -> u16 {
        self.status.map(|s| s.as_u16()).unwrap_or(0)
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    fn record_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }
}

/// Pass-through sink that remembers the status and body size.
///
/// Never buffers: every call reaches the wrapped sink immediately.
pub struct ResponseRecorder<'a> {
    inner: &'a mut dyn ResponseSink,
    stats: CallStats,
}

impl<'a> ResponseRecorder<'a> {
    pub fn new(inner: &'a mut dyn ResponseSink) -> Self {
        Self {
            inner,
            stats: CallStats::default(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.stats.status_code()
    }

    pub fn response_size(&self) -> u64 {
        self.stats.bytes_written()
    }

    pub fn stats(&self) -> CallStats {
        self.stats
    }
}

impl ResponseSink for ResponseRecorder<'_> {
    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_status(&mut self, status: StatusCode) {
        self.inner.write_status(status);
        self.stats.record_status(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // the sink commits 200 on the first body write
        self.stats.record_status(StatusCode::OK);
        let n = self.inner.write(buf)?;
        self.stats.bytes_written += n as u64;
        Ok(n)
    }

    fn finish(&mut self) {
        self.inner.finish();
    }
}
