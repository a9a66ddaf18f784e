use std::convert::Infallible;
use std::io;

use axum::{
    body::Body,
    http::{HeaderMap, StatusCode},
};
use bytes::Bytes;
use futures_util::stream;
use tokio::sync::{mpsc, oneshot};

use super::ResponseSink;

/// Status line and headers, sent once when the response is committed.
pub type ResponseHead = (StatusCode, HeaderMap);

/// Sink that forwards every write to the connection as it happens.
///
/// The head goes out on the first `write_status`/`write` (or at `finish`),
/// body chunks follow through an unbounded channel. Header edits after the
/// head was committed are not sent.
pub struct StreamingResponse {
    headers: HeaderMap,
    head_tx: Option<oneshot::Sender<ResponseHead>>,
    body_tx: Option<mpsc::UnboundedSender<Bytes>>,
}

impl StreamingResponse {
    /// Create the sink plus the receiving halves: the head, and the body
    /// to hand to axum.
    pub fn channel() -> (Self, oneshot::Receiver<ResponseHead>, Body) {
        let (head_tx, head_rx) = oneshot::channel();
        let (body_tx, body_rx) = mpsc::unbounded_channel::<Bytes>();

        let chunks = stream::unfold(body_rx, |mut rx| async move {
            rx.recv().await.map(|chunk| (Ok::<_, Infallible>(chunk), rx))
        });

        let sink = Self {
            headers: HeaderMap::new(),
            head_tx: Some(head_tx),
            body_tx: Some(body_tx),
        };
        (sink, head_rx, Body::from_stream(chunks))
    }

    pub fn is_committed(&self) -> bool {
        self.head_tx.is_none()
    }

    fn commit(&mut self, status: StatusCode) {
        if let Some(tx) = self.head_tx.take() {
            // receiver gone means the connection is gone; writes will report it
            let _ = tx.send((status, self.headers.clone()));
        }
    }
}

impl ResponseSink for StreamingResponse {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.is_committed() {
            tracing::debug!(%status, "superfluous write_status ignored");
            return;
        }
        self.commit(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.commit(StatusCode::OK);
        let Some(tx) = &self.body_tx else {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "response already finished",
            ));
        };
        if buf.is_empty() {
            return Ok(0);
        }
        tx.send(Bytes::copy_from_slice(buf))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "client went away"))?;
        Ok(buf.len())
    }

    fn finish(&mut self) {
        self.commit(StatusCode::OK);
        self.body_tx = None;
    }
}

impl Drop for StreamingResponse {
    fn drop(&mut self) {
        // a panicking handler must not look like an empty 200
        if std::thread::panicking() {
            self.head_tx = None;
        }
        self.finish();
    }
}
