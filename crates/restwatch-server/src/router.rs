//! Axum wiring: every request goes through the instrumented handler.
//!
//! Axum only does transport here. The request body is read in full and
//! handed to the handler chain as an `HttpRequest`. The handler runs on its
//! own task writing into a `StreamingResponse`, so axum starts sending as
//! soon as the head is committed and the body closes when the wrapped
//! handler is done, before the access log and metrics are written.

use std::net::SocketAddr;

use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};

use crate::app_state::AppState;
use crate::http::{Handler, HttpRequest, StreamingResponse};

pub fn build_router(state: AppState) -> Router {
    Router::new().fallback(serve_http).with_state(state)
}

async fn serve_http(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    req: Request<Body>,
) -> Response {
    let (parts, body) = req.into_parts();
    let body = match to_bytes(body, state.cfg().server.max_body_bytes).await {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!(error = %e, "request body rejected");
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        }
    };

    let req = HttpRequest {
        method: parts.method,
        uri: parts.uri,
        version: parts.version,
        headers: parts.headers.into(),
        remote_addr: peer
            .map(|ConnectInfo(addr)| addr.to_string())
            .unwrap_or_default(),
        body,
        params: Vec::new(),
    };

    let (mut sink, head_rx, body) = StreamingResponse::channel();
    let handler = state.handler();
    tokio::spawn(async move {
        handler.serve(&req, &mut sink).await;
    });

    match head_rx.await {
        Ok((status, headers)) => {
            let mut res = Response::new(body);
            *res.status_mut() = status;
            *res.headers_mut() = headers;
            res
        }
        Err(_) => {
            tracing::error!("handler task ended without committing a response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
