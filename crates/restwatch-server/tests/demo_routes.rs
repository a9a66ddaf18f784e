//! Demo endpoints served through the full instrumented chain.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::http::{header, Method, StatusCode, Uri};
use serde_json::Value as Json;

use restwatch_core::metrics::Registry;
use restwatch_server::app_state::AppState;
use restwatch_server::config::RestwatchConfig;
use restwatch_server::http::{BufferedResponse, Handler, HttpRequest, ResponseSink};

fn state() -> AppState {
    AppState::new(RestwatchConfig::default(), Arc::new(Registry::new())).unwrap()
}

async fn call(state: &AppState, method: Method, path: &str) -> BufferedResponse {
    let req = HttpRequest::new(method, path.parse::<Uri>().unwrap())
        .with_remote_addr("127.0.0.1:4000");
    let mut sink = BufferedResponse::new();
    state.handler().serve(&req, &mut sink).await;
    sink
}

fn json(sink: &BufferedResponse) -> Json {
    serde_json::from_slice(sink.body()).unwrap()
}

#[tokio::test]
async fn list_users() {
    let s = state();
    let res = call(&s, Method::GET, "/users").await;
    assert_eq!(res.status(), Some(StatusCode::OK));
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json; charset=utf-8"
    );
    let body = json(&res);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 3);
    assert_eq!(users[0]["firstName"], "Tom");
    assert_eq!(users[2]["secondName"], "Chanel");
    assert_eq!(users[1]["birthDate"], "1956-01-14T00:00:00Z");
}

#[tokio::test]
async fn get_user_and_missing_user() {
    let s = state();
    let res = call(&s, Method::GET, "/users/2").await;
    assert_eq!(res.status(), Some(StatusCode::OK));
    assert_eq!(json(&res)["firstName"], "Tommy");

    let res = call(&s, Method::GET, "/users/42").await;
    assert_eq!(res.status(), Some(StatusCode::NOT_FOUND));
    let body = json(&res);
    assert_eq!(body["httpStatus"], 404);
    assert_eq!(body["error"], "can't find user with ID: 42");

    let res = call(&s, Method::GET, "/users/").await;
    assert_eq!(res.status(), Some(StatusCode::BAD_REQUEST));
    assert_eq!(json(&res)["error"], "please provide User id");

    let h = s.instrumented();
    assert_eq!(h.requests().get(&["200", "GET", "/users/{id}"]).unwrap(), 1);
    assert_eq!(h.requests().get(&["404", "GET", "/users/{id}"]).unwrap(), 1);
    assert_eq!(h.requests().get(&["400", "GET", "/users/{id}"]).unwrap(), 1);
}

#[tokio::test]
async fn error_route_and_unknown_paths() {
    let s = state();
    let res = call(&s, Method::GET, "/error").await;
    assert_eq!(res.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(json(&res)["error"], "some error");

    let res = call(&s, Method::GET, "/nope").await;
    assert_eq!(res.status(), Some(StatusCode::NOT_FOUND));

    let res = call(&s, Method::POST, "/users").await;
    assert_eq!(res.status(), Some(StatusCode::METHOD_NOT_ALLOWED));
    assert_eq!(res.headers().get(header::ALLOW).unwrap(), "GET");

    let h = s.instrumented();
    assert_eq!(h.requests().get(&["500", "GET", "/error"]).unwrap(), 1);
    assert_eq!(h.requests().get(&["404", "GET", "unmatched"]).unwrap(), 1);
    assert_eq!(h.requests().get(&["405", "POST", "/users"]).unwrap(), 1);
}

#[tokio::test]
async fn metrics_endpoint_exposes_request_series() {
    let s = state();
    call(&s, Method::GET, "/users/1").await;
    call(&s, Method::GET, "/healthz").await;

    let res = call(&s, Method::GET, "/metrics").await;
    assert_eq!(res.status(), Some(StatusCode::OK));
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain; version=0.0.4; charset=utf-8"
    );
    let text = String::from_utf8(res.body().to_vec()).unwrap();
    assert!(text.contains("# TYPE monitoring_rest_http_requests_total counter"));
    assert!(text.contains(concat!(
        "monitoring_rest_http_requests_total",
        "{code=\"200\",method=\"GET\",endpoint=\"/users/{id}\"} 1"
    )));
    assert!(text.contains(concat!(
        "monitoring_rest_http_durations_histogram_seconds_count",
        "{code=\"200\",method=\"GET\",endpoint=\"/healthz\"} 1"
    )));
}
