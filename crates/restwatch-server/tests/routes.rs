//! Route table matching and parameter hand-off.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};

use restwatch_server::http::{BufferedResponse, Handler, HttpRequest, ResponseSink};
use restwatch_server::routes::Routes;

#[derive(Default)]
struct Capture {
    seen: Mutex<Option<(Arc<HeaderMap>, Vec<(String, String)>)>>,
}

#[async_trait]
impl Handler for Capture {
    async fn serve(&self, req: &HttpRequest, sink: &mut dyn ResponseSink) {
        *self.seen.lock().unwrap() = Some((req.headers.clone(), req.params.clone()));
        sink.write_status(StatusCode::NO_CONTENT);
    }
}

fn get(path: &str) -> HttpRequest {
    HttpRequest::new(Method::GET, path.parse::<Uri>().unwrap())
        .with_header(header::USER_AGENT, "test")
}

#[tokio::test]
async fn params_reach_handler_without_copying_headers() {
    let capture = Arc::new(Capture::default());
    let routes = Routes::new();
    routes.get("/orders/{order}/items/{item}", capture.clone());

    let req = get("/orders/7/items/abc");
    let mut sink = BufferedResponse::new();
    routes.serve(&req, &mut sink).await;

    assert_eq!(sink.status(), Some(StatusCode::NO_CONTENT));
    let (headers, params) = capture.seen.lock().unwrap().take().unwrap();
    assert!(Arc::ptr_eq(&headers, &req.headers));
    assert_eq!(
        params,
        vec![
            ("order".to_string(), "7".to_string()),
            ("item".to_string(), "abc".to_string())
        ]
    );
    assert!(req.params.is_empty());
}

#[tokio::test]
async fn literal_route_beats_param_route() {
    let literal = Arc::new(Capture::default());
    let param = Arc::new(Capture::default());
    let routes = Routes::new();
    routes.get("/users/{id}", param.clone());
    routes.get("/users/me", literal.clone());

    let mut sink = BufferedResponse::new();
    routes.serve(&get("/users/me"), &mut sink).await;

    assert!(literal.seen.lock().unwrap().is_some());
    assert!(param.seen.lock().unwrap().is_none());
    assert_eq!(routes.route(&get("/users/me")), Some("/users/me"));
    assert_eq!(routes.route(&get("/users/9")), Some("/users/{id}"));
    assert_eq!(routes.route(&get("/nothing")), None);
}
