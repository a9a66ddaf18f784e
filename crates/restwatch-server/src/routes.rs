//! Route table: `(method, template)` to handler, with `{param}` segments.
//!
//! The table is a `Handler` itself, so it can sit directly under the
//! instrumentation wrapper. It reports the matched template through
//! `Handler::route`, which keeps the metrics endpoint label bounded.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header, HeaderValue, Method, StatusCode};
use dashmap::DashMap;

use crate::http::{Handler, HttpRequest, ResponseSink};
use crate::reply;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Literal(&'static str),
    Param(&'static str),
}

struct Route {
    segments: Vec<Segment>,
    methods: Vec<(Method, Arc<dyn Handler>)>,
}

impl Route {
    fn parse(template: &'static str) -> Self {
        let segments = split_path(template)
            .map(|s| match s.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(name) => Segment::Param(name),
                None => Segment::Literal(s),
            })
            .collect();
        Self {
            segments,
            methods: Vec::new(),
        }
    }

    fn param_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Param(_)))
            .count()
    }

    fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
        let parts: Vec<&str> = split_path(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = Vec::new();
        for (seg, part) in self.segments.iter().zip(parts) {
            match seg {
                Segment::Literal(l) if *l == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.push((name.to_string(), part.to_string())),
            }
        }
        Some(params)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

/// Registry of routes. Registration is usually done once at startup.
#[derive(Default)]
pub struct Routes {
    table: DashMap<&'static str, Route>,
}

impl Routes {
    pub fn new() -> Self {
        Self {
            table: DashMap::new(),
        }
    }

    /// Bind `handler` to `method` on `template`. A later binding for the
    /// same pair replaces the earlier one.
    pub fn handle(&self, method: Method, template: &'static str, handler: Arc<dyn Handler>) {
        let mut route = self
            .table
            .entry(template)
            .or_insert_with(|| Route::parse(template));
        route.methods.retain(|(m, _)| *m != method);
        route.methods.push((method, handler));
    }

    pub fn get(&self, template: &'static str, handler: Arc<dyn Handler>) {
        self.handle(Method::GET, template, handler);
    }

    pub fn templates(&self) -> Vec<&'static str> {
        let mut t: Vec<&'static str> = self.table.iter().map(|e| *e.key()).collect();
        t.sort();
        t
    }

    /// Most specific template matching `path` (fewest params wins).
    fn resolve(&self, path: &str) -> Option<(&'static str, Vec<(String, String)>)> {
        self.table
            .iter()
            .filter_map(|e| {
                e.value()
                    .matches(path)
                    .map(|params| (e.value().param_count(), *e.key(), params))
            })
            .min_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(b.1)))
            .map(|(_, template, params)| (template, params))
    }

    fn lookup(
        &self,
        template: &'static str,
        method: &Method,
    ) -> Result<Arc<dyn Handler>, Vec<Method>> {
        let route = self.table.get(template).ok_or_else(Vec::new)?;
        let found = route
            .methods
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, h)| Arc::clone(h))
            .ok_or_else(|| route.methods.iter().map(|(m, _)| m.clone()).collect());
        found
    }
}

#[async_trait]
impl Handler for Routes {
    async fn serve(&self, req: &HttpRequest, sink: &mut dyn ResponseSink) {
        let Some((template, params)) = self.resolve(req.path()) else {
            reply::error(sink, StatusCode::NOT_FOUND, &format!("no route for {}", req.path()));
            return;
        };

        // the DashMap guard is released before awaiting the handler
        let handler = match self.lookup(template, &req.method) {
            Ok(h) => h,
            Err(allowed) => {
                let allow = allowed
                    .iter()
                    .map(|m| m.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                if let Ok(v) = HeaderValue::from_str(&allow) {
                    sink.headers_mut().insert(header::ALLOW, v);
                }
                reply::error(
                    sink,
                    StatusCode::METHOD_NOT_ALLOWED,
                    &format!("method {} not allowed on {}", req.method, template),
                );
                return;
            }
        };

        if params.is_empty() {
            handler.serve(req, sink).await;
        } else {
            // headers and body are shared, not copied
            let mut routed = req.clone();
            routed.params = params;
            handler.serve(&routed, sink).await;
        }
    }

    fn route(&self, req: &HttpRequest) -> Option<&'static str> {
        self.resolve(req.path()).map(|(template, _)| template)
    }
}
