use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::Serialize;

use crate::http::{Handler, HttpRequest, ResponseSink};
use crate::reply;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub second_name: String,
    /// RFC 3339, UTC midnight.
    pub birth_date: String,
}

impl User {
    fn new(id: &str, first: &str, second: &str, birth_date: &str) -> Self {
        Self {
            id: id.into(),
            first_name: first.into(),
            second_name: second.into(),
            birth_date: format!("{birth_date}T00:00:00Z"),
        }
    }
}

/// Read-only user records keyed by id.
#[derive(Debug, Default)]
pub struct UserStore {
    users: BTreeMap<String, User>,
}

impl UserStore {
    pub fn seeded() -> Self {
        let users = [
            User::new("1", "Tom", "Tailor", "1988-06-01"),
            User::new("2", "Tommy", "Hilfiger", "1956-01-14"),
            User::new("3", "Coco", "Chanel", "1921-04-23"),
        ];
        Self {
            users: users.into_iter().map(|u| (u.id.clone(), u)).collect(),
        }
    }

    /// All users, ordered by id.
    pub fn all(&self) -> Vec<&User> {
        self.users.values().collect()
    }

    pub fn get(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }
}

/// `GET /users`
pub struct ListUsers {
    store: Arc<UserStore>,
}

impl ListUsers {
    pub fn new(store: Arc<UserStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler for ListUsers {
    async fn serve(&self, _req: &HttpRequest, sink: &mut dyn ResponseSink) {
        if let Err(e) = reply::json(sink, StatusCode::OK, &self.store.all()) {
            tracing::warn!(error = %e, "user list write failed");
        }
    }
}

/// `GET /users/{id}`
pub struct GetUser {
    store: Arc<UserStore>,
}

impl GetUser {
    pub fn new(store: Arc<UserStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler for GetUser {
    async fn serve(&self, req: &HttpRequest, sink: &mut dyn ResponseSink) {
        let id = req.param("id").unwrap_or("");
        if id.is_empty() {
            reply::error(sink, StatusCode::BAD_REQUEST, "please provide User id");
            return;
        }
        let Some(user) = self.store.get(id) else {
            reply::error(
                sink,
                StatusCode::NOT_FOUND,
                &format!("can't find user with ID: {id}"),
            );
            return;
        };
        if let Err(e) = reply::json(sink, StatusCode::OK, user) {
            tracing::warn!(user = %id, error = %e, "user write failed");
        }
    }
}

/// `GET /error`: always answers 500.
pub struct AlwaysFails;

#[async_trait]
impl Handler for AlwaysFails {
    async fn serve(&self, _req: &HttpRequest, sink: &mut dyn ResponseSink) {
        reply::error(sink, StatusCode::INTERNAL_SERVER_ERROR, "some error");
    }
}
