// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A fake inventory API for integration tests.
//!
//! Records every request, enforces bearer tokens on everything except
//! `login`/`register`, and serves `RefreshToken` from a configurable
//! rotation.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub auth: Option<String>,
    pub body: Value,
}

impl Recorded {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

enum Reply {
    Fixed(u16, Value),
    Pages { pages: Vec<Vec<Value>>, total: u64 },
}

pub struct FakeBackend {
    valid_token: Mutex<String>,
    rotation: Mutex<Option<(String, String)>>,
    replies: Mutex<HashMap<(Method, String), Reply>>,
    requests: Mutex<Vec<Recorded>>,
    refresh_calls: AtomicU32,
}

pub fn envelope(data: Value) -> Value {
    json!({ "status": "Success", "message": "", "data": data })
}

pub fn failure(message: &str) -> Value {
    json!({ "status": "Error", "message": message, "data": null })
}

impl FakeBackend {
    /// Backend that accepts `valid_token` and refuses every refresh.
    pub fn new(valid_token: &str) -> Arc<Self> {
        Arc::new(Self {
            valid_token: Mutex::new(valid_token.to_owned()),
            rotation: Mutex::new(None),
            replies: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            refresh_calls: AtomicU32::new(0),
        })
    }

    /// Serve `RefreshToken` with this pair (and accept its access token).
    pub fn rotate_to(&self, access: &str, refresh: &str) {
        *self.rotation.lock() = Some((access.to_owned(), refresh.to_owned()));
    }

    /// Stop accepting the current access token.
    pub fn expire(&self, new_valid: &str) {
        *self.valid_token.lock() = new_valid.to_owned();
    }

    pub fn reply(&self, method: Method, path: &str, status: u16, body: Value) {
        self.replies.lock().insert((method, path.to_owned()), Reply::Fixed(status, body));
    }

    /// Serve a paged listing on `GET path`, selecting by `pageNumber`.
    pub fn pages(&self, path: &str, pages: Vec<Vec<Value>>, total: u64) {
        self.replies.lock().insert((Method::GET, path.to_owned()), Reply::Pages { pages, total });
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }

    pub fn refresh_calls(&self) -> u32 {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub async fn serve(self: &Arc<Self>) -> anyhow::Result<String> {
        let app = Router::new().fallback(handle).with_state(Arc::clone(self));
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        Ok(format!("http://{addr}/"))
    }

    fn refresh(&self) -> (StatusCode, Value) {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        match self.rotation.lock().clone() {
            Some((access, refresh)) => {
                *self.valid_token.lock() = access.clone();
                (
                    StatusCode::OK,
                    envelope(json!({ "accessToken": access, "refreshToken": refresh })),
                )
            }
            None => (StatusCode::BAD_REQUEST, failure("Invalid refresh token")),
        }
    }

    fn respond(&self, method: &Method, path: &str, query: &[(String, String)]) -> (StatusCode, Value) {
        let replies = self.replies.lock();
        match replies.get(&(method.clone(), path.to_owned())) {
            Some(Reply::Fixed(status, body)) => {
                (StatusCode::from_u16(*status).unwrap_or(StatusCode::OK), body.clone())
            }
            Some(Reply::Pages { pages, total }) => {
                let param = |key: &str| -> Option<usize> {
                    query.iter().find(|(k, _)| k == key).and_then(|(_, v)| v.parse().ok())
                };
                let number = param("pageNumber").unwrap_or(1);
                let items = pages.get(number.saturating_sub(1)).cloned().unwrap_or_default();
                let body = json!({
                    "status": "Success",
                    "message": "",
                    "data": items,
                    "pageNumber": number,
                    "pageSize": param("pageSize").unwrap_or(0),
                    "totalCount": total,
                });
                (StatusCode::OK, body)
            }
            None => (StatusCode::NOT_FOUND, failure("no such route")),
        }
    }
}

async fn handle(
    State(backend): State<Arc<FakeBackend>>,
    method: Method,
    uri: Uri,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let auth = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()).map(str::to_owned);
    let path = uri.path().to_owned();
    backend.requests.lock().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: query.clone(),
        auth: auth.clone(),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });

    let (status, body) = match path.as_str() {
        "/RefreshToken" => backend.refresh(),
        "/login" | "/register" => backend.respond(&method, &path, &query),
        _ => {
            let expected = format!("Bearer {}", backend.valid_token.lock());
            if auth.as_deref() == Some(expected.as_str()) {
                backend.respond(&method, &path, &query)
            } else {
                (StatusCode::UNAUTHORIZED, Value::String(String::new()))
            }
        }
    };
    let text = match body {
        Value::String(s) => s,
        other => other.to_string(),
    };
    (status, text)
}
