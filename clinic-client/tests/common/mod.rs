//! In-process stand-in for the clinic PHP API
//!
//! Routes are matched on method, path and required query pairs; the most
//! specific route wins and later registrations shadow earlier ones. Every
//! request is recorded for assertions.

#![allow(dead_code)]

use axum::Router;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use clinic_client::{ClientConfig, Console};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Recorded {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

struct Route {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    status: StatusCode,
    body: String,
}

#[derive(Default)]
struct MockState {
    routes: Vec<Route>,
    requests: Vec<Recorded>,
}

type Shared = Arc<Mutex<MockState>>;

fn parse_query(raw: Option<&str>) -> Vec<(String, String)> {
    raw.unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

async fn handle(State(state): State<Shared>, method: Method, uri: Uri, body: String) -> Response {
    let path = uri.path().trim_start_matches('/').to_string();
    let query = parse_query(uri.query());

    let mut state = state.lock().unwrap();
    state.requests.push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: query.clone(),
        body: serde_json::from_str(&body).ok(),
    });

    let route = state
        .routes
        .iter()
        .enumerate()
        .filter(|(_, r)| r.method == method && r.path == path)
        .filter(|(_, r)| r.query.iter().all(|pair| query.contains(pair)))
        .max_by_key(|(i, r)| (r.query.len(), *i))
        .map(|(_, r)| r);

    match route {
        Some(r) => (
            r.status,
            [(header::CONTENT_TYPE, "application/json")],
            r.body.clone(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            json!({ "error": format!("no route for {method} {path}") }).to_string(),
        )
            .into_response(),
    }
}

#[derive(Clone)]
pub struct MockApi {
    state: Shared,
    base_url: String,
}

impl MockApi {
    pub async fn start() -> Self {
        let state: Shared = Arc::default();
        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            state,
            base_url: format!("http://{addr}"),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Answer `method path?query` with a 200 JSON body
    pub fn on(&self, method: Method, path: &str, query: &[(&str, &str)], body: Value) {
        self.on_raw(method, path, query, StatusCode::OK, &body.to_string());
    }

    pub fn on_raw(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        status: StatusCode,
        body: &str,
    ) {
        self.state.lock().unwrap().routes.push(Route {
            method,
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            status,
            body: body.to_string(),
        });
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// Staff user served by `branches.php?action=user`
    pub fn with_staff_user(&self) {
        self.on(
            Method::GET,
            "branches.php",
            &[("action", "user")],
            json!({
                "data": {
                    "user_id": "7",
                    "username": "Ana Reyes",
                    "role": "Staff",
                    "branch_id": "2",
                    "branch": "Makati"
                }
            }),
        );
    }
}

pub fn config(api: &MockApi, dir: &TempDir) -> ClientConfig {
    ClientConfig::new(api.base_url())
        .with_storage_dir(dir.path())
        .with_search_debounce(Duration::from_millis(10))
        .with_timeout(5)
}

pub async fn connect(api: &MockApi, dir: &TempDir) -> Console {
    Console::connect(config(api, dir)).await.unwrap()
}

pub fn service(id: i64, name: &str, category: &str, price: &str) -> Value {
    json!({
        "service_id": id.to_string(),
        "service_name": name,
        "category_name": category,
        "price": price,
        "duration": "60 mins"
    })
}

/// Member customer row as `customers.php` returns it
pub fn member_customer(id: i64, kind: &str, balance: &str, membership_id: i64, expire: &str) -> Value {
    json!({
        "id": id.to_string(),
        "name": format!("Customer {id}"),
        "contact": "09171234567",
        "email": format!("c{id}@example.com"),
        "customerId": format!("CUST-{id:04}"),
        "membership_status": kind,
        "membership_id": membership_id.to_string(),
        "membershipDetails": {
            "type": kind.to_lowercase(),
            "coverage": "5000.00",
            "remainingBalance": balance,
            "dateRegistered": "2026-01-05",
            "expireDate": expire
        }
    })
}

pub fn plain_customer(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "contact": "",
        "email": null,
        "membership_status": "None"
    })
}
