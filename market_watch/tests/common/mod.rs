//! Stub dashboard backend for integration tests.

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use market_watch::{
    ClientConfig, DashboardClient,
    auth::{MemoryStore, UserProfile},
};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

pub const USERNAME: &str = "analyst";
pub const PASSWORD: &str = "secret123";
pub const TOKEN: &str = "tok-analyst";

/// Request counters and the last headers seen, shared with the handlers
#[derive(Default)]
pub struct Backend {
    hits: Mutex<HashMap<String, usize>>,
    /// Delay applied to `/slow` and to list endpoints when set
    pub list_delay: Mutex<Option<Duration>>,
    /// Next exchange-rate responses fail with 500 while positive
    pub failing_rates: Mutex<usize>,
}

impl Backend {
    pub fn hits(&self, route: &str) -> usize {
        self.hits
            .lock()
            .unwrap()
            .get(route)
            .copied()
            .unwrap_or_default()
    }

    fn hit(&self, route: &str) {
        *self
            .hits
            .lock()
            .unwrap()
            .entry(route.to_string())
            .or_default() += 1;
    }

    fn delay(&self) -> Option<Duration> {
        *self.list_delay.lock().unwrap()
    }
}

pub struct StubServer {
    pub base_url: String,
    pub backend: Arc<Backend>,
}

impl StubServer {
    pub async fn start() -> Self {
        let backend = Arc::new(Backend::default());
        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/whoami", get(whoami))
            .route("/api/auth/check-username/{username}", get(check_username))
            .route("/api/auth/check-email/{email}", get(check_email))
            .route("/api/users/{id}", get(user))
            .route("/api/slow", get(slow))
            .route("/api/broken", get(broken))
            .route("/api/exchange-rates", get(exchange_rates))
            .route("/api/exchange-rates/interest-rates", get(interest_rates))
            .route("/api/exchange-rates/cpi", get(cpi))
            .route("/api/product-management", get(product_management))
            .route("/api/sales-persons", get(sales_persons))
            .route(
                "/api/sales-persons/{id}",
                get(sales_person).put(update_sales_person),
            )
            .route("/api/institutions", get(institutions))
            .route("/api/commission-status", get(commission_status))
            .with_state(backend.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/api"),
            backend,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            api_base_url: self.base_url.clone(),
            request_timeout: Duration::from_millis(500),
            refresh_cooldown: Duration::from_millis(50),
            ..ClientConfig::default()
        }
    }

    pub fn client(&self) -> DashboardClient {
        DashboardClient::new(self.config(), Arc::new(MemoryStore::new())).unwrap()
    }
}

pub fn profile() -> UserProfile {
    UserProfile {
        id: 1,
        company_name: "Acme".to_string(),
        username: USERNAME.to_string(),
        email: "analyst@acme.com".to_string(),
        created_at: None,
        updated_at: None,
        is_active: true,
    }
}

fn error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "message": message,
            "code": code,
            "status": status.as_u16(),
            "timestamp": "2024-05-01 10:00:00",
        })),
    )
        .into_response()
}

/// Reject requests not carrying the issued token
fn authorize(headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {TOKEN}");
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Token expired")),
    }
}

async fn login(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    backend.hit("login");
    if body["username"] == USERNAME && body["password"] == PASSWORD {
        Json(json!({
            "success": true,
            "message": "Login successful",
            "user": {
                "id": 1,
                "companyName": "Acme",
                "username": USERNAME,
                "email": "analyst@acme.com",
                "createdAt": "2024-01-01T00:00:00",
                "isActive": true,
            },
            "token": TOKEN,
        }))
        .into_response()
    } else {
        error(
            StatusCode::UNAUTHORIZED,
            "LOGIN_ERROR",
            "Invalid username or password",
        )
    }
}

async fn whoami(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    backend.hit("whoami");
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "authorization": header("authorization"),
        "requestId": header("x-request-id"),
    }))
    .into_response()
}

async fn check_username(
    State(backend): State<Arc<Backend>>,
    Path(username): Path<String>,
) -> Response {
    backend.hit("checkUsername");
    let available = username != USERNAME;
    Json(json!({
        "success": true,
        "available": available,
        "message": username,
    }))
    .into_response()
}

async fn check_email(State(backend): State<Arc<Backend>>, Path(email): Path<String>) -> Response {
    backend.hit("checkEmail");
    Json(json!({
        "success": true,
        "available": email != "analyst@acme.com",
        "message": email,
    }))
    .into_response()
}

async fn user(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    backend.hit("user");
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }
    if id != 1 {
        return error(StatusCode::NOT_FOUND, "DATA_NOT_FOUND", "User not found");
    }
    Json(json!({"success": true, "user": profile()})).into_response()
}

async fn slow(State(backend): State<Arc<Backend>>) -> Response {
    backend.hit("slow");
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({})).into_response()
}

async fn broken(State(backend): State<Arc<Backend>>) -> Response {
    backend.hit("broken");
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}

async fn exchange_rates(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    backend.hit("exchangeRates");
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }
    if let Some(delay) = backend.delay() {
        tokio::time::sleep(delay).await;
    }
    {
        let mut failing = backend.failing_rates.lock().unwrap();
        if *failing > 0 {
            *failing -= 1;
            return error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Rates table unavailable",
            );
        }
    }
    Json(json!([
        {"id": 1, "currencyPair": "USD/KRW", "rate": 1350.5, "date": "2024-05-01", "unit": "KRW"},
        {"id": 2, "currencyPair": "USD/KRW", "rate": 1362.0, "date": "2024-05-02", "unit": "KRW"},
        {"id": 3, "currencyPair": "JPY/KRW", "rate": 8.9, "date": "2024-05-02", "unit": "KRW"},
    ]))
    .into_response()
}

async fn interest_rates(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    backend.hit("interestRates");
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }
    let start = params.get("startDate").cloned().unwrap_or_default();
    let end = params.get("endDate").cloned().unwrap_or_default();
    Json(json!([
        {"date": start, "rate": 3.5, "unit": "%", "rateType": "BASE", "description": "Base rate"},
        {"date": end, "rate": 3.25, "unit": "%", "rateType": "BASE", "description": "Base rate"},
    ]))
    .into_response()
}

async fn cpi(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    backend.hit("consumerPriceIndex");
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }
    let start = params.get("startDate").cloned().unwrap_or_default();
    Json(json!([
        {"date": start, "cpi": 113.2, "unit": "2020=100", "cpiType": "TOTAL", "description": "All items"},
    ]))
    .into_response()
}

fn figures() -> Value {
    json!({
        "consultationCount": 10,
        "salesCount": 4,
        "commission": 120,
        "mtdConsultationCount": 3,
        "mtdSalesCount": 1,
        "mtdCommission": 30,
        "ytdConsultationCount": 40,
        "ytdSalesCount": 12,
        "ytdCommission": 900,
    })
}

fn with_figures(mut record: Value) -> Value {
    if let (Some(target), Some(source)) = (record.as_object_mut(), figures().as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
    record
}

async fn product_management(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    backend.hit("productManagement");
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }
    Json(json!([with_figures(json!({"id": 1, "productName": "Growth Fund"}))])).into_response()
}

async fn sales_persons(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    backend.hit("salesPersons");
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }
    if let Some(delay) = backend.delay() {
        tokio::time::sleep(delay).await;
    }
    Json(json!([
        with_figures(json!({"id": 1, "salesPersonName": "Kim"})),
        with_figures(json!({"id": 2, "salesPersonName": "Lee"})),
    ]))
    .into_response()
}

async fn sales_person(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    backend.hit("salesPerson");
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }
    if id == 404 {
        return error(
            StatusCode::NOT_FOUND,
            "DATA_NOT_FOUND",
            "Sales person not found",
        );
    }
    Json(with_figures(json!({"id": id, "salesPersonName": "Kim"}))).into_response()
}

async fn update_sales_person(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(patch): Json<Value>,
) -> Response {
    backend.hit("updateSalesPerson");
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }
    let mut record = with_figures(json!({"id": id, "salesPersonName": "Kim"}));
    if let (Some(target), Some(source)) = (record.as_object_mut(), patch.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(record).into_response()
}

async fn institutions(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    backend.hit("institutions");
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }
    Json(json!([with_figures(json!({"id": 1, "institutionName": "Seoul Branch"}))])).into_response()
}

async fn commission_status(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    backend.hit("commissionStatus");
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }
    Json(json!([
        {"id": 1, "productType": "Fund", "commission": 100, "mtdCommission": 300, "ytdCommission": 3000},
        {"id": 2, "productType": "Bond", "commission": 50, "mtdCommission": 150, "ytdCommission": 1500},
    ]))
    .into_response()
}
