//! Test helpers: local stand-ins for NASA POWER and ipinfo, and router plumbing

#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use clima::ClimaConfig;
use clima::models::ClimateVariable;
use clima::web::{self, AppState};
use http_body_util::BodyExt;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Real-shaped POWER response for -21.7946, -48.1766, 2020-01-01..2020-01-03
pub const POWER_FIXTURE: &str = include_str!("../fixtures/power_daily_20200101_20200103.json");

/// What the POWER stand-in answers with
#[derive(Clone)]
pub enum PowerStub {
    /// The recorded fixture, whatever the query
    Fixture,
    /// One generated day per date in the requested `start..=end`
    Generated,
    /// Bare status code with an error body
    Status(u16),
    /// Success status with an arbitrary body
    Body(&'static str),
}

/// What the ipinfo stand-in answers with
#[derive(Clone)]
pub enum IpInfoStub {
    Loc(&'static str),
    Status(u16),
}

/// A running stand-in server and the query strings it received
pub struct StubServer {
    pub url: String,
    pub requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl StubServer {
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<HashMap<String, String>> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[derive(Clone)]
struct StubState<T> {
    stub: T,
    requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub async fn spawn_power(stub: PowerStub) -> StubServer {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        stub,
        requests: requests.clone(),
    };
    let app = Router::new()
        .route("/api/temporal/daily/point", get(power_handler))
        .with_state(state);
    let url = serve(app).await;

    StubServer {
        url: format!("{url}/api/temporal/daily/point"),
        requests,
    }
}

pub async fn spawn_ipinfo(stub: IpInfoStub) -> StubServer {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        stub,
        requests: requests.clone(),
    };
    let app = Router::new()
        .route("/json", get(ipinfo_handler))
        .with_state(state);
    let url = serve(app).await;

    StubServer {
        url: format!("{url}/json"),
        requests,
    }
}

async fn power_handler(
    State(state): State<StubState<PowerStub>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.requests.lock().unwrap().push(query.clone());

    match state.stub {
        PowerStub::Fixture => (
            [(header::CONTENT_TYPE, "application/json")],
            POWER_FIXTURE,
        )
            .into_response(),
        PowerStub::Generated => {
            Json(generated_power_response(&query["start"], &query["end"])).into_response()
        }
        PowerStub::Status(code) => (
            StatusCode::from_u16(code).unwrap(),
            Json(json!({ "messages": ["stub failure"] })),
        )
            .into_response(),
        PowerStub::Body(body) => (
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
    }
}

async fn ipinfo_handler(State(state): State<StubState<IpInfoStub>>) -> Response {
    state.requests.lock().unwrap().push(HashMap::new());

    match state.stub {
        IpInfoStub::Loc(loc) => Json(json!({
            "ip": "203.0.113.7",
            "city": "São Carlos",
            "region": "São Paulo",
            "country": "BR",
            "loc": loc,
        }))
        .into_response(),
        IpInfoStub::Status(code) => StatusCode::from_u16(code).unwrap().into_response(),
    }
}

/// URL on a local port that was just released, so connecting is refused
pub async fn closed_url(path: &str) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}{path}")
}

/// POWER-shaped body with one value per day for every requested variable
pub fn generated_power_response(start: &str, end: &str) -> Value {
    let start = NaiveDate::parse_from_str(start, "%Y%m%d").unwrap();
    let end = NaiveDate::parse_from_str(end, "%Y%m%d").unwrap();

    let mut parameter = Map::new();
    for (offset, variable) in ClimateVariable::all().enumerate() {
        let series: Map<String, Value> = start
            .iter_days()
            .take_while(|day| *day <= end)
            .enumerate()
            .map(|(i, day)| {
                let value = offset as f64 * 10.0 + i as f64;
                (day.format("%Y%m%d").to_string(), json!(value))
            })
            .collect();
        parameter.insert(variable.power_code().to_string(), Value::Object(series));
    }

    json!({ "type": "Feature", "properties": { "parameter": parameter } })
}

/// Configuration pointing both clients at the stand-ins
pub fn test_config(power: &StubServer, ipinfo: &StubServer) -> ClimaConfig {
    let mut config = ClimaConfig::default();
    config.power.base_url = power.url.clone();
    config.geolocation.url = ipinfo.url.clone();
    config.power.timeout_seconds = Some(10);
    config.geolocation.timeout_seconds = Some(10);
    config
}

pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

pub fn test_app(config: &ClimaConfig) -> Router {
    let mut state = AppState::from_config(config).unwrap();
    state.clock = fixed_today;
    web::router(state)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// `name=value` part of the session Set-Cookie header
pub fn session_cookie(response: &Response) -> String {
    response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, cookie: Option<&str>, form: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}
