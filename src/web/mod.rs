//! HTTP surface: one handler per form action, each rendering a fresh page

pub mod render;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    Form, Router,
    extract::{State, rejection::FormRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::ClimaConfig;
use crate::export::WORKBOOK_CONTENT_TYPE;
use crate::location_resolver::LocationResolver;
use crate::power::PowerClient;
use crate::session::{FormInput, SessionController, SessionStore};

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "clima_session";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SessionController>,
    pub sessions: Arc<SessionStore>,
    /// Source of "today" for date bounds
    pub clock: fn() -> NaiveDate,
}

impl AppState {
    /// Wire the real POWER and ipinfo clients from configuration
    pub fn from_config(config: &ClimaConfig) -> Result<Self> {
        let climate = PowerClient::new(&config.power).context("Failed to build POWER client")?;
        let locator = LocationResolver::new(&config.geolocation)
            .context("Failed to build geolocation client")?;

        let controller = SessionController::new(
            Arc::new(climate),
            Arc::new(locator),
            config.defaults.earliest_date,
        );
        let sessions = SessionStore::new(
            config.defaults.clone(),
            Duration::from_secs(config.server.session_idle_minutes * 60),
        );

        Ok(Self {
            controller: Arc::new(controller),
            sessions: Arc::new(sessions),
            clock: local_today,
        })
    }
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/location", post(use_current_location))
        .route("/fetch", post(fetch_data))
        .route("/download", get(download))
        .route("/session/end", post(end_session))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(16 * 1024))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(config: &ClimaConfig) -> Result<()> {
    let app = router(AppState::from_config(config)?);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", config.server.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")?;

    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

/// Session id from the request cookies, if present and well formed
#[must_use]
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

fn with_session_cookie(mut response: Response, id: Uuid) -> Response {
    let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let today = (state.clock)();
    let (id, session, _) = state.sessions.open(session_id(&headers), today);
    let mut session = session.lock().await;
    session.touch();

    let html = render::page(&state.controller.view(&session, today));
    with_session_cookie(Html(html).into_response(), id)
}

async fn use_current_location(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<FormInput>, FormRejection>,
) -> Response {
    let today = (state.clock)();
    let (id, session, _) = state.sessions.open(session_id(&headers), today);
    let mut session = session.lock().await;
    session.touch();

    let input = form.ok().map(|Form(input)| input);
    state
        .controller
        .use_current_location(&mut session, input.as_ref(), today)
        .await;

    let html = render::page(&state.controller.view(&session, today));
    with_session_cookie(Html(html).into_response(), id)
}

async fn fetch_data(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<FormInput>, FormRejection>,
) -> Response {
    let today = (state.clock)();
    let (id, session, _) = state.sessions.open(session_id(&headers), today);

    let Form(input) = match form {
        Ok(form) => form,
        Err(rejection) => {
            tracing::debug!("Rejected form submission: {}", rejection);
            let html = render::message_page("Preencha latitude, longitude e as duas datas.");
            let response = (StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response();
            return with_session_cookie(response, id);
        }
    };

    let mut session = session.lock().await;
    session.touch();
    state.controller.fetch_data(&mut session, &input, today).await;

    let html = render::page(&state.controller.view(&session, today));
    with_session_cookie(Html(html).into_response(), id)
}

async fn download(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let today = (state.clock)();
    let (id, session, _) = state.sessions.open(session_id(&headers), today);
    let mut session = session.lock().await;
    session.touch();

    let response = match state.controller.export(&mut session) {
        Ok(workbook) => {
            tracing::info!("Serving {} ({} bytes)", workbook.file_name, workbook.bytes.len());
            let disposition = format!("attachment; filename=\"{}\"", workbook.file_name);
            (
                [
                    (header::CONTENT_TYPE, WORKBOOK_CONTENT_TYPE.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                workbook.bytes,
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::NOT_FOUND,
            Html(render::message_page(&e.user_message())),
        )
            .into_response(),
    };
    with_session_cookie(response, id)
}

async fn end_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id(&headers) {
        state.sessions.end(&id);
    }
    let mut response = Redirect::to("/").into_response();
    let expired = format!("{SESSION_COOKIE}=; Path=/; Max-Age=0");
    if let Ok(value) = HeaderValue::from_str(&expired) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_from_cookie_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}")).unwrap(),
        );
        assert_eq!(session_id(&headers), Some(id));
    }

    #[test]
    fn test_session_id_ignores_garbage() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id(&headers), None);

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("clima_session=not-a-uuid"),
        );
        assert_eq!(session_id(&headers), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let id = Uuid::new_v4();
        let response = with_session_cookie(StatusCode::OK.into_response(), id);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with(&format!("clima_session={id}")));
        assert!(cookie.contains("HttpOnly"));
    }
}
