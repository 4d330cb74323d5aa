//! Per-user interactive session
//!
//! A [`Session`] remembers the coordinate and dates a user last worked with
//! and the outcome of their last action. The [`SessionController`] runs one
//! action at a time against a session, and [`SessionController::view`] turns
//! the current state into what the page shows.

use crate::config::DefaultsConfig;
use crate::export::{ExportedWorkbook, export_workbook};
use crate::location_resolver::NetworkLocator;
use crate::models::{ClimateRecord, Coordinate, DateRange, build_catalog};
use crate::power::ClimateSource;
use crate::{ClimaError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Shown when the climate service fails for any reason
pub const FETCH_ERROR_MESSAGE: &str = "Erro ao buscar dados da NASA POWER";

/// Where a session is in its action cycle
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    LocationRequested,
    DataRequested,
    DataShown { records: Vec<ClimateRecord> },
    FetchFailed { message: String },
    ExportRequested,
}

impl SessionState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::LocationRequested => "location_requested",
            SessionState::DataRequested => "data_requested",
            SessionState::DataShown { .. } => "data_shown",
            SessionState::FetchFailed { .. } => "fetch_failed",
            SessionState::ExportRequested => "export_requested",
        }
    }
}

/// Values submitted with the form
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FormInput {
    pub latitude: f64,
    pub longitude: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// State owned by one user
#[derive(Debug)]
pub struct Session {
    pub coordinate: Coordinate,
    pub range: DateRange,
    pub state: SessionState,
    /// Message from the last location lookup, if it failed
    pub notice: Option<String>,
    last_seen: Instant,
}

impl Session {
    #[must_use]
    pub fn new(defaults: &DefaultsConfig, today: NaiveDate) -> Self {
        Self {
            coordinate: Coordinate::new(defaults.latitude, defaults.longitude),
            range: DateRange::default_until(today, defaults.earliest_date, defaults.lookback_days),
            state: SessionState::Idle,
            notice: None,
            last_seen: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    #[must_use]
    pub fn idle_for(&self) -> Duration {
        self.last_seen.elapsed()
    }

    /// Records currently on display, if any
    #[must_use]
    pub fn records(&self) -> Option<&[ClimateRecord]> {
        match &self.state {
            SessionState::DataShown { records } => Some(records),
            _ => None,
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Session state {} -> {}", self.state.name(), next.name());
        self.state = next;
    }
}

/// Everything the page needs to render one session
#[derive(Debug)]
pub struct SessionView<'a> {
    pub latitude: String,
    pub longitude: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub start_min: NaiveDate,
    pub start_max: NaiveDate,
    /// Always the selected start date
    pub end_min: NaiveDate,
    pub end_max: NaiveDate,
    pub notice: Option<&'a str>,
    pub error: Option<&'a str>,
    pub records: &'a [ClimateRecord],
    /// The download action is only offered after a successful fetch
    pub downloadable: bool,
}

/// Runs the form actions against a session
pub struct SessionController {
    climate: Arc<dyn ClimateSource>,
    locator: Arc<dyn NetworkLocator>,
    earliest: NaiveDate,
}

impl SessionController {
    pub fn new(
        climate: Arc<dyn ClimateSource>,
        locator: Arc<dyn NetworkLocator>,
        earliest: NaiveDate,
    ) -> Self {
        Self {
            climate,
            locator,
            earliest,
        }
    }

    /// Keep what the user typed so the next render shows it again
    fn remember(&self, session: &mut Session, input: &FormInput, today: NaiveDate) {
        session.coordinate = Coordinate::new(input.latitude, input.longitude);
        session.range = DateRange::bounded(input.start, input.end, self.earliest, today);
    }

    /// "Usar localização atual": replace the coordinate with the network guess
    pub async fn use_current_location(
        &self,
        session: &mut Session,
        input: Option<&FormInput>,
        today: NaiveDate,
    ) {
        if let Some(input) = input {
            self.remember(session, input, today);
        }
        session.transition(SessionState::LocationRequested);

        match self.locator.resolve_from_network().await {
            Ok(coordinate) => {
                info!("Using network location {}", coordinate.format_coordinates());
                session.coordinate = coordinate;
                session.notice = None;
            }
            Err(e) => {
                warn!("Location lookup failed: {}", e);
                let detail = e
                    .status()
                    .map_or_else(|| e.user_message(), |status| status.to_string());
                session.notice = Some(format!("Erro ao obter a localização: {detail}"));
            }
        }

        session.transition(SessionState::Idle);
    }

    /// "Buscar dados": fetch the daily table for the submitted point and period
    pub async fn fetch_data(&self, session: &mut Session, input: &FormInput, today: NaiveDate) {
        self.remember(session, input, today);
        session.notice = None;

        if let Err(e) = session.coordinate.validate() {
            session.transition(SessionState::FetchFailed {
                message: e.user_message(),
            });
            return;
        }

        session.transition(SessionState::DataRequested);
        let range = session.range;

        let result = self
            .climate
            .fetch(
                session.coordinate.latitude,
                session.coordinate.longitude,
                &range.start_key(),
                &range.end_key(),
            )
            .await;

        match result {
            Ok(records) => {
                info!(
                    "Fetched {} rows for {} ({} days requested)",
                    records.len(),
                    session.coordinate.format_coordinates(),
                    range.days()
                );
                session.transition(SessionState::DataShown { records });
            }
            Err(e) => {
                warn!("Climate fetch failed: {}", e);
                session.transition(SessionState::FetchFailed {
                    message: FETCH_ERROR_MESSAGE.to_string(),
                });
            }
        }
    }

    /// "Baixar em Excel": build the workbook for the table on display
    pub fn export(&self, session: &mut Session) -> Result<ExportedWorkbook> {
        let records = match std::mem::replace(&mut session.state, SessionState::ExportRequested) {
            SessionState::DataShown { records } => records,
            other => {
                session.state = other;
                return Err(ClimaError::validation("there is no data to download"));
            }
        };
        debug!("Session state data_shown -> export_requested");

        let result = export_workbook(&records, &build_catalog());
        session.transition(SessionState::DataShown { records });
        result
    }

    /// Render model for the current session, with the form bounds as of `today`
    #[must_use]
    pub fn view<'a>(&self, session: &'a Session, today: NaiveDate) -> SessionView<'a> {
        let range =
            DateRange::bounded(session.range.start, session.range.end, self.earliest, today);

        let error = match &session.state {
            SessionState::FetchFailed { message } => Some(message.as_str()),
            _ => None,
        };
        let records = session.records().unwrap_or_default();

        SessionView {
            latitude: format!("{:.6}", session.coordinate.latitude),
            longitude: format!("{:.6}", session.coordinate.longitude),
            start: range.start,
            end: range.end,
            start_min: self.earliest,
            start_max: today,
            end_min: range.start,
            end_max: today,
            notice: session.notice.as_deref(),
            error,
            records,
            downloadable: session.records().is_some(),
        }
    }
}

/// Live sessions keyed by the id stored in the browser cookie
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>,
    defaults: DefaultsConfig,
    idle_timeout: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(defaults: DefaultsConfig, idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            defaults,
            idle_timeout,
        }
    }

    /// Return the session for `id`, creating a fresh one when it is unknown.
    ///
    /// The boolean is `true` when a new session was created.
    pub fn open(&self, id: Option<Uuid>, today: NaiveDate) -> (Uuid, Arc<Mutex<Session>>, bool) {
        if let Some(id) = id {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(session) = sessions.get(&id) {
                return (id, Arc::clone(session), false);
            }
        }

        self.prune();

        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(Session::new(&self.defaults, today)));
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&session));
        info!("Started session {}", id);

        (id, session, true)
    }

    /// Discard a session; returns whether it existed
    pub fn end(&self, id: &Uuid) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some();
        if removed {
            info!("Ended session {}", id);
        }
        removed
    }

    /// Drop sessions idle for longer than the timeout; busy sessions are kept
    pub fn prune(&self) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(session) => session.idle_for() <= self.idle_timeout,
            Err(_) => true,
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!("Pruned {} idle sessions", pruned);
        }
        pruned
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
