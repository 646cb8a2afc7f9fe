//! HTTP surface of the event tracker.
//!
//! [`serve`] wires the store, the event cache, the refresh scheduler and the
//! axum router together. [`build_state`] and [`router`] are public so tests
//! can mount the same routes on an ephemeral listener.
//!
//! ## Endpoints
//!
//! - `POST /signup`, `POST /login`, `GET /dashboard` — user accounts
//! - `POST /employee`, `GET /employee?search=` — employee directory
//! - `GET /employee/events/current-month` — month events computed on demand
//! - `GET /employee/birthdays?search=`, `GET /employee/anniversary?search=` — countdowns
//! - `GET /events/today`, `GET /events/month?search=` — cached event sets
//! - `GET /health` — cache counts, last refresh time and recent scheduler runs

mod auth;
mod employees;
pub mod error;
mod events;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{Method, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDateTime;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::auth::Authenticator;
use crate::config::BatConfig;
use crate::error::{BatError, Result};
use crate::events::EventCache;
use crate::scheduler::runner::Clock;
use crate::scheduler::tasks::local_now;
use crate::scheduler::{RunLog, Scheduler, TaskExecutor};
use crate::store::{SqliteStore, Store};

pub use error::ApiError;

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub cache: Arc<EventCache>,
    pub auth: Arc<Authenticator>,
    /// Runs recorded by the refresh scheduler.
    pub runs: Arc<RunLog>,
    /// Wall clock used by the on-demand event views.
    clock: Clock,
}

impl AppState {
    /// State with an empty cache over `store`.
    pub fn new(store: Arc<dyn Store>, auth: Authenticator) -> Self {
        Self {
            cache: Arc::new(EventCache::new(Arc::clone(&store))),
            store,
            auth: Arc::new(auth),
            runs: Arc::new(RunLog::default()),
            clock: Arc::new(local_now),
        }
    }

    /// Replace the wall clock used by the on-demand views.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }
}

/// `?search=` query parameter shared by the filtered views.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Option<String>,
}

impl SearchQuery {
    /// The search term, `None` when absent or blank.
    pub fn term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/dashboard", get(auth::dashboard))
        .route("/employee", get(employees::list).post(employees::create))
        .route(
            "/employee/events/current-month",
            get(employees::current_month),
        )
        .route("/employee/birthdays", get(employees::birthdays))
        .route("/employee/anniversary", get(employees::anniversaries))
        .route("/events/today", get(events::today))
        .route("/events/month", get(events::month))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "today_count": state.cache.today().len(),
        "month_count": state.cache.month(None).len(),
        "last_refreshed_at": state.cache.last_refreshed_at(),
        "recent_runs": state.runs.recent(),
    }))
}

/// Open the store and fill both cache fields once.
///
/// A failed refresh is logged and leaves that field empty; the state is still
/// returned so the service can start.
///
/// # Errors
///
/// Returns an error if the store cannot be opened.
pub async fn build_state(config: &BatConfig) -> Result<AppState> {
    info!("opening store at {}", config.database.path.display());
    let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&config.database.path)?);
    let state = AppState::new(store, Authenticator::from_config(&config.auth));

    let _ = state.cache.refresh_today().await;
    let _ = state.cache.refresh_month().await;
    Ok(state)
}

/// Run the service until Ctrl+C or SIGTERM.
///
/// Builds the state with [`build_state`], starts the refresh scheduler, then
/// binds `{server.host}:{server.port}`.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the listener cannot bind.
pub async fn serve(config: BatConfig) -> Result<()> {
    let state = build_state(&config).await?;

    let scheduler = Scheduler::new(Arc::clone(&state.cache) as Arc<dyn TaskExecutor>)
        .with_run_log(Arc::clone(&state.runs))
        .with_event_refreshes(&config.schedule);
    let scheduler_handle = scheduler.run();

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| BatError::Server(format!("bind {bind_addr} failed: {e}")))?;
    let local_addr = listener.local_addr()?;
    info!("bat server listening on http://{local_addr}");

    let served = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;
    scheduler_handle.abort();
    served.map_err(|e| BatError::Server(e.to_string()))?;

    info!("bat server shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("cannot install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("cannot install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
