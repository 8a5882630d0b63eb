use axum::{
    Router,
    extract::{DefaultBodyLimit, State, multipart::MultipartError},
    http::StatusCode,
    middleware::from_fn,
    response::Json,
    routing::{get, post},
};
use chrono::Local;
use fraud_intake::{
    DashboardAggregate, InMemorySessionStorage, RandomSource, SeededRandom, SessionStorage,
    SystemSnapshot, ThreadRandom, dashboard_aggregate, system_snapshot,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, PoisonError};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    api, backend,
    config::{RelayTimeouts, ServiceConfig},
    relay::{RelayClient, RelayError},
    sessions,
    telemetry::correlation_id_middleware,
};

pub(crate) const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub type ApiError = (StatusCode, Json<Value>);
pub type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

/// Multipart failures keep axum's status, so oversized bodies answer 413
pub fn multipart_error(err: &MultipartError) -> ApiError {
    (err.status(), Json(json!({ "error": err.body_text() })))
}

pub fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "session_id": id
        })),
    )
}

pub fn conflict_error(message: &str) -> ApiError {
    (StatusCode::CONFLICT, Json(json!({ "error": message })))
}

pub fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

/// Random source shared by every handler
#[derive(Clone)]
pub struct SharedRandom(Arc<Mutex<dyn RandomSource>>);

impl SharedRandom {
    pub fn new(source: impl RandomSource + 'static) -> Self {
        Self(Arc::new(Mutex::new(source)))
    }

    pub fn thread() -> Self {
        Self::new(ThreadRandom)
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(SeededRandom::new(seed))
    }

    /// Run `f` with exclusive access to the source. Never hold across an await.
    pub fn with<T>(&self, f: impl FnOnce(&mut dyn RandomSource) -> T) -> T {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub session_storage: Arc<dyn SessionStorage>,
    pub relay: RelayClient,
    pub rng: SharedRandom,
}

impl AppState {
    pub fn new(
        backend_url: impl Into<String>,
        timeouts: RelayTimeouts,
        session_storage: Arc<dyn SessionStorage>,
        rng: SharedRandom,
    ) -> Result<Self, RelayError> {
        Ok(Self {
            session_storage,
            relay: RelayClient::new(backend_url, timeouts)?,
            rng,
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, RelayError> {
        Self::new(
            config.backend_url.clone(),
            config.timeouts,
            Arc::new(InMemorySessionStorage::new()),
            SharedRandom::thread(),
        )
    }
}

pub fn create_app(config: &ServiceConfig) -> Result<Router, RelayError> {
    let state = AppState::from_config(config)?;
    Ok(build_router(state))
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/dashboard", get(dashboard))
        .route("/monitoring", get(monitoring))
        // review sessions
        .route("/sessions", post(sessions::create_session))
        .route(
            "/sessions/{session_id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/sessions/{session_id}/claims", post(sessions::upload_claim))
        .route("/sessions/{session_id}/explain", post(sessions::explain_claim))
        .route("/sessions/{session_id}/chat", post(sessions::chat))
        .route("/sessions/{session_id}/evaluate", post(sessions::evaluate))
        // relay to BACKEND_URL
        .route("/api/upload", post(api::upload))
        .route("/api/fraud/ingest", post(api::fraud_ingest))
        .route("/api/fraud/analyze", post(api::fraud_analyze))
        .route("/api/chat", post(api::chat))
        .route("/api/evaluate", post(api::evaluate))
        // mock backend
        .route("/v1/extract", post(backend::extract))
        .route("/v1/chat", post(backend::chat))
        .route("/v1/fraud/ingest_to_graph", post(backend::ingest_to_graph))
        .route("/v1/fraud/analyze", post(backend::analyze))
        .route("/v1/evaluate", post(backend::evaluate))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id_middleware))
        .with_state(app_state)
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": "Fraud Review Service",
        "version": env!("CARGO_PKG_VERSION"),
        "backend_url": state.relay.base_url(),
        "endpoints": {
            "POST /sessions": "Start a review session",
            "GET /sessions/{session_id}": "Get session state",
            "DELETE /sessions/{session_id}": "End a review session",
            "POST /sessions/{session_id}/claims": "Upload a claim document (multipart)",
            "POST /sessions/{session_id}/explain": "Ask about the last claim",
            "POST /sessions/{session_id}/chat": "Chat with the assistant",
            "POST /sessions/{session_id}/evaluate": "Run a mock model evaluation",
            "GET /dashboard": "Fraud analytics for the last 30 days",
            "GET /monitoring": "System and LLM usage figures",
            "POST /api/upload": "Relay a document to the backend extractor",
            "POST /api/fraud/ingest": "Relay extracted fields to graph ingestion",
            "POST /api/fraud/analyze": "Relay graph data to fraud analysis",
            "POST /api/chat": "Relay a chat message to the backend",
            "POST /api/evaluate": "Relay an evaluation run to the backend",
            "POST /v1/*": "Mock backend contract",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn dashboard(State(state): State<AppState>) -> Json<DashboardAggregate> {
    let today = Local::now().date_naive();
    Json(state.rng.with(|rng| dashboard_aggregate(rng, today)))
}

async fn monitoring(State(state): State<AppState>) -> Json<SystemSnapshot> {
    let now = Local::now().naive_local();
    Json(state.rng.with(|rng| system_snapshot(rng, now)))
}
