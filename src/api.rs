//! REST API Server for the itinerary planner
//!
//! Exposes planning sessions over HTTP. Each session owns one plan
//! controller; generations run as background tasks.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::auth;
use crate::booking::{self, ConfirmationText};
use crate::error::PlannerError;
use crate::i18n::Catalog;
use crate::models::{ItineraryPlan, Language, SessionContext, User};
use crate::provider::ItineraryProvider;
use crate::session::PlanSession;
use crate::share;
use crate::state::{Outcome, PlanSnapshot};
use crate::validation::{PreferenceValidator, RawTripInput};

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub language: Language,
    /// Page address the session starts on; may carry a share token
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    pub language: Language,
}

#[derive(Debug, Deserialize)]
pub struct ShareQuery {
    pub lang: Option<Language>,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn ok<T: Serialize>(data: T) -> ApiResult {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

fn fail(status: StatusCode, message: impl Into<String>) -> ApiResult {
    (status, Json(ApiResponse::error(message.into())))
}

/// =============================
/// API State
/// =============================

/// Sessions untouched for this long are evicted
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 60);

/// Live sessions kept at most; the least recently used one goes first
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct SessionEntry {
    session: Arc<PlanSession>,
    last_seen: Instant,
}

#[derive(Clone)]
pub struct ApiState {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    provider: Arc<dyn ItineraryProvider>,
    validator: Arc<PreferenceValidator>,
    catalog: Arc<Catalog>,
    public_base_url: String,
    session_idle: Duration,
    max_sessions: usize,
}

impl ApiState {
    pub fn new(
        provider: Arc<dyn ItineraryProvider>,
        validator: PreferenceValidator,
        catalog: Catalog,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            provider,
            validator: Arc::new(validator),
            catalog: Arc::new(catalog),
            public_base_url: public_base_url.into(),
            session_idle: DEFAULT_SESSION_IDLE,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    pub fn with_session_limits(mut self, idle: Duration, max_sessions: usize) -> Self {
        self.session_idle = idle;
        self.max_sessions = max_sessions.max(1);
        self
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Look up a session and mark it as used
    async fn session(&self, id: Uuid) -> Result<Arc<PlanSession>, ApiResult> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(entry) => {
                entry.last_seen = Instant::now();
                Ok(entry.session.clone())
            }
            None => Err(fail(
                StatusCode::NOT_FOUND,
                PlannerError::SessionNotFound(id.to_string()).to_string(),
            )),
        }
    }

    async fn insert_session(&self, id: Uuid, session: Arc<PlanSession>) {
        let evicted = {
            let mut sessions = self.sessions.write().await;
            let oldest = if sessions.len() >= self.max_sessions {
                sessions
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_seen)
                    .map(|(key, _)| *key)
            } else {
                None
            };
            let evicted = oldest.and_then(|old| sessions.remove(&old).map(|e| (old, e.session)));

            sessions.insert(
                id,
                SessionEntry {
                    session,
                    last_seen: Instant::now(),
                },
            );
            evicted
        };

        if let Some((old, session)) = evicted {
            session.logout().await;
            info!(session_id = %old, "Session limit reached; evicted least recently used");
        }
    }

    /// Remove a session and sign its user out
    async fn remove_session(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(entry) => {
                entry.session.logout().await;
                true
            }
            None => false,
        }
    }

    /// Evict every session idle for at least `session_idle`.
    /// Returns how many were removed.
    pub async fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<(Uuid, Arc<PlanSession>)> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, entry)| now.duration_since(entry.last_seen) >= self.session_idle)
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| sessions.remove(&id).map(|e| (id, e.session)))
                .collect()
        };

        for (id, session) in &expired {
            session.logout().await;
            info!(session_id = %id, "Idle session evicted");
        }
        expired.len()
    }

    /// Background task running `evict_idle` every half idle period
    pub fn spawn_session_reaper(&self) -> JoinHandle<()> {
        let state = self.clone();
        let period = (self.session_idle / 2).max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                state.evict_idle().await;
            }
        })
    }
}

/// Snapshot plus the derived values a client renders
#[derive(Debug, Serialize)]
struct SessionView {
    session_id: Uuid,
    user: Option<User>,
    #[serde(flatten)]
    snapshot: PlanSnapshot,
    share_url: Option<String>,
    confirmation: Option<ConfirmationText>,
}

async fn view(state: &ApiState, session_id: Uuid, session: &PlanSession) -> SessionView {
    let snapshot = session.snapshot().await;
    let context = session.context().await;
    let plan = snapshot.state.plan().cloned();

    let share_url = plan
        .as_deref()
        .and_then(|p| share::share_url(&state.public_base_url, p).ok());

    let confirmation = match (&snapshot.receipt, plan.as_deref()) {
        (Some(_), Some(p)) => Some(booking::confirmation_text(
            state.catalog.get(context.language),
            p,
            context.user.as_ref(),
        )),
        _ => None,
    };

    SessionView {
        session_id,
        user: context.user,
        snapshot,
        share_url,
        confirmation,
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Session Endpoints
/// =============================

async fn create_session(
    State(state): State<ApiState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult {
    let translations = state.catalog.get(req.language).clone();

    let user = match auth::login(&req.name, &req.email, &req.password) {
        Ok(user) => user,
        Err(e) => return fail(StatusCode::BAD_REQUEST, translations.login_message(&e)),
    };

    let address = req
        .address
        .unwrap_or_else(|| state.public_base_url.clone());

    let session = Arc::new(PlanSession::open(
        SessionContext::new(Some(user), req.language),
        translations,
        &address,
        state.provider.clone(),
        state.validator.clone(),
    ));

    let session_id = Uuid::new_v4();
    state.insert_session(session_id, session.clone()).await;

    info!(%session_id, language = req.language.code(), "Session created");

    (
        StatusCode::CREATED,
        Json(ApiResponse::success(view(&state, session_id, &session).await)),
    )
}

async fn get_session(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    match state.session(id).await {
        Ok(session) => ok(view(&state, id, &session).await),
        Err(response) => response,
    }
}

async fn end_session(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    if state.remove_session(id).await {
        info!(session_id = %id, "Session ended");
        ok(serde_json::json!({ "session_id": id }))
    } else {
        fail(
            StatusCode::NOT_FOUND,
            PlannerError::SessionNotFound(id.to_string()).to_string(),
        )
    }
}

async fn set_language(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(req): Json<LanguageRequest>,
) -> ApiResult {
    let session = match state.session(id).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    session
        .set_language(req.language, state.catalog.get(req.language).clone())
        .await;
    ok(view(&state, id, &session).await)
}

/// =============================
/// Planning Endpoints
/// =============================

async fn generate_itinerary(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(mut input): Json<RawTripInput>,
) -> ApiResult {
    let session = match state.session(id).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let context = session.context().await;
    input.language = context.language;

    match session.start(&input).await {
        Ok(Some(pending)) => {
            info!(session_id = %id, generation = pending.generation, "Generation started");
            let background = session.clone();
            tokio::spawn(async move {
                background.complete(pending).await;
            });
            (
                StatusCode::ACCEPTED,
                Json(ApiResponse::success(view(&state, id, &session).await)),
            )
        }
        Ok(None) => fail(StatusCode::CONFLICT, "A generation is already in progress"),
        Err(PlannerError::Validation(e)) => fail(
            StatusCode::BAD_REQUEST,
            state.catalog.get(context.language).validation_message(&e),
        ),
        Err(e) => fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn transition(
    state: &ApiState,
    id: Uuid,
    outcome: Outcome,
    session: &PlanSession,
) -> ApiResult {
    match outcome {
        Outcome::Rejected { event, state: current } => fail(
            StatusCode::CONFLICT,
            format!("Cannot {} while {}", event.replace('_', " "), current),
        ),
        _ => ok(view(state, id, session).await),
    }
}

async fn start_booking(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    match state.session(id).await {
        Ok(session) => {
            let outcome = session.start_booking().await;
            transition(&state, id, outcome, &session).await
        }
        Err(response) => response,
    }
}

async fn confirm_booking(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    match state.session(id).await {
        Ok(session) => {
            let outcome = session.confirm_booking().await;
            transition(&state, id, outcome, &session).await
        }
        Err(response) => response,
    }
}

async fn cancel_booking(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    match state.session(id).await {
        Ok(session) => {
            let outcome = session.cancel_booking().await;
            transition(&state, id, outcome, &session).await
        }
        Err(response) => response,
    }
}

async fn reset(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    match state.session(id).await {
        Ok(session) => {
            let outcome = session.reset().await;
            transition(&state, id, outcome, &session).await
        }
        Err(response) => response,
    }
}

/// =============================
/// Share & Localization Endpoints
/// =============================

async fn encode_share(
    State(state): State<ApiState>,
    Json(plan): Json<ItineraryPlan>,
) -> ApiResult {
    match (share::encode(&plan), share::share_url(&state.public_base_url, &plan)) {
        (Ok(token), Ok(url)) => ok(serde_json::json!({ "token": token, "url": url })),
        (Err(e), _) | (_, Err(e)) => fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn decode_share(
    State(state): State<ApiState>,
    Path(token): Path<String>,
    Query(query): Query<ShareQuery>,
) -> ApiResult {
    match share::decode(&token) {
        Ok(plan) => ok(plan),
        Err(e) => {
            info!("Rejected share token: {}", e);
            let language = query.lang.unwrap_or_default();
            fail(
                StatusCode::BAD_REQUEST,
                state.catalog.get(language).error_shared_itinerary.clone(),
            )
        }
    }
}

async fn translations(State(state): State<ApiState>, Path(code): Path<String>) -> ApiResult {
    match code.parse::<Language>() {
        Ok(language) => {
            let t = state.catalog.get(language);
            ok(serde_json::json!({
                "language": language,
                "native_name": language.native_name(),
                "strings": t,
            }))
        }
        Err(e) => fail(StatusCode::NOT_FOUND, e),
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(end_session))
        .route("/api/sessions/:id/language", post(set_language))
        .route("/api/sessions/:id/itinerary", post(generate_itinerary))
        .route("/api/sessions/:id/booking/start", post(start_booking))
        .route("/api/sessions/:id/booking/confirm", post(confirm_booking))
        .route("/api/sessions/:id/booking/cancel", post(cancel_booking))
        .route("/api/sessions/:id/reset", post(reset))
        .route("/api/share", post(encode_share))
        .route("/api/share/:token", get(decode_share))
        .route("/api/translations/:code", get(translations))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let reaper = state.spawn_session_reaper();
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    let served = axum::serve(listener, router).await;
    reaper.abort();
    served?;

    Ok(())
}
