//! Route handlers.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use appify_chat::{PageView, RuntimeErrorHint, TurnReport};
use appify_commands::{builtin_commands, CommandDef};
use appify_core::UserId;

use crate::auth::RequireUser;
use crate::error::{ApiError, ApiResult};
use crate::server::GatewayState;
use crate::session_registry::SharedSession;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct OpenedPage {
    pub session_id: Uuid,
    pub view: PageView,
}

#[derive(Deserialize)]
pub struct TurnRequest {
    pub instruction: String,
}

#[derive(Deserialize)]
pub struct ApiKeyRequest {
    pub api_key: String,
}

#[derive(Deserialize)]
pub struct FixRequest {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub uptime_seconds: u64,
    pub active_sessions: usize,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

async fn find_session(state: &GatewayState, id: &Uuid, user: UserId) -> ApiResult<SharedSession> {
    state
        .sessions
        .get(id, user)
        .await
        .ok_or_else(|| ApiError::not_found("Unknown session"))
}

/// `POST /api/sessions`: a fresh page load.
pub async fn open_session(
    State(state): State<GatewayState>,
    RequireUser(user): RequireUser,
) -> ApiResult<Json<OpenedPage>> {
    let mut session = state.controller.new_session(user);
    let view = state.controller.open_page(&mut session).await?;
    let session_id = session.id;
    state.sessions.register(session).await;

    info!(%session_id, "[Gateway] Session opened");
    Ok(Json(OpenedPage { session_id, view }))
}

/// `GET /api/sessions/:id`: reload the page of an existing session.
pub async fn reload_session(
    State(state): State<GatewayState>,
    RequireUser(user): RequireUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OpenedPage>> {
    let shared = find_session(&state, &id, user.id).await?;
    let mut session = shared.lock().await;
    let view = state.controller.open_page(&mut session).await?;
    Ok(Json(OpenedPage { session_id: id, view }))
}

/// `POST /api/sessions/:id/turns`
pub async fn submit_turn(
    State(state): State<GatewayState>,
    RequireUser(user): RequireUser,
    Path(id): Path<Uuid>,
    Json(body): Json<TurnRequest>,
) -> ApiResult<Json<TurnReport>> {
    let shared = find_session(&state, &id, user.id).await?;
    let mut session = shared.lock().await;
    let report = state.controller.process_turn(&mut session, &body.instruction).await?;
    Ok(Json(report))
}

/// `POST /api/sessions/:id/api-key`
pub async fn set_api_key(
    State(state): State<GatewayState>,
    RequireUser(user): RequireUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ApiKeyRequest>,
) -> ApiResult<StatusCode> {
    let shared = find_session(&state, &id, user.id).await?;
    let mut session = shared.lock().await;
    state.controller.set_api_key(&mut session, &body.api_key)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/sessions/:id/download`
pub async fn download(
    State(state): State<GatewayState>,
    RequireUser(user): RequireUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    find_session(&state, &id, user.id).await?;
    let file = state
        .controller
        .download()
        .await?
        .ok_or_else(|| ApiError::not_found("No code to download"))?;

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, file.mime),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.content,
    )
        .into_response())
}

/// `DELETE /api/sessions/:id`
pub async fn close_session(
    State(state): State<GatewayState>,
    RequireUser(user): RequireUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.sessions.remove(&id, user.id).await {
        info!(session_id = %id, "[Gateway] Session closed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Unknown session"))
    }
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

/// `GET /api/commands`
pub async fn list_commands() -> Json<&'static [CommandDef]> {
    Json(builtin_commands())
}

/// `POST /api/fix-instruction`
pub async fn build_fix_instruction(Json(body): Json<FixRequest>) -> Json<RuntimeErrorHint> {
    Json(RuntimeErrorHint::for_error(&body.error))
}

/// `GET /api/health`
pub async fn health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        uptime_seconds: state.started_at.elapsed().as_secs(),
        active_sessions: state.sessions.len().await,
        timestamp: Utc::now(),
    })
}
