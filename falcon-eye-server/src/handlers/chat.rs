use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use falcon_eye_core::Engine;
use falcon_eye_types::{AgentChatMessage, MessageSource, SaveMessageRequest, SendMessageRequest, SendMessageResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

pub async fn send(
    State(engine): State<Engine>,
    Path(agent_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let source = req.source.as_deref().map(str::parse).transpose().map_err(falcon_eye_core::Error::Validation)?.unwrap_or(MessageSource::Api);
    let response = falcon_eye_core::chat::send_message(
        &engine,
        agent_id,
        req.session_id,
        &req.message,
        source,
        req.source_user.as_deref(),
    )
    .await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub session_id: String,
}

pub async fn history(
    State(engine): State<Engine>,
    Path(agent_id): Path<Uuid>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<AgentChatMessage>>, ApiError> {
    Ok(Json(falcon_eye_core::chat::history(&engine, agent_id, &q.session_id).await?))
}

pub async fn sessions(State(engine): State<Engine>, Path(agent_id): Path<Uuid>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(falcon_eye_core::chat::sessions(&engine, agent_id).await?))
}

#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
}

/// No row to insert: `AgentChatMessage.session_id` is a free-form string,
/// created lazily by the first message written against it.
pub async fn new_session(Path(_agent_id): Path<Uuid>) -> impl IntoResponse {
    (StatusCode::CREATED, Json(NewSessionResponse { session_id: Uuid::new_v4().to_string() }))
}

pub async fn save_message(
    State(engine): State<Engine>,
    Path(agent_id): Path<Uuid>,
    Json(req): Json<SaveMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let saved = falcon_eye_core::chat::save_message(&engine, agent_id, req).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}
