use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use falcon_eye_core::Engine;
use falcon_eye_types::{Agent, CreateAgentRequest, UpdateAgentRequest};
use uuid::Uuid;

use crate::error::ApiError;

pub async fn list(State(engine): State<Engine>) -> Result<Json<Vec<Agent>>, ApiError> {
    Ok(Json(falcon_eye_core::agents::list(&engine).await?))
}

pub async fn get(State(engine): State<Engine>, Path(id): Path<Uuid>) -> Result<Json<Agent>, ApiError> {
    Ok(Json(falcon_eye_core::agents::get(&engine, id).await?))
}

pub async fn create(State(engine): State<Engine>, Json(req): Json<CreateAgentRequest>) -> Result<impl IntoResponse, ApiError> {
    let agent = falcon_eye_core::agents::create(&engine, req).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

pub async fn update(
    State(engine): State<Engine>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAgentRequest>,
) -> Result<Json<Agent>, ApiError> {
    Ok(Json(falcon_eye_core::agents::update(&engine, id, req).await?))
}

pub async fn delete(State(engine): State<Engine>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    falcon_eye_core::agents::delete(&engine, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn start(State(engine): State<Engine>, Path(id): Path<Uuid>) -> Result<Json<Agent>, ApiError> {
    Ok(Json(falcon_eye_core::agents::start(&engine, id).await?))
}

pub async fn stop(State(engine): State<Engine>, Path(id): Path<Uuid>) -> Result<Json<Agent>, ApiError> {
    Ok(Json(falcon_eye_core::agents::stop(&engine, id).await?))
}

pub async fn restart(State(engine): State<Engine>, Path(id): Path<Uuid>) -> Result<Json<Agent>, ApiError> {
    Ok(Json(falcon_eye_core::agents::restart(&engine, id).await?))
}
