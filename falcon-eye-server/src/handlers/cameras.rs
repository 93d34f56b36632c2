use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use falcon_eye_core::Engine;
use falcon_eye_types::{Camera, CreateCameraRequest, UpdateCameraRequest};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ProxyApiError};

#[derive(Debug, Deserialize, Default)]
pub struct ListCamerasQuery {
    pub protocol: Option<String>,
    pub status: Option<String>,
    pub node: Option<String>,
}

pub async fn list(State(engine): State<Engine>, Query(q): Query<ListCamerasQuery>) -> Result<Json<Vec<Camera>>, ApiError> {
    let cameras = falcon_eye_core::cameras::list_and_sync(&engine).await?;
    let filtered = cameras
        .into_iter()
        .filter(|c| q.protocol.as_deref().is_none_or(|p| c.protocol.as_str() == p))
        .filter(|c| q.status.as_deref().is_none_or(|s| c.status.as_str() == s))
        .filter(|c| q.node.as_deref().is_none_or(|n| c.node_name.as_deref() == Some(n)))
        .collect();
    Ok(Json(filtered))
}

pub async fn get(State(engine): State<Engine>, Path(id): Path<Uuid>) -> Result<Json<Camera>, ApiError> {
    Ok(Json(falcon_eye_core::cameras::get_and_sync(&engine, id).await?))
}

pub async fn create(
    State(engine): State<Engine>,
    Json(req): Json<CreateCameraRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let camera = falcon_eye_core::cameras::create(&engine, req).await?;
    Ok((StatusCode::CREATED, Json(camera)))
}

pub async fn update(
    State(engine): State<Engine>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCameraRequest>,
) -> Result<Json<Camera>, ApiError> {
    Ok(Json(falcon_eye_core::cameras::update(&engine, id, req).await?))
}

pub async fn delete(State(engine): State<Engine>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    falcon_eye_core::cameras::delete(&engine, id).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn start(State(engine): State<Engine>, Path(id): Path<Uuid>) -> Result<Json<Camera>, ApiError> {
    Ok(Json(falcon_eye_core::cameras::start(&engine, id).await?))
}

pub async fn stop(State(engine): State<Engine>, Path(id): Path<Uuid>) -> Result<Json<Camera>, ApiError> {
    Ok(Json(falcon_eye_core::cameras::stop(&engine, id).await?))
}

pub async fn restart(State(engine): State<Engine>, Path(id): Path<Uuid>) -> Result<Json<Camera>, ApiError> {
    Ok(Json(falcon_eye_core::cameras::restart(&engine, id).await?))
}

/// MJPEG passthrough; the proxy does not reframe (§6 wire protocols).
pub async fn stream(State(engine): State<Engine>, Path(id): Path<Uuid>) -> Result<Response, ProxyApiError> {
    let upstream = falcon_eye_proxy::stream_proxy(&engine.cluster, &engine.db, &engine.http, id).await?;
    let content_type = upstream
        .content_type
        .clone()
        .unwrap_or_else(|| "multipart/x-mixed-replace; boundary=frame".to_string());
    let body = Body::from_stream(falcon_eye_proxy::stream::into_body_stream(upstream.body));
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(body)
        .expect("valid stream response"))
}

#[derive(Debug, Serialize)]
pub struct RecordingStatusResponse {
    pub recording_id: Option<String>,
    pub status: &'static str,
}

pub async fn recording_status(
    State(engine): State<Engine>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecordingStatusResponse>, ApiError> {
    let active = falcon_eye_db::recordings::active_recording_for_camera(&engine.db, id).await?;
    Ok(Json(match active {
        Some(r) => RecordingStatusResponse { recording_id: Some(r.id), status: "recording" },
        None => RecordingStatusResponse { recording_id: None, status: "stopped" },
    }))
}

pub async fn recording_start(State(engine): State<Engine>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    falcon_eye_core::recording::start_recording(&engine, id).await?;
    Ok(StatusCode::OK)
}

pub async fn recording_stop(State(engine): State<Engine>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    falcon_eye_core::recording::stop_recording(&engine, id).await?;
    Ok(StatusCode::OK)
}
