use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use falcon_eye_core::Engine;
use falcon_eye_db::recordings::RecordingPatch;
use falcon_eye_types::{CreateRecordingRequest, Recording, RecordingStatus, UpdateRecordingRequest};
use serde::Deserialize;

use crate::error::{ApiError, ProxyApiError};

#[derive(Debug, Deserialize, Default)]
pub struct ListRecordingsQuery {
    pub camera_id: Option<uuid::Uuid>,
    pub status: Option<String>,
    #[serde(default)]
    pub offset: i64,
    pub limit: Option<i64>,
}

pub async fn list(State(engine): State<Engine>, Query(q): Query<ListRecordingsQuery>) -> Result<Json<Vec<Recording>>, ApiError> {
    let limit = q.limit.unwrap_or(100).min(1000);
    let recordings = match q.camera_id {
        Some(camera_id) => falcon_eye_db::recordings::list_recordings_for_camera(&engine.db, camera_id, q.offset, limit).await?,
        None => falcon_eye_db::recordings::list_recordings(&engine.db, q.offset, limit).await?,
    };
    let filtered = recordings
        .into_iter()
        .filter(|r| q.status.as_deref().is_none_or(|s| r.status.as_str() == s))
        .collect();
    Ok(Json(filtered))
}

/// Recorder-pod-only: the recorder that just started a file calls this to
/// register the row.
pub async fn create(State(engine): State<Engine>, Json(req): Json<CreateRecordingRequest>) -> Result<impl IntoResponse, ApiError> {
    let now = chrono::Utc::now();
    let recording = Recording {
        id: falcon_eye_types::recording_id(req.camera_id, now),
        camera_id: Some(req.camera_id),
        camera_name: req.camera_name,
        file_path: req.file_path,
        file_name: req.file_name,
        start_time: now,
        end_time: None,
        duration_seconds: None,
        file_size_bytes: None,
        status: RecordingStatus::Recording,
        error_message: None,
        node_name: req.node_name,
        camera_deleted: false,
    };
    let inserted = falcon_eye_db::recordings::insert_recording(&engine.db, &recording).await?;
    Ok((StatusCode::CREATED, Json(inserted)))
}

/// Recorder-pod-only: PATCHes status/end_time/file_size_bytes/error_message
/// as a recording progresses towards `completed`/`failed`.
pub async fn update(
    State(engine): State<Engine>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRecordingRequest>,
) -> Result<Json<Recording>, ApiError> {
    let status: Option<RecordingStatus> = req.status.as_deref().map(str::parse).transpose().map_err(falcon_eye_core::Error::Validation)?;
    let existing = falcon_eye_db::recordings::get_recording(&engine.db, &id).await?;
    let duration_seconds = req.end_time.map(|end| (end - existing.start_time).num_seconds());
    let patch = RecordingPatch {
        status: status.map(|s| s.as_str()),
        end_time: req.end_time,
        duration_seconds,
        file_size_bytes: req.file_size_bytes,
        error_message: req.error_message,
        ..Default::default()
    };
    Ok(Json(falcon_eye_db::recordings::update_recording(&engine.db, &id, patch).await?))
}

#[derive(Debug, Deserialize, Default)]
pub struct DeleteRecordingQuery {
    #[serde(default)]
    pub delete_file: bool,
}

pub async fn delete(
    State(engine): State<Engine>,
    Path(id): Path<String>,
    Query(q): Query<DeleteRecordingQuery>,
) -> Result<StatusCode, ApiError> {
    if q.delete_file
        && let Ok(recording) = falcon_eye_db::recordings::get_recording(&engine.db, &id).await
        && let Some(node_name) = &recording.node_name
        && let Ok(ip) = engine.nodes.resolve(node_name).await
    {
        let url = format!("http://{ip}:8080{}", recording.file_path);
        if let Err(err) = engine.http.delete(&url).send().await {
            tracing::warn!(recording_id = %id, error = %err, "failed to delete recording file on node");
        }
    }
    let deleted = falcon_eye_db::recordings::delete_recording(&engine.db, &id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(falcon_eye_core::Error::NotFound.into())
    }
}

pub async fn download(State(engine): State<Engine>, Path(id): Path<String>) -> Result<Response, ProxyApiError> {
    let upstream = falcon_eye_proxy::download_recording(&engine.db, &engine.nodes, &engine.http, &id).await?;
    let content_type = upstream
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("video/mp4")
        .to_string();
    let body = axum::body::Body::from_stream(upstream.bytes_stream());
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(axum::http::header::CONTENT_TYPE, content_type)
        .body(body)
        .expect("valid download response"))
}
