use axum::extract::{Path, State};
use axum::Json;
use falcon_eye_core::Engine;
use falcon_eye_types::{CronJob, RecordCronRunRequest};
use uuid::Uuid;

use crate::error::ApiError;

/// Callback invoked by the cron-runner pod once a scheduled prompt
/// completes, fails, or times out. Not part of the user-facing cron
/// surface (jobs are created/managed only via the `create_cron_job` chat
/// tool) — this is the pod-to-core reporting path, same family as
/// `chat::save_message` and the recording status PATCH.
pub async fn record_run(
    State(engine): State<Engine>,
    Path(id): Path<Uuid>,
    Json(req): Json<RecordCronRunRequest>,
) -> Result<Json<CronJob>, ApiError> {
    Ok(Json(falcon_eye_core::cron::record_run(&engine, id, &req.status, req.summary.as_deref()).await?))
}
