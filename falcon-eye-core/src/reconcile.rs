//! Status Reconciler (C6). Runs in the read path (synchronous, bounded per
//! request) and again inside the Sweeper (C10). Idempotent and safe under
//! concurrent invocation: every write is a single `UPDATE ... WHERE id`.

use chrono::Utc;
use falcon_eye_cluster::PodSummary;
use falcon_eye_types::{labels, Camera, EntityStatus};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use uuid::Uuid;

use crate::engine::Engine;
use crate::error::Error;

/// Syncs one camera row with live pod state. Returns the possibly-updated
/// row; never fails the caller's read on a cluster hiccup (cluster errors
/// are logged and the stored row is returned unchanged).
pub async fn sync_camera(engine: &Engine, camera: Camera) -> Camera {
    let Some(_deployment_name) = camera.deployment_name.clone() else {
        return camera;
    };
    if camera.status == EntityStatus::Deleting || camera.status == EntityStatus::Stopped {
        return camera;
    }

    let selector = labels::selector(labels::CAMERA_ID, &camera.id.to_string());
    let pod_status = match engine.cluster.get_pod_status_for_selector(&selector).await {
        Ok(status) => status,
        Err(err) => {
            tracing::warn!(camera_id = %camera.id, error = %err, "status reconciler: cluster read failed");
            return camera;
        }
    };

    let age = Utc::now().signed_duration_since(camera.updated_at);
    let timeout = chrono::Duration::minutes(engine.config.creating_timeout_minutes);

    let next_status = match pod_status {
        Some(PodSummary::Running) => Some(EntityStatus::Running),
        Some(ref s) if s.is_failing() => Some(EntityStatus::Error),
        None if camera.status == EntityStatus::Creating && age >= timeout => {
            evict_stuck_camera(engine, &camera).await;
            return reload(engine, camera.id).await.unwrap_or(camera);
        }
        _ => None,
    };

    let Some(next_status) = next_status else {
        return camera;
    };
    if next_status == camera.status {
        return camera;
    }

    let error_message = match &pod_status {
        Some(PodSummary::Waiting { reason: Some(r) }) => Some(r.clone()),
        Some(PodSummary::Terminated { reason }) => reason.clone().or(Some("terminated".to_string())),
        _ => None,
    };

    falcon_eye_common::metrics::domain::record_reconcile_transition(
        "camera",
        camera.status.as_str(),
        next_status.as_str(),
    );

    let mut metadata = camera.metadata.clone();
    if let Some(msg) = &error_message {
        metadata.insert("error".to_string(), serde_json::Value::String(msg.clone()));
    }

    let patch = falcon_eye_db::cameras::CameraPatch {
        status: Some(next_status.as_str()),
        metadata: Some(serde_json::to_value(&metadata).unwrap_or_default()),
        ..Default::default()
    };

    match falcon_eye_db::cameras::update_camera(&engine.db, camera.id, patch).await {
        Ok(updated) => updated,
        Err(err) => {
            tracing::warn!(camera_id = %camera.id, error = %err, "status reconciler: db update failed");
            camera
        }
    }
}

/// A `creating` row older than `creating_timeout_minutes`: tear down
/// whatever workloads exist and mark the row `error`, "stuck creating".
async fn evict_stuck_camera(engine: &Engine, camera: &Camera) {
    tracing::warn!(camera_id = %camera.id, "status reconciler: evicting stuck-creating camera");
    let camera_sel = labels::selector(labels::CAMERA_ID, &camera.id.to_string());
    let recorder_sel = labels::selector(labels::RECORDER_FOR, &camera.id.to_string());
    for sel in [&camera_sel, &recorder_sel] {
        let _ = engine.cluster.delete_by_labels::<Deployment>(sel).await;
        let _ = engine.cluster.delete_by_labels::<Service>(sel).await;
    }
    let mut metadata = camera.metadata.clone();
    metadata.insert("error".to_string(), serde_json::Value::String("stuck creating".to_string()));
    let patch = falcon_eye_db::cameras::CameraPatch {
        status: Some(EntityStatus::Error.as_str()),
        metadata: Some(serde_json::to_value(&metadata).unwrap_or_default()),
        ..Default::default()
    };
    if let Err(err) = falcon_eye_db::cameras::update_camera(&engine.db, camera.id, patch).await {
        tracing::warn!(camera_id = %camera.id, error = %err, "failed to record stuck-creating eviction");
    }
}

async fn reload(engine: &Engine, id: Uuid) -> Result<Camera, Error> {
    Ok(falcon_eye_db::cameras::get_camera(&engine.db, id).await?)
}

/// Status Reconciler applied across the whole fleet, the shape the Sweeper
/// and `GET /api/cameras/` both need.
pub async fn sync_all_cameras(engine: &Engine) -> Result<Vec<Camera>, Error> {
    let cameras = falcon_eye_db::cameras::list_cameras(&engine.db).await?;
    let mut synced = Vec::with_capacity(cameras.len());
    for camera in cameras {
        synced.push(sync_camera(engine, camera).await);
    }
    Ok(synced)
}
