//! Recording Supervisor (C7): at-most-one active recording per camera,
//! on-demand recorder deployment, orphan repair.

use std::time::Duration;

use chrono::Utc;
use falcon_eye_cluster::PodSummary;
use falcon_eye_types::{labels, Camera, EntityStatus};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::engine::Engine;
use crate::error::Error;

const READINESS_TIMEOUT: Duration = Duration::from_secs(20);
const READINESS_POLL_INTERVAL: Duration = Duration::from_millis(500);

fn recorder_url(camera: &Camera, namespace: &str) -> String {
    format!(
        "http://{}.{}.svc.cluster.local:{}/",
        falcon_eye_types::naming::recorder_service_name(&camera.slug),
        namespace,
        falcon_eye_manifest::resources::CONTROL_PORT
    )
}

/// Returns the recorder's internal URL, deploying it first if absent and
/// waiting (bounded) for readiness. `503` (`Error::Transient`) on timeout.
pub async fn ensure_recorder(engine: &Engine, camera: &Camera) -> Result<String, Error> {
    let selector = labels::selector(labels::RECORDER_FOR, &camera.id.to_string());
    let status = engine.cluster.get_pod_status_for_selector(&selector).await?;

    if matches!(status, Some(PodSummary::Running)) {
        return Ok(recorder_url(camera, &engine.config.namespace));
    }

    let deployment = falcon_eye_manifest::render_recorder_deployment(
        camera,
        &engine.config.api_url,
        &engine.config.namespace,
    );
    let service = falcon_eye_manifest::render_recorder_service(camera);
    let deployment_name = deployment.metadata.name.clone().unwrap_or_default();
    let service_name = service.metadata.name.clone().unwrap_or_default();
    engine.cluster.apply_deployment(&deployment_name, deployment).await?;
    engine.cluster.apply_service(&service_name, service).await?;

    let cancel = CancellationToken::new();
    let engine_ref = engine.clone();
    let selector = selector.clone();
    let ready = falcon_eye_common::wait::poll_until(&cancel, READINESS_TIMEOUT, READINESS_POLL_INTERVAL, || {
        let engine_ref = engine_ref.clone();
        let selector = selector.clone();
        async move {
            let status = engine_ref.cluster.get_pod_status_for_selector(&selector).await?;
            Ok(matches!(status, Some(PodSummary::Running)).then_some(()))
        }
    })
    .await;

    match ready {
        Ok(()) => Ok(recorder_url(camera, &engine.config.namespace)),
        Err(_) => Err(Error::Transient("recorder still deploying".to_string())),
    }
}

pub async fn start_recording(engine: &Engine, camera_id: Uuid) -> Result<(), Error> {
    let camera = falcon_eye_db::cameras::get_camera(&engine.db, camera_id).await?;
    if camera.status != EntityStatus::Running || camera.stream_port.is_none() {
        return Err(Error::Validation(falcon_eye_types::ValidationError::Malformed(
            "status",
            "camera must be running with an allocated stream port".to_string(),
        )));
    }
    if falcon_eye_db::recordings::active_recording_for_camera(&engine.db, camera_id)
        .await?
        .is_some()
    {
        return Err(Error::Conflict("a recording is already active for this camera".to_string()));
    }

    let url = ensure_recorder(engine, &camera).await?;
    engine
        .http
        .post(format!("{url}start"))
        .send()
        .await
        .map_err(|e| Error::Transient(e.to_string()))?
        .error_for_status()
        .map_err(|e| Error::Transient(e.to_string()))?;
    Ok(())
}

pub async fn stop_recording(engine: &Engine, camera_id: Uuid) -> Result<(), Error> {
    let camera = falcon_eye_db::cameras::get_camera(&engine.db, camera_id).await?;
    let selector = labels::selector(labels::RECORDER_FOR, &camera_id.to_string());
    if engine.cluster.get_pod_status_for_selector(&selector).await?.is_none() {
        return Err(Error::Validation(falcon_eye_types::ValidationError::Malformed(
            "recorder",
            "no recorder deployed for this camera".to_string(),
        )));
    }
    let url = recorder_url(&camera, &engine.config.namespace);
    engine
        .http
        .post(format!("{url}stop"))
        .send()
        .await
        .map_err(|e| Error::Transient(e.to_string()))?
        .error_for_status()
        .map_err(|e| Error::Transient(e.to_string()))?;
    Ok(())
}

/// Called on status reads: a `recording` row with no live recorder pod is
/// stopped with `error_message="recorder pod gone"`.
pub async fn repair_orphaned(engine: &Engine, camera_id: Uuid) -> Result<(), Error> {
    let Some(active) = falcon_eye_db::recordings::active_recording_for_camera(&engine.db, camera_id).await? else {
        return Ok(());
    };
    let selector = labels::selector(labels::RECORDER_FOR, &camera_id.to_string());
    if engine.cluster.get_pod_status_for_selector(&selector).await?.is_some() {
        return Ok(());
    }
    let patch = falcon_eye_db::recordings::RecordingPatch {
        status: Some("stopped"),
        end_time: Some(Utc::now()),
        error_message: Some("recorder pod gone".to_string()),
        ..Default::default()
    };
    falcon_eye_db::recordings::update_recording(&engine.db, &active.id, patch).await?;
    Ok(())
}
