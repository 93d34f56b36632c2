//! Lifecycle Controller (C5) for Camera entities.

use std::time::Duration;

use chrono::Utc;
use falcon_eye_types::{labels, Camera, CreateCameraRequest, EntityStatus, Protocol, UpdateCameraRequest};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::engine::Engine;
use crate::error::Error;
use crate::reconcile;

const DELETE_GRACE: Duration = Duration::from_secs(15);
const USB_DELETE_GRACE: Duration = Duration::from_secs(15);

pub async fn create(engine: &Engine, req: CreateCameraRequest) -> Result<Camera, Error> {
    let camera = Camera::new(req)?;

    match camera.protocol {
        Protocol::Usb => {
            let node_name = camera.node_name.clone().unwrap_or_default();
            let device_path = camera.device_path.clone().unwrap_or_default();
            if falcon_eye_db::cameras::find_usb_camera(&engine.db, &node_name, &device_path)
                .await?
                .is_some()
            {
                return Err(Error::Conflict(format!(
                    "camera already registered for {node_name}:{device_path}"
                )));
            }
            let inserted = falcon_eye_db::cameras::insert_camera(&engine.db, &camera).await?;
            Ok(deploy_camera(engine, inserted).await)
        }
        Protocol::Rtsp | Protocol::Onvif | Protocol::Http => {
            if let Some(host_port) = camera.source_host_port() {
                let existing = falcon_eye_db::cameras::list_network_host_ports(&engine.db).await?;
                if existing.contains(&host_port) {
                    return Err(Error::Conflict(format!("camera already registered for {host_port}")));
                }
            }
            Ok(falcon_eye_db::cameras::insert_camera(&engine.db, &camera).await?)
        }
    }
}

/// Applies Deployment+Service+Recorder for a `creating` camera row, then
/// sets it `running` with allocated ports on success or `error` on failure.
/// Shared by `Create(usb)` and `Start`.
async fn deploy_camera(engine: &Engine, camera: Camera) -> Camera {
    match try_deploy(engine, &camera).await {
        Ok((deployment_name, service_name, stream_port, control_port)) => {
            let patch = falcon_eye_db::cameras::CameraPatch {
                status: Some(EntityStatus::Running.as_str()),
                deployment_name: Some(Some(deployment_name)),
                service_name: Some(Some(service_name)),
                stream_port: Some(Some(stream_port)),
                control_port: Some(control_port),
                ..Default::default()
            };
            falcon_eye_db::cameras::update_camera(&engine.db, camera.id, patch)
                .await
                .unwrap_or(camera)
        }
        Err(err) => {
            tracing::error!(camera_id = %camera.id, error = %err, "camera deploy failed");
            let mut metadata = camera.metadata.clone();
            metadata.insert("error".to_string(), serde_json::Value::String(err.to_string()));
            let patch = falcon_eye_db::cameras::CameraPatch {
                status: Some(EntityStatus::Error.as_str()),
                metadata: Some(serde_json::to_value(&metadata).unwrap_or_default()),
                ..Default::default()
            };
            falcon_eye_db::cameras::update_camera(&engine.db, camera.id, patch)
                .await
                .unwrap_or(camera)
        }
    }
}

async fn try_deploy(engine: &Engine, camera: &Camera) -> Result<(String, String, i32, Option<i32>), Error> {
    let deployment = falcon_eye_manifest::render_camera_deployment(camera, &engine.config.jetson_nodes);
    let service = falcon_eye_manifest::render_camera_service(camera);
    let deployment_name = deployment.metadata.name.clone().unwrap_or_default();
    let service_name = service.metadata.name.clone().unwrap_or_default();

    engine.cluster.apply_deployment(&deployment_name, deployment).await?;
    let applied_service = engine.cluster.apply_service(&service_name, service).await?;

    let recorder_deployment =
        falcon_eye_manifest::render_recorder_deployment(camera, &engine.config.api_url, &engine.config.namespace);
    let recorder_service = falcon_eye_manifest::render_recorder_service(camera);
    let recorder_deployment_name = recorder_deployment.metadata.name.clone().unwrap_or_default();
    let recorder_service_name = recorder_service.metadata.name.clone().unwrap_or_default();
    engine.cluster.apply_deployment(&recorder_deployment_name, recorder_deployment).await?;
    engine.cluster.apply_service(&recorder_service_name, recorder_service).await?;

    let stream_port = applied_service
        .spec
        .as_ref()
        .and_then(|s| s.ports.as_ref())
        .and_then(|ports| ports.iter().find(|p| p.name.as_deref() == Some("stream")))
        .map(|p| p.port)
        .unwrap_or(falcon_eye_manifest::resources::STREAM_PORT);
    let control_port = applied_service
        .spec
        .as_ref()
        .and_then(|s| s.ports.as_ref())
        .and_then(|ports| ports.iter().find(|p| p.name.as_deref() == Some("control")))
        .map(|p| Some(p.port));

    Ok((deployment_name, service_name, stream_port, control_port.flatten()))
}

pub async fn start(engine: &Engine, id: Uuid) -> Result<Camera, Error> {
    let camera = falcon_eye_db::cameras::get_camera(&engine.db, id).await?;
    if camera.status != EntityStatus::Stopped {
        return Err(Error::Conflict(format!("camera is {}", camera.status)));
    }
    let patch = falcon_eye_db::cameras::CameraPatch {
        status: Some(EntityStatus::Creating.as_str()),
        ..Default::default()
    };
    let creating = falcon_eye_db::cameras::update_camera(&engine.db, id, patch).await?;
    Ok(deploy_camera(engine, creating).await)
}

pub async fn stop(engine: &Engine, id: Uuid) -> Result<Camera, Error> {
    let camera = falcon_eye_db::cameras::get_camera(&engine.db, id).await?;
    if camera.status == EntityStatus::Stopped {
        return Ok(camera);
    }
    tear_down_workloads(engine, &camera).await;
    let patch = falcon_eye_db::cameras::CameraPatch {
        status: Some(EntityStatus::Stopped.as_str()),
        deployment_name: Some(None),
        service_name: Some(None),
        stream_port: Some(None),
        control_port: Some(None),
        ..Default::default()
    };
    Ok(falcon_eye_db::cameras::update_camera(&engine.db, id, patch).await?)
}

async fn tear_down_workloads(engine: &Engine, camera: &Camera) {
    let camera_sel = labels::selector(labels::CAMERA_ID, &camera.id.to_string());
    let recorder_sel = labels::selector(labels::RECORDER_FOR, &camera.id.to_string());
    for sel in [&camera_sel, &recorder_sel] {
        if let Err(err) = engine.cluster.delete_by_labels::<Deployment>(sel).await {
            tracing::warn!(camera_id = %camera.id, error = %err, "failed to delete deployment");
        }
        if let Err(err) = engine.cluster.delete_by_labels::<Service>(sel).await {
            tracing::warn!(camera_id = %camera.id, error = %err, "failed to delete service");
        }
    }
}

pub async fn restart(engine: &Engine, id: Uuid) -> Result<Camera, Error> {
    stop(engine, id).await?;
    start(engine, id).await
}

pub async fn update(engine: &Engine, id: Uuid, req: UpdateCameraRequest) -> Result<Camera, Error> {
    let camera = falcon_eye_db::cameras::get_camera(&engine.db, id).await?;

    let resolution = req
        .resolution
        .as_deref()
        .map(|s| s.parse::<falcon_eye_types::Resolution>())
        .transpose()?;
    let framerate = match req.framerate {
        Some(f) if !(1..=60).contains(&f) => {
            return Err(Error::Validation(falcon_eye_types::ValidationError::OutOfRange(
                "framerate",
                "1".into(),
                "60".into(),
            )));
        }
        other => other,
    };

    let source_url_changed = req.source_url.is_some() && req.source_url != camera.source_url;

    let patch = falcon_eye_db::cameras::CameraPatch {
        name: req.name,
        location: req.location,
        source_url: req.source_url,
        resolution_width: resolution.map(|r: falcon_eye_types::Resolution| r.width as i32),
        resolution_height: resolution.map(|r: falcon_eye_types::Resolution| r.height as i32),
        framerate: framerate.map(|f| f as i32),
        metadata: req.metadata.map(|m| serde_json::to_value(&m).unwrap_or_default()),
        ..Default::default()
    };
    let updated = falcon_eye_db::cameras::update_camera(&engine.db, id, patch).await?;

    // Per the open-question decision in DESIGN.md: redeploy only on `running`.
    if source_url_changed && updated.status == EntityStatus::Running {
        return restart(engine, id).await;
    }
    Ok(updated)
}

pub async fn delete(engine: &Engine, id: Uuid) -> Result<(), Error> {
    let camera = falcon_eye_db::cameras::get_camera(&engine.db, id).await?;
    if camera.status == EntityStatus::Deleting {
        return Err(Error::AlreadyDeleting);
    }
    let patch = falcon_eye_db::cameras::CameraPatch {
        status: Some(EntityStatus::Deleting.as_str()),
        ..Default::default()
    };
    falcon_eye_db::cameras::update_camera(&engine.db, id, patch).await?;

    let engine = engine.clone();
    tokio::spawn(async move {
        finish_delete(&engine, camera).await;
    });
    Ok(())
}

async fn finish_delete(engine: &Engine, camera: Camera) {
    tear_down_workloads(engine, &camera).await;

    let grace = if camera.protocol == Protocol::Usb {
        DELETE_GRACE + USB_DELETE_GRACE
    } else {
        DELETE_GRACE
    };
    let selector = labels::selector(labels::CAMERA_ID, &camera.id.to_string());
    let cancel = CancellationToken::new();
    let wait = falcon_eye_common::wait::poll_until(&cancel, grace, Duration::from_millis(500), || {
        let engine = engine.clone();
        let selector = selector.clone();
        async move {
            let status = engine.cluster.get_pod_status_for_selector(&selector).await?;
            Ok(status.is_none().then_some(()))
        }
    })
    .await;
    if wait.is_err() {
        tracing::warn!(camera_id = %camera.id, "camera pod termination wait timed out");
    }

    if let Err(err) = falcon_eye_db::recordings::mark_camera_deleted(&engine.db, camera.id).await {
        tracing::warn!(camera_id = %camera.id, error = %err, "failed to mark recordings camera_deleted");
    }
    // §4.5 Delete: any still-`recording` rows are stopped with `camera_deleted=true`.
    if let Ok(Some(active)) = falcon_eye_db::recordings::active_recording_for_camera(&engine.db, camera.id).await {
        let patch = falcon_eye_db::recordings::RecordingPatch {
            status: Some("stopped"),
            end_time: Some(Utc::now()),
            camera_deleted: Some(true),
            ..Default::default()
        };
        let _ = falcon_eye_db::recordings::update_recording(&engine.db, &active.id, patch).await;
    }

    if let Err(err) = falcon_eye_db::cameras::delete_camera(&engine.db, camera.id).await {
        tracing::warn!(camera_id = %camera.id, error = %err, "failed to delete camera row");
    }
}

pub async fn get_and_sync(engine: &Engine, id: Uuid) -> Result<Camera, Error> {
    let camera = falcon_eye_db::cameras::get_camera(&engine.db, id).await?;
    Ok(reconcile::sync_camera(engine, camera).await)
}

pub async fn list_and_sync(engine: &Engine) -> Result<Vec<Camera>, Error> {
    reconcile::sync_all_cameras(engine).await
}
