//! Sweeper (C10): periodic reconciliation between persistence and the
//! cluster, catching drift the request-path reconciler never sees because
//! no request touched the affected entity.

use std::collections::HashSet;

use chrono::Utc;
use falcon_eye_types::labels;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use kube::Resource;

use crate::engine::Engine;
use crate::error::Error;

/// One sweep pass: repairs orphaned recordings, then deletes any managed
/// Deployment/Service whose owner label no longer names a live entity.
pub async fn sweep(engine: &Engine) -> Result<(), Error> {
    repair_orphaned_recordings(engine).await?;
    reap_orphaned_workloads(engine).await?;
    Ok(())
}

async fn repair_orphaned_recordings(engine: &Engine) -> Result<(), Error> {
    let recordings = falcon_eye_db::recordings::list_recordings(&engine.db, 0, i64::MAX).await?;
    for recording in recordings
        .into_iter()
        .filter(|r| r.status == falcon_eye_types::RecordingStatus::Recording)
    {
        let Some(camera_id) = recording.camera_id else {
            continue;
        };
        let selector = labels::selector(labels::RECORDER_FOR, &camera_id.to_string());
        if engine.cluster.get_pod_status_for_selector(&selector).await?.is_some() {
            continue;
        }
        tracing::warn!(recording_id = %recording.id, "sweeper: recorder pod gone, stopping recording");
        let patch = falcon_eye_db::recordings::RecordingPatch {
            status: Some("stopped"),
            end_time: Some(Utc::now()),
            error_message: Some("recorder pod gone".to_string()),
            ..Default::default()
        };
        falcon_eye_db::recordings::update_recording(&engine.db, &recording.id, patch).await?;
    }
    Ok(())
}

/// Deletes any Deployment/Service carrying `camera-id`, `recorder-for`, or
/// `agent-id` whose value isn't a live entity id, per the "labels are the
/// sole authority" invariant: an entity row deleted without a clean
/// `finish_delete` run (e.g. a crash mid-delete) still gets its workloads
/// collected on the next sweep.
async fn reap_orphaned_workloads(engine: &Engine) -> Result<(), Error> {
    let cameras = falcon_eye_db::cameras::list_cameras(&engine.db).await?;
    let agents = falcon_eye_db::agents::list_agents(&engine.db).await?;
    let valid_cameras: HashSet<String> = cameras.iter().map(|c| c.id.to_string()).collect();
    let valid_agents: HashSet<String> = agents.iter().map(|a| a.id.to_string()).collect();

    reap_by_label::<Deployment>(engine, labels::CAMERA_ID, &valid_cameras, "camera").await?;
    reap_by_label::<Deployment>(engine, labels::RECORDER_FOR, &valid_cameras, "recorder").await?;
    reap_by_label::<Deployment>(engine, labels::AGENT_ID, &valid_agents, "agent").await?;
    reap_by_label::<Service>(engine, labels::CAMERA_ID, &valid_cameras, "camera").await?;
    reap_by_label::<Service>(engine, labels::RECORDER_FOR, &valid_cameras, "recorder").await?;
    reap_by_label::<Service>(engine, labels::AGENT_ID, &valid_agents, "agent").await?;
    Ok(())
}

async fn reap_by_label<K>(
    engine: &Engine,
    label_key: &str,
    valid_ids: &HashSet<String>,
    kind: &'static str,
) -> Result<(), Error>
where
    K: Resource<Scope = kube::core::NamespaceResourceScope> + Clone + std::fmt::Debug + serde::Serialize + serde::de::DeserializeOwned,
    <K as Resource>::DynamicType: Default,
{
    let all = engine.cluster.list_workloads_by_label::<K>(label_key).await?;
    for item in all {
        let Some(name) = item.meta().name.clone() else { continue };
        let Some(owner_id) = item.meta().labels.as_ref().and_then(|l| l.get(label_key)) else {
            continue;
        };
        if valid_ids.contains(owner_id) {
            continue;
        }
        tracing::warn!(kind, %name, owner_id, "sweeper: deleting orphaned workload");
        engine.cluster.delete_by_name::<K>(&name).await?;
        falcon_eye_common::metrics::domain::record_sweep_deletion(kind);
    }
    Ok(())
}
