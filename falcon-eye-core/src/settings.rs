//! Settings facade: a thin wrapper over the durable `falcon-eye-config`
//! ConfigMap and `falcon-eye-secrets` Secret, plus the two destructive
//! fleet-wide operations.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::Error;

const CONFIG_MAP_NAME: &str = "falcon-eye-config";
const SECRET_NAME: &str = "falcon-eye-secrets";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    pub default_resolution: Option<String>,
    pub default_framerate: Option<String>,
    pub default_camera_node: Option<String>,
    pub default_recorder_node: Option<String>,
    pub cleanup_interval: Option<String>,
    pub creating_timeout_minutes: Option<String>,
    pub chatbot_tools: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SettingsPatch {
    pub default_resolution: Option<String>,
    pub default_framerate: Option<String>,
    pub default_camera_node: Option<String>,
    pub default_recorder_node: Option<String>,
    pub cleanup_interval: Option<String>,
    pub creating_timeout_minutes: Option<String>,
    pub chatbot_tools: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
}

pub async fn read(engine: &Engine) -> Result<Settings, Error> {
    let config_map = engine.cluster.read_config_map(CONFIG_MAP_NAME).await?;
    let data = config_map.data.unwrap_or_default();
    Ok(Settings {
        default_resolution: data.get("DEFAULT_RESOLUTION").cloned(),
        default_framerate: data.get("DEFAULT_FRAMERATE").cloned(),
        default_camera_node: data.get("DEFAULT_CAMERA_NODE").cloned(),
        default_recorder_node: data.get("DEFAULT_RECORDER_NODE").cloned(),
        cleanup_interval: data.get("CLEANUP_INTERVAL").cloned(),
        creating_timeout_minutes: data.get("CREATING_TIMEOUT_MINUTES").cloned(),
        chatbot_tools: data.get("CHATBOT_TOOLS").cloned(),
    })
}

pub async fn patch(engine: &Engine, patch: SettingsPatch) -> Result<Settings, Error> {
    let mut data = BTreeMap::new();
    if let Some(v) = patch.default_resolution {
        data.insert("DEFAULT_RESOLUTION".to_string(), v);
    }
    if let Some(v) = patch.default_framerate {
        data.insert("DEFAULT_FRAMERATE".to_string(), v);
    }
    if let Some(v) = patch.default_camera_node {
        data.insert("DEFAULT_CAMERA_NODE".to_string(), v);
    }
    if let Some(v) = patch.default_recorder_node {
        data.insert("DEFAULT_RECORDER_NODE".to_string(), v);
    }
    if let Some(v) = patch.cleanup_interval {
        data.insert("CLEANUP_INTERVAL".to_string(), v);
    }
    if let Some(v) = patch.creating_timeout_minutes {
        data.insert("CREATING_TIMEOUT_MINUTES".to_string(), v);
    }
    if let Some(v) = patch.chatbot_tools {
        data.insert("CHATBOT_TOOLS".to_string(), v);
    }
    if !data.is_empty() {
        engine.cluster.patch_config_map(CONFIG_MAP_NAME, data).await?;
    }

    if patch.anthropic_api_key.is_some() || patch.openai_api_key.is_some() {
        let mut secret_data = BTreeMap::new();
        if let Some(v) = patch.anthropic_api_key {
            secret_data.insert("ANTHROPIC_API_KEY".to_string(), ByteString(v.into_bytes()));
        }
        if let Some(v) = patch.openai_api_key {
            secret_data.insert("OPENAI_API_KEY".to_string(), ByteString(v.into_bytes()));
        }
        let secret = Secret {
            metadata: kube::api::ObjectMeta { name: Some(SECRET_NAME.to_string()), ..Default::default() },
            data: Some(secret_data),
            ..Default::default()
        };
        engine.cluster.create_or_replace_secret(SECRET_NAME, secret).await?;
    }

    read(engine).await
}

/// Restarts every camera and agent workload in the fleet. Explicit and
/// logged: this is a fleet-wide disruption, not a per-entity operation.
pub async fn restart_all(engine: &Engine) -> Result<(), Error> {
    tracing::warn!("settings: restart-all requested");
    let cameras = falcon_eye_db::cameras::list_cameras(&engine.db).await?;
    for camera in cameras {
        if camera.status == falcon_eye_types::EntityStatus::Running
            && let Err(err) = crate::cameras::restart(engine, camera.id).await {
                tracing::warn!(camera_id = %camera.id, error = %err, "restart-all: camera restart failed");
            }
    }
    let agents = falcon_eye_db::agents::list_agents(&engine.db).await?;
    for agent in agents {
        if agent.status == falcon_eye_types::EntityStatus::Running
            && let Err(err) = crate::agents::restart(engine, agent.id).await {
                tracing::warn!(agent_id = %agent.id, error = %err, "restart-all: agent restart failed");
            }
    }
    Ok(())
}

/// Deletes every camera in the fleet (tearing down workloads and stopping
/// any active recordings). Explicit and logged: irreversible.
pub async fn delete_all_cameras(engine: &Engine) -> Result<(), Error> {
    tracing::warn!("settings: delete-all-cameras requested");
    let cameras = falcon_eye_db::cameras::list_cameras(&engine.db).await?;
    for camera in cameras {
        if let Err(err) = crate::cameras::delete(engine, camera.id).await {
            tracing::warn!(camera_id = %camera.id, error = %err, "delete-all-cameras: delete failed");
        }
    }
    Ok(())
}
