//! Static tool registry (§4.9). Each tool has a fixed id/name/description/
//! JSON-schema/category; handlers are dispatched by name rather than through
//! boxed function pointers, since the full handler set is small and known
//! at compile time.

use falcon_eye_types::{Agent, ToolSchema};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::Error;
use crate::{agents, cameras, engine::Engine, recording};

pub const TOOL_LIST_CAMERAS: &str = "list_cameras";
pub const TOOL_GET_CAMERA_STATUS: &str = "get_camera_status";
pub const TOOL_START_RECORDING: &str = "start_recording";
pub const TOOL_STOP_RECORDING: &str = "stop_recording";
pub const TOOL_SPAWN_AGENT: &str = "spawn_agent";
pub const TOOL_DELEGATE_TASK: &str = "delegate_task";
pub const TOOL_CREATE_CRON_JOB: &str = "create_cron_job";

#[derive(Debug, Serialize)]
pub struct ToolResult {
    pub result_text: String,
    pub media: Vec<serde_json::Value>,
}

impl ToolResult {
    fn text(s: impl Into<String>) -> Self {
        ToolResult { result_text: s.into(), media: Vec::new() }
    }
}

/// The full catalog, independent of any one agent's configured subset.
pub fn registry() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            id: TOOL_LIST_CAMERAS.into(),
            name: TOOL_LIST_CAMERAS.into(),
            description: "List every camera and its current status.".into(),
            parameters: json!({"type": "object", "properties": {}}),
            category: "camera".into(),
        },
        ToolSchema {
            id: TOOL_GET_CAMERA_STATUS.into(),
            name: TOOL_GET_CAMERA_STATUS.into(),
            description: "Get the live status of a single camera by id.".into(),
            parameters: json!({
                "type": "object",
                "properties": {"camera_id": {"type": "string"}},
                "required": ["camera_id"]
            }),
            category: "camera".into(),
        },
        ToolSchema {
            id: TOOL_START_RECORDING.into(),
            name: TOOL_START_RECORDING.into(),
            description: "Start recording a running camera.".into(),
            parameters: json!({
                "type": "object",
                "properties": {"camera_id": {"type": "string"}},
                "required": ["camera_id"]
            }),
            category: "camera".into(),
        },
        ToolSchema {
            id: TOOL_STOP_RECORDING.into(),
            name: TOOL_STOP_RECORDING.into(),
            description: "Stop the active recording for a camera.".into(),
            parameters: json!({
                "type": "object",
                "properties": {"camera_id": {"type": "string"}},
                "required": ["camera_id"]
            }),
            category: "camera".into(),
        },
        ToolSchema {
            id: TOOL_SPAWN_AGENT.into(),
            name: TOOL_SPAWN_AGENT.into(),
            description: "Spawn a short-lived agent to perform a task, then report back.".into(),
            parameters: json!({
                "type": "object",
                "properties": {"name": {"type": "string"}, "task": {"type": "string"}},
                "required": ["name", "task"]
            }),
            category: "meta".into(),
        },
        ToolSchema {
            id: TOOL_DELEGATE_TASK.into(),
            name: TOOL_DELEGATE_TASK.into(),
            description: "Delegate a task to an existing agent.".into(),
            parameters: json!({
                "type": "object",
                "properties": {"agent_id": {"type": "string"}, "task": {"type": "string"}},
                "required": ["agent_id", "task"]
            }),
            category: "meta".into(),
        },
        ToolSchema {
            id: TOOL_CREATE_CRON_JOB.into(),
            name: TOOL_CREATE_CRON_JOB.into(),
            description: "Schedule a recurring prompt against an agent.".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "agent_id": {"type": "string"},
                    "cron_expr": {"type": "string"},
                    "prompt": {"type": "string"}
                },
                "required": ["agent_id", "cron_expr", "prompt"]
            }),
            category: "meta".into(),
        },
    ]
}

/// Every id in the registry, used to validate an agent's configured `tools`.
pub fn all_tool_ids() -> Vec<String> {
    registry().into_iter().map(|t| t.id).collect()
}

/// Filters the full catalog down to the subset an agent is configured with.
pub fn schemas_for_agent(agent: &Agent) -> Vec<ToolSchema> {
    registry().into_iter().filter(|t| agent.tools.iter().any(|id| id == &t.id)).collect()
}

pub async fn execute(
    engine: &Engine,
    agent: &Agent,
    session_id: &str,
    name: &str,
    arguments: &serde_json::Value,
) -> Result<ToolResult, Error> {
    match name {
        TOOL_LIST_CAMERAS => {
            let cameras = cameras::list_and_sync(engine).await?;
            let summary: Vec<_> = cameras
                .iter()
                .map(|c| json!({"id": c.id, "name": c.name, "status": c.status.as_str()}))
                .collect();
            Ok(ToolResult::text(serde_json::to_string(&summary).unwrap_or_default()))
        }
        TOOL_GET_CAMERA_STATUS => {
            let camera_id = required_uuid(arguments, "camera_id")?;
            let camera = cameras::get_and_sync(engine, camera_id).await?;
            Ok(ToolResult::text(format!("{}", camera.status)))
        }
        TOOL_START_RECORDING => {
            let camera_id = required_uuid(arguments, "camera_id")?;
            recording::start_recording(engine, camera_id).await?;
            Ok(ToolResult::text("recording started"))
        }
        TOOL_STOP_RECORDING => {
            let camera_id = required_uuid(arguments, "camera_id")?;
            recording::stop_recording(engine, camera_id).await?;
            Ok(ToolResult::text("recording stopped"))
        }
        TOOL_SPAWN_AGENT => {
            let task = required_str(arguments, "task")?;
            let spawn_name = required_str(arguments, "name")?;
            let spawned = agents::spawn_ephemeral(engine, agent, &spawn_name, &task, session_id).await?;
            Ok(ToolResult::text(format!("spawned agent {}", spawned.id)))
        }
        TOOL_DELEGATE_TASK => {
            let target_id = required_uuid(arguments, "agent_id")?;
            let task = required_str(arguments, "task")?;
            agents::delegate_task(engine, target_id, &task, session_id).await?;
            Ok(ToolResult::text("task delegated"))
        }
        TOOL_CREATE_CRON_JOB => {
            let target_id = required_uuid(arguments, "agent_id")?;
            let cron_expr = required_str(arguments, "cron_expr")?;
            let prompt = required_str(arguments, "prompt")?;
            let job = crate::cron::create(engine, target_id, session_id.to_string(), cron_expr, None, prompt, None, None).await?;
            Ok(ToolResult::text(format!("created cron job {}", job.id)))
        }
        other => Err(Error::Validation(falcon_eye_types::ValidationError::InvalidEnum("tool", other.to_string()))),
    }
}

fn required_str(args: &serde_json::Value, field: &'static str) -> Result<String, Error> {
    args.get(field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or(Error::Validation(falcon_eye_types::ValidationError::Missing(field)))
}

fn required_uuid(args: &serde_json::Value, field: &'static str) -> Result<Uuid, Error> {
    let raw = required_str(args, field)?;
    raw.parse()
        .map_err(|_| Error::Validation(falcon_eye_types::ValidationError::Malformed(field, raw)))
}

#[cfg(test)]
mod tests {
    use falcon_eye_types::CreateAgentRequest;

    use super::*;

    fn agent_with_tools(tools: Vec<String>) -> Agent {
        Agent::new(CreateAgentRequest {
            name: "Patrol Bot".to_string(),
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-5".to_string(),
            api_key_ref: None,
            system_prompt: None,
            temperature: None,
            max_tokens: None,
            channel_type: None,
            channel_config: None,
            tools: Some(tools),
        })
        .unwrap()
    }

    #[test]
    fn registry_ids_are_unique() {
        let ids = all_tool_ids();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(ids.len(), sorted.len());
    }

    #[test]
    fn schemas_for_agent_filters_to_configured_tools() {
        let agent = agent_with_tools(vec![TOOL_LIST_CAMERAS.to_string()]);
        let schemas = schemas_for_agent(&agent);
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].id, TOOL_LIST_CAMERAS);
    }

    #[test]
    fn schemas_for_agent_is_empty_with_no_tools_configured() {
        let agent = agent_with_tools(Vec::new());
        assert!(schemas_for_agent(&agent).is_empty());
    }

    #[test]
    fn required_str_missing_field_is_validation_error() {
        let args = serde_json::json!({});
        assert!(matches!(required_str(&args, "camera_id"), Err(Error::Validation(_))));
    }

    #[test]
    fn required_uuid_rejects_malformed_value() {
        let args = serde_json::json!({"camera_id": "not-a-uuid"});
        assert!(matches!(required_uuid(&args, "camera_id"), Err(Error::Validation(_))));
    }

    #[test]
    fn required_uuid_parses_valid_value() {
        let id = Uuid::new_v4();
        let args = serde_json::json!({"camera_id": id.to_string()});
        assert_eq!(required_uuid(&args, "camera_id").unwrap(), id);
    }
}
