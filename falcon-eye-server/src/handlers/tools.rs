use axum::extract::{Path, State};
use axum::Json;
use falcon_eye_core::tools::ToolResult;
use falcon_eye_core::Engine;
use falcon_eye_types::{ToolSchema, UpdateAgentRequest};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

pub async fn registry() -> Json<Vec<ToolSchema>> {
    Json(falcon_eye_core::tools::registry())
}

#[derive(Debug, Deserialize)]
pub struct ExecuteToolRequest {
    pub agent_id: Uuid,
    pub session_id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

pub async fn execute(State(engine): State<Engine>, Json(req): Json<ExecuteToolRequest>) -> Result<Json<ToolResult>, ApiError> {
    let agent = falcon_eye_core::agents::get(&engine, req.agent_id).await?;
    let result = falcon_eye_core::chat::execute_tool(&engine, &agent, &req.session_id, &req.name, &req.arguments).await?;
    Ok(Json(result))
}

pub async fn get_agent_tools(State(engine): State<Engine>, Path(id): Path<Uuid>) -> Result<Json<Vec<String>>, ApiError> {
    let agent = falcon_eye_core::agents::get(&engine, id).await?;
    Ok(Json(agent.tools))
}

#[derive(Debug, Deserialize)]
pub struct UpdateAgentToolsRequest {
    pub tools: Vec<String>,
}

pub async fn put_agent_tools(
    State(engine): State<Engine>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAgentToolsRequest>,
) -> Result<Json<Vec<String>>, ApiError> {
    let patch = UpdateAgentRequest { tools: Some(req.tools), ..Default::default() };
    let agent = falcon_eye_core::agents::update(&engine, id, patch).await?;
    Ok(Json(agent.tools))
}

#[derive(Debug, Serialize)]
pub struct ChatConfigResponse {
    pub provider: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub temperature: f32,
    pub max_tokens: i32,
    pub tools: Vec<ToolSchema>,
}

/// Bootstrap payload an agent pod fetches on startup: its own LLM config
/// plus the JSON-schema of every tool it's configured to call.
pub async fn chat_config(State(engine): State<Engine>, Path(id): Path<Uuid>) -> Result<Json<ChatConfigResponse>, ApiError> {
    let agent = falcon_eye_core::agents::get(&engine, id).await?;
    let tools = falcon_eye_core::tools::schemas_for_agent(&agent);
    Ok(Json(ChatConfigResponse {
        provider: agent.provider,
        model: agent.model,
        system_prompt: agent.system_prompt,
        temperature: agent.temperature,
        max_tokens: agent.max_tokens,
        tools,
    }))
}
