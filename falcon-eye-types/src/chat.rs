use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
            ChatRole::System => "system",
        }
    }
}

impl FromStr for ChatRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "user" => ChatRole::User,
            "assistant" => ChatRole::Assistant,
            "system" => ChatRole::System,
            other => return Err(ValidationError::InvalidEnum("role", other.to_string())),
        })
    }
}

/// Origin of an `AgentChatMessage`, distinguishing the dashboard from
/// channel adapters and internal callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSource {
    Dashboard,
    Telegram,
    Cron,
    Agent,
    System,
    Api,
}

impl MessageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageSource::Dashboard => "dashboard",
            MessageSource::Telegram => "telegram",
            MessageSource::Cron => "cron",
            MessageSource::Agent => "agent",
            MessageSource::System => "system",
            MessageSource::Api => "api",
        }
    }
}

impl FromStr for MessageSource {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "dashboard" => MessageSource::Dashboard,
            "telegram" => MessageSource::Telegram,
            "cron" => MessageSource::Cron,
            "agent" => MessageSource::Agent,
            "system" => MessageSource::System,
            "api" => MessageSource::Api,
            other => return Err(ValidationError::InvalidEnum("source", other.to_string())),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentChatMessage {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub session_id: String,
    pub role: ChatRole,
    pub content: String,
    pub source: MessageSource,
    pub source_user: Option<String>,
    pub prompt_tokens: Option<i32>,
    pub completion_tokens: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /api/chat/{agent_id}/send`.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub session_id: Option<String>,
    pub message: String,
    pub source: Option<String>,
    pub source_user: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendMessageResponse {
    pub session_id: String,
    pub response: String,
    pub prompt_tokens: Option<i32>,
    pub completion_tokens: Option<i32>,
}

/// Direct-insert request used by pods writing callback turns. A task-runner
/// pod finishing an ephemeral `spawn_agent` task sets `ephemeral_agent_id` to
/// the agent it ran as, so the server reaps that agent's row once its result
/// has landed in the caller's session.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveMessageRequest {
    pub session_id: String,
    pub role: String,
    pub content: String,
    pub source: String,
    pub source_user: Option<String>,
    pub prompt_tokens: Option<i32>,
    pub completion_tokens: Option<i32>,
    pub ephemeral_agent_id: Option<Uuid>,
}

/// The payload the Chat Router posts to an agent pod's `/chat/send` RPC.
#[derive(Debug, Clone, Serialize)]
pub struct AgentChatRequest {
    pub messages: Vec<AgentChatMessage>,
    pub tools: Vec<ToolSchema>,
    pub llm_config: LlmConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub api_key: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: f32,
    pub max_tokens: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentChatResponse {
    pub response: String,
    pub prompt_tokens: Option<i32>,
    pub completion_tokens: Option<i32>,
    #[serde(default)]
    pub media: Vec<serde_json::Value>,
}

/// JSON-schema description of a tool as presented to the LLM, see
/// `falcon_eye_core::tools`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub id: String,
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
    pub category: String,
}
