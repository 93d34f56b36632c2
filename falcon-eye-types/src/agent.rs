use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::naming::slugify;
use crate::EntityStatus;

pub const MAIN_AGENT_SLUG: &str = "main";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    Telegram,
    Webhook,
}

impl FromStr for ChannelType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "telegram" => ChannelType::Telegram,
            "webhook" => ChannelType::Webhook,
            other => return Err(ValidationError::InvalidEnum("channel_type", other.to_string())),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub provider: String,
    pub model: String,
    pub api_key_ref: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: f32,
    pub max_tokens: i32,
    pub channel_type: Option<ChannelType>,
    pub channel_config: Option<serde_json::Value>,
    pub tools: Vec<String>,
    pub status: EntityStatus,
    pub deployment_name: Option<String>,
    pub service_name: Option<String>,
    pub node_name: Option<String>,
    pub cpu_limit: String,
    pub memory_limit: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAgentRequest {
    pub name: String,
    pub provider: String,
    pub model: String,
    pub api_key_ref: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
    pub channel_type: Option<String>,
    pub channel_config: Option<serde_json::Value>,
    pub tools: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateAgentRequest {
    pub name: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
    pub channel_type: Option<String>,
    pub channel_config: Option<serde_json::Value>,
    pub tools: Option<Vec<String>>,
}

impl Agent {
    pub fn new(req: CreateAgentRequest) -> Result<Agent, ValidationError> {
        if req.name.trim().is_empty() {
            return Err(ValidationError::Missing("name"));
        }
        let temperature = req.temperature.unwrap_or(1.0);
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ValidationError::OutOfRange("temperature", "0".into(), "2".into()));
        }
        let channel_type = req.channel_type.as_deref().map(str::parse).transpose()?;

        let now = Utc::now();
        Ok(Agent {
            id: Uuid::new_v4(),
            slug: slugify(&req.name),
            name: req.name,
            provider: req.provider,
            model: req.model,
            api_key_ref: req.api_key_ref,
            system_prompt: req.system_prompt,
            temperature,
            max_tokens: req.max_tokens.unwrap_or(4096),
            channel_type,
            channel_config: req.channel_config,
            tools: req.tools.unwrap_or_default(),
            status: EntityStatus::Stopped,
            deployment_name: None,
            service_name: None,
            node_name: None,
            cpu_limit: "500m".to_string(),
            memory_limit: "512Mi".to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Builds the always-present `main` agent row, created at first boot.
    pub fn main_agent(provider: String, model: String) -> Agent {
        let now = Utc::now();
        Agent {
            id: Uuid::new_v4(),
            slug: MAIN_AGENT_SLUG.to_string(),
            name: "Main".to_string(),
            provider,
            model,
            api_key_ref: None,
            system_prompt: None,
            temperature: 1.0,
            max_tokens: 4096,
            channel_type: None,
            channel_config: None,
            tools: Vec::new(),
            status: EntityStatus::Stopped,
            deployment_name: None,
            service_name: None,
            node_name: None,
            cpu_limit: "500m".to_string(),
            memory_limit: "512Mi".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_main(&self) -> bool {
        self.slug == MAIN_AGENT_SLUG
    }
}

/// Meta-tools that would allow an ephemeral/spawned agent to recurse into
/// spawning further agents or cron jobs. Stripped unconditionally per the
/// bounded-recursion invariant.
pub const META_TOOLS: &[&str] = &["spawn_agent", "delegate_task", "create_cron_job"];

pub fn strip_meta_tools(tools: &[String]) -> Vec<String> {
    tools
        .iter()
        .filter(|t| !META_TOOLS.contains(&t.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req() -> CreateAgentRequest {
        CreateAgentRequest {
            name: "Patrol Bot".to_string(),
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-5".to_string(),
            api_key_ref: None,
            system_prompt: None,
            temperature: None,
            max_tokens: None,
            channel_type: None,
            channel_config: None,
            tools: None,
        }
    }

    #[test]
    fn new_agent_defaults_temperature_and_max_tokens() {
        let agent = Agent::new(req()).unwrap();
        assert_eq!(agent.temperature, 1.0);
        assert_eq!(agent.max_tokens, 4096);
        assert_eq!(agent.slug, "patrol-bot");
        assert_eq!(agent.status, EntityStatus::Stopped);
        assert!(!agent.is_main());
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut r = req();
        r.name = "  ".to_string();
        assert!(matches!(Agent::new(r), Err(ValidationError::Missing("name"))));
    }

    #[test]
    fn temperature_out_of_range_is_rejected() {
        let mut r = req();
        r.temperature = Some(3.0);
        assert!(Agent::new(r).is_err());
    }

    #[test]
    fn unknown_channel_type_is_rejected() {
        let mut r = req();
        r.channel_type = Some("sms".to_string());
        assert!(Agent::new(r).is_err());
    }

    #[test]
    fn main_agent_is_recognized() {
        let agent = Agent::main_agent("anthropic".to_string(), "claude-sonnet-4-5".to_string());
        assert!(agent.is_main());
        assert_eq!(agent.slug, MAIN_AGENT_SLUG);
    }

    #[test]
    fn strip_meta_tools_removes_recursive_tools_only() {
        let tools = vec![
            "list_cameras".to_string(),
            "spawn_agent".to_string(),
            "delegate_task".to_string(),
            "create_cron_job".to_string(),
            "start_recording".to_string(),
        ];
        let stripped = strip_meta_tools(&tools);
        assert_eq!(stripped, vec!["list_cameras".to_string(), "start_recording".to_string()]);
    }
}
