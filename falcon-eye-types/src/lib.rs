pub mod agent;
pub mod camera;
pub mod chat;
pub mod cron;
pub mod error;
pub mod labels;
pub mod naming;
pub mod recording;

pub use agent::*;
pub use camera::*;
pub use chat::*;
pub use cron::*;
pub use error::ValidationError;
pub use recording::*;

/// Shared lifecycle status for Camera and Agent rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    Pending,
    Creating,
    Running,
    Error,
    Stopped,
    Deleting,
}

impl EntityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Pending => "pending",
            EntityStatus::Creating => "creating",
            EntityStatus::Running => "running",
            EntityStatus::Error => "error",
            EntityStatus::Stopped => "stopped",
            EntityStatus::Deleting => "deleting",
        }
    }
}

impl std::str::FromStr for EntityStatus {
    type Err = error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pending" => EntityStatus::Pending,
            "creating" => EntityStatus::Creating,
            "running" => EntityStatus::Running,
            "error" => EntityStatus::Error,
            "stopped" => EntityStatus::Stopped,
            "deleting" => EntityStatus::Deleting,
            other => return Err(error::ValidationError::InvalidEnum("status", other.to_string())),
        })
    }
}

impl std::fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
