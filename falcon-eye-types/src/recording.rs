use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingStatus {
    Recording,
    Stopped,
    Completed,
    Failed,
    Error,
}

impl RecordingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordingStatus::Recording => "recording",
            RecordingStatus::Stopped => "stopped",
            RecordingStatus::Completed => "completed",
            RecordingStatus::Failed => "failed",
            RecordingStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RecordingStatus::Recording)
    }
}

impl FromStr for RecordingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "recording" => RecordingStatus::Recording,
            "stopped" => RecordingStatus::Stopped,
            "completed" => RecordingStatus::Completed,
            "failed" => RecordingStatus::Failed,
            "error" => RecordingStatus::Error,
            other => return Err(ValidationError::InvalidEnum("status", other.to_string())),
        })
    }
}

impl std::fmt::Display for RecordingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity is the deterministic string `{camera_id}_{timestamp}`, not a UUID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub id: String,
    pub camera_id: Option<Uuid>,
    pub camera_name: String,
    pub file_path: String,
    pub file_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub file_size_bytes: Option<i64>,
    pub status: RecordingStatus,
    pub error_message: Option<String>,
    pub node_name: Option<String>,
    pub camera_deleted: bool,
}

pub fn recording_id(camera_id: Uuid, timestamp: DateTime<Utc>) -> String {
    format!("{camera_id}_{}", timestamp.timestamp())
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecordingRequest {
    pub camera_id: Uuid,
    pub camera_name: String,
    pub file_path: String,
    pub file_name: String,
    pub node_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateRecordingRequest {
    pub status: Option<String>,
    pub end_time: Option<DateTime<Utc>>,
    pub file_size_bytes: Option<i64>,
    pub error_message: Option<String>,
}
