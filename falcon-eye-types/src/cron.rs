use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// User-level scheduled job targeting an agent. Distinct from the
/// cluster-level CronJob workload it projects onto.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronJob {
    pub id: Uuid,
    pub agent_id: Uuid,
    /// The chat session the job was created from; results are posted back
    /// here so they surface in the same conversation that scheduled them.
    pub session_id: String,
    pub cron_expr: String,
    pub timezone: String,
    pub prompt: String,
    pub timeout_seconds: i32,
    pub enabled: bool,
    pub last_status: Option<String>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCronJobRequest {
    pub agent_id: Uuid,
    pub session_id: String,
    pub cron_expr: String,
    pub timezone: Option<String>,
    pub prompt: String,
    pub timeout_seconds: Option<i32>,
    pub enabled: Option<bool>,
}

/// Body of the cron-runner pod's callback after a scheduled prompt
/// completes, fails, or times out.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordCronRunRequest {
    pub status: String,
    pub summary: Option<String>,
}

impl CronJob {
    pub fn new(req: CreateCronJobRequest) -> Result<CronJob, ValidationError> {
        if req.cron_expr.split_whitespace().count() != 5 {
            return Err(ValidationError::Malformed("cron_expr", req.cron_expr));
        }
        if req.prompt.trim().is_empty() {
            return Err(ValidationError::Missing("prompt"));
        }
        let now = Utc::now();
        Ok(CronJob {
            id: Uuid::new_v4(),
            agent_id: req.agent_id,
            session_id: req.session_id,
            cron_expr: req.cron_expr,
            timezone: req.timezone.unwrap_or_else(|| "UTC".to_string()),
            prompt: req.prompt,
            timeout_seconds: req.timeout_seconds.unwrap_or(120),
            enabled: req.enabled.unwrap_or(true),
            last_status: None,
            last_run_at: None,
            last_summary: None,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req() -> CreateCronJobRequest {
        CreateCronJobRequest {
            agent_id: Uuid::new_v4(),
            session_id: "session-1".to_string(),
            cron_expr: "*/5 * * * *".to_string(),
            timezone: None,
            prompt: "summarize the last hour of footage".to_string(),
            timeout_seconds: None,
            enabled: None,
        }
    }

    #[test]
    fn defaults_timezone_and_enabled() {
        let job = CronJob::new(req()).unwrap();
        assert_eq!(job.timezone, "UTC");
        assert!(job.enabled);
        assert_eq!(job.timeout_seconds, 120);
    }

    #[test]
    fn rejects_cron_expr_with_wrong_field_count() {
        let mut r = req();
        r.cron_expr = "* * *".to_string();
        assert!(matches!(CronJob::new(r), Err(ValidationError::Malformed("cron_expr", _))));
    }

    #[test]
    fn rejects_empty_prompt() {
        let mut r = req();
        r.prompt = "   ".to_string();
        assert!(matches!(CronJob::new(r), Err(ValidationError::Missing("prompt"))));
    }
}
