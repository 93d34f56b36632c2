use k8s_openapi::api::batch::v1::{CronJob, CronJobSpec, Job, JobSpec, JobTemplateSpec};
use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec};
use kube::api::ObjectMeta;

use falcon_eye_types::agent::Agent;
use falcon_eye_types::cron::CronJob as CronJobEntity;
use falcon_eye_types::labels::{self, Component};
use falcon_eye_types::naming;

use crate::protocol::env;

/// Single-run Job template executed by the cron-runner: `restartPolicy:
/// Never`, a finite `ttlSecondsAfterFinished`, and the prompt/timeout pair
/// baked into its env so the pod can call `SendMessage` on its own.
/// `SESSION_ID` carries the session the job was created from, so the
/// callback lands back in the conversation that scheduled it.
fn cron_runner_pod_template(job: &CronJobEntity, agent: &Agent, api_url: &str) -> PodTemplateSpec {
    let labels = labels::base_labels(Component::CronRunner, &job.id.to_string());
    let container = Container {
        name: "cron-runner".to_string(),
        image: Some("falcon-eye/cron-runner:latest".to_string()),
        env: Some(vec![
            env("API_URL", api_url.to_string()),
            env("AGENT_ID", agent.id.to_string()),
            env("CRON_JOB_ID", job.id.to_string()),
            env("SESSION_ID", job.session_id.clone()),
            env("PROMPT", job.prompt.clone()),
            env("TIMEOUT_SECONDS", job.timeout_seconds.to_string()),
        ]),
        ..Default::default()
    };

    PodTemplateSpec {
        metadata: Some(ObjectMeta { labels: Some(labels.into_iter().collect()), ..Default::default() }),
        spec: Some(PodSpec {
            containers: vec![container],
            restart_policy: Some("Never".to_string()),
            ..Default::default()
        }),
    }
}

pub fn render_cron_job(job: &CronJobEntity, agent: &Agent, api_url: &str) -> CronJob {
    let name = naming::cron_job_name(&agent.slug, &job.id.to_string());
    let labels = labels::base_labels(Component::CronRunner, &job.id.to_string());
    let template = cron_runner_pod_template(job, agent, api_url);

    CronJob {
        metadata: ObjectMeta {
            name: Some(name),
            labels: Some(labels.into_iter().collect()),
            ..Default::default()
        },
        spec: Some(CronJobSpec {
            schedule: job.cron_expr.clone(),
            time_zone: Some(job.timezone.clone()),
            suspend: Some(!job.enabled),
            job_template: JobTemplateSpec {
                metadata: None,
                spec: Some(JobSpec {
                    template,
                    ttl_seconds_after_finished: Some(3600),
                    backoff_limit: Some(0),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        status: None,
    }
}

/// One-shot Job used by `spawn_agent`/`delegate_task`, not wrapped in a
/// CronJob — it runs exactly once and its TTL cleans it up. `agent` is the
/// agent the task actually runs as (its provider/model/tools drive the
/// pod); `report_agent_id` is the agent the result is saved against, which
/// for a spawned ephemeral agent is the caller, not `agent` itself — the
/// callback must land in the session the caller is already watching.
pub fn render_task_job(
    task_id: &str,
    agent: &Agent,
    report_agent_id: uuid::Uuid,
    session_id: &str,
    prompt: &str,
    api_url: &str,
) -> Job {
    let name = format!("task-{}-{}", agent.slug, task_id);
    let labels = labels::base_labels(Component::CronRunner, task_id);

    let container = Container {
        name: "task-runner".to_string(),
        image: Some("falcon-eye/cron-runner:latest".to_string()),
        env: Some(vec![
            env("API_URL", api_url.to_string()),
            env("AGENT_ID", agent.id.to_string()),
            env("REPORT_AGENT_ID", report_agent_id.to_string()),
            env("SESSION_ID", session_id.to_string()),
            env("PROMPT", prompt.to_string()),
            env("TASK_ID", task_id.to_string()),
        ]),
        ..Default::default()
    };

    Job {
        metadata: ObjectMeta {
            name: Some(name),
            labels: Some(labels.clone().into_iter().collect()),
            ..Default::default()
        },
        spec: Some(JobSpec {
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta { labels: Some(labels.into_iter().collect()), ..Default::default() }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    restart_policy: Some("Never".to_string()),
                    ..Default::default()
                }),
            },
            ttl_seconds_after_finished: Some(600),
            backoff_limit: Some(0),
            ..Default::default()
        }),
        status: None,
    }
}
