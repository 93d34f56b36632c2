//! User-level CronJob CRUD, projecting onto a cluster-level `CronJob`
//! workload via the Manifest Generator.

use falcon_eye_types::{CreateCronJobRequest, CronJob};
use uuid::Uuid;

use crate::engine::Engine;
use crate::error::Error;

#[allow(clippy::too_many_arguments)]
pub async fn create(
    engine: &Engine,
    agent_id: Uuid,
    session_id: String,
    cron_expr: String,
    timezone: Option<String>,
    prompt: String,
    timeout_seconds: Option<i32>,
    enabled: Option<bool>,
) -> Result<CronJob, Error> {
    let agent = falcon_eye_db::agents::get_agent(&engine.db, agent_id).await?;
    let job = CronJob::new(CreateCronJobRequest {
        agent_id,
        session_id,
        cron_expr,
        timezone,
        prompt,
        timeout_seconds,
        enabled,
    })?;
    let inserted = falcon_eye_db::cron::insert_cron_job(&engine.db, &job).await?;
    apply(engine, &inserted, &agent).await?;
    Ok(inserted)
}

pub async fn get(engine: &Engine, id: Uuid) -> Result<CronJob, Error> {
    Ok(falcon_eye_db::cron::get_cron_job(&engine.db, id).await?)
}

pub async fn list(engine: &Engine) -> Result<Vec<CronJob>, Error> {
    Ok(falcon_eye_db::cron::list_cron_jobs(&engine.db).await?)
}

pub async fn update(
    engine: &Engine,
    id: Uuid,
    cron_expr: Option<String>,
    timezone: Option<String>,
    prompt: Option<String>,
    timeout_seconds: Option<i32>,
    enabled: Option<bool>,
) -> Result<CronJob, Error> {
    if let Some(ref expr) = cron_expr
        && expr.split_whitespace().count() != 5 {
            return Err(Error::Validation(falcon_eye_types::ValidationError::Malformed(
                "cron_expr",
                expr.clone(),
            )));
        }
    let patch = falcon_eye_db::cron::CronJobPatch { cron_expr, timezone, prompt, timeout_seconds, enabled };
    let updated = falcon_eye_db::cron::update_cron_job(&engine.db, id, patch).await?;
    let agent = falcon_eye_db::agents::get_agent(&engine.db, updated.agent_id).await?;
    apply(engine, &updated, &agent).await?;
    Ok(updated)
}

pub async fn delete(engine: &Engine, id: Uuid) -> Result<(), Error> {
    let job = falcon_eye_db::cron::get_cron_job(&engine.db, id).await?;
    let agent = falcon_eye_db::agents::get_agent(&engine.db, job.agent_id).await?;
    let name = falcon_eye_types::naming::cron_job_name(&agent.slug, &job.id.to_string());
    engine.cluster.delete_cron_job(&name).await?;
    falcon_eye_db::cron::delete_cron_job(&engine.db, id).await?;
    Ok(())
}

/// Records a run outcome, called by the cron-runner pod's callback after a
/// scheduled prompt completes (or fails/times out).
pub async fn record_run(engine: &Engine, id: Uuid, status: &str, summary: Option<&str>) -> Result<CronJob, Error> {
    Ok(falcon_eye_db::cron::record_run(&engine.db, id, status, summary).await?)
}

async fn apply(engine: &Engine, job: &CronJob, agent: &falcon_eye_types::Agent) -> Result<(), Error> {
    let manifest = falcon_eye_manifest::render_cron_job(job, agent, &engine.config.api_url);
    let name = manifest.metadata.name.clone().unwrap_or_default();
    engine.cluster.ensure_cron_job(&name, manifest).await?;
    Ok(())
}
