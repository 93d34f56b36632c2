use deadpool_postgres::Pool;
use postgres_types::ToSql;
use tokio_postgres::Row;
use uuid::Uuid;

use falcon_eye_types::CronJob;

use crate::error::Error;

const COLUMNS: &str = "id, agent_id, session_id, cron_expr, timezone, prompt, timeout_seconds, enabled, \
    last_status, last_run_at, last_summary, created_at, updated_at";

fn row_to_cron(row: &Row) -> CronJob {
    CronJob {
        id: row.get("id"),
        agent_id: row.get("agent_id"),
        session_id: row.get("session_id"),
        cron_expr: row.get("cron_expr"),
        timezone: row.get("timezone"),
        prompt: row.get("prompt"),
        timeout_seconds: row.get("timeout_seconds"),
        enabled: row.get("enabled"),
        last_status: row.get("last_status"),
        last_run_at: row.get("last_run_at"),
        last_summary: row.get("last_summary"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

pub async fn insert_cron_job(pool: &Pool, job: &CronJob) -> Result<CronJob, Error> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            &format!(
                "INSERT INTO cron_jobs (id, agent_id, session_id, cron_expr, timezone, prompt, \
                 timeout_seconds, enabled, created_at, updated_at) \
                 VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10) RETURNING {COLUMNS}"
            ),
            &[
                &job.id,
                &job.agent_id,
                &job.session_id,
                &job.cron_expr,
                &job.timezone,
                &job.prompt,
                &job.timeout_seconds,
                &job.enabled,
                &job.created_at,
                &job.updated_at,
            ],
        )
        .await
        .map_err(Error::from_postgres)?;
    Ok(row_to_cron(&row))
}

pub async fn get_cron_job(pool: &Pool, id: Uuid) -> Result<CronJob, Error> {
    let client = pool.get().await?;
    let row = client
        .query_opt(&format!("SELECT {COLUMNS} FROM cron_jobs WHERE id = $1"), &[&id])
        .await?;
    row.map(|r| row_to_cron(&r)).ok_or(Error::NotFound)
}

pub async fn list_cron_jobs(pool: &Pool) -> Result<Vec<CronJob>, Error> {
    let client = pool.get().await?;
    let rows = client
        .query(&format!("SELECT {COLUMNS} FROM cron_jobs ORDER BY created_at ASC"), &[])
        .await?;
    Ok(rows.iter().map(row_to_cron).collect())
}

pub async fn list_enabled_cron_jobs(pool: &Pool) -> Result<Vec<CronJob>, Error> {
    let client = pool.get().await?;
    let rows = client
        .query(
            &format!("SELECT {COLUMNS} FROM cron_jobs WHERE enabled = true ORDER BY created_at ASC"),
            &[],
        )
        .await?;
    Ok(rows.iter().map(row_to_cron).collect())
}

#[derive(Default)]
pub struct CronJobPatch {
    pub cron_expr: Option<String>,
    pub timezone: Option<String>,
    pub prompt: Option<String>,
    pub timeout_seconds: Option<i32>,
    pub enabled: Option<bool>,
}

pub async fn update_cron_job(pool: &Pool, id: Uuid, patch: CronJobPatch) -> Result<CronJob, Error> {
    let client = pool.get().await?;

    let mut set_clauses = vec!["updated_at = now()".to_string()];
    let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();
    let mut idx = 1;

    macro_rules! push {
        ($col:expr, $val:expr) => {{
            set_clauses.push(format!("{} = ${}", $col, idx));
            params.push($val);
            idx += 1;
        }};
    }

    if let Some(ref v) = patch.cron_expr {
        push!("cron_expr", v);
    }
    if let Some(ref v) = patch.timezone {
        push!("timezone", v);
    }
    if let Some(ref v) = patch.prompt {
        push!("prompt", v);
    }
    if let Some(ref v) = patch.timeout_seconds {
        push!("timeout_seconds", v);
    }
    if let Some(ref v) = patch.enabled {
        push!("enabled", v);
    }

    let query = format!("UPDATE cron_jobs SET {} WHERE id = ${idx} RETURNING {COLUMNS}", set_clauses.join(", "));
    params.push(&id);

    let row = client.query_opt(&query, &params).await.map_err(Error::from_postgres)?;
    row.map(|r| row_to_cron(&r)).ok_or(Error::NotFound)
}

/// Records a completed run, called by the cron-trigger job's callback.
pub async fn record_run(
    pool: &Pool,
    id: Uuid,
    status: &str,
    summary: Option<&str>,
) -> Result<CronJob, Error> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            &format!(
                "UPDATE cron_jobs SET last_status = $1, last_summary = $2, last_run_at = now(), \
                 updated_at = now() WHERE id = $3 RETURNING {COLUMNS}"
            ),
            &[&status, &summary, &id],
        )
        .await
        .map_err(Error::from_postgres)?;
    row.map(|r| row_to_cron(&r)).ok_or(Error::NotFound)
}

pub async fn delete_cron_job(pool: &Pool, id: Uuid) -> Result<bool, Error> {
    let client = pool.get().await?;
    let affected = client.execute("DELETE FROM cron_jobs WHERE id = $1", &[&id]).await?;
    Ok(affected > 0)
}
