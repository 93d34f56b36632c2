use deadpool_postgres::Pool;
use postgres_types::ToSql;
use tokio_postgres::Row;
use uuid::Uuid;

use falcon_eye_types::{Recording, RecordingStatus};

use crate::error::Error;

const COLUMNS: &str = "id, camera_id, camera_name, file_path, file_name, start_time, end_time, \
    duration_seconds, file_size_bytes, status, error_message, node_name, camera_deleted";

fn row_to_recording(row: &Row) -> Recording {
    let status: String = row.get("status");
    Recording {
        id: row.get("id"),
        camera_id: row.get("camera_id"),
        camera_name: row.get("camera_name"),
        file_path: row.get("file_path"),
        file_name: row.get("file_name"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        duration_seconds: row.get("duration_seconds"),
        file_size_bytes: row.get("file_size_bytes"),
        status: status.parse().unwrap_or(RecordingStatus::Error),
        error_message: row.get("error_message"),
        node_name: row.get("node_name"),
        camera_deleted: row.get("camera_deleted"),
    }
}

pub async fn insert_recording(pool: &Pool, recording: &Recording) -> Result<Recording, Error> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            &format!(
                "INSERT INTO recordings (id, camera_id, camera_name, file_path, file_name, \
                 start_time, end_time, duration_seconds, file_size_bytes, status, error_message, \
                 node_name, camera_deleted) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13) \
                 RETURNING {COLUMNS}"
            ),
            &[
                &recording.id,
                &recording.camera_id,
                &recording.camera_name,
                &recording.file_path,
                &recording.file_name,
                &recording.start_time,
                &recording.end_time,
                &recording.duration_seconds,
                &recording.file_size_bytes,
                &recording.status.as_str(),
                &recording.error_message,
                &recording.node_name,
                &recording.camera_deleted,
            ],
        )
        .await
        .map_err(Error::from_postgres)?;
    Ok(row_to_recording(&row))
}

pub async fn get_recording(pool: &Pool, id: &str) -> Result<Recording, Error> {
    let client = pool.get().await?;
    let row = client
        .query_opt(&format!("SELECT {COLUMNS} FROM recordings WHERE id = $1"), &[&id])
        .await?;
    row.map(|r| row_to_recording(&r)).ok_or(Error::NotFound)
}

/// The one in-flight `recording` row for a camera, if any. Relies on the
/// partial unique index to guarantee at most one match.
pub async fn active_recording_for_camera(
    pool: &Pool,
    camera_id: Uuid,
) -> Result<Option<Recording>, Error> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            &format!(
                "SELECT {COLUMNS} FROM recordings WHERE camera_id = $1 AND status = 'recording'"
            ),
            &[&camera_id],
        )
        .await?;
    Ok(row.map(|r| row_to_recording(&r)))
}

pub async fn list_recordings_for_camera(
    pool: &Pool,
    camera_id: Uuid,
    offset: i64,
    limit: i64,
) -> Result<Vec<Recording>, Error> {
    let client = pool.get().await?;
    let rows = client
        .query(
            &format!(
                "SELECT {COLUMNS} FROM recordings WHERE camera_id = $1 \
                 ORDER BY start_time DESC LIMIT $2 OFFSET $3"
            ),
            &[&camera_id, &limit, &offset],
        )
        .await?;
    Ok(rows.iter().map(row_to_recording).collect())
}

pub async fn list_recordings(pool: &Pool, offset: i64, limit: i64) -> Result<Vec<Recording>, Error> {
    let client = pool.get().await?;
    let rows = client
        .query(
            &format!("SELECT {COLUMNS} FROM recordings ORDER BY start_time DESC LIMIT $1 OFFSET $2"),
            &[&limit, &offset],
        )
        .await?;
    Ok(rows.iter().map(row_to_recording).collect())
}

#[derive(Default)]
pub struct RecordingPatch {
    pub status: Option<&'static str>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    pub duration_seconds: Option<i64>,
    pub file_size_bytes: Option<i64>,
    pub error_message: Option<String>,
    pub camera_deleted: Option<bool>,
}

pub async fn update_recording(
    pool: &Pool,
    id: &str,
    patch: RecordingPatch,
) -> Result<Recording, Error> {
    let client = pool.get().await?;

    let mut set_clauses = Vec::new();
    let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();
    let mut idx = 1;

    macro_rules! push {
        ($col:expr, $val:expr) => {{
            set_clauses.push(format!("{} = ${}", $col, idx));
            params.push($val);
            idx += 1;
        }};
    }

    if let Some(ref v) = patch.status {
        push!("status", v);
    }
    if let Some(ref v) = patch.end_time {
        push!("end_time", v);
    }
    if let Some(ref v) = patch.duration_seconds {
        push!("duration_seconds", v);
    }
    if let Some(ref v) = patch.file_size_bytes {
        push!("file_size_bytes", v);
    }
    if let Some(ref v) = patch.error_message {
        push!("error_message", v);
    }
    if let Some(ref v) = patch.camera_deleted {
        push!("camera_deleted", v);
    }

    if set_clauses.is_empty() {
        return get_recording(pool, id).await;
    }

    let query = format!("UPDATE recordings SET {} WHERE id = ${idx} RETURNING {COLUMNS}", set_clauses.join(", "));
    params.push(&id);

    let row = client.query_opt(&query, &params).await.map_err(Error::from_postgres)?;
    row.map(|r| row_to_recording(&r)).ok_or(Error::NotFound)
}

/// Marks every still-`recording` row for a camera as `camera_deleted`,
/// called by the Sweeper before a camera's workloads are torn down.
pub async fn mark_camera_deleted(pool: &Pool, camera_id: Uuid) -> Result<u64, Error> {
    let client = pool.get().await?;
    let affected = client
        .execute(
            "UPDATE recordings SET camera_deleted = true WHERE camera_id = $1",
            &[&camera_id],
        )
        .await?;
    Ok(affected)
}

pub async fn delete_recording(pool: &Pool, id: &str) -> Result<bool, Error> {
    let client = pool.get().await?;
    let affected = client.execute("DELETE FROM recordings WHERE id = $1", &[&id]).await?;
    Ok(affected > 0)
}
