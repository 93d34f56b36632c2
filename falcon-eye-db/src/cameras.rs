use std::collections::BTreeMap;

use deadpool_postgres::Pool;
use postgres_types::ToSql;
use tokio_postgres::Row;
use uuid::Uuid;

use falcon_eye_types::{Camera, EntityStatus, Protocol, Resolution};

use crate::error::Error;

fn row_to_camera(row: &Row) -> Camera {
    let protocol: String = row.get("protocol");
    let status: String = row.get("status");
    let metadata: serde_json::Value = row.get("metadata");
    Camera {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        protocol: protocol.parse().unwrap_or(Protocol::Http),
        location: row.get("location"),
        source_url: row.get("source_url"),
        device_path: row.get("device_path"),
        node_name: row.get("node_name"),
        deployment_name: row.get("deployment_name"),
        service_name: row.get("service_name"),
        stream_port: row.get("stream_port"),
        control_port: row.get("control_port"),
        status: status.parse().unwrap_or(EntityStatus::Error),
        resolution: Resolution {
            width: row.get::<_, i32>("resolution_width") as u32,
            height: row.get::<_, i32>("resolution_height") as u32,
        },
        framerate: row.get::<_, i32>("framerate") as u32,
        metadata: match metadata {
            serde_json::Value::Object(map) => map.into_iter().collect::<BTreeMap<_, _>>(),
            _ => BTreeMap::new(),
        },
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const COLUMNS: &str = "id, name, slug, protocol, location, source_url, device_path, node_name, \
    deployment_name, service_name, stream_port, control_port, status, resolution_width, \
    resolution_height, framerate, metadata, created_at, updated_at";

pub async fn insert_camera(pool: &Pool, camera: &Camera) -> Result<Camera, Error> {
    let client = pool.get().await?;
    let metadata = serde_json::to_value(&camera.metadata).unwrap_or_default();
    let row = client
        .query_one(
            &format!(
                "INSERT INTO cameras (id, name, slug, protocol, location, source_url, device_path, \
                 node_name, deployment_name, service_name, stream_port, control_port, status, \
                 resolution_width, resolution_height, framerate, metadata, created_at, updated_at) \
                 VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19) \
                 RETURNING {COLUMNS}"
            ),
            &[
                &camera.id,
                &camera.name,
                &camera.slug,
                &camera.protocol.as_str(),
                &camera.location,
                &camera.source_url,
                &camera.device_path,
                &camera.node_name,
                &camera.deployment_name,
                &camera.service_name,
                &camera.stream_port,
                &camera.control_port,
                &camera.status.as_str(),
                &(camera.resolution.width as i32),
                &(camera.resolution.height as i32),
                &(camera.framerate as i32),
                &metadata,
                &camera.created_at,
                &camera.updated_at,
            ],
        )
        .await
        .map_err(Error::from_postgres)?;
    Ok(row_to_camera(&row))
}

pub async fn get_camera(pool: &Pool, id: Uuid) -> Result<Camera, Error> {
    let client = pool.get().await?;
    let row = client
        .query_opt(&format!("SELECT {COLUMNS} FROM cameras WHERE id = $1"), &[&id])
        .await?;
    row.map(|r| row_to_camera(&r)).ok_or(Error::NotFound)
}

pub async fn find_usb_camera(
    pool: &Pool,
    node_name: &str,
    device_path: &str,
) -> Result<Option<Camera>, Error> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            &format!(
                "SELECT {COLUMNS} FROM cameras WHERE protocol = 'usb' AND node_name = $1 AND device_path = $2"
            ),
            &[&node_name, &device_path],
        )
        .await?;
    Ok(row.map(|r| row_to_camera(&r)))
}

pub async fn list_cameras(pool: &Pool) -> Result<Vec<Camera>, Error> {
    let client = pool.get().await?;
    let rows = client
        .query(&format!("SELECT {COLUMNS} FROM cameras ORDER BY name ASC"), &[])
        .await?;
    Ok(rows.iter().map(row_to_camera).collect())
}

/// Every network camera's host:port, used to detect invariant (c) collisions
/// before an insert — computed in Rust since the key isn't stored as a column.
pub async fn list_network_host_ports(pool: &Pool) -> Result<Vec<String>, Error> {
    Ok(list_cameras(pool)
        .await?
        .into_iter()
        .filter_map(|c| c.source_host_port())
        .collect())
}

#[derive(Default)]
pub struct CameraPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub source_url: Option<String>,
    pub resolution_width: Option<i32>,
    pub resolution_height: Option<i32>,
    pub framerate: Option<i32>,
    pub metadata: Option<serde_json::Value>,
    pub status: Option<&'static str>,
    pub deployment_name: Option<Option<String>>,
    pub service_name: Option<Option<String>>,
    pub node_name: Option<Option<String>>,
    pub stream_port: Option<Option<i32>>,
    pub control_port: Option<Option<i32>>,
}

pub async fn update_camera(pool: &Pool, id: Uuid, patch: CameraPatch) -> Result<Camera, Error> {
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

    if let Some(ref v) = patch.name {
        push!("name", v);
    }
    if let Some(ref v) = patch.location {
        push!("location", v);
    }
    if let Some(ref v) = patch.source_url {
        push!("source_url", v);
    }
    if let Some(ref v) = patch.resolution_width {
        push!("resolution_width", v);
    }
    if let Some(ref v) = patch.resolution_height {
        push!("resolution_height", v);
    }
    if let Some(ref v) = patch.framerate {
        push!("framerate", v);
    }
    if let Some(ref v) = patch.metadata {
        push!("metadata", v);
    }
    if let Some(ref v) = patch.status {
        push!("status", v);
    }
    if let Some(ref v) = patch.deployment_name {
        push!("deployment_name", v);
    }
    if let Some(ref v) = patch.service_name {
        push!("service_name", v);
    }
    if let Some(ref v) = patch.node_name {
        push!("node_name", v);
    }
    if let Some(ref v) = patch.stream_port {
        push!("stream_port", v);
    }
    if let Some(ref v) = patch.control_port {
        push!("control_port", v);
    }

    let query = format!(
        "UPDATE cameras SET {} WHERE id = ${idx} RETURNING {COLUMNS}",
        set_clauses.join(", ")
    );
    params.push(&id);

    let row = client.query_opt(&query, &params).await.map_err(Error::from_postgres)?;
    row.map(|r| row_to_camera(&r)).ok_or(Error::NotFound)
}

pub async fn delete_camera(pool: &Pool, id: Uuid) -> Result<bool, Error> {
    let client = pool.get().await?;
    let affected = client.execute("DELETE FROM cameras WHERE id = $1", &[&id]).await?;
    Ok(affected > 0)
}
