//! `DownloadRecording(recording_id)`: locates the recording, tries its
//! `node_name` hint's file-server endpoint first, then falls back to
//! round-robin probing every other ready node's file-server endpoint.

use falcon_eye_cluster::NodeRegistry;
use falcon_eye_types::Recording;

use crate::error::Error;

const FILE_SERVER_PORT: u16 = 8080;

pub async fn download_recording(
    db: &deadpool_postgres::Pool,
    nodes: &NodeRegistry,
    http: &reqwest::Client,
    recording_id: &str,
) -> Result<reqwest::Response, Error> {
    let recording: Recording = falcon_eye_db::recordings::get_recording(db, recording_id).await?;

    if let Some(node_name) = &recording.node_name
        && let Ok(ip) = nodes.resolve(node_name).await
        && let Ok(response) = try_fetch(http, ip, &recording.file_path).await
    {
        return Ok(response);
    }

    let all_nodes = nodes.list().await?;
    for (name, info) in all_nodes {
        if Some(&name) == recording.node_name.as_ref() || !info.ready {
            continue;
        }
        if let Ok(response) = try_fetch(http, info.ip, &recording.file_path).await {
            return Ok(response);
        }
    }

    Err(Error::NotFound)
}

async fn try_fetch(http: &reqwest::Client, ip: std::net::IpAddr, file_path: &str) -> Result<reqwest::Response, Error> {
    let url = format!("http://{ip}:{FILE_SERVER_PORT}{file_path}");
    let response = http.get(&url).send().await.map_err(|_| Error::UpstreamUnavailable)?;
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(Error::NotFound)
    }
}
