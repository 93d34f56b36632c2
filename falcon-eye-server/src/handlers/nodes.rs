use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use falcon_eye_cluster::NodeInfo;
use falcon_eye_core::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ScanApiError};

#[derive(Debug, Serialize)]
pub struct NodeInfoResponse {
    pub name: String,
    pub ip: std::net::IpAddr,
    pub ready: bool,
    pub labels: BTreeMap<String, String>,
    pub arch: Option<String>,
    pub os: Option<String>,
}

fn to_response(name: &str, info: &NodeInfo) -> NodeInfoResponse {
    NodeInfoResponse {
        name: name.to_string(),
        ip: info.ip,
        ready: info.ready,
        labels: info.labels.clone(),
        arch: info.arch.clone(),
        os: info.os.clone(),
    }
}

pub async fn list(State(engine): State<Engine>) -> Result<Json<Vec<NodeInfoResponse>>, ApiError> {
    let nodes = engine.nodes.list().await?;
    Ok(Json(nodes.iter().map(|(name, info)| to_response(name, info)).collect()))
}

pub async fn get(State(engine): State<Engine>, Path(name): Path<String>) -> Result<Json<NodeInfoResponse>, ApiError> {
    let info = engine.nodes.info(&name).await?;
    Ok(Json(to_response(&name, &info)))
}

#[derive(Debug, Deserialize, Default)]
pub struct ScanQuery {
    pub network: Option<String>,
    pub node: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct ScanResponse {
    pub usb_devices: Vec<falcon_eye_scan::UsbDevice>,
    pub network_candidates: Vec<falcon_eye_scan::NetworkCandidate>,
}

/// Advisory scan across the two channels §4.11 defines. `node` selects
/// which node to probe over SSH for USB devices; `network` is the CIDR
/// subnet to TCP-probe. Either, both, or neither may be set; an empty
/// response means nothing was requested. Results are served from the
/// node-scan cache when fresh, so repeated scans within its TTL don't
/// re-probe unchanged nodes.
pub async fn scan(
    State(engine): State<Engine>,
    Query(q): Query<ScanQuery>,
) -> Result<Json<ScanResponse>, ScanApiError> {
    let mut response = ScanResponse::default();

    if let Some(node_name) = &q.node {
        if let Some(cached) = engine.scan_cache.get_usb(node_name).await {
            response.usb_devices = cached;
        } else {
            let info = engine.nodes.info(node_name).await?;
            let creds = engine.config.ssh_credentials.clone();
            let devices = falcon_eye_scan::list_usb_devices(&info.ip.to_string(), node_name, &creds).await?;
            engine.scan_cache.put_usb(node_name, devices.clone()).await;
            response.usb_devices = devices;
        }
    }

    if let Some(subnet) = &q.network {
        if let Some(cached) = engine.scan_cache.get_network(subnet).await {
            response.network_candidates = cached;
        } else {
            let candidates = falcon_eye_scan::list_network(subnet).await;
            engine.scan_cache.put_network(subnet, candidates.clone()).await;
            response.network_candidates = candidates;
        }
    }

    Ok(Json(response))
}
