use deadpool_postgres::Pool;
use falcon_eye_cluster::{ClusterClient, NodeRegistry};
use falcon_eye_scan::{ScanCache, SshCredentials};

use crate::locks::SessionLocks;

/// The long-lived resources every core operation shares: the persistence
/// pool, the cluster client, an HTTP client for pod RPCs, the node-IP
/// registry, the node-scan result cache, and the per-session lock map.
/// Cloning an `Engine` is cheap — every field is itself a handle (pool,
/// reqwest client) or an `Arc`.
#[derive(Clone)]
pub struct Engine {
    pub db: Pool,
    pub cluster: ClusterClient,
    pub http: reqwest::Client,
    pub nodes: NodeRegistry,
    pub scan_cache: ScanCache,
    pub chat_locks: SessionLocks,
    pub config: EngineConfig,
}

#[derive(Clone)]
pub struct EngineConfig {
    pub namespace: String,
    pub api_url: String,
    pub jetson_nodes: Vec<String>,
    pub creating_timeout_minutes: i64,
    pub cleanup_interval_seconds: u64,
    pub chat_deadline_seconds: u64,
    pub ssh_credentials: SshCredentials,
}

impl Engine {
    pub fn new(db: Pool, cluster: ClusterClient, config: EngineConfig) -> Self {
        let nodes = NodeRegistry::new(cluster.clone());
        Engine {
            db,
            cluster,
            http: reqwest::Client::new(),
            nodes,
            scan_cache: ScanCache::new(),
            chat_locks: SessionLocks::new(),
            config,
        }
    }
}
