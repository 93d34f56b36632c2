use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use k8s_openapi::api::core::v1::Node;
use tokio::sync::RwLock;

use crate::client::ClusterClient;
use crate::error::Error;

const TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub ip: IpAddr,
    pub ready: bool,
    pub labels: BTreeMap<String, String>,
    pub taints: Vec<(String, Option<String>, String)>,
    pub arch: Option<String>,
    pub os: Option<String>,
}

struct Cache {
    entries: BTreeMap<String, NodeInfo>,
    refreshed_at: Option<Instant>,
}

impl Cache {
    fn is_stale(&self) -> bool {
        match self.refreshed_at {
            Some(t) => t.elapsed() >= TTL,
            None => true,
        }
    }
}

/// Sole mutable shared map in the process: one background-refresher writer,
/// many readers. `Resolve` never falls back silently on a miss.
#[derive(Clone)]
pub struct NodeRegistry {
    cluster: ClusterClient,
    cache: Arc<RwLock<Cache>>,
}

impl NodeRegistry {
    pub fn new(cluster: ClusterClient) -> Self {
        NodeRegistry {
            cluster,
            cache: Arc::new(RwLock::new(Cache { entries: BTreeMap::new(), refreshed_at: None })),
        }
    }

    /// Refreshes the cache unconditionally, regardless of staleness.
    pub async fn refresh(&self) -> Result<(), Error> {
        let nodes = self.cluster.read_nodes().await?;
        let mut entries = BTreeMap::new();
        for node in nodes {
            if let Some((name, info)) = parse_node(&node) {
                entries.insert(name, info);
            }
        }
        let mut cache = self.cache.write().await;
        cache.entries = entries;
        cache.refreshed_at = Some(Instant::now());
        Ok(())
    }

    async fn ensure_fresh(&self) -> Result<(), Error> {
        if self.cache.read().await.is_stale() {
            self.refresh().await?;
        }
        Ok(())
    }

    pub async fn resolve(&self, name: &str) -> Result<IpAddr, Error> {
        self.ensure_fresh().await?;
        let cache = self.cache.read().await;
        cache
            .entries
            .get(name)
            .map(|n| n.ip)
            .ok_or_else(|| Error::UnknownNode(name.to_string()))
    }

    pub async fn info(&self, name: &str) -> Result<NodeInfo, Error> {
        self.ensure_fresh().await?;
        let cache = self.cache.read().await;
        cache
            .entries
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownNode(name.to_string()))
    }

    pub async fn list(&self) -> Result<BTreeMap<String, NodeInfo>, Error> {
        self.ensure_fresh().await?;
        Ok(self.cache.read().await.entries.clone())
    }
}

fn parse_node(node: &Node) -> Option<(String, NodeInfo)> {
    let name = node.metadata.name.clone()?;
    let status = node.status.as_ref()?;

    let ip = status
        .addresses
        .as_ref()?
        .iter()
        .find(|a| a.type_ == "InternalIP")
        .and_then(|a| a.address.parse().ok())?;

    let ready = status
        .conditions
        .as_ref()
        .and_then(|conds| conds.iter().find(|c| c.type_ == "Ready"))
        .map(|c| c.status == "True")
        .unwrap_or(false);

    let labels = node.metadata.labels.clone().unwrap_or_default().into_iter().collect();

    let taints = node
        .spec
        .as_ref()
        .and_then(|s| s.taints.clone())
        .unwrap_or_default()
        .into_iter()
        .map(|t| (t.key, t.value, t.effect))
        .collect();

    let arch = status.node_info.as_ref().map(|i| i.architecture.clone());
    let os = status.node_info.as_ref().map(|i| i.operating_system.clone());

    Some((name, NodeInfo { ip, ready, labels, taints, arch, os }))
}
