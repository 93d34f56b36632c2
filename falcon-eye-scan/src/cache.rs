//! In-memory scan result cache, sharing the Node Registry's 5-minute TTL
//! (§4.11 leaves persistence unspecified; results are advisory and not
//! worth a new storage subsystem). Keyed by node name for USB results and
//! by subnet for network candidates, so repeated scans within the TTL don't
//! re-probe unchanged nodes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::types::{NetworkCandidate, UsbDevice};

const TTL: Duration = Duration::from_secs(5 * 60);

struct Entry<T> {
    value: T,
    cached_at: Instant,
}

#[derive(Default)]
struct Store {
    usb: HashMap<String, Entry<Vec<UsbDevice>>>,
    network: HashMap<String, Entry<Vec<NetworkCandidate>>>,
}

#[derive(Clone, Default)]
pub struct ScanCache {
    inner: Arc<RwLock<Store>>,
}

impl ScanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_usb(&self, node_name: &str) -> Option<Vec<UsbDevice>> {
        let store = self.inner.read().await;
        store.usb.get(node_name).filter(|e| e.cached_at.elapsed() < TTL).map(|e| e.value.clone())
    }

    pub async fn put_usb(&self, node_name: &str, devices: Vec<UsbDevice>) {
        let mut store = self.inner.write().await;
        store.usb.insert(node_name.to_string(), Entry { value: devices, cached_at: Instant::now() });
    }

    pub async fn get_network(&self, subnet: &str) -> Option<Vec<NetworkCandidate>> {
        let store = self.inner.read().await;
        store.network.get(subnet).filter(|e| e.cached_at.elapsed() < TTL).map(|e| e.value.clone())
    }

    pub async fn put_network(&self, subnet: &str, candidates: Vec<NetworkCandidate>) {
        let mut store = self.inner.write().await;
        store.network.insert(subnet.to_string(), Entry { value: candidates, cached_at: Instant::now() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn usb_miss_then_hit_after_put() {
        let cache = ScanCache::new();
        assert!(cache.get_usb("node-1").await.is_none());
        cache
            .put_usb("node-1", vec![UsbDevice { node_name: "node-1".to_string(), device_path: "/dev/video0".to_string(), friendly_name: None }])
            .await;
        let hit = cache.get_usb("node-1").await.unwrap();
        assert_eq!(hit.len(), 1);
    }

    #[tokio::test]
    async fn network_cache_is_keyed_by_subnet() {
        let cache = ScanCache::new();
        cache.put_network("10.0.0.0/24", vec![NetworkCandidate { ip: "10.0.0.5".parse().unwrap(), port: 554, protocol: "rtsp" }]).await;
        assert!(cache.get_network("10.0.0.0/24").await.is_some());
        assert!(cache.get_network("10.0.1.0/24").await.is_none());
    }
}
