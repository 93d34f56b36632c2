//! `ListNetwork(subnet)`: TCP-probes every host in a subnet across the
//! common camera ports with a short timeout.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::types::NetworkCandidate;

const PROBE_PORTS: &[u16] = &[554, 8554, 80, 8080, 8899];
const PROBE_TIMEOUT: Duration = Duration::from_millis(300);

fn protocol_for(port: u16) -> &'static str {
    match port {
        554 | 8554 => "rtsp",
        _ => "http",
    }
}

/// Expands a CIDR-notated IPv4 subnet (e.g. `192.168.1.0/24`) into its host
/// addresses, excluding the network and broadcast addresses.
fn hosts_in_subnet(cidr: &str) -> Vec<Ipv4Addr> {
    let Some((base, prefix)) = cidr.split_once('/') else {
        return Vec::new();
    };
    let Ok(base) = base.parse::<Ipv4Addr>() else {
        return Vec::new();
    };
    let Ok(prefix) = prefix.parse::<u32>() else {
        return Vec::new();
    };
    if prefix >= 32 {
        return vec![base];
    }

    let base_bits = u32::from(base);
    let host_bits = 32 - prefix;
    let mask = !0u32 << host_bits;
    let network = base_bits & mask;
    let count = 1u32 << host_bits;

    (1..count.saturating_sub(1)).map(|i| Ipv4Addr::from(network | i)).collect()
}

async fn probe(ip: IpAddr, port: u16) -> Option<NetworkCandidate> {
    let addr = SocketAddr::new(ip, port);
    match timeout(PROBE_TIMEOUT, TcpStream::connect(addr)).await {
        Ok(Ok(_)) => Some(NetworkCandidate { ip, port, protocol: protocol_for(port) }),
        _ => None,
    }
}

/// Probes every host in `subnet` across `PROBE_PORTS` concurrently. Advisory
/// only: a hit means "something is listening", not "this is a camera".
pub async fn list_network(subnet: &str) -> Vec<NetworkCandidate> {
    let hosts = hosts_in_subnet(subnet);
    let mut tasks = Vec::with_capacity(hosts.len() * PROBE_PORTS.len());
    for host in hosts {
        for &port in PROBE_PORTS {
            tasks.push(tokio::spawn(probe(IpAddr::V4(host), port)));
        }
    }

    let mut candidates = Vec::new();
    for task in tasks {
        if let Ok(Some(candidate)) = task.await {
            candidates.push(candidate);
        }
    }
    candidates.sort_by_key(|c| (c.ip, c.port));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subnet_excludes_network_and_broadcast() {
        let hosts = hosts_in_subnet("192.168.1.0/30");
        assert_eq!(hosts, vec![Ipv4Addr::new(192, 168, 1, 1), Ipv4Addr::new(192, 168, 1, 2)]);
    }

    #[test]
    fn malformed_subnet_yields_nothing() {
        assert!(hosts_in_subnet("not-a-subnet").is_empty());
    }

    #[tokio::test]
    async fn probe_rejects_closed_port() {
        let candidate = probe(IpAddr::V4(Ipv4Addr::LOCALHOST), 1).await;
        assert!(candidate.is_none());
    }
}
