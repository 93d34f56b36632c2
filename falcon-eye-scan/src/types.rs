use serde::Serialize;

/// One `/dev/video*` device found on a node over SSH.
#[derive(Debug, Clone, Serialize)]
pub struct UsbDevice {
    pub node_name: String,
    pub device_path: String,
    pub friendly_name: Option<String>,
}

/// A candidate network camera endpoint found by subnet probing.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NetworkCandidate {
    pub ip: std::net::IpAddr,
    pub port: u16,
    pub protocol: &'static str,
}

/// SSH credentials for a single node, resolved from configuration. No
/// per-node override: the scanner uses one credential set across the fleet.
#[derive(Clone)]
pub struct SshCredentials {
    pub username: String,
    pub private_key_path: Option<std::path::PathBuf>,
    pub password: Option<String>,
    pub port: u16,
}
