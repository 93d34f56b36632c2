use clap::Parser;

#[derive(Parser, Debug, Clone)]
pub struct PostgresArgs {
    #[arg(long, env = "POSTGRES_HOST", default_value = "localhost")]
    pub postgres_host: String,

    #[arg(long, env = "POSTGRES_PORT", default_value_t = 5432)]
    pub postgres_port: u16,

    #[arg(long, env = "POSTGRES_DATABASE", default_value = "falcon_eye")]
    pub postgres_database: String,

    #[arg(long, env = "POSTGRES_USERNAME", default_value = "postgres")]
    pub postgres_username: String,

    #[arg(long, env = "POSTGRES_PASSWORD")]
    pub postgres_password: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ClusterArgs {
    /// Namespace every Falcon-Eye workload is created in.
    #[arg(long, env = "FALCON_EYE_NAMESPACE", default_value = "falcon-eye")]
    pub namespace: String,

    /// Comma-separated node names treated as Jetson devices; these nodes
    /// get the `dedicated=jetson:NoSchedule` toleration on their pods.
    #[arg(long, env = "FALCON_EYE_JETSON_NODES", value_delimiter = ',')]
    pub jetson_nodes: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct SweeperArgs {
    /// How often the sweeper reclaims orphaned workloads and recordings.
    #[arg(long, env = "CLEANUP_INTERVAL_SECONDS", default_value_t = 120)]
    pub cleanup_interval_seconds: u64,

    /// Minutes a Camera/Agent may sit in `creating` before being forced to `error`.
    #[arg(long, env = "CREATING_TIMEOUT_MINUTES", default_value_t = 3)]
    pub creating_timeout_minutes: i64,
}

#[derive(Parser, Debug, Clone)]
pub struct AuthArgs {
    /// Shared-secret bearer token required on every request. Authentication
    /// beyond this single-token check is out of scope (see spec Non-goals).
    #[arg(long, env = "FALCON_EYE_BEARER_TOKEN")]
    pub bearer_token: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ScanArgs {
    /// SSH user the node scanner connects as to enumerate USB video devices.
    #[arg(long, env = "FALCON_EYE_SSH_USERNAME", default_value = "falcon-eye")]
    pub ssh_username: String,

    #[arg(long, env = "FALCON_EYE_SSH_PRIVATE_KEY_PATH")]
    pub ssh_private_key_path: Option<std::path::PathBuf>,

    #[arg(long, env = "FALCON_EYE_SSH_PASSWORD")]
    pub ssh_password: Option<String>,

    #[arg(long, env = "FALCON_EYE_SSH_PORT", default_value_t = 22)]
    pub ssh_port: u16,
}
