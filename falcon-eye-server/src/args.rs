use clap::Parser;
use falcon_eye_common::args::{AuthArgs, ClusterArgs, PostgresArgs, ScanArgs, SweeperArgs};

#[derive(Parser, Debug, Clone)]
pub struct ServerArgs {
    #[command(flatten)]
    pub postgres: PostgresArgs,

    #[command(flatten)]
    pub cluster: ClusterArgs,

    #[command(flatten)]
    pub sweeper: SweeperArgs,

    #[command(flatten)]
    pub auth: AuthArgs,

    #[command(flatten)]
    pub scan: ScanArgs,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Base URL the core advertises to pods for their callback RPCs
    /// (`/api/chat/{id}/messages/save`, recording PATCHes, cron-run records).
    #[arg(long, env = "FALCON_EYE_API_URL", default_value = "http://falcon-eye-api.falcon-eye.svc.cluster.local:8080")]
    pub api_url: String,

    /// Provider/model the always-present `main` agent boots with.
    #[arg(long, env = "FALCON_EYE_MAIN_PROVIDER", default_value = "anthropic")]
    pub main_provider: String,

    #[arg(long, env = "FALCON_EYE_MAIN_MODEL", default_value = "claude-sonnet-4-5")]
    pub main_model: String,

    /// Seconds allowed for an agent pod to answer a chat send before the
    /// turn is recorded as a transient error.
    #[arg(long, env = "FALCON_EYE_CHAT_DEADLINE_SECONDS", default_value_t = 30)]
    pub chat_deadline_seconds: u64,

    /// Comma-separated origins for CORS. Unset means "mirror every origin"
    /// (dev mode); set it in any shared environment.
    #[arg(long, env = "FALCON_EYE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,
}
