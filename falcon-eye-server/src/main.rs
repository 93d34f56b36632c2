use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use falcon_eye_cluster::ClusterClient;
use falcon_eye_core::{Engine, EngineConfig};
use falcon_eye_scan::SshCredentials;

mod args;
mod bootstrap;
mod error;
mod handlers;
mod server;
mod sweeper_task;

use args::ServerArgs;

#[tokio::main]
async fn main() -> Result<()> {
    falcon_eye_common::tracing_setup::init();

    let args = ServerArgs::parse();

    let db = falcon_eye_common::postgres::create_pool(args.postgres.clone());
    let cluster = ClusterClient::try_default(args.cluster.namespace.clone())
        .await
        .context("failed to build Kubernetes client")?;

    let config = EngineConfig {
        namespace: args.cluster.namespace.clone(),
        api_url: args.api_url.clone(),
        jetson_nodes: args.cluster.jetson_nodes.clone(),
        creating_timeout_minutes: args.sweeper.creating_timeout_minutes,
        cleanup_interval_seconds: args.sweeper.cleanup_interval_seconds,
        chat_deadline_seconds: args.chat_deadline_seconds,
        ssh_credentials: SshCredentials {
            username: args.scan.ssh_username.clone(),
            private_key_path: args.scan.ssh_private_key_path.clone(),
            password: args.scan.ssh_password.clone(),
            port: args.scan.ssh_port,
        },
    };

    let engine = Engine::new(db, cluster, config);

    bootstrap::run(&engine, &args.main_provider, &args.main_model).await?;

    sweeper_task::spawn(engine.clone(), Duration::from_secs(engine.config.cleanup_interval_seconds));

    falcon_eye_common::metrics::maybe_spawn_metrics_server();

    server::run_server(args, engine).await
}
