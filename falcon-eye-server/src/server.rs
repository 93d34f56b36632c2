use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::routing::{get, patch, post};
use axum::Router;
use falcon_eye_common::auth::BearerAuth;
use falcon_eye_common::metrics::MetricsLayer;
use falcon_eye_common::shutdown::shutdown_signal;
use falcon_eye_common::{access_log, cors};
use falcon_eye_core::Engine;

use crate::args::ServerArgs;
use crate::handlers;

fn routes(engine: Engine) -> Router {
    let cameras = Router::new()
        .route("/", get(handlers::cameras::list).post(handlers::cameras::create))
        .route(
            "/{id}",
            get(handlers::cameras::get).patch(handlers::cameras::update).delete(handlers::cameras::delete),
        )
        .route("/{id}/start", post(handlers::cameras::start))
        .route("/{id}/stop", post(handlers::cameras::stop))
        .route("/{id}/restart", post(handlers::cameras::restart))
        .route("/{id}/stream", get(handlers::cameras::stream))
        .route(
            "/{id}/recording/status",
            get(handlers::cameras::recording_status),
        )
        .route("/{id}/recording/start", post(handlers::cameras::recording_start))
        .route("/{id}/recording/stop", post(handlers::cameras::recording_stop));

    let recordings = Router::new()
        .route("/", get(handlers::recordings::list).post(handlers::recordings::create))
        .route(
            "/{id}",
            patch(handlers::recordings::update).delete(handlers::recordings::delete),
        )
        .route("/{id}/download", get(handlers::recordings::download));

    let nodes = Router::new()
        .route("/", get(handlers::nodes::list))
        .route("/scan/cameras", get(handlers::nodes::scan))
        .route("/{name}", get(handlers::nodes::get));

    let settings = Router::new()
        .route("/", get(handlers::settings::get).patch(handlers::settings::patch))
        .route("/restart-all", post(handlers::settings::restart_all))
        .route("/cameras/all", axum::routing::delete(handlers::settings::delete_all_cameras));

    let agents = Router::new()
        .route("/", get(handlers::agents::list).post(handlers::agents::create))
        .route(
            "/{id}",
            get(handlers::agents::get).patch(handlers::agents::update).delete(handlers::agents::delete),
        )
        .route("/{id}/start", post(handlers::agents::start))
        .route("/{id}/stop", post(handlers::agents::stop))
        .route("/{id}/restart", post(handlers::agents::restart))
        .route(
            "/{id}/tools",
            get(handlers::tools::get_agent_tools).put(handlers::tools::put_agent_tools),
        )
        .route("/{id}/chat-config", get(handlers::tools::chat_config));

    let chat = Router::new()
        .route("/{agent_id}/send", post(handlers::chat::send))
        .route("/{agent_id}/history", get(handlers::chat::history))
        .route(
            "/{agent_id}/sessions",
            get(handlers::chat::sessions),
        )
        .route("/{agent_id}/sessions/new", post(handlers::chat::new_session))
        .route("/{agent_id}/messages/save", post(handlers::chat::save_message));

    let tools = Router::new()
        .route("/", get(handlers::tools::registry))
        .route("/execute", post(handlers::tools::execute));

    let cron = Router::new().route("/{id}/record-run", post(handlers::cron::record_run));

    Router::new()
        .route("/healthz", get(handlers::health))
        .route("/readyz", get(handlers::health))
        .nest("/api/cameras", cameras)
        .nest("/api/recordings", recordings)
        .nest("/api/nodes", nodes)
        .nest("/api/settings", settings)
        .nest("/api/agents", agents)
        .nest("/api/chat", chat)
        .nest("/api/tools", tools)
        .nest("/api/cron", cron)
        .with_state(engine)
}

pub async fn run_server(args: ServerArgs, engine: Engine) -> Result<()> {
    let cors = if args.cors_origins.is_empty() {
        cors::dev()
    } else {
        let origins: Vec<&str> = args.cors_origins.iter().map(String::as_str).collect();
        cors::prod(&origins)
    };

    let bearer = BearerAuth::new(args.auth.bearer_token);

    let app = routes(engine)
        .layer(axum::middleware::from_fn_with_state(bearer, BearerAuth::layer))
        .layer(axum::middleware::from_fn(access_log::request))
        .layer(axum::middleware::from_fn(
            falcon_eye_common::middleware::create_context,
        ))
        .layer(MetricsLayer::default())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse().context("invalid bind address")?;
    tracing::info!(%addr, "starting falcon-eye server");
    let listener = tokio::net::TcpListener::bind(addr).await.context("failed to bind")?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await.context("server error")?;
    tracing::info!("server stopped gracefully");
    Ok(())
}
