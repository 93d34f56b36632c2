use anyhow::{Context, Result};
use falcon_eye_db::Error as DbError;
use falcon_eye_types::{Agent, MAIN_AGENT_SLUG};

use falcon_eye_core::Engine;

/// Runs schema migrations and ensures the always-present `main` agent row
/// exists, so a fresh deployment has something to chat with immediately.
pub async fn run(engine: &Engine, main_provider: &str, main_model: &str) -> Result<()> {
    falcon_eye_db::init_schema(&engine.db).await.context("failed to initialize database schema")?;

    match falcon_eye_db::agents::get_agent_by_slug(&engine.db, MAIN_AGENT_SLUG).await {
        Ok(_) => {}
        Err(DbError::NotFound) => {
            let agent = Agent::main_agent(main_provider.to_string(), main_model.to_string());
            falcon_eye_db::agents::insert_agent(&engine.db, &agent).await.context("failed to seed main agent")?;
            tracing::info!("seeded main agent");
        }
        Err(err) => return Err(err).context("failed to look up main agent"),
    }

    Ok(())
}
