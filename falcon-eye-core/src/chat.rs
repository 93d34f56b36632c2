//! Chat Router (C9): per-`(agent, session)` serialization, bounded-history
//! fan-out to the agent pod's RPC, and the deadline that turns a wedged pod
//! into a recorded error turn instead of a hung request.

use std::time::Duration;

use falcon_eye_types::{
    Agent, AgentChatMessage, AgentChatRequest, AgentChatResponse, ChatRole, LlmConfig, MessageSource,
    SaveMessageRequest, SendMessageResponse,
};
use uuid::Uuid;

use crate::agents;
use crate::engine::Engine;
use crate::error::Error;
use crate::tools;

const HISTORY_LIMIT: usize = 50;

pub async fn send_message(
    engine: &Engine,
    agent_id: Uuid,
    session_id: Option<String>,
    message: &str,
    source: MessageSource,
    source_user: Option<&str>,
) -> Result<SendMessageResponse, Error> {
    let session_id = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let _guard = engine.chat_locks.acquire(agent_id, &session_id).await;

    let agent = falcon_eye_db::agents::get_agent(&engine.db, agent_id).await?;

    falcon_eye_db::chat::insert_agent_message(
        &engine.db,
        agent_id,
        &session_id,
        ChatRole::User,
        message,
        source,
        source_user,
        None,
        None,
    )
    .await?;

    let history = falcon_eye_db::chat::list_agent_messages(&engine.db, agent_id, &session_id).await?;
    let history = tail(history, HISTORY_LIMIT);

    let request = AgentChatRequest {
        messages: history,
        tools: tools::schemas_for_agent(&agent),
        llm_config: LlmConfig {
            provider: agent.provider.clone(),
            model: agent.model.clone(),
            api_key: agent.api_key_ref.clone(),
            system_prompt: agent.system_prompt.clone(),
            temperature: agent.temperature,
            max_tokens: agent.max_tokens,
        },
    };

    let url = format!(
        "http://{}:8080/chat/send",
        falcon_eye_types::naming::agent_service_name(&agent.slug)
    );
    let deadline = Duration::from_secs(engine.config.chat_deadline_seconds);

    let outcome = tokio::time::timeout(deadline, post_chat(engine, &url, &request)).await;

    let (content, prompt_tokens, completion_tokens) = match outcome {
        Ok(Ok(resp)) => (resp.response, resp.prompt_tokens, resp.completion_tokens),
        Ok(Err(err)) => {
            let msg = format!("chat request failed: {err}");
            falcon_eye_db::chat::insert_agent_message(
                &engine.db,
                agent_id,
                &session_id,
                ChatRole::System,
                &msg,
                MessageSource::System,
                None,
                None,
                None,
            )
            .await?;
            return Err(Error::Transient(err.to_string()));
        }
        Err(_) => {
            let msg = "agent did not respond before the chat deadline".to_string();
            falcon_eye_db::chat::insert_agent_message(
                &engine.db,
                agent_id,
                &session_id,
                ChatRole::System,
                &msg,
                MessageSource::System,
                None,
                None,
                None,
            )
            .await?;
            return Err(Error::Transient(msg));
        }
    };

    falcon_eye_db::chat::insert_agent_message(
        &engine.db,
        agent_id,
        &session_id,
        ChatRole::Assistant,
        &content,
        MessageSource::Agent,
        None,
        prompt_tokens,
        completion_tokens,
    )
    .await?;

    Ok(SendMessageResponse { session_id, response: content, prompt_tokens, completion_tokens })
}

async fn post_chat(engine: &Engine, url: &str, request: &AgentChatRequest) -> Result<AgentChatResponse, reqwest::Error> {
    engine.http.post(url).json(request).send().await?.error_for_status()?.json().await
}

/// Direct-insert path used by pods writing callback turns (tool results,
/// cron-runner summaries, ephemeral task results); does not touch the
/// session lock since it never calls out to an agent pod. When the caller
/// carries `ephemeral_agent_id` (the task-runner pod finishing a
/// `spawn_agent` task), the ephemeral agent is reaped once its result has
/// landed, per §4.9's requirement that it not outlive its callback.
pub async fn save_message(engine: &Engine, agent_id: Uuid, req: SaveMessageRequest) -> Result<AgentChatMessage, Error> {
    let role: ChatRole = req.role.parse()?;
    let source: MessageSource = req.source.parse()?;
    let saved = falcon_eye_db::chat::insert_agent_message(
        &engine.db,
        agent_id,
        &req.session_id,
        role,
        &req.content,
        source,
        req.source_user.as_deref(),
        req.prompt_tokens,
        req.completion_tokens,
    )
    .await?;

    if let Some(ephemeral_agent_id) = req.ephemeral_agent_id {
        agents::reap_ephemeral(engine, ephemeral_agent_id).await?;
    }

    Ok(saved)
}

pub async fn history(engine: &Engine, agent_id: Uuid, session_id: &str) -> Result<Vec<AgentChatMessage>, Error> {
    Ok(falcon_eye_db::chat::list_agent_messages(&engine.db, agent_id, session_id).await?)
}

pub async fn sessions(engine: &Engine, agent_id: Uuid) -> Result<Vec<String>, Error> {
    Ok(falcon_eye_db::chat::list_agent_sessions(&engine.db, agent_id).await?)
}

pub async fn execute_tool(
    engine: &Engine,
    agent: &Agent,
    session_id: &str,
    name: &str,
    arguments: &serde_json::Value,
) -> Result<tools::ToolResult, Error> {
    tools::execute(engine, agent, session_id, name, arguments).await
}

fn tail(mut messages: Vec<AgentChatMessage>, limit: usize) -> Vec<AgentChatMessage> {
    if messages.len() > limit {
        messages = messages.split_off(messages.len() - limit);
    }
    messages
}
