use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use falcon_eye_types::{AgentChatMessage, ChatMessage, ChatRole, ChatSession, MessageSource};

use crate::error::Error;

fn row_to_session(row: &Row) -> ChatSession {
    ChatSession {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

pub async fn create_session(pool: &Pool, id: Uuid, name: Option<&str>) -> Result<ChatSession, Error> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            "INSERT INTO chat_sessions (id, name) VALUES ($1, $2) \
             RETURNING id, name, created_at, updated_at",
            &[&id, &name],
        )
        .await
        .map_err(Error::from_postgres)?;
    Ok(row_to_session(&row))
}

pub async fn get_session(pool: &Pool, id: Uuid) -> Result<ChatSession, Error> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            "SELECT id, name, created_at, updated_at FROM chat_sessions WHERE id = $1",
            &[&id],
        )
        .await?;
    row.map(|r| row_to_session(&r)).ok_or(Error::NotFound)
}

pub async fn touch_session(pool: &Pool, id: Uuid) -> Result<(), Error> {
    let client = pool.get().await?;
    client
        .execute("UPDATE chat_sessions SET updated_at = now() WHERE id = $1", &[&id])
        .await?;
    Ok(())
}

fn row_to_message(row: &Row) -> ChatMessage {
    let role: String = row.get("role");
    ChatMessage {
        id: row.get("id"),
        session_id: row.get("session_id"),
        role: role.parse().unwrap_or(ChatRole::System),
        content: row.get("content"),
        created_at: row.get("created_at"),
    }
}

pub async fn insert_message(
    pool: &Pool,
    session_id: Uuid,
    role: ChatRole,
    content: &str,
) -> Result<ChatMessage, Error> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            "INSERT INTO chat_messages (id, session_id, role, content) VALUES ($1,$2,$3,$4) \
             RETURNING id, session_id, role, content, created_at",
            &[&Uuid::new_v4(), &session_id, &role.as_str(), &content],
        )
        .await
        .map_err(Error::from_postgres)?;
    Ok(row_to_message(&row))
}

pub async fn list_messages(pool: &Pool, session_id: Uuid) -> Result<Vec<ChatMessage>, Error> {
    let client = pool.get().await?;
    let rows = client
        .query(
            "SELECT id, session_id, role, content, created_at FROM chat_messages \
             WHERE session_id = $1 ORDER BY created_at ASC",
            &[&session_id],
        )
        .await?;
    Ok(rows.iter().map(row_to_message).collect())
}

const AGENT_MSG_COLUMNS: &str = "id, agent_id, session_id, role, content, source, source_user, \
    prompt_tokens, completion_tokens, created_at";

fn row_to_agent_message(row: &Row) -> AgentChatMessage {
    let role: String = row.get("role");
    let source: String = row.get("source");
    AgentChatMessage {
        id: row.get("id"),
        agent_id: row.get("agent_id"),
        session_id: row.get("session_id"),
        role: role.parse().unwrap_or(ChatRole::System),
        content: row.get("content"),
        source: source.parse().unwrap_or(MessageSource::System),
        source_user: row.get("source_user"),
        prompt_tokens: row.get("prompt_tokens"),
        completion_tokens: row.get("completion_tokens"),
        created_at: row.get("created_at"),
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_agent_message(
    pool: &Pool,
    agent_id: Uuid,
    session_id: &str,
    role: ChatRole,
    content: &str,
    source: MessageSource,
    source_user: Option<&str>,
    prompt_tokens: Option<i32>,
    completion_tokens: Option<i32>,
) -> Result<AgentChatMessage, Error> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            &format!(
                "INSERT INTO agent_chat_messages (id, agent_id, session_id, role, content, \
                 source, source_user, prompt_tokens, completion_tokens) \
                 VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9) RETURNING {AGENT_MSG_COLUMNS}"
            ),
            &[
                &Uuid::new_v4(),
                &agent_id,
                &session_id,
                &role.as_str(),
                &content,
                &source.as_str(),
                &source_user,
                &prompt_tokens,
                &completion_tokens,
            ],
        )
        .await
        .map_err(Error::from_postgres)?;
    Ok(row_to_agent_message(&row))
}

/// Full transcript for one (agent, session) pair, oldest first — the shape
/// the Chat Router posts to an agent pod's `/chat/send` RPC.
pub async fn list_agent_messages(
    pool: &Pool,
    agent_id: Uuid,
    session_id: &str,
) -> Result<Vec<AgentChatMessage>, Error> {
    let client = pool.get().await?;
    let rows = client
        .query(
            &format!(
                "SELECT {AGENT_MSG_COLUMNS} FROM agent_chat_messages \
                 WHERE agent_id = $1 AND session_id = $2 ORDER BY created_at ASC"
            ),
            &[&agent_id, &session_id],
        )
        .await?;
    Ok(rows.iter().map(row_to_agent_message).collect())
}

pub async fn list_agent_sessions(pool: &Pool, agent_id: Uuid) -> Result<Vec<String>, Error> {
    let client = pool.get().await?;
    let rows = client
        .query(
            "SELECT DISTINCT session_id FROM agent_chat_messages WHERE agent_id = $1 \
             ORDER BY session_id ASC",
            &[&agent_id],
        )
        .await?;
    Ok(rows.iter().map(|r| r.get("session_id")).collect())
}
