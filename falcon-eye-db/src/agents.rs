use deadpool_postgres::Pool;
use postgres_types::ToSql;
use tokio_postgres::Row;
use uuid::Uuid;

use falcon_eye_types::{Agent, ChannelType, EntityStatus};

use crate::error::Error;

const COLUMNS: &str = "id, name, slug, provider, model, api_key_ref, system_prompt, temperature, \
    max_tokens, channel_type, channel_config, tools, status, deployment_name, service_name, \
    node_name, cpu_limit, memory_limit, created_at, updated_at";

fn row_to_agent(row: &Row) -> Agent {
    let status: String = row.get("status");
    let channel_type: Option<String> = row.get("channel_type");
    let tools: serde_json::Value = row.get("tools");
    Agent {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        provider: row.get("provider"),
        model: row.get("model"),
        api_key_ref: row.get("api_key_ref"),
        system_prompt: row.get("system_prompt"),
        temperature: row.get("temperature"),
        max_tokens: row.get("max_tokens"),
        channel_type: channel_type.and_then(|s| s.parse::<ChannelType>().ok()),
        channel_config: row.get("channel_config"),
        tools: match tools {
            serde_json::Value::Array(v) => v
                .into_iter()
                .filter_map(|x| x.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        },
        status: status.parse().unwrap_or(EntityStatus::Error),
        deployment_name: row.get("deployment_name"),
        service_name: row.get("service_name"),
        node_name: row.get("node_name"),
        cpu_limit: row.get("cpu_limit"),
        memory_limit: row.get("memory_limit"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

pub async fn insert_agent(pool: &Pool, agent: &Agent) -> Result<Agent, Error> {
    let client = pool.get().await?;
    let channel_type = agent.channel_type.map(|c| match c {
        ChannelType::Telegram => "telegram",
        ChannelType::Webhook => "webhook",
    });
    let tools = serde_json::to_value(&agent.tools).unwrap_or_default();
    let row = client
        .query_one(
            &format!(
                "INSERT INTO agents (id, name, slug, provider, model, api_key_ref, system_prompt, \
                 temperature, max_tokens, channel_type, channel_config, tools, status, \
                 deployment_name, service_name, node_name, cpu_limit, memory_limit, created_at, \
                 updated_at) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19,$20) \
                 RETURNING {COLUMNS}"
            ),
            &[
                &agent.id,
                &agent.name,
                &agent.slug,
                &agent.provider,
                &agent.model,
                &agent.api_key_ref,
                &agent.system_prompt,
                &agent.temperature,
                &agent.max_tokens,
                &channel_type,
                &agent.channel_config,
                &tools,
                &agent.status.as_str(),
                &agent.deployment_name,
                &agent.service_name,
                &agent.node_name,
                &agent.cpu_limit,
                &agent.memory_limit,
                &agent.created_at,
                &agent.updated_at,
            ],
        )
        .await
        .map_err(Error::from_postgres)?;
    Ok(row_to_agent(&row))
}

pub async fn get_agent(pool: &Pool, id: Uuid) -> Result<Agent, Error> {
    let client = pool.get().await?;
    let row = client
        .query_opt(&format!("SELECT {COLUMNS} FROM agents WHERE id = $1"), &[&id])
        .await?;
    row.map(|r| row_to_agent(&r)).ok_or(Error::NotFound)
}

pub async fn get_agent_by_slug(pool: &Pool, slug: &str) -> Result<Agent, Error> {
    let client = pool.get().await?;
    let row = client
        .query_opt(&format!("SELECT {COLUMNS} FROM agents WHERE slug = $1"), &[&slug])
        .await?;
    row.map(|r| row_to_agent(&r)).ok_or(Error::NotFound)
}

pub async fn list_agents(pool: &Pool) -> Result<Vec<Agent>, Error> {
    let client = pool.get().await?;
    let rows = client
        .query(&format!("SELECT {COLUMNS} FROM agents ORDER BY name ASC"), &[])
        .await?;
    Ok(rows.iter().map(row_to_agent).collect())
}

#[derive(Default)]
pub struct AgentPatch {
    pub name: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
    pub channel_type: Option<Option<&'static str>>,
    pub channel_config: Option<serde_json::Value>,
    pub tools: Option<serde_json::Value>,
    pub status: Option<&'static str>,
    pub deployment_name: Option<Option<String>>,
    pub service_name: Option<Option<String>>,
    pub node_name: Option<Option<String>>,
}

pub async fn update_agent(pool: &Pool, id: Uuid, patch: AgentPatch) -> Result<Agent, Error> {
    let client = pool.get().await?;

    let mut set_clauses = vec!["updated_at = now()".to_string()];
    let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();
    let mut idx = 1;

    macro_rules! push {
        ($col:expr, $val:expr) => {{
            set_clauses.push(format!("{} = ${}", $col, idx));
            params.push($val);
            idx += 1;
        }};
    }

    if let Some(ref v) = patch.name {
        push!("name", v);
    }
    if let Some(ref v) = patch.system_prompt {
        push!("system_prompt", v);
    }
    if let Some(ref v) = patch.temperature {
        push!("temperature", v);
    }
    if let Some(ref v) = patch.max_tokens {
        push!("max_tokens", v);
    }
    if let Some(ref v) = patch.channel_type {
        push!("channel_type", v);
    }
    if let Some(ref v) = patch.channel_config {
        push!("channel_config", v);
    }
    if let Some(ref v) = patch.tools {
        push!("tools", v);
    }
    if let Some(ref v) = patch.status {
        push!("status", v);
    }
    if let Some(ref v) = patch.deployment_name {
        push!("deployment_name", v);
    }
    if let Some(ref v) = patch.service_name {
        push!("service_name", v);
    }
    if let Some(ref v) = patch.node_name {
        push!("node_name", v);
    }

    let query = format!("UPDATE agents SET {} WHERE id = ${idx} RETURNING {COLUMNS}", set_clauses.join(", "));
    params.push(&id);

    let row = client.query_opt(&query, &params).await.map_err(Error::from_postgres)?;
    row.map(|r| row_to_agent(&r)).ok_or(Error::NotFound)
}

pub async fn delete_agent(pool: &Pool, id: Uuid) -> Result<bool, Error> {
    let client = pool.get().await?;
    let affected = client.execute("DELETE FROM agents WHERE id = $1", &[&id]).await?;
    Ok(affected > 0)
}
