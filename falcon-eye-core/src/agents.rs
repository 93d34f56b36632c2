//! Lifecycle Controller (C5) for Agent entities, plus the dispatch side of
//! the `spawn_agent`/`delegate_task` tools (§4.9).

use falcon_eye_types::{labels, Agent, CreateAgentRequest, EntityStatus, UpdateAgentRequest};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use serde_json::json;
use uuid::Uuid;

use crate::engine::Engine;
use crate::error::Error;

pub async fn create(engine: &Engine, req: CreateAgentRequest) -> Result<Agent, Error> {
    let agent = Agent::new(req)?;
    Ok(falcon_eye_db::agents::insert_agent(&engine.db, &agent).await?)
}

pub async fn get(engine: &Engine, id: Uuid) -> Result<Agent, Error> {
    Ok(falcon_eye_db::agents::get_agent(&engine.db, id).await?)
}

pub async fn list(engine: &Engine) -> Result<Vec<Agent>, Error> {
    Ok(falcon_eye_db::agents::list_agents(&engine.db).await?)
}

pub async fn update(engine: &Engine, id: Uuid, req: UpdateAgentRequest) -> Result<Agent, Error> {
    let channel_type = req.channel_type.as_deref().map(str::parse).transpose()?;
    let patch = falcon_eye_db::agents::AgentPatch {
        name: req.name,
        system_prompt: req.system_prompt,
        temperature: req.temperature,
        max_tokens: req.max_tokens,
        channel_type: Some(channel_type.map(|c: falcon_eye_types::ChannelType| match c {
            falcon_eye_types::ChannelType::Telegram => "telegram",
            falcon_eye_types::ChannelType::Webhook => "webhook",
        })),
        channel_config: req.channel_config,
        tools: req.tools.map(|t| serde_json::to_value(&t).unwrap_or_default()),
        ..Default::default()
    };
    Ok(falcon_eye_db::agents::update_agent(&engine.db, id, patch).await?)
}

pub async fn start(engine: &Engine, id: Uuid) -> Result<Agent, Error> {
    let agent = falcon_eye_db::agents::get_agent(&engine.db, id).await?;
    if agent.status == EntityStatus::Running {
        return Ok(agent);
    }
    let patch = falcon_eye_db::agents::AgentPatch {
        status: Some(EntityStatus::Creating.as_str()),
        ..Default::default()
    };
    falcon_eye_db::agents::update_agent(&engine.db, id, patch).await?;

    let deployment = falcon_eye_manifest::render_agent_deployment(&agent, &engine.config.api_url);
    let service = falcon_eye_manifest::render_agent_service(&agent);
    let deployment_name = deployment.metadata.name.clone().unwrap_or_default();
    let service_name = service.metadata.name.clone().unwrap_or_default();

    match async {
        engine.cluster.apply_deployment(&deployment_name, deployment).await?;
        engine.cluster.apply_service(&service_name, service).await?;
        Ok::<_, falcon_eye_cluster::Error>(())
    }
    .await
    {
        Ok(()) => {
            let patch = falcon_eye_db::agents::AgentPatch {
                status: Some(EntityStatus::Running.as_str()),
                deployment_name: Some(Some(deployment_name)),
                service_name: Some(Some(service_name)),
                ..Default::default()
            };
            Ok(falcon_eye_db::agents::update_agent(&engine.db, id, patch).await?)
        }
        Err(err) => {
            let patch = falcon_eye_db::agents::AgentPatch {
                status: Some(EntityStatus::Error.as_str()),
                ..Default::default()
            };
            let _ = falcon_eye_db::agents::update_agent(&engine.db, id, patch).await;
            Err(Error::Cluster(err))
        }
    }
}

pub async fn stop(engine: &Engine, id: Uuid) -> Result<Agent, Error> {
    let agent = falcon_eye_db::agents::get_agent(&engine.db, id).await?;
    let selector = labels::selector(labels::AGENT_ID, &id.to_string());
    engine.cluster.delete_by_labels::<Deployment>(&selector).await?;
    engine.cluster.delete_by_labels::<Service>(&selector).await?;
    let patch = falcon_eye_db::agents::AgentPatch {
        status: Some(EntityStatus::Stopped.as_str()),
        deployment_name: Some(None),
        service_name: Some(None),
        ..Default::default()
    };
    let _ = agent;
    Ok(falcon_eye_db::agents::update_agent(&engine.db, id, patch).await?)
}

pub async fn restart(engine: &Engine, id: Uuid) -> Result<Agent, Error> {
    stop(engine, id).await?;
    start(engine, id).await
}

pub async fn delete(engine: &Engine, id: Uuid) -> Result<(), Error> {
    let agent = falcon_eye_db::agents::get_agent(&engine.db, id).await?;
    if agent.is_main() {
        return Err(Error::Conflict("the main agent cannot be deleted".to_string()));
    }
    let selector = labels::selector(labels::AGENT_ID, &id.to_string());
    engine.cluster.delete_by_labels::<Deployment>(&selector).await?;
    engine.cluster.delete_by_labels::<Service>(&selector).await?;
    falcon_eye_db::agents::delete_agent(&engine.db, id).await?;
    Ok(())
}

/// Creates an ephemeral agent inheriting the caller's provider/model/tools
/// (minus meta-tools, §9), dispatches a one-shot Job to run `task`, and
/// marks the agent so the Chat Router's save path deletes it once the
/// callback lands.
pub async fn spawn_ephemeral(
    engine: &Engine,
    caller: &Agent,
    name: &str,
    task: &str,
    session_id: &str,
) -> Result<Agent, Error> {
    let task_id = Uuid::new_v4();
    let req = CreateAgentRequest {
        name: name.to_string(),
        provider: caller.provider.clone(),
        model: caller.model.clone(),
        api_key_ref: caller.api_key_ref.clone(),
        system_prompt: caller.system_prompt.clone(),
        temperature: Some(caller.temperature),
        max_tokens: Some(caller.max_tokens),
        channel_type: None,
        channel_config: Some(json!({
            "ephemeral": true,
            "owner_session": session_id,
            "owner_agent": caller.id,
            "task_id": task_id,
        })),
        tools: Some(falcon_eye_types::strip_meta_tools(&caller.tools)),
    };
    let ephemeral = Agent::new(req)?;
    let inserted = falcon_eye_db::agents::insert_agent(&engine.db, &ephemeral).await?;

    let job = falcon_eye_manifest::render_task_job(
        &task_id.to_string(),
        &inserted,
        caller.id,
        session_id,
        task,
        &engine.config.api_url,
    );
    engine.cluster.create_job(job).await?;
    Ok(inserted)
}

/// Dispatches the same one-shot Job against an existing agent, without the
/// ephemeral create/cleanup dance. The target reports back under its own
/// id — it isn't ephemeral, so there's no caller identity to redirect to.
pub async fn delegate_task(engine: &Engine, target_agent_id: Uuid, task: &str, session_id: &str) -> Result<(), Error> {
    let target = falcon_eye_db::agents::get_agent(&engine.db, target_agent_id).await?;
    let task_id = Uuid::new_v4();
    let job = falcon_eye_manifest::render_task_job(
        &task_id.to_string(),
        &target,
        target.id,
        session_id,
        task,
        &engine.config.api_url,
    );
    engine.cluster.create_job(job).await?;
    Ok(())
}

/// Deletes an ephemeral agent's row once its callback has landed. The task
/// Job cleans itself up via `ttlSecondsAfterFinished`; there is no
/// Deployment/Service to tear down since ephemeral agents never get one.
pub async fn reap_ephemeral(engine: &Engine, id: Uuid) -> Result<(), Error> {
    falcon_eye_db::agents::delete_agent(&engine.db, id).await?;
    Ok(())
}
