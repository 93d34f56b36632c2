use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec, Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::api::ObjectMeta;

use falcon_eye_types::agent::Agent;
use falcon_eye_types::labels::{self, Component};
use falcon_eye_types::naming;

use crate::protocol::{env, resource_requirements};
use crate::resources::{ResourceSpec, CONTROL_PORT};

const AGENT_RESOURCES: ResourceSpec = ResourceSpec {
    request_memory: "256Mi",
    request_cpu: "100m",
    limit_memory: "1Gi",
    limit_cpu: "1000m",
};

/// Agent pod Deployment. LLM credentials are never baked in: they arrive
/// per-request from the Chat Router (§4.3 "arrive per-request").
pub fn render_agent_deployment(agent: &Agent, api_url: &str) -> Deployment {
    let name = naming::agent_deployment_name(&agent.slug);
    let labels = labels::base_labels(Component::Agent, &agent.id.to_string());

    let channel_type = agent.channel_type.map(|c| match c {
        falcon_eye_types::agent::ChannelType::Telegram => "telegram",
        falcon_eye_types::agent::ChannelType::Webhook => "webhook",
    });

    let env_vars = vec![
        env("AGENT_ID", agent.id.to_string()),
        env("API_URL", api_url.to_string()),
        env("CHANNEL_TYPE", channel_type.unwrap_or_default().to_string()),
        env(
            "CHANNEL_CONFIG",
            agent
                .channel_config
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_default(),
        ),
        env("AGENT_FILES_ROOT", format!("/data/falcon-eye/agents/{}", agent.id)),
    ];

    let container = Container {
        name: "agent".to_string(),
        image: Some("falcon-eye/agent:latest".to_string()),
        env: Some(env_vars),
        resources: Some(resource_requirements(&AGENT_RESOURCES)),
        ..Default::default()
    };

    Deployment {
        metadata: ObjectMeta {
            name: Some(name),
            labels: Some(labels.clone().into_iter().collect()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector { match_labels: Some(labels.clone().into_iter().collect()), ..Default::default() },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta { labels: Some(labels.into_iter().collect()), ..Default::default() }),
                spec: Some(PodSpec { containers: vec![container], ..Default::default() }),
            },
            ..Default::default()
        }),
        status: None,
    }
}

pub fn render_agent_service(agent: &Agent) -> Service {
    let name = naming::agent_service_name(&agent.slug);
    let labels = labels::base_labels(Component::Agent, &agent.id.to_string());

    Service {
        metadata: ObjectMeta {
            name: Some(name),
            labels: Some(labels.clone().into_iter().collect()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some("ClusterIP".to_string()),
            selector: Some(labels.into_iter().collect()),
            ports: Some(vec![ServicePort {
                name: Some("rpc".to_string()),
                port: CONTROL_PORT,
                ..Default::default()
            }]),
            ..Default::default()
        }),
        status: None,
    }
}
