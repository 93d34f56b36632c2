use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, EnvVar, EnvVarSource, ObjectFieldSelector, PodSpec, PodTemplateSpec, Service, ServicePort,
    ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::api::ObjectMeta;

use falcon_eye_types::camera::Camera;
use falcon_eye_types::labels::{self, Component};
use falcon_eye_types::naming;

use crate::cameras::stream_url;
use crate::protocol::env;
use crate::protocol::resource_requirements;
use crate::resources::{self, USB_RTSP_ONVIF};

/// Recorder pod Deployment: one container, `NODE_NAME` injected via the
/// downward API field reference `spec.nodeName`.
pub fn render_recorder_deployment(camera: &Camera, api_url: &str, namespace: &str) -> Deployment {
    let name = naming::recorder_deployment_name(&camera.slug);
    let labels = labels::base_labels(Component::Recorder, &camera.id.to_string());

    let mut env = vec![
        env_var("CAMERA_ID", camera.id.to_string()),
        env_var("CAMERA_NAME", camera.name.clone()),
        env_var("STREAM_URL", stream_url(camera, namespace)),
        env_var("API_URL", api_url.to_string()),
        env_var("RECORDINGS_PATH", "/recordings".to_string()),
        env_var("SEGMENT_DURATION", "3600".to_string()),
    ];
    env.push(EnvVar {
        name: "NODE_NAME".to_string(),
        value_from: Some(EnvVarSource {
            field_ref: Some(ObjectFieldSelector { field_path: "spec.nodeName".to_string(), ..Default::default() }),
            ..Default::default()
        }),
        ..Default::default()
    });

    let container = Container {
        name: "recorder".to_string(),
        image: Some("falcon-eye/recorder:latest".to_string()),
        env: Some(env),
        resources: Some(resource_requirements(&USB_RTSP_ONVIF)),
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

pub fn render_recorder_service(camera: &Camera) -> Service {
    let name = naming::recorder_service_name(&camera.slug);
    let labels = labels::base_labels(Component::Recorder, &camera.id.to_string());

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
                port: resources::CONTROL_PORT,
                ..Default::default()
            }]),
            ..Default::default()
        }),
        status: None,
    }
}

fn env_var(name: &str, value: String) -> EnvVar {
    env(name, value)
}
