use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{PodSpec, PodTemplateSpec, Service, ServicePort, ServiceSpec, Toleration};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::api::ObjectMeta;

use falcon_eye_types::camera::Camera;
use falcon_eye_types::labels::{self, Component};
use falcon_eye_types::naming;

use crate::protocol::CameraProtocol;
use crate::resources;

/// Renders the camera's Deployment. USB cameras MUST carry a `nodeSelector`
/// pinning `kubernetes.io/hostname`; network cameras only pin one if the
/// entity was created with a `node_name`.
pub fn render_camera_deployment(camera: &Camera, jetson_nodes: &[String]) -> Deployment {
    let name = naming::camera_deployment_name(&camera.slug);
    let labels = labels::base_labels(Component::Camera, &camera.id.to_string());
    let protocol = CameraProtocol::from_camera(camera);
    let containers = protocol.render();

    let mut node_selector = BTreeMap::new();
    if let Some(node) = &camera.node_name {
        node_selector.insert("kubernetes.io/hostname".to_string(), node.clone());
    }

    let tolerations = camera
        .node_name
        .as_ref()
        .filter(|n| jetson_nodes.iter().any(|j| j == *n))
        .map(|_| {
            vec![Toleration {
                key: Some(resources::JETSON_TOLERATION_KEY.to_string()),
                value: Some(resources::JETSON_TOLERATION_VALUE.to_string()),
                effect: Some("NoSchedule".to_string()),
                operator: Some("Equal".to_string()),
                ..Default::default()
            }]
        });

    Deployment {
        metadata: ObjectMeta {
            name: Some(name),
            labels: Some(labels.clone().into_iter().collect()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector {
                match_labels: Some(labels.clone().into_iter().collect()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels.into_iter().collect()),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers,
                    node_selector: (!node_selector.is_empty()).then_some(node_selector),
                    tolerations,
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        status: None,
    }
}

/// ClusterIP Service for the camera. USB cameras expose `control=8080` in
/// addition to `stream=8081`; network cameras expose only the stream port.
pub fn render_camera_service(camera: &Camera) -> Service {
    let name = naming::camera_service_name(&camera.slug);
    let labels = labels::base_labels(Component::Camera, &camera.id.to_string());

    let mut ports = vec![ServicePort {
        name: Some("stream".to_string()),
        port: resources::STREAM_PORT,
        ..Default::default()
    }];
    if matches!(camera.protocol, falcon_eye_types::camera::Protocol::Usb) {
        ports.push(ServicePort {
            name: Some("control".to_string()),
            port: resources::CONTROL_PORT,
            ..Default::default()
        });
    }

    Service {
        metadata: ObjectMeta {
            name: Some(name),
            labels: Some(labels.clone().into_iter().collect()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some("ClusterIP".to_string()),
            selector: Some(labels.into_iter().collect()),
            ports: Some(ports),
            ..Default::default()
        }),
        status: None,
    }
}

/// Per §4.3: USB -> the camera's own ClusterIP service; RTSP/ONVIF -> the
/// original source URL unchanged; HTTP -> the relay's ClusterIP URL.
pub fn stream_url(camera: &Camera, namespace: &str) -> String {
    use falcon_eye_types::camera::Protocol;
    match camera.protocol {
        Protocol::Usb | Protocol::Http => format!(
            "http://{}.{}.svc.cluster.local:{}/",
            naming::camera_service_name(&camera.slug),
            namespace,
            resources::STREAM_PORT
        ),
        Protocol::Rtsp | Protocol::Onvif => camera.source_url.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use falcon_eye_types::camera::{CreateCameraRequest, Protocol};

    fn usb_camera(node_name: &str) -> Camera {
        Camera::new(CreateCameraRequest {
            name: "Office".to_string(),
            protocol: "usb".to_string(),
            location: None,
            source_url: None,
            device_path: Some("/dev/video0".to_string()),
            node_name: Some(node_name.to_string()),
            resolution: None,
            framerate: None,
        })
        .unwrap()
    }

    fn rtsp_camera() -> Camera {
        Camera::new(CreateCameraRequest {
            name: "Front Door".to_string(),
            protocol: "rtsp".to_string(),
            location: None,
            source_url: Some("rtsp://192.168.1.100:554/stream1".to_string()),
            device_path: None,
            node_name: None,
            resolution: None,
            framerate: None,
        })
        .unwrap()
    }

    #[test]
    fn usb_deployment_pins_node_selector() {
        let deployment = render_camera_deployment(&usb_camera("k3s-1"), &[]);
        let spec = deployment.spec.unwrap().template.spec.unwrap();
        assert_eq!(spec.node_selector.unwrap().get("kubernetes.io/hostname").unwrap(), "k3s-1");
        assert!(spec.tolerations.is_none());
    }

    #[test]
    fn jetson_node_gets_toleration() {
        let deployment = render_camera_deployment(&usb_camera("jetson-1"), &["jetson-1".to_string()]);
        let spec = deployment.spec.unwrap().template.spec.unwrap();
        let tolerations = spec.tolerations.unwrap();
        assert_eq!(tolerations.len(), 1);
        assert_eq!(tolerations[0].key.as_deref(), Some(resources::JETSON_TOLERATION_KEY));
    }

    #[test]
    fn network_camera_without_node_name_has_no_selector() {
        let deployment = render_camera_deployment(&rtsp_camera(), &[]);
        let spec = deployment.spec.unwrap().template.spec.unwrap();
        assert!(spec.node_selector.is_none());
    }

    #[test]
    fn usb_service_exposes_control_port() {
        let service = render_camera_service(&usb_camera("k3s-1"));
        let ports = service.spec.unwrap().ports.unwrap();
        assert_eq!(ports.len(), 2);
        assert!(ports.iter().any(|p| p.name.as_deref() == Some("control") && p.port == resources::CONTROL_PORT));
    }

    #[test]
    fn network_service_exposes_stream_port_only() {
        let service = render_camera_service(&rtsp_camera());
        let ports = service.spec.unwrap().ports.unwrap();
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].name.as_deref(), Some("stream"));
    }

    #[test]
    fn stream_url_passes_through_for_rtsp() {
        let camera = rtsp_camera();
        assert_eq!(stream_url(&camera, "falcon-eye"), camera.source_url.clone().unwrap());
    }

    #[test]
    fn stream_url_points_at_service_for_usb() {
        let camera = usb_camera("k3s-1");
        let url = stream_url(&camera, "falcon-eye");
        assert!(url.contains(&naming::camera_service_name(&camera.slug)));
        assert!(url.contains("falcon-eye.svc.cluster.local"));
        assert!(matches!(camera.protocol, Protocol::Usb));
    }
}
