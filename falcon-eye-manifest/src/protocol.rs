//! Tagged variant over camera protocols, each with a `render()` producing the
//! container list for that protocol's Deployment. This is the Rust shape of
//! the design note mapping "dynamic container-spec generation" onto a
//! tagged union with a render method.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Container, ContainerPort, EnvVar, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use falcon_eye_types::camera::{Camera, Resolution};

use crate::resources::{self, ResourceSpec};

pub enum CameraProtocol<'a> {
    Usb { camera: &'a Camera, motion_config: String },
    Rtsp { camera: &'a Camera },
    Onvif { camera: &'a Camera },
    Http { camera: &'a Camera },
}

impl<'a> CameraProtocol<'a> {
    pub fn from_camera(camera: &'a Camera) -> Self {
        match camera.protocol {
            falcon_eye_types::camera::Protocol::Usb => CameraProtocol::Usb {
                camera,
                motion_config: render_motion_config(camera),
            },
            falcon_eye_types::camera::Protocol::Rtsp => CameraProtocol::Rtsp { camera },
            falcon_eye_types::camera::Protocol::Onvif => CameraProtocol::Onvif { camera },
            falcon_eye_types::camera::Protocol::Http => CameraProtocol::Http { camera },
        }
    }

    pub fn resource_spec(&self) -> &'static ResourceSpec {
        match self {
            CameraProtocol::Http { .. } => &resources::HTTP,
            _ => &resources::USB_RTSP_ONVIF,
        }
    }

    pub fn container_name(&self) -> &'static str {
        match self {
            CameraProtocol::Usb { .. } => "capture",
            CameraProtocol::Rtsp { .. } => "rtsp-relay",
            CameraProtocol::Onvif { .. } => "onvif-relay",
            CameraProtocol::Http { .. } => "http-relay",
        }
    }

    /// Renders the container list for this protocol. USB gets exactly one
    /// privileged container with a hostPath device mount; network
    /// protocols get one relay container and no control port.
    pub fn render(&self) -> Vec<Container> {
        let resource_spec = self.resource_spec();
        let resources = resource_requirements(resource_spec);
        match self {
            CameraProtocol::Usb { camera, motion_config } => {
                vec![Container {
                    name: self.container_name().to_string(),
                    image: Some("falcon-eye/usb-capture:latest".to_string()),
                    security_context: Some(k8s_openapi::api::core::v1::SecurityContext {
                        privileged: Some(true),
                        ..Default::default()
                    }),
                    env: Some(vec![env("MOTION_CONFIG", motion_config.clone())]),
                    volume_mounts: Some(vec![k8s_openapi::api::core::v1::VolumeMount {
                        name: "device".to_string(),
                        mount_path: camera.device_path.clone().unwrap_or_default(),
                        ..Default::default()
                    }]),
                    ports: Some(vec![
                        ContainerPort { container_port: resources_stream_port(), ..Default::default() },
                        ContainerPort { container_port: resources_control_port(), ..Default::default() },
                    ]),
                    resources: Some(resources),
                    ..Default::default()
                }]
            }
            CameraProtocol::Rtsp { camera } | CameraProtocol::Onvif { camera } | CameraProtocol::Http { camera } => {
                vec![Container {
                    name: self.container_name().to_string(),
                    image: Some("falcon-eye/network-relay:latest".to_string()),
                    env: Some(relay_env(camera)),
                    ports: Some(vec![ContainerPort {
                        container_port: resources_stream_port(),
                        ..Default::default()
                    }]),
                    resources: Some(resources),
                    ..Default::default()
                }]
            }
        }
    }
}

fn resources_stream_port() -> i32 {
    resources::STREAM_PORT
}

fn resources_control_port() -> i32 {
    resources::CONTROL_PORT
}

fn relay_env(camera: &Camera) -> Vec<EnvVar> {
    vec![
        env("RTSP_URL", camera.source_url.clone().unwrap_or_default()),
        env("WIDTH", camera.resolution.width.to_string()),
        env("HEIGHT", camera.resolution.height.to_string()),
        env("FPS", camera.framerate.to_string()),
        env("CAMERA_LABEL", camera.name.clone()),
    ]
}

pub fn env(name: &str, value: String) -> EnvVar {
    EnvVar { name: name.to_string(), value: Some(value), ..Default::default() }
}

pub fn resource_requirements(spec: &ResourceSpec) -> ResourceRequirements {
    let mut requests = BTreeMap::new();
    requests.insert("cpu".to_string(), Quantity(spec.request_cpu.to_string()));
    requests.insert("memory".to_string(), Quantity(spec.request_memory.to_string()));
    let mut limits = BTreeMap::new();
    limits.insert("cpu".to_string(), Quantity(spec.limit_cpu.to_string()));
    limits.insert("memory".to_string(), Quantity(spec.limit_memory.to_string()));
    ResourceRequirements { requests: Some(requests), limits: Some(limits), ..Default::default() }
}

/// Runtime-generated text configuration for the Motion-style capture
/// binary: device path, resolution, fps, ports, overlay text, JPEG quality.
fn render_motion_config(camera: &Camera) -> String {
    let Resolution { width, height } = camera.resolution;
    let overlay = format!("FALCON-EYE-{}", camera.name.to_uppercase());
    format!(
        "videodevice {device}\nwidth {width}\nheight {height}\nframerate {fps}\nstream_port {stream_port}\nwebcontrol_port {control_port}\ntext_left {overlay}\nquality 70\n",
        device = camera.device_path.clone().unwrap_or_default(),
        width = width,
        height = height,
        fps = camera.framerate,
        stream_port = resources::STREAM_PORT,
        control_port = resources::CONTROL_PORT,
        overlay = overlay,
    )
}
