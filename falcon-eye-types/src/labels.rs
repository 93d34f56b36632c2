//! Label keys carried by every managed workload. Per the spec these are the
//! sole authority for workload <-> entity ownership; persistence is never
//! consulted to answer "does this Deployment belong to anything".

pub const APP: &str = "app";
pub const APP_VALUE: &str = "falcon-eye";
pub const COMPONENT: &str = "component";
pub const CAMERA_ID: &str = "camera-id";
pub const RECORDER_FOR: &str = "recorder-for";
pub const AGENT_ID: &str = "agent-id";
pub const CRON_ID: &str = "cron-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Camera,
    Recorder,
    Agent,
    CronRunner,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Camera => "camera",
            Component::Recorder => "recorder",
            Component::Agent => "agent",
            Component::CronRunner => "cron-runner",
        }
    }
}

/// Builds the base label set every managed workload carries, plus the one
/// owner-id label appropriate to `component`.
pub fn base_labels(component: Component, owner_id: &str) -> std::collections::BTreeMap<String, String> {
    let mut labels = std::collections::BTreeMap::new();
    labels.insert(APP.to_string(), APP_VALUE.to_string());
    labels.insert(COMPONENT.to_string(), component.as_str().to_string());
    let owner_key = match component {
        Component::Camera => CAMERA_ID,
        Component::Recorder => RECORDER_FOR,
        Component::Agent => AGENT_ID,
        Component::CronRunner => CRON_ID,
    };
    labels.insert(owner_key.to_string(), owner_id.to_string());
    labels
}

pub fn selector(key: &str, value: &str) -> String {
    format!("{key}={value}")
}
