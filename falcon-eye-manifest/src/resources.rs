//! Constant resource requests/limits per container kind (§4.3).

pub struct ResourceSpec {
    pub request_memory: &'static str,
    pub request_cpu: &'static str,
    pub limit_memory: &'static str,
    pub limit_cpu: &'static str,
}

pub const USB_RTSP_ONVIF: ResourceSpec = ResourceSpec {
    request_memory: "128Mi",
    request_cpu: "100m",
    limit_memory: "512Mi",
    limit_cpu: "500m",
};

pub const HTTP: ResourceSpec = ResourceSpec {
    request_memory: "64Mi",
    request_cpu: "50m",
    limit_memory: "256Mi",
    limit_cpu: "250m",
};

pub const STREAM_PORT: i32 = 8081;
pub const CONTROL_PORT: i32 = 8080;

pub const JETSON_TOLERATION_KEY: &str = "dedicated";
pub const JETSON_TOLERATION_VALUE: &str = "jetson";
