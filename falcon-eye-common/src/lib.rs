use std::net::IpAddr;

use axum::http::HeaderMap;

pub mod args;
pub mod auth;
pub mod cors;
pub mod metrics;
pub mod postgres;
mod request_context;
pub mod response;
pub mod shutdown;
pub mod tracing_setup;
pub mod wait;

pub use request_context::*;

/// Namespace every Falcon-Eye managed workload lives in.
pub const NAMESPACE: &str = "falcon-eye";

/// Label carried by every managed workload, identifying its manager.
pub const APP_LABEL: &str = "falcon-eye";

pub fn get_source_ip(headers: &HeaderMap) -> Option<IpAddr> {
    if let Some(forwarded_for) = headers.get("x-forwarded-for")
        && let Ok(forwarded_for) = forwarded_for.to_str()
        && let Some(ip_str) = forwarded_for.split(',').next()
        && let Ok(ip) = ip_str.trim().parse()
    {
        return Some(ip);
    }

    if let Some(real_ip) = headers.get("x-real-ip")
        && let Ok(ip_str) = real_ip.to_str()
        && let Ok(ip) = ip_str.trim().parse()
    {
        return Some(ip);
    }

    None
}

pub mod access_log {
    use super::get_source_ip;

    pub async fn request(
        req: axum::extract::Request,
        next: axum::middleware::Next,
    ) -> axum::response::Response {
        let ip = get_source_ip(req.headers())
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".into());
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let start = std::time::Instant::now();
        let response = next.run(req).await;
        let duration = start.elapsed();
        let status = response.status();
        if status.is_success() {
            tracing::info!(%method, %path, %status, ?duration, client_ip = %ip, "request");
        } else {
            tracing::warn!(%method, %path, %status, ?duration, client_ip = %ip, "request");
        }
        response
    }
}
