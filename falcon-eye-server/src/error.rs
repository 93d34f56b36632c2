//! Sole translator from component error kinds to HTTP status codes (§7).

use axum::response::{IntoResponse, Response};
use falcon_eye_common::response;

pub struct ApiError(pub falcon_eye_core::Error);

impl From<falcon_eye_core::Error> for ApiError {
    fn from(e: falcon_eye_core::Error) -> Self {
        ApiError(e)
    }
}

impl From<falcon_eye_db::Error> for ApiError {
    fn from(e: falcon_eye_db::Error) -> Self {
        ApiError(e.into())
    }
}

impl From<falcon_eye_cluster::Error> for ApiError {
    fn from(e: falcon_eye_cluster::Error) -> Self {
        ApiError(falcon_eye_core::Error::Cluster(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use falcon_eye_core::Error::*;
        match self.0 {
            e @ Validation(_) => response::bad_request(e),
            e @ Conflict(_) => response::conflict(e),
            e @ NotFound => response::not_found(e),
            e @ AlreadyDeleting => response::bad_request(e),
            e @ Cluster(_) => response::bad_gateway(e),
            e @ Transient(_) => response::service_unavailable(e),
            e @ Fatal(_) => response::internal_server_error(e),
        }
    }
}

pub struct ProxyApiError(pub falcon_eye_proxy::Error);

impl From<falcon_eye_proxy::Error> for ProxyApiError {
    fn from(e: falcon_eye_proxy::Error) -> Self {
        ProxyApiError(e)
    }
}

impl IntoResponse for ProxyApiError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        response::err_resp(self.0, status)
    }
}

pub enum ScanApiError {
    Scan(falcon_eye_scan::Error),
    Cluster(falcon_eye_cluster::Error),
}

impl From<falcon_eye_scan::Error> for ScanApiError {
    fn from(e: falcon_eye_scan::Error) -> Self {
        ScanApiError::Scan(e)
    }
}

impl From<falcon_eye_cluster::Error> for ScanApiError {
    fn from(e: falcon_eye_cluster::Error) -> Self {
        ScanApiError::Cluster(e)
    }
}

impl IntoResponse for ScanApiError {
    fn into_response(self) -> Response {
        match self {
            ScanApiError::Scan(e) => response::bad_gateway(e),
            ScanApiError::Cluster(e) => response::bad_gateway(e),
        }
    }
}
