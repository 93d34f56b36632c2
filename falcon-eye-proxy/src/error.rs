use thiserror::Error;

/// Maps directly onto the Stream & RPC Proxy's error table (§4.8): no
/// Service → 503, connection refused → 502, unknown entity → 404.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no service available for this camera")]
    NoService,

    #[error("upstream connection refused")]
    UpstreamUnavailable,

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Cluster(#[from] falcon_eye_cluster::Error),

    #[error(transparent)]
    Db(#[from] falcon_eye_db::Error),
}

impl Error {
    pub fn status(&self) -> http::StatusCode {
        match self {
            Error::NoService => http::StatusCode::SERVICE_UNAVAILABLE,
            Error::UpstreamUnavailable => http::StatusCode::BAD_GATEWAY,
            Error::NotFound => http::StatusCode::NOT_FOUND,
            Error::Db(falcon_eye_db::Error::NotFound) => http::StatusCode::NOT_FOUND,
            Error::Cluster(falcon_eye_cluster::Error::NotFound) => http::StatusCode::SERVICE_UNAVAILABLE,
            _ => http::StatusCode::BAD_GATEWAY,
        }
    }
}
