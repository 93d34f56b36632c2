use thiserror::Error;

use falcon_eye_types::ValidationError;

/// Tagged error kind per the error-handling design: callers translate this
/// into HTTP codes, background tasks log and continue.
#[derive(Debug, Error)]
pub enum Error {
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found")]
    NotFound,

    #[error("already deleting")]
    AlreadyDeleting,

    #[error("cluster error: {0}")]
    Cluster(#[from] falcon_eye_cluster::Error),

    #[error("transient: {0}")]
    Transient(String),

    #[error("fatal: {0}")]
    Fatal(String),
}

impl From<falcon_eye_db::Error> for Error {
    fn from(err: falcon_eye_db::Error) -> Self {
        match err {
            falcon_eye_db::Error::NotFound => Error::NotFound,
            falcon_eye_db::Error::Conflict(msg) => Error::Conflict(msg),
            other => Error::Transient(other.to_string()),
        }
    }
}

impl Error {
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::Conflict(_) => "conflict",
            Error::NotFound => "not_found",
            Error::AlreadyDeleting => "conflict",
            Error::Cluster(_) => "cluster_error",
            Error::Transient(_) => "transient",
            Error::Fatal(_) => "fatal",
        }
    }
}
