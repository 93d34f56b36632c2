use thiserror::Error;

/// Tagged cluster-client error. `falcon-eye-core` maps `NotFound` on delete
/// to success and `Conflict` on create to a single replace attempt; anything
/// else is a retryable `ClusterError` the caller stores on the entity row.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("kubernetes reported error: {source}")]
    Kube {
        #[from]
        source: kube::Error,
    },

    #[error("unknown node {0}")]
    UnknownNode(String),

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl Error {
    pub fn from_kube(err: kube::Error) -> Error {
        match &err {
            kube::Error::Api(resp) if resp.code == 404 => Error::NotFound,
            kube::Error::Api(resp) if resp.code == 409 => Error::Conflict(resp.message.clone()),
            _ => Error::Kube { source: err },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }
}
