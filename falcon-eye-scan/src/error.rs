use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("ssh error: {0}")]
    Ssh(#[from] russh::Error),

    #[error("ssh key error: {0}")]
    Key(#[from] russh_keys::Error),

    #[error("unknown node {0}")]
    UnknownNode(String),

    #[error("authentication failed for {0}")]
    AuthFailed(String),
}
