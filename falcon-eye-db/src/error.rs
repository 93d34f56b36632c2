use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database pool error: {source}")]
    Pool {
        #[from]
        source: deadpool_postgres::PoolError,
    },

    #[error("database error: {source}")]
    Postgres {
        #[from]
        source: tokio_postgres::Error,
    },
}

impl Error {
    /// Maps a unique-constraint violation (`23505`) to `Conflict`; every
    /// other Postgres error passes through unchanged.
    pub fn from_postgres(err: tokio_postgres::Error) -> Error {
        if let Some(db_err) = err.as_db_error()
            && db_err.code().code() == "23505"
        {
            return Error::Conflict(db_err.message().to_string());
        }
        Error::Postgres { source: err }
    }
}
