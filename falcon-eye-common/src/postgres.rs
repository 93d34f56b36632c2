use deadpool_postgres::{Config as PgConfig, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

use crate::args::PostgresArgs;

/// Builds the connection pool used by every background task and request
/// handler. TLS/CA-cert plumbing was part of the teacher's variant of this
/// function; Falcon-Eye talks to an in-cluster Postgres only, so it is
/// dropped here (see DESIGN.md).
pub fn create_pool(pg_args: PostgresArgs) -> Pool {
    let mut cfg = PgConfig::new();
    cfg.dbname = Some(pg_args.postgres_database);
    cfg.host = Some(pg_args.postgres_host);
    cfg.port = Some(pg_args.postgres_port);
    cfg.user = Some(pg_args.postgres_username);
    cfg.password = pg_args.postgres_password;
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });
    cfg.create_pool(Some(deadpool_postgres::Runtime::Tokio1), NoTls)
        .expect("failed to create Postgres pool")
}
