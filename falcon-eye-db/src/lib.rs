pub mod agents;
pub mod cameras;
pub mod chat;
pub mod cron;
pub mod error;
pub mod recordings;
pub mod schema;

pub use error::Error;
pub use schema::init_schema;
