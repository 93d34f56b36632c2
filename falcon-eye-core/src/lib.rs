pub mod agents;
pub mod cameras;
pub mod chat;
pub mod cron;
pub mod engine;
pub mod error;
pub mod locks;
pub mod reconcile;
pub mod recording;
pub mod settings;
pub mod sweeper;
pub mod tools;

pub use engine::{Engine, EngineConfig};
pub use error::Error;
