pub mod agents;
pub mod cameras;
pub mod chat;
pub mod cron;
pub mod nodes;
pub mod recordings;
pub mod settings;
pub mod tools;

pub async fn health() -> &'static str {
    "ok"
}
