pub mod client;
pub mod error;
pub mod node_registry;

pub use client::{ClusterClient, PodSummary};
pub use error::Error;
pub use node_registry::{NodeInfo, NodeRegistry};
