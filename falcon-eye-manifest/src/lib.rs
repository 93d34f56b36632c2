pub mod agent;
pub mod cameras;
pub mod cron;
pub mod protocol;
pub mod recorder;
pub mod resources;

pub use agent::{render_agent_deployment, render_agent_service};
pub use cameras::{render_camera_deployment, render_camera_service, stream_url};
pub use cron::{render_cron_job, render_task_job};
pub use recorder::{render_recorder_deployment, render_recorder_service};
