pub mod download;
pub mod error;
pub mod stream;

pub use download::download_recording;
pub use error::Error;
pub use stream::stream_proxy;
