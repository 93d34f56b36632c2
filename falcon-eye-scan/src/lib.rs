pub mod cache;
pub mod error;
pub mod ssh;
pub mod tcp;
pub mod types;

pub use cache::ScanCache;
pub use error::Error;
pub use ssh::list_usb_devices;
pub use tcp::list_network;
pub use types::{NetworkCandidate, SshCredentials, UsbDevice};
