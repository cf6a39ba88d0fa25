pub mod client;
pub mod error;
pub mod socket;

pub use client::ApiClient;
pub use error::{SdkError, SdkResult};
pub use socket::{SocketConfig, SocketMessage, spawn_socket};
