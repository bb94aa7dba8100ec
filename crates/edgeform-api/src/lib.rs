// edgeform-api: Async HTTP client for the edge controller REST API

pub mod auth;
pub mod client;
pub mod error;
pub mod transport;

pub use auth::{Session, is_authenticated};
pub use client::ControllerClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
