//! HTTP plumbing
//!
//! - [`client`]: reqwest wrapper with timeouts and request logging
//! - [`transport`]: the GET/POST seam the API layer talks to

pub mod client;
pub mod transport;

pub use client::{HttpClient, HttpClientBuilder};
pub use transport::{HttpTransport, ReqwestTransport, TransportError};
