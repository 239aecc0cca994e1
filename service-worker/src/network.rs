//! Network Capability
//!
//! The worker never talks to a socket itself. The host hands it a
//! [`Network`] that performs the real fetch.

use alloc::string::String;
use core::fmt;

use crate::fetch::{Request, Response};

/// Network error kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// No connectivity at all
    Offline,
    /// Host could not be reached
    Unreachable(String),
    /// Request timed out
    Timeout,
    /// Malformed or aborted exchange
    Protocol(String),
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::Offline => write!(f, "network offline"),
            NetworkError::Unreachable(host) => write!(f, "host unreachable: {}", host),
            NetworkError::Timeout => write!(f, "request timed out"),
            NetworkError::Protocol(msg) => write!(f, "protocol error: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for NetworkError {}

/// Host network fetch.
///
/// Any HTTP status is a successful fetch; only transport failures are
/// errors.
pub trait Network: Send + Sync {
    /// Perform the request
    fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}

impl<F> Network for F
where
    F: Fn(&Request) -> Result<Response, NetworkError> + Send + Sync,
{
    fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        self(request)
    }
}

/// A network with no connectivity.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineNetwork;

impl Network for OfflineNetwork {
    fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        log::debug!("[SW Net] Offline, dropping {}", request.url);
        Err(NetworkError::Offline)
    }
}
