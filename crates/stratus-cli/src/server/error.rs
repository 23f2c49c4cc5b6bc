//! Metrics endpoint error types.

use std::io;

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Errors that can occur while binding or running the metrics endpoint.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured port is already bound by another process.
    ///
    /// Fatal at startup; there is no retry.
    #[error("metrics endpoint port already in use at {address}: {source}")]
    PortInUse {
        /// Address the bind was attempted on.
        address: String,
        #[source]
        source: io::Error,
    },

    /// Failed to bind for a reason other than a taken port.
    #[error("failed to bind metrics endpoint at {address}: {source}")]
    Bind {
        /// Address the bind was attempted on.
        address: String,
        #[source]
        source: io::Error,
    },

    /// Runtime server error.
    #[error("metrics endpoint runtime error: {0}")]
    Runtime(#[source] io::Error),
}

impl ServerError {
    /// Provides a human-readable suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::PortInUse { .. } => {
                Some("the port is already in use; pick another with --port or stop the conflicting service")
            }
            Self::Bind { source, .. } => match source.kind() {
                io::ErrorKind::PermissionDenied => {
                    Some("use a port above 1024 or run with appropriate privileges")
                }
                _ => Some("check network configuration and firewall settings"),
            },
            Self::Runtime(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_in_use_names_the_address() {
        let error = ServerError::PortInUse {
            address: "127.0.0.1:8000".to_string(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        };

        assert!(error.to_string().contains("127.0.0.1:8000"));
        assert!(error.suggestion().is_some());
    }
}
