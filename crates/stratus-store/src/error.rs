//! Object-store error types.

/// Result type for object-store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during object-store operations.
#[derive(Debug, thiserror::Error)]
#[must_use = "errors should be handled appropriately"]
pub enum StoreError {
    /// Invalid store configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Bucket or object not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bucket already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The service refused the operation.
    ///
    /// This is also the error produced by the fault injector to exercise
    /// failure-counting paths.
    #[error("service unavailable: {message} (status: {status_code})")]
    ServiceUnavailable {
        /// HTTP-style status code reported by the service.
        status_code: u16,
        /// Error message from the service.
        message: String,
    },

    /// I/O operation failed.
    ///
    /// This covers local filesystem failures during upload/download staging.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying storage backend error.
    #[error("backend error: {0}")]
    Backend(opendal::Error),
}

impl StoreError {
    /// Creates a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new not found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Creates a new already exists error.
    pub fn already_exists(what: impl Into<String>) -> Self {
        Self::AlreadyExists(what.into())
    }

    /// Creates a new service unavailable error.
    pub fn service_unavailable(status_code: u16, message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            status_code,
            message: message.into(),
        }
    }

    /// Returns whether this error indicates a missing bucket or object.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns whether this error indicates an unavailable service.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { .. })
    }
}

impl From<opendal::Error> for StoreError {
    fn from(err: opendal::Error) -> Self {
        use opendal::ErrorKind;

        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            ErrorKind::AlreadyExists => Self::AlreadyExists(err.to_string()),
            _ => Self::Backend(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_unavailable_carries_status() {
        let error = StoreError::service_unavailable(503, "Service Unavailable");

        assert!(error.is_unavailable());
        assert!(error.to_string().contains("503"));
        assert!(error.to_string().contains("Service Unavailable"));
    }

    #[test]
    fn not_found_classification() {
        assert!(StoreError::not_found("bucket missing").is_not_found());
        assert!(!StoreError::config("bad endpoint").is_not_found());
    }
}
