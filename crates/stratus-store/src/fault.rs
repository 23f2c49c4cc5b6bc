//! Deterministic fault injection.
//!
//! [`FaultInjector`] is an operation that always fails with a simulated
//! service error. It exists to exercise the failure-counting path of the
//! measured-operation wrapper without depending on a flaky backend.

use tracing::debug;

use crate::{StoreError, StoreResult, TRACING_TARGET_FAULT};

/// An operation that deterministically fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultInjector {
    status_code: u16,
}

impl FaultInjector {
    /// Creates an injector simulating a 503 Service Unavailable response.
    pub fn service_unavailable() -> Self {
        Self { status_code: 503 }
    }

    /// Returns the simulated error without running anything.
    pub fn error(&self) -> StoreError {
        StoreError::service_unavailable(self.status_code, "Service Unavailable")
    }

    /// Runs the injected fault. Never succeeds.
    pub async fn inject<T>(&self) -> StoreResult<T> {
        debug!(
            target: TRACING_TARGET_FAULT,
            status_code = self.status_code,
            "injecting simulated fault"
        );

        Err(self.error())
    }
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::service_unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inject_always_fails() {
        let injector = FaultInjector::service_unavailable();

        for _ in 0..5 {
            let result: StoreResult<()> = injector.inject().await;
            let error = result.unwrap_err();

            assert!(error.is_unavailable());
            assert!(matches!(
                error,
                StoreError::ServiceUnavailable { status_code: 503, .. }
            ));
        }
    }

    #[test]
    fn error_message_names_the_fault() {
        let error = FaultInjector::default().error();
        assert_eq!(
            error.to_string(),
            "service unavailable: Service Unavailable (status: 503)"
        );
    }
}
