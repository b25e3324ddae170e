//! Retry helper for operations that lose optimistic-concurrency races.
//!
//! Conflict errors (`ConcurrentVersionConflict`, `ConcurrentUpdateConflict`)
//! mean a racing writer got there first and the operation should re-read
//! state and try again. Every other error exits immediately.

use std::fmt::Display;
use std::future::Future;

use crate::domain::foundation::DomainError;
use crate::domain::version::VersionError;
use crate::domain::workflow::WorkflowError;

/// Default attempt budget for conflict retries.
pub const MAX_CONFLICT_ATTEMPTS: u32 = 3;

/// Errors that can signal a retryable concurrency conflict.
pub trait ConflictError {
    fn is_conflict(&self) -> bool;
}

impl ConflictError for DomainError {
    fn is_conflict(&self) -> bool {
        self.code.is_conflict()
    }
}

impl ConflictError for VersionError {
    fn is_conflict(&self) -> bool {
        self.code().is_conflict()
    }
}

impl ConflictError for WorkflowError {
    fn is_conflict(&self) -> bool {
        self.code().is_conflict()
    }
}

/// Runs `op` until it succeeds, fails with a non-conflict error, or the
/// attempt budget is exhausted. The operation must re-read any state it
/// depends on at the start of each attempt.
pub async fn with_conflict_retry<T, E, F, Fut>(max_attempts: u32, mut op: F) -> Result<T, E>
where
    E: ConflictError + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_conflict() && attempt < max_attempts => {
                tracing::warn!(
                    error = %err,
                    attempt,
                    max_attempts,
                    "retrying after concurrency conflict"
                );
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn conflict() -> DomainError {
        DomainError::new(ErrorCode::ConcurrentVersionConflict, "lost the race")
    }

    #[tokio::test]
    async fn returns_first_success() {
        let calls = AtomicU32::new(0);
        let result = with_conflict_retry(3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, DomainError>(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_conflicts_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = with_conflict_retry(3, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(conflict())
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_budget_and_surfaces_conflict() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_conflict_retry(3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(conflict()) }
        })
        .await;

        assert_eq!(result.unwrap_err().code, ErrorCode::ConcurrentVersionConflict);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_conflict_errors_exit_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_conflict_retry(3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(DomainError::new(
                    ErrorCode::RequestTerminal,
                    "request is settled",
                ))
            }
        })
        .await;

        assert_eq!(result.unwrap_err().code, ErrorCode::RequestTerminal);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn workflow_conflicts_are_retryable() {
        let calls = AtomicU32::new(0);
        let result = with_conflict_retry(2, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(WorkflowError::conflict("revision moved"))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
