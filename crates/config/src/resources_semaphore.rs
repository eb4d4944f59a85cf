//! Semaphore helpers for bounding concurrent installs/transfers
//!
//! This module provides consistent error handling for the permit pools
//! the Controller uses to cap, e.g., how many installations or plugin
//! transfers run at once across all hosts.

use fleet_errors::Error;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Acquire a semaphore permit, waiting if none are available.
///
/// # Errors
/// Returns an error if the semaphore has been closed.
pub async fn acquire_semaphore_permit(
    semaphore: Arc<Semaphore>,
    operation: &str,
) -> Result<OwnedSemaphorePermit, Error> {
    semaphore
        .acquire_owned()
        .await
        .map_err(|_| Error::internal(format!("failed to acquire semaphore for {operation}")))
}

/// Try to acquire a permit without waiting.
///
/// Returns `Ok(None)` if the pool is currently exhausted rather than
/// blocking the caller.
///
/// # Errors
/// Returns an error if the semaphore has been closed.
pub fn try_acquire_semaphore_permit(
    semaphore: &Arc<Semaphore>,
) -> Result<Option<OwnedSemaphorePermit>, Error> {
    match semaphore.clone().try_acquire_owned() {
        Ok(permit) => Ok(Some(permit)),
        Err(tokio::sync::TryAcquireError::NoPermits) => Ok(None),
        Err(tokio::sync::TryAcquireError::Closed) => {
            Err(Error::internal("semaphore is closed"))
        }
    }
}

#[must_use]
pub fn create_semaphore(permits: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(permits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_blocks_beyond_capacity_but_try_acquire_does_not() {
        let sem = create_semaphore(1);
        let _permit = acquire_semaphore_permit(Arc::clone(&sem), "test").await.unwrap();
        assert!(try_acquire_semaphore_permit(&sem).unwrap().is_none());
    }
}
