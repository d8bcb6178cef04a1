use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::error::DispatchError;

/// Counting admission gate bounding the number of probes in flight.
///
/// Waiters are admitted in FIFO order. A slot is returned when the
/// [`Admission`] guard is dropped, which covers every exit path of a probe
/// task including a panic.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// A held slot of a [`ConcurrencyLimiter`]. Dropping it releases the slot.
#[derive(Debug)]
pub struct Admission {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyLimiter {
    pub fn new(capacity: usize) -> Result<Self, DispatchError> {
        if capacity == 0 {
            return Err(DispatchError::InvalidArgument(
                "concurrency limit must be at least 1".to_string(),
            ));
        }
        if capacity > Semaphore::MAX_PERMITS {
            return Err(DispatchError::InvalidArgument(format!(
                "concurrency limit {capacity} exceeds {}",
                Semaphore::MAX_PERMITS
            )));
        }

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Waits until fewer than `capacity` admissions are outstanding.
    pub async fn acquire(&self) -> Result<Admission, DispatchError> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| DispatchError::Scheduling("admission gate was closed".to_string()))?;
        Ok(Admission { _permit: permit })
    }

    /// Number of slots currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
