//! Per-user concurrency control.
//!
//! Each user id maps to a semaphore sized by the configured concurrent-turn
//! allowance (normally 1). A second request from the same user waits for the
//! running turn to finish; different users never contend.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use tw_domain::{Error, Result};

/// Manages per-user run permits.
pub struct UserLockMap {
    permits_per_user: usize,
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl UserLockMap {
    pub fn new(permits_per_user: usize) -> Self {
        Self {
            permits_per_user: permits_per_user.max(1),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the run permit for a user, waiting behind any running turn.
    /// The permit releases on drop.
    pub async fn acquire(&self, user_id: &str) -> Result<OwnedSemaphorePermit> {
        let sem = {
            let mut locks = self.locks.lock();
            locks
                .entry(user_id.to_owned())
                .or_insert_with(|| Arc::new(Semaphore::new(self.permits_per_user)))
                .clone()
        };

        sem.acquire_owned()
            .await
            .map_err(|_| Error::Internal(format!("run lock for {user_id} was closed")))
    }

    /// Number of tracked users.
    pub fn user_count(&self) -> usize {
        self.locks.lock().len()
    }

    /// Drop locks no turn currently holds.
    pub fn prune_idle(&self) {
        let permits = self.permits_per_user;
        self.locks
            .lock()
            .retain(|_, sem| sem.available_permits() < permits);
    }
}
