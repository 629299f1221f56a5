//! Per-parent mutual exclusion for propagation runs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::models::{EntityId, TierTransition};

type LockKey = (TierTransition, EntityId);

/// At most one holder per (transition, parent id) at a time.
///
/// Holders of different keys never wait on each other. Entries nobody holds
/// or waits on are pruned whenever a lock is acquired.
#[derive(Debug, Default)]
pub struct ParentLocks {
    locks: Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>,
}

impl ParentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until the parent is free and take it. Released when the guard drops.
    pub async fn acquire(&self, transition: TierTransition, parent_id: EntityId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry((transition, parent_id)).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of keys currently tracked.
    pub fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
