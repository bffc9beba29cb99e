//! One submission per owner at a time

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use core_kernel::OwnerId;

/// Owners with a submission currently running
#[derive(Debug, Clone, Default)]
pub struct InFlightSubmissions {
    owners: Arc<Mutex<HashSet<OwnerId>>>,
}

impl InFlightSubmissions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `owner` busy, or returns `None` if a submission is already running
    ///
    /// The mark is cleared when the guard drops, including when the request
    /// future is cancelled.
    pub fn acquire(&self, owner: &OwnerId) -> Option<InFlightGuard> {
        let mut owners = self.owners.lock().unwrap_or_else(PoisonError::into_inner);
        if !owners.insert(owner.clone()) {
            return None;
        }
        Some(InFlightGuard {
            owners: Arc::clone(&self.owners),
            owner: owner.clone(),
        })
    }

    pub fn is_busy(&self, owner: &OwnerId) -> bool {
        self.owners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(owner)
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    owners: Arc<Mutex<HashSet<OwnerId>>>,
    owner: OwnerId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.owners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.owner);
    }
}
