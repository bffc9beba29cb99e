//! Live, ordered claim list
//!
//! The claims table shows every claim newest first and updates whenever a
//! claim is recorded or reviewed. [`ClaimFeed`] keeps the latest snapshot in a
//! `watch` channel; writers call [`ClaimFeed::refresh`] after a successful
//! write and every subscriber sees the new list.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use core_kernel::PortError;
use crate::claim::ClaimRecord;
use crate::ports::{ClaimQuery, ClaimStore};

/// Ordered, continuously updated view over a [`ClaimStore`]
#[derive(Clone)]
pub struct ClaimFeed {
    store: Arc<dyn ClaimStore>,
    sender: Arc<watch::Sender<Arc<Vec<ClaimRecord>>>>,
}

impl ClaimFeed {
    /// Creates a feed with an empty snapshot; call [`refresh`](Self::refresh) to load
    pub fn new(store: Arc<dyn ClaimStore>) -> Self {
        let (sender, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            store,
            sender: Arc::new(sender),
        }
    }

    /// Reloads every claim from the store and publishes the list
    pub async fn refresh(&self) -> Result<(), PortError> {
        let claims = self.store.list(ClaimQuery::all()).await?;
        debug!(count = claims.len(), "claim feed refreshed");
        self.sender.send_replace(Arc::new(claims));
        Ok(())
    }

    /// Receiver that always holds the latest list
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<ClaimRecord>>> {
        self.sender.subscribe()
    }

    /// Current list without waiting for a change
    pub fn snapshot(&self) -> Arc<Vec<ClaimRecord>> {
        self.sender.borrow().clone()
    }
}

impl std::fmt::Debug for ClaimFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimFeed")
            .field("claims", &self.sender.borrow().len())
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}
