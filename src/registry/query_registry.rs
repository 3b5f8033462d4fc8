//! # Query Registry
//!
//! Process-wide directory of in-flight load attempts, keyed by load id.
//!
//! ## Key Features
//!
//! - **One live handle per load id**: a second registration under a live id is rejected
//! - **Scoped registration**: [`RegistrationGuard`] unregisters on every exit path
//! - **Observer access**: status lookups and cancellation for external callers
//! - **Lock-free reads** through a sharded map
//!
//! The registry is created once per server process and handed to every load
//! task as an `Arc<QueryRegistry>`; tests build an isolated instance.

use crate::coordinator::Coordinator;
use crate::error::{LoadTaskError, LoadTaskResult};
use crate::logging::log_registry_operation;
use crate::types::LoadId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub active: usize,
    pub registered_total: u64,
    pub unregistered_total: u64,
}

#[derive(Debug, Default)]
pub struct QueryRegistry {
    queries: DashMap<LoadId, Arc<dyn Coordinator>>,
    registered_total: AtomicU64,
    unregistered_total: AtomicU64,
}

impl QueryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queries: DashMap::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn register(&self, load_id: LoadId, handle: Arc<dyn Coordinator>) -> LoadTaskResult<()> {
        match self.queries.entry(load_id) {
            Entry::Occupied(_) => {
                error!(load_id = %load_id, "Load id already registered");
                Err(LoadTaskError::Registry {
                    operation: "register".to_string(),
                    reason: format!("load id {load_id} already has a live coordinator"),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(handle);
                self.registered_total.fetch_add(1, Ordering::Relaxed);
                log_registry_operation("register", &load_id, "registered");
                Ok(())
            }
        }
    }

    /// Register and return a guard that unregisters when dropped
    pub fn register_scoped(
        self: &Arc<Self>,
        load_id: LoadId,
        handle: Arc<dyn Coordinator>,
    ) -> LoadTaskResult<RegistrationGuard> {
        self.register(load_id, handle)?;
        Ok(RegistrationGuard {
            registry: Arc::clone(self),
            load_id,
        })
    }

    /// Remove the handle for `load_id`; unknown ids are a no-op
    pub fn unregister(&self, load_id: &LoadId) -> Option<Arc<dyn Coordinator>> {
        let removed = self.queries.remove(load_id).map(|(_, handle)| handle);
        if removed.is_some() {
            self.unregistered_total.fetch_add(1, Ordering::Relaxed);
            log_registry_operation("unregister", load_id, "unregistered");
        }
        removed
    }

    pub fn get(&self, load_id: &LoadId) -> Option<Arc<dyn Coordinator>> {
        self.queries.get(load_id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, load_id: &LoadId) -> bool {
        self.queries.contains_key(load_id)
    }

    /// Cancel the live attempt for `load_id`. Returns false when nothing is registered.
    pub fn cancel(&self, load_id: &LoadId, reason: &str) -> bool {
        // Clone out of the map so the shard lock is not held across the call
        match self.get(load_id) {
            Some(handle) => {
                handle.cancel(reason);
                log_registry_operation("cancel", load_id, "cancelled");
                true
            }
            None => false,
        }
    }

    pub fn active_load_ids(&self) -> Vec<LoadId> {
        self.queries.iter().map(|entry| *entry.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            active: self.queries.len(),
            registered_total: self.registered_total.load(Ordering::Relaxed),
            unregistered_total: self.unregistered_total.load(Ordering::Relaxed),
        }
    }
}

/// Live registration of one attempt; dropping it unregisters the load id
#[derive(Debug)]
pub struct RegistrationGuard {
    registry: Arc<QueryRegistry>,
    load_id: LoadId,
}

impl RegistrationGuard {
    pub fn load_id(&self) -> LoadId {
        self.load_id
    }
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        self.registry.unregister(&self.load_id);
    }
}
