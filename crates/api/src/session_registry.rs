use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use claimdesk_core::labeling::LabelSession;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Slot holding an annotator's in-flight label session, if any.
pub type SessionSlot = Arc<Mutex<Option<LabelSession>>>;

/// In-memory registry of in-flight label sessions, one slot per annotator.
///
/// Holding a slot's lock serializes every request for that annotator, so a
/// decision is applied, persisted and committed without interleaving. The
/// registry is not persisted; after a restart an annotator resumes from the
/// records on disk and loses at most the pending claim decision.
///
/// Only annotators with a pending decision or a request in flight keep a
/// slot; idle slots are dropped when their last guard is released.
pub struct SessionRegistry {
    slots: StdMutex<HashMap<String, SessionSlot>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            slots: StdMutex::new(HashMap::new()),
        }
    }

    /// Lock the annotator's slot, creating it on first use.
    pub async fn acquire(&self, annotator_id: &str) -> SessionGuard<'_> {
        let slot = self
            .slots()
            .entry(annotator_id.to_string())
            .or_default()
            .clone();
        SessionGuard {
            registry: self,
            annotator_id: annotator_id.to_string(),
            guard: Some(slot.lock_owned().await),
        }
    }

    /// Number of annotators with an in-flight label session.
    ///
    /// A slot locked by a running request counts as active.
    pub fn active_count(&self) -> usize {
        self.slots()
            .values()
            .filter(|slot| slot.try_lock().map_or(true, |label| label.is_some()))
            .count()
    }

    /// Number of slots currently held in memory.
    pub fn slot_count(&self) -> usize {
        self.slots().len()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, SessionSlot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop the annotator's slot if it is idle and nobody else holds it.
    fn prune(&self, annotator_id: &str) {
        let mut slots = self.slots();
        // The map's own reference is the only one left: no guard is held and
        // no request is waiting for the lock.
        let idle = slots.get(annotator_id).is_some_and(|slot| {
            Arc::strong_count(slot) == 1 && slot.try_lock().is_ok_and(|label| label.is_none())
        });
        if idle {
            slots.remove(annotator_id);
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive access to one annotator's slot.
pub struct SessionGuard<'a> {
    registry: &'a SessionRegistry,
    annotator_id: String,
    guard: Option<OwnedMutexGuard<Option<LabelSession>>>,
}

impl Deref for SessionGuard<'_> {
    type Target = Option<LabelSession>;

    fn deref(&self) -> &Self::Target {
        match self.guard.as_deref() {
            Some(label) => label,
            None => unreachable!("session guard is only released on drop"),
        }
    }
}

impl DerefMut for SessionGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self.guard.as_deref_mut() {
            Some(label) => label,
            None => unreachable!("session guard is only released on drop"),
        }
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.registry.prune(&self.annotator_id);
    }
}
