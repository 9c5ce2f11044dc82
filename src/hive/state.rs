//! Shared hive state: registries, factories, and stop machinery.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

// Layer 2: Third-party crate imports
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Notify;

// Layer 3: Internal module imports
use super::errors::HiveError;
use super::handle::HiveHandle;
use crate::actor::DynActor;
use crate::util::{ActorId, HiveId};

/// The reserved local ID under which every hive registers itself.
pub const HIVE_LOCAL_ID: &str = "hive";

/// Factory for actors creatable by name through the `create_actor`
/// directive.
pub(crate) type ActorFactory =
    Box<dyn Fn(&HiveHandle, &Value) -> Result<ActorId, HiveError> + Send + Sync>;

/// State shared between the dispatch loop and every [`HiveHandle`].
///
/// The dispatch loop is the only place actors execute, but handles may
/// register, remove, and look up actors from other tasks, so the registry
/// sits behind a mutex. The lock is never held while a handler runs: the
/// loop takes the target actor out, delivers, and puts it back.
pub(crate) struct HiveInner {
    pub(crate) hive_id: HiveId,
    pub(crate) actors: Mutex<HashMap<String, Box<dyn DynActor>>>,
    /// Remote hive ID to the local actor relaying messages for it.
    pub(crate) ambassadors: DashMap<String, ActorId>,
    /// Actor type name to factory, for remote `create_actor` requests.
    pub(crate) factories: DashMap<String, ActorFactory>,
    /// Local ID of the actor currently handling a message, if any.
    active: Mutex<Option<String>>,
    /// Set when the active actor removed itself during handling.
    active_removed: AtomicBool,
    should_stop: AtomicBool,
    pub(crate) stop_signal: Notify,
}

impl HiveInner {
    pub(crate) fn new(hive_id: HiveId) -> Self {
        Self {
            hive_id,
            actors: Mutex::new(HashMap::new()),
            ambassadors: DashMap::new(),
            factories: DashMap::new(),
            active: Mutex::new(None),
            active_removed: AtomicBool::new(false),
            should_stop: AtomicBool::new(false),
            stop_signal: Notify::new(),
        }
    }

    /// Flag the dispatch loop to stop and wake it if it is parked.
    pub(crate) fn request_stop(&self) {
        self.should_stop.store(true, Ordering::SeqCst);
        self.stop_signal.notify_waiters();
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.should_stop.load(Ordering::SeqCst)
    }

    /// Register an actor, refusing collisions with existing actors, the
    /// reserved hive ID, and the actor currently being delivered to.
    pub(crate) fn insert_actor(
        &self,
        local_id: String,
        actor: Box<dyn DynActor>,
    ) -> Result<(), HiveError> {
        if local_id == HIVE_LOCAL_ID {
            return Err(HiveError::ReservedLocalId);
        }
        if self.active.lock().as_deref() == Some(local_id.as_str()) {
            return Err(HiveError::DuplicateActor(local_id));
        }

        let mut actors = self.actors.lock();
        if actors.contains_key(&local_id) {
            return Err(HiveError::DuplicateActor(local_id));
        }
        actors.insert(local_id, actor);
        Ok(())
    }

    /// Remove an actor by ID. Removing the actor that is currently handling
    /// a message marks it for discard instead of re-insertion.
    pub(crate) fn remove_actor(&self, id: &ActorId) -> Result<(), HiveError> {
        let local = id.local_part();
        if self.active.lock().as_deref() == Some(local) {
            self.active_removed.store(true, Ordering::SeqCst);
            return Ok(());
        }
        if self.actors.lock().remove(local).is_none() {
            return Err(HiveError::ActorNotFound(id.clone()));
        }
        Ok(())
    }

    /// Take an actor out of the registry for delivery.
    pub(crate) fn take_actor(&self, local_id: &str) -> Option<Box<dyn DynActor>> {
        self.actors.lock().remove(local_id)
    }

    /// Mark `local_id` as the actor currently being delivered to.
    pub(crate) fn begin_delivery(&self, local_id: &str) {
        *self.active.lock() = Some(local_id.to_owned());
        self.active_removed.store(false, Ordering::SeqCst);
    }

    /// Clear the delivery marker; returns whether the actor removed itself.
    pub(crate) fn finish_delivery(&self) -> bool {
        *self.active.lock() = None;
        self.active_removed.swap(false, Ordering::SeqCst)
    }

    /// Put a delivered-to actor back into the registry.
    pub(crate) fn restore_actor(&self, local_id: String, actor: Box<dyn DynActor>) {
        self.actors.lock().insert(local_id, actor);
    }
}
