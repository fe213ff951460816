//! In-progress registration state and its keyed in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::profile::{Gender, UserId};
use crate::registration::step::Step;

/// Transient registration data for one identity.
///
/// Exists only while a registration is in progress. The fields populated
/// are exactly those belonging to steps already passed; `hour` and
/// `minute` are set together or not at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub identity: UserId,
    pub step: Step,
    pub gender: Option<Gender>,
    pub hour: Option<u8>,
    pub minute: Option<u8>,
    pub display_name: Option<String>,
}

impl ConversationState {
    /// Fresh state at the first question.
    pub fn new(identity: UserId, display_name: Option<String>) -> Self {
        Self {
            identity,
            step: Step::AwaitingGender,
            gender: None,
            hour: None,
            minute: None,
            display_name,
        }
    }
}

/// One user's slot in the store. The mutex is the per-identity
/// serialization point: the engine holds it across a whole
/// read-validate-write, so concurrent inputs for the same user queue up
/// while different users proceed in parallel.
pub type StateSlot = Arc<Mutex<Option<ConversationState>>>;

/// In-memory store mapping identity → in-progress state.
///
/// The outer lock guards only the map itself and is held just long enough
/// to fetch or insert a slot — never across an await on user work, so it
/// is not a cross-user serialization point. Slots are kept after a
/// conversation ends (holding `None`) so the per-identity mutex stays
/// stable for the identity's lifetime.
#[derive(Default)]
pub struct StateStore {
    slots: RwLock<HashMap<UserId, StateSlot>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the slot for `identity`, creating an empty one if absent.
    pub async fn slot(&self, identity: UserId) -> StateSlot {
        if let Some(slot) = self.slots.read().await.get(&identity) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(identity).or_default())
    }

    /// Fetch the slot for `identity` only if one already exists.
    ///
    /// Read paths use this so that identities which never started a
    /// conversation do not accumulate slots in the map.
    pub async fn existing_slot(&self, identity: UserId) -> Option<StateSlot> {
        self.slots.read().await.get(&identity).map(Arc::clone)
    }

    /// Snapshot the current state for `identity`, if any.
    pub async fn get(&self, identity: UserId) -> Option<ConversationState> {
        let slot = self.existing_slot(identity).await?;
        let guard = slot.lock().await;
        guard.clone()
    }

    /// Store (create or replace) the state for its identity.
    pub async fn upsert(&self, state: ConversationState) {
        let slot = self.slot(state.identity).await;
        let mut guard = slot.lock().await;
        *guard = Some(state);
    }

    /// Clear the state for `identity`.
    pub async fn remove(&self, identity: UserId) {
        if let Some(slot) = self.existing_slot(identity).await {
            let mut guard = slot.lock().await;
            *guard = None;
        }
    }
}
