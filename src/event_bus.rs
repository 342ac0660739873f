//! Subscription registries.
//!
//! An [`EventBus`] maps each [`EventKind`] to the ordered list of entities
//! subscribed to it. The engine keeps three buses (game, input, world) in an
//! [`EventRouter`]; each kind is owned by one of them. Delivery itself is done
//! by the world, which owns the behaviours.

use crate::entity::EntityId;
use crate::error::{EngineError, Result};
use crate::event::{BusId, EventKind};
use crate::object_list::{ObjectList, ObjectListIter, OBJECT_LIST_MAX};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// Default maximum number of distinct event kinds per bus
pub const MAX_EVENT_KINDS: usize = 100;

/// Event kind → subscriber registry for one subsystem
pub struct EventBus {
    id: BusId,
    subscribers: FxHashMap<EventKind, ObjectList>,
    max_kinds: usize,
    list_capacity: usize,
    processed_count: u64,
}

impl EventBus {
    /// Create new event bus
    pub fn new(id: BusId) -> Self {
        Self::with_limits(id, MAX_EVENT_KINDS, OBJECT_LIST_MAX)
    }

    pub fn with_limits(id: BusId, max_kinds: usize, list_capacity: usize) -> Self {
        Self {
            id,
            subscribers: FxHashMap::default(),
            max_kinds,
            list_capacity,
            processed_count: 0,
        }
    }

    pub fn id(&self) -> BusId {
        self.id
    }

    /// Subscribe `entity` to `kind`.
    ///
    /// Returns `Ok(false)` if the pair already existed. Refuses a kind the bus
    /// has not seen once `max_kinds` distinct kinds are registered.
    pub fn subscribe(&mut self, kind: EventKind, entity: EntityId) -> Result<bool> {
        if !self.subscribers.contains_key(&kind) && self.subscribers.len() >= self.max_kinds {
            return Err(EngineError::EventKindLimit {
                limit: self.max_kinds,
            });
        }
        let list = self
            .subscribers
            .entry(kind)
            .or_insert_with(|| ObjectList::with_capacity(self.list_capacity));
        match list.insert(entity) {
            Ok(()) => {
                debug!(bus = ?self.id, %kind, %entity, "subscribed");
                Ok(true)
            }
            Err(EngineError::DuplicateEntity(_)) => {
                warn!(bus = ?self.id, %kind, %entity, "already subscribed");
                Ok(false)
            }
            Err(e) => {
                if list.is_empty() {
                    self.subscribers.remove(&kind);
                }
                Err(e)
            }
        }
    }

    /// Remove `entity` from `kind`; returns false if it was not subscribed
    pub fn unsubscribe(&mut self, kind: EventKind, entity: EntityId) -> bool {
        let Some(list) = self.subscribers.get_mut(&kind) else {
            return false;
        };
        let removed = list.remove(entity).is_ok();
        if list.is_empty() {
            self.subscribers.remove(&kind);
        }
        removed
    }

    /// Drop `entity` from every kind on this bus
    pub fn unsubscribe_all(&mut self, entity: EntityId) -> usize {
        let kinds: Vec<EventKind> = self.subscribers.keys().copied().collect();
        kinds
            .into_iter()
            .filter(|&kind| self.unsubscribe(kind, entity))
            .count()
    }

    pub fn is_subscribed(&self, kind: EventKind, entity: EntityId) -> bool {
        self.subscribers
            .get(&kind)
            .is_some_and(|list| list.contains(entity))
    }

    pub fn subscribers(&self, kind: EventKind) -> Option<&ObjectList> {
        self.subscribers.get(&kind)
    }

    /// Snapshot of the current subscribers of `kind`
    pub fn snapshot(&self, kind: EventKind) -> Option<ObjectListIter> {
        self.subscribers.get(&kind).map(ObjectList::iter)
    }

    /// Get subscriber count for event kind
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, ObjectList::len)
    }

    /// Kinds with at least one subscriber, sorted
    pub fn kinds(&self) -> Vec<EventKind> {
        let mut kinds: Vec<EventKind> = self.subscribers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Number of distinct kinds with at least one subscriber
    pub fn kind_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Get total subscriber count
    pub fn total_subscribers(&self) -> usize {
        self.subscribers.values().map(ObjectList::len).sum()
    }

    pub(crate) fn record_processed(&mut self) {
        self.processed_count += 1;
    }

    /// Get total dispatched events
    pub fn processed_count(&self) -> u64 {
        self.processed_count
    }

    /// Remove all subscribers
    pub fn clear_subscribers(&mut self) {
        self.subscribers.clear();
    }
}

/// The game, input and world buses
pub struct EventRouter {
    game: EventBus,
    input: EventBus,
    world: EventBus,
}

impl EventRouter {
    pub fn new(max_kinds: usize, list_capacity: usize) -> Self {
        Self {
            game: EventBus::with_limits(BusId::Game, max_kinds, list_capacity),
            input: EventBus::with_limits(BusId::Input, max_kinds, list_capacity),
            world: EventBus::with_limits(BusId::World, max_kinds, list_capacity),
        }
    }

    pub fn bus(&self, id: BusId) -> &EventBus {
        match id {
            BusId::Game => &self.game,
            BusId::Input => &self.input,
            BusId::World => &self.world,
        }
    }

    pub fn bus_mut(&mut self, id: BusId) -> &mut EventBus {
        match id {
            BusId::Game => &mut self.game,
            BusId::Input => &mut self.input,
            BusId::World => &mut self.world,
        }
    }

    /// Bus owning `kind`
    pub fn owner(&self, kind: EventKind) -> &EventBus {
        self.bus(kind.route())
    }

    pub fn subscribe(&mut self, kind: EventKind, entity: EntityId) -> Result<bool> {
        self.bus_mut(kind.route()).subscribe(kind, entity)
    }

    pub fn unsubscribe(&mut self, kind: EventKind, entity: EntityId) -> bool {
        self.bus_mut(kind.route()).unsubscribe(kind, entity)
    }

    pub fn clear(&mut self) {
        for id in BusId::ALL {
            self.bus_mut(id).clear_subscribers();
        }
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new(MAX_EVENT_KINDS, OBJECT_LIST_MAX)
    }
}
