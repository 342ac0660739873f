//! Engine events.
//!
//! Events are transient values: they are built, dispatched and dropped within
//! the same call. Every event has an [`EventKind`] used as the subscription key,
//! and every kind is owned by exactly one [`BusId`].

use crate::builtin::input::KeyCode;
use crate::entity::EntityId;
use crate::geometry::Vector;
use serde::Serialize;
use std::fmt;

/// Event payloads delivered to behaviours
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// `mover` tried to move to `position` and overlapped `other` there
    Collision {
        mover: EntityId,
        other: EntityId,
        position: Vector,
    },
    /// Sent once per frame to every subscriber
    Step { count: u64 },
    /// A key was read from the input backend
    Keyboard { key: KeyCode },
    /// The receiver's box left the camera view
    Out,
    /// Update a HUD value; `delta` adds instead of replacing
    ViewUpdate {
        tag: String,
        value: i64,
        delta: bool,
    },
    /// Game-defined event
    Custom { name: &'static str, value: i64 },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Collision { .. } => EventKind::Collision,
            Event::Step { .. } => EventKind::Step,
            Event::Keyboard { .. } => EventKind::Keyboard,
            Event::Out => EventKind::Out,
            Event::ViewUpdate { .. } => EventKind::ViewUpdate,
            Event::Custom { name, .. } => EventKind::Custom(name),
        }
    }
}

/// Subscription key of an [`Event`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EventKind {
    Collision,
    Step,
    Keyboard,
    Out,
    ViewUpdate,
    Custom(&'static str),
}

impl EventKind {
    /// Bus that owns subscriptions of this kind
    pub fn route(self) -> BusId {
        match self {
            EventKind::Step => BusId::Game,
            EventKind::Keyboard => BusId::Input,
            _ => BusId::World,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Collision => write!(f, "collision"),
            EventKind::Step => write!(f, "step"),
            EventKind::Keyboard => write!(f, "keyboard"),
            EventKind::Out => write!(f, "out"),
            EventKind::ViewUpdate => write!(f, "view"),
            EventKind::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// Identifies one of the three event buses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum BusId {
    Game,
    Input,
    World,
}

impl BusId {
    pub const ALL: [BusId; 3] = [BusId::Game, BusId::Input, BusId::World];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Event::Step { count: 3 }.kind(), EventKind::Step);
        assert_eq!(Event::Out.kind(), EventKind::Out);
        assert_eq!(
            Event::Custom {
                name: "nuke",
                value: 1
            }
            .kind(),
            EventKind::Custom("nuke")
        );
    }

    #[test]
    fn test_routing() {
        assert_eq!(EventKind::Step.route(), BusId::Game);
        assert_eq!(EventKind::Keyboard.route(), BusId::Input);
        assert_eq!(EventKind::Collision.route(), BusId::World);
        assert_eq!(EventKind::ViewUpdate.route(), BusId::World);
        assert_eq!(EventKind::Custom("nuke").route(), BusId::World);
    }
}
