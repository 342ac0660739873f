use crate::display::Canvas;
use crate::entity::{EntityId, WorldObject};
use crate::error::Result;
use crate::event::{Event, EventKind};
use crate::world::WorldManager;
use smallvec::SmallVec;

/// Game-specific logic attached to a world object.
///
/// Handlers receive the world mutably and may move, spawn, mark for deletion
/// or dispatch further events. Events addressed to an object whose handler
/// is still running are queued and handed to it right after that handler
/// returns.
pub trait Behavior {
    /// Name for debugging
    fn name(&self) -> &str {
        "Behavior"
    }

    /// Event kinds to subscribe to when spawned
    fn interests(&self) -> &[EventKind] {
        &[]
    }

    /// Handle an event; `Ok(false)` means ignored
    fn handle(&mut self, _world: &mut WorldManager, _me: EntityId, _event: &Event) -> Result<bool> {
        Ok(false)
    }

    /// Render the object; the default draws its animation
    fn draw(&mut self, object: &mut WorldObject, canvas: &mut Canvas<'_>) -> Result<bool> {
        let position = object.position;
        Ok(object.animation.draw(position, canvas))
    }

    /// False to draw even when the object's box is outside the camera view
    fn cull_to_view(&self) -> bool {
        true
    }

    /// Called once when the object is removed from the world
    fn on_destroy(&mut self, _world: &mut WorldManager, _me: EntityId) {}
}

/// Behaviour that ignores every event
#[derive(Clone, Copy, Debug, Default)]
pub struct Inert;

impl Behavior for Inert {
    fn name(&self) -> &str {
        "Inert"
    }
}

type Handler = Box<dyn FnMut(&mut WorldManager, EntityId, &Event) -> Result<bool>>;

/// Closure-based behaviour
pub struct FnBehavior {
    name: String,
    interests: SmallVec<[EventKind; 4]>,
    handler: Handler,
}

impl FnBehavior {
    pub fn new<F>(handler: F) -> Self
    where
        F: FnMut(&mut WorldManager, EntityId, &Event) -> Result<bool> + 'static,
    {
        Self {
            name: "FnBehavior".to_string(),
            interests: SmallVec::new(),
            handler: Box::new(handler),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Subscribe to `kind` on spawn
    pub fn with_interest(mut self, kind: EventKind) -> Self {
        if !self.interests.contains(&kind) {
            self.interests.push(kind);
        }
        self
    }
}

impl Behavior for FnBehavior {
    fn name(&self) -> &str {
        &self.name
    }

    fn interests(&self) -> &[EventKind] {
        &self.interests
    }

    fn handle(&mut self, world: &mut WorldManager, me: EntityId, event: &Event) -> Result<bool> {
        (self.handler)(world, me, event)
    }
}

impl std::fmt::Debug for FnBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnBehavior")
            .field("name", &self.name)
            .field("interests", &self.interests)
            .finish()
    }
}
