//! Convenient re-exports of commonly used types.
//!
//! The prelude can be imported with:
//! ```
//! use glyph_engine::prelude::*;
//! ```

pub use crate::behavior::{Behavior, FnBehavior, Inert};
pub use crate::builtin::{
    ChannelInput, InputBackend, KeyCode, Location, ScriptedInput, ViewObject,
};
pub use crate::config::EngineConfig;
pub use crate::debug::{Diagnostics, WorldInspector, WorldSnapshot};
pub use crate::display::{Canvas, MemoryDisplay, RenderBackend, TerminalDisplay};
pub use crate::entity::{EntityId, ObjectBuilder, Solidness, WorldObject};
pub use crate::error::{EngineError, Result};
pub use crate::event::{Event, EventKind};
pub use crate::game::GameManager;
pub use crate::geometry::{BoundingBox, Vector};
pub use crate::resources::{Animation, Color, ColorPair, Frame, ResourceManager, Sprite};
pub use crate::subsystem::Subsystem;
pub use crate::world::WorldManager;
