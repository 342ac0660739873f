// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Glyph Engine - a character-cell 2D game kernel
//!
//! World objects with altitude layers, collision rules and camera follow,
//! three event buses, text sprites and a fixed-period game loop.

pub mod behavior;
pub mod builtin;
pub mod config;
pub mod debug;
pub mod display;
pub mod entity;
pub mod error;
pub mod event;
pub mod event_bus;
pub mod game;
pub mod geometry;
#[cfg(feature = "logging")]
pub mod logging;
pub mod object_list;
pub mod prelude;
pub mod resources;
pub mod scene_graph;
pub mod subsystem;
pub mod time;
pub mod utils;
pub mod world;

#[cfg(test)]
mod tests;

pub use behavior::{Behavior, FnBehavior, Inert};
pub use config::EngineConfig;
pub use display::{Canvas, MemoryDisplay, RenderBackend, TerminalDisplay};
pub use entity::{EntityId, ObjectBuilder, Solidness, WorldObject, MAX_ALTITUDE};
pub use error::*;
pub use event::{BusId, Event, EventKind};
pub use event_bus::{EventBus, EventRouter};
pub use game::{GameManager, GameOver};
pub use geometry::{BoundingBox, Vector};
pub use object_list::{ObjectList, ObjectListIter};
pub use scene_graph::SceneGraph;
pub use subsystem::Subsystem;
pub use world::WorldManager;
