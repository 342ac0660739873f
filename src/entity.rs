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

//! Entity identifiers and world objects.
//!
//! A [`WorldObject`] is plain data owned by the world's arena. The attributes
//! that decide scene-graph membership (active, solidness, altitude, visible)
//! are read-only here; change them through the `WorldManager` setters so the
//! buckets stay in sync.

use crate::error::{EngineError, Result};
use crate::event::EventKind;
use crate::geometry::{BoundingBox, Vector};
use crate::resources::animation::Animation;
use crate::utils::next_id;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Number of altitude layers; valid altitudes are `0..MAX_ALTITUDE`
pub const MAX_ALTITUDE: i32 = 5;

/// Altitude given to new objects
pub const DEFAULT_ALTITUDE: i32 = 3;

/// Process-unique, monotonically increasing entity identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Allocate the next identifier
    pub fn next() -> Self {
        EntityId(next_id())
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How an object takes part in collisions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Solidness {
    /// Blocks other hard movers
    #[default]
    Hard,
    /// Collides but never blocks, unless the mover refuses soft objects
    Soft,
    /// Never collides
    Spectral,
}

impl Solidness {
    pub fn is_solid(self) -> bool {
        self != Solidness::Spectral
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Solidness::Hard => "hard",
            Solidness::Soft => "soft",
            Solidness::Spectral => "spectral",
        }
    }
}

impl FromStr for Solidness {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hard" => Ok(Solidness::Hard),
            "soft" => Ok(Solidness::Soft),
            "spectral" => Ok(Solidness::Spectral),
            _ => Err(EngineError::InvalidSolidness(s.to_string())),
        }
    }
}

impl fmt::Display for Solidness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reject altitudes outside `0..MAX_ALTITUDE`
pub fn validate_altitude(altitude: i32) -> Result<i32> {
    if (0..MAX_ALTITUDE).contains(&altitude) {
        Ok(altitude)
    } else {
        Err(EngineError::InvalidAltitude(altitude))
    }
}

/// A simulated thing in the world
#[derive(Clone, Debug)]
pub struct WorldObject {
    id: EntityId,
    type_name: String,
    pub position: Vector,
    direction: Vector,
    speed: f32,
    /// Extents of the object; the corner is ignored, boxes are centred on `position`
    pub extent: BoundingBox,
    pub no_soft: bool,
    pub animation: Animation,
    pub(crate) altitude: i32,
    pub(crate) solidness: Solidness,
    pub(crate) active: bool,
    pub(crate) visible: bool,
    pub(crate) interests: SmallVec<[EventKind; 4]>,
}

impl WorldObject {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn set_type_name(&mut self, type_name: impl Into<String>) {
        self.type_name = type_name.into();
    }

    pub fn altitude(&self) -> i32 {
        self.altitude
    }

    pub fn solidness(&self) -> Solidness {
        self.solidness
    }

    pub fn is_solid(&self) -> bool {
        self.solidness.is_solid()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Event kinds this object is subscribed to, in registration order
    pub fn interests(&self) -> &[EventKind] {
        &self.interests
    }

    pub fn direction(&self) -> Vector {
        self.direction
    }

    /// Set heading; the vector is normalised
    pub fn set_direction(&mut self, direction: Vector) {
        self.direction = direction.normalize_or_zero();
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Velocity is direction scaled by speed
    pub fn velocity(&self) -> Vector {
        self.direction * self.speed
    }

    /// Split a velocity into a unit direction and a speed
    pub fn set_velocity(&mut self, velocity: Vector) {
        self.speed = velocity.length();
        self.direction = velocity.normalize_or_zero();
    }

    /// Position after one step at the current velocity
    pub fn predict_position(&self) -> Vector {
        self.position + self.velocity()
    }

    /// Box occupied in world coordinates
    pub fn world_box(&self) -> BoundingBox {
        self.extent.centered_at(self.position)
    }

    /// Box the object would occupy if it stood at `position`
    pub fn world_box_at(&self, position: Vector) -> BoundingBox {
        self.extent.centered_at(position)
    }
}

/// Builder for new world objects
///
/// Nothing is validated until the builder is handed to `WorldManager::spawn`.
#[derive(Clone, Debug)]
pub struct ObjectBuilder {
    pub(crate) type_name: String,
    pub(crate) position: Vector,
    pub(crate) velocity: Vector,
    pub(crate) extent: BoundingBox,
    pub(crate) altitude: i32,
    pub(crate) solidness: Solidness,
    pub(crate) no_soft: bool,
    pub(crate) active: bool,
    pub(crate) visible: bool,
    pub(crate) sprite: Option<String>,
}

impl ObjectBuilder {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            position: Vector::ZERO,
            velocity: Vector::ZERO,
            extent: BoundingBox::default(),
            altitude: DEFAULT_ALTITUDE,
            solidness: Solidness::Hard,
            no_soft: false,
            active: true,
            visible: true,
            sprite: None,
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Vector::new(x, y);
        self
    }

    pub fn position(mut self, position: Vector) -> Self {
        self.position = position;
        self
    }

    pub fn velocity(mut self, velocity: Vector) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn extent(mut self, horizontal: f32, vertical: f32) -> Self {
        self.extent = BoundingBox::with_extent(horizontal, vertical);
        self
    }

    pub fn altitude(mut self, altitude: i32) -> Self {
        self.altitude = altitude;
        self
    }

    pub fn solidness(mut self, solidness: Solidness) -> Self {
        self.solidness = solidness;
        self
    }

    pub fn no_soft(mut self, no_soft: bool) -> Self {
        self.no_soft = no_soft;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Bind a sprite by label at spawn time; also sizes the box to the sprite
    pub fn sprite(mut self, label: impl Into<String>) -> Self {
        self.sprite = Some(label.into());
        self
    }

    /// Validate and allocate an id
    pub(crate) fn build(self) -> Result<WorldObject> {
        let altitude = validate_altitude(self.altitude)?;
        let mut object = WorldObject {
            id: EntityId::next(),
            type_name: self.type_name,
            position: self.position,
            direction: Vector::ZERO,
            speed: 0.0,
            extent: self.extent,
            no_soft: self.no_soft,
            animation: Animation::new(),
            altitude,
            solidness: self.solidness,
            active: self.active,
            visible: self.visible,
            interests: SmallVec::new(),
        };
        object.set_velocity(self.velocity);
        Ok(object)
    }
}
