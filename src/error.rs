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

//! Error types

use crate::entity::EntityId;
use std::fmt;

/// Engine error type
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Entity not known to the world
    EntityNotFound(EntityId),

    /// Entity already present in an object list
    DuplicateEntity(EntityId),

    /// Entity not present in an object list
    NotInList(EntityId),

    /// Object list reached its capacity
    ListFull { capacity: usize },

    /// Altitude outside `0..MAX_ALTITUDE`
    InvalidAltitude(i32),

    /// Unknown solidness tag
    InvalidSolidness(String),

    /// Unknown colour name
    InvalidColor(String),

    /// Unknown view location tag
    InvalidLocation(String),

    /// A bus refused a new event kind
    EventKindLimit { limit: usize },

    /// Sprite could not be parsed or read
    AssetLoadError(String),

    /// Sprite label not registered
    AssetNotFound(String),

    /// Resource manager is full
    SpriteLimit { limit: usize },

    /// A subsystem failed to start
    SubsystemStartup(String),

    /// Subsystem used before `start_up`
    NotStarted(&'static str),

    /// Invalid configuration
    ConfigError(String),

    /// Behaviour reported a failure while handling an event
    HandlerError(String),

    /// IO error (file operations, terminal output, etc.)
    IoError(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::EntityNotFound(id) => write!(f, "Entity not found: {id}"),
            EngineError::DuplicateEntity(id) => write!(f, "Entity already in list: {id}"),
            EngineError::NotInList(id) => write!(f, "Entity not in list: {id}"),
            EngineError::ListFull { capacity } => {
                write!(f, "Object list full (capacity {capacity})")
            }
            EngineError::InvalidAltitude(altitude) => {
                write!(f, "Invalid altitude {altitude}, expected 0..{}", crate::entity::MAX_ALTITUDE)
            }
            EngineError::InvalidSolidness(tag) => write!(f, "Invalid solidness: {tag}"),
            EngineError::InvalidColor(name) => write!(f, "Invalid color: {name}"),
            EngineError::InvalidLocation(tag) => write!(f, "Invalid view location: {tag}"),
            EngineError::EventKindLimit { limit } => {
                write!(f, "Event kind limit reached ({limit} kinds)")
            }
            EngineError::AssetLoadError(msg) => write!(f, "Asset load error: {msg}"),
            EngineError::AssetNotFound(label) => write!(f, "Asset not found: {label}"),
            EngineError::SpriteLimit { limit } => write!(f, "Sprite limit reached ({limit})"),
            EngineError::SubsystemStartup(msg) => write!(f, "Subsystem startup failed: {msg}"),
            EngineError::NotStarted(name) => write!(f, "{name} has not been started"),
            EngineError::ConfigError(msg) => write!(f, "Config error: {msg}"),
            EngineError::HandlerError(msg) => write!(f, "Handler error: {msg}"),
            EngineError::IoError(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::ConfigError(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EngineError>;
