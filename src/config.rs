//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```
//! use glyph_engine::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "frame": { "target_ms": 20 } }"#).unwrap();
//! assert_eq!(config.frame.target_ms, 20);
//! assert_eq!(config.display.width, 100);
//! ```

use crate::error::{EngineError, Result};
use crate::geometry::{BoundingBox, Vector};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub display: DisplayConfig,
    pub world: WorldConfig,
    pub events: EventConfig,
    pub resources: ResourceConfig,
    pub frame: FrameConfig,
    pub log: LogConfig,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            EngineError::ConfigError(format!("could not read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.display.width == 0 || self.display.height == 0 {
            return Err(EngineError::ConfigError(
                "display must be at least 1x1".to_string(),
            ));
        }
        if self.frame.target_ms == 0 {
            return Err(EngineError::ConfigError(
                "frame.target_ms must be positive".to_string(),
            ));
        }
        let [sx, sy] = self.world.view_slack;
        if !(0.0..=1.0).contains(&sx) || !(0.0..=1.0).contains(&sy) {
            return Err(EngineError::ConfigError(format!(
                "world.view_slack must be within [0, 1], got [{sx}, {sy}]"
            )));
        }
        if let Some([w, h]) = self.world.boundary {
            if w <= 0.0 || h <= 0.0 {
                return Err(EngineError::ConfigError(
                    "world.boundary must be positive".to_string(),
                ));
            }
        }
        if self.world.list_capacity == 0 || self.events.max_kinds == 0 {
            return Err(EngineError::ConfigError(
                "capacities must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// World extent; the display size unless configured
    pub fn boundary(&self) -> BoundingBox {
        let [w, h] = self
            .world
            .boundary
            .unwrap_or([self.display.width as f32, self.display.height as f32]);
        BoundingBox::new(Vector::ZERO, w, h)
    }

    /// Initial camera: the display size at the world origin
    pub fn view(&self) -> BoundingBox {
        BoundingBox::new(
            Vector::ZERO,
            self.display.width as f32,
            self.display.height as f32,
        )
    }
}

/// Character grid size
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: crate::display::DEFAULT_WIDTH,
            height: crate::display::DEFAULT_HEIGHT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World extent `[width, height]`; defaults to the display size
    pub boundary: Option<[f32; 2]>,
    /// Camera dead-zone as a fraction of the view on each axis
    pub view_slack: [f32; 2],
    /// Capacity of every object list
    pub list_capacity: usize,
    /// Event kinds a single object may subscribe to
    pub max_interests: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            boundary: None,
            view_slack: [0.0, 0.0],
            list_capacity: crate::object_list::OBJECT_LIST_MAX,
            max_interests: crate::world::MAX_INTERESTS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Distinct event kinds per bus
    pub max_kinds: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            max_kinds: crate::event_bus::MAX_EVENT_KINDS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub max_sprites: usize,
    /// Relative sprite paths resolve against this directory
    pub asset_dir: PathBuf,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            max_sprites: crate::resources::manager::MAX_SPRITES,
            asset_dir: PathBuf::from("."),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub target_ms: u64,
    pub min_sleep_ms: u64,
}

impl FrameConfig {
    pub fn target(&self) -> Duration {
        Duration::from_millis(self.target_ms)
    }

    pub fn min_sleep(&self) -> Duration {
        Duration::from_millis(self.min_sleep_ms)
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            target_ms: 40,
            min_sleep_ms: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Write logs here instead of stderr
    pub file: Option<PathBuf>,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!((config.display.width, config.display.height), (100, 30));
        assert_eq!(config.frame.target(), Duration::from_millis(40));
        assert_eq!(config.world.list_capacity, 5000);
        assert_eq!(config.world.max_interests, 100);
        assert_eq!(config.events.max_kinds, 100);
        assert_eq!(config.resources.max_sprites, 1000);
        assert_eq!(config.boundary(), BoundingBox::new(Vector::ZERO, 100.0, 30.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json_str(
            r#"{ "world": { "boundary": [200, 60], "view_slack": [0.5, 0.5] },
                 "log": { "level": "debug", "file": "game.log" } }"#,
        )
        .unwrap();
        assert_eq!(config.boundary().horizontal, 200.0);
        assert_eq!(config.world.view_slack, [0.5, 0.5]);
        assert_eq!(config.log.file, Some(PathBuf::from("game.log")));
        assert_eq!(config.frame.target_ms, 40);
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(EngineConfig::from_json_str(r#"{ "display": { "width": 0 } }"#).is_err());
        assert!(EngineConfig::from_json_str(r#"{ "frame": { "target_ms": 0 } }"#).is_err());
        assert!(EngineConfig::from_json_str(r#"{ "world": { "view_slack": [2, 0] } }"#).is_err());
        assert!(matches!(
            EngineConfig::from_json_str("not json"),
            Err(EngineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = EngineConfig::default();
        let text = config.to_json_string().unwrap();
        assert_eq!(EngineConfig::from_json_str(&text).unwrap(), config);
    }
}
