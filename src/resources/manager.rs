use crate::error::{EngineError, Result};
use crate::resources::loader::{parse_sprite, AssetLoader, LoadContext, SpriteLoader};
use crate::resources::sprite::Sprite;
use crate::subsystem::Subsystem;
use ahash::AHashMap;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Default maximum number of loaded sprites
pub const MAX_SPRITES: usize = 1000;

/// Label → sprite registry.
///
/// Cloning yields another handle onto the same registry, so the game and the
/// world can share it.
#[derive(Clone)]
pub struct ResourceManager {
    sprites: Arc<RwLock<AHashMap<String, Arc<Sprite>>>>,
    base_path: PathBuf,
    max_sprites: usize,
    loader: Arc<SpriteLoader>,
    started: Arc<AtomicBool>,
}

impl ResourceManager {
    /// Create new resource manager resolving relative paths against `base_path`
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self::with_limit(base_path, MAX_SPRITES)
    }

    pub fn with_limit<P: Into<PathBuf>>(base_path: P, max_sprites: usize) -> Self {
        Self {
            sprites: Arc::new(RwLock::new(AHashMap::new())),
            base_path: base_path.into(),
            max_sprites,
            loader: Arc::new(SpriteLoader),
            started: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Load a sprite file and register it under `label`
    pub fn load_sprite(&self, path: impl AsRef<Path>, label: &str) -> Result<Arc<Sprite>> {
        let path = path.as_ref();
        let full_path = self.base_path.join(path);
        let bytes = std::fs::read(&full_path).map_err(|e| {
            EngineError::AssetLoadError(format!("could not read {}: {e}", full_path.display()))
        })?;
        let mut sprite = self.loader.load(LoadContext {
            path,
            bytes: &bytes,
        })?;
        sprite.set_label(label);
        self.register(sprite)
    }

    /// Parse sprite text directly, registering it under `label`
    pub fn load_sprite_from_str(&self, text: &str, label: &str) -> Result<Arc<Sprite>> {
        self.register(parse_sprite(text, label)?)
    }

    /// Register an already built sprite under its own label
    pub fn register(&self, sprite: Sprite) -> Result<Arc<Sprite>> {
        let mut sprites = self.sprites.write();
        if sprites.contains_key(sprite.label()) {
            return Err(EngineError::AssetLoadError(format!(
                "label already loaded: {}",
                sprite.label()
            )));
        }
        if sprites.len() >= self.max_sprites {
            return Err(EngineError::SpriteLimit {
                limit: self.max_sprites,
            });
        }
        let label = sprite.label().to_string();
        let sprite = Arc::new(sprite);
        sprites.insert(label.clone(), sprite.clone());
        debug!(label = %label, frames = sprite.frame_count(), "sprite loaded");
        Ok(sprite)
    }

    pub fn get_sprite(&self, label: &str) -> Result<Arc<Sprite>> {
        self.sprites
            .read()
            .get(label)
            .cloned()
            .ok_or_else(|| EngineError::AssetNotFound(label.to_string()))
    }

    /// Forget a sprite; animations already holding it keep their copy
    pub fn unload_sprite(&self, label: &str) -> Result<()> {
        self.sprites
            .write()
            .remove(label)
            .map(|_| ())
            .ok_or_else(|| EngineError::AssetNotFound(label.to_string()))
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.read().len()
    }

    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.sprites.read().keys().cloned().collect();
        labels.sort();
        labels
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Subsystem for ResourceManager {
    fn name(&self) -> &'static str {
        "ResourceManager"
    }

    fn start_up(&mut self) -> Result<()> {
        self.started.store(true, Ordering::Release);
        info!(base = %self.base_path.display(), "resource manager started");
        Ok(())
    }

    fn shut_down(&mut self) {
        self.sprites.write().clear();
        self.started.store(false, Ordering::Release);
        info!("resource manager shut down");
    }

    fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new(".")
    }
}
