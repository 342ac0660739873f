// Sprite resources
//
// Provides:
// - Named terminal colours
// - Multi-frame sprites and their text file format
// - Per-object animation cursors
// - The label → sprite registry

pub mod animation;
pub mod color;
pub mod loader;
pub mod manager;
pub mod sprite;

pub use animation::Animation;
pub use color::{Color, ColorPair};
pub use loader::{AssetLoader, LoadContext, SpriteLoader};
pub use manager::ResourceManager;
pub use sprite::{Frame, Sprite};
