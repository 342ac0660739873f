//! Per-object playback cursor over a shared sprite.

use crate::display::Canvas;
use crate::geometry::Vector;
use crate::resources::sprite::Sprite;
use std::sync::Arc;

/// Counter value that stops the animation from advancing
pub const FROZEN: i32 = -1;

/// Frame index plus slowdown counter
#[derive(Clone, Debug, Default)]
pub struct Animation {
    sprite: Option<Arc<Sprite>>,
    index: usize,
    slowdown_count: i32,
}

impl Animation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sprite(sprite: Arc<Sprite>) -> Self {
        Self {
            sprite: Some(sprite),
            index: 0,
            slowdown_count: 0,
        }
    }

    pub fn sprite(&self) -> Option<&Arc<Sprite>> {
        self.sprite.as_ref()
    }

    /// Bind a sprite and restart from its first frame
    pub fn set_sprite(&mut self, sprite: Option<Arc<Sprite>>) {
        self.sprite = sprite;
        self.index = 0;
        if self.slowdown_count != FROZEN {
            self.slowdown_count = 0;
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Jump to a frame; wraps modulo the frame count
    pub fn set_index(&mut self, index: usize) {
        let frames = self.sprite.as_ref().map_or(0, |s| s.frame_count());
        self.index = if frames == 0 { 0 } else { index % frames };
    }

    pub fn slowdown_count(&self) -> i32 {
        self.slowdown_count
    }

    pub fn is_frozen(&self) -> bool {
        self.slowdown_count == FROZEN
    }

    pub fn freeze(&mut self) {
        self.slowdown_count = FROZEN;
    }

    pub fn unfreeze(&mut self) {
        if self.is_frozen() {
            self.slowdown_count = 0;
        }
    }

    /// Count one display call, moving to the next frame every `slowdown` calls
    pub fn advance(&mut self) {
        let Some(sprite) = &self.sprite else {
            return;
        };
        if self.is_frozen() || sprite.frame_count() == 0 {
            return;
        }
        self.slowdown_count += 1;
        if self.slowdown_count >= sprite.slowdown() as i32 {
            self.slowdown_count = 0;
            self.index = (self.index + 1) % sprite.frame_count();
        }
    }

    /// Draw the current frame centred on `position`, then advance.
    ///
    /// Returns false when there is nothing to draw.
    pub fn draw(&mut self, position: Vector, canvas: &mut Canvas<'_>) -> bool {
        let Some(sprite) = &self.sprite else {
            return false;
        };
        let Some(frame) = sprite.frame(self.index) else {
            return false;
        };
        frame.draw(position, sprite.color(), sprite.transparent(), canvas);
        self.advance();
        true
    }
}
