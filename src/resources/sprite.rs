//! Sprite assets: immutable, multi-frame character art.

use crate::display::Canvas;
use crate::geometry::Vector;
use crate::resources::color::ColorPair;
use serde::Serialize;

/// One frame: `height` rows of exactly `width` characters
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Frame {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl Frame {
    /// Build a frame from its rows; `None` if any row is not `width` wide
    pub fn from_rows<S: AsRef<str>>(width: usize, rows: &[S]) -> Option<Self> {
        let mut cells = Vec::with_capacity(width * rows.len());
        for row in rows {
            let before = cells.len();
            cells.extend(row.as_ref().chars());
            if cells.len() - before != width {
                return None;
            }
        }
        Some(Self {
            width,
            height: rows.len(),
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        if x >= self.width {
            return None;
        }
        self.cells.get(y * self.width + x).copied()
    }

    /// Draw centred on `position`; cells equal to `transparent` are skipped.
    ///
    /// The centre cell is at integer offset `(width / 2, height / 2)`.
    pub fn draw(
        &self,
        position: Vector,
        color: ColorPair,
        transparent: Option<char>,
        canvas: &mut Canvas<'_>,
    ) {
        let origin = position - Vector::new((self.width / 2) as f32, (self.height / 2) as f32);
        for (index, &ch) in self.cells.iter().enumerate() {
            if Some(ch) == transparent {
                continue;
            }
            let offset = Vector::new((index % self.width) as f32, (index / self.width) as f32);
            canvas.draw_character(origin + offset, ch, color);
        }
    }

    /// Like [`Frame::draw`] but in view coordinates
    pub fn draw_in_view(&self, position: Vector, color: ColorPair, canvas: &mut Canvas<'_>) {
        let origin = position - Vector::new((self.width / 2) as f32, (self.height / 2) as f32);
        for (index, &ch) in self.cells.iter().enumerate() {
            let offset = Vector::new((index % self.width) as f32, (index / self.width) as f32);
            canvas.draw_in_view(origin + offset, ch, color);
        }
    }
}

/// Immutable sprite shared between animations
#[derive(Clone, Debug, Serialize)]
pub struct Sprite {
    label: String,
    width: usize,
    height: usize,
    frames: Vec<Frame>,
    color: ColorPair,
    slowdown: u32,
    transparent: Option<char>,
}

impl Sprite {
    pub fn new(
        label: impl Into<String>,
        width: usize,
        height: usize,
        frames: Vec<Frame>,
        color: ColorPair,
        slowdown: u32,
    ) -> Self {
        Self {
            label: label.into(),
            width,
            height,
            frames,
            color,
            slowdown,
            transparent: None,
        }
    }

    pub fn with_transparency(mut self, transparent: char) -> Self {
        self.transparent = Some(transparent);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn color(&self) -> ColorPair {
        self.color
    }

    /// Display calls per frame advance
    pub fn slowdown(&self) -> u32 {
        self.slowdown
    }

    pub fn transparent(&self) -> Option<char> {
        self.transparent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{MemoryDisplay, RenderBackend};
    use crate::geometry::BoundingBox;

    #[test]
    fn test_frame_rows_checked() {
        assert!(Frame::from_rows(3, &["abc", "def"]).is_some());
        assert!(Frame::from_rows(3, &["abc", "de"]).is_none());
        let frame = Frame::from_rows(2, &["ab", "cd"]).unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.char_at(1, 1), Some('d'));
        assert_eq!(frame.char_at(2, 0), None);
    }

    #[test]
    fn test_frame_draw_centred_with_transparency() {
        let frame = Frame::from_rows(3, &["/.\\"]).unwrap();
        let mut display = MemoryDisplay::new(6, 1);
        {
            let mut canvas = Canvas::new(&mut display, BoundingBox::new(Vector::ZERO, 6.0, 1.0));
            frame.draw(Vector::new(3.0, 0.0), ColorPair::default(), Some('.'), &mut canvas);
        }
        display.render().unwrap();
        assert_eq!(display.screen().row(0), "  / \\ ");
    }
}
