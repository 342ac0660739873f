//! Vector and axis-aligned box math.
//!
//! Positions are in character cells with y growing downward.

use serde::{Deserialize, Serialize};

/// 2D vector used for positions, directions and extents.
pub type Vector = glam::Vec2;

/// Axis-aligned box given by its top-left corner and extents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub corner: Vector,
    pub horizontal: f32,
    pub vertical: f32,
}

impl BoundingBox {
    pub fn new(corner: Vector, horizontal: f32, vertical: f32) -> Self {
        Self {
            corner,
            horizontal,
            vertical,
        }
    }

    /// Box with its corner at the origin
    pub fn with_extent(horizontal: f32, vertical: f32) -> Self {
        Self::new(Vector::ZERO, horizontal, vertical)
    }

    /// Bottom-right corner
    pub fn far_corner(&self) -> Vector {
        self.corner + Vector::new(self.horizontal, self.vertical)
    }

    pub fn center(&self) -> Vector {
        self.corner + Vector::new(self.horizontal / 2.0, self.vertical / 2.0)
    }

    /// Inclusive-edge overlap test on both axes.
    ///
    /// Boxes that merely touch along an edge count as intersecting.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        let (a1, a2) = (self.corner, self.far_corner());
        let (b1, b2) = (other.corner, other.far_corner());

        let x_overlap = (b1.x <= a1.x && a1.x <= b2.x) || (a1.x <= b1.x && b1.x <= a2.x);
        let y_overlap = (b1.y <= a1.y && a1.y <= b2.y) || (a1.y <= b1.y && b1.y <= a2.y);
        x_overlap && y_overlap
    }

    /// True if `other` lies entirely within this box
    pub fn contains(&self, other: &BoundingBox) -> bool {
        let (a1, a2) = (self.corner, self.far_corner());
        let (b1, b2) = (other.corner, other.far_corner());
        b1.x >= a1.x && b1.y >= a1.y && b2.x <= a2.x && b2.y <= a2.y
    }

    /// The box an object with these extents occupies when centred on `position`.
    pub fn centered_at(&self, position: Vector) -> BoundingBox {
        BoundingBox::new(
            position - Vector::new(self.horizontal / 2.0, self.vertical / 2.0),
            self.horizontal,
            self.vertical,
        )
    }
}

impl Default for BoundingBox {
    /// One character cell
    fn default() -> Self {
        Self::with_extent(1.0, 1.0)
    }
}
