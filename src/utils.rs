//! Utility functions

use crate::geometry::{BoundingBox, Vector};

/// Generate unique ID
pub fn next_id() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// True if two positions are within one cell of each other on both axes
pub fn positions_intersect(a: Vector, b: Vector) -> bool {
    (a.x - b.x).abs() <= 1.0 && (a.y - b.y).abs() <= 1.0
}

/// Convert a world position to view (screen) coordinates
pub fn world_to_view(world_position: Vector, view: &BoundingBox) -> Vector {
    world_position - view.corner
}

/// Convert a view (screen) position back to world coordinates
pub fn view_to_world(view_position: Vector, view: &BoundingBox) -> Vector {
    view_position + view.corner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id() {
        let id1 = next_id();
        let id2 = next_id();
        assert_ne!(id1, id2);
        assert!(id2 > id1);
    }

    #[test]
    fn test_positions_intersect() {
        assert!(positions_intersect(Vector::new(1.0, 1.0), Vector::new(2.0, 2.0)));
        assert!(positions_intersect(Vector::new(5.0, 5.0), Vector::new(5.0, 5.0)));
        assert!(!positions_intersect(Vector::new(1.0, 1.0), Vector::new(3.0, 1.0)));
        assert!(!positions_intersect(Vector::new(1.0, 1.0), Vector::new(1.0, 2.5)));
    }

    #[test]
    fn test_view_conversion() {
        let view = BoundingBox::new(Vector::new(10.0, 4.0), 20.0, 10.0);
        let world = Vector::new(15.0, 6.0);
        let screen = world_to_view(world, &view);
        assert_eq!(screen, Vector::new(5.0, 2.0));
        assert_eq!(view_to_world(screen, &view), world);
    }
}
