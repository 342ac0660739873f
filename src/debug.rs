//! Debugging aids: bucket inspection, serialisable world snapshots and
//! frame-time diagnostics.

use crate::entity::{EntityId, Solidness, MAX_ALTITUDE};
use crate::error::Result;
use crate::event::{BusId, EventKind};
use crate::geometry::{BoundingBox, Vector};
use crate::world::WorldManager;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::info;

/// Read-only queries over a world's scene graph
pub struct WorldInspector;

impl WorldInspector {
    pub fn object_count(world: &WorldManager) -> usize {
        world.object_count()
    }

    /// Size of every scene-graph bucket
    pub fn bucket_summary(world: &WorldManager) -> BucketInfo {
        let scene = world.scene();
        BucketInfo {
            active: scene.active_objects().len(),
            inactive: scene.inactive_objects().len(),
            solid: scene.solid_objects().len(),
            visible: (0..MAX_ALTITUDE)
                .map(|altitude| scene.visible_objects(altitude).map_or(0, |l| l.len()))
                .collect(),
        }
    }

    /// Subscriber count per event kind on each bus
    pub fn subscriptions(world: &WorldManager) -> Vec<(BusId, EventKind, usize)> {
        let mut rows = Vec::new();
        for bus_id in BusId::ALL {
            let bus = world.router().bus(bus_id);
            for kind in bus.kinds() {
                rows.push((bus_id, kind, bus.subscriber_count(kind)));
            }
        }
        rows.sort();
        rows
    }

    /// Log a summary at info level
    pub fn print_summary(world: &WorldManager) {
        let buckets = Self::bucket_summary(world);
        info!(
            objects = Self::object_count(world),
            active = buckets.active,
            inactive = buckets.inactive,
            solid = buckets.solid,
            visible = ?buckets.visible,
            view = ?world.view(),
            "world summary"
        );
        for (bus, kind, subscribers) in Self::subscriptions(world) {
            info!(?bus, %kind, subscribers, "subscription");
        }
    }

    /// Log one object's attributes
    pub fn print_object(world: &WorldManager, id: EntityId) {
        match world.get(id) {
            Some(object) => info!(
                entity = %id,
                kind = object.type_name(),
                position = ?object.position,
                altitude = object.altitude(),
                solidness = %object.solidness(),
                active = object.is_active(),
                visible = object.is_visible(),
                "object"
            ),
            None => info!(entity = %id, "object not found"),
        }
    }
}

/// Bucket sizes of a scene graph
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BucketInfo {
    pub active: usize,
    pub inactive: usize,
    pub solid: usize,
    /// Indexed by altitude
    pub visible: Vec<usize>,
}

/// One object as it appears in a [`WorldSnapshot`]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ObjectSnapshot {
    pub id: EntityId,
    pub type_name: String,
    pub position: Vector,
    pub velocity: Vector,
    pub world_box: BoundingBox,
    pub altitude: i32,
    pub solidness: Solidness,
    pub no_soft: bool,
    pub active: bool,
    pub visible: bool,
    pub sprite: Option<String>,
    pub frame_index: usize,
    pub interests: Vec<String>,
    pub marked_for_delete: bool,
}

/// Serialisable dump of the whole world
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorldSnapshot {
    pub boundary: BoundingBox,
    pub view: BoundingBox,
    pub following: Option<EntityId>,
    pub buckets: BucketInfo,
    /// Sorted by id
    pub objects: Vec<ObjectSnapshot>,
}

impl WorldSnapshot {
    pub fn capture(world: &WorldManager) -> Self {
        let mut objects: Vec<ObjectSnapshot> = world
            .all_objects(true)
            .ids()
            .iter()
            .filter_map(|&id| world.get(id))
            .map(|object| ObjectSnapshot {
                id: object.id(),
                type_name: object.type_name().to_string(),
                position: object.position,
                velocity: object.velocity(),
                world_box: object.world_box(),
                altitude: object.altitude(),
                solidness: object.solidness(),
                no_soft: object.no_soft,
                active: object.is_active(),
                visible: object.is_visible(),
                sprite: object
                    .animation
                    .sprite()
                    .map(|sprite| sprite.label().to_string()),
                frame_index: object.animation.index(),
                interests: object.interests().iter().map(ToString::to_string).collect(),
                marked_for_delete: world.is_marked_for_delete(object.id()),
            })
            .collect();
        objects.sort_by_key(|object| object.id);

        Self {
            boundary: *world.boundary(),
            view: *world.view(),
            following: world.following(),
            buckets: WorldInspector::bucket_summary(world),
            objects,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Rolling frame-time statistics
#[derive(Clone, Debug)]
pub struct Diagnostics {
    frame_times: VecDeque<Duration>,
    max_samples: usize,
    frames: u64,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::with_samples(60)
    }

    /// Keep the last `max_samples` frame times
    pub fn with_samples(max_samples: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
            frames: 0,
        }
    }

    pub fn record_frame_time(&mut self, time: Duration) {
        self.frames += 1;
        self.frame_times.push_back(time);
        if self.frame_times.len() > self.max_samples {
            self.frame_times.pop_front();
        }
    }

    /// Frames recorded since creation
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn fps(&self) -> f32 {
        let avg = self.avg_frame_time().as_secs_f32();
        if avg > 0.0 {
            1.0 / avg
        } else {
            0.0
        }
    }

    pub fn avg_frame_time(&self) -> Duration {
        if self.frame_times.is_empty() {
            return Duration::ZERO;
        }
        self.frame_times.iter().sum::<Duration>() / self.frame_times.len() as u32
    }

    pub fn min_frame_time(&self) -> Duration {
        self.frame_times.iter().copied().min().unwrap_or_default()
    }

    pub fn max_frame_time(&self) -> Duration {
        self.frame_times.iter().copied().max().unwrap_or_default()
    }

    /// Log the statistics at info level
    pub fn print(&self) {
        info!(
            frames = self.frames,
            fps = format_args!("{:.1}", self.fps()),
            avg = ?self.avg_frame_time(),
            min = ?self.min_frame_time(),
            max = ?self.max_frame_time(),
            "diagnostics"
        );
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Inert;
    use crate::entity::ObjectBuilder;

    #[test]
    fn test_diagnostics() {
        let mut diag = Diagnostics::with_samples(4);
        assert_eq!(diag.fps(), 0.0);

        for ms in [50, 20, 30, 40, 50] {
            diag.record_frame_time(Duration::from_millis(ms));
        }
        assert_eq!(diag.frames(), 5);
        // the 50 ms sample fell out of the window
        assert_eq!(diag.min_frame_time(), Duration::from_millis(20));
        assert_eq!(diag.max_frame_time(), Duration::from_millis(50));
        assert_eq!(diag.avg_frame_time(), Duration::from_millis(35));
        assert!((diag.fps() - 28.57).abs() < 0.1);
    }

    #[test]
    fn test_bucket_summary() {
        let mut world = WorldManager::default();
        world.spawn(ObjectBuilder::new("Rock").altitude(0), Inert).unwrap();
        world
            .spawn(ObjectBuilder::new("Sleeper").active(false), Inert)
            .unwrap();
        world
            .spawn(
                ObjectBuilder::new("Ghost").solidness(Solidness::Spectral),
                Inert,
            )
            .unwrap();

        let buckets = WorldInspector::bucket_summary(&world);
        assert_eq!(buckets.active, 2);
        assert_eq!(buckets.inactive, 1);
        assert_eq!(buckets.solid, 1);
        assert_eq!(buckets.visible, vec![1, 0, 0, 1, 0]);
    }

    #[test]
    fn test_snapshot_json() {
        let mut world = WorldManager::default();
        let id = world.spawn(ObjectBuilder::new("Rock").at(3.0, 4.0), Inert).unwrap();
        world.register_interest(id, EventKind::Step).unwrap();
        world.mark_for_delete(id).unwrap();

        let snapshot = WorldSnapshot::capture(&world);
        assert_eq!(snapshot.objects.len(), 1);
        assert!(snapshot.objects[0].marked_for_delete);
        assert_eq!(snapshot.objects[0].interests, vec!["step".to_string()]);

        let json = snapshot.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["objects"][0]["type_name"], "Rock");
        assert_eq!(value["objects"][0]["solidness"], "hard");
        assert_eq!(value["buckets"]["solid"], 1);
    }
}
