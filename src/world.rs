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

//! World manager: object arena, scene graph, collisions and camera.

use crate::behavior::Behavior;
use crate::config::EngineConfig;
use crate::display::{Canvas, RenderBackend};
use crate::entity::{EntityId, ObjectBuilder, Solidness, WorldObject};
use crate::error::{EngineError, Result};
use crate::event::{Event, EventKind};
use crate::event_bus::EventRouter;
use crate::game::GameOver;
use crate::geometry::{BoundingBox, Vector};
use crate::object_list::ObjectList;
use crate::resources::ResourceManager;
use crate::scene_graph::SceneGraph;
use crate::subsystem::Subsystem;
use ahash::AHashMap;
use std::collections::VecDeque;
use tracing::{debug, error, info, info_span, warn};

/// Default maximum number of event kinds one object may subscribe to
pub const MAX_INTERESTS: usize = 100;

/// Where an object's behaviour currently is
enum BehaviorSlot {
    Idle(Box<dyn Behavior>),
    /// Taken out while its handler runs
    Busy,
}

/// A delivery waiting for `owner`'s handler to return
struct Parked {
    owner: EntityId,
    target: EntityId,
    event: Event,
}

/// Owns every world object and the structures indexing them
pub struct WorldManager {
    objects: AHashMap<EntityId, WorldObject>,
    behaviors: AHashMap<EntityId, BehaviorSlot>,
    /// Deliveries parked until a running handler returns
    inbox: VecDeque<Parked>,
    scene: SceneGraph,
    router: EventRouter,
    resources: ResourceManager,
    boundary: BoundingBox,
    view: BoundingBox,
    view_slack: Vector,
    following: Option<EntityId>,
    deletions: ObjectList,
    game_over: GameOver,
    list_capacity: usize,
    max_interests: usize,
    started: bool,
}

impl WorldManager {
    /// Create a world sharing `resources` with the rest of the engine
    pub fn new(config: &EngineConfig, resources: ResourceManager) -> Self {
        let capacity = config.world.list_capacity;
        Self {
            objects: AHashMap::new(),
            behaviors: AHashMap::new(),
            inbox: VecDeque::new(),
            scene: SceneGraph::with_capacity(capacity),
            router: EventRouter::new(config.events.max_kinds, capacity),
            resources,
            boundary: config.boundary(),
            view: config.view(),
            view_slack: Vector::from(config.world.view_slack),
            following: None,
            deletions: ObjectList::with_capacity(capacity),
            game_over: GameOver::new(),
            list_capacity: capacity,
            max_interests: config.world.max_interests,
            started: false,
        }
    }

    // ---- spawning and lookup ----

    /// Create an object, file it in the scene graph and subscribe the
    /// behaviour's declared interests.
    pub fn spawn<B: Behavior + 'static>(
        &mut self,
        builder: ObjectBuilder,
        behavior: B,
    ) -> Result<EntityId> {
        self.spawn_boxed(builder, Box::new(behavior))
    }

    pub fn spawn_boxed(
        &mut self,
        builder: ObjectBuilder,
        behavior: Box<dyn Behavior>,
    ) -> Result<EntityId> {
        if self.objects.len() >= self.list_capacity {
            return Err(EngineError::ListFull {
                capacity: self.list_capacity,
            });
        }
        let sprite = match &builder.sprite {
            Some(label) => Some(self.resources.get_sprite(label)?),
            None => None,
        };
        let mut object = builder.build()?;
        if let Some(sprite) = sprite {
            object.extent = BoundingBox::with_extent(sprite.width() as f32, sprite.height() as f32);
            object.animation.set_sprite(Some(sprite));
        }

        let id = object.id();
        self.scene.insert_object(&object)?;
        let interests: Vec<EventKind> = behavior.interests().to_vec();
        debug!(entity = %id, kind = object.type_name(), behavior = behavior.name(), "spawned");
        self.objects.insert(id, object);
        self.behaviors.insert(id, BehaviorSlot::Idle(behavior));

        for kind in interests {
            match self.register_interest(id, kind) {
                Ok(true) => {}
                Ok(false) => warn!(entity = %id, %kind, "interest not registered"),
                Err(e) => warn!(entity = %id, %kind, "interest refused: {e}"),
            }
        }
        Ok(id)
    }

    pub fn get(&self, id: EntityId) -> Option<&WorldObject> {
        self.objects.get(&id)
    }

    /// Mutable access to the free attributes (position, motion, extent, animation)
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut WorldObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn object(&self, id: EntityId) -> Result<&WorldObject> {
        self.objects.get(&id).ok_or(EngineError::EntityNotFound(id))
    }

    /// Active objects, plus inactive ones when asked
    pub fn all_objects(&self, include_inactive: bool) -> ObjectList {
        let mut all = self.scene.active_objects().clone();
        if include_inactive {
            let mut merged =
                ObjectList::with_capacity(all.len() + self.scene.inactive_objects().len());
            merged.append(&all);
            merged.append(self.scene.inactive_objects());
            all = merged;
        }
        all
    }

    /// Ids of every active object with the given type name
    pub fn objects_of_type(&self, type_name: &str) -> Vec<EntityId> {
        self.all_objects(false)
            .ids()
            .iter()
            .copied()
            .filter(|id| {
                self.objects
                    .get(id)
                    .is_some_and(|object| object.type_name() == type_name)
            })
            .collect()
    }

    // ---- attributes that re-file ----

    pub fn set_active(&mut self, id: EntityId, active: bool) -> Result<()> {
        let object = self
            .objects
            .get_mut(&id)
            .ok_or(EngineError::EntityNotFound(id))?;
        self.scene.update_active(object, active);
        object.active = active;
        Ok(())
    }

    pub fn set_solidness(&mut self, id: EntityId, solidness: Solidness) -> Result<()> {
        let object = self
            .objects
            .get_mut(&id)
            .ok_or(EngineError::EntityNotFound(id))?;
        self.scene.update_solidness(object, solidness);
        object.solidness = solidness;
        Ok(())
    }

    /// Fails with `InvalidAltitude` outside `0..MAX_ALTITUDE`, leaving the object as it was
    pub fn set_altitude(&mut self, id: EntityId, altitude: i32) -> Result<()> {
        let object = self
            .objects
            .get_mut(&id)
            .ok_or(EngineError::EntityNotFound(id))?;
        self.scene.update_altitude(object, altitude)?;
        object.altitude = altitude;
        Ok(())
    }

    pub fn set_visible(&mut self, id: EntityId, visible: bool) -> Result<()> {
        let object = self
            .objects
            .get_mut(&id)
            .ok_or(EngineError::EntityNotFound(id))?;
        self.scene.update_visible(object, visible);
        object.visible = visible;
        Ok(())
    }

    /// Bind a loaded sprite and size the object's box to it
    pub fn set_sprite(&mut self, id: EntityId, label: &str) -> Result<()> {
        let sprite = self.resources.get_sprite(label)?;
        let object = self
            .objects
            .get_mut(&id)
            .ok_or(EngineError::EntityNotFound(id))?;
        object.extent = BoundingBox::with_extent(sprite.width() as f32, sprite.height() as f32);
        object.animation.set_sprite(Some(sprite));
        Ok(())
    }

    // ---- interests and delivery ----

    /// Subscribe an object to `kind` on the bus that owns it.
    ///
    /// `Ok(false)` if already registered or the object is at its interest cap.
    pub fn register_interest(&mut self, id: EntityId, kind: EventKind) -> Result<bool> {
        let max_interests = self.max_interests;
        let object = self
            .objects
            .get_mut(&id)
            .ok_or(EngineError::EntityNotFound(id))?;
        if object.interests.contains(&kind) || object.interests.len() >= max_interests {
            return Ok(false);
        }
        if !self.router.subscribe(kind, id)? {
            return Ok(false);
        }
        object.interests.push(kind);
        Ok(true)
    }

    pub fn unregister_interest(&mut self, id: EntityId, kind: EventKind) -> bool {
        let Some(object) = self.objects.get_mut(&id) else {
            return false;
        };
        let Some(index) = object.interests.iter().position(|&k| k == kind) else {
            return false;
        };
        object.interests.remove(index);
        self.router.unsubscribe(kind, id)
    }

    /// Deliver `event` to every active subscriber of its kind.
    ///
    /// Subscribers are snapshotted first; objects that unsubscribe, go
    /// inactive or disappear mid-dispatch are skipped. Handler errors are
    /// logged. Returns the number of successful deliveries.
    pub fn dispatch(&mut self, event: &Event) -> usize {
        let kind = event.kind();
        let bus = self.router.bus_mut(kind.route());
        bus.record_processed();
        let Some(snapshot) = bus.snapshot(kind) else {
            return 0;
        };

        let mut delivered = 0;
        for id in snapshot.keys() {
            if !self.router.owner(kind).is_subscribed(kind, id) {
                continue;
            }
            if !self.objects.get(&id).is_some_and(WorldObject::is_active) {
                continue;
            }
            match self.deliver(id, event) {
                Ok(_) => delivered += 1,
                Err(e) => error!(entity = %id, %kind, "delivery failed: {e}"),
            }
        }
        delivered
    }

    /// Hand `event` straight to one object's behaviour, bypassing subscriptions.
    ///
    /// If that behaviour is already running the event is queued and handled as
    /// soon as it returns; the call then reports `Ok(false)`.
    pub fn deliver(&mut self, id: EntityId, event: &Event) -> Result<bool> {
        if !self.objects.contains_key(&id) {
            return Err(EngineError::EntityNotFound(id));
        }
        let Some(slot) = self.behaviors.get_mut(&id) else {
            return Ok(false);
        };
        let mut behavior = match std::mem::replace(slot, BehaviorSlot::Busy) {
            BehaviorSlot::Idle(behavior) => behavior,
            BehaviorSlot::Busy => {
                self.park(id, id, event);
                return Ok(false);
            }
        };

        let result = behavior.handle(self, id, event);

        if let Some(slot) = self.behaviors.get_mut(&id) {
            *slot = BehaviorSlot::Idle(behavior);
        }
        self.drain_inbox(id);
        result
    }

    fn is_busy(&self, id: EntityId) -> bool {
        matches!(self.behaviors.get(&id), Some(BehaviorSlot::Busy))
    }

    fn park(&mut self, owner: EntityId, target: EntityId, event: &Event) {
        self.inbox.push_back(Parked {
            owner,
            target,
            event: event.clone(),
        });
    }

    /// Run everything parked behind `owner`, in arrival order
    fn drain_inbox(&mut self, owner: EntityId) {
        while let Some(index) = self.inbox.iter().position(|p| p.owner == owner) {
            let Some(Parked { target, event, .. }) = self.inbox.remove(index) else {
                break;
            };
            if !self.objects.contains_key(&target) {
                continue;
            }
            if let Err(e) = self.deliver(target, &event) {
                error!(entity = %target, kind = %event.kind(), "queued delivery failed: {e}");
            }
        }
    }

    fn deliver_logged(&mut self, id: EntityId, event: &Event) {
        if let Err(e) = self.deliver(id, event) {
            error!(entity = %id, kind = %event.kind(), "delivery failed: {e}");
        }
    }

    // ---- collisions and movement ----

    /// Solid objects, other than `id`, overlapping the box `id` would occupy
    /// at `position`. Sorted by ascending id.
    pub fn get_collisions(&self, id: EntityId, position: Vector) -> Result<Vec<EntityId>> {
        let target = self.object(id)?.world_box_at(position);
        let mut collisions: Vec<EntityId> = self
            .scene
            .solid_objects()
            .ids()
            .iter()
            .copied()
            .filter(|&other| other != id)
            .filter(|other| {
                self.objects
                    .get(other)
                    .is_some_and(|o| o.is_solid() && target.intersects(&o.world_box()))
            })
            .collect();
        collisions.sort_unstable();
        Ok(collisions)
    }

    /// Try to move `id` to `position`.
    ///
    /// Solid movers notify both parties of every collision, mover first, even
    /// when the move is then blocked. A mover calling this from its own
    /// handler gets both notifications, in that order, once it returns. The move is blocked by a hard/hard pair
    /// or by a soft object when the mover has `no_soft` set.
    pub fn move_object(&mut self, id: EntityId, position: Vector) -> Result<bool> {
        if self.object(id)?.is_solid() {
            let mut blocked = false;
            for other in self.get_collisions(id, position)? {
                if !self.objects.contains_key(&other) {
                    continue;
                }
                let event = Event::Collision {
                    mover: id,
                    other,
                    position,
                };
                if self.is_busy(id) {
                    // mover is mid-handler: both wait so the mover still hears first
                    self.park(id, id, &event);
                    self.park(id, other, &event);
                } else {
                    self.deliver_logged(id, &event);
                    self.deliver_logged(other, &event);
                }

                let (Some(mover), Some(hit)) = (self.objects.get(&id), self.objects.get(&other))
                else {
                    continue;
                };
                if mover.solidness() == Solidness::Hard && hit.solidness() == Solidness::Hard {
                    blocked = true;
                }
                if mover.no_soft && hit.solidness() == Solidness::Soft {
                    blocked = true;
                }
            }
            if blocked {
                return Ok(false);
            }
        }

        let view = self.view;
        let Some(object) = self.objects.get_mut(&id) else {
            return Ok(false);
        };
        let before = object.world_box();
        object.position = position;
        let after = object.world_box();

        if before.intersects(&view) && !after.intersects(&view) {
            self.deliver_logged(id, &Event::Out);
        }
        if self.following == Some(id) {
            self.follow(position);
        }
        Ok(true)
    }

    /// Recentre just enough to keep `position` inside the slack rectangle
    fn follow(&mut self, position: Vector) {
        let mut center = self.view.center();
        let half_slack = Vector::new(
            self.view.horizontal * self.view_slack.x / 2.0,
            self.view.vertical * self.view_slack.y / 2.0,
        );
        let (left, right) = (center.x - half_slack.x, center.x + half_slack.x);
        let (top, bottom) = (center.y - half_slack.y, center.y + half_slack.y);

        if position.x < left {
            center.x -= left - position.x;
        } else if position.x > right {
            center.x += position.x - right;
        }
        if position.y < top {
            center.y -= top - position.y;
        } else if position.y > bottom {
            center.y += position.y - bottom;
        }
        self.set_view_position(center);
    }

    // ---- deletion and the frame update ----

    /// Schedule removal at the end of the next `update`; repeated calls are no-ops
    pub fn mark_for_delete(&mut self, id: EntityId) -> Result<()> {
        if !self.objects.contains_key(&id) {
            return Err(EngineError::EntityNotFound(id));
        }
        if self.deletions.contains(id) {
            debug!(entity = %id, "already marked for delete");
            return Ok(());
        }
        self.deletions.insert(id)
    }

    pub fn is_marked_for_delete(&self, id: EntityId) -> bool {
        self.deletions.contains(id)
    }

    pub fn pending_deletions(&self) -> &ObjectList {
        &self.deletions
    }

    /// Move every active object by its velocity, then remove marked objects
    pub fn update(&mut self) {
        let _span = info_span!("world_update", objects = self.objects.len()).entered();

        let mut iter = self.scene.active_objects().iter();
        iter.first();
        while !iter.is_done() {
            if let Some(id) = iter.current_item(self.scene.active_objects()) {
                if let Some(object) = self.objects.get(&id) {
                    let target = object.predict_position();
                    if target != object.position {
                        if let Err(e) = self.move_object(id, target) {
                            warn!(entity = %id, "move failed: {e}");
                        }
                    }
                }
            }
            iter.next();
        }

        let marked = std::mem::replace(
            &mut self.deletions,
            ObjectList::with_capacity(self.list_capacity),
        );
        for id in marked.iter().keys() {
            self.destroy(id);
        }
    }

    /// Physically remove an object
    fn destroy(&mut self, id: EntityId) {
        if let Some(BehaviorSlot::Idle(mut behavior)) = self.behaviors.remove(&id) {
            behavior.on_destroy(self, id);
        }
        let Some(object) = self.objects.remove(&id) else {
            warn!(entity = %id, "destroy: not in world");
            return;
        };
        for &kind in object.interests() {
            self.router.unsubscribe(kind, id);
        }
        self.scene.remove_object(id);
        self.inbox.retain(|p| p.target != id && p.owner != id);
        if self.following == Some(id) {
            self.following = None;
        }
        debug!(entity = %id, kind = object.type_name(), "destroyed");
    }

    // ---- drawing ----

    /// Draw visible objects back to front; returns how many were drawn
    pub fn draw(&mut self, backend: &mut dyn RenderBackend) -> usize {
        let view = self.view;
        let mut canvas = Canvas::new(backend, view);
        let mut drawn = 0;
        for &id in self.scene.all_objects_sorted_by_altitude().ids() {
            let (Some(object), Some(BehaviorSlot::Idle(behavior))) =
                (self.objects.get_mut(&id), self.behaviors.get_mut(&id))
            else {
                continue;
            };
            if behavior.cull_to_view() && !object.world_box().intersects(&view) {
                continue;
            }
            match behavior.draw(object, &mut canvas) {
                Ok(true) => drawn += 1,
                Ok(false) => {}
                Err(e) => error!(entity = %id, "draw failed: {e}"),
            }
        }
        drawn
    }

    // ---- camera ----

    pub fn boundary(&self) -> &BoundingBox {
        &self.boundary
    }

    pub fn set_boundary(&mut self, boundary: BoundingBox) {
        self.boundary = boundary;
        self.set_view_position(self.view.center());
    }

    pub fn view(&self) -> &BoundingBox {
        &self.view
    }

    /// Replace the camera box; it is clamped into the boundary
    pub fn set_view(&mut self, view: BoundingBox) {
        self.view = view;
        self.set_view_position(view.center());
    }

    pub fn view_slack(&self) -> Vector {
        self.view_slack
    }

    pub fn set_view_slack(&mut self, slack: Vector) {
        self.view_slack = slack.clamp(Vector::ZERO, Vector::ONE);
    }

    /// Centre the camera on `center`, clamped so it never leaves the boundary.
    ///
    /// A view larger than the boundary is pinned to the boundary's corner.
    pub fn set_view_position(&mut self, center: Vector) {
        let clamp_axis = |want: f32, lo: f32, extent: f32, view_extent: f32| {
            let hi = lo + extent - view_extent;
            if hi < lo {
                lo
            } else {
                want.clamp(lo, hi)
            }
        };
        let x = clamp_axis(
            center.x - self.view.horizontal / 2.0,
            self.boundary.corner.x,
            self.boundary.horizontal,
            self.view.horizontal,
        );
        let y = clamp_axis(
            center.y - self.view.vertical / 2.0,
            self.boundary.corner.y,
            self.boundary.vertical,
            self.view.vertical,
        );
        self.view.corner = Vector::new(x, y);
    }

    pub fn following(&self) -> Option<EntityId> {
        self.following
    }

    /// Follow `id` with the camera, or stop following with `None`
    pub fn set_following(&mut self, id: Option<EntityId>) -> Result<()> {
        match id {
            None => {
                self.following = None;
                Ok(())
            }
            Some(id) => {
                let position = self.object(id)?.position;
                self.following = Some(id);
                self.set_view_position(position);
                Ok(())
            }
        }
    }

    // ---- plumbing ----

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    /// Flag checked by the game loop between frames
    pub fn game_over(&self) -> &GameOver {
        &self.game_over
    }

    pub fn set_game_over(&self) {
        self.game_over.set(true);
    }
}

impl Subsystem for WorldManager {
    fn name(&self) -> &'static str {
        "WorldManager"
    }

    fn start_up(&mut self) -> Result<()> {
        self.deletions.clear();
        self.started = true;
        info!(
            boundary = ?self.boundary,
            view = ?self.view,
            "world manager started"
        );
        Ok(())
    }

    /// Drop every object without running deletion hooks
    fn shut_down(&mut self) {
        self.deletions.clear();
        self.inbox.clear();
        self.router.clear();
        self.scene.clear();
        self.behaviors.clear();
        let removed = self.objects.len();
        self.objects.clear();
        self.following = None;
        if self.started {
            info!(removed, "world manager shut down");
        }
        self.started = false;
    }

    fn is_started(&self) -> bool {
        self.started
    }
}

impl Default for WorldManager {
    fn default() -> Self {
        Self::new(&EngineConfig::default(), ResourceManager::default())
    }
}
