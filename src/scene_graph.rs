//! Classification buckets over live objects.
//!
//! Every object sits in exactly one of `active`/`inactive`. Active objects
//! are also filed in `solid` when their solidness is not spectral, and in
//! `visible[altitude]` when they are visible. Inactive objects live only in
//! `inactive`.

use crate::entity::{validate_altitude, EntityId, Solidness, WorldObject, MAX_ALTITUDE};
use crate::error::Result;
use crate::object_list::{ObjectList, OBJECT_LIST_MAX};
use tracing::{debug, warn};

/// The attributes that decide bucket membership
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub active: bool,
    pub solid: bool,
    pub visible: bool,
    pub altitude: i32,
}

impl Placement {
    pub fn of(object: &WorldObject) -> Self {
        Self {
            active: object.is_active(),
            solid: object.is_solid(),
            visible: object.is_visible(),
            altitude: object.altitude(),
        }
    }

    fn in_solid(&self) -> bool {
        self.active && self.solid
    }

    fn visible_layer(&self) -> Option<usize> {
        if self.active && self.visible {
            usize::try_from(self.altitude).ok()
        } else {
            None
        }
    }
}

/// Scene graph: active, inactive, solid and per-altitude visible buckets
#[derive(Clone, Debug)]
pub struct SceneGraph {
    active: ObjectList,
    inactive: ObjectList,
    solid: ObjectList,
    visible: Vec<ObjectList>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::with_capacity(OBJECT_LIST_MAX)
    }

    /// Each bucket holds at most `capacity` objects
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            active: ObjectList::with_capacity(capacity),
            inactive: ObjectList::with_capacity(capacity),
            solid: ObjectList::with_capacity(capacity),
            visible: (0..MAX_ALTITUDE)
                .map(|_| ObjectList::with_capacity(capacity))
                .collect(),
        }
    }

    /// File a new object according to its attributes.
    ///
    /// Fails only if the primary (active or inactive) bucket refuses it.
    pub fn insert_object(&mut self, object: &WorldObject) -> Result<()> {
        let placement = Placement::of(object);
        let id = object.id();
        if placement.active {
            self.active.insert(id)?;
        } else {
            self.inactive.insert(id)?;
        }
        self.file_secondary(id, &placement);
        debug!(entity = %id, ?placement, "filed");
        Ok(())
    }

    /// Remove an object from every bucket it may be in
    pub fn remove_object(&mut self, id: EntityId) {
        let buckets = [&mut self.active, &mut self.inactive, &mut self.solid]
            .into_iter()
            .chain(self.visible.iter_mut());
        let mut found = false;
        for bucket in buckets {
            if bucket.contains(id) {
                found |= bucket.remove(id).is_ok();
            }
        }
        if !found {
            warn!(entity = %id, "remove_object: not in scene graph");
        }
    }

    pub fn update_active(&mut self, object: &WorldObject, active: bool) {
        let old = Placement::of(object);
        if old.active == active {
            return;
        }
        self.refile(object.id(), &old, &Placement { active, ..old });
    }

    pub fn update_solidness(&mut self, object: &WorldObject, solidness: Solidness) {
        let old = Placement::of(object);
        let solid = solidness.is_solid();
        if old.solid == solid {
            return;
        }
        self.refile(object.id(), &old, &Placement { solid, ..old });
    }

    /// Move an object to another altitude layer; the altitude is validated first
    pub fn update_altitude(&mut self, object: &WorldObject, altitude: i32) -> Result<()> {
        let altitude = validate_altitude(altitude)?;
        let old = Placement::of(object);
        if old.altitude != altitude {
            self.refile(object.id(), &old, &Placement { altitude, ..old });
        }
        Ok(())
    }

    pub fn update_visible(&mut self, object: &WorldObject, visible: bool) {
        let old = Placement::of(object);
        if old.visible == visible {
            return;
        }
        self.refile(object.id(), &old, &Placement { visible, ..old });
    }

    /// Visible objects, lowest altitude first (back-to-front paint order)
    pub fn all_objects_sorted_by_altitude(&self) -> ObjectList {
        let total: usize = self.visible.iter().map(ObjectList::len).sum();
        let mut sorted = ObjectList::with_capacity(total);
        for layer in &self.visible {
            sorted.append(layer);
        }
        sorted
    }

    pub fn active_objects(&self) -> &ObjectList {
        &self.active
    }

    pub fn inactive_objects(&self) -> &ObjectList {
        &self.inactive
    }

    pub fn solid_objects(&self) -> &ObjectList {
        &self.solid
    }

    /// Visible bucket for one altitude; `None` if the altitude is out of range
    pub fn visible_objects(&self, altitude: i32) -> Option<&ObjectList> {
        usize::try_from(altitude)
            .ok()
            .and_then(|layer| self.visible.get(layer))
    }

    /// Number of objects filed (active plus inactive)
    pub fn len(&self) -> usize {
        self.active.len() + self.inactive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.inactive.clear();
        self.solid.clear();
        for layer in &mut self.visible {
            layer.clear();
        }
    }

    fn refile(&mut self, id: EntityId, old: &Placement, new: &Placement) {
        if old.active != new.active {
            let (from, to) = if new.active {
                (&mut self.inactive, &mut self.active)
            } else {
                (&mut self.active, &mut self.inactive)
            };
            log_bookkeeping(id, "primary remove", from.remove(id));
            log_bookkeeping(id, "primary insert", to.insert(id));
        }

        if old.in_solid() != new.in_solid() {
            if new.in_solid() {
                log_bookkeeping(id, "solid insert", self.solid.insert(id));
            } else {
                log_bookkeeping(id, "solid remove", self.solid.remove(id));
            }
        }

        let (old_layer, new_layer) = (old.visible_layer(), new.visible_layer());
        if old_layer != new_layer {
            if let Some(layer) = old_layer.and_then(|l| self.visible.get_mut(l)) {
                log_bookkeeping(id, "visible remove", layer.remove(id));
            }
            if let Some(layer) = new_layer.and_then(|l| self.visible.get_mut(l)) {
                log_bookkeeping(id, "visible insert", layer.insert(id));
            }
        }

        debug!(entity = %id, from = ?old, to = ?new, "refiled");
    }

    fn file_secondary(&mut self, id: EntityId, placement: &Placement) {
        if placement.in_solid() {
            log_bookkeeping(id, "solid insert", self.solid.insert(id));
        }
        if let Some(layer) = placement.visible_layer().and_then(|l| self.visible.get_mut(l)) {
            log_bookkeeping(id, "visible insert", layer.insert(id));
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn log_bookkeeping(id: EntityId, step: &str, result: Result<()>) {
    if let Err(e) = result {
        warn!(entity = %id, "{step}: {e}");
    }
}
