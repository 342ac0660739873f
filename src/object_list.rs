//! Ordered, identity-unique entity containers.
//!
//! [`ObjectList`] keeps insertion order and rejects duplicates. It stores ids
//! only; the objects themselves live in the world arena.
//!
//! [`ObjectListIter`] snapshots the id sequence when it is created, so the
//! list (or the world) can change while a traversal is in progress. Every
//! lookup re-checks membership and yields `None` for ids removed since the
//! snapshot was taken.
//!
//! # Examples
//!
//! ```
//! use glyph_engine::object_list::ObjectList;
//! use glyph_engine::entity::EntityId;
//!
//! let mut list = ObjectList::new();
//! let a = EntityId::next();
//! let b = EntityId::next();
//! list.insert(a).unwrap();
//! list.insert(b).unwrap();
//!
//! let mut iter = list.iter();
//! iter.first();
//! list.remove(b).unwrap();
//! iter.next();
//! assert_eq!(iter.current_item(&list), None);
//! ```

use crate::entity::EntityId;
use crate::error::{EngineError, Result};
use ahash::AHashSet;
use tracing::warn;

/// Default capacity of a list
pub const OBJECT_LIST_MAX: usize = 5000;

/// Insertion-ordered set of entity ids with bounded capacity
#[derive(Clone, Debug)]
pub struct ObjectList {
    order: Vec<EntityId>,
    members: AHashSet<EntityId>,
    capacity: usize,
}

impl ObjectList {
    pub fn new() -> Self {
        Self::with_capacity(OBJECT_LIST_MAX)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: Vec::new(),
            members: AHashSet::new(),
            capacity,
        }
    }

    /// Append `id`; fails on duplicates and when full
    pub fn insert(&mut self, id: EntityId) -> Result<()> {
        if self.members.contains(&id) {
            return Err(EngineError::DuplicateEntity(id));
        }
        if self.is_full() {
            return Err(EngineError::ListFull {
                capacity: self.capacity,
            });
        }
        self.members.insert(id);
        self.order.push(id);
        Ok(())
    }

    /// Remove `id`, keeping the order of the rest; fails if absent
    pub fn remove(&mut self, id: EntityId) -> Result<()> {
        if !self.members.remove(&id) {
            return Err(EngineError::NotInList(id));
        }
        if let Some(index) = self.order.iter().position(|&member| member == id) {
            self.order.remove(index);
        }
        Ok(())
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.order.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    /// Union `other` into this list.
    ///
    /// Ids already present or that do not fit are logged and skipped.
    /// Returns the number of ids added.
    pub fn append(&mut self, other: &ObjectList) -> usize {
        let mut added = 0;
        for &id in &other.order {
            match self.insert(id) {
                Ok(()) => added += 1,
                Err(e) => warn!(entity = %id, "append skipped: {e}"),
            }
        }
        added
    }

    /// Ids in insertion order
    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    /// Snapshot iterator over the current contents
    pub fn iter(&self) -> ObjectListIter {
        ObjectListIter::new(self)
    }
}

impl Default for ObjectList {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<EntityId> for ObjectList {
    fn from_iter<I: IntoIterator<Item = EntityId>>(iter: I) -> Self {
        let mut list = ObjectList::new();
        for id in iter {
            if let Err(e) = list.insert(id) {
                warn!(entity = %id, "collect skipped: {e}");
            }
        }
        list
    }
}

/// Cursor over a snapshot of an [`ObjectList`]
#[derive(Clone, Debug)]
pub struct ObjectListIter {
    snapshot: Vec<EntityId>,
    index: usize,
}

impl ObjectListIter {
    pub fn new(list: &ObjectList) -> Self {
        Self {
            snapshot: list.order.clone(),
            index: 0,
        }
    }

    /// Rewind to the first id
    pub fn first(&mut self) {
        self.index = 0;
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        if self.index < self.snapshot.len() {
            self.index += 1;
        }
    }

    pub fn is_done(&self) -> bool {
        self.index >= self.snapshot.len()
    }

    /// Id under the cursor, whether or not it is still a member anywhere
    pub fn current_key(&self) -> Option<EntityId> {
        self.snapshot.get(self.index).copied()
    }

    /// Id under the cursor if it is still in `list`
    pub fn current_item(&self, list: &ObjectList) -> Option<EntityId> {
        self.current_key().filter(|&id| list.contains(id))
    }

    /// Number of ids captured by the snapshot
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Consume the cursor, yielding every snapshot id in order
    pub fn keys(self) -> impl Iterator<Item = EntityId> {
        self.snapshot.into_iter().skip(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<EntityId> {
        (0..n).map(|_| EntityId::next()).collect()
    }

    #[test]
    fn test_insert_remove() {
        let mut list = ObjectList::new();
        let [a]: [EntityId; 1] = ids(1).try_into().unwrap();

        list.insert(a).unwrap();
        assert!(list.contains(a));
        assert_eq!(list.insert(a), Err(EngineError::DuplicateEntity(a)));

        list.remove(a).unwrap();
        assert!(!list.contains(a));
        assert!(list.is_empty());
        assert_eq!(list.remove(a), Err(EngineError::NotInList(a)));
    }

    #[test]
    fn test_keeps_insertion_order() {
        let mut list = ObjectList::new();
        let all = ids(4);
        for &id in &all {
            list.insert(id).unwrap();
        }
        list.remove(all[1]).unwrap();
        assert_eq!(list.ids(), &[all[0], all[2], all[3]]);
    }

    #[test]
    fn test_capacity() {
        let mut list = ObjectList::with_capacity(2);
        let all = ids(3);
        list.insert(all[0]).unwrap();
        list.insert(all[1]).unwrap();
        assert!(list.is_full());
        assert_eq!(list.insert(all[2]), Err(EngineError::ListFull { capacity: 2 }));
    }

    #[test]
    fn test_append_skips_duplicates() {
        let all = ids(3);
        let mut left: ObjectList = all[..2].iter().copied().collect();
        let right: ObjectList = all[1..].iter().copied().collect();

        assert_eq!(left.append(&right), 1);
        assert_eq!(left.ids(), all.as_slice());
    }

    #[test]
    fn test_iterator_survives_removing_current() {
        let all = ids(3);
        let mut list: ObjectList = all.iter().copied().collect();
        let mut seen = Vec::new();

        let mut iter = list.iter();
        iter.first();
        while !iter.is_done() {
            if let Some(id) = iter.current_item(&list) {
                seen.push(id);
                list.remove(id).unwrap();
            }
            iter.next();
        }
        assert_eq!(seen, all);
        assert!(list.is_empty());
    }

    #[test]
    fn test_iterator_skips_removed_unvisited() {
        let all = ids(3);
        let mut list: ObjectList = all.iter().copied().collect();
        let mut seen = Vec::new();

        let mut iter = list.iter();
        iter.first();
        while !iter.is_done() {
            if let Some(id) = iter.current_item(&list) {
                seen.push(id);
                if id == all[0] {
                    list.remove(all[2]).unwrap();
                }
            }
            iter.next();
        }
        assert_eq!(seen, vec![all[0], all[1]]);
    }

    #[test]
    fn test_iterator_ignores_later_inserts() {
        let all = ids(3);
        let mut list: ObjectList = all[..2].iter().copied().collect();
        let iter = list.iter();
        list.insert(all[2]).unwrap();
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.keys().collect::<Vec<_>>(), all[..2].to_vec());
    }
}
