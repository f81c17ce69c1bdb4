//! # Object Table
//!
//! Generational arena owning every kernel object.
//!
//! Objects are reference counted by the table itself: each handle, each
//! waiting thread and each service that keeps an object alive holds one
//! reference. When the last reference is released the slot is emptied and its
//! generation bumped, so any [`ObjectId`] still floating around (for example
//! in a scheduled callback) resolves to nothing.

use crate::wait_object::KernelObject;
use core_types::ObjectId;

struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

struct Entry {
    object: KernelObject,
    refcount: u32,
}

/// Reference-counted generational arena of kernel objects
#[derive(Default)]
pub struct ObjectTable {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `object` with a single reference and returns its id
    pub fn insert(&mut self, object: KernelObject) -> ObjectId {
        let entry = Entry {
            object,
            refcount: 1,
        };
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = Some(entry);
                ObjectId::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                ObjectId::new(index, 0)
            }
        }
    }

    fn entry(&self, id: ObjectId) -> Option<&Entry> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.entry.as_ref()
    }

    fn entry_mut(&mut self, id: ObjectId) -> Option<&mut Entry> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.entry.as_mut()
    }

    pub fn get(&self, id: ObjectId) -> Option<&KernelObject> {
        self.entry(id).map(|entry| &entry.object)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut KernelObject> {
        self.entry_mut(id).map(|entry| &mut entry.object)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.entry(id).is_some()
    }

    /// Adds a reference; returns false if the object no longer exists
    pub fn retain(&mut self, id: ObjectId) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.refcount += 1;
                true
            }
            None => false,
        }
    }

    /// Drops a reference, destroying the object with its last one
    ///
    /// Returns the destroyed object so the caller can tear down anything
    /// scheduled on its behalf.
    pub fn release(&mut self, id: ObjectId) -> Option<KernelObject> {
        let entry = self.entry_mut(id)?;
        entry.refcount -= 1;
        if entry.refcount > 0 {
            return None;
        }

        let slot = &mut self.slots[id.index() as usize];
        let destroyed = slot.entry.take().map(|entry| entry.object);
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        destroyed
    }

    pub fn refcount(&self, id: ObjectId) -> Option<u32> {
        self.entry(id).map(|entry| entry.refcount)
    }

    /// Ids of every live object, in slot order
    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entry
                .as_ref()
                .map(|_| ObjectId::new(index as u32, slot.generation))
        })
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
