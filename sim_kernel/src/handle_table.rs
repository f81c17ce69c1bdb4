//! # Handle Table
//!
//! Maps guest-visible handles to kernel objects.
//!
//! The table only records which object a handle names. Reference counting is
//! the object table's job: the kernel retains an object when it hands out a
//! handle and releases it when the handle is closed.

use crate::errors::{ERR_INVALID_HANDLE, ERR_OUT_OF_HANDLES};
use core_types::{Handle, ObjectId, ResultVal};
use std::collections::HashMap;

/// Handle → object mapping with a fixed capacity
pub struct HandleTable {
    entries: HashMap<Handle, ObjectId>,
    next: u32,
    max_handles: usize,
}

impl HandleTable {
    pub fn new(max_handles: usize) -> Self {
        Self {
            entries: HashMap::new(),
            next: 1,
            max_handles,
        }
    }

    /// Allocates a fresh handle naming `object`
    pub fn create(&mut self, object: ObjectId) -> ResultVal<Handle> {
        if self.entries.len() >= self.max_handles {
            tracing::warn!(max = self.max_handles, "handle table exhausted");
            return Err(ERR_OUT_OF_HANDLES);
        }
        let handle = self.allocate();
        self.entries.insert(handle, object);
        Ok(handle)
    }

    fn allocate(&mut self) -> Handle {
        loop {
            let candidate = Handle::from_raw(self.next);
            self.next = self.next.wrapping_add(1);
            if self.next == 0 {
                self.next = 1;
            }
            if candidate.is_valid() && !self.entries.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    pub fn get(&self, handle: Handle) -> Option<ObjectId> {
        self.entries.get(&handle).copied()
    }

    /// Removes a handle, returning the object it named
    pub fn close(&mut self, handle: Handle) -> ResultVal<ObjectId> {
        self.entries.remove(&handle).ok_or(ERR_INVALID_HANDLE)
    }

    /// Allocates a second handle naming the same object as `handle`
    pub fn duplicate(&mut self, handle: Handle) -> ResultVal<(Handle, ObjectId)> {
        let object = self.get(handle).ok_or(ERR_INVALID_HANDLE)?;
        let copy = self.create(object)?;
        Ok((copy, object))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
