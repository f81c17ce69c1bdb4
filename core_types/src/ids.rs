//! Unique identifiers for kernel entities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Guest-visible handle value
///
/// Handles are only meaningful within the handle table that issued them.
/// Zero is never issued and is treated as the invalid handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle(u32);

impl Handle {
    /// The handle value that never refers to an object
    pub const INVALID: Handle = Handle(0);

    /// Creates a handle from its raw guest value
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw guest value
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Returns true unless this is the invalid handle
    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle(0x{:08X})", self.0)
    }
}

/// Generational index of a kernel object
///
/// The index selects an arena slot; the generation distinguishes successive
/// occupants of that slot. A scheduler callback holding an `ObjectId` for a
/// destroyed object finds a generation mismatch and does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    /// Creates an object id from slot index and generation
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub const fn index(&self) -> u32 {
        self.index
    }

    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Packs the id into the 64-bit user data carried by scheduled callbacks
    pub const fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    /// Unpacks an id previously produced by [`ObjectId::to_bits`]
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({}v{})", self.index, self.generation)
    }
}

/// Identifier of a guest thread context
///
/// Thread ids are issued monotonically and never reused, so waiter lists can
/// hold them without owning the thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThreadId(u32);

impl ThreadId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Thread({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_handle() {
        assert!(!Handle::INVALID.is_valid());
        assert!(Handle::from_raw(0x15).is_valid());
    }

    #[test]
    fn test_handle_display() {
        let display = format!("{}", Handle::from_raw(0x1234));
        assert_eq!(display, "Handle(0x00001234)");
    }

    #[test]
    fn test_object_id_bits_preserve_generation() {
        let id = ObjectId::new(7, 0xDEAD_BEEF);
        let bits = id.to_bits();
        assert_eq!(ObjectId::from_bits(bits), id);
        assert_eq!(ObjectId::from_bits(bits).generation(), 0xDEAD_BEEF);
    }

    #[test]
    fn test_object_ids_differ_by_generation() {
        let old = ObjectId::new(3, 1);
        let new = ObjectId::new(3, 2);
        assert_ne!(old, new);
        assert_eq!(old.index(), new.index());
    }

    #[test]
    fn test_thread_id_display() {
        let display = format!("{}", ThreadId::from_raw(4));
        assert!(display.starts_with("Thread("));
    }

    #[test]
    fn test_ids_serialize() {
        let id = ObjectId::new(1, 2);
        let json = serde_json::to_string(&id).unwrap();
        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
