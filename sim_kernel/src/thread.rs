//! # Guest Threads
//!
//! Bookkeeping for guest thread contexts.
//!
//! ## Philosophy
//!
//! - **Bookkeeping, not execution**: a guest thread is a record of what the
//!   thread is waiting for. No host thread ever runs it.
//! - **Single timeline**: state changes only through `&mut SimulatedKernel`.
//!
//! ## Design
//!
//! - Lower priority values are more urgent (0 is highest, 63 lowest).
//! - A parked thread lists the objects it waits on in call order. The
//!   position of the satisfying object is reported back for wait-any calls.
//! - The outcome of a parked wait is stored on the thread and collected by
//!   the caller after it resumes.

use core_types::{ObjectId, ThreadId};
use kernel_api::WaitOutcome;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lowest permitted priority (highest numeric value)
pub const LOWEST_PRIORITY: u32 = 63;

/// Thread state in the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadState {
    /// Runnable; not parked on anything
    Ready,
    /// Parked until any one of its objects is available
    WaitSyncAny,
    /// Parked until all of its objects are available at once
    WaitSyncAll,
    /// Exited
    Dormant,
}

impl ThreadState {
    pub fn is_waiting(&self) -> bool {
        matches!(self, ThreadState::WaitSyncAny | ThreadState::WaitSyncAll)
    }
}

#[derive(Debug, Clone)]
pub struct GuestThread {
    pub id: ThreadId,
    pub name: String,
    pub priority: u32,
    pub state: ThreadState,
    /// Objects the thread is parked on, in call order
    pub wait_objects: Vec<ObjectId>,
    /// Result of the last parked wait, set on resume
    pub wait_outcome: Option<WaitOutcome>,
}

impl GuestThread {
    fn new(id: ThreadId, name: &str, priority: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            priority,
            state: ThreadState::Ready,
            wait_objects: Vec::new(),
            wait_outcome: None,
        }
    }

    /// Position of `object` in the wait list
    pub fn wait_index(&self, object: ObjectId) -> Option<usize> {
        self.wait_objects.iter().position(|&waited| waited == object)
    }
}

/// Table of every guest thread the kernel knows about
#[derive(Debug)]
pub struct ThreadTable {
    threads: BTreeMap<ThreadId, GuestThread>,
    next_id: u32,
}

impl ThreadTable {
    pub fn new() -> Self {
        Self {
            threads: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn create(&mut self, name: &str, priority: u32) -> ThreadId {
        let id = ThreadId::from_raw(self.next_id);
        self.next_id += 1;
        self.threads.insert(id, GuestThread::new(id, name, priority));
        id
    }

    pub fn get(&self, id: ThreadId) -> Option<&GuestThread> {
        self.threads.get(&id)
    }

    pub fn get_mut(&mut self, id: ThreadId) -> Option<&mut GuestThread> {
        self.threads.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}

impl Default for ThreadTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_ids_are_sequential() {
        let mut table = ThreadTable::new();
        let a = table.create("a", 30);
        let b = table.create("b", 30);
        assert_eq!(a.raw(), 1);
        assert_eq!(b.raw(), 2);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_new_thread_is_ready() {
        let mut table = ThreadTable::new();
        let id = table.create("main", 48);
        let thread = table.get(id).unwrap();
        assert_eq!(thread.state, ThreadState::Ready);
        assert_eq!(thread.priority, 48);
        assert!(thread.wait_objects.is_empty());
        assert!(thread.wait_outcome.is_none());
    }

    #[test]
    fn test_wait_index() {
        let mut table = ThreadTable::new();
        let id = table.create("main", 48);
        let thread = table.get_mut(id).unwrap();
        thread.wait_objects = vec![ObjectId::new(4, 0), ObjectId::new(7, 2)];
        assert_eq!(thread.wait_index(ObjectId::new(7, 2)), Some(1));
        assert_eq!(thread.wait_index(ObjectId::new(7, 3)), None);
    }

    #[test]
    fn test_waiting_states() {
        assert!(ThreadState::WaitSyncAny.is_waiting());
        assert!(ThreadState::WaitSyncAll.is_waiting());
        assert!(!ThreadState::Ready.is_waiting());
        assert!(!ThreadState::Dormant.is_waiting());
    }

    #[test]
    fn test_state_json_names() {
        let json = serde_json::to_string(&ThreadState::WaitSyncAll).unwrap();
        assert_eq!(json, "\"WaitSyncAll\"");
        let state: ThreadState = serde_json::from_str("\"Dormant\"").unwrap();
        assert_eq!(state, ThreadState::Dormant);
    }
}
