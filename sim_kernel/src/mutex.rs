//! # Mutex
//!
//! Recursive lock owned by a guest thread.

use crate::errors::ERR_NOT_MUTEX_OWNER;
use crate::wait_object::{WaitObject, WaiterList};
use core_types::{ResultVal, ThreadId};

#[derive(Debug)]
pub struct Mutex {
    name: String,
    lock_count: u32,
    holding_thread: Option<ThreadId>,
    waiters: WaiterList,
}

impl Mutex {
    /// Creates a mutex, already locked once by `owner` if given
    pub fn new(owner: Option<ThreadId>, name: &str) -> Self {
        Self {
            name: name.to_string(),
            lock_count: u32::from(owner.is_some()),
            holding_thread: owner,
            waiters: WaiterList::new(),
        }
    }

    pub fn holder(&self) -> Option<ThreadId> {
        self.holding_thread
    }

    pub fn lock_count(&self) -> u32 {
        self.lock_count
    }

    /// Drops one level of recursion held by `thread`
    ///
    /// Returns true when the mutex became free.
    pub fn release(&mut self, thread: ThreadId) -> ResultVal<bool> {
        if self.holding_thread != Some(thread) {
            return Err(ERR_NOT_MUTEX_OWNER);
        }
        self.lock_count -= 1;
        if self.lock_count == 0 {
            self.holding_thread = None;
            return Ok(true);
        }
        Ok(false)
    }

    /// Frees the mutex regardless of recursion depth (holder exited)
    pub fn force_release(&mut self) {
        self.lock_count = 0;
        self.holding_thread = None;
    }
}

impl WaitObject for Mutex {
    fn name(&self) -> &str {
        &self.name
    }

    fn should_wait(&self, thread: ThreadId) -> bool {
        self.lock_count > 0 && self.holding_thread != Some(thread)
    }

    fn acquire(&mut self, thread: ThreadId) {
        assert!(!self.should_wait(thread), "object unavailable");
        self.holding_thread = Some(thread);
        self.lock_count += 1;
    }

    fn waiters(&self) -> &WaiterList {
        &self.waiters
    }

    fn waiters_mut(&mut self) -> &mut WaiterList {
        &mut self.waiters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ThreadId = ThreadId::from_raw(1);
    const B: ThreadId = ThreadId::from_raw(2);

    #[test]
    fn test_free_mutex_is_available_to_all() {
        let mutex = Mutex::new(None, "m");
        assert!(!mutex.should_wait(A));
        assert!(!mutex.should_wait(B));
    }

    #[test]
    fn test_initial_owner() {
        let mutex = Mutex::new(Some(A), "m");
        assert_eq!(mutex.holder(), Some(A));
        assert_eq!(mutex.lock_count(), 1);
        assert!(!mutex.should_wait(A));
        assert!(mutex.should_wait(B));
    }

    #[test]
    fn test_recursion() {
        let mut mutex = Mutex::new(None, "m");
        mutex.acquire(A);
        mutex.acquire(A);
        assert_eq!(mutex.release(A), Ok(false));
        assert!(mutex.should_wait(B));
        assert_eq!(mutex.release(A), Ok(true));
        assert!(!mutex.should_wait(B));
        assert_eq!(mutex.holder(), None);
    }

    #[test]
    fn test_release_by_non_owner_fails() {
        let mut mutex = Mutex::new(Some(A), "m");
        assert_eq!(mutex.release(B), Err(ERR_NOT_MUTEX_OWNER));
        assert_eq!(mutex.lock_count(), 1);
    }

    #[test]
    fn test_force_release() {
        let mut mutex = Mutex::new(Some(A), "m");
        mutex.acquire(A);
        mutex.force_release();
        assert!(!mutex.should_wait(B));
    }
}
