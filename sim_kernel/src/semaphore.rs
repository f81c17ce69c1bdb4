//! # Semaphore
//!
//! Counting object. Each acquire takes one slot; releases return slots up to
//! the maximum.

use crate::errors::ERR_OUT_OF_RANGE;
use crate::wait_object::{WaitObject, WaiterList};
use core_types::{ResultVal, ThreadId};

#[derive(Debug)]
pub struct Semaphore {
    name: String,
    available_count: u32,
    max_count: u32,
    waiters: WaiterList,
}

impl Semaphore {
    /// Creates a semaphore; the kernel has already checked `initial <= max`
    pub fn new(initial: u32, max: u32, name: &str) -> Self {
        Self {
            name: name.to_string(),
            available_count: initial,
            max_count: max,
            waiters: WaiterList::new(),
        }
    }

    pub fn available_count(&self) -> u32 {
        self.available_count
    }

    pub fn max_count(&self) -> u32 {
        self.max_count
    }

    /// Returns `count` slots and yields the previous available count
    pub fn release(&mut self, count: u32) -> ResultVal<u32> {
        if self.max_count - self.available_count < count {
            return Err(ERR_OUT_OF_RANGE);
        }
        let previous = self.available_count;
        self.available_count += count;
        Ok(previous)
    }
}

impl WaitObject for Semaphore {
    fn name(&self) -> &str {
        &self.name
    }

    fn should_wait(&self, _thread: ThreadId) -> bool {
        self.available_count == 0
    }

    fn acquire(&mut self, thread: ThreadId) {
        assert!(!self.should_wait(thread), "object unavailable");
        self.available_count -= 1;
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

    const T: ThreadId = ThreadId::from_raw(1);

    #[test]
    fn test_acquire_decrements() {
        let mut sem = Semaphore::new(2, 2, "s");
        sem.acquire(T);
        sem.acquire(T);
        assert!(sem.should_wait(T));
    }

    #[test]
    fn test_release_returns_previous_count() {
        let mut sem = Semaphore::new(0, 5, "s");
        assert_eq!(sem.release(3), Ok(0));
        assert_eq!(sem.release(2), Ok(3));
        assert_eq!(sem.available_count(), 5);
    }

    #[test]
    fn test_over_release_fails_without_change() {
        let mut sem = Semaphore::new(4, 5, "s");
        assert_eq!(sem.release(2), Err(ERR_OUT_OF_RANGE));
        assert_eq!(sem.available_count(), 4);
    }
}
