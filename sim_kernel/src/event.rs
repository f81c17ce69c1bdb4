//! # Event
//!
//! Binary signal object. Signaled events satisfy waits; the reset type
//! decides whether acquiring one consumes the signal.

use crate::wait_object::{WaitObject, WaiterList};
use core_types::ThreadId;
use kernel_api::ResetType;

#[derive(Debug)]
pub struct Event {
    name: String,
    reset_type: ResetType,
    signaled: bool,
    waiters: WaiterList,
}

impl Event {
    /// Creates a non-signaled event
    pub fn new(reset_type: ResetType, name: &str) -> Self {
        Self {
            name: name.to_string(),
            reset_type,
            signaled: false,
            waiters: WaiterList::new(),
        }
    }

    pub fn reset_type(&self) -> ResetType {
        self.reset_type
    }

    pub fn is_signaled(&self) -> bool {
        self.signaled
    }

    /// Raises the signal. Waking waiters is the kernel's job.
    pub fn signal(&mut self) {
        self.signaled = true;
    }

    /// Drops the signal without waking anyone
    pub fn clear(&mut self) {
        self.signaled = false;
    }
}

impl WaitObject for Event {
    fn name(&self) -> &str {
        &self.name
    }

    fn should_wait(&self, _thread: ThreadId) -> bool {
        !self.signaled
    }

    fn acquire(&mut self, thread: ThreadId) {
        assert!(!self.should_wait(thread), "object unavailable");
        if self.reset_type.consumes_on_acquire() {
            self.signaled = false;
        }
    }

    fn waiters(&self) -> &WaiterList {
        &self.waiters
    }

    fn waiters_mut(&mut self) -> &mut WaiterList {
        &mut self.waiters
    }
}
