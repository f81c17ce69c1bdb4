//! Synchronization kernel trait and shared object types

use crate::Duration;
use core_types::{Handle, ResultVal, ThreadId};
use serde::{Deserialize, Serialize};

/// Reset policy of an event or timer
///
/// `Sticky` behaves like a manual-reset event: once signaled it stays
/// signaled for every waiter until cleared. `OneShot` and `Pulse` behave like
/// auto-reset events: the waiter that acquires the object consumes the
/// signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ResetType {
    OneShot = 0,
    Sticky = 1,
    Pulse = 2,
}

impl ResetType {
    /// Decodes a guest reset-type word
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(ResetType::OneShot),
            1 => Some(ResetType::Sticky),
            2 => Some(ResetType::Pulse),
            _ => None,
        }
    }

    /// Returns true if acquiring the object consumes its signal
    pub fn consumes_on_acquire(&self) -> bool {
        !matches!(self, ResetType::Sticky)
    }
}

/// What a wait call did for the calling thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitOutcome {
    /// The wait was satisfied and the object(s) acquired.
    ///
    /// `index` is the position of the satisfying handle for wait-any calls
    /// and `None` for wait-all calls.
    Acquired { index: Option<usize> },
    /// The timeout elapsed before the wait was satisfied
    TimedOut,
    /// The thread is parked; its outcome is delivered when it resumes
    Blocked,
}

/// The kernel surface consumed by service shims and the supervisor-call layer
///
/// Every operation takes plain typed arguments. Handles that do not resolve,
/// or resolve to the wrong kind of object, produce an invalid-handle result.
pub trait SyncKernel {
    /// Creates an event in the non-signaled state
    fn create_event(&mut self, reset_type: ResetType, name: &str) -> ResultVal<Handle>;

    /// Creates a mutex, locked by `owner` when one is given
    fn create_mutex(&mut self, owner: Option<ThreadId>, name: &str) -> ResultVal<Handle>;

    /// Creates a semaphore with `initial` of `max` slots available
    fn create_semaphore(&mut self, initial: u32, max: u32, name: &str) -> ResultVal<Handle>;

    /// Creates a timer in the non-signaled, unarmed state
    fn create_timer(&mut self, reset_type: ResetType, name: &str) -> ResultVal<Handle>;

    /// Signals an event now (`delay_us == 0`) or after `delay_us` microseconds
    /// of emulated time
    fn signal_event(&mut self, handle: Handle, delay_us: u64) -> ResultVal<()>;

    /// Forces an event to the non-signaled state without waking anyone
    fn clear_event(&mut self, handle: Handle) -> ResultVal<()>;

    /// Releases one level of a mutex held by `thread`
    fn release_mutex(&mut self, thread: ThreadId, handle: Handle) -> ResultVal<()>;

    /// Returns `count` slots to a semaphore, yielding the previous count
    fn release_semaphore(&mut self, handle: Handle, count: u32) -> ResultVal<u32>;

    /// Arms a timer; an `interval` of zero fires once
    fn set_timer(&mut self, handle: Handle, initial: Duration, interval: Duration)
        -> ResultVal<()>;

    /// Disarms a timer without changing its signaled state
    fn cancel_timer(&mut self, handle: Handle) -> ResultVal<()>;

    /// Forces a timer to the non-signaled state
    fn clear_timer(&mut self, handle: Handle) -> ResultVal<()>;

    /// Waits on a single object
    fn wait_synchronization_1(
        &mut self,
        thread: ThreadId,
        handle: Handle,
        timeout: Option<Duration>,
    ) -> ResultVal<WaitOutcome>;

    /// Waits on several objects, for any one of them or for all of them
    fn wait_synchronization_n(
        &mut self,
        thread: ThreadId,
        handles: &[Handle],
        wait_all: bool,
        timeout: Option<Duration>,
    ) -> ResultVal<WaitOutcome>;

    /// Creates a second handle to the same object
    fn duplicate_handle(&mut self, handle: Handle) -> ResultVal<Handle>;

    /// Releases a handle; the object is destroyed with its last reference
    fn close_handle(&mut self, handle: Handle) -> ResultVal<()>;
}
