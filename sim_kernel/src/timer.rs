//! # Timer
//!
//! Signal object driven by the emulated clock.
//!
//! The timer itself only stores its delays and signaled state. Arming,
//! re-arming and cancelling are done by the kernel through the timing
//! scheduler, keyed by the timer's generational id, so a timer destroyed
//! while armed simply never fires.

use crate::wait_object::{WaitObject, WaiterList};
use core_types::ThreadId;
use kernel_api::{Duration, ResetType};

#[derive(Debug)]
pub struct Timer {
    name: String,
    reset_type: ResetType,
    signaled: bool,
    initial_delay: Duration,
    interval_delay: Duration,
    waiters: WaiterList,
}

impl Timer {
    /// Creates an unarmed, non-signaled timer
    pub fn new(reset_type: ResetType, name: &str) -> Self {
        Self {
            name: name.to_string(),
            reset_type,
            signaled: false,
            initial_delay: Duration::ZERO,
            interval_delay: Duration::ZERO,
            waiters: WaiterList::new(),
        }
    }

    pub fn reset_type(&self) -> ResetType {
        self.reset_type
    }

    pub fn is_signaled(&self) -> bool {
        self.signaled
    }

    /// Records the delays of the next arming
    pub fn set(&mut self, initial: Duration, interval: Duration) {
        self.initial_delay = initial;
        self.interval_delay = interval;
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Period between fires; zero for a one-off timer
    pub fn interval(&self) -> Duration {
        self.interval_delay
    }

    pub fn signal(&mut self) {
        self.signaled = true;
    }

    pub fn clear(&mut self) {
        self.signaled = false;
    }
}

impl WaitObject for Timer {
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

#[cfg(test)]
mod tests {
    use super::*;

    const T: ThreadId = ThreadId::from_raw(1);

    #[test]
    fn test_new_timer_is_unarmed() {
        let timer = Timer::new(ResetType::OneShot, "t");
        assert!(timer.should_wait(T));
        assert!(timer.interval().is_zero());
    }

    #[test]
    fn test_set_records_delays() {
        let mut timer = Timer::new(ResetType::OneShot, "t");
        timer.set(Duration::from_millis(5), Duration::from_millis(10));
        assert_eq!(timer.initial_delay(), Duration::from_millis(5));
        assert_eq!(timer.interval(), Duration::from_millis(10));
    }

    #[test]
    fn test_acquire_follows_reset_type() {
        let mut one_shot = Timer::new(ResetType::OneShot, "t");
        one_shot.signal();
        one_shot.acquire(T);
        assert!(!one_shot.is_signaled());

        let mut sticky = Timer::new(ResetType::Sticky, "t");
        sticky.signal();
        sticky.acquire(T);
        assert!(sticky.is_signaled());
    }
}
