//! # Core Timing
//!
//! Cycle-driven scheduler for deferred kernel work.
//!
//! ## Philosophy
//!
//! **Deferred work runs on the emulated clock.**
//!
//! Nothing here consults host time. Time advances only when the emulation
//! loop calls [`CoreTiming::advance`], exactly like a CPU slice finishing. Any
//! callbacks that fell due during the slice then fire in time order, with the
//! number of cycles by which they were late.
//!
//! ## Design
//!
//! - Callbacks are registered once per kind and receive the owning context
//!   (`&mut C`), an opaque `u64` of user data, and their lateness in cycles.
//! - User data is never dereferenced by the scheduler. Owners pack
//!   generational ids into it so that a callback for a destroyed object is a
//!   no-op.
//! - Events due at the same cycle fire in scheduling order. Callers must not
//!   rely on that order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Callback invoked when a scheduled event fires
///
/// Arguments are the owning context, the user data given at scheduling time,
/// and how many cycles after its due time the event actually fired.
pub type TimedCallback<C> = fn(&mut C, u64, u64);

/// Registered event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventTypeId(usize);

struct EventType<C> {
    name: String,
    callback: TimedCallback<C>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct ScheduledEvent {
    fire_at: u64,
    sequence: u64,
    event_type: EventTypeId,
    user_data: u64,
}

/// A callback that fell due and must be run by the owner
pub struct FiredEvent<C> {
    pub callback: TimedCallback<C>,
    pub user_data: u64,
    pub cycles_late: u64,
}

/// Cycle-accurate timing scheduler
pub struct CoreTiming<C> {
    now: u64,
    next_sequence: u64,
    event_types: Vec<EventType<C>>,
    queue: BinaryHeap<Reverse<ScheduledEvent>>,
}

impl<C> CoreTiming<C> {
    /// Creates a scheduler at cycle 0 with no registered events
    pub fn new() -> Self {
        Self {
            now: 0,
            next_sequence: 0,
            event_types: Vec::new(),
            queue: BinaryHeap::new(),
        }
    }

    /// Registers a callback kind and returns its id
    pub fn register_event(&mut self, name: &str, callback: TimedCallback<C>) -> EventTypeId {
        let id = EventTypeId(self.event_types.len());
        self.event_types.push(EventType {
            name: name.to_string(),
            callback,
        });
        tracing::debug!(event_type = name, id = id.0, "registered timing event");
        id
    }

    /// Returns the name a callback kind was registered under
    pub fn event_name(&self, event_type: EventTypeId) -> Option<&str> {
        self.event_types
            .get(event_type.0)
            .map(|entry| entry.name.as_str())
    }

    /// Schedules `event_type` to fire `delay_cycles` from now
    pub fn schedule_event(&mut self, delay_cycles: u64, event_type: EventTypeId, user_data: u64) {
        let fire_at = self.now.saturating_add(delay_cycles);
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        tracing::trace!(
            event_type = self.event_name(event_type).unwrap_or("?"),
            fire_at,
            user_data,
            "scheduled timing event"
        );
        self.queue.push(Reverse(ScheduledEvent {
            fire_at,
            sequence,
            event_type,
            user_data,
        }));
    }

    /// Removes every pending event of `event_type` carrying `user_data`
    ///
    /// Returns how many were removed.
    pub fn unschedule_event(&mut self, event_type: EventTypeId, user_data: u64) -> usize {
        let before = self.queue.len();
        self.queue.retain(|Reverse(event)| {
            !(event.event_type == event_type && event.user_data == user_data)
        });
        before - self.queue.len()
    }

    /// Returns true if an event of `event_type` with `user_data` is pending
    pub fn is_scheduled(&self, event_type: EventTypeId, user_data: u64) -> bool {
        self.queue
            .iter()
            .any(|Reverse(event)| event.event_type == event_type && event.user_data == user_data)
    }

    /// Advances the clock by `cycles`
    ///
    /// Due events are not run here; the owner drains them with
    /// [`CoreTiming::pop_due`] so callbacks can borrow the owner mutably.
    pub fn advance(&mut self, cycles: u64) {
        self.now = self.now.saturating_add(cycles);
    }

    /// Pops the earliest event due at or before the current cycle
    pub fn pop_due(&mut self) -> Option<FiredEvent<C>> {
        let Reverse(next) = *self.queue.peek()?;
        if next.fire_at > self.now {
            return None;
        }
        self.queue.pop();

        let Some(entry) = self.event_types.get(next.event_type.0) else {
            tracing::error!(id = next.event_type.0, "fired event of unregistered type");
            return self.pop_due();
        };

        Some(FiredEvent {
            callback: entry.callback,
            user_data: next.user_data,
            cycles_late: self.now - next.fire_at,
        })
    }

    /// Current cycle count
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Cycles until the next pending event, if any
    pub fn cycles_until_next(&self) -> Option<u64> {
        self.queue
            .peek()
            .map(|Reverse(event)| event.fire_at.saturating_sub(self.now))
    }

    /// Number of pending events
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }
}

impl<C> Default for CoreTiming<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        fired: Vec<(u64, u64)>,
    }

    fn record(ctx: &mut Recorder, user_data: u64, late: u64) {
        ctx.fired.push((user_data, late));
    }

    fn drain(timing: &mut CoreTiming<Recorder>, ctx: &mut Recorder) {
        while let Some(event) = timing.pop_due() {
            (event.callback)(ctx, event.user_data, event.cycles_late);
        }
    }

    #[test]
    fn test_new_timing_starts_at_zero() {
        let timing: CoreTiming<Recorder> = CoreTiming::new();
        assert_eq!(timing.now(), 0);
        assert_eq!(timing.pending_count(), 0);
        assert_eq!(timing.cycles_until_next(), None);
    }

    #[test]
    fn test_event_does_not_fire_early() {
        let mut timing = CoreTiming::new();
        let mut ctx = Recorder::default();
        let ty = timing.register_event("test", record);

        timing.schedule_event(100, ty, 1);
        timing.advance(99);
        drain(&mut timing, &mut ctx);
        assert!(ctx.fired.is_empty());

        timing.advance(1);
        drain(&mut timing, &mut ctx);
        assert_eq!(ctx.fired, vec![(1, 0)]);
    }

    #[test]
    fn test_lateness_reported() {
        let mut timing = CoreTiming::new();
        let mut ctx = Recorder::default();
        let ty = timing.register_event("test", record);

        timing.schedule_event(10, ty, 5);
        timing.advance(25);
        drain(&mut timing, &mut ctx);
        assert_eq!(ctx.fired, vec![(5, 15)]);
    }

    #[test]
    fn test_fires_in_time_order() {
        let mut timing = CoreTiming::new();
        let mut ctx = Recorder::default();
        let ty = timing.register_event("test", record);

        timing.schedule_event(30, ty, 3);
        timing.schedule_event(10, ty, 1);
        timing.schedule_event(20, ty, 2);
        timing.advance(30);
        drain(&mut timing, &mut ctx);

        let order: Vec<u64> = ctx.fired.iter().map(|(data, _)| *data).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_fires_exactly_once() {
        let mut timing = CoreTiming::new();
        let mut ctx = Recorder::default();
        let ty = timing.register_event("test", record);

        timing.schedule_event(5, ty, 9);
        timing.advance(5);
        drain(&mut timing, &mut ctx);
        timing.advance(100);
        drain(&mut timing, &mut ctx);
        assert_eq!(ctx.fired.len(), 1);
    }

    #[test]
    fn test_unschedule_matches_type_and_data() {
        let mut timing = CoreTiming::new();
        let mut ctx = Recorder::default();
        let a = timing.register_event("a", record);
        let b = timing.register_event("b", record);

        timing.schedule_event(5, a, 1);
        timing.schedule_event(5, b, 1);
        timing.schedule_event(5, a, 2);

        assert_eq!(timing.unschedule_event(a, 1), 1);
        assert!(!timing.is_scheduled(a, 1));
        assert!(timing.is_scheduled(b, 1));
        assert!(timing.is_scheduled(a, 2));

        timing.advance(5);
        drain(&mut timing, &mut ctx);
        assert_eq!(ctx.fired.len(), 2);
    }

    #[test]
    fn test_cycles_until_next() {
        let mut timing: CoreTiming<Recorder> = CoreTiming::new();
        let ty = timing.register_event("test", record);
        timing.schedule_event(50, ty, 0);
        timing.advance(20);
        assert_eq!(timing.cycles_until_next(), Some(30));
    }

    #[test]
    fn test_event_names() {
        let mut timing: CoreTiming<Recorder> = CoreTiming::new();
        let ty = timing.register_event("EventCallback", record);
        assert_eq!(timing.event_name(ty), Some("EventCallback"));
    }
}
