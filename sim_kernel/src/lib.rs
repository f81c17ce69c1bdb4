//! # Simulated Kernel
//!
//! This crate implements the guest kernel's synchronization layer.
//!
//! ## Purpose
//!
//! The simulated kernel owns every synchronizable object a guest can reach
//! through a handle, and decides when parked guest threads resume:
//! - Runs under `cargo test`
//! - Deterministic (time is the emulated cycle counter, no host threads)
//! - Inspectable (object and thread state is queryable for tests)
//!
//! ## Philosophy
//!
//! **One timeline, one owner.**
//!
//! All state is mutated through `&mut SimulatedKernel`. Deferred work (delayed
//! event signals, timer fires, wait timeouts) is queued on [`CoreTiming`] and
//! runs when the emulation loop advances the clock. Scheduled callbacks carry
//! generational object ids, so work queued for an object that has since been
//! destroyed does nothing.
//!
//! ## Wakeup
//!
//! When an object becomes available the kernel repeatedly picks a parked
//! thread whose wait is now satisfied, acquires on its behalf and resumes it,
//! until no remaining waiter can proceed. Among several candidates it prefers
//! the most urgent priority, then the earliest waiter. Callers must not rely
//! on which waiter wins.

pub mod core_timing;
pub mod errors;
pub mod event;
pub mod handle_table;
pub mod mutex;
pub mod object_table;
pub mod semaphore;
pub mod test_utils;
pub mod thread;
pub mod timer;
pub mod wait_object;

pub use core_timing::{CoreTiming, EventTypeId};
pub use thread::{ThreadState, LOWEST_PRIORITY};
pub use wait_object::{KernelObject, WaitObject, WaiterList};

use core_types::{Handle, ObjectId, ResultCode, ResultVal, ThreadId};
use errors::{wait_result, ERR_INVALID_HANDLE, ERR_INVALID_THREAD_STATE, ERR_OUT_OF_RANGE};
use event::Event;
use handle_table::HandleTable;
use kernel_api::{Duration, KernelConfig, ResetType, SyncKernel, WaitOutcome};
use mutex::Mutex;
use object_table::ObjectTable;
use semaphore::Semaphore;
use thread::ThreadTable;
use timer::Timer;

/// Simulated kernel state
pub struct SimulatedKernel {
    config: KernelConfig,
    timing: CoreTiming<SimulatedKernel>,
    objects: ObjectTable,
    handles: HandleTable,
    threads: ThreadTable,
    event_signal_type: EventTypeId,
    timer_fire_type: EventTypeId,
    thread_wakeup_type: EventTypeId,
}

impl SimulatedKernel {
    /// Creates a kernel with the default configuration
    pub fn new() -> Self {
        Self::with_config(KernelConfig::default())
    }

    pub fn with_config(config: KernelConfig) -> Self {
        let mut timing = CoreTiming::new();
        let event_signal_type = timing.register_event("EventCallback", event_signal_callback);
        let timer_fire_type = timing.register_event("TimerCallback", timer_fire_callback);
        let thread_wakeup_type =
            timing.register_event("ThreadWakeupCallback", thread_wakeup_callback);

        Self {
            handles: HandleTable::new(config.max_handles),
            config,
            timing,
            objects: ObjectTable::new(),
            threads: ThreadTable::new(),
            event_signal_type,
            timer_fire_type,
            thread_wakeup_type,
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Advances emulated time and runs every callback that fell due
    pub fn advance_cycles(&mut self, cycles: u64) {
        self.timing.advance(cycles);
        while let Some(fired) = self.timing.pop_due() {
            (fired.callback)(self, fired.user_data, fired.cycles_late);
        }
    }

    /// Advances emulated time by `us` microseconds
    pub fn advance_us(&mut self, us: u64) {
        let cycles = self.config.clock.us_to_cycles(us);
        self.advance_cycles(cycles);
    }

    /// Advances emulated time by `duration`
    pub fn advance(&mut self, duration: Duration) {
        let cycles = self.config.clock.ns_to_cycles(duration.as_nanos());
        self.advance_cycles(cycles);
    }

    pub fn now_cycles(&self) -> u64 {
        self.timing.now()
    }

    /// Number of callbacks still queued on the timing scheduler
    pub fn pending_timing_events(&self) -> usize {
        self.timing.pending_count()
    }

    // ---------------------------------------------------------------------
    // Threads
    // ---------------------------------------------------------------------

    /// Registers a guest thread context
    pub fn create_thread(&mut self, name: &str, priority: u32) -> ResultVal<ThreadId> {
        if priority > LOWEST_PRIORITY {
            return Err(ERR_OUT_OF_RANGE);
        }
        let id = self.threads.create(name, priority);
        tracing::debug!(thread = id.raw(), name, priority, "created guest thread");
        Ok(id)
    }

    pub fn thread_state(&self, thread: ThreadId) -> Option<ThreadState> {
        self.threads.get(thread).map(|guest| guest.state)
    }

    /// Collects the outcome of a wait that parked `thread`
    ///
    /// Returns `None` while the thread is still parked, or if the outcome was
    /// already taken.
    pub fn take_wait_outcome(&mut self, thread: ThreadId) -> Option<WaitOutcome> {
        self.threads
            .get_mut(thread)
            .and_then(|guest| guest.wait_outcome.take())
    }

    /// Collects the result word a resumed `thread` returns to the guest
    ///
    /// Consumes the outcome like [`SimulatedKernel::take_wait_outcome`].
    pub fn take_wait_result(&mut self, thread: ThreadId) -> Option<ResultCode> {
        self.take_wait_outcome(thread).and_then(wait_result)
    }

    /// Terminates a thread
    ///
    /// A pending wait is abandoned, and every mutex the thread still holds is
    /// freed and handed to its waiters.
    pub fn exit_thread(&mut self, thread: ThreadId) -> ResultVal<()> {
        let state = self.thread_state(thread).ok_or(ERR_INVALID_THREAD_STATE)?;
        if state == ThreadState::Dormant {
            return Err(ERR_INVALID_THREAD_STATE);
        }
        if state.is_waiting() {
            self.detach_waiter(thread);
        }
        if let Some(guest) = self.threads.get_mut(thread) {
            guest.state = ThreadState::Dormant;
            guest.wait_outcome = None;
        }

        let held: Vec<ObjectId> = self
            .objects
            .ids()
            .filter(|&id| {
                matches!(self.objects.get(id), Some(KernelObject::Mutex(mutex)) if mutex.holder() == Some(thread))
            })
            .collect();
        for id in held {
            if let Some(KernelObject::Mutex(mutex)) = self.objects.get_mut(id) {
                mutex.force_release();
            }
            self.wakeup_all_waiting_threads(id);
        }

        tracing::debug!(thread = thread.raw(), "guest thread exited");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------------

    /// Resolves a handle to the object it names
    pub fn object_id(&self, handle: Handle) -> ResultVal<ObjectId> {
        self.handles
            .get(handle)
            .filter(|&id| self.objects.contains(id))
            .ok_or(ERR_INVALID_HANDLE)
    }

    pub fn object(&self, handle: Handle) -> ResultVal<&KernelObject> {
        let id = self.object_id(handle)?;
        self.objects.get(id).ok_or(ERR_INVALID_HANDLE)
    }

    /// Signaled state of an event or timer
    pub fn is_signaled(&self, handle: Handle) -> ResultVal<bool> {
        match self.object(handle)? {
            KernelObject::Event(event) => Ok(event.is_signaled()),
            KernelObject::Timer(timer) => Ok(timer.is_signaled()),
            _ => Err(ERR_INVALID_HANDLE),
        }
    }

    /// Number of threads parked on the object behind `handle`
    pub fn waiter_count(&self, handle: Handle) -> ResultVal<usize> {
        Ok(self.object(handle)?.waiters().len())
    }

    /// Number of live kernel objects
    pub fn live_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn create_object(&mut self, object: KernelObject) -> ResultVal<Handle> {
        let kind = object.kind();
        let name = object.name().to_string();
        let id = self.objects.insert(object);
        match self.handles.create(id) {
            Ok(handle) => {
                tracing::debug!(kind, name = %name, handle = %handle, "created kernel object");
                Ok(handle)
            }
            Err(code) => {
                self.release_object(id);
                Err(code)
            }
        }
    }

    fn release_object(&mut self, id: ObjectId) {
        if let Some(object) = self.objects.release(id) {
            tracing::debug!(
                kind = object.kind(),
                name = object.name(),
                index = id.index(),
                "destroyed kernel object"
            );
        }
    }

    fn acquire(&mut self, thread: ThreadId, id: ObjectId) {
        if let Some(object) = self.objects.get_mut(id) {
            object.acquire(thread);
        }
    }

    fn is_available(&self, thread: ThreadId, id: ObjectId) -> bool {
        self.objects
            .get(id)
            .is_some_and(|object| !object.should_wait(thread))
    }

    fn all_available(&self, thread: ThreadId, ids: &[ObjectId]) -> bool {
        ids.iter().all(|&id| self.is_available(thread, id))
    }

    fn acquire_all(&mut self, thread: ThreadId, ids: &[ObjectId]) {
        let mut acquired: Vec<ObjectId> = Vec::with_capacity(ids.len());
        for &id in ids {
            if !acquired.contains(&id) {
                self.acquire(thread, id);
                acquired.push(id);
            }
        }
    }

    fn wait_satisfied(&self, thread: ThreadId, trigger: ObjectId) -> bool {
        let Some(guest) = self.threads.get(thread) else {
            return false;
        };
        match guest.state {
            ThreadState::WaitSyncAny => self.is_available(thread, trigger),
            ThreadState::WaitSyncAll => self.all_available(thread, &guest.wait_objects),
            ThreadState::Ready | ThreadState::Dormant => false,
        }
    }

    fn next_satisfiable_waiter(&self, id: ObjectId) -> Option<ThreadId> {
        let object = self.objects.get(id)?;
        object
            .waiters()
            .iter()
            .enumerate()
            .filter(|&(_, thread)| self.wait_satisfied(thread, id))
            .min_by_key(|&(position, thread)| {
                let priority = self
                    .threads
                    .get(thread)
                    .map_or(u32::MAX, |guest| guest.priority);
                (priority, position)
            })
            .map(|(_, thread)| thread)
    }

    /// Resumes every waiter of `id` that can now proceed
    pub fn wakeup_all_waiting_threads(&mut self, id: ObjectId) {
        while let Some(thread) = self.next_satisfiable_waiter(id) {
            self.resume_satisfied(thread, id);
        }
    }

    fn resume_satisfied(&mut self, thread: ThreadId, trigger: ObjectId) {
        let Some(guest) = self.threads.get(thread) else {
            return;
        };
        let outcome = match guest.state {
            ThreadState::WaitSyncAll => {
                let ids = guest.wait_objects.clone();
                self.acquire_all(thread, &ids);
                WaitOutcome::Acquired { index: None }
            }
            _ => {
                let index = guest.wait_index(trigger);
                self.acquire(thread, trigger);
                WaitOutcome::Acquired { index }
            }
        };
        self.resume(thread, outcome);
    }

    /// Takes `thread` off every waiter list and drops the references it held
    fn detach_waiter(&mut self, thread: ThreadId) {
        let Some(guest) = self.threads.get_mut(thread) else {
            return;
        };
        let waited = std::mem::take(&mut guest.wait_objects);
        self.timing
            .unschedule_event(self.thread_wakeup_type, u64::from(thread.raw()));
        for id in waited {
            if let Some(object) = self.objects.get_mut(id) {
                object.waiters_mut().remove(thread);
            }
            self.release_object(id);
        }
    }

    fn resume(&mut self, thread: ThreadId, outcome: WaitOutcome) {
        self.detach_waiter(thread);
        if let Some(guest) = self.threads.get_mut(thread) {
            guest.state = ThreadState::Ready;
            guest.wait_outcome = Some(outcome);
        }
        tracing::trace!(
            thread = thread.raw(),
            ?outcome,
            result = wait_result(outcome).map(|code| code.raw()),
            "guest thread resumed"
        );
    }

    fn wait_objects(
        &mut self,
        thread: ThreadId,
        handles: &[Handle],
        wait_all: bool,
        timeout: Option<Duration>,
    ) -> ResultVal<WaitOutcome> {
        if self.thread_state(thread) != Some(ThreadState::Ready) {
            return Err(ERR_INVALID_THREAD_STATE);
        }
        if handles.is_empty() {
            return Err(ERR_OUT_OF_RANGE);
        }
        let ids = handles
            .iter()
            .map(|&handle| self.object_id(handle))
            .collect::<ResultVal<Vec<ObjectId>>>()?;

        if wait_all {
            if self.all_available(thread, &ids) {
                self.acquire_all(thread, &ids);
                return Ok(WaitOutcome::Acquired { index: None });
            }
        } else if let Some(index) = ids.iter().position(|&id| self.is_available(thread, id)) {
            self.acquire(thread, ids[index]);
            return Ok(WaitOutcome::Acquired { index: Some(index) });
        }

        if timeout.is_some_and(|timeout| timeout.is_zero()) {
            tracing::trace!(thread = thread.raw(), "wait polled without success");
            return Ok(WaitOutcome::TimedOut);
        }

        for &id in &ids {
            self.objects.retain(id);
            if let Some(object) = self.objects.get_mut(id) {
                object.waiters_mut().add(thread);
            }
        }
        if let Some(guest) = self.threads.get_mut(thread) {
            guest.state = if wait_all {
                ThreadState::WaitSyncAll
            } else {
                ThreadState::WaitSyncAny
            };
            guest.wait_objects = ids;
            guest.wait_outcome = None;
        }
        if let Some(timeout) = timeout {
            let cycles = self.config.clock.ns_to_cycles(timeout.as_nanos());
            self.timing
                .schedule_event(cycles, self.thread_wakeup_type, u64::from(thread.raw()));
        }

        tracing::trace!(thread = thread.raw(), wait_all, "guest thread parked");
        Ok(WaitOutcome::Blocked)
    }
}

impl Default for SimulatedKernel {
    fn default() -> Self {
        Self::new()
    }
}

fn event_signal_callback(kernel: &mut SimulatedKernel, user_data: u64, _cycles_late: u64) {
    let id = ObjectId::from_bits(user_data);
    let Some(KernelObject::Event(event)) = kernel.objects.get_mut(id) else {
        tracing::trace!(
            index = id.index(),
            generation = id.generation(),
            "deferred signal for destroyed event ignored"
        );
        return;
    };
    event.signal();
    kernel.wakeup_all_waiting_threads(id);
}

fn timer_fire_callback(kernel: &mut SimulatedKernel, user_data: u64, cycles_late: u64) {
    let id = ObjectId::from_bits(user_data);
    let Some(KernelObject::Timer(timer)) = kernel.objects.get_mut(id) else {
        tracing::trace!(
            index = id.index(),
            generation = id.generation(),
            "fire for destroyed timer ignored"
        );
        return;
    };
    timer.signal();
    let interval = timer.interval();

    if !interval.is_zero() {
        let period = kernel.config.clock.ns_to_cycles(interval.as_nanos()).max(1);
        kernel.timing.schedule_event(
            period.saturating_sub(cycles_late),
            kernel.timer_fire_type,
            user_data,
        );
    }
    kernel.wakeup_all_waiting_threads(id);
}

fn thread_wakeup_callback(kernel: &mut SimulatedKernel, user_data: u64, _cycles_late: u64) {
    let thread = ThreadId::from_raw(user_data as u32);
    if !kernel
        .thread_state(thread)
        .is_some_and(|state| state.is_waiting())
    {
        return;
    }
    tracing::trace!(thread = thread.raw(), "wait timed out");
    kernel.resume(thread, WaitOutcome::TimedOut);
}

impl SyncKernel for SimulatedKernel {
    fn create_event(&mut self, reset_type: ResetType, name: &str) -> ResultVal<Handle> {
        self.create_object(KernelObject::Event(Event::new(reset_type, name)))
    }

    fn create_mutex(&mut self, owner: Option<ThreadId>, name: &str) -> ResultVal<Handle> {
        self.create_object(KernelObject::Mutex(Mutex::new(owner, name)))
    }

    fn create_semaphore(&mut self, initial: u32, max: u32, name: &str) -> ResultVal<Handle> {
        if initial > max {
            return Err(ERR_OUT_OF_RANGE);
        }
        self.create_object(KernelObject::Semaphore(Semaphore::new(initial, max, name)))
    }

    fn create_timer(&mut self, reset_type: ResetType, name: &str) -> ResultVal<Handle> {
        self.create_object(KernelObject::Timer(Timer::new(reset_type, name)))
    }

    fn signal_event(&mut self, handle: Handle, delay_us: u64) -> ResultVal<()> {
        let id = self.object_id(handle)?;
        let Some(KernelObject::Event(event)) = self.objects.get_mut(id) else {
            return Err(ERR_INVALID_HANDLE);
        };

        if delay_us == 0 {
            event.signal();
            self.wakeup_all_waiting_threads(id);
        } else {
            let cycles = self.config.clock.us_to_cycles(delay_us);
            self.timing
                .schedule_event(cycles, self.event_signal_type, id.to_bits());
        }
        Ok(())
    }

    fn clear_event(&mut self, handle: Handle) -> ResultVal<()> {
        let id = self.object_id(handle)?;
        match self.objects.get_mut(id) {
            Some(KernelObject::Event(event)) => {
                event.clear();
                Ok(())
            }
            _ => Err(ERR_INVALID_HANDLE),
        }
    }

    fn release_mutex(&mut self, thread: ThreadId, handle: Handle) -> ResultVal<()> {
        let id = self.object_id(handle)?;
        let freed = match self.objects.get_mut(id) {
            Some(KernelObject::Mutex(mutex)) => mutex.release(thread)?,
            _ => return Err(ERR_INVALID_HANDLE),
        };
        if freed {
            self.wakeup_all_waiting_threads(id);
        }
        Ok(())
    }

    fn release_semaphore(&mut self, handle: Handle, count: u32) -> ResultVal<u32> {
        let id = self.object_id(handle)?;
        let previous = match self.objects.get_mut(id) {
            Some(KernelObject::Semaphore(semaphore)) => semaphore.release(count)?,
            _ => return Err(ERR_INVALID_HANDLE),
        };
        self.wakeup_all_waiting_threads(id);
        Ok(previous)
    }

    fn set_timer(&mut self, handle: Handle, initial: Duration, interval: Duration) -> ResultVal<()> {
        let id = self.object_id(handle)?;
        let Some(KernelObject::Timer(timer)) = self.objects.get_mut(id) else {
            return Err(ERR_INVALID_HANDLE);
        };
        timer.set(initial, interval);
        self.timing.unschedule_event(self.timer_fire_type, id.to_bits());

        if initial.is_zero() {
            timer_fire_callback(self, id.to_bits(), 0);
        } else {
            let cycles = self.config.clock.ns_to_cycles(initial.as_nanos());
            self.timing
                .schedule_event(cycles, self.timer_fire_type, id.to_bits());
        }
        Ok(())
    }

    fn cancel_timer(&mut self, handle: Handle) -> ResultVal<()> {
        let id = self.object_id(handle)?;
        if !matches!(self.objects.get(id), Some(KernelObject::Timer(_))) {
            return Err(ERR_INVALID_HANDLE);
        }
        self.timing.unschedule_event(self.timer_fire_type, id.to_bits());
        Ok(())
    }

    fn clear_timer(&mut self, handle: Handle) -> ResultVal<()> {
        let id = self.object_id(handle)?;
        match self.objects.get_mut(id) {
            Some(KernelObject::Timer(timer)) => {
                timer.clear();
                Ok(())
            }
            _ => Err(ERR_INVALID_HANDLE),
        }
    }

    fn wait_synchronization_1(
        &mut self,
        thread: ThreadId,
        handle: Handle,
        timeout: Option<Duration>,
    ) -> ResultVal<WaitOutcome> {
        self.wait_objects(thread, &[handle], false, timeout)
    }

    fn wait_synchronization_n(
        &mut self,
        thread: ThreadId,
        handles: &[Handle],
        wait_all: bool,
        timeout: Option<Duration>,
    ) -> ResultVal<WaitOutcome> {
        self.wait_objects(thread, handles, wait_all, timeout)
    }

    fn duplicate_handle(&mut self, handle: Handle) -> ResultVal<Handle> {
        let (copy, id) = self.handles.duplicate(handle)?;
        self.objects.retain(id);
        Ok(copy)
    }

    fn close_handle(&mut self, handle: Handle) -> ResultVal<()> {
        let id = self.handles.close(handle)?;
        self.release_object(id);
        Ok(())
    }
}
