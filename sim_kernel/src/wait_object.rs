//! # Wait Objects
//!
//! Common contract of every kernel object a guest thread can wait on.
//!
//! A wait object has a name, a wait predicate evaluated per thread, and an
//! ordered list of the threads currently parked on it. Waiter lists hold
//! thread ids only; the thread table owns the threads.

use crate::event::Event;
use crate::mutex::Mutex;
use crate::semaphore::Semaphore;
use crate::timer::Timer;
use core_types::ThreadId;

/// Object a guest thread can block on
pub trait WaitObject {
    fn name(&self) -> &str;

    /// True if `thread` would have to block to acquire the object
    fn should_wait(&self, thread: ThreadId) -> bool;

    /// Takes the object on behalf of `thread`
    ///
    /// # Panics
    ///
    /// Panics if `should_wait(thread)` holds. Callers check the predicate
    /// first; acquiring an unavailable object is a kernel bug.
    fn acquire(&mut self, thread: ThreadId);

    fn waiters(&self) -> &WaiterList;

    fn waiters_mut(&mut self) -> &mut WaiterList;
}

/// Threads parked on one object, in the order they started waiting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaiterList {
    threads: Vec<ThreadId>,
}

impl WaiterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `thread` unless it is already waiting
    pub fn add(&mut self, thread: ThreadId) {
        if !self.threads.contains(&thread) {
            self.threads.push(thread);
        }
    }

    pub fn remove(&mut self, thread: ThreadId) {
        self.threads.retain(|&waiting| waiting != thread);
    }

    pub fn contains(&self, thread: ThreadId) -> bool {
        self.threads.contains(&thread)
    }

    pub fn iter(&self) -> impl Iterator<Item = ThreadId> + '_ {
        self.threads.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}

/// Closed set of kernel object kinds
#[derive(Debug)]
pub enum KernelObject {
    Event(Event),
    Mutex(Mutex),
    Semaphore(Semaphore),
    Timer(Timer),
}

impl KernelObject {
    /// Short kind name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            KernelObject::Event(_) => "event",
            KernelObject::Mutex(_) => "mutex",
            KernelObject::Semaphore(_) => "semaphore",
            KernelObject::Timer(_) => "timer",
        }
    }

    fn inner(&self) -> &dyn WaitObject {
        match self {
            KernelObject::Event(event) => event,
            KernelObject::Mutex(mutex) => mutex,
            KernelObject::Semaphore(semaphore) => semaphore,
            KernelObject::Timer(timer) => timer,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn WaitObject {
        match self {
            KernelObject::Event(event) => event,
            KernelObject::Mutex(mutex) => mutex,
            KernelObject::Semaphore(semaphore) => semaphore,
            KernelObject::Timer(timer) => timer,
        }
    }
}

impl WaitObject for KernelObject {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn should_wait(&self, thread: ThreadId) -> bool {
        self.inner().should_wait(thread)
    }

    fn acquire(&mut self, thread: ThreadId) {
        self.inner_mut().acquire(thread)
    }

    fn waiters(&self) -> &WaiterList {
        self.inner().waiters()
    }

    fn waiters_mut(&mut self) -> &mut WaiterList {
        self.inner_mut().waiters_mut()
    }
}
