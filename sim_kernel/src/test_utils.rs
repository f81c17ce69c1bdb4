//! Test utilities
//!
//! Helpers shared by the unit tests, the integration tests and downstream
//! crates that drive a [`SimulatedKernel`] in their own tests.

use crate::{SimulatedKernel, ThreadState};
use core_types::ThreadId;
use kernel_api::WaitOutcome;

/// Installs a fmt subscriber that writes through the test harness
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// Creates a kernel with one thread per `(name, priority)` pair
///
/// # Panics
///
/// Panics if a priority is out of range.
pub fn kernel_with_threads(threads: &[(&str, u32)]) -> (SimulatedKernel, Vec<ThreadId>) {
    let mut kernel = SimulatedKernel::new();
    let ids = threads
        .iter()
        .map(|&(name, priority)| {
            kernel
                .create_thread(name, priority)
                .unwrap_or_else(|code| panic!("create_thread({name}) failed: {code}"))
        })
        .collect();
    (kernel, ids)
}

/// Asserts that `thread` resumed with `expected` and consumes the outcome
///
/// # Panics
///
/// Panics if the thread is not ready or resumed with a different outcome.
pub fn assert_resumed(kernel: &mut SimulatedKernel, thread: ThreadId, expected: WaitOutcome) {
    assert_eq!(
        kernel.thread_state(thread),
        Some(ThreadState::Ready),
        "thread {} is not ready",
        thread.raw()
    );
    assert_eq!(kernel.take_wait_outcome(thread), Some(expected));
}

/// Asserts that `thread` is still parked
///
/// # Panics
///
/// Panics if the thread is not waiting.
pub fn assert_parked(kernel: &SimulatedKernel, thread: ThreadId) {
    let state = kernel.thread_state(thread);
    assert!(
        state.is_some_and(|state| state.is_waiting()),
        "thread {} expected parked, found {:?}",
        thread.raw(),
        state
    );
}
