//! # Kernel API
//!
//! This crate defines the interface between service shims and the emulated
//! guest kernel.
//!
//! ## Philosophy
//!
//! The kernel provides **synchronization mechanisms**, not service policy:
//! - Object creation (events, mutexes, semaphores, timers)
//! - Signal delivery, immediate or deferred on the emulated clock
//! - Waits that either complete at once or park the calling guest thread
//! - Handle duplication and release
//!
//! ## Design Goals
//!
//! 1. **Testability**: Services can be driven against any [`SyncKernel`]
//! 2. **Explicit time**: Delays are converted to emulated CPU cycles, never
//!    host time
//! 3. **Typed arguments**: Service shims decode their command buffers;
//!    nothing in this API parses buffer layouts
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A CPU emulator
//! - A command-buffer decoder
//! - A host threading abstraction (guest threads are bookkeeping only)

pub mod config;
pub mod error;
pub mod kernel;
pub mod time;

pub use config::KernelConfig;
pub use error::KernelError;
pub use kernel::{ResetType, SyncKernel, WaitOutcome};
pub use time::{ClockRate, Duration, BASE_CLOCK_RATE_ARM11};
