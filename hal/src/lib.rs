//! # Hardware Abstraction Layer (HAL)
//!
//! This crate defines the storage sources that archive backends read from.
//!
//! ## Philosophy
//!
//! **Container formats are abstracted behind a byte source.**
//!
//! Archive backends never open files themselves. They are handed a
//! [`RomSource`] that knows where its bytes live, whether they are encrypted,
//! and which counter seed decrypts them.
//!
//! ## Design Principles
//!
//! 1. **Read-only**: Sources expose seek and read, nothing that mutates
//! 2. **Shared**: One source backs every file opened from an archive
//! 3. **Testable**: [`MemoryRomSource`] stands in for a real container

pub mod rom_source;

pub use rom_source::{
    FileRomSource, MemoryRomSource, RomSource, RomSourceError, SharedRomSource, COUNTER_SIZE,
};
