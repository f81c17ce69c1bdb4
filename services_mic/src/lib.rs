//! # Microphone Service
//!
//! High-level emulation of the guest's microphone service.
//!
//! ## Philosophy
//!
//! - **State per session**: everything the service remembers lives in a
//!   [`MicSession`]; there are no globals
//! - **Typed kernel access**: the shim talks to the kernel only through
//!   [`kernel_api::SyncKernel`], so any kernel implementation can host it
//! - **Honest stubs**: commands the service does not emulate reply with a
//!   not-implemented result instead of a fake success
//!
//! ## Command Buffer
//!
//! Requests arrive in a 64-word buffer. Word 0 is the request header and
//! parameters follow from word 1. On return word 0 holds the response header,
//! word 1 the raw result code, and outputs follow.

pub mod ipc;
pub mod service;
pub mod session;

pub use ipc::{make_header, CommandBuffer, Header, COMMAND_BUFFER_WORDS};
pub use service::{MicService, ERR_NOT_IMPLEMENTED, FUNCTION_TABLE};
pub use session::{MicSession, DEFAULT_GAIN};
