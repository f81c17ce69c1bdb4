//! # Core Types
//!
//! This crate defines the fundamental types shared by the guest kernel layer
//! and the archive backends.
//!
//! ## Philosophy
//!
//! - **Identity is explicit**: objects are addressed through typed ids, never
//!   through raw pointers.
//! - **Stale ids are detectable**: object ids carry a generation, so an id that
//!   outlived its object resolves to nothing instead of to a new occupant.
//! - **Results are structured**: guest-visible failures carry module, summary,
//!   level and description, not sentinel integers.
//!
//! ## Key Types
//!
//! - [`Handle`]: Opaque guest-visible handle value
//! - [`ObjectId`]: Generational index of a kernel object
//! - [`ThreadId`]: Identifier of a guest thread context
//! - [`ResultCode`]: Structured guest result code

pub mod ids;
pub mod result;

pub use ids::{Handle, ObjectId, ThreadId};
pub use result::{
    ErrorDescription, ErrorLevel, ErrorModule, ErrorSummary, ResultCode, ResultVal,
    RESULT_SUCCESS,
};
