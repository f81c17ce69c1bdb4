//! Kernel error types
//!
//! These are host-side failures (bad configuration, construction errors).
//! Guest-visible failures are reported as [`core_types::ResultCode`].

use thiserror::Error;

/// Errors that can occur when configuring or constructing the kernel
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KernelError {
    /// Configuration could not be parsed or is out of range
    #[error("Invalid kernel configuration: {0}")]
    InvalidConfig(String),

    /// Clock rate of zero cycles per second
    #[error("Clock rate must be non-zero")]
    ZeroClockRate,
}
