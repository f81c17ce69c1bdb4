//! Structured guest result codes
//!
//! Every guest-visible operation that can fail reports a [`ResultCode`]. The
//! code packs into a single 32-bit word for the command buffer:
//!
//! ```text
//!  31    27 26    21 20  18 17      10 9          0
//! +--------+--------+------+----------+------------+
//! | level  | summary| resv | module   | description|
//! +--------+--------+------+----------+------------+
//! ```
//!
//! Codes whose packed value is non-negative as an `i32` count as success;
//! informational results such as a wait timeout therefore do not register as
//! failures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Description field of a result code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ErrorDescription {
    Success = 0,
    InvalidSection = 1000,
    TooLarge = 1001,
    NotAuthorized = 1002,
    AlreadyDone = 1003,
    InvalidSize = 1004,
    InvalidEnumValue = 1005,
    InvalidCombination = 1006,
    NoData = 1007,
    Busy = 1008,
    MisalignedAddress = 1009,
    MisalignedSize = 1010,
    OutOfMemory = 1011,
    NotImplemented = 1012,
    InvalidAddress = 1013,
    InvalidPointer = 1014,
    InvalidHandle = 1015,
    NotInitialized = 1016,
    AlreadyInitialized = 1017,
    NotFound = 1018,
    CancelRequested = 1019,
    AlreadyExists = 1020,
    OutOfRange = 1021,
    Timeout = 1022,
    InvalidResultValue = 1023,
}

/// Module that produced a result code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ErrorModule {
    Common = 0,
    Kernel = 1,
    Util = 2,
    FileServer = 3,
    LoaderServer = 4,
    Tcb = 5,
    Os = 6,
    Dbg = 7,
    Dmnt = 8,
    Pdn = 9,
    Gx = 10,
    I2c = 11,
    Gpio = 12,
    Dd = 13,
    Codec = 14,
    Spi = 15,
    Pxi = 16,
    Fs = 17,
    Di = 18,
    Hid = 19,
    Cam = 20,
    Pi = 21,
    Pm = 22,
    PmLow = 23,
    Fsi = 24,
    Srv = 25,
    Ndm = 26,
    Nwm = 27,
    Soc = 28,
    Ldr = 29,
    Acc = 30,
    RomFs = 31,
    Am = 32,
    Hio = 33,
    Updater = 34,
    Mic = 35,
}

/// Broad category of a result code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ErrorSummary {
    Success = 0,
    NothingHappened = 1,
    WouldBlock = 2,
    OutOfResource = 3,
    NotFound = 4,
    InvalidState = 5,
    NotSupported = 6,
    InvalidArgument = 7,
    WrongArgument = 8,
    Canceled = 9,
    StatusChanged = 10,
    Internal = 11,
}

/// Severity of a result code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ErrorLevel {
    Success = 0,
    Info = 1,
    Status = 25,
    Temporary = 26,
    Permanent = 27,
    Usage = 28,
    Reinitialize = 29,
    Reset = 30,
    Fatal = 31,
}

/// Structured guest result code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[error("{summary:?}/{description:?} in {module:?} (level {level:?})")]
pub struct ResultCode {
    pub description: ErrorDescription,
    pub module: ErrorModule,
    pub summary: ErrorSummary,
    pub level: ErrorLevel,
}

impl ResultCode {
    pub const fn new(
        description: ErrorDescription,
        module: ErrorModule,
        summary: ErrorSummary,
        level: ErrorLevel,
    ) -> Self {
        Self {
            description,
            module,
            summary,
            level,
        }
    }

    /// Packs the code into its 32-bit command buffer form
    pub const fn raw(&self) -> u32 {
        (self.description as u32 & 0x3FF)
            | ((self.module as u32 & 0xFF) << 10)
            | ((self.summary as u32 & 0x3F) << 21)
            | ((self.level as u32 & 0x1F) << 27)
    }

    pub const fn is_success(&self) -> bool {
        (self.raw() as i32) >= 0
    }

    pub const fn is_error(&self) -> bool {
        !self.is_success()
    }
}

/// Result of a guest-visible operation
pub type ResultVal<T> = Result<T, ResultCode>;

pub const RESULT_SUCCESS: ResultCode = ResultCode::new(
    ErrorDescription::Success,
    ErrorModule::Common,
    ErrorSummary::Success,
    ErrorLevel::Success,
);
