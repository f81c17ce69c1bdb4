//! Archive errors
//!
//! Host-side construction failures are [`ArchiveError`]s. Everything a guest
//! can observe is a [`ResultCode`].

use core_types::{ErrorDescription, ErrorLevel, ErrorModule, ErrorSummary, ResultCode};
use thiserror::Error;

/// Archive construction and configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArchiveError {
    /// The payload window does not fit inside the backing source
    #[error(
        "payload window {data_offset:#x}+{data_size:#x} exceeds source size {source_size:#x}"
    )]
    WindowOutOfBounds {
        data_offset: u64,
        data_size: u64,
        source_size: u64,
    },

    #[error("invalid archive configuration: {0}")]
    InvalidConfig(String),
}

/// Mutation attempted on a read-only archive
pub const ERR_UNSUPPORTED_OPERATION: ResultCode = ResultCode::new(
    ErrorDescription::NotAuthorized,
    ErrorModule::Fs,
    ErrorSummary::NotSupported,
    ErrorLevel::Permanent,
);

/// Read attempted on an archive that has no backing container
pub const ERR_NO_ROMFS: ResultCode = ResultCode::new(
    ErrorDescription::NoData,
    ErrorModule::RomFs,
    ErrorSummary::NotFound,
    ErrorLevel::Permanent,
);

/// Backing container failed to seek or read
pub const ERR_ROMFS_IO: ResultCode = ResultCode::new(
    ErrorDescription::NoData,
    ErrorModule::RomFs,
    ErrorSummary::Internal,
    ErrorLevel::Permanent,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_operation_raw() {
        assert_eq!(ERR_UNSUPPORTED_OPERATION.raw(), 0xD8C0_47EA);
    }

    #[test]
    fn test_missing_source_is_distinct() {
        assert_ne!(ERR_NO_ROMFS, ERR_UNSUPPORTED_OPERATION);
        assert_ne!(ERR_NO_ROMFS, ERR_ROMFS_IO);
        assert!(ERR_NO_ROMFS.is_error());
    }

    #[test]
    fn test_window_error_message() {
        let err = ArchiveError::WindowOutOfBounds {
            data_offset: 0x10,
            data_size: 0x20,
            source_size: 0x18,
        };
        assert_eq!(
            err.to_string(),
            "payload window 0x10+0x20 exceeds source size 0x18"
        );
    }
}
