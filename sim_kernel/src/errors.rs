//! Guest-visible result codes produced by the kernel

use core_types::{
    ErrorDescription, ErrorLevel, ErrorModule, ErrorSummary, ResultCode, RESULT_SUCCESS,
};
use kernel_api::WaitOutcome;

/// Handle does not resolve, or resolves to the wrong kind of object
pub const ERR_INVALID_HANDLE: ResultCode = ResultCode::new(
    ErrorDescription::InvalidHandle,
    ErrorModule::Kernel,
    ErrorSummary::InvalidArgument,
    ErrorLevel::Permanent,
);

/// Count or list argument outside its permitted range
pub const ERR_OUT_OF_RANGE: ResultCode = ResultCode::new(
    ErrorDescription::OutOfRange,
    ErrorModule::Kernel,
    ErrorSummary::InvalidArgument,
    ErrorLevel::Permanent,
);

/// The handle table is full
pub const ERR_OUT_OF_HANDLES: ResultCode = ResultCode::new(
    ErrorDescription::OutOfMemory,
    ErrorModule::Kernel,
    ErrorSummary::OutOfResource,
    ErrorLevel::Permanent,
);

/// Mutex released by a thread that does not hold it
pub const ERR_NOT_MUTEX_OWNER: ResultCode = ResultCode::new(
    ErrorDescription::NotAuthorized,
    ErrorModule::Kernel,
    ErrorSummary::InvalidState,
    ErrorLevel::Permanent,
);

/// Thread id unknown, or thread not in a state that allows the call
pub const ERR_INVALID_THREAD_STATE: ResultCode = ResultCode::new(
    ErrorDescription::InvalidCombination,
    ErrorModule::Kernel,
    ErrorSummary::InvalidState,
    ErrorLevel::Permanent,
);

/// A wait expired before it was satisfied
///
/// Informational: guest code treats it as a non-error status.
pub const RESULT_TIMEOUT: ResultCode = ResultCode::new(
    ErrorDescription::Timeout,
    ErrorModule::Os,
    ErrorSummary::StatusChanged,
    ErrorLevel::Info,
);

/// Result word a guest reads back for a finished wait
///
/// `None` while the thread is still parked.
pub fn wait_result(outcome: WaitOutcome) -> Option<ResultCode> {
    match outcome {
        WaitOutcome::Acquired { .. } => Some(RESULT_SUCCESS),
        WaitOutcome::TimedOut => Some(RESULT_TIMEOUT),
        WaitOutcome::Blocked => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_errors() {
        for code in [
            ERR_INVALID_HANDLE,
            ERR_OUT_OF_RANGE,
            ERR_OUT_OF_HANDLES,
            ERR_NOT_MUTEX_OWNER,
            ERR_INVALID_THREAD_STATE,
        ] {
            assert!(code.is_error(), "{code} should be an error");
        }
    }

    #[test]
    fn test_timeout_is_not_an_error() {
        assert!(RESULT_TIMEOUT.is_success());
        assert_eq!(RESULT_TIMEOUT.raw(), 0x0940_1BFE);
    }

    #[test]
    fn test_wait_result_words() {
        assert_eq!(
            wait_result(WaitOutcome::Acquired { index: Some(1) }),
            Some(RESULT_SUCCESS)
        );
        assert_eq!(wait_result(WaitOutcome::TimedOut), Some(RESULT_TIMEOUT));
        assert_eq!(wait_result(WaitOutcome::Blocked), None);
    }
}
