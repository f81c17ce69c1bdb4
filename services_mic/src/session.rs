//! Per-session microphone state

use core_types::Handle;
use serde::{Deserialize, Serialize};

/// Gain a fresh session reports before the guest sets one
pub const DEFAULT_GAIN: u8 = 0x28;

/// Everything the service remembers about one client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicSession {
    /// The service's own reference to the buffer-full event
    pub buffer_full_event: Handle,
    /// Shared memory block the guest mapped for sample data
    pub shared_memory: Option<Handle>,
    pub shared_memory_size: u32,
    pub gain: u8,
    /// Microphone bias power
    pub power: bool,
    pub clamp: bool,
    pub is_sampling: bool,
    pub sampling_type: u8,
    pub sampling_rate: u8,
    /// Byte offset of the sample ring inside the shared block
    pub buffer_offset: i32,
    pub buffer_size: u32,
    pub looped: bool,
}

impl MicSession {
    pub fn new(buffer_full_event: Handle) -> Self {
        Self {
            buffer_full_event,
            shared_memory: None,
            shared_memory_size: 0,
            gain: DEFAULT_GAIN,
            power: false,
            clamp: false,
            is_sampling: false,
            sampling_type: 0,
            sampling_rate: 0,
            buffer_offset: 0,
            buffer_size: 0,
            looped: false,
        }
    }
}
