//! Command buffer layout helpers

/// Words in a thread's command buffer
pub const COMMAND_BUFFER_WORDS: usize = 64;

pub type CommandBuffer = [u32; COMMAND_BUFFER_WORDS];

/// Translate descriptor announcing copied handles; the low bits of the
/// upper half hold `count - 1`
pub fn copy_handle_descriptor(count: u32) -> u32 {
    (count.saturating_sub(1)) << 26
}

/// Builds a header word
pub const fn make_header(command_id: u16, normal_params: u32, translate_params: u32) -> u32 {
    (command_id as u32) << 16 | (normal_params & 0x3F) << 6 | (translate_params & 0x3F)
}

/// Decoded header word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub command_id: u16,
    pub normal_params: u32,
    pub translate_params: u32,
}

impl Header {
    pub fn parse(raw: u32) -> Self {
        Self {
            command_id: (raw >> 16) as u16,
            normal_params: (raw >> 6) & 0x3F,
            translate_params: raw & 0x3F,
        }
    }

    pub fn raw(&self) -> u32 {
        make_header(self.command_id, self.normal_params, self.translate_params)
    }
}
