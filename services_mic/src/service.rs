//! Microphone service dispatch
//!
//! Each request header is looked up in [`FUNCTION_TABLE`]. Handlers decode
//! their parameters, update the session, and write outputs; the dispatcher
//! writes the response header and result word.

use crate::ipc::{copy_handle_descriptor, make_header, CommandBuffer, Header};
use crate::session::MicSession;
use core_types::{
    ErrorDescription, ErrorLevel, ErrorModule, ErrorSummary, Handle, ResultCode, ResultVal,
    RESULT_SUCCESS,
};
use kernel_api::{ResetType, SyncKernel};

/// Reply for commands the service does not emulate
pub const ERR_NOT_IMPLEMENTED: ResultCode = ResultCode::new(
    ErrorDescription::NotImplemented,
    ErrorModule::Mic,
    ErrorSummary::NotSupported,
    ErrorLevel::Permanent,
);

/// Output layout of a successful reply: normal words (including the result)
/// and translate words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub normal: u32,
    pub translate: u32,
}

const RESULT_ONLY: Reply = Reply {
    normal: 1,
    translate: 0,
};

const ONE_VALUE: Reply = Reply {
    normal: 2,
    translate: 0,
};

type Handler = fn(&mut MicSession, &mut dyn SyncKernel, &mut CommandBuffer) -> ResultVal<Reply>;

/// One entry of the command table
pub struct FunctionInfo {
    pub header: u32,
    pub handler: Option<Handler>,
    pub name: &'static str,
}

#[rustfmt::skip]
pub const FUNCTION_TABLE: &[FunctionInfo] = &[
    FunctionInfo { header: 0x0001_0042, handler: Some(map_memory_block), name: "MapMemoryBlock" },
    FunctionInfo { header: 0x0002_0000, handler: Some(unmap_memory_block), name: "UnmapMemoryBlock" },
    FunctionInfo { header: 0x0003_0140, handler: Some(start_sampling), name: "StartSampling" },
    FunctionInfo { header: 0x0004_0040, handler: Some(adjust_sampling), name: "AdjustSampling" },
    FunctionInfo { header: 0x0005_0000, handler: Some(stop_sampling), name: "StopSampling" },
    FunctionInfo { header: 0x0006_0000, handler: Some(is_sampling), name: "IsSampling" },
    FunctionInfo { header: 0x0007_0000, handler: Some(get_buffer_full_event), name: "GetBufferFullEvent" },
    FunctionInfo { header: 0x0008_0040, handler: Some(set_gain), name: "SetGain" },
    FunctionInfo { header: 0x0009_0000, handler: Some(get_gain), name: "GetGain" },
    FunctionInfo { header: 0x000A_0040, handler: Some(set_power), name: "SetPower" },
    FunctionInfo { header: 0x000B_0000, handler: Some(get_power), name: "GetPower" },
    FunctionInfo { header: 0x000C_0042, handler: None, name: "SetIirFilterMic" },
    FunctionInfo { header: 0x000D_0040, handler: Some(set_clamp), name: "SetClamp" },
    FunctionInfo { header: 0x000E_0000, handler: Some(get_clamp), name: "GetClamp" },
    FunctionInfo { header: 0x0010_0040, handler: None, name: "SetClientSDKVersion" },
];

fn low_byte(word: u32) -> u8 {
    (word & 0xFF) as u8
}

fn map_memory_block(
    session: &mut MicSession,
    _kernel: &mut dyn SyncKernel,
    cmd: &mut CommandBuffer,
) -> ResultVal<Reply> {
    session.shared_memory_size = cmd[1];
    session.shared_memory = Some(Handle::from_raw(cmd[3]));
    tracing::debug!(size = cmd[1], handle = cmd[3], "mapped sample buffer");
    Ok(RESULT_ONLY)
}

fn unmap_memory_block(
    session: &mut MicSession,
    _kernel: &mut dyn SyncKernel,
    _cmd: &mut CommandBuffer,
) -> ResultVal<Reply> {
    if session.shared_memory.take().is_none() {
        tracing::warn!("unmap without a mapped sample buffer");
    }
    session.shared_memory_size = 0;
    Ok(RESULT_ONLY)
}

fn start_sampling(
    session: &mut MicSession,
    _kernel: &mut dyn SyncKernel,
    cmd: &mut CommandBuffer,
) -> ResultVal<Reply> {
    session.sampling_type = low_byte(cmd[1]);
    session.sampling_rate = low_byte(cmd[2]);
    session.buffer_offset = cmd[3] as i32;
    session.buffer_size = cmd[4];
    session.looped = low_byte(cmd[5]) != 0;
    session.is_sampling = true;
    tracing::debug!(
        sampling_type = session.sampling_type,
        sampling_rate = session.sampling_rate,
        offset = session.buffer_offset,
        size = session.buffer_size,
        looped = session.looped,
        "sampling started"
    );
    Ok(RESULT_ONLY)
}

fn adjust_sampling(
    session: &mut MicSession,
    _kernel: &mut dyn SyncKernel,
    cmd: &mut CommandBuffer,
) -> ResultVal<Reply> {
    session.sampling_rate = low_byte(cmd[1]);
    Ok(RESULT_ONLY)
}

fn stop_sampling(
    session: &mut MicSession,
    _kernel: &mut dyn SyncKernel,
    _cmd: &mut CommandBuffer,
) -> ResultVal<Reply> {
    session.is_sampling = false;
    Ok(RESULT_ONLY)
}

fn is_sampling(
    session: &mut MicSession,
    _kernel: &mut dyn SyncKernel,
    cmd: &mut CommandBuffer,
) -> ResultVal<Reply> {
    cmd[2] = u32::from(session.is_sampling);
    Ok(ONE_VALUE)
}

fn get_buffer_full_event(
    session: &mut MicSession,
    kernel: &mut dyn SyncKernel,
    cmd: &mut CommandBuffer,
) -> ResultVal<Reply> {
    let handle = kernel.duplicate_handle(session.buffer_full_event)?;
    cmd[2] = copy_handle_descriptor(1);
    cmd[3] = handle.raw();
    Ok(Reply {
        normal: 1,
        translate: 2,
    })
}

fn set_gain(
    session: &mut MicSession,
    _kernel: &mut dyn SyncKernel,
    cmd: &mut CommandBuffer,
) -> ResultVal<Reply> {
    session.gain = low_byte(cmd[1]);
    Ok(RESULT_ONLY)
}

fn get_gain(
    session: &mut MicSession,
    _kernel: &mut dyn SyncKernel,
    cmd: &mut CommandBuffer,
) -> ResultVal<Reply> {
    cmd[2] = u32::from(session.gain);
    Ok(ONE_VALUE)
}

fn set_power(
    session: &mut MicSession,
    _kernel: &mut dyn SyncKernel,
    cmd: &mut CommandBuffer,
) -> ResultVal<Reply> {
    session.power = low_byte(cmd[1]) != 0;
    Ok(RESULT_ONLY)
}

fn get_power(
    session: &mut MicSession,
    _kernel: &mut dyn SyncKernel,
    cmd: &mut CommandBuffer,
) -> ResultVal<Reply> {
    cmd[2] = u32::from(session.power);
    Ok(ONE_VALUE)
}

fn set_clamp(
    session: &mut MicSession,
    _kernel: &mut dyn SyncKernel,
    cmd: &mut CommandBuffer,
) -> ResultVal<Reply> {
    session.clamp = low_byte(cmd[1]) != 0;
    Ok(RESULT_ONLY)
}

fn get_clamp(
    session: &mut MicSession,
    _kernel: &mut dyn SyncKernel,
    cmd: &mut CommandBuffer,
) -> ResultVal<Reply> {
    cmd[2] = u32::from(session.clamp);
    Ok(ONE_VALUE)
}

/// The microphone service bound to one client session
pub struct MicService {
    session: MicSession,
}

impl MicService {
    /// Opens a session, creating its buffer-full event
    pub fn new(kernel: &mut dyn SyncKernel) -> ResultVal<Self> {
        let event = kernel.create_event(ResetType::OneShot, "MIC_U::buffer_full_event")?;
        Ok(Self {
            session: MicSession::new(event),
        })
    }

    pub fn session(&self) -> &MicSession {
        &self.session
    }

    /// Handles one request in place
    pub fn handle_sync_request(&mut self, kernel: &mut dyn SyncKernel, cmd: &mut CommandBuffer) {
        let header = cmd[0];
        let command_id = Header::parse(header).command_id;

        let Some(function) = FUNCTION_TABLE.iter().find(|f| f.header == header) else {
            tracing::error!(header, "unknown command");
            reply_error(cmd, command_id, ERR_NOT_IMPLEMENTED);
            return;
        };
        let Some(handler) = function.handler else {
            tracing::error!(command = function.name, "unimplemented command");
            reply_error(cmd, command_id, ERR_NOT_IMPLEMENTED);
            return;
        };

        tracing::trace!(command = function.name, "dispatch");
        match handler(&mut self.session, kernel, cmd) {
            Ok(reply) => {
                cmd[0] = make_header(command_id, reply.normal, reply.translate);
                cmd[1] = RESULT_SUCCESS.raw();
            }
            Err(code) => {
                tracing::error!(command = function.name, result = %code, "command failed");
                reply_error(cmd, command_id, code);
            }
        }
    }

    /// Closes the session, dropping its reference to the event
    pub fn close(self, kernel: &mut dyn SyncKernel) -> ResultVal<()> {
        kernel.close_handle(self.session.buffer_full_event)
    }
}

fn reply_error(cmd: &mut CommandBuffer, command_id: u16, code: ResultCode) {
    cmd[0] = make_header(command_id, 1, 0);
    cmd[1] = code.raw();
}
