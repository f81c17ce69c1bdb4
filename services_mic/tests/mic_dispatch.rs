//! Microphone Service Integration Tests
//!
//! These tests drive the service through raw command buffers against the
//! simulated kernel:
//! - Setter/getter pairs round-trip through the buffer
//! - Sampling state follows start, adjust and stop
//! - The buffer-full event handle is a live kernel object
//! - Stubbed and unknown commands reply not-implemented

use core_types::{Handle, RESULT_SUCCESS};
use kernel_api::{SyncKernel, WaitOutcome};
use services_mic::{
    make_header, CommandBuffer, MicService, COMMAND_BUFFER_WORDS, DEFAULT_GAIN,
    ERR_NOT_IMPLEMENTED,
};
use sim_kernel::test_utils::init_tracing;
use sim_kernel::SimulatedKernel;

fn request(header: u32, params: &[u32]) -> CommandBuffer {
    let mut cmd = [0u32; COMMAND_BUFFER_WORDS];
    cmd[0] = header;
    cmd[1..=params.len()].copy_from_slice(params);
    cmd
}

fn call(
    service: &mut MicService,
    kernel: &mut SimulatedKernel,
    header: u32,
    params: &[u32],
) -> CommandBuffer {
    let mut cmd = request(header, params);
    service.handle_sync_request(kernel, &mut cmd);
    cmd
}

fn setup() -> (SimulatedKernel, MicService) {
    init_tracing();
    let mut kernel = SimulatedKernel::new();
    let service = MicService::new(&mut kernel).unwrap();
    (kernel, service)
}

#[test]
fn test_gain_round_trip() {
    let (mut kernel, mut service) = setup();

    let cmd = call(&mut service, &mut kernel, 0x0009_0000, &[]);
    assert_eq!(cmd[1], RESULT_SUCCESS.raw());
    assert_eq!(cmd[2], u32::from(DEFAULT_GAIN));

    let cmd = call(&mut service, &mut kernel, 0x0008_0040, &[0x1_33]);
    assert_eq!(cmd[0], make_header(0x8, 1, 0));
    assert_eq!(cmd[1], RESULT_SUCCESS.raw());

    let cmd = call(&mut service, &mut kernel, 0x0009_0000, &[]);
    assert_eq!(cmd[0], make_header(0x9, 2, 0));
    assert_eq!(cmd[2], 0x33);
}

#[test]
fn test_power_and_clamp_round_trip() {
    let (mut kernel, mut service) = setup();

    call(&mut service, &mut kernel, 0x000A_0040, &[1]);
    call(&mut service, &mut kernel, 0x000D_0040, &[1]);
    assert_eq!(call(&mut service, &mut kernel, 0x000B_0000, &[])[2], 1);
    assert_eq!(call(&mut service, &mut kernel, 0x000E_0000, &[])[2], 1);

    call(&mut service, &mut kernel, 0x000A_0040, &[0x100]);
    assert_eq!(call(&mut service, &mut kernel, 0x000B_0000, &[])[2], 0);
}

#[test]
fn test_sampling_lifecycle() {
    let (mut kernel, mut service) = setup();
    assert_eq!(call(&mut service, &mut kernel, 0x0006_0000, &[])[2], 0);

    let cmd = call(
        &mut service,
        &mut kernel,
        0x0003_0140,
        &[0x1_02, 0x03, 0x10, 0x8000, 1],
    );
    assert_eq!(cmd[1], RESULT_SUCCESS.raw());
    assert_eq!(call(&mut service, &mut kernel, 0x0006_0000, &[])[2], 1);

    let session = service.session();
    assert_eq!(session.sampling_type, 2);
    assert_eq!(session.sampling_rate, 3);
    assert_eq!(session.buffer_offset, 0x10);
    assert_eq!(session.buffer_size, 0x8000);
    assert!(session.looped);

    call(&mut service, &mut kernel, 0x0004_0040, &[1]);
    assert_eq!(service.session().sampling_rate, 1);

    call(&mut service, &mut kernel, 0x0005_0000, &[]);
    assert_eq!(call(&mut service, &mut kernel, 0x0006_0000, &[])[2], 0);
}

#[test]
fn test_map_and_unmap_memory_block() {
    let (mut kernel, mut service) = setup();
    let cmd = call(&mut service, &mut kernel, 0x0001_0042, &[0x30000, 0, 0x55]);
    assert_eq!(cmd[1], RESULT_SUCCESS.raw());
    assert_eq!(service.session().shared_memory, Some(Handle::from_raw(0x55)));
    assert_eq!(service.session().shared_memory_size, 0x30000);

    let cmd = call(&mut service, &mut kernel, 0x0002_0000, &[]);
    assert_eq!(cmd[1], RESULT_SUCCESS.raw());
    assert_eq!(service.session().shared_memory, None);
}

#[test]
fn test_buffer_full_event_handle_is_live() {
    let (mut kernel, mut service) = setup();
    let cmd = call(&mut service, &mut kernel, 0x0007_0000, &[]);
    assert_eq!(cmd[0], make_header(0x7, 1, 2));
    assert_eq!(cmd[1], RESULT_SUCCESS.raw());

    let handle = Handle::from_raw(cmd[3]);
    assert_ne!(handle, service.session().buffer_full_event);
    assert_eq!(
        kernel.object_id(handle),
        kernel.object_id(service.session().buffer_full_event)
    );

    // The client can wait on it and the service can signal it.
    let thread = kernel.create_thread("client", 48).unwrap();
    assert_eq!(
        kernel.wait_synchronization_1(thread, handle, None),
        Ok(WaitOutcome::Blocked)
    );
    kernel
        .signal_event(service.session().buffer_full_event, 0)
        .unwrap();
    assert_eq!(
        kernel.take_wait_outcome(thread),
        Some(WaitOutcome::Acquired { index: Some(0) })
    );

    // Closing the client's handle leaves the service's reference alive.
    kernel.close_handle(handle).unwrap();
    assert_eq!(kernel.is_signaled(service.session().buffer_full_event), Ok(false));
    service.close(&mut kernel).unwrap();
    assert_eq!(kernel.live_objects(), 0);
}

#[test]
fn test_stubbed_commands_reply_not_implemented() {
    let (mut kernel, mut service) = setup();
    for header in [0x000C_0042, 0x0010_0040] {
        let cmd = call(&mut service, &mut kernel, header, &[0x11, 0, 0]);
        assert_eq!(cmd[1], ERR_NOT_IMPLEMENTED.raw());
        assert_eq!(cmd[0] >> 16, header >> 16);
    }
}

#[test]
fn test_unknown_command_replies_not_implemented() {
    let (mut kernel, mut service) = setup();
    let before = service.session().clone();
    let cmd = call(&mut service, &mut kernel, 0x00FF_0000, &[]);
    assert_eq!(cmd[0], make_header(0xFF, 1, 0));
    assert_eq!(cmd[1], ERR_NOT_IMPLEMENTED.raw());
    assert_eq!(service.session(), &before);
}

#[test]
fn test_sessions_are_independent() {
    init_tracing();
    let mut kernel = SimulatedKernel::new();
    let mut first = MicService::new(&mut kernel).unwrap();
    let mut second = MicService::new(&mut kernel).unwrap();

    call(&mut first, &mut kernel, 0x0008_0040, &[0x10]);
    assert_eq!(call(&mut second, &mut kernel, 0x0009_0000, &[])[2], u32::from(DEFAULT_GAIN));
    assert_ne!(
        kernel.object_id(first.session().buffer_full_event),
        kernel.object_id(second.session().buffer_full_event)
    );
}

#[test]
fn test_session_state_serializes() {
    let (mut kernel, mut service) = setup();
    call(&mut service, &mut kernel, 0x0008_0040, &[0x20]);
    let json = serde_json::to_value(service.session()).unwrap();
    assert_eq!(json["gain"], 0x20);
    assert_eq!(json["is_sampling"], false);
}
