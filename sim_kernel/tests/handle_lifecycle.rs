//! Handle Lifecycle Integration Tests
//!
//! These tests validate handle and object lifetime:
//! - Duplicated handles share one object
//! - Objects die with their last reference
//! - Stale handles resolve to invalid-handle

use kernel_api::{KernelConfig, ResetType, SyncKernel};
use sim_kernel::errors::{ERR_INVALID_HANDLE, ERR_OUT_OF_HANDLES};
use sim_kernel::SimulatedKernel;

#[test]
fn test_closed_handle_is_stale() {
    let mut kernel = SimulatedKernel::new();
    let event = kernel.create_event(ResetType::OneShot, "e").unwrap();
    kernel.close_handle(event).unwrap();

    assert_eq!(kernel.signal_event(event, 0), Err(ERR_INVALID_HANDLE));
    assert_eq!(kernel.close_handle(event), Err(ERR_INVALID_HANDLE));
    assert_eq!(kernel.duplicate_handle(event), Err(ERR_INVALID_HANDLE));
}

#[test]
fn test_duplicate_shares_object() {
    let mut kernel = SimulatedKernel::new();
    let original = kernel.create_event(ResetType::Sticky, "shared").unwrap();
    let copy = kernel.duplicate_handle(original).unwrap();
    assert_ne!(original, copy);
    assert_eq!(kernel.object_id(original), kernel.object_id(copy));

    kernel.signal_event(original, 0).unwrap();
    assert_eq!(kernel.is_signaled(copy), Ok(true));

    kernel.close_handle(original).unwrap();
    assert_eq!(kernel.live_objects(), 1);
    assert_eq!(kernel.is_signaled(copy), Ok(true));

    kernel.close_handle(copy).unwrap();
    assert_eq!(kernel.live_objects(), 0);
    assert_eq!(kernel.open_handles(), 0);
}

#[test]
fn test_handle_limit_from_config() {
    let config = KernelConfig::from_json(r#"{ "max_handles": 2 }"#).unwrap();
    let mut kernel = SimulatedKernel::with_config(config);
    kernel.create_event(ResetType::OneShot, "a").unwrap();
    kernel.create_event(ResetType::OneShot, "b").unwrap();

    assert_eq!(
        kernel.create_event(ResetType::OneShot, "c"),
        Err(ERR_OUT_OF_HANDLES)
    );
    // The object created for the failed handle is not leaked.
    assert_eq!(kernel.live_objects(), 2);
}

#[test]
fn test_kernel_usable_through_trait_object() {
    let mut kernel = SimulatedKernel::new();
    let sync: &mut dyn SyncKernel = &mut kernel;
    let handle = sync.create_semaphore(0, 1, "s").unwrap();
    assert_eq!(sync.release_semaphore(handle, 1), Ok(0));
    sync.close_handle(handle).unwrap();
    assert_eq!(kernel.live_objects(), 0);
}
