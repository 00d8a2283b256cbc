//! Startup wiring.
//!
//! [`plan_startup`] performs every lookup that must succeed or degrade before
//! any device is opened:
//!
//! ```text
//! read /proc/bus/input/devices
//!  ├─ webcam identity → USB bus location → bConfigurationValue
//!  │     (any failure: camera key falls back to Shift+Meta+R)
//!  └─ WMI keyboard event node
//!        (failure: StartupError, exit status 1)
//! ```
//!
//! Opening the event node and creating the virtual keyboard happen afterwards
//! in `main`, so a failed resolution never touches a device file.

use std::path::PathBuf;

use thiserror::Error;

use crate::application::dispatch::{CameraSupport, SourceError};
use crate::infrastructure::camera_power::SysfsCameraPower;
use crate::infrastructure::locator::{DeviceLocator, LocateError};

/// Process exit status for every fatal startup failure.
pub const FATAL_EXIT_STATUS: u8 = 1;

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("WMI keyboard not found: {0}")]
    KeyboardUnresolved(#[source] LocateError),
    #[error("could not open connection to WMI keyboard: {0}")]
    KeyboardUnavailable(#[source] SourceError),
    #[error("could not create virtual keyboard: {0}")]
    VirtualKeyboard(#[source] std::io::Error),
}

/// Process exit status for the outcome of a daemon run: `0` after a clean
/// shutdown, [`FATAL_EXIT_STATUS`] for any error that ended it.
pub fn exit_status(outcome: &anyhow::Result<()>) -> u8 {
    match outcome {
        Ok(()) => 0,
        Err(_) => FATAL_EXIT_STATUS,
    }
}

/// Everything resolved before the devices are opened.
#[derive(Debug)]
pub struct StartupPlan {
    pub keyboard_node: PathBuf,
    pub camera: CameraSupport<SysfsCameraPower>,
}

/// Resolves the webcam (degrading on failure) and the WMI keyboard node.
///
/// # Errors
///
/// Returns [`StartupError::KeyboardUnresolved`] if the listing cannot be read
/// or has no WMI keyboard.
pub fn plan_startup(locator: &DeviceLocator) -> Result<StartupPlan, StartupError> {
    let listing = locator.read_listing();

    let camera = match locator.locate_webcam(listing.as_ref().ok()) {
        Ok(bus_location_id) => SysfsCameraPower::open(locator.usb_devices_dir(), &bus_location_id),
        Err(reason) => CameraSupport::Unavailable(reason),
    };

    let keyboard_node = listing
        .and_then(|l| locator.resolve_wmi_keyboard_node(&l))
        .map_err(StartupError::KeyboardUnresolved)?;

    Ok(StartupPlan {
        keyboard_node,
        camera,
    })
}
