//! Webcam power state.
//!
//! The webcam is switched on and off through its USB configuration value:
//! writing `1` to `bConfigurationValue` selects the device's configuration
//! (powered), writing `0` unconfigures it (unpowered).

use std::fmt;

use crate::domain::usb::UsbIdentity;

/// Why camera support is disabled for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraUnavailable {
    /// No device in the input listing has "webcam" in its name.
    NotListed,
    /// The listed identity matches no USB device.
    NotFound(UsbIdentity),
    /// The listed identity matches several USB devices.
    Ambiguous(UsbIdentity, usize),
    /// A unique device was found but its configuration value could not be read.
    StateUnreadable(String),
}

impl fmt::Display for CameraUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotListed => write!(f, "no webcam in the input device listing"),
            Self::NotFound(id) => write!(f, "no USB device matches webcam {id}"),
            Self::Ambiguous(id, n) => write!(f, "{n} USB devices match webcam {id}"),
            Self::StateUnreadable(bus) => write!(f, "could not read power state of USB device {bus}"),
        }
    }
}

/// The resolved webcam and its last-known power state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebcamDevice {
    bus_location_id: String,
    powered: bool,
}

impl WebcamDevice {
    /// Builds the device from the text of its `bConfigurationValue` file.
    ///
    /// The camera is considered powered only when the value is exactly `1`;
    /// an empty value (unconfigured device) or `0` means off.
    pub fn from_configuration_value(bus_location_id: impl Into<String>, value: &str) -> Self {
        Self {
            bus_location_id: bus_location_id.into(),
            powered: value.trim() == "1",
        }
    }

    pub fn bus_location_id(&self) -> &str {
        &self.bus_location_id
    }

    pub fn powered(&self) -> bool {
        self.powered
    }

    /// The configuration value that flips the current state.
    pub fn toggled_value(&self) -> &'static str {
        if self.powered {
            "0"
        } else {
            "1"
        }
    }

    /// Records that the flipped value was written.
    pub fn commit_toggle(&mut self) {
        self.powered = !self.powered;
    }
}
