//! Camera power controller backed by the USB `bConfigurationValue` file.
//!
//! # How the toggle works
//!
//! `/sys/bus/usb/devices/<bus-id>/bConfigurationValue` holds the index of the
//! active USB configuration.  Writing `0` unconfigures the device, which drops
//! the UVC driver binding and powers the camera function down; writing `1`
//! brings it back.  The file is opened, written, flushed and closed on every
//! toggle so nothing holds it between key presses.
//!
//! The initial state is read once at construction.  After that the controller
//! only ever flips its own recorded state; it never re-reads the file.

pub mod mock;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;
use wmi_keys_core::{CameraUnavailable, WebcamDevice};

use crate::application::dispatch::{CameraError, CameraPower, CameraSupport};

/// File name of the USB configuration value attribute.
pub const CONFIGURATION_VALUE_FILE: &str = "bConfigurationValue";

/// Sysfs-backed [`CameraPower`].
#[derive(Debug)]
pub struct SysfsCameraPower {
    device: WebcamDevice,
    value_path: PathBuf,
}

impl SysfsCameraPower {
    /// Reads the webcam's current configuration value and builds the
    /// controller.
    ///
    /// Returns [`CameraSupport::Unavailable`] with
    /// [`CameraUnavailable::StateUnreadable`] if the file cannot be read; the
    /// camera key then behaves exactly as if no camera had been found.
    pub fn open(usb_devices_dir: &Path, bus_location_id: &str) -> CameraSupport<Self> {
        let value_path = usb_devices_dir
            .join(bus_location_id)
            .join(CONFIGURATION_VALUE_FILE);

        match fs::read_to_string(&value_path) {
            Ok(value) => {
                let device = WebcamDevice::from_configuration_value(bus_location_id, &value);
                info!(
                    "camera key enabled, webcam is {}",
                    if device.powered() { "on" } else { "off" }
                );
                CameraSupport::Available(Self { device, value_path })
            }
            Err(e) => {
                info!(
                    "could not read cam state from {}: {e}, disabling camera key",
                    value_path.display()
                );
                CameraSupport::Unavailable(CameraUnavailable::StateUnreadable(
                    bus_location_id.to_string(),
                ))
            }
        }
    }

    pub fn device(&self) -> &WebcamDevice {
        &self.device
    }
}

impl CameraPower for SysfsCameraPower {
    fn toggle(&mut self) -> Result<bool, CameraError> {
        let value = self.device.toggled_value();
        let to_error = |source| CameraError::Write {
            path: self.value_path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.value_path)
            .map_err(to_error)?;
        file.write_all(value.as_bytes()).map_err(to_error)?;
        file.flush().map_err(to_error)?;
        drop(file);

        self.device.commit_toggle();
        Ok(self.device.powered())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn usb_tree(bus_id: &str, value: Option<&str>) -> PathBuf {
        let root = std::env::temp_dir().join(format!("wmi_keys_camera_{}", Uuid::new_v4()));
        let dir = root.join(bus_id);
        fs::create_dir_all(&dir).unwrap();
        if let Some(v) = value {
            fs::write(dir.join(CONFIGURATION_VALUE_FILE), v).unwrap();
        }
        root
    }

    fn read_value(root: &Path, bus_id: &str) -> String {
        fs::read_to_string(root.join(bus_id).join(CONFIGURATION_VALUE_FILE)).unwrap()
    }

    #[test]
    fn test_open_reads_powered_state() {
        // Arrange
        let root = usb_tree("1-5", Some("1\n"));

        // Act
        let support = SysfsCameraPower::open(&root, "1-5");

        // Assert
        match support {
            CameraSupport::Available(cam) => assert!(cam.device().powered()),
            CameraSupport::Unavailable(r) => panic!("expected camera, got {r}"),
        }
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn test_open_unreadable_state_disables_camera() {
        let root = usb_tree("1-5", None);

        let support = SysfsCameraPower::open(&root, "1-5");

        assert!(matches!(
            support,
            CameraSupport::Unavailable(CameraUnavailable::StateUnreadable(ref bus)) if bus == "1-5"
        ));
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn test_two_toggles_restore_original_value() {
        // Arrange
        let root = usb_tree("1-5", Some("1\n"));
        let CameraSupport::Available(mut cam) = SysfsCameraPower::open(&root, "1-5") else {
            panic!("camera must be available");
        };

        // Act / Assert: first toggle powers off
        assert!(!cam.toggle().unwrap());
        assert_eq!(read_value(&root, "1-5"), "0");

        // Second toggle powers back on
        assert!(cam.toggle().unwrap());
        assert_eq!(read_value(&root, "1-5"), "1");
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn test_toggle_from_off_writes_one() {
        let root = usb_tree("1-5", Some("0\n"));
        let CameraSupport::Available(mut cam) = SysfsCameraPower::open(&root, "1-5") else {
            panic!("camera must be available");
        };

        assert!(cam.toggle().unwrap());
        assert_eq!(read_value(&root, "1-5"), "1");
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn test_failed_write_keeps_recorded_state() {
        // Arrange: camera readable at startup, device directory gone later
        let root = usb_tree("1-5", Some("1"));
        let CameraSupport::Available(mut cam) = SysfsCameraPower::open(&root, "1-5") else {
            panic!("camera must be available");
        };
        fs::remove_dir_all(&root).unwrap();

        // Act
        let result = cam.toggle();

        // Assert
        assert!(matches!(result, Err(CameraError::Write { .. })));
        assert!(cam.device().powered());
    }
}
