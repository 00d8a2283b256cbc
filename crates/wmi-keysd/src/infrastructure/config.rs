//! Daemon configuration.
//!
//! There is no configuration file and no command-line interface.  The daemon
//! runs with the defaults below; each field can be overridden by an
//! environment variable, which is mostly useful for pointing the daemon at a
//! fixture tree during testing.
//!
//! | Variable                    | Default                     |
//! |-----------------------------|-----------------------------|
//! | `WMI_KEYS_INPUT_DEVICES`    | `/proc/bus/input/devices`   |
//! | `WMI_KEYS_USB_DEVICES`      | `/sys/bus/usb/devices`      |
//! | `WMI_KEYS_INPUT_DIR`        | `/dev/input`                |
//! | `WMI_KEYS_POLL_INTERVAL_MS` | `100`                       |
//!
//! The log level is controlled separately through `RUST_LOG`.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

pub const ENV_INPUT_DEVICES: &str = "WMI_KEYS_INPUT_DEVICES";
pub const ENV_USB_DEVICES: &str = "WMI_KEYS_USB_DEVICES";
pub const ENV_INPUT_DIR: &str = "WMI_KEYS_INPUT_DIR";
pub const ENV_POLL_INTERVAL_MS: &str = "WMI_KEYS_POLL_INTERVAL_MS";

/// Name the virtual keyboard registers under.
pub const VIRTUAL_DEVICE_NAME: &str = "Asus_L410M_WMI_Keys";

/// All runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Kernel input-device listing.
    pub input_devices_path: PathBuf,
    /// Root of the USB device tree.
    pub usb_devices_dir: PathBuf,
    /// Directory holding the `eventN` device files.
    pub input_dir: PathBuf,
    /// Sleep between two drains of the WMI keyboard.
    pub poll_interval: Duration,
    /// Name of the uinput device.
    pub virtual_device_name: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            input_devices_path: PathBuf::from("/proc/bus/input/devices"),
            usb_devices_dir: PathBuf::from("/sys/bus/usb/devices"),
            input_dir: PathBuf::from("/dev/input"),
            poll_interval: Duration::from_millis(100),
            virtual_device_name: VIRTUAL_DEVICE_NAME.to_string(),
        }
    }
}

impl DaemonConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    ///
    /// An unparsable poll interval is logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(path) = lookup(ENV_INPUT_DEVICES) {
            cfg.input_devices_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_USB_DEVICES) {
            cfg.usb_devices_dir = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_INPUT_DIR) {
            cfg.input_dir = PathBuf::from(path);
        }
        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => cfg.poll_interval = Duration::from_millis(ms),
                _ => warn!("ignoring {ENV_POLL_INTERVAL_MS}={raw:?}: expected a positive integer"),
            }
        }
        cfg
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_paths_point_at_kernel_interfaces() {
        let cfg = DaemonConfig::default();
        assert_eq!(cfg.input_devices_path, PathBuf::from("/proc/bus/input/devices"));
        assert_eq!(cfg.usb_devices_dir, PathBuf::from("/sys/bus/usb/devices"));
        assert_eq!(cfg.input_dir, PathBuf::from("/dev/input"));
    }

    #[test]
    fn test_default_poll_interval_is_100ms() {
        assert_eq!(DaemonConfig::default().poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_empty_environment_yields_defaults() {
        assert_eq!(DaemonConfig::from_lookup(|_| None), DaemonConfig::default());
    }

    #[test]
    fn test_environment_overrides_paths_and_interval() {
        // Arrange
        let lookup = lookup_from(&[
            (ENV_INPUT_DEVICES, "/tmp/devices"),
            (ENV_USB_DEVICES, "/tmp/usb"),
            (ENV_INPUT_DIR, "/tmp/input"),
            (ENV_POLL_INTERVAL_MS, "25"),
        ]);

        // Act
        let cfg = DaemonConfig::from_lookup(lookup);

        // Assert
        assert_eq!(cfg.input_devices_path, PathBuf::from("/tmp/devices"));
        assert_eq!(cfg.usb_devices_dir, PathBuf::from("/tmp/usb"));
        assert_eq!(cfg.input_dir, PathBuf::from("/tmp/input"));
        assert_eq!(cfg.poll_interval, Duration::from_millis(25));
    }

    #[test]
    fn test_invalid_poll_interval_keeps_default() {
        for raw in ["fast", "0", "-5", ""] {
            let cfg = DaemonConfig::from_lookup(lookup_from(&[(ENV_POLL_INTERVAL_MS, raw)]));
            assert_eq!(cfg.poll_interval, Duration::from_millis(100), "value {raw:?}");
        }
    }
}
