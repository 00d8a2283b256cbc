//! Device locator: finds the webcam and the WMI keyboard at startup.
//!
//! Runs once.  Webcam problems are never fatal; they only switch the camera
//! key to its shortcut fallback.  A missing WMI keyboard is fatal, and is
//! reported as [`LocateError`] before any device file is opened.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use wmi_keys_core::{
    select_webcam, CameraUnavailable, DeviceListing, ListingError, UsbDeviceAttributes,
    UsbIdentity, UsbMatch,
};

use super::config::DaemonConfig;

/// Error type for WMI keyboard resolution.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("cannot read input device listing {path}: {source}")]
    ListingUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Keyboard(#[from] ListingError),
}

/// Filesystem-backed resolver for the two devices the daemon needs.
#[derive(Debug, Clone)]
pub struct DeviceLocator {
    input_devices_path: PathBuf,
    usb_devices_dir: PathBuf,
    input_dir: PathBuf,
}

impl DeviceLocator {
    pub fn new(config: &DaemonConfig) -> Self {
        Self {
            input_devices_path: config.input_devices_path.clone(),
            usb_devices_dir: config.usb_devices_dir.clone(),
            input_dir: config.input_dir.clone(),
        }
    }

    pub fn usb_devices_dir(&self) -> &Path {
        &self.usb_devices_dir
    }

    /// Reads and parses the input-device listing.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::ListingUnreadable`] if the file cannot be read.
    pub fn read_listing(&self) -> Result<DeviceListing, LocateError> {
        let text = fs::read_to_string(&self.input_devices_path).map_err(|source| {
            LocateError::ListingUnreadable {
                path: self.input_devices_path.clone(),
                source,
            }
        })?;
        Ok(DeviceListing::parse(&text))
    }

    /// Returns the webcam's USB identity, if the listing names one.
    pub fn resolve_webcam_identity(&self, listing: &DeviceListing) -> Option<UsbIdentity> {
        listing.resolve_webcam_identity()
    }

    /// Reads `idVendor` / `idProduct` of every entry under the USB tree.
    ///
    /// A missing or unreadable tree yields an empty list.
    pub fn enumerate_usb_devices(&self) -> Vec<UsbDeviceAttributes> {
        let entries = match fs::read_dir(&self.usb_devices_dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("cannot list {}: {e}", self.usb_devices_dir.display());
                return Vec::new();
            }
        };

        let mut devices: Vec<UsbDeviceAttributes> = entries
            .filter_map(Result::ok)
            .map(|entry| {
                let dir = entry.path();
                UsbDeviceAttributes {
                    bus_location_id: entry.file_name().to_string_lossy().into_owned(),
                    id_vendor: fs::read_to_string(dir.join("idVendor")).ok(),
                    id_product: fs::read_to_string(dir.join("idProduct")).ok(),
                }
            })
            .collect();
        devices.sort_by(|a, b| a.bus_location_id.cmp(&b.bus_location_id));
        devices
    }

    /// Finds the unique USB device carrying `identity`.
    pub fn resolve_webcam_bus_location(&self, identity: &UsbIdentity) -> UsbMatch<String> {
        select_webcam(identity, &self.enumerate_usb_devices())
    }

    /// Resolves the webcam's bus location, or the reason there is none.
    ///
    /// Every degraded outcome is logged at `info`.
    pub fn locate_webcam(&self, listing: Option<&DeviceListing>) -> Result<String, CameraUnavailable> {
        let Some(identity) = listing.and_then(|l| self.resolve_webcam_identity(l)) else {
            info!("no webcam found, disabling camera key");
            return Err(CameraUnavailable::NotListed);
        };

        match self.resolve_webcam_bus_location(&identity) {
            UsbMatch::Unique(bus_location_id) => {
                info!("webcam {identity} at USB {bus_location_id}");
                Ok(bus_location_id)
            }
            UsbMatch::NotFound => {
                info!("no camera found on the USB bus for {identity}, disabling camera key");
                Err(CameraUnavailable::NotFound(identity))
            }
            UsbMatch::Ambiguous(n) => {
                info!("more than one camera found ({n} match {identity}), disabling camera key");
                Err(CameraUnavailable::Ambiguous(identity, n))
            }
        }
    }

    /// Resolves the WMI keyboard's event device file.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::Keyboard`] if the listing has no usable
    /// `asus-nb-wmi` record.
    pub fn resolve_wmi_keyboard_node(&self, listing: &DeviceListing) -> Result<PathBuf, LocateError> {
        let node = listing.resolve_wmi_keyboard_node()?;
        let path = node.path_in(&self.input_dir);
        debug!("WMI keyboard at {}", path.display());
        Ok(path)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    struct Fixture {
        root: PathBuf,
        config: DaemonConfig,
    }

    impl Fixture {
        fn new(listing: Option<&str>) -> Self {
            let root = std::env::temp_dir().join(format!("wmi_keys_locator_{}", Uuid::new_v4()));
            fs::create_dir_all(root.join("usb")).unwrap();
            if let Some(text) = listing {
                fs::write(root.join("devices"), text).unwrap();
            }
            let config = DaemonConfig {
                input_devices_path: root.join("devices"),
                usb_devices_dir: root.join("usb"),
                input_dir: PathBuf::from("/dev/input"),
                ..DaemonConfig::default()
            };
            Self { root, config }
        }

        fn usb_device(&self, id: &str, vendor: &str, product: &str) {
            let dir = self.root.join("usb").join(id);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("idVendor"), format!("{vendor}\n")).unwrap();
            fs::write(dir.join("idProduct"), format!("{product}\n")).unwrap();
        }

        fn locator(&self) -> DeviceLocator {
            DeviceLocator::new(&self.config)
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.root);
        }
    }

    const LISTING: &str = "\
I: Bus=0019 Vendor=0000 Product=0000 Version=0000
N: Name=\"Asus WMI hotkeys\"
S: Sysfs=/devices/platform/asus-nb-wmi/input/input12
H: Handlers=rfkill kbd event11

I: Bus=0003 Vendor=13d3 Product=56bb Version=2101
N: Name=\"USB2.0 HD UVC WebCam: USB2.0 HD\"
S: Sysfs=/devices/pci0000:00/0000:00:14.0/usb1/1-5/1-5:1.0/input/input14
H: Handlers=kbd event13
";

    #[test]
    fn test_read_listing_missing_file_is_error() {
        let fx = Fixture::new(None);
        assert!(matches!(
            fx.locator().read_listing(),
            Err(LocateError::ListingUnreadable { .. })
        ));
    }

    #[test]
    fn test_enumerate_usb_devices_reads_ids_and_skips_missing_files() {
        // Arrange
        let fx = Fixture::new(Some(LISTING));
        fx.usb_device("1-5", "13d3", "56bb");
        fs::create_dir_all(fx.root.join("usb").join("1-5:1.0")).unwrap();

        // Act
        let devices = fx.locator().enumerate_usb_devices();

        // Assert
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].bus_location_id, "1-5");
        assert_eq!(devices[0].id_vendor.as_deref(), Some("13d3\n"));
        assert_eq!(devices[1].id_vendor, None);
    }

    #[test]
    fn test_enumerate_usb_devices_missing_tree_is_empty() {
        let fx = Fixture::new(Some(LISTING));
        fs::remove_dir_all(fx.root.join("usb")).unwrap();
        assert!(fx.locator().enumerate_usb_devices().is_empty());
    }

    #[test]
    fn test_locate_webcam_unique() {
        let fx = Fixture::new(Some(LISTING));
        fx.usb_device("1-5", "13d3", "56bb");
        fx.usb_device("1-3", "8087", "0aaa");
        let listing = fx.locator().read_listing().unwrap();

        assert_eq!(fx.locator().locate_webcam(Some(&listing)), Ok("1-5".to_string()));
    }

    #[test]
    fn test_locate_webcam_ambiguous() {
        let fx = Fixture::new(Some(LISTING));
        fx.usb_device("1-5", "13d3", "56bb");
        fx.usb_device("2-1", "13d3", "56bb");
        let listing = fx.locator().read_listing().unwrap();

        assert_eq!(
            fx.locator().locate_webcam(Some(&listing)),
            Err(CameraUnavailable::Ambiguous(UsbIdentity::new("13d3", "56bb"), 2))
        );
    }

    #[test]
    fn test_locate_webcam_without_listing_is_not_listed() {
        let fx = Fixture::new(None);
        assert_eq!(fx.locator().locate_webcam(None), Err(CameraUnavailable::NotListed));
    }

    #[test]
    fn test_resolve_wmi_keyboard_node_joins_input_dir() {
        let fx = Fixture::new(Some(LISTING));
        let listing = fx.locator().read_listing().unwrap();

        let path = fx.locator().resolve_wmi_keyboard_node(&listing).unwrap();

        assert_eq!(path, PathBuf::from("/dev/input/event11"));
    }
}
