//! Parser for the kernel's input-device listing (`/proc/bus/input/devices`).
//!
//! # What does the listing look like?
//!
//! The kernel prints one block per input device, separated by blank lines.
//! Each line starts with a one-letter tag followed by `: ` and the payload:
//!
//! ```text
//! I: Bus=0003 Vendor=13d3 Product=56bb Version=2101
//! N: Name="USB2.0 HD UVC WebCam: USB2.0 HD"
//! P: Phys=usb-0000:00:14.0-5/button
//! S: Sysfs=/devices/pci0000:00/0000:00:14.0/usb1/1-5/1-5:1.0/input/input14
//! U: Uniq=
//! H: Handlers=kbd event13
//! B: PROP=0
//! ```
//!
//! The identity line (`I:`) always precedes the name line (`N:`) of the same
//! device, which is what lets us recover a webcam's USB vendor/product from
//! its display name.
//!
//! # Parsing policy
//!
//! The parser is lenient: lines it does not understand are kept verbatim and
//! simply never match anything.  Only the WMI keyboard lookup can fail, because
//! without that device the daemon has nothing to do.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::domain::usb::UsbIdentity;

/// Sysfs path segment under which the `asus-nb-wmi` driver registers its
/// input device.
pub const WMI_SYSFS_SEGMENT: &str = "/devices/platform/asus-nb-wmi/input/";

/// Case-insensitive marker looked for in device names.
const WEBCAM_MARKER: &str = "WEBCAM";

/// Error type for listing lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListingError {
    /// No device record declares a sysfs path under the WMI driver.
    #[error("no input device with a sysfs path under {}", WMI_SYSFS_SEGMENT)]
    WmiKeyboardNotFound,

    /// The WMI device record was found but its sysfs path does not end in
    /// `inputN`.
    #[error("WMI keyboard sysfs path has no trailing input index: {0}")]
    MalformedSysfsPath(String),
}

/// One tagged line of a device record, e.g. `('N', "Name=\"Foo\"")`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ListingLine {
    tag: char,
    body: String,
}

/// A single device block from the listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceRecord {
    lines: Vec<ListingLine>,
}

impl DeviceRecord {
    /// Returns the display name (`N: Name="..."`) without quotes.
    pub fn name(&self) -> Option<&str> {
        self.field('N', "Name").map(|n| n.trim_matches('"'))
    }

    /// Returns the declared sysfs path (`S: Sysfs=...`).
    pub fn sysfs_path(&self) -> Option<&str> {
        self.field('S', "Sysfs")
    }

    /// Returns the handler names (`H: Handlers=kbd event13`).
    pub fn handlers(&self) -> Vec<&str> {
        self.field('H', "Handlers")
            .map(|h| h.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Returns the value of `key=` on the first line tagged `tag`.
    ///
    /// The value runs to the end of the line, so it may contain spaces
    /// (names and handler lists do).
    fn field(&self, tag: char, key: &str) -> Option<&str> {
        self.lines
            .iter()
            .filter(|l| l.tag == tag)
            .find_map(|l| l.body.strip_prefix(key)?.strip_prefix('='))
            .map(str::trim)
    }
}

/// The WMI keyboard's event node, identified by its `eventN` index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventNode {
    pub index: u32,
}

impl EventNode {
    /// Returns the device file for this node inside `input_dir`
    /// (normally `/dev/input`).
    pub fn path_in(&self, input_dir: &Path) -> PathBuf {
        input_dir.join(format!("event{}", self.index))
    }
}

/// Parsed `/proc/bus/input/devices` content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceListing {
    records: Vec<DeviceRecord>,
}

impl DeviceListing {
    /// Parses the listing text into device records.
    pub fn parse(text: &str) -> Self {
        let mut records = Vec::new();
        let mut current = DeviceRecord::default();

        for raw in text.lines() {
            let line = raw.trim_end();
            if line.trim().is_empty() {
                if !current.lines.is_empty() {
                    records.push(std::mem::take(&mut current));
                }
                continue;
            }
            let mut chars = line.chars();
            let tag = chars.next().unwrap_or(' ');
            let body = chars.as_str().trim_start_matches(':').trim().to_string();
            current.lines.push(ListingLine { tag, body });
        }
        if !current.lines.is_empty() {
            records.push(current);
        }

        Self { records }
    }

    /// Returns all parsed records in listing order.
    pub fn records(&self) -> &[DeviceRecord] {
        &self.records
    }

    /// Finds the webcam's USB identity.
    ///
    /// Looks for a name line containing `WEBCAM` (any case) and reads the
    /// vendor/product pair from the identity line immediately before it.
    /// When several devices qualify, the last one in the listing wins.
    ///
    /// Returns `None` when no webcam is listed; that is a normal condition
    /// on machines without a camera, not an error.
    pub fn resolve_webcam_identity(&self) -> Option<UsbIdentity> {
        let identity = self
            .records
            .iter()
            .rev()
            .find_map(|record| {
                record.lines.windows(2).rev().find_map(|pair| {
                    let (prev, line) = (&pair[0], &pair[1]);
                    let is_webcam_name = line.tag == 'N'
                        && line.body.to_ascii_uppercase().contains(WEBCAM_MARKER);
                    if is_webcam_name && prev.tag == 'I' {
                        UsbIdentity::from_identity_line(&prev.body)
                    } else {
                        None
                    }
                })
            });

        if let Some(ref id) = identity {
            debug!("webcam identity {}:{}", id.vendor_id(), id.product_id());
        }
        identity
    }

    /// Finds the event node of the `asus-nb-wmi` keyboard.
    ///
    /// The index is taken from the trailing `inputN` component of the
    /// record's sysfs path.  If the same record also lists an `eventM`
    /// handler, that handler names the real event node and is preferred.
    ///
    /// # Errors
    ///
    /// - [`ListingError::WmiKeyboardNotFound`] if no record's sysfs path
    ///   contains [`WMI_SYSFS_SEGMENT`].
    /// - [`ListingError::MalformedSysfsPath`] if the path has no numeric
    ///   `inputN` suffix and no `eventM` handler is listed.
    pub fn resolve_wmi_keyboard_node(&self) -> Result<EventNode, ListingError> {
        let (record, sysfs) = self
            .records
            .iter()
            .find_map(|r| {
                r.sysfs_path()
                    .filter(|s| s.contains(WMI_SYSFS_SEGMENT))
                    .map(|s| (r, s))
            })
            .ok_or(ListingError::WmiKeyboardNotFound)?;

        if let Some(index) = record
            .handlers()
            .iter()
            .find_map(|h| h.strip_prefix("event")?.parse::<u32>().ok())
        {
            return Ok(EventNode { index });
        }

        sysfs
            .rsplit('/')
            .next()
            .and_then(|last| last.strip_prefix("input"))
            .and_then(|n| n.parse::<u32>().ok())
            .map(|index| EventNode { index })
            .ok_or_else(|| ListingError::MalformedSysfsPath(sysfs.to_string()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
