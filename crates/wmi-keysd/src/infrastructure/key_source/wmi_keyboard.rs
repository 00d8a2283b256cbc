//! evdev reader for the `asus-nb-wmi` hotkey device.
//!
//! # Why grab?
//!
//! The stock driver has no key mapping for the camera and MyAsus codes, so
//! without a grab the rest of the system would see them as unknown keys.
//! `EVIOCGRAB` makes this process the only reader of the event node.  Keys
//! the driver does map are unaffected: the grab covers this one logical node,
//! not the physical keyboard controller.
//!
//! # Event format
//!
//! For each hotkey the driver writes an `EV_MSC / MSC_SCAN` event carrying the
//! WMI code, followed by the (possibly `KEY_UNKNOWN`) key event and a
//! `SYN_REPORT`.  Only the scan events are turned into [`KeyEvent`]s.
//!
//! # Teardown
//!
//! The grab is released in `Drop`, and the descriptor closes when the inner
//! `evdev::Device` drops.  The daemon's shutdown path returns out of the main
//! loop on SIGINT/SIGTERM, so the handle is dropped on every exit path that
//! runs destructors.

use std::io;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use evdev::{Device, EventType, InputEvent, MiscType};
use tracing::{debug, info, warn};
use wmi_keys_core::KeyEvent;

use crate::application::dispatch::{KeyEventSource, SourceError};

/// Exclusive, non-blocking handle on the WMI keyboard's event node.
pub struct WmiKeyboardHandle {
    device: Device,
    event_node_path: PathBuf,
    grabbed: bool,
}

impl WmiKeyboardHandle {
    /// Opens `path`, switches it to non-blocking mode and grabs it.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Open`], [`SourceError::NonBlocking`] or
    /// [`SourceError::Grab`] for the step that failed.  All three are fatal
    /// at startup.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let mut device = Device::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        set_nonblocking(&device).map_err(|source| SourceError::NonBlocking {
            path: path.to_path_buf(),
            source,
        })?;

        device.grab().map_err(|source| SourceError::Grab {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            "grabbed WMI keyboard {} ({})",
            path.display(),
            device.name().unwrap_or("unnamed")
        );

        Ok(Self {
            device,
            event_node_path: path.to_path_buf(),
            grabbed: true,
        })
    }

    pub fn event_node_path(&self) -> &Path {
        &self.event_node_path
    }

    pub fn is_grabbed(&self) -> bool {
        self.grabbed
    }

    /// Releases the exclusive grab.  Safe to call more than once.
    pub fn release(&mut self) {
        if !self.grabbed {
            return;
        }
        match self.device.ungrab() {
            Ok(()) => debug!("released WMI keyboard {}", self.event_node_path.display()),
            Err(e) => warn!("failed to ungrab {}: {e}", self.event_node_path.display()),
        }
        self.grabbed = false;
    }
}

impl KeyEventSource for WmiKeyboardHandle {
    fn events(&mut self) -> Result<Vec<KeyEvent>, SourceError> {
        match self.device.fetch_events() {
            Ok(events) => Ok(events.filter_map(|ev| scan_code(&ev)).collect()),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(Vec::new()),
            Err(e) => Err(SourceError::Read(e)),
        }
    }
}

impl Drop for WmiKeyboardHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Extracts the WMI code from an `EV_MSC / MSC_SCAN` event.
fn scan_code(ev: &InputEvent) -> Option<KeyEvent> {
    (ev.event_type() == EventType::MISC && ev.code() == MiscType::MSC_SCAN.0)
        .then(|| KeyEvent::new(ev.value()))
}

fn set_nonblocking(device: &Device) -> io::Result<()> {
    let raw_fd = device.as_raw_fd();

    // Preserve existing flags; just OR in O_NONBLOCK.
    let current = unsafe { libc::fcntl(raw_fd, libc::F_GETFL) };
    if current < 0 {
        return Err(io::Error::last_os_error());
    }
    let rc = unsafe { libc::fcntl(raw_fd, libc::F_SETFL, current | libc::O_NONBLOCK) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
