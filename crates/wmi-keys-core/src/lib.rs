//! # wmi-keys-core
//!
//! Shared library for the Asus WMI hotkey daemon containing the input-device
//! listing parser, the USB identity / match policy, the WMI key model, and the
//! synthetic shortcut combos.
//!
//! This crate has zero dependencies on OS APIs.  Everything here operates on
//! text that the daemon has already read from `/proc` or `/sys`, which keeps
//! the interesting decisions testable without real hardware.
//!
//! # Architecture overview
//!
//! The stock `asus-nb-wmi` platform driver reports two hotkeys (the camera key
//! and the "MyAsus" key) as raw scan codes with no key mapping.  The daemon
//! grabs the WMI keyboard's event node and gives those two codes a meaning:
//!
//! - **`listing`** – Parses `/proc/bus/input/devices` and answers two
//!   questions: "what is the webcam's USB vendor/product?" and "which event
//!   node belongs to the WMI keyboard?".
//!
//! - **`domain`** – The webcam and key model: [`UsbIdentity`], the
//!   exactly-one-match policy ([`UsbMatch`]), [`WebcamDevice`] power state,
//!   and [`KeyEvent`] classification into [`WmiKey`].
//!
//! - **`keymap`** – The fixed four-key capability set of the virtual keyboard
//!   and the ordered press/release steps of each [`SyntheticCombo`].

pub mod domain;
pub mod keymap;
pub mod listing;

pub use domain::keys::{KeyEvent, WmiKey, KEY_WMI_CAMERA, KEY_WMI_UTILITY};
pub use domain::usb::{select_webcam, UsbDeviceAttributes, UsbIdentity, UsbMatch};
pub use domain::webcam::{CameraUnavailable, WebcamDevice};
pub use keymap::combo::{ComboStep, KeyAction, ShortcutKey, SyntheticCombo};
pub use listing::{DeviceListing, EventNode, ListingError};
