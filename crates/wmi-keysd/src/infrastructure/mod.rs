//! Infrastructure layer for the daemon.
//!
//! Contains the OS-facing adapters behind the application ports:
//!
//! - **`config`** – [`DaemonConfig`](config::DaemonConfig): filesystem
//!   locations and the poll interval, with environment overrides.
//! - **`locator`** – Reads `/proc/bus/input/devices` and walks
//!   `/sys/bus/usb/devices` to find the WMI keyboard and the webcam.
//! - **`camera_power`** – `bConfigurationValue`-backed
//!   [`CameraPower`](crate::application::dispatch::CameraPower).
//! - **`key_source`** – Grabbed, non-blocking evdev reader for the WMI
//!   keyboard.
//! - **`shortcut_sink`** – uinput virtual keyboard.
//!
//! Each port module also has a `mock` submodule with an in-memory
//! implementation for tests.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `wmi_keys_core`, but MUST NOT be imported by the `application` layer.

pub mod camera_power;
pub mod config;
pub mod key_source;
pub mod locator;
pub mod shortcut_sink;
