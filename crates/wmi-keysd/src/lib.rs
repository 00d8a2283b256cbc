//! wmi-keysd library entry point.
//!
//! Re-exports all modules so that integration tests in `tests/` and the
//! binary entry point in `main.rs` share the same module tree.
//!
//! # What does the daemon do?
//!
//! On Asus laptops driven by `asus-nb-wmi`, the camera key and the MyAsus
//! key arrive as raw WMI scan codes that nothing on the desktop understands.
//! The daemon:
//!
//! 1. Finds the webcam (by the "webcam" device name in the input listing and
//!    its USB vendor/product) and the WMI hotkey device's event node.
//! 2. Grabs the WMI event node so the unmapped codes stop leaking out.
//! 3. Creates a small virtual keyboard.
//! 4. Polls the WMI node: the camera key toggles the webcam's USB
//!    configuration (or sends Shift+Meta+R if there is no usable camera), and
//!    the MyAsus key sends Shift+Meta+T.

/// Application layer: the event dispatcher and its ports.
pub mod application;

/// Startup wiring: device resolution and fatal-error policy.
pub mod bootstrap;

/// Infrastructure layer: procfs/sysfs, evdev, uinput adapters.
pub mod infrastructure;
