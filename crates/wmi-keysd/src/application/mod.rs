//! Application layer for the daemon.
//!
//! - **`dispatch`** – The event dispatcher: drains WMI key events, classifies
//!   them, and drives the camera power port or the shortcut sink port.  The
//!   ports ([`KeyEventSource`](dispatch::KeyEventSource),
//!   [`CameraPower`](dispatch::CameraPower),
//!   [`ShortcutSink`](dispatch::ShortcutSink)) are traits; the evdev, sysfs
//!   and uinput implementations live in the infrastructure layer and are
//!   injected at construction time.
//!
//! **Dependency rule**: this layer depends on `wmi_keys_core` only.  It MUST
//! NOT import anything from `infrastructure`.

pub mod dispatch;
