//! WMI hotkey codes and their classification.
//!
//! The `asus-nb-wmi` driver reports every hotkey as an `EV_MSC / MSC_SCAN`
//! event whose value is the WMI code.  Only two of those codes mean anything
//! to this daemon; the rest are left alone on purpose.

/// WMI code of the camera key.
pub const KEY_WMI_CAMERA: i32 = 133;

/// WMI code of the vendor utility ("MyAsus") key.
pub const KEY_WMI_UTILITY: i32 = 134;

/// A single hardware event value read from the WMI keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: i32,
}

/// The WMI keys the daemon acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WmiKey {
    /// Toggles webcam power, or sends Shift+Meta+R when there is no camera.
    Camera,
    /// Sends Shift+Meta+T.
    Utility,
}

impl KeyEvent {
    pub fn new(code: i32) -> Self {
        Self { code }
    }

    /// Maps the event to a [`WmiKey`].
    ///
    /// Returns `None` for every code outside the recognised pair.
    pub fn classify(&self) -> Option<WmiKey> {
        match self.code {
            KEY_WMI_CAMERA => Some(WmiKey::Camera),
            KEY_WMI_UTILITY => Some(WmiKey::Utility),
            _ => None,
        }
    }
}
