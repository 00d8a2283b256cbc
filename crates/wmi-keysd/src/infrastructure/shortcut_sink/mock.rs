//! Recording shortcut sink for dispatcher tests.
//!
//! Stores every combo it is asked to play.  Set `fail_with` to make each call
//! fail with the given errno instead; `EBUSY` maps to a transient failure,
//! anything else to a device failure.

use std::io;

use wmi_keys_core::SyntheticCombo;

use crate::application::dispatch::{SendError, ShortcutSink};

#[derive(Debug, Default)]
pub struct RecordingShortcutSink {
    pub combos: Vec<SyntheticCombo>,
    pub fail_with: Option<i32>,
}

impl RecordingShortcutSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShortcutSink for RecordingShortcutSink {
    fn emit_combo(&mut self, combo: &SyntheticCombo) -> Result<(), SendError> {
        match self.fail_with {
            Some(libc::EBUSY) => Err(SendError::Transient(io::Error::from_raw_os_error(libc::EBUSY))),
            Some(errno) => Err(SendError::Device(io::Error::from_raw_os_error(errno))),
            None => {
                self.combos.push(combo.clone());
                Ok(())
            }
        }
    }
}
