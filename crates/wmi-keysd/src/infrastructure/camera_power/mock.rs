//! Recording camera power switch for tests.

use std::io;
use std::path::PathBuf;

use crate::application::dispatch::{CameraError, CameraPower};

/// Flips an in-memory flag and counts calls.  Set `should_fail` to make every
/// toggle return [`CameraError::Write`].
#[derive(Debug, Default)]
pub struct RecordingCameraPower {
    pub powered: bool,
    pub toggles: usize,
    pub should_fail: bool,
}

impl RecordingCameraPower {
    pub fn new(powered: bool) -> Self {
        Self {
            powered,
            ..Self::default()
        }
    }
}

impl CameraPower for RecordingCameraPower {
    fn toggle(&mut self) -> Result<bool, CameraError> {
        if self.should_fail {
            return Err(CameraError::Write {
                path: PathBuf::from("mock"),
                source: io::Error::new(io::ErrorKind::Other, "mock failure"),
            });
        }
        self.toggles += 1;
        self.powered = !self.powered;
        Ok(self.powered)
    }
}
