//! Scripted key source for tests.
//!
//! Each call to `events()` pops the next queued batch; once the script runs
//! out it returns empty batches, like an idle non-blocking device.

use std::collections::VecDeque;

use wmi_keys_core::KeyEvent;

use crate::application::dispatch::{KeyEventSource, SourceError};

#[derive(Debug, Default)]
pub struct ScriptedKeySource {
    batches: VecDeque<Vec<KeyEvent>>,
    /// Number of times `events()` has been called.
    pub polls: usize,
}

impl ScriptedKeySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one drain's worth of events, given as raw WMI codes.
    pub fn push_batch(&mut self, codes: &[i32]) -> &mut Self {
        self.batches
            .push_back(codes.iter().copied().map(KeyEvent::new).collect());
        self
    }

    /// Number of batches not yet drained.
    pub fn pending(&self) -> usize {
        self.batches.len()
    }
}

impl KeyEventSource for ScriptedKeySource {
    fn events(&mut self) -> Result<Vec<KeyEvent>, SourceError> {
        self.polls += 1;
        Ok(self.batches.pop_front().unwrap_or_default())
    }
}
