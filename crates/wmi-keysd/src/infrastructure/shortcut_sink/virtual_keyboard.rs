//! uinput virtual keyboard.
//!
//! The device declares exactly four keys (left Shift, left Meta, `R`, `T`),
//! enough for the two shortcut combos.  Each combo step is written as its own
//! report: one `EV_KEY` event followed by `SYN_REPORT`, so a listener sees one
//! key change at a time.
//!
//! # Failure policy
//!
//! Write failures are classified into [`SendError::Transient`] (the device
//! is momentarily busy) and [`SendError::Device`] (anything else).  The
//! first failing step aborts the rest of the combo, and every key the combo
//! already pressed is released again in reverse order so no modifier stays
//! down.  The dispatcher then drops the combo.

use std::io;

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key};
use tracing::{debug, info};
use wmi_keys_core::{KeyAction, ShortcutKey, SyntheticCombo};

use crate::application::dispatch::{SendError, ShortcutSink};

/// Something that accepts input reports.
pub trait ReportWriter {
    /// Writes `events` followed by a `SYN_REPORT`.
    fn write_report(&mut self, events: &[InputEvent]) -> io::Result<()>;
}

impl ReportWriter for VirtualDevice {
    fn write_report(&mut self, events: &[InputEvent]) -> io::Result<()> {
        // `emit` appends the SYN_REPORT itself.
        self.emit(events)
    }
}

/// Virtual keyboard implementing [`ShortcutSink`].
pub struct VirtualKeyboard<W = VirtualDevice> {
    writer: W,
}

impl VirtualKeyboard<VirtualDevice> {
    /// Creates the uinput device with the four-key capability set.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if `/dev/uinput` cannot be opened or
    /// the device cannot be registered.
    pub fn create(name: &str) -> io::Result<Self> {
        let mut keys = AttributeSet::<Key>::new();
        for key in ShortcutKey::ALL {
            keys.insert(Key::new(key.code()));
        }

        let device = VirtualDeviceBuilder::new()?
            .name(name)
            .with_keys(&keys)?
            .build()?;

        info!("created virtual keyboard {name:?}");
        Ok(Self::with_writer(device))
    }
}

impl<W: ReportWriter> VirtualKeyboard<W> {
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<W: ReportWriter> VirtualKeyboard<W> {
    fn write_step(&mut self, key: ShortcutKey, action: KeyAction) -> io::Result<()> {
        let event = InputEvent::new(EventType::KEY, key.code(), action.value());
        self.writer.write_report(&[event])
    }

    /// Best-effort release of `held`, last pressed first.
    fn release_held(&mut self, held: &[ShortcutKey]) {
        for &key in held.iter().rev() {
            if let Err(e) = self.write_step(key, KeyAction::Release) {
                debug!("could not release {key:?} after failed combo: {e}");
            }
        }
    }
}

impl<W: ReportWriter> ShortcutSink for VirtualKeyboard<W> {
    fn emit_combo(&mut self, combo: &SyntheticCombo) -> Result<(), SendError> {
        let mut held: Vec<ShortcutKey> = Vec::new();
        for step in combo.steps() {
            if let Err(e) = self.write_step(step.key, step.action) {
                self.release_held(&held);
                return Err(classify(e));
            }
            match step.action {
                KeyAction::Press => held.push(step.key),
                KeyAction::Release => held.retain(|&k| k != step.key),
            }
        }
        Ok(())
    }
}

/// Splits write failures into "try later" and everything else.
fn classify(e: io::Error) -> SendError {
    let transient = matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    ) || e.raw_os_error() == Some(libc::EBUSY);

    if transient {
        SendError::Transient(e)
    } else {
        SendError::Device(e)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
