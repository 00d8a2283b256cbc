//! EventDispatcher: turns WMI key events into camera toggles and shortcuts.
//!
//! # Dispatch table
//!
//! | Code | Camera available | Action                         |
//! |------|------------------|--------------------------------|
//! | 133  | yes              | [`CameraPower::toggle`]        |
//! | 133  | no               | Shift+Meta+R on the sink       |
//! | 134  | either           | Shift+Meta+T on the sink       |
//! | any other | either      | nothing                        |
//!
//! The list of recognised codes is deliberately closed.  Every other WMI
//! hotkey is left to the platform driver.
//!
//! # Polling model
//!
//! The key source is non-blocking.  [`EventDispatcher::run_until`] drains it
//! on a fixed interval until the shutdown future resolves; the interval bounds
//! both CPU use and worst-case key-to-action latency.  Events are handled in
//! the order the kernel queued them, one at a time.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};
use wmi_keys_core::{CameraUnavailable, KeyEvent, SyntheticCombo, WmiKey};

// ── Errors ────────────────────────────────────────────────────────────────────

/// Error type for the real key event source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open WMI keyboard {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to make WMI keyboard {path} non-blocking: {source}")]
    NonBlocking {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to grab WMI keyboard {path}: {source}")]
    Grab {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read WMI keyboard events: {0}")]
    Read(#[source] io::Error),
}

/// Error type for camera power writes.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("failed to write camera configuration value to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Error type for synthetic key sends.
#[derive(Debug, Error)]
pub enum SendError {
    /// The virtual device was momentarily unable to take the event.
    #[error("virtual keyboard temporarily unavailable: {0}")]
    Transient(#[source] io::Error),
    /// Any other write failure.
    #[error("virtual keyboard write failed: {0}")]
    Device(#[source] io::Error),
}

// ── Ports ─────────────────────────────────────────────────────────────────────

/// Source of WMI key events.
#[cfg_attr(test, mockall::automock)]
pub trait KeyEventSource {
    /// Returns every event queued right now, in kernel order.
    ///
    /// Returns an empty `Vec` when nothing is pending; it never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Read`] if the device read fails for a reason
    /// other than "no data yet".
    fn events(&mut self) -> Result<Vec<KeyEvent>, SourceError>;
}

/// Webcam power switch.
#[cfg_attr(test, mockall::automock)]
pub trait CameraPower {
    /// Inverts the webcam's power state and returns the new state
    /// (`true` = powered).
    ///
    /// Not idempotent: call exactly once per camera-key event.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError`] if the state could not be written; the
    /// recorded state is left unchanged in that case.
    fn toggle(&mut self) -> Result<bool, CameraError>;
}

/// Virtual keyboard that can play a [`SyntheticCombo`].
#[cfg_attr(test, mockall::automock)]
pub trait ShortcutSink {
    /// Sends every step of `combo`, each followed by a synchronisation report.
    ///
    /// # Errors
    ///
    /// Returns [`SendError`] if the virtual device rejects a write.  The
    /// caller drops the combo; there is no retry.
    fn emit_combo(&mut self, combo: &SyntheticCombo) -> Result<(), SendError>;
}

/// Whether the camera key can toggle a webcam this run.
#[derive(Debug)]
pub enum CameraSupport<C> {
    Available(C),
    Unavailable(CameraUnavailable),
}

impl<C> CameraSupport<C> {
    pub fn is_available(&self) -> bool {
        matches!(self, CameraSupport::Available(_))
    }
}

/// What the dispatcher did with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    CameraToggled { powered: bool },
    ToggleFailed,
    ComboSent(WmiKey),
    ComboDropped(WmiKey),
    Ignored,
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// The main loop's state: one key source, the camera, and the shortcut sink.
pub struct EventDispatcher<K, C, S> {
    source: K,
    camera: CameraSupport<C>,
    sink: S,
    camera_fallback: SyntheticCombo,
    utility: SyntheticCombo,
}

impl<K, C, S> EventDispatcher<K, C, S>
where
    K: KeyEventSource,
    C: CameraPower,
    S: ShortcutSink,
{
    pub fn new(source: K, camera: CameraSupport<C>, sink: S) -> Self {
        Self {
            source,
            camera,
            sink,
            camera_fallback: SyntheticCombo::camera_fallback(),
            utility: SyntheticCombo::utility(),
        }
    }

    pub fn source(&self) -> &K {
        &self.source
    }

    pub fn camera(&self) -> &CameraSupport<C> {
        &self.camera
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Handles a single event.
    pub fn handle(&mut self, event: KeyEvent) -> Dispatched {
        match event.classify() {
            Some(WmiKey::Camera) => match &mut self.camera {
                CameraSupport::Available(camera) => match camera.toggle() {
                    Ok(powered) => {
                        info!("camera {}", if powered { "powered on" } else { "powered off" });
                        Dispatched::CameraToggled { powered }
                    }
                    Err(e) => {
                        warn!("camera toggle failed: {e}");
                        Dispatched::ToggleFailed
                    }
                },
                CameraSupport::Unavailable(_) => {
                    send_combo(&mut self.sink, WmiKey::Camera, &self.camera_fallback)
                }
            },
            Some(WmiKey::Utility) => send_combo(&mut self.sink, WmiKey::Utility, &self.utility),
            None => {
                trace!("ignoring WMI code {}", event.code);
                Dispatched::Ignored
            }
        }
    }

    /// Drains the source once and handles every pending event in order.
    ///
    /// Returns the number of events drained.
    ///
    /// # Errors
    ///
    /// Propagates [`SourceError`] from the key source.
    pub fn poll_once(&mut self) -> Result<usize, SourceError> {
        let events = self.source.events()?;
        for event in &events {
            self.handle(*event);
        }
        Ok(events.len())
    }

    /// Polls every `poll_interval` until `shutdown` completes.
    ///
    /// # Errors
    ///
    /// Returns the first [`SourceError`]; a read failure on the grabbed
    /// device means it is gone and the loop cannot continue.
    pub async fn run_until<F>(&mut self, poll_interval: Duration, shutdown: F) -> Result<(), SourceError>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("dispatcher stopping");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    self.poll_once()?;
                }
            }
        }
    }
}

/// Sends `combo` and applies the drop-and-continue policy to failures.
fn send_combo<S: ShortcutSink>(sink: &mut S, key: WmiKey, combo: &SyntheticCombo) -> Dispatched {
    match sink.emit_combo(combo) {
        Ok(()) => {
            debug!("{key:?} key: shortcut sent");
            Dispatched::ComboSent(key)
        }
        Err(SendError::Transient(e)) => {
            debug!("{key:?} key: shortcut dropped, device busy: {e}");
            Dispatched::ComboDropped(key)
        }
        Err(e @ SendError::Device(_)) => {
            warn!("{key:?} key: shortcut dropped: {e}");
            Dispatched::ComboDropped(key)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wmi_keys_core::UsbIdentity;

    fn unavailable() -> CameraSupport<MockCameraPower> {
        CameraSupport::Unavailable(CameraUnavailable::NotFound(UsbIdentity::new("13d3", "56bb")))
    }

    fn idle_source() -> MockKeyEventSource {
        let mut source = MockKeyEventSource::new();
        source.expect_events().returning(|| Ok(Vec::new()));
        source
    }

    // ── Camera key ────────────────────────────────────────────────────────────

    #[test]
    fn test_camera_key_with_camera_toggles_and_never_emits() {
        // Arrange
        let mut camera = MockCameraPower::new();
        camera.expect_toggle().times(1).returning(|| Ok(false));
        let mut sink = MockShortcutSink::new();
        sink.expect_emit_combo().times(0);
        let mut dispatcher =
            EventDispatcher::new(idle_source(), CameraSupport::Available(camera), sink);

        // Act
        let outcome = dispatcher.handle(KeyEvent::new(133));

        // Assert
        assert_eq!(outcome, Dispatched::CameraToggled { powered: false });
    }

    #[test]
    fn test_camera_key_without_camera_emits_shift_meta_r() {
        // Arrange
        let mut sink = MockShortcutSink::new();
        sink.expect_emit_combo()
            .withf(|combo| *combo == SyntheticCombo::camera_fallback())
            .times(1)
            .returning(|_| Ok(()));
        let mut dispatcher = EventDispatcher::new(idle_source(), unavailable(), sink);

        // Act
        let outcome = dispatcher.handle(KeyEvent::new(133));

        // Assert
        assert_eq!(outcome, Dispatched::ComboSent(WmiKey::Camera));
    }

    #[test]
    fn test_camera_toggle_failure_is_reported_not_fatal() {
        let mut camera = MockCameraPower::new();
        camera.expect_toggle().times(1).returning(|| {
            Err(CameraError::Write {
                path: PathBuf::from("/sys/bus/usb/devices/1-5/bConfigurationValue"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            })
        });
        let mut sink = MockShortcutSink::new();
        sink.expect_emit_combo().times(0);
        let mut dispatcher =
            EventDispatcher::new(idle_source(), CameraSupport::Available(camera), sink);

        assert_eq!(dispatcher.handle(KeyEvent::new(133)), Dispatched::ToggleFailed);
    }

    // ── Utility key ───────────────────────────────────────────────────────────

    #[test]
    fn test_utility_key_emits_shift_meta_t_even_with_camera() {
        // Arrange
        let mut camera = MockCameraPower::new();
        camera.expect_toggle().times(0);
        let mut sink = MockShortcutSink::new();
        sink.expect_emit_combo()
            .withf(|combo| *combo == SyntheticCombo::utility())
            .times(1)
            .returning(|_| Ok(()));
        let mut dispatcher =
            EventDispatcher::new(idle_source(), CameraSupport::Available(camera), sink);

        // Act / Assert
        assert_eq!(dispatcher.handle(KeyEvent::new(134)), Dispatched::ComboSent(WmiKey::Utility));
    }

    #[test]
    fn test_transient_send_failure_drops_combo() {
        let mut sink = MockShortcutSink::new();
        sink.expect_emit_combo()
            .times(1)
            .returning(|_| Err(SendError::Transient(io::Error::from(io::ErrorKind::WouldBlock))));
        let mut dispatcher = EventDispatcher::new(idle_source(), unavailable(), sink);

        assert_eq!(dispatcher.handle(KeyEvent::new(134)), Dispatched::ComboDropped(WmiKey::Utility));
    }

    #[test]
    fn test_device_send_failure_drops_combo() {
        let mut sink = MockShortcutSink::new();
        sink.expect_emit_combo()
            .times(1)
            .returning(|_| Err(SendError::Device(io::Error::from(io::ErrorKind::BrokenPipe))));
        let mut dispatcher = EventDispatcher::new(idle_source(), unavailable(), sink);

        assert_eq!(dispatcher.handle(KeyEvent::new(133)), Dispatched::ComboDropped(WmiKey::Camera));
    }

    // ── Other codes ───────────────────────────────────────────────────────────

    #[test]
    fn test_unrecognised_codes_touch_neither_camera_nor_sink() {
        // Arrange
        let mut camera = MockCameraPower::new();
        camera.expect_toggle().times(0);
        let mut sink = MockShortcutSink::new();
        sink.expect_emit_combo().times(0);
        let mut dispatcher =
            EventDispatcher::new(idle_source(), CameraSupport::Available(camera), sink);

        // Act / Assert
        for code in [0, 1, 107, 132, 135, 197] {
            assert_eq!(dispatcher.handle(KeyEvent::new(code)), Dispatched::Ignored);
        }
    }

    // ── Polling ───────────────────────────────────────────────────────────────

    #[test]
    fn test_poll_once_handles_events_in_queue_order() {
        // Arrange: utility then camera in one drain
        let mut source = MockKeyEventSource::new();
        source
            .expect_events()
            .times(1)
            .returning(|| Ok(vec![KeyEvent::new(134), KeyEvent::new(133)]));
        let mut seq = mockall::Sequence::new();
        let mut sink = MockShortcutSink::new();
        sink.expect_emit_combo()
            .withf(|c| *c == SyntheticCombo::utility())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        sink.expect_emit_combo()
            .withf(|c| *c == SyntheticCombo::camera_fallback())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        let mut dispatcher = EventDispatcher::new(source, unavailable(), sink);

        // Act
        let drained = dispatcher.poll_once().unwrap();

        // Assert
        assert_eq!(drained, 2);
    }

    #[test]
    fn test_poll_once_propagates_read_error() {
        let mut source = MockKeyEventSource::new();
        source
            .expect_events()
            .returning(|| Err(SourceError::Read(io::Error::from_raw_os_error(libc::ENODEV))));
        let mut dispatcher = EventDispatcher::new(source, unavailable(), MockShortcutSink::new());

        assert!(matches!(dispatcher.poll_once(), Err(SourceError::Read(_))));
    }

    #[tokio::test]
    async fn test_run_until_returns_when_shutdown_completes() {
        // Arrange
        let mut dispatcher =
            EventDispatcher::new(idle_source(), unavailable(), MockShortcutSink::new());

        // Act
        let result = dispatcher
            .run_until(Duration::from_millis(5), tokio::time::sleep(Duration::from_millis(30)))
            .await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_run_until_stops_on_read_error() {
        let mut source = MockKeyEventSource::new();
        source
            .expect_events()
            .returning(|| Err(SourceError::Read(io::Error::from_raw_os_error(libc::ENODEV))));
        let mut dispatcher = EventDispatcher::new(source, unavailable(), MockShortcutSink::new());

        let result = dispatcher
            .run_until(Duration::from_millis(5), std::future::pending::<()>())
            .await;

        assert!(matches!(result, Err(SourceError::Read(_))));
    }
}
