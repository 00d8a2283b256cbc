//! Asus WMI hotkey daemon entry point.
//!
//! Resolves the devices, opens them, and runs the dispatcher until SIGINT or
//! SIGTERM.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ plan_startup()             -- listing, webcam, WMI node (no device opened)
//!  └─ WmiKeyboardHandle::open()  -- open + O_NONBLOCK + grab
//!  └─ VirtualKeyboard::create()  -- uinput device, 4 keys
//!  └─ EventDispatcher::run_until(poll_interval, shutdown_signal())
//!       ├─ 133 → camera toggle / Shift+Meta+R
//!       ├─ 134 → Shift+Meta+T
//!       └─ other → ignored
//! ```
//!
//! # Exit status
//!
//! `0` after a signal-initiated shutdown, `1` on any fatal startup failure or
//! if the grabbed device stops being readable.  In every case the dispatcher
//! (and with it the grab) is dropped before the process exits.

use std::process::ExitCode;

use anyhow::Context;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wmi_keysd::application::dispatch::EventDispatcher;
use wmi_keysd::bootstrap::{exit_status, plan_startup, StartupError};
use wmi_keysd::infrastructure::{
    config::DaemonConfig, key_source::wmi_keyboard::WmiKeyboardHandle, locator::DeviceLocator,
    shortcut_sink::virtual_keyboard::VirtualKeyboard,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialise structured logging on stderr.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Asus WMI keys daemon starting");

    let outcome = run(DaemonConfig::from_env()).await;
    match &outcome {
        Ok(()) => info!("Asus WMI keys daemon stopped"),
        Err(e) => error!("{e:#}, exiting"),
    }
    ExitCode::from(exit_status(&outcome))
}

/// Runs the daemon until a shutdown signal.  Every owned device is dropped
/// (and the grab released) before this returns, on success and on error.
async fn run(config: DaemonConfig) -> anyhow::Result<()> {
    // ── Device resolution ─────────────────────────────────────────────────────
    let plan = plan_startup(&DeviceLocator::new(&config))?;

    // ── Open devices ──────────────────────────────────────────────────────────
    let keyboard =
        WmiKeyboardHandle::open(&plan.keyboard_node).map_err(StartupError::KeyboardUnavailable)?;
    let sink = VirtualKeyboard::create(&config.virtual_device_name)
        .map_err(StartupError::VirtualKeyboard)?;

    // ── Main loop ─────────────────────────────────────────────────────────────
    let mut dispatcher = EventDispatcher::new(keyboard, plan.camera, sink);
    info!(
        "ready (camera key {}), polling every {:?}",
        if dispatcher.camera().is_available() { "toggles webcam" } else { "sends Shift+Meta+R" },
        config.poll_interval
    );

    dispatcher
        .run_until(config.poll_interval, shutdown_signal())
        .await
        .context("WMI keyboard stopped delivering events")
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            warn!("cannot listen for SIGTERM: {e}");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
    info!("shutdown signal received");
}
