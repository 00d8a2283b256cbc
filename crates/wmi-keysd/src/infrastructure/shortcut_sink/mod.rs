//! Synthetic keyboard sink: a uinput virtual keyboard for shortcut combos.
//!
//! - **`virtual_keyboard`** –
//!   [`VirtualKeyboard`](virtual_keyboard::VirtualKeyboard), the production
//!   sink, generic over the [`ReportWriter`](virtual_keyboard::ReportWriter)
//!   it writes to.
//! - **`mock`** – [`RecordingShortcutSink`](mock::RecordingShortcutSink),
//!   which records whole combos for dispatcher tests.

pub mod mock;
pub mod virtual_keyboard;
