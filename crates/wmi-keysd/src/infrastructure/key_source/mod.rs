//! Real key event source: the grabbed WMI keyboard.
//!
//! - **`wmi_keyboard`** – [`WmiKeyboardHandle`](wmi_keyboard::WmiKeyboardHandle), the
//!   production source reading `/dev/input/eventN`.
//! - **`mock`** – [`ScriptedKeySource`](mock::ScriptedKeySource), which
//!   replays canned batches of events for tests.

pub mod mock;
pub mod wmi_keyboard;
