//! Key tables for the synthetic keyboard.
//!
//! The virtual keyboard only ever needs four keys, so instead of a full
//! translation table this module defines [`ShortcutKey`] with the Linux
//! `input-event-codes.h` value of each key, and the two shortcut combos built
//! from them.

pub mod combo;
