//! Synthetic shortcut combos.
//!
//! A combo is an ordered list of press/release steps.  Modifiers go down in
//! order, then the main key goes down and up, then the modifiers come up in
//! reverse order:
//!
//! ```text
//! Shift+Meta+R:  Shift↓  Meta↓  R↓  R↑  Meta↑  Shift↑
//! ```
//!
//! Every press has a matching later release, so the receiving side never sees
//! a stuck modifier.  The sink sends one synchronisation report after each
//! step; that part lives with the uinput writer in the daemon crate.

/// Linux key codes from `input-event-codes.h`.
const KEY_R: u16 = 19;
const KEY_T: u16 = 20;
const KEY_LEFTSHIFT: u16 = 42;
const KEY_LEFTMETA: u16 = 125;

/// The keys the virtual keyboard declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutKey {
    LeftShift,
    LeftMeta,
    R,
    T,
}

impl ShortcutKey {
    /// The full capability set of the virtual keyboard.
    pub const ALL: [ShortcutKey; 4] = [
        ShortcutKey::LeftShift,
        ShortcutKey::LeftMeta,
        ShortcutKey::R,
        ShortcutKey::T,
    ];

    /// Linux key code for this key.
    pub fn code(self) -> u16 {
        match self {
            ShortcutKey::LeftShift => KEY_LEFTSHIFT,
            ShortcutKey::LeftMeta => KEY_LEFTMETA,
            ShortcutKey::R => KEY_R,
            ShortcutKey::T => KEY_T,
        }
    }
}

/// Key state change carried by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
}

impl KeyAction {
    /// `EV_KEY` value: 1 for press, 0 for release.
    pub fn value(self) -> i32 {
        match self {
            KeyAction::Press => 1,
            KeyAction::Release => 0,
        }
    }
}

/// One press or release inside a combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboStep {
    pub key: ShortcutKey,
    pub action: KeyAction,
}

/// An ordered, symmetric sequence of key steps forming one shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticCombo {
    steps: Vec<ComboStep>,
}

impl SyntheticCombo {
    /// Builds `modifiers... + main` as press-in-order, release-in-reverse.
    pub fn new(modifiers: &[ShortcutKey], main: ShortcutKey) -> Self {
        let press = |key| ComboStep { key, action: KeyAction::Press };
        let release = |key| ComboStep { key, action: KeyAction::Release };

        let steps = modifiers
            .iter()
            .copied()
            .map(press)
            .chain([press(main), release(main)])
            .chain(modifiers.iter().rev().copied().map(release))
            .collect();

        Self { steps }
    }

    /// Shift+Meta+R, sent by the camera key when there is no usable camera.
    pub fn camera_fallback() -> Self {
        Self::new(&[ShortcutKey::LeftShift, ShortcutKey::LeftMeta], ShortcutKey::R)
    }

    /// Shift+Meta+T, sent by the utility key.
    pub fn utility() -> Self {
        Self::new(&[ShortcutKey::LeftShift, ShortcutKey::LeftMeta], ShortcutKey::T)
    }

    pub fn steps(&self) -> &[ComboStep] {
        &self.steps
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
