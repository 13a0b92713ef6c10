//! Key and raw windowing events, and their translation into the neutral
//! key event the input method consumes.
//!
//! Two paths produce an `ImEvent`:
//!
//! - toolkit key events (`KeyEvent`) already carry a resolved keyval, so
//!   translation is a field copy;
//! - raw windowing-system key events (`RawKeyEvent`) only carry a hardware
//!   keycode, so the keyval is looked up in a `Keymap` at the shift level
//!   selected by Shift XOR CapsLock.

use crate::keymap::Keymap;

bitflags::bitflags! {
    /// Modifier and pointer-button state attached to key and button events.
    ///
    /// Bit positions follow the windowing system's state mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierType: u32 {
        const SHIFT   = 1 << 0;
        const LOCK    = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1    = 1 << 3;
        const MOD2    = 1 << 4;
        const MOD3    = 1 << 5;
        const MOD4    = 1 << 6;
        const MOD5    = 1 << 7;
        const BUTTON1 = 1 << 8;
        const BUTTON2 = 1 << 9;
        const BUTTON3 = 1 << 10;
        const BUTTON4 = 1 << 11;
        const BUTTON5 = 1 << 12;
        const SUPER   = 1 << 26;
        const HYPER   = 1 << 27;
        const META    = 1 << 28;
        const RELEASE = 1 << 30;
    }
}

impl ModifierType {
    /// Parse a `+`-separated modifier list such as `shift+lock`.
    ///
    /// Unknown names yield `None`. The empty string is the empty mask.
    pub fn parse(s: &str) -> Option<Self> {
        let mut mods = ModifierType::empty();
        for name in s.split('+').map(str::trim).filter(|n| !n.is_empty()) {
            mods |= match name.to_ascii_lowercase().as_str() {
                "shift" => ModifierType::SHIFT,
                "lock" | "caps" | "capslock" => ModifierType::LOCK,
                "control" | "ctrl" => ModifierType::CONTROL,
                "mod1" | "alt" => ModifierType::MOD1,
                "mod2" => ModifierType::MOD2,
                "mod3" => ModifierType::MOD3,
                "mod4" => ModifierType::MOD4,
                "mod5" => ModifierType::MOD5,
                "super" => ModifierType::SUPER,
                "hyper" => ModifierType::HYPER,
                "meta" => ModifierType::META,
                _ => return None,
            };
        }
        Some(mods)
    }

    /// Shift level to use when resolving a keycode: 1 when exactly one of
    /// Shift and CapsLock is active, 0 otherwise.
    pub fn shift_level(self) -> u32 {
        let shift = self.contains(ModifierType::SHIFT);
        let lock = self.contains(ModifierType::LOCK);
        u32::from(shift != lock)
    }
}

/// Kind of a neutral key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    KeyPress,
    KeyRelease,
}

/// Payload of a neutral key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyData {
    pub state: ModifierType,
    pub keyval: u32,
    pub hardware_keycode: u32,
}

/// Toolkit-independent key event handed to the input method.
///
/// Built fresh for every translated event; the engine only borrows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImEvent {
    pub event_type: EventType,
    pub key: KeyData,
}

impl ImEvent {
    pub fn new(event_type: EventType, state: ModifierType, keyval: u32, hardware_keycode: u32) -> Self {
        Self {
            event_type,
            key: KeyData {
                state,
                keyval,
                hardware_keycode,
            },
        }
    }

    pub fn is_press(&self) -> bool {
        self.event_type == EventType::KeyPress
    }
}

/// Key event as delivered by the toolkit, with the keyval already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub event_type: EventType,
    pub state: ModifierType,
    pub keyval: u32,
    pub hardware_keycode: u32,
}

impl KeyEvent {
    pub fn press(keyval: u32, hardware_keycode: u32, state: ModifierType) -> Self {
        Self {
            event_type: EventType::KeyPress,
            state,
            keyval,
            hardware_keycode,
        }
    }

    pub fn release(keyval: u32, hardware_keycode: u32, state: ModifierType) -> Self {
        Self {
            event_type: EventType::KeyRelease,
            state,
            keyval,
            hardware_keycode,
        }
    }
}

impl From<&KeyEvent> for ImEvent {
    fn from(event: &KeyEvent) -> Self {
        ImEvent::new(event.event_type, event.state, event.keyval, event.hardware_keycode)
    }
}

/// Raw windowing-system key event: a hardware keycode and modifier state,
/// no keyval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub event_type: EventType,
    pub state: ModifierType,
    pub keycode: u32,
}

/// Event seen by low-level filters before toolkit dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEvent {
    Key(RawKeyEvent),
    ButtonPress { button: u32, state: ModifierType },
    ButtonRelease { button: u32, state: ModifierType },
    Motion { x: i32, y: i32 },
    /// Any other protocol event, identified by its type code.
    Other(u32),
}

impl RawEvent {
    pub fn key_press(keycode: u32, state: ModifierType) -> Self {
        RawEvent::Key(RawKeyEvent {
            event_type: EventType::KeyPress,
            state,
            keycode,
        })
    }

    pub fn key_release(keycode: u32, state: ModifierType) -> Self {
        RawEvent::Key(RawKeyEvent {
            event_type: EventType::KeyRelease,
            state,
            keycode,
        })
    }
}

/// Translate a raw key event, resolving its keyval through `keymap`.
pub fn translate_raw_key(event: &RawKeyEvent, keymap: &dyn Keymap) -> ImEvent {
    let keyval = keymap.lookup_keysym(event.keycode, event.state.shift_level());
    ImEvent::new(event.event_type, event.state, keyval, event.keycode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_and_lock_cancel_out() {
        assert_eq!(ModifierType::empty().shift_level(), 0);
        assert_eq!(ModifierType::SHIFT.shift_level(), 1);
        assert_eq!(ModifierType::LOCK.shift_level(), 1);
        assert_eq!((ModifierType::SHIFT | ModifierType::LOCK).shift_level(), 0);
        // Other modifiers do not affect the level
        assert_eq!((ModifierType::CONTROL | ModifierType::SHIFT).shift_level(), 1);
    }

    #[test]
    fn parse_modifier_lists() {
        assert_eq!(ModifierType::parse(""), Some(ModifierType::empty()));
        assert_eq!(
            ModifierType::parse("shift+caps"),
            Some(ModifierType::SHIFT | ModifierType::LOCK)
        );
        assert_eq!(ModifierType::parse("Ctrl + Alt"), Some(ModifierType::CONTROL | ModifierType::MOD1));
        assert_eq!(ModifierType::parse("shift+bogus"), None);
    }

    #[test]
    fn toolkit_event_keeps_its_keyval() {
        let ev = KeyEvent::release(0x41, 38, ModifierType::SHIFT);
        let im = ImEvent::from(&ev);
        assert_eq!(im.event_type, EventType::KeyRelease);
        assert_eq!(im.key.keyval, 0x41);
        assert_eq!(im.key.hardware_keycode, 38);
        assert_eq!(im.key.state, ModifierType::SHIFT);
        assert!(!im.is_press());
    }
}
