//! Keycode → keysym lookup for raw key events.
//!
//! The windowing system hands low-level filters a hardware keycode only; the
//! `Keymap` trait resolves it to a keysym at a given shift level. `TableKeymap`
//! is a plain table-backed implementation with a US layout preset.

use ahash::AHashMap;

/// Keysym values used by the built-in layout table.
///
/// Printable Latin-1 keysyms equal their code points.
pub mod keysyms {
    pub const NO_SYMBOL: u32 = 0;
    pub const SPACE: u32 = 0x0020;
    pub const BACKSPACE: u32 = 0xff08;
    pub const TAB: u32 = 0xff09;
    pub const RETURN: u32 = 0xff0d;
    pub const ESCAPE: u32 = 0xff1b;
    pub const SHIFT_L: u32 = 0xffe1;
    pub const SHIFT_R: u32 = 0xffe2;
    pub const CONTROL_L: u32 = 0xffe3;
    pub const CAPS_LOCK: u32 = 0xffe5;

    /// Keysym for a character: Latin-1 printables map to themselves,
    /// everything else to the Unicode keysym range.
    pub fn from_char(ch: char) -> u32 {
        match ch as u32 {
            cp @ (0x20..=0x7e | 0xa0..=0xff) => cp,
            cp => 0x0100_0000 + cp,
        }
    }

    /// Printable character for a keysym, if it is one.
    pub fn to_char(keysym: u32) -> Option<char> {
        match keysym {
            0x20..=0x7e | 0xa0..=0xff => char::from_u32(keysym),
            // Unicode keysyms
            0x0100_0000..=0x0110_ffff => char::from_u32(keysym - 0x0100_0000),
            _ => None,
        }
    }
}

/// Resolves hardware keycodes to keysyms.
pub trait Keymap {
    /// Keysym for `keycode` at shift level `index` (0 = unshifted,
    /// 1 = shifted). Returns `keysyms::NO_SYMBOL` when unmapped.
    fn lookup_keysym(&self, keycode: u32, index: u32) -> u32;
}

/// Table-backed keymap.
///
/// A level that is missing (or `NO_SYMBOL`) falls back to level 0, so keys
/// such as Return resolve to the same keysym whether or not Shift is held.
#[derive(Debug, Clone, Default)]
pub struct TableKeymap {
    entries: AHashMap<u32, Vec<u32>>,
}

impl TableKeymap {
    pub fn new() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }

    /// Map `keycode` to the given per-level keysyms.
    pub fn insert(&mut self, keycode: u32, levels: &[u32]) {
        self.entries.insert(keycode, levels.to_vec());
    }

    /// Builder form of `insert`.
    pub fn with(mut self, keycode: u32, levels: &[u32]) -> Self {
        self.insert(keycode, levels);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// US QWERTY layout using X11 keycodes (evdev scancode + 8).
    pub fn us() -> Self {
        let mut map = Self::new();

        let rows: [(u32, &str, &str); 4] = [
            (10, "1234567890-=", "!@#$%^&*()_+"),
            (24, "qwertyuiop[]", "QWERTYUIOP{}"),
            (38, "asdfghjkl;'`", "ASDFGHJKL:\"~"),
            (52, "zxcvbnm,./", "ZXCVBNM<>?"),
        ];
        for (first, lower, upper) in rows {
            for (offset, (lo, up)) in lower.chars().zip(upper.chars()).enumerate() {
                map.insert(
                    first + offset as u32,
                    &[keysyms::from_char(lo), keysyms::from_char(up)],
                );
            }
        }
        map.insert(51, &[keysyms::from_char('\\'), keysyms::from_char('|')]);

        map.insert(9, &[keysyms::ESCAPE]);
        map.insert(22, &[keysyms::BACKSPACE]);
        map.insert(23, &[keysyms::TAB]);
        map.insert(36, &[keysyms::RETURN]);
        map.insert(37, &[keysyms::CONTROL_L]);
        map.insert(50, &[keysyms::SHIFT_L]);
        map.insert(62, &[keysyms::SHIFT_R]);
        map.insert(65, &[keysyms::SPACE]);
        map.insert(66, &[keysyms::CAPS_LOCK]);
        map
    }
}

impl Keymap for TableKeymap {
    fn lookup_keysym(&self, keycode: u32, index: u32) -> u32 {
        let Some(levels) = self.entries.get(&keycode) else {
            return keysyms::NO_SYMBOL;
        };
        match levels.get(index as usize).copied() {
            Some(sym) if sym != keysyms::NO_SYMBOL => sym,
            _ => levels.first().copied().unwrap_or(keysyms::NO_SYMBOL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn us_layout_letters_and_digits() {
        let map = TableKeymap::us();
        assert_eq!(map.lookup_keysym(38, 0), 'a' as u32);
        assert_eq!(map.lookup_keysym(38, 1), 'A' as u32);
        assert_eq!(map.lookup_keysym(10, 0), '1' as u32);
        assert_eq!(map.lookup_keysym(10, 1), '!' as u32);
        assert_eq!(map.lookup_keysym(61, 1), '?' as u32);
        assert_eq!(map.lookup_keysym(51, 0), '\\' as u32);
    }

    #[test]
    fn keysym_char_round_trip() {
        assert_eq!(keysyms::from_char('a'), 0x61);
        assert_eq!(keysyms::from_char('é'), 0xe9);
        assert_eq!(keysyms::from_char('가'), 0x0100_ac00);
        for ch in ['a', '~', 'é', '가', 'ぁ', '😀'] {
            assert_eq!(keysyms::to_char(keysyms::from_char(ch)), Some(ch));
        }
        assert_eq!(keysyms::to_char(keysyms::RETURN), None);
    }

    #[test]
    fn single_level_keys_ignore_shift() {
        let map = TableKeymap::us();
        assert_eq!(map.lookup_keysym(36, 0), keysyms::RETURN);
        assert_eq!(map.lookup_keysym(36, 1), keysyms::RETURN);
    }

    #[test]
    fn unmapped_keycode_is_no_symbol() {
        let map = TableKeymap::new().with(200, &[0x61]);
        assert_eq!(map.lookup_keysym(201, 0), keysyms::NO_SYMBOL);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn keysym_chars() {
        assert_eq!(keysyms::to_char(0x61), Some('a'));
        assert_eq!(keysyms::to_char(keysyms::RETURN), None);
        assert_eq!(keysyms::to_char(0x0100_ac00), Some('가'));
    }
}
