//! Key Mapper
//!
//! Translates symbolic key names into the byte sequences a VT100/xterm
//! application expects. Cursor keys depend on application cursor mode
//! (DECCKM): normal mode sends `ESC [ x`, application mode sends `ESC O x`.
//! Every other key has a single encoding.

/// Keys that produce escape sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,

    Home,
    End,
    Insert,
    Delete,
    PageUp,
    PageDown,

    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    Enter,
    Tab,
    Backspace,
    Escape,
}

struct KeyEntry {
    name: &'static str,
    key: Key,
    normal: &'static [u8],
    application: &'static [u8],
}

const fn cursor(name: &'static str, key: Key, normal: &'static [u8], application: &'static [u8]) -> KeyEntry {
    KeyEntry {
        name,
        key,
        normal,
        application,
    }
}

const fn fixed(name: &'static str, key: Key, bytes: &'static [u8]) -> KeyEntry {
    KeyEntry {
        name,
        key,
        normal: bytes,
        application: bytes,
    }
}

static KEY_TABLE: &[KeyEntry] = &[
    cursor("UP", Key::Up, b"\x1b[A", b"\x1bOA"),
    cursor("DOWN", Key::Down, b"\x1b[B", b"\x1bOB"),
    cursor("RIGHT", Key::Right, b"\x1b[C", b"\x1bOC"),
    cursor("LEFT", Key::Left, b"\x1b[D", b"\x1bOD"),
    fixed("HOME", Key::Home, b"\x1b[1~"),
    fixed("INSERT", Key::Insert, b"\x1b[2~"),
    fixed("DELETE", Key::Delete, b"\x1b[3~"),
    fixed("END", Key::End, b"\x1b[4~"),
    fixed("PAGE_UP", Key::PageUp, b"\x1b[5~"),
    fixed("PAGE_DOWN", Key::PageDown, b"\x1b[6~"),
    fixed("F1", Key::F1, b"\x1bOP"),
    fixed("F2", Key::F2, b"\x1bOQ"),
    fixed("F3", Key::F3, b"\x1bOR"),
    fixed("F4", Key::F4, b"\x1bOS"),
    fixed("F5", Key::F5, b"\x1b[15~"),
    fixed("F6", Key::F6, b"\x1b[17~"),
    fixed("F7", Key::F7, b"\x1b[18~"),
    fixed("F8", Key::F8, b"\x1b[19~"),
    fixed("F9", Key::F9, b"\x1b[20~"),
    fixed("F10", Key::F10, b"\x1b[21~"),
    fixed("F11", Key::F11, b"\x1b[23~"),
    fixed("F12", Key::F12, b"\x1b[24~"),
    fixed("ENTER", Key::Enter, b"\r"),
    fixed("TAB", Key::Tab, b"\t"),
    fixed("BACKSPACE", Key::Backspace, b"\x7f"),
    fixed("ESCAPE", Key::Escape, b"\x1b"),
];

impl Key {
    /// Look up a key by symbolic name, ignoring case
    pub fn from_name(name: &str) -> Option<Key> {
        KEY_TABLE
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.key)
    }

    /// Symbolic name of this key
    pub fn name(self) -> &'static str {
        self.entry().name
    }

    /// Bytes sent for this key
    pub fn encode(self, application_cursor: bool) -> &'static [u8] {
        let entry = self.entry();
        if application_cursor {
            entry.application
        } else {
            entry.normal
        }
    }

    fn entry(self) -> &'static KeyEntry {
        // Every variant has exactly one table row.
        match KEY_TABLE.iter().find(|e| e.key == self) {
            Some(entry) => entry,
            None => &KEY_TABLE[KEY_TABLE.len() - 1],
        }
    }
}

/// Byte sequence for the key called `name`, or `None` for unknown names
pub fn get_key_code(name: &str, application_cursor: bool) -> Option<&'static [u8]> {
    Key::from_name(name).map(|key| key.encode(application_cursor))
}

/// Every known key name, in table order
pub fn key_names() -> impl Iterator<Item = &'static str> {
    KEY_TABLE.iter().map(|e| e.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_keys_follow_mode() {
        assert_eq!(get_key_code("UP", false), Some(&b"\x1b[A"[..]));
        assert_eq!(get_key_code("UP", true), Some(&b"\x1bOA"[..]));
        assert_eq!(get_key_code("LEFT", true), Some(&b"\x1bOD"[..]));
        assert_eq!(get_key_code("RIGHT", false), Some(&b"\x1b[C"[..]));
    }

    #[test]
    fn test_lookup_ignores_case() {
        assert_eq!(get_key_code("page_down", false), Some(&b"\x1b[6~"[..]));
        assert_eq!(get_key_code("Enter", true), Some(&b"\r"[..]));
        assert_eq!(Key::from_name("f12"), Some(Key::F12));
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(get_key_code("HYPER", false), None);
        assert_eq!(get_key_code("", false), None);
    }

    #[test]
    fn test_non_cursor_keys_ignore_mode() {
        for name in ["HOME", "F1", "F5", "BACKSPACE", "TAB", "ESCAPE"] {
            assert_eq!(get_key_code(name, false), get_key_code(name, true), "{name}");
        }
    }

    #[test]
    fn test_every_name_round_trips() {
        let names: Vec<_> = key_names().collect();
        assert_eq!(names.len(), 26);
        for name in names {
            let key = Key::from_name(name).unwrap();
            assert_eq!(key.name(), name);
        }
    }
}
