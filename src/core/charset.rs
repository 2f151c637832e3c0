//! Character set translation
//!
//! G0/G1 designation and SI/SO invocation, with the DEC special graphics
//! and UK tables.

use serde::{Deserialize, Serialize};

use super::surface::{CharSet, CharSetSlot};

/// Designated tables and the slot currently invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharsetState {
    pub g0: CharSet,
    pub g1: CharSet,
    pub active: CharSetSlot,
}

impl CharsetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn designate(&mut self, slot: CharSetSlot, set: CharSet) {
        match slot {
            CharSetSlot::G0 => self.g0 = set,
            CharSetSlot::G1 => self.g1 = set,
        }
    }

    pub fn invoke(&mut self, slot: CharSetSlot) {
        self.active = slot;
    }

    pub fn current(&self) -> CharSet {
        match self.active {
            CharSetSlot::G0 => self.g0,
            CharSetSlot::G1 => self.g1,
        }
    }

    pub fn translate(&self, c: char) -> char {
        translate_char(c, self.current())
    }
}

pub fn translate_char(c: char, set: CharSet) -> char {
    match set {
        CharSet::Us => c,
        CharSet::Uk if c == '#' => '£',
        CharSet::Uk => c,
        CharSet::DecGraphics => dec_graphics(c),
    }
}

/// 0x5F-0x7E mapped to line drawing and symbols
fn dec_graphics(c: char) -> char {
    match c {
        '_' => ' ',
        '`' => '◆',
        'a' => '▒',
        'b' => '␉',
        'c' => '␌',
        'd' => '␍',
        'e' => '␊',
        'f' => '°',
        'g' => '±',
        'h' => '␤',
        'i' => '␋',
        'j' => '┘',
        'k' => '┐',
        'l' => '┌',
        'm' => '└',
        'n' => '┼',
        'o' => '⎺',
        'p' => '⎻',
        'q' => '─',
        'r' => '⎼',
        's' => '⎽',
        't' => '├',
        'u' => '┤',
        'v' => '┴',
        'w' => '┬',
        'x' => '│',
        'y' => '≤',
        'z' => '≥',
        '{' => 'π',
        '|' => '≠',
        '}' => '£',
        '~' => '·',
        _ => c,
    }
}
