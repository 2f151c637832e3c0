//! Token arguments
//!
//! Integers parsed out of a `;`-separated list inside a control sequence, and
//! the string body of a graph-mode (OSC) sequence.

/// Maximum number of integers kept per token
pub const MAX_INTS: usize = 16;

/// Arguments attached to the most recent token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    /// Integer values. An omitted value is recorded as 0.
    ints: Vec<i32>,
    /// Graph-mode string body
    string: Option<String>,
    /// Number of integers that did not fit
    dropped: usize,
}

impl Arguments {
    /// Create empty arguments
    pub fn new() -> Self {
        Self {
            ints: Vec::with_capacity(MAX_INTS),
            string: None,
            dropped: 0,
        }
    }

    /// Create arguments from a slice, truncated to capacity
    pub fn from_ints(values: &[i32]) -> Self {
        let mut args = Self::new();
        for &value in values {
            args.push_int(value);
        }
        args
    }

    pub fn clear(&mut self) {
        self.ints.clear();
        self.string = None;
        self.dropped = 0;
    }

    /// Append an integer; values beyond [`MAX_INTS`] are counted and dropped
    pub fn push_int(&mut self, value: i32) {
        if self.ints.len() < MAX_INTS {
            self.ints.push(value);
        } else {
            self.dropped += 1;
        }
    }

    pub fn set_string(&mut self, value: String) {
        self.string = Some(value);
    }

    pub fn ints(&self) -> &[i32] {
        &self.ints
    }

    /// Integer at `index`, or `None` when absent
    pub fn get(&self, index: usize) -> Option<i32> {
        self.ints.get(index).copied()
    }

    /// Integer at `index`, 0 when absent
    pub fn int(&self, index: usize) -> i32 {
        self.get(index).unwrap_or(0)
    }

    /// Integer at `index`, with `default` substituted for absent or zero
    pub fn int_or(&self, index: usize, default: i32) -> i32 {
        match self.get(index) {
            Some(0) | None => default,
            Some(value) => value,
        }
    }

    /// Repeat count at `index`: defaults to 1, never negative
    pub fn count(&self, index: usize) -> usize {
        usize::try_from(self.int_or(index, 1)).unwrap_or(1)
    }

    pub fn string(&self) -> Option<&str> {
        self.string.as_deref()
    }

    pub fn len(&self) -> usize {
        self.ints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ints.is_empty() && self.string.is_none()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Accumulates one `;`-separated integer list, byte by byte
#[derive(Debug, Default)]
pub(crate) struct IntListBuilder {
    current: i32,
    has_value: bool,
    seen_any: bool,
}

impl IntListBuilder {
    /// Feed one digit or `;`. Returns false for any other byte.
    pub(crate) fn feed(&mut self, byte: u8, args: &mut Arguments) -> bool {
        match byte {
            b'0'..=b'9' => {
                self.current = self
                    .current
                    .saturating_mul(10)
                    .saturating_add(i32::from(byte - b'0'));
                self.has_value = true;
                self.seen_any = true;
                true
            }
            b';' => {
                args.push_int(if self.has_value { self.current } else { 0 });
                self.current = 0;
                self.has_value = false;
                self.seen_any = true;
                true
            }
            _ => false,
        }
    }

    /// Flush the trailing value; a trailing `;` yields a final 0
    pub(crate) fn finish(self, args: &mut Arguments) {
        if self.seen_any {
            args.push_int(if self.has_value { self.current } else { 0 });
        }
    }
}
