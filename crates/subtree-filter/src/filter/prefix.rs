//! Namespace prefix generation for serialized filters
//!
//! Prefixes are bijective base-26 numerals over `a..=z`: `a`, `b`, ... `z`,
//! `aa`, `ab`, ... `zz`, `aaa`, and so on. Every index gets a distinct
//! prefix and no prefix is skipped.

const DIGITS: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";
const RADIX: usize = 26;

/// Prefixes reserved by the XML namespaces recommendation
pub const RESERVED: &[&str] = &["xml", "xmlns"];

/// Prefix for the zero-based `index`
pub fn prefix_of(index: usize) -> String {
    let mut digits = Vec::new();
    let mut n = index;
    loop {
        if let Some(&digit) = DIGITS.get(n % RADIX) {
            digits.push(digit);
        }
        if n < RADIX {
            break;
        }
        n = n / RADIX - 1;
    }
    digits.iter().rev().map(|&b| char::from(b)).collect()
}

/// Whether `prefix` may not be bound by a document
pub fn is_reserved(prefix: &str) -> bool {
    RESERVED.contains(&prefix)
}

/// Endless sequence of prefixes in allocation order, reserved ones skipped
#[derive(Clone, Debug, Default)]
pub struct Prefixes {
    next: usize,
}

impl Prefixes {
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Next unreserved prefix
    pub fn allocate(&mut self) -> String {
        loop {
            let prefix = prefix_of(self.next);
            self.next = self.next.saturating_add(1);
            if !is_reserved(&prefix) {
                return prefix;
            }
        }
    }
}

impl Iterator for Prefixes {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.allocate())
    }
}
