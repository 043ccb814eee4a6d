//! The per-cell tag byte: four collector-meaningful bits, four reserved for
//! the host (see spec §3 "Tag byte").
//!
//! This is deliberately a handful of `const fn` bit-mask operations rather
//! than a derived bitfield type: the tag byte is read and written on every
//! cell `trace` and `reclaim` visit, so the encoding sits on the hottest
//! path in the crate.

use std::fmt;

use static_assertions::assert_eq_size;

assert_eq_size!(Tag, u8);

/// Current-epoch mark bit. Meaningful only on a first cell.
pub const MARK_BIT: u8 = 0b0000_1000;
/// Set iff the object has more cells (first cell) / another continuation
/// cell follows (continuation cell).
pub const CONT_BIT: u8 = 0b0000_0010;
/// Set iff the cell's value is a pointer into the arena to trace.
pub const PTR_BIT: u8 = 0b0000_0100;
/// The single named host bit.
pub const INFO_BIT: u8 = 0b0000_0001;
/// The four unnamed bits, also free for the host.
pub const RESERVED_MASK: u8 = 0b1111_0000;
/// Everything the collector leaves alone: `INFO_BIT` plus the reserved bits.
pub const INFO_MASK: u8 = INFO_BIT | RESERVED_MASK;

/// A single cell's metadata byte.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Default)]
pub struct Tag(u8);

impl Tag {
    pub const fn from_raw(raw: u8) -> Self {
        Tag(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub const fn has_mark(self) -> bool {
        self.0 & MARK_BIT != 0
    }

    pub const fn has_ptr(self) -> bool {
        self.0 & PTR_BIT != 0
    }

    pub const fn has_cont(self) -> bool {
        self.0 & CONT_BIT != 0
    }

    pub const fn info(self) -> u8 {
        self.0 & INFO_MASK
    }

    pub fn set_mark(&mut self, value: bool) {
        self.set_bit(MARK_BIT, value);
    }

    pub fn set_ptr(&mut self, value: bool) {
        self.set_bit(PTR_BIT, value);
    }

    pub fn set_cont(&mut self, value: bool) {
        self.set_bit(CONT_BIT, value);
    }

    fn set_bit(&mut self, mask: u8, value: bool) {
        if value {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tag {{ mark: {}, ptr: {}, cont: {}, info: {:#04b} }}",
            self.has_mark() as u8,
            self.has_ptr() as u8,
            self.has_cont() as u8,
            self.info(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_are_independent() {
        let mut t = Tag::from_raw(0);
        t.set_mark(true);
        assert!(t.has_mark());
        assert!(!t.has_ptr());
        assert!(!t.has_cont());

        t.set_ptr(true);
        assert!(t.has_mark());
        assert!(t.has_ptr());

        t.set_mark(false);
        assert!(!t.has_mark());
        assert!(t.has_ptr());
    }

    #[test]
    fn info_mask_excludes_collector_bits() {
        let t = Tag::from_raw(0xff);
        assert_eq!(t.info(), INFO_MASK);
    }
}
