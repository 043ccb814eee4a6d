//! Arena-relative addresses.
//!
//! `Addr` is a thin wrapper around the byte offset of a cell within the
//! arena. It carries no information about what is stored there; that lives
//! in the tag byte (see [`crate::tag`]). Keeping it as a distinct type
//! rather than a bare `u32` stops cell addresses and cell *counts* from
//! being accidentally interchanged, which is the easiest mistake to make
//! in this kind of code.

use std::fmt;
use std::ops::{Add, Sub};

/// An address of a cell within the arena, or a cell count, depending on
/// context (the collector stores both in cell-sized slots).
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash, Default)]
pub struct Addr(u32);

impl Addr {
    pub const fn new(raw: u32) -> Self {
        Addr(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl Add<u32> for Addr {
    type Output = Addr;
    fn add(self, rhs: u32) -> Addr {
        Addr(self.0 + rhs)
    }
}

impl Sub<u32> for Addr {
    type Output = Addr;
    fn sub(self, rhs: u32) -> Addr {
        Addr(self.0 - rhs)
    }
}

/// Distance in bytes between two addresses. The caller is responsible for
/// dividing by `cell_sz` where a cell count is wanted.
impl Sub<Addr> for Addr {
    type Output = u32;
    fn sub(self, rhs: Addr) -> u32 {
        self.0 - rhs.0
    }
}

impl fmt::Debug for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
