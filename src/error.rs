//! The collector's one fallible surface: configuration validation.
//!
//! `alloc` signals exhaustion through the `ADDR_MASK` sentinel rather than
//! `Result` (see spec §7) — that is an expected, local outcome the host
//! polices itself. Everything else wrong a host can do to the arena is an
//! undefined-behaviour contract violation by design, not a recoverable
//! error. The only place the crate actually validates input is at
//! construction time, so mistakes are caught before they can corrupt an
//! arena.

use thiserror::Error;

/// Why a [`crate::config::HeapConfig`] was rejected by [`crate::Heap::init`].
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("cell_sz must be a power of two no wider than 4 bytes, got {0}")]
    InvalidCellSize(u32),

    #[error("mem_bytes ({mem_bytes}) must be a multiple of cell_sz ({cell_sz})")]
    UnalignedMemBytes { mem_bytes: u32, cell_sz: u32 },

    #[error("alloc_base ({alloc_base:?}) must be a multiple of cell_sz ({cell_sz})")]
    UnalignedAllocBase {
        alloc_base: crate::address::Addr,
        cell_sz: u32,
    },

    #[error("alloc_base ({alloc_base:?}) must fall before alloc_top ({alloc_top:?})")]
    AllocBaseBeyondArena {
        alloc_base: crate::address::Addr,
        alloc_top: crate::address::Addr,
    },

    #[error(
        "mem_bytes ({mem_bytes}) is too small to hold the tag region for \
         alloc_top ({alloc_top:?}) at cell_sz ({cell_sz}): need {needed} tag bytes"
    )]
    ArenaTooSmallForTagRegion {
        mem_bytes: u32,
        alloc_top: crate::address::Addr,
        cell_sz: u32,
        needed: u32,
    },
}
