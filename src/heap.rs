//! The arena and its metadata primitives (spec §4.1).
//!
//! `Heap` owns the single byte buffer backing both the cell region and the
//! tag region. Every other module operates on cell addresses and tag bytes
//! through the methods here; nothing outside this file indexes `self.buf`
//! directly.

use log::{debug, trace};

use crate::address::Addr;
use crate::config::HeapConfig;
use crate::error::ConfigError;
use crate::tag::{Tag, CONT_BIT, MARK_BIT};

/// A fixed-size, tagged-cell arena and the collector state (`freeptr`,
/// `mark_tag`) that goes with it.
///
/// A `Heap` cannot exist without having been through [`Heap::init`], so
/// "init must be called exactly once before any other op" (spec §6) holds
/// by construction rather than by runtime check.
pub struct Heap {
    pub(crate) config: HeapConfig,
    pub(crate) buf: Box<[u8]>,
    pub(crate) freeptr: Addr,
    pub(crate) mark_tag: u8,
}

impl Heap {
    /// Validate `config` and initialise a fresh arena: one maximal free
    /// span covering the whole cell region (spec §4.5).
    pub fn init(config: HeapConfig) -> Result<Heap, ConfigError> {
        config.validate()?;

        let mut heap = Heap {
            config,
            buf: vec![0u8; config.mem_bytes as usize].into_boxed_slice(),
            freeptr: Addr::new(config.alloc_base),
            mark_tag: 0,
        };

        let base = heap.freeptr;
        let span_cells = heap.config.cell_count();
        heap.write_free_span(base, span_cells, heap.null_addr());

        debug!(
            "heap initialised: {} cells in [{:?}, {:?}), cell_sz={}",
            span_cells,
            base,
            Addr::new(heap.config.alloc_top()),
            heap.config.cell_sz
        );
        Ok(heap)
    }

    pub fn config(&self) -> HeapConfig {
        self.config
    }

    pub fn cell_sz(&self) -> u32 {
        self.config.cell_sz
    }

    /// The configured null/sentinel address (`ADDR_MASK`), sized to the
    /// arena's cell width.
    pub fn null_addr(&self) -> Addr {
        Addr::new(self.config.addr_mask())
    }

    pub fn is_null(&self, addr: Addr) -> bool {
        addr == self.null_addr()
    }

    pub fn alloc_base(&self) -> Addr {
        Addr::new(self.config.alloc_base)
    }

    pub fn alloc_top(&self) -> Addr {
        Addr::new(self.config.alloc_top())
    }

    pub fn freeptr(&self) -> Addr {
        self.freeptr
    }

    fn tag_index(&self, p: Addr) -> usize {
        (p.raw() / self.config.cell_sz + self.config.tag_base()) as usize
    }

    pub fn tag(&self, p: Addr) -> Tag {
        Tag::from_raw(self.buf[self.tag_index(p)])
    }

    pub fn set_tag(&mut self, p: Addr, t: Tag) {
        let idx = self.tag_index(p);
        self.buf[idx] = t.raw();
    }

    /// Set the mark bit to the current epoch.
    pub fn mark(&mut self, p: Addr) {
        let raw = (self.tag(p).raw() & !MARK_BIT) | self.mark_tag;
        self.set_tag(p, Tag::from_raw(raw));
        trace!("mark {:?}", p);
    }

    /// Set the mark bit to the opposite of the current epoch.
    pub fn unmark(&mut self, p: Addr) {
        let raw = (self.tag(p).raw() & !MARK_BIT) | (self.mark_tag ^ MARK_BIT);
        self.set_tag(p, Tag::from_raw(raw));
    }

    /// True iff `p`'s mark bit does not match the current epoch: an
    /// allocated-but-unreached object between collections, or a free cell
    /// (free spans always satisfy this by construction).
    pub fn is_free(&self, p: Addr) -> bool {
        (self.tag(p).raw() & MARK_BIT) != self.mark_tag
    }

    pub fn has_cont(&self, p: Addr) -> bool {
        self.tag(p).raw() & CONT_BIT != 0
    }

    /// `M(p)`: the address-sized value stored in the cell at `p`.
    pub fn cell(&self, p: Addr) -> Addr {
        let off = p.raw() as usize;
        let width = self.config.cell_sz as usize;
        let mut v: u32 = 0;
        for (i, byte) in self.buf[off..off + width].iter().enumerate() {
            v |= (*byte as u32) << (8 * i);
        }
        Addr::new(v)
    }

    pub fn set_cell(&mut self, p: Addr, v: Addr) {
        let off = p.raw() as usize;
        let width = self.config.cell_sz as usize;
        let raw = v.raw();
        for (i, byte) in self.buf[off..off + width].iter_mut().enumerate() {
            *byte = ((raw >> (8 * i)) & 0xFF) as u8;
        }
    }

    /// `next_free(p) = M(p)`.
    pub fn next_free(&self, p: Addr) -> Addr {
        self.cell(p)
    }

    /// `free_len(p) = has_cont(p) ? M(p + CELL_SZ) : 1`.
    pub fn free_len(&self, p: Addr) -> u32 {
        if self.has_cont(p) {
            self.cell(p + self.cell_sz()).raw()
        } else {
            1
        }
    }

    /// Write a free-span header at `addr`: next pointer `next`, length
    /// `len_cells`. Used both by fresh frees and by the coalescing logic in
    /// `reclaim`.
    pub(crate) fn write_free_span(&mut self, addr: Addr, len_cells: u32, next: Addr) {
        self.set_cell(addr, next);
        let mut t = self.tag(addr);
        if len_cells >= 2 {
            t.set_cont(true);
            self.set_tag(addr, t);
            self.set_cell(addr + self.cell_sz(), Addr::new(len_cells));
        } else {
            t.set_cont(false);
            self.set_tag(addr, t);
        }
        // A free span's mark bit must read "unreachable" under the
        // current epoch (spec §3 free-list invariant), the same state
        // `alloc` leaves a fresh object's first cell in.
        self.unmark(addr);
        debug_assert!(self.is_free(addr));
    }

    /// A human-readable dump of the free list: `"0400(8960) total: 8960"`
    /// for a freshly initialised default-config arena, matching the
    /// format used by the collector's own scenario tests.
    pub fn free_list_summary(&self) -> String {
        let mut out = String::new();
        let mut p = self.freeptr;
        let mut total = 0u32;
        while !self.is_null(p) {
            let len = self.free_len(p);
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&format!("{:?}({})", p, len));
            total += len;
            p = self.next_free(p);
        }
        out.push_str(&format!(" total: {}", total));
        out.trim_start().to_string()
    }
}
