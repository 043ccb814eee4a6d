//! First-fit allocation and free-list splitting (spec §4.2).

use log::{debug, trace};

use crate::address::Addr;
use crate::heap::Heap;
use crate::tag::{Tag, CONT_BIT};

impl Heap {
    /// Allocate `n_cells` contiguous cells, tagging the first cell's host
    /// bits with `info_tag`. Returns the start address, or the arena's null
    /// sentinel on exhaustion. `n_cells` must be at least 1.
    pub fn alloc(&mut self, n_cells: u32, info_tag: u8) -> Addr {
        assert!(n_cells >= 1, "alloc: n_cells must be >= 1");

        let mut prev = self.null_addr();
        let mut p = self.freeptr;
        while !self.is_null(p) {
            if self.free_len(p) >= n_cells {
                break;
            }
            prev = p;
            p = self.next_free(p);
        }

        if self.is_null(p) {
            debug!("alloc({n_cells}, {info_tag:#x}): exhausted");
            return self.null_addr();
        }

        let len = self.free_len(p);
        let successor = self.next_free(p);

        if len == n_cells {
            self.link_free_after(prev, successor);
            trace!("alloc({n_cells}): consumed whole span at {:?}", p);
        } else {
            let tail = p + n_cells * self.cell_sz();
            let remainder = len - n_cells;
            self.write_free_span(tail, remainder, successor);
            self.link_free_after(prev, tail);
            trace!(
                "alloc({n_cells}): split span at {:?}, {} cells remain at {:?}",
                p,
                remainder,
                tail
            );
        }

        self.write_object_header(p, n_cells, info_tag);
        debug!("alloc({n_cells}, {info_tag:#x}) -> {:?}", p);
        p
    }

    /// Point `prev`'s successor (or `freeptr`, if there is no `prev`) at
    /// `next`.
    fn link_free_after(&mut self, prev: Addr, next: Addr) {
        if self.is_null(prev) {
            self.freeptr = next;
        } else {
            self.set_cell(prev, next);
        }
    }

    /// Write the tags for a freshly carved `n_cells`-long object starting
    /// at `p`: first cell gets the host's info bits, `CONT` if more than
    /// one cell, and a mark bit that reads as "unreached this epoch";
    /// continuation cells get `CONT` except the last, which gets a clean
    /// tag.
    fn write_object_header(&mut self, p: Addr, n_cells: u32, info_tag: u8) {
        let mut first = Tag::from_raw(info_tag & crate::tag::INFO_MASK);
        first.set_cont(n_cells > 1);
        self.set_tag(p, first);
        // `unmark` sets the bit opposite mark_tag, exactly the "unreached
        // this epoch" state a fresh object needs (spec §4.2).
        self.unmark(p);

        for i in 1..n_cells {
            let cell_addr = p + i * self.cell_sz();
            let raw = if i + 1 < n_cells { CONT_BIT } else { 0 };
            self.set_tag(cell_addr, Tag::from_raw(raw));
        }
    }
}
