// Copyright (c) 2019 King's College London created by the Software Development
// Team <http://soft-dev.org/>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, or the MIT license <LICENSE-MIT
// or http://opensource.org/licenses/MIT>, or the UPL-1.0 license
// <http://opensource.org/licenses/UPL> at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The collector proper: Deutsch-Schorr-Waite tracing (spec §4.3) and the
//! coalescing sweep (spec §4.4).

use log::{debug, trace as log_trace};

use crate::address::Addr;
use crate::heap::Heap;
use crate::tag::MARK_BIT;

impl Heap {
    /// Mark every object reachable from `root`, using pointer reversal so
    /// the auxiliary storage is O(1) regardless of graph depth.
    ///
    /// `root` must be the address of an allocation's first cell, or the
    /// arena's null sentinel (a no-op). Calling `trace` twice with no
    /// intervening mutation is idempotent: the second call finds `root`
    /// already marked and returns immediately.
    ///
    /// `p` always names the cell currently under inspection; `back` names
    /// the field cell we reversed through to get here, threading the
    /// return path through the objects themselves. A field is only ever
    /// reversed on descent into an *unmarked* target, so the ascent below
    /// always finds `back`'s cell still holding the address it is meant
    /// to be restored to — including across however many of `back`'s own
    /// descendants' fields had no sibling to advance into and had to pop
    /// straight through.
    pub fn trace(&mut self, root: Addr) {
        if self.is_null(root) || !self.is_free(root) {
            return;
        }
        self.mark(root);

        let mut p = root;
        let mut back = self.null_addr();

        loop {
            let tag = self.tag(p);
            if tag.has_ptr() {
                let target = self.cell(p);
                // Guard against the null sentinel before any tag lookup:
                // `is_free` on an out-of-range address is undefined
                // (spec §9 open question).
                if !self.is_null(target) && self.is_free(target) {
                    self.mark(target);
                    log_trace!("trace: descend {:?} -> {:?}", p, target);
                    let tmp = target;
                    self.set_cell(p, back);
                    back = p;
                    p = tmp;
                    continue;
                }
            }

            // Nothing left to descend into from `p`: ascend, popping
            // through as many fields as have no further sibling.
            loop {
                if self.is_null(back) {
                    return;
                }
                let field = back;
                let saved = self.cell(field);
                self.set_cell(field, p);
                back = saved;
                if self.has_cont(field) {
                    log_trace!("trace: ascend through {:?}, resume at sibling", field);
                    p = field + self.cell_sz();
                    break;
                }
                // `field` was the last cell of its object: that object is
                // now fully traced, and is itself the value to restore
                // into whichever field `back` (now `saved`) pointed here.
                p = field;
            }
        }
    }

    /// Sweep the cell region, returning every unmarked object's cells to
    /// the free list and coalescing adjacent free runs. Does not flip the
    /// mark epoch; call [`Heap::flip_epoch`] afterwards to complete the
    /// collection cycle.
    pub fn reclaim(&mut self) {
        let alloc_top = self.alloc_top();
        let cell_sz = self.cell_sz();

        let mut cursor = self.alloc_base();
        let mut next_free = self.freeptr;
        let mut prev_free = self.null_addr();

        let mut freed_cells: u32 = 0;
        let mut spans_emitted: u32 = 0;

        while cursor.raw() < alloc_top.raw() {
            if cursor == next_free {
                let len = self.free_len(cursor);
                let successor = self.next_free(cursor);
                prev_free = cursor;
                cursor = cursor + len * cell_sz;
                next_free = successor;
                continue;
            }

            let object_end = self.object_end(cursor);

            if !self.is_free(cursor) {
                // `cursor`'s object is reachable: nothing to absorb through
                // it, move past it untouched.
                cursor = object_end;
                continue;
            }

            let mut span_end = object_end;
            while span_end != next_free && self.is_free(span_end) {
                span_end = self.object_end(span_end);
            }

            let run_cells = (span_end - cursor) / cell_sz;
            let mut span_addr = cursor;
            let span_len;

            if span_end == next_free {
                let succ_len = self.free_len(next_free);
                let succ_next = self.next_free(next_free);
                span_len = succ_len + run_cells;
                self.write_free_span(span_addr, span_len, succ_next);
                next_free = succ_next;
            } else {
                span_len = run_cells;
                self.write_free_span(span_addr, span_len, next_free);
            }

            if !self.is_null(prev_free)
                && span_addr == prev_free + self.free_len(prev_free) * cell_sz
            {
                let fused_len = self.free_len(prev_free) + span_len;
                let fused_next = self.next_free(span_addr);
                self.write_free_span(prev_free, fused_len, fused_next);
                span_addr = prev_free;
            } else if !self.is_null(prev_free) {
                self.set_cell(prev_free, span_addr);
            }

            if self.is_null(prev_free) {
                self.freeptr = span_addr;
            }
            prev_free = span_addr;
            spans_emitted += 1;
            freed_cells += run_cells;
            cursor = span_end;
        }

        debug!(
            "reclaim: freed {} cells across {} new span(s)",
            freed_cells, spans_emitted
        );
    }

    /// Flip the mark epoch: every object marked reachable this cycle now
    /// reads as unreached for the next one, with no per-object scan (spec
    /// §3 "Mark epoch"). The host must call this once after every
    /// `reclaim` that should actually complete a collection cycle.
    pub fn flip_epoch(&mut self) {
        self.mark_tag ^= MARK_BIT;
        log_trace!("flip_epoch: mark_tag is now {:#04x}", self.mark_tag);
    }

    /// The address one past the last cell of the object (or free span)
    /// starting at `p`, found by walking its continuation chain.
    fn object_end(&self, p: Addr) -> Addr {
        let mut q = p;
        while self.has_cont(q) {
            q = q + self.cell_sz();
        }
        q + self.cell_sz()
    }
}

#[cfg(test)]
mod tests {
    use crate::address::Addr;
    use crate::config::HeapConfig;
    use crate::heap::Heap;

    fn set_ptr(heap: &mut Heap, cell: Addr, target: Addr) {
        heap.set_cell(cell, target);
        let mut t = heap.tag(cell);
        t.set_ptr(true);
        heap.set_tag(cell, t);
    }

    #[test]
    fn trace_is_idempotent() {
        let mut heap = Heap::init(HeapConfig::default()).unwrap();
        let a = heap.alloc(1, 0);
        heap.trace(a);
        let after_first = heap.tag(a).raw();
        heap.trace(a);
        assert_eq!(heap.tag(a).raw(), after_first);
    }

    #[test]
    fn scenario_reclaim_none() {
        let mut heap = Heap::init(HeapConfig::default()).unwrap();
        let a = heap.alloc(2, 0);
        let b = heap.alloc(1, 0);
        let c = heap.alloc(1, 0);
        let d = heap.alloc(1, 0);
        set_ptr(&mut heap, a, b);
        set_ptr(&mut heap, b, c);
        set_ptr(&mut heap, a + heap.cell_sz(), d);

        heap.trace(a);
        heap.reclaim();

        // Nothing reachable was freed: the free list is exactly the
        // original tail span, now starting right after `d`.
        let tail = d + heap.cell_sz();
        assert_eq!(heap.freeptr(), tail);
        assert!(heap.is_null(heap.next_free(tail)));
    }

    #[test]
    fn scenario_reclaim_mid_coalesces_with_tail() {
        let mut heap = Heap::init(HeapConfig::default()).unwrap();
        let a = heap.alloc(2, 0);
        let b = heap.alloc(1, 0);
        let c = heap.alloc(1, 0);
        let d = heap.alloc(1, 0);
        set_ptr(&mut heap, a, b);
        // b -> c link omitted: c is garbage.
        set_ptr(&mut heap, a + heap.cell_sz(), d);

        heap.trace(a);
        heap.reclaim();

        assert_eq!(heap.freeptr(), c);
        assert_eq!(heap.free_len(c), 1 + heap.config().cell_count() - 5);
        assert!(heap.is_null(heap.next_free(c)));
    }

    #[test]
    fn scenario_reclaim_coalesce_before() {
        let mut heap = Heap::init(HeapConfig::default()).unwrap();
        let a = heap.alloc(2, 0);
        let b = heap.alloc(1, 0);
        let c = heap.alloc(1, 0);
        let d = heap.alloc(1, 0);
        set_ptr(&mut heap, a, b);
        set_ptr(&mut heap, b, c);
        set_ptr(&mut heap, c, d);

        heap.trace(b);
        heap.reclaim();
        heap.flip_epoch();

        assert_eq!(heap.freeptr(), a);
        assert_eq!(heap.free_len(a), 2);

        heap.trace(c);
        heap.reclaim();

        assert_eq!(heap.freeptr(), a);
        assert_eq!(heap.free_len(a), 3);
    }

    #[test]
    fn scenario_reclaim_coalesce_both() {
        let mut heap = Heap::init(HeapConfig::default()).unwrap();
        let a = heap.alloc(2, 0);
        let b = heap.alloc(1, 0);
        let c = heap.alloc(1, 0);
        set_ptr(&mut heap, a, b);

        heap.trace(b);
        heap.reclaim();
        heap.flip_epoch();

        // Two spans: a's cells at the head, c coalesced with the tail.
        assert_eq!(heap.freeptr(), a);
        assert_eq!(heap.free_len(a), 2);
        let next = heap.next_free(a);
        assert_eq!(next, c);
        assert!(heap.is_null(heap.next_free(next)));

        // A second reclaim with no roots traced and no flip: b's epoch
        // mark is now stale, so it is swept too.
        heap.reclaim();
        assert_eq!(heap.freeptr(), a);
        assert_eq!(heap.free_len(a), heap.config().cell_count());
        assert!(heap.is_null(heap.next_free(a)));
    }
}
