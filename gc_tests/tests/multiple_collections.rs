// Run-time:
//  status: success

extern crate cellgc;

use cellgc::{Heap, HeapConfig};

fn set_ptr(heap: &mut Heap, cell: cellgc::Addr, target: cellgc::Addr) {
    heap.set_cell(cell, target);
    let mut t = heap.tag(cell);
    t.set_ptr(true);
    heap.set_tag(cell, t);
}

// Scenario 5 (spec §8): two collection cycles in a row, each coalescing a
// newly-garbage object into the free span left at the low end of the arena
// by the previous cycle.
fn main() {
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
