// Run-time:
//   status: success

extern crate cellgc;

use cellgc::{Heap, HeapConfig};

fn set_ptr(heap: &mut Heap, cell: cellgc::Addr, target: cellgc::Addr) {
    heap.set_cell(cell, target);
    let mut t = heap.tag(cell);
    t.set_ptr(true);
    heap.set_tag(cell, t);
}

// Scenario 6 (spec §8): a garbage object on each side of a reachable one
// coalesces into two separate free spans, and a second reclaim with no
// intervening flip correctly sweeps the now-stale-epoch reachable object
// too, merging everything into one maximal span.
fn main() {
    let mut heap = Heap::init(HeapConfig::default()).unwrap();
    let a = heap.alloc(2, 0);
    let b = heap.alloc(1, 0);
    let c = heap.alloc(1, 0);
    set_ptr(&mut heap, a, b);

    heap.trace(b);
    heap.reclaim();
    heap.flip_epoch();

    assert_eq!(heap.freeptr(), a);
    assert_eq!(heap.free_len(a), 2);
    let next = heap.next_free(a);
    assert_eq!(next, c);
    assert!(heap.is_null(heap.next_free(next)));

    heap.reclaim();

    assert_eq!(heap.freeptr(), a);
    assert_eq!(heap.free_len(a), heap.config().cell_count());
    assert!(heap.is_null(heap.next_free(a)));
}
