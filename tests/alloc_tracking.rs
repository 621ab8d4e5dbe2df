//! Checks that queues and trees release every allocation they make.
//!
//! Kept to a single test so no other test thread allocates while counting.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicIsize, Ordering};

use huffheap::{merge_step, Error, HuffmanTree, PriorityQueue};

struct Counting;

static LIVE: AtomicIsize = AtomicIsize::new(0);

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        LIVE.fetch_add(1, Ordering::SeqCst);
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        LIVE.fetch_sub(1, Ordering::SeqCst);
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: Counting = Counting;

fn live() -> isize {
    LIVE.load(Ordering::SeqCst)
}

#[test]
fn test_no_leaks() {
    let symbols: Vec<u8> = (0..=255).collect();
    let frequencies: Vec<u64> = (0..256).map(|i| (i * 37 % 101) + 1).collect();

    let before = live();

    // Finished tree.
    let tree = HuffmanTree::new(&symbols, &frequencies).unwrap();
    assert_eq!(tree.leaf_count(), 256);
    drop(tree);
    assert_eq!(live(), before);

    // Abandoned queue, partially merged.
    let mut queue = PriorityQueue::new(&symbols, &frequencies).unwrap();
    for _ in 0..100 {
        merge_step(&mut queue).unwrap();
    }
    drop(queue);
    assert_eq!(live(), before);

    // Failed merges and a failed build.
    let mut queue = PriorityQueue::new(b"abc", &[u64::MAX, 1, 2]).unwrap();
    merge_step(&mut queue).unwrap();
    assert!(matches!(
        merge_step(&mut queue),
        Err(Error::FrequencyOverflow { .. })
    ));
    assert!(HuffmanTree::from_queue(&mut queue).is_err());
    drop(queue);
    assert_eq!(live(), before);

    // Rejected inputs.
    assert!(PriorityQueue::new(b"ab", &[1]).is_err());
    assert!(HuffmanTree::new(&[], &[]).is_err());
    assert_eq!(live(), before);
}
