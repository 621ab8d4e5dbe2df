use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

pub fn init_test() {
    drop(env_logger::builder().is_test(true).try_init());
}

// Per-thread so concurrently running tests do not disturb each other.
thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
}

struct Counting;

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let _ = LIVE.try_with(|live| live.set(live.get() + 1));
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        let _ = LIVE.try_with(|live| live.set(live.get() - 1));
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: Counting = Counting;

/// Allocations made and not yet freed by the current thread.
pub fn live_allocations() -> isize {
    LIVE.with(Cell::get)
}
