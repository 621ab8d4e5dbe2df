#![no_main]
use huffheap::Heap;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|script: Vec<(bool, u16)>| {
    let mut heap = Heap::new(u16::cmp);
    let mut model = Vec::new();

    for (insert, value) in script {
        if insert {
            heap.insert(value).unwrap();
            model.push(value);
        } else {
            model.sort_unstable_by(|a, b| b.cmp(a));
            assert_eq!(heap.extract().ok(), model.pop());
        }
        assert_eq!(heap.len(), model.len());
        heap.validate().unwrap();
    }

    model.sort_unstable();
    assert_eq!(heap.into_sorted_vec().unwrap(), model);
});
