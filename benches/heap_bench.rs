use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use huffheap::{Heap, HuffmanTree};

fn bench_heap(c: &mut Criterion) {
    let mut group = c.benchmark_group("heap");
    let input = (0..10_000u64)
        .map(|i| i.wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 40)
        .collect::<Vec<_>>();

    group.bench_function("insert", |b| {
        b.iter(|| {
            let mut heap = Heap::new(u64::cmp);
            for &v in &input {
                heap.insert(v).unwrap();
            }
            heap
        })
    });

    group.bench_function("drain", |b| {
        b.iter_batched(
            || {
                let mut heap = Heap::new(u64::cmp);
                for &v in &input {
                    heap.insert(v).unwrap();
                }
                heap
            },
            |heap| heap.into_sorted_vec().unwrap(),
            BatchSize::LargeInput,
        )
    });
}

fn bench_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("huffman_tree");
    let symbols = (0..=255u8).collect::<Vec<_>>();
    let frequencies = (0..256u64).map(|i| (i * 7919) % 1000 + 1).collect::<Vec<_>>();

    group.bench_function("build_256", |b| {
        b.iter(|| HuffmanTree::new(&symbols, &frequencies).unwrap())
    });

    let text = include_str!("heap_bench.rs").as_bytes();
    group.bench_function("build_and_code_source", |b| {
        b.iter(|| HuffmanTree::from_bytes(text).unwrap().codes())
    });
}

criterion_group!(benches, bench_heap, bench_tree);
criterion_main!(benches);
