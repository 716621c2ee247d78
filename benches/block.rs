use criterion::{criterion_group, criterion_main, Criterion};
use fprint_index::segment::block::{BlockBuilder, BlockDataIterator};

fn fill_block(block_size: usize, gap: u32) -> (Vec<u8>, u32, usize) {
    let mut builder = BlockBuilder::new(block_size);
    let mut key = 0u32;
    let mut count = 0;
    let first_key = key;

    loop {
        match builder.try_add(key, key.wrapping_mul(7)) {
            Ok(true) => {
                count += 1;
                key += gap;
            }
            Ok(false) | Err(_) => break,
        }
    }

    (builder.finish(), first_key, count)
}

fn encode_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("BlockBuilder::try_add");

    for block_size in [512usize, 4096, 16384] {
        group.bench_function(format!("{block_size} bytes, dense keys"), |b| {
            b.iter(|| fill_block(block_size, 1));
        });

        group.bench_function(format!("{block_size} bytes, sparse keys"), |b| {
            b.iter(|| fill_block(block_size, 10_000));
        });
    }
}

fn decode_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("BlockDataIterator::collect");

    for block_size in [512usize, 4096, 16384] {
        let (bytes, first_key, count) = fill_block(block_size, 1);

        group.bench_function(format!("{block_size} bytes ({count} records)"), |b| {
            b.iter(|| {
                let records: Result<Vec<_>, _> = BlockDataIterator::new(&bytes, first_key)
                    .unwrap()
                    .collect();
                records.unwrap()
            });
        });
    }
}

criterion_group!(benches, encode_block, decode_block);
criterion_main!(benches);
