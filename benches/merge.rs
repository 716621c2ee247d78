use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fprint_index::directory::{Directory, RamDirectory};
use fprint_index::merge::{PostingSource, SegmentMerger};
use fprint_index::segment::data::SegmentDataWriter;
use fprint_index::segment::index::SegmentIndexWriter;
use fprint_index::segment::{Segment, SegmentMeta};
use fprint_index::{Config, IndexWriter};
use std::sync::Arc;

/// `segment_count` sorted, interleaved posting streams of `postings_per_segment`
/// entries each, ready to feed into a [`SegmentMerger`].
fn interleaved_sources(segment_count: u32, postings_per_segment: u32) -> Vec<Box<dyn PostingSource>> {
    (0..segment_count)
        .map(|offset| {
            let postings: Vec<fprint_index::Result<(u32, u32)>> = (0..postings_per_segment)
                .map(|i| Ok((i * segment_count + offset, 0)))
                .collect();
            Box::new(postings.into_iter()) as Box<dyn PostingSource>
        })
        .collect()
}

fn merge_raw_sources(c: &mut Criterion) {
    let mut group = c.benchmark_group("SegmentMerger::merge_into");

    for segment_count in [2u32, 4, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{segment_count} segments x 2000")),
            &segment_count,
            |b, &segment_count| {
                b.iter(|| {
                    let merger = SegmentMerger::new(interleaved_sources(segment_count, 2_000));

                    let dir = RamDirectory::new();
                    let meta = SegmentMeta {
                        id: 0,
                        block_count: 0,
                        last_key: 0,
                    };
                    let data_out = dir.create_file(&meta.data_file_name()).unwrap();
                    let index_out = dir.create_file(&meta.index_file_name()).unwrap();
                    let mut writer = SegmentDataWriter::new(data_out, SegmentIndexWriter::new(index_out), 4096);

                    merger.merge_into(&mut writer).unwrap();
                    writer.close().unwrap();
                });
            },
        );
    }
}

fn flush_with_merge_policy(c: &mut Criterion) {
    let mut group = c.benchmark_group("IndexWriter::flush with tiered merges");

    group.bench_function("1000 docs, buffer 50", |b| {
        b.iter(|| {
            let dir: Arc<dyn Directory> = Arc::new(RamDirectory::new());
            let config = Config {
                block_size: 4096,
                max_buffer_size: 50,
                ..Config::default()
            };
            let mut writer = IndexWriter::open(Arc::clone(&dir), config, true).unwrap();

            for doc_id in 0..1000u32 {
                writer.add_document(doc_id, &[doc_id % 100, doc_id % 250]).unwrap();
            }
            writer.commit().unwrap();
        });
    });
}

fn open_segment_for_iteration(c: &mut Criterion) {
    let dir = RamDirectory::new();
    let meta = {
        let data_out = dir.create_file("segment_1.fid").unwrap();
        let index_out = dir.create_file("segment_1.fii").unwrap();
        let mut writer = SegmentDataWriter::new(data_out, SegmentIndexWriter::new(index_out), 4096);
        for key in 0..10_000u32 {
            writer.add(key, key).unwrap();
        }
        let (block_count, last_key) = writer.close().unwrap();
        SegmentMeta {
            id: 1,
            block_count,
            last_key,
        }
    };

    c.bench_function("Segment::iter over 10000 postings", |b| {
        b.iter(|| {
            let mut segment = Segment::open(&dir, meta, 4096).unwrap();
            let postings: Vec<_> = segment.iter().collect::<fprint_index::Result<_>>().unwrap();
            assert_eq!(postings.len(), 10_000);
        });
    });
}

criterion_group!(benches, merge_raw_sources, flush_with_merge_policy, open_segment_for_iteration);
criterion_main!(benches);
