//! Builds a large random index across many flushes (forcing merges along
//! the way) and checks every query against a brute-force in-memory oracle.

use fprint_index::directory::RamDirectory;
use fprint_index::merge::TieredMergePolicy;
use fprint_index::reader::CountCollector;
use fprint_index::{Config, IndexWriter};
use rand::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use test_log::test;

#[test]
fn matches_a_brute_force_oracle_across_many_flushes_and_merges() -> fprint_index::Result<()> {
    let mut rng = StdRng::seed_from_u64(0xF17_EC0DE);

    let dir: Arc<dyn fprint_index::directory::Directory> = Arc::new(RamDirectory::new());
    let config = Config {
        block_size: 256,
        max_buffer_size: 64,
        merge_policy: Arc::new(TieredMergePolicy { tier_width: 3 }),
    };
    let mut writer = IndexWriter::open(Arc::clone(&dir), config, true)?;

    // oracle[term] = set of doc ids containing that term.
    let mut oracle: HashMap<u32, HashSet<u32>> = HashMap::new();
    let vocabulary: Vec<u32> = (0..200).collect();

    for doc_id in 0..1000u32 {
        let term_count = rng.random_range(1..=8);
        let terms: Vec<u32> = vocabulary
            .choose_multiple(&mut rng, term_count)
            .copied()
            .collect();

        for &term in &terms {
            oracle.entry(term).or_default().insert(doc_id);
        }

        writer.add_document(doc_id, &terms)?;

        if doc_id % 137 == 0 {
            writer.commit()?;
        }
    }
    writer.commit()?;

    let mut reader = writer.open_reader()?;

    for &query_term in &[0u32, 1, 50, 100, 199] {
        let mut collector = CountCollector::new();
        reader.search(&[query_term], &mut collector)?;

        let expected = oracle.get(&query_term).cloned().unwrap_or_default();
        let actual: HashSet<u32> = collector.counts().keys().copied().collect();
        assert_eq!(actual, expected, "mismatch for term {query_term}");
    }

    // A multi-term query: every doc sharing at least one term must appear,
    // and its count must equal how many of the query terms it actually has.
    let query = [3u32, 7, 42, 150];
    let mut collector = CountCollector::new();
    reader.search(&query, &mut collector)?;

    let mut expected_counts: HashMap<u32, u32> = HashMap::new();
    for &term in &query {
        for &doc_id in oracle.get(&term).into_iter().flatten() {
            *expected_counts.entry(doc_id).or_insert(0) += 1;
        }
    }
    assert_eq!(*collector.counts(), expected_counts);

    Ok(())
}
