// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::Collector;
use std::collections::HashMap;

/// Collects raw matches without deduplication, in the order segments and
/// blocks produced them. Useful for tests and for callers that want to do
/// their own scoring downstream.
#[derive(Debug, Default)]
pub struct VecCollector {
    doc_ids: Vec<u32>,
}

impl VecCollector {
    /// An empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The collected doc ids, one entry per matching term.
    #[must_use]
    pub fn into_inner(self) -> Vec<u32> {
        self.doc_ids
    }
}

impl Collector for VecCollector {
    fn collect(&mut self, doc_id: u32) {
        self.doc_ids.push(doc_id);
    }
}

/// Counts how many query terms matched each doc id — the usual shape for
/// ranking candidate matches by shared-term count.
#[derive(Debug, Default)]
pub struct CountCollector {
    counts: HashMap<u32, u32>,
}

impl CountCollector {
    /// An empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The per-doc-id match counts collected so far.
    #[must_use]
    pub fn counts(&self) -> &HashMap<u32, u32> {
        &self.counts
    }

    /// Consumes the collector, returning the match counts.
    #[must_use]
    pub fn into_counts(self) -> HashMap<u32, u32> {
        self.counts
    }

    /// Doc ids sorted by descending match count, highest first.
    #[must_use]
    pub fn ranked(&self) -> Vec<(u32, u32)> {
        let mut ranked: Vec<_> = self.counts.iter().map(|(&doc, &count)| (doc, count)).collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }
}

impl Collector for CountCollector {
    fn collect(&mut self, doc_id: u32) {
        *self.counts.entry(doc_id).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_collector_tallies_matches() {
        let mut collector = CountCollector::new();
        collector.collect(7);
        collector.collect(3);
        collector.collect(7);

        assert_eq!(collector.counts().get(&7), Some(&2));
        assert_eq!(collector.ranked(), vec![(7, 2), (3, 1)]);
    }

    #[test]
    fn vec_collector_preserves_order() {
        let mut collector = VecCollector::new();
        collector.collect(1);
        collector.collect(1);
        collector.collect(2);
        assert_eq!(collector.into_inner(), vec![1, 1, 2]);
    }
}
