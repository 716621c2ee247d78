// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Intersects one sorted query fingerprint with one segment using its skip
//! index. The control flow here mirrors the original
//! `SegmentSearcher::search` one-to-one: a query cursor `i` and a block
//! cursor `block`, re-seeking via the skip index only when the current
//! block range is exhausted.

use crate::error::Result;
use crate::reader::Collector;
use crate::segment::data::SegmentDataReader;
use crate::segment::index::SegmentIndexReader;

/// Searches one segment for the occurrences of each term in a query
/// fingerprint.
pub struct SegmentSearcher<'a> {
    index: &'a SegmentIndexReader,
    data: &'a mut SegmentDataReader,
    last_key: u32,
}

impl<'a> SegmentSearcher<'a> {
    /// Builds a searcher over an opened segment.
    #[must_use]
    pub fn new(index: &'a SegmentIndexReader, data: &'a mut SegmentDataReader, last_key: u32) -> Self {
        Self {
            index,
            data,
            last_key,
        }
    }

    /// Runs the intersection, forwarding every matching doc id to
    /// `collector`. `query` must be sorted ascending; the same doc id may be
    /// collected once per matching term (deduplication is the collector's
    /// job).
    pub fn search(&mut self, query: &[u32], collector: &mut dyn Collector) -> Result<()> {
        if query.is_empty() || self.index.block_count() == 0 {
            return Ok(());
        }

        let mut i = 0usize;
        let mut block = 0u32;
        let mut last_block: Option<u32> = None;

        'terms: while i < query.len() {
            if last_block.is_none() || block > last_block.expect("checked above") {
                if query[i] > self.last_key {
                    // All remaining query terms are beyond this segment's last key.
                    return Ok(());
                }

                let (first, last, found) = self.index.search(query[i]);
                if !found {
                    i += 1;
                    continue 'terms;
                }
                if block as usize > last {
                    // Already searched this block range; the term was not found.
                    i += 1;
                    continue 'terms;
                }
                block = block.max(first as u32);
                last_block = Some(last as u32);
            }

            let first_key = self
                .index
                .level_key(block as usize)
                .expect("block cursor is kept within bounds by the search() call above");
            let next_first_key = self.index.level_key(block as usize + 1);

            let mut iter = self.data.read_block(block, first_key)?;
            while let Some(record) = iter.next() {
                let (key, value) = record?;
                if key >= query[i] {
                    while key > query[i] {
                        i += 1;
                        if i == query.len() {
                            return Ok(());
                        }
                        if let Some(next_first_key) = next_first_key {
                            if next_first_key < query[i] {
                                // The query has advanced past what this block can match.
                                block += 1;
                                continue 'terms;
                            }
                        }
                    }
                    if key == query[i] {
                        collector.collect(value);
                    }
                }
            }

            block += 1;
        }

        Ok(())
    }
}
