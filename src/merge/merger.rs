// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::error::Result;
use crate::segment::data::SegmentDataWriter;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// One sorted, ascending enumeration of postings from a single segment
/// participating in a merge.
pub trait PostingSource {
    /// Returns the next `(key, value)` pair, or `None` when exhausted.
    fn next(&mut self) -> Option<Result<(u32, u32)>>;
}

impl<I: Iterator<Item = Result<(u32, u32)>>> PostingSource for I {
    fn next(&mut self) -> Option<Result<(u32, u32)>> {
        Iterator::next(self)
    }
}

struct HeapItem {
    posting: (u32, u32),
    source: usize,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.posting == other.posting
    }
}
impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.posting.cmp(&other.posting)
    }
}

/// N-way merges several sorted [`PostingSource`]s into one new segment,
/// suppressing exact-duplicate postings on ties, via a min-heap over each
/// source's current head.
pub struct SegmentMerger<'a> {
    sources: Vec<Box<dyn PostingSource + 'a>>,
    heap: BinaryHeap<Reverse<HeapItem>>,
}

impl<'a> SegmentMerger<'a> {
    /// Creates a merger over `sources`, one per participating segment.
    #[must_use]
    pub fn new(sources: Vec<Box<dyn PostingSource + 'a>>) -> Self {
        let heap = BinaryHeap::with_capacity(sources.len());
        Self { sources, heap }
    }

    fn init(&mut self) -> Result<()> {
        for (idx, source) in self.sources.iter_mut().enumerate() {
            if let Some(posting) = source.next() {
                self.heap.push(Reverse(HeapItem {
                    posting: posting?,
                    source: idx,
                }));
            }
        }
        Ok(())
    }

    /// Performs the merge, streaming the result into `writer`. Produces a
    /// segment with identical semantics to one produced by a flush.
    pub fn merge_into(mut self, writer: &mut SegmentDataWriter) -> Result<()> {
        self.init()?;

        let mut last_emitted: Option<(u32, u32)> = None;

        while let Some(Reverse(item)) = self.heap.pop() {
            if let Some(next) = self.sources[item.source].next() {
                self.heap.push(Reverse(HeapItem {
                    posting: next?,
                    source: item.source,
                }));
            }

            if last_emitted == Some(item.posting) {
                continue;
            }

            let (key, value) = item.posting;
            writer.add(key, value)?;
            last_emitted = Some(item.posting);
        }

        Ok(())
    }
}
