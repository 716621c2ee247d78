// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Everything scoped to a single immutable segment: its on-disk block
//! format, the skip index, the data/index writers and readers, and the
//! searcher that intersects one query fingerprint with one segment.

pub mod block;
pub mod data;
pub mod index;
pub mod meta;
mod searcher;

pub use meta::{SegmentId, SegmentMeta};
pub use searcher::SegmentSearcher;

use crate::directory::Directory;
use crate::error::Result;
use data::SegmentDataReader;
use index::SegmentIndexReader;

/// A segment opened for reading: its in-memory skip index plus a handle to
/// its data file — the reader holds these for as long as its
/// snapshot is alive).
pub struct Segment {
    /// This segment's metadata.
    pub meta: SegmentMeta,
    index: SegmentIndexReader,
    data: SegmentDataReader,
    block_size: usize,
}

impl Segment {
    /// Opens a segment for reading given its metadata.
    pub fn open(dir: &dyn Directory, meta: SegmentMeta, block_size: usize) -> Result<Self> {
        let mut index_input = dir.open_file(&meta.index_file_name())?;
        let index = SegmentIndexReader::load(&mut *index_input)?;

        let data_input = dir.open_file(&meta.data_file_name())?;
        let data = SegmentDataReader::new(data_input, block_size);

        Ok(Self {
            meta,
            index,
            data,
            block_size,
        })
    }

    /// This segment's id.
    #[must_use]
    pub fn id(&self) -> SegmentId {
        self.meta.id
    }

    /// Intersects `query` (sorted, deduplicated ascending terms) with this
    /// segment, forwarding matches to `collector`.
    pub fn search(&mut self, query: &[u32], collector: &mut dyn crate::reader::Collector) -> Result<()> {
        SegmentSearcher::new(&self.index, &mut self.data, self.meta.last_key).search(query, collector)
    }

    /// Exposes a forward iterator over every posting in the segment, used
    /// by the merger.
    pub fn iter(&mut self) -> SegmentPostingIter<'_> {
        SegmentPostingIter {
            index: &self.index,
            data: &mut self.data,
            next_block: 0,
            current: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn block_size(&self) -> usize {
        self.block_size
    }
}

/// Forward-only iterator over all postings in one segment, blocks in order.
pub struct SegmentPostingIter<'a> {
    index: &'a SegmentIndexReader,
    data: &'a mut SegmentDataReader,
    next_block: u32,
    current: Option<std::vec::IntoIter<(u32, u32)>>,
}

impl Iterator for SegmentPostingIter<'_> {
    type Item = Result<(u32, u32)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(iter) = &mut self.current {
                if let Some(item) = iter.next() {
                    return Some(Ok(item));
                }
                self.current = None;
            }

            let block_index = self.next_block;
            let Some(first_key) = self.index.level_key(block_index as usize) else {
                return None;
            };
            self.next_block += 1;

            let block = match self.data.read_block(block_index, first_key) {
                Ok(block) => block,
                Err(e) => return Some(Err(e)),
            };
            let records: Result<Vec<_>> = block.collect();
            match records {
                Ok(records) => self.current = Some(records.into_iter()),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
