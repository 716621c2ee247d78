// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::directory::OutputStream;
use crate::error::{Error, Result};
use crate::segment::block::BlockBuilder;
use crate::segment::index::SegmentIndexWriter;
use std::io::Write;

/// Streams strictly-ascending `(key, value)` postings into fixed-size
/// blocks, emitting each block's boundary key to the segment index writer.
pub struct SegmentDataWriter {
    output: Box<dyn OutputStream>,
    index_writer: SegmentIndexWriter,
    block_size: usize,
    builder: BlockBuilder,
    block_count: u32,
    last_key: Option<u32>,
}

impl SegmentDataWriter {
    /// Creates a writer over the segment's data and index output streams.
    #[must_use]
    pub fn new(
        output: Box<dyn OutputStream>,
        index_writer: SegmentIndexWriter,
        block_size: usize,
    ) -> Self {
        Self {
            output,
            index_writer,
            block_size,
            builder: BlockBuilder::new(block_size),
            block_count: 0,
            last_key: None,
        }
    }

    /// Number of blocks written so far (including the in-progress one if
    /// non-empty).
    #[must_use]
    pub fn block_count(&self) -> u32 {
        self.block_count
    }

    /// The last key added so far.
    #[must_use]
    pub fn last_key(&self) -> Option<u32> {
        self.last_key
    }

    /// Appends one posting. `key` must be strictly greater than the last key
    /// added (duplicates must already be filtered upstream by the writer's
    /// sort-unique pass).
    pub fn add(&mut self, key: u32, value: u32) -> Result<()> {
        if let Some(last) = self.last_key {
            if key <= last {
                return Err(Error::InvariantViolation(
                    "postings must be added to a segment in strictly ascending key order",
                ));
            }
        }

        loop {
            if self.builder.is_empty() {
                self.index_writer.add_block(self.block_count, key)?;
            }
            if self.builder.try_add(key, value)? {
                break;
            }
            self.close_current_block()?;
        }

        self.last_key = Some(key);
        Ok(())
    }

    fn close_current_block(&mut self) -> Result<()> {
        let builder = std::mem::replace(&mut self.builder, BlockBuilder::new(self.block_size));
        if builder.is_empty() {
            return Ok(());
        }
        let bytes = builder.finish();
        self.output.write_all(&bytes)?;
        self.block_count += 1;
        Ok(())
    }

    /// Flushes the final (possibly partial) block and publishes both the
    /// data file and the segment index. Returns `(block_count, last_key)`
    /// for the caller to record in the segment's metadata.
    pub fn close(mut self) -> Result<(u32, u32)> {
        self.close_current_block()?;
        self.output.flush()?;
        self.output.close()?;
        self.index_writer.close()?;
        Ok((self.block_count, self.last_key.unwrap_or(0)))
    }
}
