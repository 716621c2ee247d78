// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::directory::OutputStream;
use crate::error::Result;
use byteorder::{LittleEndian, WriteBytesExt};

/// Accumulates block-boundary keys as the segment data writer closes blocks,
/// then publishes the full skip index in one write on [`SegmentIndexWriter::close`].
pub struct SegmentIndexWriter {
    output: Box<dyn OutputStream>,
    first_keys: Vec<u32>,
}

impl SegmentIndexWriter {
    /// Creates a writer over a freshly created output stream.
    #[must_use]
    pub fn new(output: Box<dyn OutputStream>) -> Self {
        Self {
            output,
            first_keys: Vec::new(),
        }
    }

    /// Records the first key of a newly opened block.
    ///
    /// `block_number` must equal the number of blocks already recorded; it
    /// is accepted (rather than inferred) so the segment data writer's
    /// bookkeeping and the index's stay in lockstep and any divergence is
    /// caught immediately.
    pub fn add_block(&mut self, block_number: u32, first_key: u32) -> Result<()> {
        debug_assert_eq!(block_number as usize, self.first_keys.len());
        self.first_keys.push(first_key);
        Ok(())
    }

    /// Flushes the full first-key array to the underlying file and publishes it.
    pub fn close(mut self) -> Result<()> {
        self.output
            .write_u32::<LittleEndian>(self.first_keys.len() as u32)?;
        for key in &self.first_keys {
            self.output.write_u32::<LittleEndian>(*key)?;
        }
        self.output.flush()?;
        self.output.close()
    }
}
