// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::directory::InputStream;
use crate::error::Result;
use crate::segment::block::BlockDataIterator;

/// Random-access reader over a segment's data file: one seek + one read of
/// `block_size` bytes per [`SegmentDataReader::read_block`] call.
///
/// This crate does not implement a block cache itself; callers that want
/// one can wrap a `Directory` implementation that caches reads.
pub struct SegmentDataReader {
    input: Box<dyn InputStream>,
    block_size: usize,
    scratch: Vec<u8>,
}

impl SegmentDataReader {
    /// Creates a reader over an opened data file.
    #[must_use]
    pub fn new(input: Box<dyn InputStream>, block_size: usize) -> Self {
        Self {
            input,
            block_size,
            scratch: vec![0u8; block_size],
        }
    }

    /// Reads block `block_index` (0-based) given its first key (obtained
    /// from the segment index), returning an iterator over its records.
    pub fn read_block(&mut self, block_index: u32, first_key: u32) -> Result<BlockDataIterator<'_>> {
        let offset = u64::from(block_index) * self.block_size as u64;
        self.input.read_at(&mut self.scratch, offset)?;
        BlockDataIterator::new(&self.scratch, first_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{Directory, RamDirectory};
    use crate::segment::block::BlockBuilder;
    use crate::segment::index::SegmentIndexWriter;

    #[test]
    fn read_block_by_index() -> Result<()> {
        let block_size = 64;
        let dir = RamDirectory::new();

        {
            let data_out = dir.create_file("data")?;
            let index_out = dir.create_file("index")?;
            let mut index_writer = SegmentIndexWriter::new(index_out);

            let mut block0 = BlockBuilder::new(block_size);
            block0.try_add(1, 10)?;
            block0.try_add(2, 20)?;
            index_writer.add_block(0, 1)?;

            let mut block1 = BlockBuilder::new(block_size);
            block1.try_add(100, 1000)?;
            index_writer.add_block(1, 100)?;

            let mut data_out = data_out;
            use std::io::Write;
            data_out.write_all(&block0.finish())?;
            data_out.write_all(&block1.finish())?;
            data_out.close()?;
            index_writer.close()?;
        }

        let input = dir.open_file("data")?;
        let mut reader = SegmentDataReader::new(input, block_size);

        let block0: Vec<_> = reader.read_block(0, 1)?.collect::<Result<_>>()?;
        assert_eq!(block0, vec![(1, 10), (2, 20)]);

        let block1: Vec<_> = reader.read_block(1, 100)?.collect::<Result<_>>()?;
        assert_eq!(block1, vec![(100, 1000)]);

        Ok(())
    }
}
