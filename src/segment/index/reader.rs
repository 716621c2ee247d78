// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::directory::InputStream;
use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use log::error;

/// In-memory, read-only view of a segment's skip index.
///
/// Loaded once from disk; one `u32` per block, so loading is cheap even for
/// fairly large segments.
pub struct SegmentIndexReader {
    first_keys: Vec<u32>,
}

impl SegmentIndexReader {
    /// Loads the full skip index from `input`.
    pub fn load(input: &mut dyn InputStream) -> Result<Self> {
        let len = input.len()?;
        if len < 4 {
            error!("segment index file shorter than its header");
            return Err(Error::FormatCorruption(
                "segment index file shorter than its header".into(),
            ));
        }

        let mut header = [0u8; 4];
        input.read_at(&mut header, 0)?;
        let block_count = LittleEndian::read_u32(&header) as usize;

        let expected_len = 4 + block_count * 4;
        if len as usize != expected_len {
            error!("segment index length mismatch: expected {expected_len}, found {len}");
            return Err(Error::FormatCorruption(format!(
                "segment index length mismatch: expected {expected_len}, found {len}"
            )));
        }

        let mut body = vec![0u8; block_count * 4];
        if block_count > 0 {
            input.read_at(&mut body, 4)?;
        }

        let first_keys = body
            .chunks_exact(4)
            .map(LittleEndian::read_u32)
            .collect::<Vec<_>>();

        Ok(Self { first_keys })
    }

    /// Number of blocks in the segment this index describes.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.first_keys.len()
    }

    /// The first key of block `i`.
    #[must_use]
    pub fn level_key(&self, i: usize) -> Option<u32> {
        self.first_keys.get(i).copied()
    }

    /// Binary search for `key`.
    ///
    /// Returns `(first_block, last_block, found)`: the inclusive range of
    /// blocks whose key interval `[first_key_i, first_key_{i+1})` could
    /// contain `key`. `found` is `false` if `key` is strictly less than the
    /// first block's first key, or the segment is empty.
    #[must_use]
    pub fn search(&self, key: u32) -> (usize, usize, bool) {
        if self.first_keys.is_empty() || key < self.first_keys[0] {
            return (0, 0, false);
        }

        // Partition point: first index whose first_key is > key.
        let upper = self.first_keys.partition_point(|&first_key| first_key <= key);
        let last_block = upper - 1;

        // Widen downward across any run of blocks sharing the same first key
        // as `last_block` (the rare case of a single key spanning multiple
        // blocks).
        let target_first_key = self.first_keys[last_block];
        let first_block = self.first_keys[..=last_block]
            .iter()
            .rposition(|&k| k != target_first_key)
            .map_or(0, |idx| idx + 1);

        (first_block, last_block, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{Directory, RamDirectory};

    fn build_index(first_keys: &[u32]) -> Result<SegmentIndexReader> {
        let dir = RamDirectory::new();
        {
            let mut out = dir.create_file("idx")?;
            use std::io::Write;
            out.write_all(&(first_keys.len() as u32).to_le_bytes())?;
            for key in first_keys {
                out.write_all(&key.to_le_bytes())?;
            }
            out.close()?;
        }
        let mut input = dir.open_file("idx")?;
        SegmentIndexReader::load(&mut *input)
    }

    #[test]
    fn search_exact_match() -> Result<()> {
        let index = build_index(&[10, 20, 30])?;
        assert_eq!(index.search(20), (1, 1, true));
        Ok(())
    }

    #[test]
    fn search_between_blocks() -> Result<()> {
        let index = build_index(&[10, 20, 30])?;
        assert_eq!(index.search(25), (1, 1, true));
        Ok(())
    }

    #[test]
    fn search_before_first_block() -> Result<()> {
        let index = build_index(&[10, 20, 30])?;
        assert_eq!(index.search(5), (0, 0, false));
        Ok(())
    }

    #[test]
    fn search_past_last_block() -> Result<()> {
        let index = build_index(&[10, 20, 30])?;
        assert_eq!(index.search(1000), (2, 2, true));
        Ok(())
    }

    #[test]
    fn search_widens_over_repeated_first_keys() -> Result<()> {
        let index = build_index(&[10, 20, 20, 20, 40])?;
        assert_eq!(index.search(25), (1, 3, true));
        assert_eq!(index.search(20), (1, 3, true));
        Ok(())
    }

    #[test]
    fn empty_index() -> Result<()> {
        let index = build_index(&[])?;
        assert_eq!(index.search(1), (0, 0, false));
        Ok(())
    }
}
