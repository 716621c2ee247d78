// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A block is a fixed-size region of a segment's data file holding a run of
//! postings in ascending key order.
//!
//! Layout, `BLOCK_SIZE` bytes total:
//!
//! ```text
//! record_count: u16 LE         (header)
//! first_value:  u32 LE         (first record's value; its key lives in the segment index)
//! [ key_delta: varint, value: varint ] * (record_count - 1)
//! zero padding to BLOCK_SIZE
//! ```
//!
//! `key_delta`/`value` use the 7-bit-payload, high-bit-continuation varint
//! scheme from the `varint-rs` crate.

mod decoder;
mod encoder;

pub use decoder::BlockDataIterator;
pub use encoder::BlockBuilder;

/// Size, in bytes, of a block's fixed header (`record_count` + `first_value`).
pub const HEADER_SIZE: usize = 2 + 4;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    fn roundtrip(block_size: usize, records: &[(u32, u32)]) -> Result<Vec<(u32, u32)>> {
        let mut builder = BlockBuilder::new(block_size);
        for &(k, v) in records {
            assert!(builder.try_add(k, v)?, "fixture should fit in one block");
        }
        let first_key = records.first().map(|(k, _)| *k).unwrap_or(0);
        let bytes = builder.finish();
        BlockDataIterator::new(&bytes, first_key)?.collect()
    }

    #[test]
    fn single_record() -> Result<()> {
        let out = roundtrip(512, &[(10, 100)])?;
        assert_eq!(out, vec![(10, 100)]);
        Ok(())
    }

    #[test]
    fn dense_run() -> Result<()> {
        let records: Vec<_> = (0..50).map(|i| (i * 3, i * 7)).collect();
        let out = roundtrip(512, &records)?;
        assert_eq!(out, records);
        Ok(())
    }

    #[test]
    fn large_deltas_use_multi_byte_varints() -> Result<()> {
        let records = vec![(10, 1), (10_000_000, 2), (4_000_000_000, 3)];
        let out = roundtrip(512, &records)?;
        assert_eq!(out, records);
        Ok(())
    }

    #[test]
    fn trailing_bytes_are_zero() {
        let mut builder = BlockBuilder::new(64);
        assert!(builder.try_add(1, 1).unwrap());
        let bytes = builder.finish();
        assert_eq!(bytes.len(), 64);
        assert!(bytes[HEADER_SIZE..].iter().all(|&b| b == 0));
    }

    #[test]
    fn overflow_is_reported() {
        let mut builder = BlockBuilder::new(HEADER_SIZE + 2);
        assert!(builder.try_add(1, 1).unwrap());
        // A second record needs at least 2 more bytes (1-byte delta + 1-byte value);
        // shrink the budget further by using large deltas so it cannot fit.
        assert!(!builder.try_add(100_000, 100_000).unwrap());
    }
}
