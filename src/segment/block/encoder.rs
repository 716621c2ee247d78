// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::HEADER_SIZE;
use crate::error::{Error, Result};
use varint_rs::VarintWriter;

/// Incrementally builds one block, rejecting an `(key, value)` pair that
/// would overflow the fixed block size so the caller can close the block and
/// start a new one.
pub struct BlockBuilder {
    block_size: usize,
    count: u16,
    first_value: u32,
    last_key: Option<u32>,
    payload: Vec<u8>,
}

impl BlockBuilder {
    /// Creates a builder targeting blocks of `block_size` bytes.
    #[must_use]
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            count: 0,
            first_value: 0,
            last_key: None,
            payload: Vec::new(),
        }
    }

    /// Whether any record has been added yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The last key added to this block, if any.
    #[must_use]
    pub fn last_key(&self) -> Option<u32> {
        self.last_key
    }

    /// Attempts to append `(key, value)`. Returns `Ok(false)` if the encoded
    /// record would overflow the block and nothing was appended; the caller
    /// should finish this block and retry on a fresh one. Returns an error
    /// if `key` is not strictly greater than the last key already added.
    pub fn try_add(&mut self, key: u32, value: u32) -> Result<bool> {
        if self.count == 0 {
            if HEADER_SIZE > self.block_size {
                return Err(Error::InvariantViolation(
                    "block_size must be at least the header size",
                ));
            }
            self.first_value = value;
            self.last_key = Some(key);
            self.count = 1;
            return Ok(true);
        }

        let last_key = self.last_key.expect("count > 0 implies last_key is set");
        if key <= last_key {
            return Err(Error::InvariantViolation(
                "postings must be added to a block in strictly ascending key order",
            ));
        }
        let key_delta = key - last_key;

        let mut encoded = Vec::with_capacity(8);
        encoded.write_u32_varint(key_delta)?;
        encoded.write_u32_varint(value)?;

        if HEADER_SIZE + self.payload.len() + encoded.len() > self.block_size {
            return Ok(false);
        }

        self.payload.extend_from_slice(&encoded);
        self.last_key = Some(key);
        self.count += 1;

        Ok(true)
    }

    /// Finalizes the block into a zero-padded, `block_size`-byte buffer.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        let mut out = vec![0u8; self.block_size];
        out[0..2].copy_from_slice(&self.count.to_le_bytes());
        out[2..6].copy_from_slice(&self.first_value.to_le_bytes());
        let payload_end = HEADER_SIZE + self.payload.len();
        out[HEADER_SIZE..payload_end].copy_from_slice(&self.payload);
        out
    }
}
