// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::HEADER_SIZE;
use crate::error::{Error, Result};
use log::error;
use std::io::Cursor;
use varint_rs::VarintReader;

/// A pull-based, non-restartable cursor over one block's `(key, value)`
/// records, reconstructed from the first key (supplied externally from the
/// segment index) plus the block's own delta payload.
pub struct BlockDataIterator<'a> {
    cursor: Cursor<&'a [u8]>,
    remaining: u16,
    last_key: u32,
    first_value: u32,
    yielded_first: bool,
}

impl<'a> BlockDataIterator<'a> {
    /// Builds an iterator over `data`, a single `block_size`-byte block,
    /// given the block's first key.
    pub fn new(data: &'a [u8], first_key: u32) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            error!("block is shorter than its header");
            return Err(Error::FormatCorruption(
                "block is shorter than its header".into(),
            ));
        }

        let count = u16::from_le_bytes([data[0], data[1]]);
        let first_value = u32::from_le_bytes([data[2], data[3], data[4], data[5]]);

        let mut cursor = Cursor::new(data);
        cursor.set_position(HEADER_SIZE as u64);

        Ok(Self {
            cursor,
            remaining: count,
            last_key: first_key,
            first_value,
            yielded_first: false,
        })
    }
}

impl Iterator for BlockDataIterator<'_> {
    type Item = Result<(u32, u32)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        if !self.yielded_first {
            self.yielded_first = true;
            return Some(Ok((self.last_key, self.first_value)));
        }

        let key_delta = match self.cursor.read_u32_varint() {
            Ok(v) => v,
            Err(e) => return Some(Err(e.into())),
        };
        let value = match self.cursor.read_u32_varint() {
            Ok(v) => v,
            Err(e) => return Some(Err(e.into())),
        };

        let next_key = match self.last_key.checked_add(key_delta) {
            Some(k) => k,
            None => {
                error!("key delta overflowed u32");
                return Some(Err(Error::FormatCorruption(
                    "key delta overflowed u32".into(),
                )));
            }
        };
        if next_key <= self.last_key {
            error!("block keys are not strictly ascending");
            return Some(Err(Error::FormatCorruption(
                "block keys are not strictly ascending".into(),
            )));
        }

        self.last_key = next_key;
        Some(Ok((next_key, value)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining.into(), Some(self.remaining.into()))
    }
}
