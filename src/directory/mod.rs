// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The [`Directory`] capability is the index's only contact with storage.
//! The core never touches `std::fs` directly outside of [`FsDirectory`]; any
//! implementation that honors atomic publish-on-close and accurate
//! list/exists suffices.

mod fs;
mod ram;

pub use fs::FsDirectory;
pub use ram::RamDirectory;

use crate::error::Result;
use std::collections::HashSet;
use std::io::{Read, Write};

/// A sequential writer that publishes its content atomically on [`OutputStream::close`].
///
/// A reader must never be able to observe a half-written file under its
/// final name.
pub trait OutputStream: Write {
    /// Flushes and publishes the file under its final name.
    fn close(self: Box<Self>) -> Result<()>;
}

/// A sequential + random-access reader over a published file.
pub trait InputStream: Read {
    /// Seeks to an absolute byte offset.
    fn seek_to(&mut self, offset: u64) -> Result<()>;

    /// Reads exactly `buf.len()` bytes starting at `offset`, without
    /// disturbing the stream's sequential read position.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<()>;

    /// Total length of the file in bytes.
    fn len(&self) -> Result<u64>;

    /// Returns `true` if the file is empty.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Named-file namespace the index engine is built on top of.
pub trait Directory: Send + Sync {
    /// Creates (or truncates) a file and returns a handle to write it.
    ///
    /// The file is not visible under `name` — via [`Directory::open_file`],
    /// [`Directory::list_files`], or [`Directory::exists`] — until the
    /// returned stream is closed.
    fn create_file(&self, name: &str) -> Result<Box<dyn OutputStream>>;

    /// Opens an existing file for reading.
    fn open_file(&self, name: &str) -> Result<Box<dyn InputStream>>;

    /// Deletes a file. No-op-safe to call on a file that is still open for
    /// reading elsewhere; the underlying bytes must remain valid for any
    /// reader that already holds a handle.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// Renames a file, replacing any existing file at `to`.
    fn rename_file(&self, from: &str, to: &str) -> Result<()>;

    /// Lists all currently published file names.
    fn list_files(&self) -> Result<HashSet<String>>;

    /// Checks whether a published file exists.
    fn exists(&self, name: &str) -> Result<bool>;
}
