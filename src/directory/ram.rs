// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! In-memory [`Directory`], for tests and embedders who don't need
//! persistence — storage need not be real for the engine to be testable.

use super::{Directory, InputStream, OutputStream};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};

type Files = Arc<Mutex<HashMap<String, Arc<Vec<u8>>>>>;

/// A [`Directory`] entirely backed by in-memory buffers.
#[derive(Default)]
pub struct RamDirectory {
    files: Files,
}

impl RamDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Directory for RamDirectory {
    fn create_file(&self, name: &str) -> Result<Box<dyn OutputStream>> {
        Ok(Box::new(RamOutputStream {
            files: self.files.clone(),
            name: name.to_owned(),
            buf: Vec::new(),
        }))
    }

    fn open_file(&self, name: &str) -> Result<Box<dyn InputStream>> {
        let files = self.files.lock().expect("poisoned");
        let data = files
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Io(std::io::Error::from(std::io::ErrorKind::NotFound)))?;
        Ok(Box::new(RamInputStream { data, pos: 0 }))
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        self.files.lock().expect("poisoned").remove(name);
        Ok(())
    }

    fn rename_file(&self, from: &str, to: &str) -> Result<()> {
        let mut files = self.files.lock().expect("poisoned");
        let data = files
            .remove(from)
            .ok_or_else(|| Error::Io(std::io::Error::from(std::io::ErrorKind::NotFound)))?;
        files.insert(to.to_owned(), data);
        Ok(())
    }

    fn list_files(&self) -> Result<HashSet<String>> {
        Ok(self.files.lock().expect("poisoned").keys().cloned().collect())
    }

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.files.lock().expect("poisoned").contains_key(name))
    }
}

struct RamOutputStream {
    files: Files,
    name: String,
    buf: Vec<u8>,
}

impl Write for RamOutputStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buf.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl OutputStream for RamOutputStream {
    fn close(self: Box<Self>) -> Result<()> {
        self.files
            .lock()
            .expect("poisoned")
            .insert(self.name, Arc::new(self.buf));
        Ok(())
    }
}

struct RamInputStream {
    data: Arc<Vec<u8>>,
    pos: usize,
}

impl Read for RamInputStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let available = &self.data[self.pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl InputStream for RamInputStream {
    fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.pos = offset as usize;
        Ok(())
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<()> {
        let offset = offset as usize;
        let end = offset + buf.len();
        if end > self.data.len() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!(
                    "read_at({offset}..{end}) out of bounds, file has length {}",
                    self.data.len()
                ),
            )));
        }
        buf.copy_from_slice(&self.data[offset..end]);
        Ok(())
    }

    fn len(&self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_open_roundtrip() -> Result<()> {
        let dir = RamDirectory::new();
        let mut out = dir.create_file("foo")?;
        out.write_all(b"hello world")?;
        out.close()?;

        let input = dir.open_file("foo")?;
        let mut buf = [0u8; 5];
        input.read_at(&mut buf, 6)?;
        assert_eq!(&buf, b"world");

        Ok(())
    }

    #[test]
    fn invisible_until_closed() -> Result<()> {
        let dir = RamDirectory::new();
        let out = dir.create_file("foo")?;
        assert!(!dir.exists("foo")?);
        out.close()?;
        assert!(dir.exists("foo")?);
        Ok(())
    }
}
