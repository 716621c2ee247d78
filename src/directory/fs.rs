// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! `std::fs`-backed [`Directory`](super::Directory), grounded on the
//! teacher's `file::rewrite_atomic` pattern: write to a temp file in the
//! same directory, fsync it, then rename into place.

use super::{Directory, InputStream, OutputStream};
use crate::error::Result;
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A [`Directory`] backed by the OS filesystem.
pub struct FsDirectory {
    root: PathBuf,
}

impl FsDirectory {
    /// Opens (creating if necessary) a directory rooted at `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Directory for FsDirectory {
    fn create_file(&self, name: &str) -> Result<Box<dyn OutputStream>> {
        let temp = tempfile::NamedTempFile::new_in(&self.root)?;
        Ok(Box::new(FsOutputStream {
            temp: Some(temp),
            final_path: self.path_for(name),
        }))
    }

    fn open_file(&self, name: &str) -> Result<Box<dyn InputStream>> {
        let file = File::open(self.path_for(name))?;
        Ok(Box::new(FsInputStream { file }))
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        std::fs::remove_file(self.path_for(name))?;
        Ok(())
    }

    fn rename_file(&self, from: &str, to: &str) -> Result<()> {
        std::fs::rename(self.path_for(from), self.path_for(to))?;
        Ok(())
    }

    fn list_files(&self) -> Result<HashSet<String>> {
        let mut names = HashSet::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.insert(name.to_owned());
                }
            }
        }
        Ok(names)
    }

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.path_for(name).exists())
    }
}

struct FsOutputStream {
    temp: Option<tempfile::NamedTempFile>,
    final_path: PathBuf,
}

impl Write for FsOutputStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.temp
            .as_mut()
            .expect("stream already closed")
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.temp.as_mut().expect("stream already closed").flush()
    }
}

impl OutputStream for FsOutputStream {
    fn close(mut self: Box<Self>) -> Result<()> {
        let mut temp = self.temp.take().expect("stream already closed");
        temp.flush()?;
        temp.as_file_mut().sync_all()?;
        temp.persist(&self.final_path)
            .map_err(|e| std::io::Error::new(e.error.kind(), e.error))?;
        Ok(())
    }
}

struct FsInputStream {
    file: File,
}

impl Read for FsInputStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl InputStream for FsInputStream {
    fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file.read_exact_at(buf, offset)?;
        }

        #[cfg(not(unix))]
        {
            use std::io::{Read, Seek, SeekFrom};
            let mut file = self.file.try_clone()?;
            file.seek(SeekFrom::Start(offset))?;
            file.read_exact(buf)?;
        }

        Ok(())
    }

    fn len(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_open_roundtrip() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let dir = FsDirectory::open(tmp.path())?;

        assert!(!dir.exists("foo")?);

        let mut out = dir.create_file("foo")?;
        out.write_all(b"hello")?;
        out.close()?;

        assert!(dir.exists("foo")?);
        assert!(dir.list_files()?.contains("foo"));

        let input = dir.open_file("foo")?;
        let mut buf = [0u8; 5];
        input.read_at(&mut buf, 0)?;
        assert_eq!(&buf, b"hello");

        Ok(())
    }

    #[test]
    fn half_written_file_is_invisible() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let dir = FsDirectory::open(tmp.path())?;

        let mut out = dir.create_file("foo")?;
        out.write_all(b"partial")?;
        // Not closed yet: must not be visible.
        assert!(!dir.exists("foo")?);
        out.close()?;
        assert!(dir.exists("foo")?);

        Ok(())
    }

    #[test]
    fn delete_and_rename() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let dir = FsDirectory::open(tmp.path())?;

        dir.create_file("a")?.close()?;
        dir.rename_file("a", "b")?;
        assert!(!dir.exists("a")?);
        assert!(dir.exists("b")?);

        dir.delete_file("b")?;
        assert!(!dir.exists("b")?);

        Ok(())
    }
}
