//! Whole-file input for binary and text streams.

use std::fs::File;
use std::io::Read;
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap;

use crate::util::{Error, Result};

/// Bytes of an input file, memory-mapped when possible.
pub enum InputFile {
    /// Memory-mapped file (preferred for large files)
    Mmap(Mmap),
    /// Fully buffered contents
    Buffer(Vec<u8>),
}

impl InputFile {
    /// Open a file, memory-mapping it when the `mmap` feature is enabled.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, cfg!(feature = "mmap"))
    }

    /// Open a file with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        let mut file = File::open(path.as_ref())?;
        let size = file.metadata()?.len();

        if use_mmap && size > 0 {
            // Safety: the file is opened read-only and the map is dropped with self
            let mmap = unsafe { Mmap::map(&file) }
                .map_err(|e| Error::other(format!("memory mapping {} failed: {e}", path.as_ref().display())))?;
            return Ok(Self::Mmap(mmap));
        }

        let mut buf = Vec::with_capacity(size as usize);
        file.read_to_end(&mut buf)?;
        Ok(Self::Buffer(buf))
    }
}

impl Deref for InputFile {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::Mmap(mmap) => mmap,
            Self::Buffer(buf) => buf,
        }
    }
}
