//! Loading `.TOM` files from disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DecodeError, LoadError};
use crate::models::tom::{self, Inspection, TomHeader};

/// The raw contents of a `.TOM` file and the path it was read from.
#[derive(Debug, Clone)]
pub struct TomFile {
    path: PathBuf,
    data: Vec<u8>,
}

impl TomFile {
    /// Read the whole file at `path`.
    ///
    /// The file handle is released before this returns, whether or not the
    /// read succeeded.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|err| LoadError::Io {
            path: path.to_owned(),
            err,
        })?;

        debug!("read {} bytes from {}", data.len(), path.display());

        Ok(Self::from_bytes(path, data))
    }

    /// Wrap bytes that were already read by the caller.
    pub fn from_bytes<P: AsRef<Path>>(path: P, data: Vec<u8>) -> Self {
        TomFile {
            path: path.as_ref().to_owned(),
            data,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decode just the header.
    pub fn header(&self) -> Result<TomHeader, DecodeError> {
        tom::decode(&self.data)
    }

    /// Decode the header and compute the block span ending at `end_offset`.
    pub fn inspect(&self, end_offset: u32) -> Result<Inspection, LoadError> {
        tom::inspect(&self.data, end_offset).map_err(|err| LoadError::Decode {
            path: self.path.clone(),
            err,
        })
    }
}
