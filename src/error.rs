use std::path::PathBuf;

use thiserror::Error;

/// Failure to decode a `.TOM` header from a byte buffer.
///
/// Only a short buffer is an error. Offsets that point outside the file are
/// left for the caller to judge.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("file too small for a .TOM header: need 32 bytes, have {len}")]
    TooSmall { len: usize },
}

/// Failure to load or inspect a `.TOM` file from disk.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error reading {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("could not decode {}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        err: DecodeError,
    },
}

impl LoadError {
    /// The decode failure behind this error, if any.
    pub fn decode_error(&self) -> Option<DecodeError> {
        match self {
            LoadError::Decode { err, .. } => Some(*err),
            LoadError::Io { .. } => None,
        }
    }
}

/// Rejected `--end-offset` style input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseOffsetError {
    #[error("offset is empty")]
    Empty,
    #[error("offset must not be negative: {0}")]
    Negative(String),
    #[error("invalid offset {input:?}: {reason}")]
    Invalid { input: String, reason: String },
}
