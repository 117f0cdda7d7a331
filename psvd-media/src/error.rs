use std::{io, path::PathBuf};
use thiserror::Error;

/// The error type returned by source reads and decryption.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read {} at offset {offset}: {source}", .path.display())]
    Read {
        path: PathBuf,
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("Cannot seek {} to offset {offset}: {source}", .path.display())]
    Seek {
        path: PathBuf,
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("Source {} is too large to fit in memory ({len} bytes)", .path.display())]
    TooLarge { path: PathBuf, len: u64 },

    #[error("Cannot write decrypted data: {0}")]
    Write(#[source] io::Error),
}

impl Error {
    /// Returns true if the error happened while reading the encrypted source.
    pub fn is_source_err(&self) -> bool {
        !matches!(self, Self::Write(_))
    }
}
