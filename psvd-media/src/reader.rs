use crate::{Error, Result};
use std::{
    fs::File,
    io::{ErrorKind, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

/// Position aware reader over an encrypted source file.
///
/// A missing file is not an error, it simply reads as zero bytes long. This keeps
/// catalogue scanning best effort since clips listed in the catalog are not
/// necessarily downloaded.
#[derive(Debug)]
pub struct SourceReader {
    file: Option<File>,
    len: u64,
    path: PathBuf,
    position: u64,
}

impl SourceReader {
    /// Preferred block size for streaming reads (256 KiB).
    pub const BLOCK_SIZE: usize = 262_144;

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(Self {
                    file: None,
                    len: 0,
                    path,
                    position: 0,
                });
            }
            Err(source) => return Err(Error::Open { path, source }),
        };

        let len = match file.metadata() {
            Ok(metadata) => metadata.len(),
            Err(source) => return Err(Error::Open { path, source }),
        };

        Ok(Self {
            file: Some(file),
            len,
            path,
            position: 0,
        })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute offset of the next byte returned by [`read_block`](Self::read_block).
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Move to an absolute offset. Does nothing for empty or missing sources.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        if self.len == 0 {
            return Ok(());
        }

        if let Some(file) = &mut self.file {
            file.seek(SeekFrom::Start(offset))
                .map_err(|source| Error::Seek {
                    path: self.path.clone(),
                    offset,
                    source,
                })?;
            self.position = offset;
        }

        Ok(())
    }

    /// Fill `buffer` from the current position and return the number of bytes read.
    ///
    /// Unlike [`Read::read`] this keeps reading until the buffer is full or the end
    /// of the file is reached, so a buffer sized to [`len`](Self::len) reads the
    /// whole file in one call. The count is smaller than `buffer.len()` only at
    /// end of file.
    pub fn read_block(&mut self, buffer: &mut [u8]) -> Result<usize> {
        if self.len == 0 {
            return Ok(0);
        }

        let Some(file) = self.file.as_mut() else {
            return Ok(0);
        };

        let mut filled = 0;

        while filled < buffer.len() {
            match file.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(Error::Read {
                        path: self.path.clone(),
                        offset: self.position + filled as u64,
                        source,
                    });
                }
            }
        }

        self.position += filled as u64;
        Ok(filled)
    }
}
