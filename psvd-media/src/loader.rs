use crate::{Error, Result, SourceReader, cipher};
use std::{io::Write, path::Path};

/// Read and decrypt a whole source file in memory.
///
/// Returns `None` when the source is missing or empty. The returned buffer is
/// exactly as long as the number of bytes actually read.
pub fn load_whole_file<P: AsRef<Path>>(path: P) -> Result<Option<Vec<u8>>> {
    let mut reader = SourceReader::open(path)?;

    if reader.is_empty() {
        return Ok(None);
    }

    let len = usize::try_from(reader.len()).map_err(|_| Error::TooLarge {
        path: reader.path().to_path_buf(),
        len: reader.len(),
    })?;

    let mut data = vec![0; len];
    reader.seek(0)?;
    let read = reader.read_block(&mut data)?;
    data.truncate(read);
    cipher::apply_keystream(&mut data, 0);
    Ok(Some(data))
}

/// Decrypt a source file into `writer` one block at a time.
///
/// Each block is decrypted at its absolute offset in the source, so the output is
/// byte for byte identical to [`load_whole_file`]. Returns the number of bytes
/// written, which is zero for missing or empty sources.
pub fn decrypt_to<P: AsRef<Path>, W: Write>(path: P, writer: &mut W) -> Result<u64> {
    let mut reader = SourceReader::open(path)?;

    if reader.is_empty() {
        return Ok(0);
    }

    let block_size = reader.len().min(SourceReader::BLOCK_SIZE as u64) as usize;
    let mut block = vec![0; block_size];
    reader.seek(0)?;

    loop {
        let position = reader.position();
        let read = reader.read_block(&mut block)?;

        if read == 0 {
            break;
        }

        cipher::apply_keystream(&mut block[..read], position);
        writer.write_all(&block[..read]).map_err(Error::Write)?;
    }

    writer.flush().map_err(Error::Write)?;
    Ok(reader.position())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_and_empty_sources() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.psv");
        fs::write(&empty, b"").unwrap();

        assert!(load_whole_file(dir.path().join("missing.psv")).unwrap().is_none());
        assert!(load_whole_file(&empty).unwrap().is_none());

        let mut out = Vec::new();
        assert_eq!(decrypt_to(&empty, &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_streamed_matches_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.psv");
        // Spans several blocks and ends mid block.
        let data = (0..SourceReader::BLOCK_SIZE * 3 + 1234)
            .map(|i| (i % 253) as u8)
            .collect::<Vec<_>>();
        fs::write(&path, &data).unwrap();

        let whole = load_whole_file(&path).unwrap().unwrap();
        let mut streamed = Vec::new();
        let written = decrypt_to(&path, &mut streamed).unwrap();

        assert_eq!(written, data.len() as u64);
        assert_eq!(whole, streamed);
    }
}
