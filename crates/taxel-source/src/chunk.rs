use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::error::{Result, SourceError};

/// A producer of byte chunks, arriving at arbitrary granularity and rate.
///
/// `read_chunk` blocks until at least one byte is available, fills as much
/// of `buf` as the transport delivered, and returns the byte count.
/// `Ok(0)` means the stream ended.
pub trait ChunkSource {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize>;
}

fn read_retrying(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(read) => return Ok(read),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(SourceError::Io(err)),
        }
    }
}

/// Chunk source over any `Read` stream.
pub struct ReaderSource<R> {
    inner: R,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Consume the source and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ChunkSource for ReaderSource<R> {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        read_retrying(&mut self.inner, buf)
    }
}

/// Replays a captured byte stream from a file.
#[derive(Debug)]
pub struct FileSource {
    file: File,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { file })
    }
}

impl ChunkSource for FileSource {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        read_retrying(&mut self.file, buf)
    }
}

/// Reads a live stream piped to stdin.
pub struct StdinSource {
    stdin: std::io::Stdin,
}

impl StdinSource {
    pub fn new() -> Self {
        Self {
            stdin: std::io::stdin(),
        }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkSource for StdinSource {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        read_retrying(&mut self.stdin.lock(), buf)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn reader_source_drains_stream() {
        let mut source = ReaderSource::new(Cursor::new(vec![1u8, 2, 3]));
        let mut buf = [0u8; 2];

        assert_eq!(source.read_chunk(&mut buf).unwrap(), 2);
        assert_eq!(&buf, &[1, 2]);
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 3);
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 0);
    }

    #[test]
    fn interrupted_read_retries() {
        struct InterruptedOnce {
            fired: bool,
        }

        impl Read for InterruptedOnce {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if !self.fired {
                    self.fired = true;
                    return Err(std::io::Error::from(ErrorKind::Interrupted));
                }
                buf[0] = 0xAB;
                Ok(1)
            }
        }

        let mut source = ReaderSource::new(InterruptedOnce { fired: false });
        let mut buf = [0u8; 4];
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 0xAB);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = FileSource::open("/nonexistent/taxel.capture").unwrap_err();
        match err {
            SourceError::Open { path, .. } => {
                assert_eq!(path, std::path::PathBuf::from("/nonexistent/taxel.capture"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
