//! Line-oriented input readers with transparent gzip decoding.
//!
//! Dataset partitions ship either as plain JSON Lines or gzip-compressed.
//! Compression is detected from the gzip magic bytes, not the file name, so
//! piped input works the same as files.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use flate2::bufread::MultiGzDecoder;

/// Buffer size for raw and decompressed readers (256KB)
const READ_BUF_SIZE: usize = 256 * 1024;

/// gzip member header magic
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Shared byte counter for progress tracking (counts raw, compressed bytes)
pub type ByteCounter = Arc<AtomicU64>;

/// Buffered line reader over the (possibly decompressed) input
pub type InputReader = Box<dyn BufRead + Send>;

/// Where records are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `None` or `-` means stdin.
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(p) if p.as_os_str() != "-" => Self::File(p.to_path_buf()),
            _ => Self::Stdin,
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => write!(f, "<stdin>"),
            Self::File(p) => write!(f, "{}", p.display()),
        }
    }
}

/// Reader wrapper that tracks bytes read
pub struct CountingReader<R> {
    inner: R,
    count: ByteCounter,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

/// Open an input source → (line reader, byte counter, total raw bytes)
///
/// The total is the file size for regular files and `None` for stdin.
pub fn open_input(source: &InputSource) -> io::Result<(InputReader, ByteCounter, Option<u64>)> {
    let counter = Arc::new(AtomicU64::new(0));
    match source {
        InputSource::Stdin => {
            let reader = wrap_reader(io::stdin(), counter.clone())?;
            Ok((reader, counter, None))
        }
        InputSource::File(path) => {
            let file = File::open(path)?;
            let total = file.metadata().ok().map(|m| m.len());
            let reader = wrap_reader(file, counter.clone())?;
            Ok((reader, counter, total))
        }
    }
}

/// Count raw bytes, then sniff the magic and insert a gzip decoder if needed.
pub fn wrap_reader<R: Read + Send + 'static>(
    inner: R,
    count: ByteCounter,
) -> io::Result<InputReader> {
    let mut raw = BufReader::with_capacity(READ_BUF_SIZE, CountingReader { inner, count });
    let is_gzip = raw.fill_buf()?.starts_with(&GZIP_MAGIC);
    if is_gzip {
        log::debug!("gzip input detected");
        // Partitions may be concatenated gzip members
        let gz = MultiGzDecoder::new(raw);
        Ok(Box::new(BufReader::with_capacity(READ_BUF_SIZE, gz)))
    } else {
        Ok(Box::new(raw))
    }
}
