//! Line-oriented output sink: stdout, or a file written via tmp then rename

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Output buffer size (256KB)
const WRITE_BUF_SIZE: usize = 256 * 1024;

/// Buffered line writer.
///
/// File output goes to `<path>.tmp` and is renamed into place by
/// [`finalize`](LineSink::finalize), so a crashed run never leaves a
/// truncated file under the final name.
pub struct LineSink {
    writer: BufWriter<Box<dyn Write + Send>>,
    paths: Option<(PathBuf, PathBuf)>,
    line_count: usize,
}

impl std::fmt::Debug for LineSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineSink")
            .field("final_path", &self.paths.as_ref().map(|(_, p)| p))
            .field("line_count", &self.line_count)
            .finish_non_exhaustive()
    }
}

impl LineSink {
    /// Sink writing to a temporary file next to `path`
    pub fn create(path: &Path) -> io::Result<Self> {
        let final_path = path.to_path_buf();
        let mut tmp_name = final_path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        if let Some(parent) = final_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Clean up stale tmp file
        if tmp_path.exists() {
            log::warn!("Removing stale tmp file: {}", tmp_path.display());
            fs::remove_file(&tmp_path)?;
        }

        let file: Box<dyn Write + Send> = Box::new(File::create(&tmp_path)?);
        Ok(Self {
            writer: BufWriter::with_capacity(WRITE_BUF_SIZE, file),
            paths: Some((tmp_path, final_path)),
            line_count: 0,
        })
    }

    /// Sink writing to stdout
    pub fn stdout() -> Self {
        Self::from_writer(Box::new(io::stdout()))
    }

    /// Sink over an arbitrary writer (no rename on finalize)
    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: BufWriter::with_capacity(WRITE_BUF_SIZE, writer),
            paths: None,
            line_count: 0,
        }
    }

    /// Write one line; a newline is appended
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.line_count += 1;
        Ok(())
    }

    /// Lines written so far
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Flush and, for file output, atomically rename tmp → final
    pub fn finalize(self) -> io::Result<usize> {
        let Self {
            mut writer,
            paths,
            line_count,
        } = self;
        writer.flush()?;
        // Close the file before renaming
        drop(writer);
        if let Some((tmp_path, final_path)) = paths {
            fs::rename(&tmp_path, &final_path)?;
        }
        Ok(line_count)
    }

    /// Drop buffered output and remove the tmp file, if any
    pub fn abort(self) -> io::Result<()> {
        let Self { writer, paths, .. } = self;
        // into_parts skips the flush-on-drop
        let _ = writer.into_parts();
        if let Some((tmp_path, _)) = paths {
            fs::remove_file(&tmp_path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn finalize_renames_tmp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("abstracts.txt");

        let mut sink = LineSink::create(&path).unwrap();
        sink.write_line("a b c ").unwrap();
        sink.write_line("d ").unwrap();
        assert!(dir.path().join("abstracts.txt.tmp").exists());
        assert!(!path.exists());

        assert_eq!(sink.finalize().unwrap(), 2);
        assert!(!dir.path().join("abstracts.txt.tmp").exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a b c \nd \n");
    }

    #[test]
    fn create_replaces_stale_tmp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jsonl");
        std::fs::write(dir.path().join("out.jsonl.tmp"), b"stale").unwrap();

        let sink = LineSink::create(&path).unwrap();
        sink.finalize().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn create_makes_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/out.txt");
        let mut sink = LineSink::create(&path).unwrap();
        sink.write_line("x ").unwrap();
        sink.finalize().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn abort_removes_tmp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        let mut sink = LineSink::create(&path).unwrap();
        sink.write_line("partial").unwrap();
        sink.abort().unwrap();
        assert!(!path.exists());
        assert!(!dir.path().join("out.txt.tmp").exists());
    }

    #[test]
    fn writer_sink_counts_lines() {
        let mut sink = LineSink::from_writer(Box::new(io::sink()));
        sink.write_line("one").unwrap();
        sink.write_line("two").unwrap();
        assert_eq!(sink.line_count(), 2);
        assert_eq!(sink.finalize().unwrap(), 2);
    }
}
