//! Append-only JSONL file writer, the durable side of program logging.
//!
//! The ring buffer held by [`super::ProgramLogger`] is bounded and volatile;
//! this writer persists every line. Writes happen outside the buffer's lock.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

/// Appends log lines to a program's JSONL file.
#[derive(Debug)]
pub struct ProgramLogWriter {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl ProgramLogWriter {
    /// Open (or create) the log file in append mode, creating parent
    /// directories as needed.
    pub fn new(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path,
        })
    }

    /// Path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line, adding the trailing newline if missing, and flush so
    /// the file is current even if the process dies.
    pub fn write_line(&self, line: &[u8]) -> std::io::Result<()> {
        let mut writer = self.writer.lock();
        writer.write_all(line)?;
        if !line.ends_with(b"\n") {
            writer.write_all(b"\n")?;
        }
        writer.flush()
    }

    /// Flush any buffered data to disk.
    pub fn flush(&self) -> std::io::Result<()> {
        self.writer.lock().flush()
    }
}

impl Drop for ProgramLogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Read existing lines from a log file, keeping at most the last `max`.
///
/// Used to seed a fresh process's ring buffer with prior history. A missing
/// file is normal (first run) and yields no lines.
pub fn read_recent_lines(path: impl AsRef<Path>, max: usize) -> std::io::Result<Vec<Vec<u8>>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut lines: Vec<Vec<u8>> = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        lines.push(line.into_bytes());
    }

    if lines.len() > max {
        lines.drain(..lines.len() - max);
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writer_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("logs").join("downloader.jsonl");

        let writer = ProgramLogWriter::new(&path).unwrap();

        assert!(temp.path().join("logs").exists());
        assert!(writer.path().exists());
    }

    #[test]
    fn writer_appends_and_terminates_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.jsonl");

        let writer = ProgramLogWriter::new(&path).unwrap();
        writer.write_line(b"first line").unwrap();
        writer.write_line(b"second line\n").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first line\nsecond line\n");
    }

    #[test]
    fn writer_appends_across_reopens() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.jsonl");

        {
            let writer = ProgramLogWriter::new(&path).unwrap();
            writer.write_line(b"from run one").unwrap();
        }
        {
            let writer = ProgramLogWriter::new(&path).unwrap();
            writer.write_line(b"from run two").unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, ["from run one", "from run two"]);
    }

    #[test]
    fn read_recent_lines_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let lines = read_recent_lines(temp.path().join("absent.jsonl"), 100).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn read_recent_lines_keeps_only_the_tail() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.jsonl");

        let writer = ProgramLogWriter::new(&path).unwrap();
        for i in 0..10 {
            writer.write_line(format!("line-{i}").as_bytes()).unwrap();
        }

        let lines = read_recent_lines(&path, 3).unwrap();
        let lines: Vec<_> = lines
            .into_iter()
            .map(|b| String::from_utf8(b).unwrap())
            .collect();
        assert_eq!(lines, ["line-7", "line-8", "line-9"]);
    }
}
