//! Buffered file sink.
//!
//! Each record is written as `[HH:MM:SS.ffffff] level: content`; `Raw`
//! records get the timestamp only. A pre-existing log file is archived on
//! open (compressed to `<stem>_<timestamp>[-N].<ext>.lz4` next to it) so
//! every run starts with a fresh live file, and the same archiving runs
//! when size-based rotation is enabled and the live file reaches its
//! limit. Archive failures are reported to stderr and never propagate;
//! logging continues into whichever file is open.

mod __test__;

use chrono::{DateTime, Utc};
use lz4::block::{compress, CompressionMode};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::entry::LogEntry;
use crate::level::LogLevel;
use crate::sink::Sink;

pub struct FileSink {
  path: PathBuf,
  writer: BufWriter<File>,
  line: String,
  written: u64,
  /// Rotate when the live file reaches this many bytes; `None` disables
  /// rotation.
  max_file_size: Option<u64>,
}

impl FileSink {
  /// Open `path` for logging, archiving any previous contents first.
  pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
    Self::create(path.as_ref(), None)
  }

  /// Like `new`, but also archive-and-reopen once the live file reaches
  /// `max_file_size` bytes.
  pub fn with_rotation(path: impl AsRef<Path>, max_file_size: u64) -> io::Result<Self> {
    Self::create(path.as_ref(), Some(max_file_size))
  }

  fn create(path: &Path, max_file_size: Option<u64>) -> io::Result<Self> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }

    if let Err(e) = Self::archive_existing(path) {
      eprintln!("[femtolog] failed to archive {}: {e}", path.display());
    }

    let file = Self::open_live(path)?;
    let written = file.metadata()?.len();

    Ok(Self {
      path: path.to_path_buf(),
      writer: BufWriter::new(file),
      line: String::with_capacity(256),
      written,
      max_file_size,
    })
  }

  fn open_live(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
  }

  /// `<stem>_<timestamp>.<ext>.lz4`, with a `-N` counter when a run
  /// produces several archives within one second.
  fn archive_path_for(path: &Path) -> PathBuf {
    let stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let stem = path
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_default();
    let extension = path.extension().map(|s| s.to_string_lossy().into_owned());
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    let mut counter = 0u32;
    loop {
      let mut name = format!("{stem}_{stamp}");
      if counter > 0 {
        name.push('-');
        name.push_str(&counter.to_string());
      }
      if let Some(extension) = &extension {
        name.push('.');
        name.push_str(extension);
      }
      name.push_str(".lz4");

      let candidate = parent.join(name);
      if !candidate.exists() {
        return candidate;
      }
      counter += 1;
    }
  }

  /// Compress the current file next to itself and remove the original.
  /// Empty or missing files are left alone.
  fn archive_existing(path: &Path) -> io::Result<()> {
    let Ok(metadata) = fs::metadata(path) else {
      return Ok(());
    };
    if metadata.len() == 0 {
      return Ok(());
    }

    let raw = fs::read(path)?;
    let compressed = compress(&raw, Some(CompressionMode::DEFAULT), true)?;

    let dest = Self::archive_path_for(path);
    let mut out = File::create(&dest)?;
    out.write_all(&compressed)?;
    out.sync_all()?;
    fs::remove_file(path)?;
    Ok(())
  }

  fn rotate(&mut self) {
    if let Err(e) = self.try_rotate() {
      eprintln!(
        "[femtolog] log rotation failed for {}: {e}",
        self.path.display()
      );
    }
  }

  fn try_rotate(&mut self) -> io::Result<()> {
    self.writer.flush()?;
    Self::archive_existing(&self.path)?;
    self.writer = BufWriter::new(Self::open_live(&self.path)?);
    self.written = 0;
    Ok(())
  }

  /// `[HH:MM:SS.ffffff] level: content`; Raw skips the level tag.
  fn render(line: &mut String, entry: &LogEntry, content: &[u8]) {
    let secs = (entry.timestamp_ns / 1_000_000_000) as i64;
    let nanos = (entry.timestamp_ns % 1_000_000_000) as u32;
    let datetime: DateTime<Utc> =
      DateTime::from_timestamp(secs, nanos).unwrap_or_else(|| DateTime::from_timestamp_nanos(0));

    use std::fmt::Write;
    let _ = write!(line, "[{}] ", datetime.format("%H:%M:%S%.6f"));
    let level = entry.level();
    if level != LogLevel::Raw {
      line.push_str(level.as_lower_str());
      line.push_str(": ");
    }
    line.push_str(&String::from_utf8_lossy(content));
  }
}

impl Sink for FileSink {
  fn on_log(&mut self, entry: &LogEntry, content: &[u8]) {
    self.line.clear();
    Self::render(&mut self.line, entry, content);

    if let Err(e) = self.writer.write_all(self.line.as_bytes()) {
      eprintln!("[femtolog] file sink write failed: {e}");
      return;
    }
    self.written += self.line.len() as u64;

    if let Some(max) = self.max_file_size {
      if self.written >= max {
        self.rotate();
      }
    }
  }

  fn flush(&mut self) {
    let _ = self.writer.flush();
  }
}

impl Drop for FileSink {
  fn drop(&mut self) {
    let _ = self.writer.flush();
  }
}
