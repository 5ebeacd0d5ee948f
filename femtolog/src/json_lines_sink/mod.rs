//! Structured sink: one JSON object per record, newline-delimited.


use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::entry::LogEntry;
use crate::sink::Sink;

#[derive(Serialize)]
struct JsonRecord<'a> {
  timestamp_ns: u64,
  level: &'a str,
  thread_id: u32,
  hostname: &'a str,
  message: &'a str,
}

pub struct JsonLinesSink<W: Write + Send> {
  out: W,
  hostname: String,
}

impl JsonLinesSink<BufWriter<File>> {
  /// Open (or create) `path` for appending JSON lines.
  pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Self::from_writer(BufWriter::new(file)))
  }
}

impl<W: Write + Send> JsonLinesSink<W> {
  pub fn from_writer(out: W) -> Self {
    Self {
      out,
      hostname: gethostname::gethostname().to_string_lossy().into_owned(),
    }
  }
}

impl<W: Write + Send> Sink for JsonLinesSink<W> {
  fn on_log(&mut self, entry: &LogEntry, content: &[u8]) {
    let message = String::from_utf8_lossy(content);
    let record = JsonRecord {
      timestamp_ns: entry.timestamp_ns,
      level: entry.level().as_lower_str(),
      thread_id: entry.thread_id,
      hostname: &self.hostname,
      // Trailing newlines belong to the terminal representation, not the
      // structured one.
      message: message.trim_end_matches('\n'),
    };

    if serde_json::to_writer(&mut self.out, &record).is_err() {
      return;
    }
    let _ = self.out.write_all(b"\n");
  }

  fn flush(&mut self) {
    let _ = self.out.flush();
  }
}
