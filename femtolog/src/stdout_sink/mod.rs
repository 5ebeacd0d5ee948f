//! Human-readable terminal sink with optional ANSI colors.

mod __test__;

use chrono::{DateTime, Utc};
use std::io::{self, Write};

use crate::entry::LogEntry;
use crate::level::LogLevel;
use crate::options::ColorMode;
use crate::sink::Sink;
use crate::utils;

const RESET: &str = "\x1b[0m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";

pub struct StdoutSink {
  color: bool,
  buffer: String,
}

impl StdoutSink {
  pub fn new(mode: ColorMode) -> Self {
    let color = match mode {
      ColorMode::Auto => utils::stdout_is_terminal(),
      ColorMode::Always => true,
      ColorMode::Never => false,
    };
    Self {
      color,
      buffer: String::with_capacity(256),
    }
  }

  /// Renders the line prefix + content into `out`. Kept separate from the
  /// write so the format is testable without capturing stdout.
  fn render(out: &mut String, entry: &LogEntry, content: &[u8], color: bool) {
    let level = entry.level();
    let message = String::from_utf8_lossy(content);

    // Raw records carry a finished line; forward them untouched.
    if level == LogLevel::Raw {
      out.push_str(&message);
      return;
    }

    let secs = (entry.timestamp_ns / 1_000_000_000) as i64;
    let nanos = (entry.timestamp_ns % 1_000_000_000) as u32;
    let datetime: DateTime<Utc> =
      DateTime::from_timestamp(secs, nanos).unwrap_or_else(|| DateTime::from_timestamp_nanos(0));

    use std::fmt::Write;
    if color {
      let _ = write!(
        out,
        "{GREEN}[{}]{RESET} {}[{}]{RESET} {CYAN}t{:08x}{RESET} {}",
        datetime.format("%H:%M:%S%.6f"),
        level.ansi_color(),
        level.as_upper_str(),
        entry.thread_id,
        message,
      );
    } else {
      let _ = write!(
        out,
        "[{}] [{}] t{:08x} {}",
        datetime.format("%H:%M:%S%.6f"),
        level.as_upper_str(),
        entry.thread_id,
        message,
      );
    }
  }
}

impl Sink for StdoutSink {
  fn on_log(&mut self, entry: &LogEntry, content: &[u8]) {
    self.buffer.clear();
    Self::render(&mut self.buffer, entry, content, self.color);
    let _ = io::stdout().write_all(self.buffer.as_bytes());
  }

  fn flush(&mut self) {
    let _ = io::stdout().flush();
  }
}
