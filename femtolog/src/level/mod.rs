//! # Log Levels
//!
//! Severity levels for log records. Smaller ordinal means more severe, so
//! level filtering is a single integer comparison against the threshold.
//! `Raw` is special: it compares as the most severe level and tells sinks to
//! emit the payload without any level/timestamp prefix.


use serde::{Deserialize, Serialize};
use std::fmt;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogLevel {
  /// No prefix is emitted by sinks; always passes the level gate.
  Raw = 0,
  Fatal = 1,
  Error = 2,
  Warn = 3,
  Info = 4,
  Debug = 5,
  Trace = 6,
}

/// Compile-time ceiling for the level gate. Records whose level ordinal
/// exceeds this constant are removed by constant folding in the logging
/// macros. Controlled by the `max-level-*` cargo features; the most severe
/// enabled feature wins.
pub const STATIC_MAX_LEVEL: LogLevel = static_max_level();

const fn static_max_level() -> LogLevel {
  if cfg!(feature = "max-level-fatal") {
    LogLevel::Fatal
  } else if cfg!(feature = "max-level-error") {
    LogLevel::Error
  } else if cfg!(feature = "max-level-warn") {
    LogLevel::Warn
  } else if cfg!(feature = "max-level-info") {
    LogLevel::Info
  } else if cfg!(feature = "max-level-debug") {
    LogLevel::Debug
  } else {
    LogLevel::Trace
  }
}

impl LogLevel {
  /// Convert from the wire representation. Out-of-range bytes map to `Info`
  /// rather than panicking; record headers travel through a byte ring and a
  /// reader must tolerate anything.
  #[inline]
  pub fn from_u8(level: u8) -> LogLevel {
    match level {
      0 => LogLevel::Raw,
      1 => LogLevel::Fatal,
      2 => LogLevel::Error,
      3 => LogLevel::Warn,
      4 => LogLevel::Info,
      5 => LogLevel::Debug,
      6 => LogLevel::Trace,
      _ => LogLevel::Info,
    }
  }

  /// Parse a lowercase level name. Unknown names yield `None`.
  pub fn from_str(s: &str) -> Option<LogLevel> {
    match s {
      "raw" => Some(LogLevel::Raw),
      "fatal" => Some(LogLevel::Fatal),
      "error" => Some(LogLevel::Error),
      "warn" => Some(LogLevel::Warn),
      "info" => Some(LogLevel::Info),
      "debug" => Some(LogLevel::Debug),
      "trace" => Some(LogLevel::Trace),
      _ => None,
    }
  }

  pub const fn as_lower_str(self) -> &'static str {
    match self {
      LogLevel::Raw => "raw",
      LogLevel::Fatal => "fatal",
      LogLevel::Error => "error",
      LogLevel::Warn => "warn",
      LogLevel::Info => "info",
      LogLevel::Debug => "debug",
      LogLevel::Trace => "trace",
    }
  }

  pub const fn as_upper_str(self) -> &'static str {
    match self {
      LogLevel::Raw => "RAW",
      LogLevel::Fatal => "FATAL",
      LogLevel::Error => "ERROR",
      LogLevel::Warn => "WARN",
      LogLevel::Info => "INFO",
      LogLevel::Debug => "DEBUG",
      LogLevel::Trace => "TRACE",
    }
  }

  /// ANSI color sequence used by terminal sinks for the level tag.
  pub const fn ansi_color(self) -> &'static str {
    match self {
      LogLevel::Raw => "\x1b[0m",
      LogLevel::Fatal => "\x1b[35m",
      LogLevel::Error => "\x1b[31m",
      LogLevel::Warn => "\x1b[33m",
      LogLevel::Info => "\x1b[32m",
      LogLevel::Debug => "\x1b[36m",
      LogLevel::Trace => "\x1b[90m",
    }
  }
}

impl fmt::Display for LogLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_upper_str())
  }
}
