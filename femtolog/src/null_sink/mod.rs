use crate::entry::LogEntry;
use crate::sink::Sink;

/// Discards every record. Useful for benchmarks and for measuring the cost
/// of everything up to the sink boundary.
#[derive(Debug, Default)]
pub struct NullSink;

impl NullSink {
  pub fn new() -> Self {
    Self
  }
}

impl Sink for NullSink {
  #[inline]
  fn on_log(&mut self, _entry: &LogEntry, _content: &[u8]) {}
}
