#[cfg(test)]
mod __test__ {

  use crate::entry::LogEntry;
  use crate::level::LogLevel;
  use crate::stdout_sink::StdoutSink;

  fn entry(level: LogLevel) -> LogEntry {
    LogEntry {
      thread_id: 0xabcd,
      format_id: 1,
      level: level as u8,
      payload_size: LogEntry::SIZE as u16,
      content_len: 0,
      timestamp_ns: 3_723_000_000_500, // 01:02:03.0000005 UTC
    }
  }

  fn render(level: LogLevel, content: &str, color: bool) -> String {
    let mut out = String::new();
    StdoutSink::render(&mut out, &entry(level), content.as_bytes(), color);
    out
  }

  #[test]
  fn test_plain_line_format() {
    let line = render(LogLevel::Info, "hello\n", false);
    assert_eq!(line, "[01:02:03.000000] [INFO] t0000abcd hello\n");
  }

  #[test]
  fn test_raw_records_skip_prefix() {
    assert_eq!(render(LogLevel::Raw, "raw bytes\n", false), "raw bytes\n");
    assert_eq!(render(LogLevel::Raw, "raw bytes\n", true), "raw bytes\n");
  }

  #[test]
  fn test_colored_line_contains_ansi() {
    let line = render(LogLevel::Error, "boom\n", true);
    assert!(line.contains("\x1b[31m"));
    assert!(line.contains("[ERROR]"));
    assert!(line.ends_with("boom\n"));
  }

  #[test]
  fn test_no_newline_appended() {
    let line = render(LogLevel::Warn, "no newline", false);
    assert!(line.ends_with("no newline"));
  }
}
