#[cfg(test)]
mod __test__ {

  use crate::entry::LogEntry;
  use crate::file_sink::FileSink;
  use crate::level::LogLevel;
  use crate::sink::Sink;
  use std::fs;

  fn entry(level: LogLevel) -> LogEntry {
    LogEntry {
      thread_id: 1,
      format_id: crate::registry::LITERAL_LOG_STRING_ID,
      level: level as u8,
      payload_size: LogEntry::SIZE as u16,
      content_len: 0,
      timestamp_ns: 3_723_000_000_000, // 01:02:03 UTC
    }
  }

  fn archives_in(dir: &std::path::Path) -> Vec<String> {
    fs::read_dir(dir)
      .unwrap()
      .filter_map(|e| e.ok())
      .map(|e| e.file_name().to_string_lossy().into_owned())
      .filter(|name| name.ends_with(".lz4"))
      .collect()
  }

  #[test]
  fn test_line_prefix_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");

    let mut sink = FileSink::new(&path).unwrap();
    sink.on_log(&entry(LogLevel::Warn), b"disk almost full\n");
    sink.flush();

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "[01:02:03.000000] warn: disk almost full\n");
  }

  #[test]
  fn test_raw_records_skip_level_tag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");

    let mut sink = FileSink::new(&path).unwrap();
    sink.on_log(&entry(LogLevel::Raw), b"banner\n");
    sink.flush();

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "[01:02:03.000000] banner\n");
  }

  #[test]
  fn test_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/deeper/app.log");

    let mut sink = FileSink::new(&path).unwrap();
    sink.on_log(&entry(LogLevel::Info), b"x\n");
    sink.flush();
    assert!(path.exists());
  }

  #[test]
  fn test_existing_file_is_archived_on_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    fs::write(&path, "previous run\n").unwrap();

    let mut sink = FileSink::new(&path).unwrap();
    sink.on_log(&entry(LogLevel::Info), b"fresh run\n");
    sink.flush();

    // The old contents moved into a compressed archive; the live file only
    // has the new record.
    let archives = archives_in(dir.path());
    assert_eq!(archives.len(), 1);
    assert!(archives[0].starts_with("app_"));
    assert!(archives[0].ends_with(".log.lz4"));

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.ends_with("fresh run\n"));
    assert!(!contents.contains("previous run"));
  }

  #[test]
  fn test_empty_existing_file_is_not_archived() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    fs::write(&path, "").unwrap();

    let _sink = FileSink::new(&path).unwrap();
    assert!(archives_in(dir.path()).is_empty());
  }

  #[test]
  fn test_size_rotation_produces_archives() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");

    let mut sink = FileSink::with_rotation(&path, 256).unwrap();
    for _ in 0..64 {
      sink.on_log(&entry(LogLevel::Info), b"0123456789abcdef\n");
    }
    sink.flush();

    // Collisions within one second get the -N counter suffix, so every
    // rotation survives as its own archive.
    assert!(!archives_in(dir.path()).is_empty());
    assert!(path.exists());
  }
}
