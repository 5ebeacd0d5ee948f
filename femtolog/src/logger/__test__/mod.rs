#[cfg(test)]
mod __test__ {

  use crate::entry::LogEntry;
  use crate::level::LogLevel;
  use crate::logger::Logger;
  use crate::null_sink::NullSink;
  use crate::options::FemtologOptions;
  use crate::sink::Sink;
  use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
  use std::sync::{Arc, Mutex};

  struct VecSink {
    records: Arc<Mutex<Vec<(LogLevel, String)>>>,
  }

  impl VecSink {
    fn new() -> (Self, Arc<Mutex<Vec<(LogLevel, String)>>>) {
      let records = Arc::new(Mutex::new(Vec::new()));
      (
        Self {
          records: Arc::clone(&records),
        },
        records,
      )
    }
  }

  impl Sink for VecSink {
    fn on_log(&mut self, entry: &LogEntry, content: &[u8]) {
      self
        .records
        .lock()
        .unwrap()
        .push((entry.level(), String::from_utf8_lossy(content).into_owned()));
    }
  }

  /// Spins until released; used to wedge the worker so the ring fills.
  struct GatedSink {
    gate: Arc<AtomicBool>,
    delivered: Arc<AtomicU64>,
  }

  impl Sink for GatedSink {
    fn on_log(&mut self, _entry: &LogEntry, _content: &[u8]) {
      while !self.gate.load(Ordering::Acquire) {
        std::thread::sleep(std::time::Duration::from_micros(50));
      }
      self.delivered.fetch_add(1, Ordering::Relaxed);
    }
  }

  fn options_with_queue(bytes: usize) -> FemtologOptions {
    FemtologOptions {
      spsc_queue_size: bytes,
      terminate_on_fatal: false,
      ..FemtologOptions::default()
    }
  }

  #[test]
  fn test_scenario_literal_log_thousand_times() {
    let mut logger = Logger::new();
    logger.init(&options_with_queue(1024 * 1024));
    let (sink, records) = VecSink::new();
    logger.register_sink(sink);
    logger.register_sink(NullSink::new());
    logger.start_worker();

    for _ in 0..1000 {
      crate::info!(logger, "hello\n");
    }
    logger.stop_worker();

    assert_eq!(logger.enqueued_count(), 1000);
    assert_eq!(logger.dropped_count(), 0);

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1000);
    assert!(records
      .iter()
      .all(|(level, content)| *level == LogLevel::Info && content == "hello\n"));
  }

  #[test]
  fn test_scenario_formatted_log() {
    let mut logger = Logger::new();
    logger.init(&options_with_queue(64 * 1024));
    let (sink, records) = VecSink::new();
    logger.register_sink(sink);
    logger.start_worker();

    crate::info!(logger, "x={}, y={}\n", 42i32, "ab");
    logger.stop_worker();

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].1, "x=42, y=ab\n");
  }

  #[test]
  fn test_scenario_level_filtering() {
    let mut logger = Logger::new();
    logger.init(&options_with_queue(64 * 1024));
    let (sink, records) = VecSink::new();
    logger.register_sink(sink);
    logger.set_level(LogLevel::Warn);
    logger.start_worker();

    crate::info!(logger, "skip");
    crate::warn!(logger, "keep");
    logger.stop_worker();

    assert_eq!(logger.enqueued_count(), 1);
    assert_eq!(logger.dropped_count(), 0);

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], (LogLevel::Warn, String::from("keep")));
  }

  #[test]
  fn test_scenario_overflow_drops_are_counted() {
    let mut logger = Logger::new();
    logger.init(&options_with_queue(4 * 1024));

    let gate = Arc::new(AtomicBool::new(false));
    let delivered = Arc::new(AtomicU64::new(0));
    logger.register_sink(GatedSink {
      gate: Arc::clone(&gate),
      delivered: Arc::clone(&delivered),
    });
    logger.start_worker();

    // The gated sink wedges the worker, so the 4KiB ring fills after a
    // handful of 64-byte records and every further call must drop.
    let attempts = 1024u64;
    for _ in 0..attempts {
      crate::info!(logger, "fill\n");
    }
    assert!(logger.dropped_count() > 0);
    assert_eq!(logger.enqueued_count() + logger.dropped_count(), attempts);

    // While the sink stays wedged the worker can free at most one slot, so
    // drops keep accumulating monotonically with further attempts.
    let dropped_when_full = logger.dropped_count();
    for _ in 0..64 {
      crate::info!(logger, "fill\n");
    }
    assert!(logger.dropped_count() > dropped_when_full);
    assert_eq!(logger.enqueued_count() + logger.dropped_count(), attempts + 64);

    gate.store(true, Ordering::Release);
    logger.stop_worker();

    // Exactly the enqueued records were delivered, the drops never were.
    assert_eq!(delivered.load(Ordering::Relaxed), logger.enqueued_count());
  }

  #[test]
  fn test_scenario_shutdown_drain() {
    let mut logger = Logger::new();
    logger.init(&options_with_queue(4 * 1024 * 1024));
    let (sink, records) = VecSink::new();
    logger.register_sink(sink);
    logger.start_worker();

    let total = 10_000u64;
    for i in 0..total {
      crate::info!(logger, "drain {}\n", i);
    }
    logger.stop_worker();

    assert_eq!(logger.enqueued_count(), total);
    assert_eq!(logger.dropped_count(), 0);

    let records = records.lock().unwrap();
    assert_eq!(records.len() as u64, total);
    // FIFO on a single ring.
    assert_eq!(records[0].1, "drain 0\n");
    assert_eq!(records[9_999].1, "drain 9999\n");
  }

  #[test]
  fn test_counter_identity_across_levels() {
    let mut logger = Logger::new();
    logger.init(&options_with_queue(1024 * 1024));
    logger.register_sink(NullSink::new());
    logger.set_level(LogLevel::Info);
    logger.start_worker();

    // 50 pass the gate, 25 are filtered before reaching the frontend.
    for _ in 0..25 {
      crate::error!(logger, "e\n");
      crate::info!(logger, "i\n");
      crate::debug!(logger, "d\n");
    }
    logger.stop_worker();

    assert_eq!(logger.enqueued_count() + logger.dropped_count(), 50);
  }

  #[test]
  fn test_formatted_argument_kinds_end_to_end() {
    let mut logger = Logger::new();
    logger.init(&options_with_queue(64 * 1024));
    let (sink, records) = VecSink::new();
    logger.register_sink(sink);
    logger.start_worker();

    let name = String::from("worker-3");
    crate::info!(logger, "{} finished {} jobs in {}s (ok={})\n", name, 128u64, 1.5f64, true);
    crate::debug!(logger, "marker {}\n", '#');
    crate::error!(logger, "negative {}\n", -40i64);
    logger.stop_worker();

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].1, "worker-3 finished 128 jobs in 1.5s (ok=true)\n");
    assert_eq!(records[1].1, "marker #\n");
    assert_eq!(records[2].1, "negative -40\n");
  }

  #[test]
  fn test_raw_records_skip_level_prefix_semantics() {
    let mut logger = Logger::new();
    logger.init(&options_with_queue(64 * 1024));
    let (sink, records) = VecSink::new();
    logger.register_sink(sink);
    // Raw passes even the most restrictive threshold.
    logger.set_level(LogLevel::Fatal);
    logger.start_worker();

    crate::raw!(logger, "--- banner ---\n");
    logger.stop_worker();

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], (LogLevel::Raw, String::from("--- banner ---\n")));
  }

  #[test]
  fn test_fatal_without_terminate_is_delivered() {
    let mut logger = Logger::new();
    logger.init(&options_with_queue(64 * 1024));
    let (sink, records) = VecSink::new();
    logger.register_sink(sink);
    logger.start_worker();

    crate::fatal!(logger, "giving up: {}\n", "disk full");
    logger.stop_worker();

    let records = records.lock().unwrap();
    assert_eq!(records[0], (LogLevel::Fatal, String::from("giving up: disk full\n")));
  }

  #[test]
  fn test_reference_mode_round_trip() {
    let mut logger = Logger::new();
    logger.init(&options_with_queue(64 * 1024));
    let (sink, records) = VecSink::new();
    logger.register_sink(sink);
    logger.start_worker();

    let payload = String::from("borrowed payload");
    crate::log_ref!(logger, LogLevel::Info, "ref: {}\n", payload);
    // The reference-mode contract: drain before the argument dies.
    logger.flush();
    logger.stop_worker();
    drop(payload);

    let records = records.lock().unwrap();
    assert_eq!(records[0].1, "ref: borrowed payload\n");
  }

  #[test]
  fn test_flush_then_counts_are_stable() {
    let mut logger = Logger::new();
    logger.init(&options_with_queue(1024 * 1024));
    logger.register_sink(NullSink::new());
    logger.start_worker();

    for _ in 0..100 {
      crate::trace!(logger, "t\n");
    }
    // Info threshold: trace never passed the gate.
    assert_eq!(logger.enqueued_count(), 0);

    logger.set_level(LogLevel::Trace);
    for _ in 0..100 {
      crate::trace!(logger, "t\n");
    }
    logger.flush();
    assert_eq!(logger.enqueued_count(), 100);
    logger.stop_worker();
  }

  #[test]
  fn test_flush_is_a_delivery_barrier() {
    let mut logger = Logger::new();
    logger.init(&options_with_queue(1024 * 1024));
    let (sink, records) = VecSink::new();
    logger.register_sink(sink);
    logger.start_worker();

    for i in 0..500 {
      crate::info!(logger, "barrier {}\n", i);
    }
    logger.flush();

    // Every record is at the sinks before flush returns, with the worker
    // still running.
    assert_eq!(records.lock().unwrap().len(), 500);
    logger.stop_worker();
  }

  #[test]
  fn test_set_level_str() {
    let mut logger = Logger::new();
    logger.set_level_str("debug");
    assert_eq!(logger.level(), LogLevel::Debug);
    logger.set_level_str("nonsense");
    assert_eq!(logger.level(), LogLevel::Debug);
  }

  #[test]
  fn test_clear_sinks_before_start() {
    let mut logger = Logger::new();
    logger.init(&options_with_queue(64 * 1024));
    let (sink, records) = VecSink::new();
    logger.register_sink(sink);
    logger.clear_sinks();
    logger.start_worker();

    crate::info!(logger, "nobody listens\n");
    logger.stop_worker();

    assert_eq!(logger.enqueued_count(), 1);
    assert!(records.lock().unwrap().is_empty());
  }
}
