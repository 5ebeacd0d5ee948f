use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::time::Duration;

use femtolog::entry::LogEntry;
use femtolog::format::{format_into, FormatFn};
use femtolog::level::LogLevel;
use femtolog::null_sink::NullSink;
use femtolog::options::FemtologOptions;
use femtolog::serialize::DefaultSerializer;
use femtolog::spsc::{SpscQueue, SpscStatus};
use femtolog::Logger;

// Configure Criterion for reliable benchmarks
fn configure_criterion() -> Criterion {
  Criterion::default()
    .sample_size(50)
    .measurement_time(Duration::from_secs(5))
    .warm_up_time(Duration::from_secs(2))
}

fn bench_spsc_queue(c: &mut Criterion) {
  let queue = SpscQueue::with_capacity(1024 * 1024);
  let record = [7u8; 128];
  let mut out = [0u8; 128];

  c.bench_function("spsc_enqueue_dequeue_128b", |b| {
    b.iter(|| {
      assert_eq!(queue.enqueue_bytes(black_box(&record)), SpscStatus::Ok);
      assert_eq!(queue.dequeue_bytes(black_box(&mut out)), SpscStatus::Ok);
    })
  });
}

fn bench_serializer(c: &mut Criterion) {
  let format_fn: FormatFn = |out, args| format_into(out, "x={}, y={}, z={}\n", args);
  let mut serializer = DefaultSerializer::new();

  c.bench_function("serialize_three_args", |b| {
    b.iter(|| {
      let args = (black_box(42u64), black_box("ab"), black_box(1.5f64));
      let serialized = serializer.serialize_copy(format_fn, &args).unwrap();
      black_box(serialized.len());
    })
  });
}

fn bench_entry_framing(c: &mut Criterion) {
  let mut buf = [0u8; femtolog::entry::MAX_ENTRY_SIZE];

  c.bench_function("entry_write_and_read_header", |b| {
    b.iter(|| {
      let framed = LogEntry::write_into(
        &mut buf,
        black_box(0x1234),
        black_box(77),
        LogLevel::Info,
        0,
        black_box(b"payload bytes"),
      );
      let entry = LogEntry::read_from(&buf);
      black_box((framed, entry.content_len));
    })
  });
}

fn bench_end_to_end_null_sink(c: &mut Criterion) {
  let mut logger = Logger::new();
  logger.init(&FemtologOptions {
    spsc_queue_size: 4 * 1024 * 1024,
    ..FemtologOptions::default()
  });
  logger.register_sink(NullSink::new());
  logger.start_worker();

  c.bench_function("log_literal_null_sink", |b| {
    b.iter(|| {
      femtolog::info!(logger, "benchmark literal record\n");
    })
  });

  c.bench_function("log_formatted_null_sink", |b| {
    b.iter(|| {
      femtolog::info!(logger, "id={} value={}\n", 42u64, 1.25f64);
    })
  });

  logger.stop_worker();
}

criterion_group! {
  name = benches;
  config = configure_criterion();
  targets = bench_spsc_queue, bench_serializer, bench_entry_framing, bench_end_to_end_null_sink
}
criterion_main!(benches);
