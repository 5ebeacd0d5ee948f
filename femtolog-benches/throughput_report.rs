use std::time::Instant;

use rand::Rng;
use tabled::{Table, Tabled};

use femtolog::null_sink::NullSink;
use femtolog::options::FemtologOptions;
use femtolog::spsc::{SpscQueue, SpscStatus};
use femtolog::Logger;

#[derive(Debug, Clone, Tabled)]
struct ReportRow {
  #[tabled(rename = "Scenario")]
  scenario: String,
  #[tabled(rename = "Operations")]
  operations: u64,
  #[tabled(rename = "Throughput (ops/sec)")]
  throughput: String,
  #[tabled(rename = "Mean latency (ns)")]
  mean_latency_ns: String,
}

fn row(scenario: &str, operations: u64, elapsed_secs: f64) -> ReportRow {
  ReportRow {
    scenario: scenario.to_string(),
    operations,
    throughput: format!("{:.0}", operations as f64 / elapsed_secs),
    mean_latency_ns: format!("{:.1}", elapsed_secs * 1e9 / operations as f64),
  }
}

fn spsc_round_trips() -> ReportRow {
  let queue = SpscQueue::with_capacity(1024 * 1024);
  let record = [0xa5u8; 128];
  let mut out = [0u8; 128];

  let operations = 1_000_000u64;
  let start = Instant::now();
  for _ in 0..operations {
    assert_eq!(queue.enqueue_bytes(&record), SpscStatus::Ok);
    assert_eq!(queue.dequeue_bytes(&mut out), SpscStatus::Ok);
  }
  row("spsc 128B enqueue+dequeue", operations, start.elapsed().as_secs_f64())
}

fn literal_logging() -> ReportRow {
  let mut logger = Logger::new();
  logger.init(&FemtologOptions::fast());
  logger.register_sink(NullSink::new());
  logger.start_worker();

  let operations = 1_000_000u64;
  let start = Instant::now();
  for _ in 0..operations {
    femtolog::info!(logger, "literal throughput record\n");
  }
  logger.flush();
  let elapsed = start.elapsed().as_secs_f64();
  logger.stop_worker();

  println!(
    "  literal: enqueued={} dropped={}",
    logger.enqueued_count(),
    logger.dropped_count()
  );
  row("literal log -> null sink", operations, elapsed)
}

fn formatted_logging() -> ReportRow {
  let mut logger = Logger::new();
  logger.init(&FemtologOptions::fast());
  logger.register_sink(NullSink::new());
  logger.start_worker();

  let mut rng = rand::rng();
  let ids: Vec<u64> = (0..1024).map(|_| rng.random()).collect();

  let operations = 1_000_000u64;
  let start = Instant::now();
  for i in 0..operations {
    let id = ids[(i & 1023) as usize];
    femtolog::info!(logger, "request id={} latency={}ms\n", id, 2.5f64);
  }
  logger.flush();
  let elapsed = start.elapsed().as_secs_f64();
  logger.stop_worker();

  println!(
    "  formatted: enqueued={} dropped={}",
    logger.enqueued_count(),
    logger.dropped_count()
  );
  row("formatted log -> null sink", operations, elapsed)
}

fn main() {
  println!("femtolog throughput report");
  println!("==========================");
  println!();

  let rows = vec![spsc_round_trips(), literal_logging(), formatted_logging()];

  println!();
  println!("{}", Table::new(rows));
}
