//! # Backend Worker
//!
//! The dedicated consumer thread. It peeks record headers off the ring,
//! dequeues whole records into a scratch buffer, stamps the wall-clock
//! timestamp, re-materializes arguments through the trampolines carried in
//! the payload, and fans the finished bytes out to every sink.
//!
//! When the ring is empty the worker backs off through monotonic tiers,
//! from a bare spin up to 10ms sleeps, so the common case runs hot while an
//! idle process does not burn a core. The tiers are tuning, not semantics;
//! nothing may depend on their exact durations.


use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::entry::LogEntry;
use crate::options::FemtologOptions;
use crate::registry::{StringRegistry, LITERAL_LOG_STRING_ID};
use crate::serialize::{SerializedArgsHeader, HEADER_SIZE};
use crate::sink::Sink;
use crate::spsc::{SpscQueue, SpscStatus};
use crate::utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendWorkerStatus {
  Uninitialized,
  Idling,
  Running,
}

/// Everything the worker thread owns while running. Kept in one struct so
/// `start` can move it into the thread and `stop` can move it back out,
/// which is what makes `register_sink` while idling borrow-check trivially.
struct WorkerCore {
  queue: Arc<SpscQueue>,
  registry: Arc<StringRegistry>,
  sinks: Vec<Box<dyn Sink>>,
  dequeue_buffer: Vec<u8>,
  format_buffer: String,
  idle_iterations: usize,
  /// Timestamps handed to sinks never regress, even if the wall clock does.
  last_timestamp_ns: u64,
  /// Bumped after a record has been handed to every sink; `flush` waits on
  /// it so "flushed" means delivered, not merely dequeued.
  processed: Arc<AtomicU64>,
  cpu_affinity: Option<usize>,
}

pub struct BackendWorker {
  core: Option<WorkerCore>,
  handle: Option<JoinHandle<WorkerCore>>,
  shutdown: Arc<AtomicBool>,
  processed: Arc<AtomicU64>,
  status: BackendWorkerStatus,
}

impl BackendWorker {
  pub fn new() -> Self {
    Self {
      core: None,
      handle: None,
      shutdown: Arc::new(AtomicBool::new(false)),
      processed: Arc::new(AtomicU64::new(0)),
      status: BackendWorkerStatus::Uninitialized,
    }
  }

  pub fn init(
    &mut self,
    queue: Arc<SpscQueue>,
    registry: Arc<StringRegistry>,
    options: &FemtologOptions,
  ) {
    debug_assert_eq!(self.status, BackendWorkerStatus::Uninitialized);

    // One maximum-size record must always fit the scratch.
    let dequeue_size = options
      .backend_dequeue_buffer_size
      .max(crate::entry::MAX_ENTRY_SIZE);

    self.core = Some(WorkerCore {
      queue,
      registry,
      sinks: Vec::new(),
      dequeue_buffer: vec![0; dequeue_size],
      format_buffer: String::with_capacity(options.backend_format_buffer_size),
      idle_iterations: 0,
      last_timestamp_ns: 0,
      processed: Arc::clone(&self.processed),
      cpu_affinity: options.backend_worker_cpu_affinity,
    });
    self.status = BackendWorkerStatus::Idling;
  }

  /// Only legal while idling; the worker thread must not be concurrently
  /// touching the sink list.
  pub fn register_sink(&mut self, sink: Box<dyn Sink>) {
    debug_assert_eq!(self.status, BackendWorkerStatus::Idling);
    if let Some(core) = self.core.as_mut() {
      core.sinks.push(sink);
    }
  }

  pub fn clear_sinks(&mut self) {
    debug_assert_eq!(self.status, BackendWorkerStatus::Idling);
    if let Some(core) = self.core.as_mut() {
      core.sinks.clear();
    }
  }

  pub fn sink_count(&self) -> usize {
    self.core.as_ref().map(|core| core.sinks.len()).unwrap_or(0)
  }

  pub fn start(&mut self) {
    debug_assert_eq!(self.status, BackendWorkerStatus::Idling);
    let Some(mut core) = self.core.take() else {
      return;
    };

    self.shutdown.store(false, Ordering::Relaxed);
    let shutdown = Arc::clone(&self.shutdown);

    let handle = thread::Builder::new()
      .name("femtolog-backend".into())
      .spawn(move || {
        core.run(&shutdown);
        core
      })
      .expect("failed to spawn femtolog backend worker thread");

    self.handle = Some(handle);
    self.status = BackendWorkerStatus::Running;
  }

  /// Signals shutdown, joins, and takes the worker state back. The worker
  /// drains the ring before exiting, so every record enqueued before this
  /// call has reached the sinks when it returns.
  pub fn stop(&mut self) {
    debug_assert_eq!(self.status, BackendWorkerStatus::Running);
    self.shutdown.store(true, Ordering::Release);

    if let Some(handle) = self.handle.take() {
      match handle.join() {
        Ok(core) => self.core = Some(core),
        Err(_) => eprintln!("[femtolog] backend worker thread panicked"),
      }
    }
    self.status = BackendWorkerStatus::Idling;
  }

  #[inline]
  pub fn status(&self) -> BackendWorkerStatus {
    self.status
  }

  /// Records delivered to the sinks so far.
  #[inline]
  pub fn processed_count(&self) -> u64 {
    self.processed.load(Ordering::Acquire)
  }
}

impl Drop for BackendWorker {
  fn drop(&mut self) {
    if self.status == BackendWorkerStatus::Running {
      self.stop();
    }
  }
}

impl Default for BackendWorker {
  fn default() -> Self {
    Self::new()
  }
}

impl WorkerCore {
  fn run(&mut self, shutdown: &AtomicBool) {
    self.set_cpu_affinity();

    loop {
      let processed = self.read_and_process_one();
      self.apply_polling_strategy(processed);
      if shutdown.load(Ordering::Acquire) {
        break;
      }
    }

    // Shutdown drain: records enqueued before the stop request are
    // delivered, never silently discarded.
    while self.read_and_process_one() {}

    for sink in &mut self.sinks {
      sink.flush();
    }
  }

  fn read_and_process_one(&mut self) -> bool {
    let mut header_bytes = [0u8; LogEntry::SIZE];
    if self.queue.peek_bytes(&mut header_bytes) != SpscStatus::Ok {
      return false;
    }

    let mut entry = LogEntry::read_from(&header_bytes);
    let framed_size = entry.aligned_size();
    if framed_size < LogEntry::SIZE || framed_size > self.dequeue_buffer.len() {
      // A corrupt header would wedge the ring; skip what it claims.
      let skip = framed_size.clamp(LogEntry::SIZE, self.dequeue_buffer.len());
      let _ = self.queue.dequeue_bytes(&mut self.dequeue_buffer[..skip]);
      self.processed.fetch_add(1, Ordering::Release);
      return true;
    }
    if self.queue.size() < framed_size {
      // The producer has published the header but not yet the full record.
      return false;
    }
    if self.queue.dequeue_bytes(&mut self.dequeue_buffer[..framed_size]) != SpscStatus::Ok {
      return false;
    }

    self.last_timestamp_ns = self.last_timestamp_ns.max(utils::timestamp_ns());
    entry.timestamp_ns = self.last_timestamp_ns;
    self.process_entry(&entry);
    self.processed.fetch_add(1, Ordering::Release);
    true
  }

  fn process_entry(&mut self, entry: &LogEntry) {
    let content_len = entry.content_len as usize;
    let payload = &self.dequeue_buffer[LogEntry::SIZE..LogEntry::SIZE + content_len];

    if entry.format_id == LITERAL_LOG_STRING_ID {
      // The payload already is the finished message.
      for sink in &mut self.sinks {
        sink.on_log(entry, payload);
      }
      return;
    }

    if content_len < HEADER_SIZE {
      // Malformed serialized record; emit the registered template (or the
      // empty-slot placeholder) instead of crashing.
      let template = self.registry.lookup(entry.format_id);
      for sink in &mut self.sinks {
        sink.on_log(entry, template.as_bytes());
      }
      return;
    }

    let header = SerializedArgsHeader::read_from(payload);
    self.format_buffer.clear();
    let written = (header.deserialize_fn)(
      &mut self.format_buffer,
      header.format_fn,
      &payload[HEADER_SIZE..],
    );

    let content = &self.format_buffer.as_bytes()[..written];
    for sink in &mut self.sinks {
      sink.on_log(entry, content);
    }
  }

  fn apply_polling_strategy(&mut self, processed: bool) {
    if processed {
      self.idle_iterations = 0;
      return;
    }

    self.idle_iterations += 1;
    match self.idle_iterations {
      0..=2048 => std::hint::spin_loop(),
      2049..=4096 => thread::sleep(Duration::from_micros(1)),
      4097..=8192 => thread::sleep(Duration::from_micros(10)),
      8193..=16384 => thread::sleep(Duration::from_micros(100)),
      16385..=32768 => thread::sleep(Duration::from_millis(1)),
      _ => thread::sleep(Duration::from_millis(10)),
    }
  }

  #[cfg(target_os = "linux")]
  fn set_cpu_affinity(&self) {
    let Some(core_id) = self.cpu_affinity else {
      return;
    };

    // SAFETY: cpu_set_t is plain data; zeroing is its documented empty
    // state and CPU_SET only touches the set.
    unsafe {
      let mut set: libc::cpu_set_t = std::mem::zeroed();
      libc::CPU_ZERO(&mut set);
      libc::CPU_SET(core_id, &mut set);
      let rc = libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set);
      if rc != 0 {
        eprintln!("[femtolog] failed to pin backend worker to core {core_id}");
      }
    }
  }

  #[cfg(not(target_os = "linux"))]
  fn set_cpu_affinity(&self) {
    if let Some(core_id) = self.cpu_affinity {
      eprintln!("[femtolog] cpu affinity (core {core_id}) is not supported on this platform");
    }
  }
}
