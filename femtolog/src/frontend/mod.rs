//! # Frontend Logger
//!
//! Producer-side state and the hot path: level gate (done in the macros),
//! worker-running check, serialization into a stack-resident staging
//! buffer, record assembly, and the single ring enqueue. Everything here is
//! allocation-free after `init`.
//!
//! Loss is never reported synchronously: a record that cannot be shipped
//! (staging overflow, oversized payload, full ring) bumps `dropped_count`
//! and the call returns. Calls made while the worker is not running are
//! dropped without counting; the counters only describe the running system.


use std::sync::Arc;

use crate::backend::{BackendWorker, BackendWorkerStatus};
use crate::entry::{LogEntry, MAX_ENTRY_SIZE, MAX_PAYLOAD_SIZE};
use crate::format::FormatFn;
use crate::level::LogLevel;
use crate::options::FemtologOptions;
use crate::registry::{StringId, StringRegistry, LITERAL_LOG_STRING_ID};
use crate::serialize::{DefaultSerializer, SerializeArgs};
use crate::sink::Sink;
use crate::spsc::{SpscQueue, SpscStatus};
use crate::utils;

pub struct FrontendLogger {
  level: LogLevel,
  thread_id: u32,
  enqueued_count: u64,
  dropped_count: u64,
  terminate_on_fatal: bool,
  serializer: DefaultSerializer,
  entry_buffer: Box<[u8; MAX_ENTRY_SIZE]>,
  queue: Option<Arc<SpscQueue>>,
  registry: Arc<StringRegistry>,
  worker: BackendWorker,
}

impl FrontendLogger {
  pub fn new() -> Self {
    Self {
      level: LogLevel::Info,
      thread_id: utils::current_thread_id_u32(),
      enqueued_count: 0,
      dropped_count: 0,
      terminate_on_fatal: true,
      serializer: DefaultSerializer::new(),
      entry_buffer: Box::new([0; MAX_ENTRY_SIZE]),
      queue: None,
      registry: Arc::new(StringRegistry::new()),
      worker: BackendWorker::new(),
    }
  }

  /// Allocates the ring and configures (but does not spawn) the worker.
  pub fn init(&mut self, options: &FemtologOptions) {
    debug_assert!(self.queue.is_none(), "logger initialized twice");
    debug_assert!(options.spsc_queue_size > 0);

    let queue = Arc::new(SpscQueue::with_capacity(options.spsc_queue_size));
    self.worker
      .init(Arc::clone(&queue), Arc::clone(&self.registry), options);
    self.queue = Some(queue);
    self.terminate_on_fatal = options.terminate_on_fatal;
  }

  pub fn register_sink(&mut self, sink: Box<dyn Sink>) {
    self.worker.register_sink(sink);
  }

  pub fn clear_sinks(&mut self) {
    self.worker.clear_sinks();
  }

  pub fn start_worker(&mut self) {
    self.worker.start();
  }

  pub fn stop_worker(&mut self) {
    self.worker.stop();
  }

  #[inline]
  pub fn is_running(&self) -> bool {
    self.worker.status() == BackendWorkerStatus::Running
  }

  pub fn worker_status(&self) -> BackendWorkerStatus {
    self.worker.status()
  }

  #[inline]
  pub fn level(&self) -> LogLevel {
    self.level
  }

  pub fn set_level(&mut self, level: LogLevel) {
    self.level = level;
  }

  #[inline]
  pub fn thread_id(&self) -> u32 {
    self.thread_id
  }

  #[inline]
  pub fn enqueued_count(&self) -> u64 {
    self.enqueued_count
  }

  #[inline]
  pub fn dropped_count(&self) -> u64 {
    self.dropped_count
  }

  pub fn reset_counts(&mut self) {
    self.enqueued_count = 0;
    self.dropped_count = 0;
  }

  /// Busy-waits until every enqueued record has been delivered to the
  /// sinks, not merely dequeued. This is the barrier reference-mode callers
  /// rely on before invalidating argument memory. Returns immediately when
  /// the worker is not running (nothing would ever drain).
  pub fn flush(&self) {
    if !self.is_running() {
      return;
    }
    let Some(queue) = self.queue.as_ref() else {
      return;
    };

    let mut spins = 0usize;
    while !queue.is_empty() || self.worker.processed_count() < self.enqueued_count {
      spins += 1;
      if spins <= 4096 {
        std::hint::spin_loop();
      } else {
        std::thread::sleep(std::time::Duration::from_micros(10));
      }
    }
  }

  /// Zero-argument fast path: the literal itself is the payload and no
  /// serialization happens.
  #[doc(hidden)]
  pub fn log_literal(&mut self, level: LogLevel, message: &str) {
    if !self.is_running() {
      return;
    }
    if message.len() >= MAX_PAYLOAD_SIZE {
      self.dropped_count += 1;
      return;
    }

    let framed = LogEntry::write_into(
      self.entry_buffer.as_mut_slice(),
      self.thread_id,
      LITERAL_LOG_STRING_ID,
      level,
      0,
      message.as_bytes(),
    );
    self.enqueue_record(framed);
    self.after_enqueue(level);
  }

  /// Formatted path: serialize the argument tuple behind the trampoline
  /// header and ship the packed bytes.
  #[doc(hidden)]
  pub fn log_serialized<T: SerializeArgs>(
    &mut self,
    level: LogLevel,
    format_id: StringId,
    template: &'static str,
    format_fn: FormatFn,
    reference_mode: bool,
    args: &T,
  ) {
    if !self.is_running() {
      return;
    }

    self.registry.register_static(format_id, template);

    let serialized = if reference_mode {
      self.serializer.serialize_ref(format_fn, args)
    } else {
      self.serializer.serialize_copy(format_fn, args)
    };
    let Some(serialized) = serialized else {
      self.dropped_count += 1;
      return;
    };
    if serialized.len() >= MAX_PAYLOAD_SIZE {
      self.dropped_count += 1;
      return;
    }

    let framed = LogEntry::write_into(
      self.entry_buffer.as_mut_slice(),
      self.thread_id,
      format_id,
      level,
      0,
      serialized.data(),
    );
    self.enqueue_record(framed);
    self.after_enqueue(level);
  }

  fn enqueue_record(&mut self, framed_size: usize) {
    let Some(queue) = self.queue.as_ref() else {
      self.dropped_count += 1;
      return;
    };

    match queue.enqueue_bytes(&self.entry_buffer[..framed_size]) {
      SpscStatus::Ok => self.enqueued_count += 1,
      _ => self.dropped_count += 1,
    }
  }

  /// Fatal records terminate the process, but only after the worker has
  /// drained the ring, so the message reaches the sinks first.
  fn after_enqueue(&mut self, level: LogLevel) {
    if level == LogLevel::Fatal && self.terminate_on_fatal {
      self.stop_worker();
      std::process::abort();
    }
  }
}

impl Default for FrontendLogger {
  fn default() -> Self {
    Self::new()
  }
}

impl Drop for FrontendLogger {
  fn drop(&mut self) {
    if self.is_running() {
      self.stop_worker();
    }
  }
}
