//! # Logger Facade
//!
//! The public handle users hold. One `Logger` owns one ring and one backend
//! worker; the owning thread is the single producer. Share nothing: a
//! thread that wants to log owns its own `Logger` (or you route everything
//! through one thread).
//!
//! ```no_run
//! use femtolog::{FemtologOptions, Logger};
//! use femtolog::stdout_sink::StdoutSink;
//! use femtolog::options::ColorMode;
//!
//! let mut logger = Logger::new();
//! logger.init(&FemtologOptions::default());
//! logger.register_sink(StdoutSink::new(ColorMode::Auto));
//! logger.start_worker();
//!
//! femtolog::info!(logger, "listening on port {}\n", 8080u16);
//! femtolog::warn!(logger, "queue depth {} exceeds {}\n", 130usize, 128usize);
//!
//! logger.flush();
//! logger.stop_worker();
//! ```

mod __test__;

use crate::backend::BackendWorkerStatus;
use crate::frontend::FrontendLogger;
use crate::level::LogLevel;
use crate::options::FemtologOptions;
use crate::sink::Sink;

pub struct Logger {
  frontend: FrontendLogger,
}

impl Logger {
  pub fn new() -> Self {
    Self {
      frontend: FrontendLogger::new(),
    }
  }

  /// Allocate the ring and configure the worker. The worker is not spawned
  /// until `start_worker`.
  pub fn init(&mut self, options: &FemtologOptions) {
    self.frontend.init(options);
  }

  /// Only legal while the worker is not running.
  pub fn register_sink(&mut self, sink: impl Sink + 'static) {
    self.frontend.register_sink(Box::new(sink));
  }

  pub fn clear_sinks(&mut self) {
    self.frontend.clear_sinks();
  }

  pub fn start_worker(&mut self) {
    self.frontend.start_worker();
  }

  /// Stops the worker after it drains the ring; every record enqueued
  /// before this call has reached the sinks when it returns.
  pub fn stop_worker(&mut self) {
    self.frontend.stop_worker();
  }

  /// Busy-waits until every enqueued record has been delivered to the
  /// sinks.
  pub fn flush(&self) {
    self.frontend.flush();
  }

  pub fn is_running(&self) -> bool {
    self.frontend.is_running()
  }

  pub fn worker_status(&self) -> BackendWorkerStatus {
    self.frontend.worker_status()
  }

  #[inline]
  pub fn level(&self) -> LogLevel {
    self.frontend.level()
  }

  pub fn set_level(&mut self, level: LogLevel) {
    self.frontend.set_level(level);
  }

  /// Accepts the lowercase level names; unknown names leave the threshold
  /// unchanged.
  pub fn set_level_str(&mut self, level: &str) {
    if let Some(level) = LogLevel::from_str(level) {
      self.set_level(level);
    }
  }

  pub fn enqueued_count(&self) -> u64 {
    self.frontend.enqueued_count()
  }

  pub fn dropped_count(&self) -> u64 {
    self.frontend.dropped_count()
  }

  pub fn reset_counts(&mut self) {
    self.frontend.reset_counts();
  }

  /// Macro plumbing; not part of the public surface.
  #[doc(hidden)]
  #[inline]
  pub fn __frontend(&mut self) -> &mut FrontendLogger {
    &mut self.frontend
  }
}

impl Default for Logger {
  fn default() -> Self {
    Self::new()
  }
}
