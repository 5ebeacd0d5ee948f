//! Configuration for the frontend logger and its backend worker.

mod __test__;

use serde::{Deserialize, Serialize};

/// When sinks should emit ANSI color sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
  /// Detect whether the output is a terminal.
  Auto,
  Always,
  Never,
}

/// Tuning knobs for one logger instance.
///
/// The defaults produce a working system on any 64-bit host. `fast()` trades
/// memory for throughput, `memory_saving()` does the opposite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FemtologOptions {
  /// Byte capacity of the SPSC ring between frontend and worker. Rounded up
  /// to a power of two at init.
  pub spsc_queue_size: usize,

  /// Initial capacity of the worker's formatting scratch buffer.
  pub backend_format_buffer_size: usize,

  /// Size of the worker's record scratch. Clamped up to the maximum record
  /// size at init so any single record always fits.
  pub backend_dequeue_buffer_size: usize,

  /// Core to pin the worker thread to; `None` disables pinning.
  pub backend_worker_cpu_affinity: Option<usize>,

  /// Color policy handed to sinks that render for terminals.
  pub color_mode: ColorMode,

  /// Terminate the process after a `Fatal` record has been enqueued and the
  /// worker has drained it to the sinks.
  pub terminate_on_fatal: bool,
}

impl Default for FemtologOptions {
  fn default() -> Self {
    Self {
      spsc_queue_size: 1024 * 8,
      backend_format_buffer_size: 1024 * 2,
      backend_dequeue_buffer_size: 1024 * 4,
      backend_worker_cpu_affinity: None,
      color_mode: ColorMode::Auto,
      terminate_on_fatal: true,
    }
  }
}

impl FemtologOptions {
  /// Large buffers and a pinned worker for throughput-sensitive processes.
  pub fn fast() -> Self {
    Self {
      spsc_queue_size: 1024 * 1024 * 4,
      backend_format_buffer_size: 1024 * 64,
      backend_dequeue_buffer_size: 1024 * 64,
      backend_worker_cpu_affinity: Some(5),
      color_mode: ColorMode::Auto,
      terminate_on_fatal: true,
    }
  }

  /// Minimal footprint; the dequeue buffer still has to hold one maximum
  /// size record.
  pub fn memory_saving() -> Self {
    Self {
      spsc_queue_size: 1024 * 4,
      backend_format_buffer_size: 256,
      backend_dequeue_buffer_size: 1024 * 4,
      backend_worker_cpu_affinity: None,
      color_mode: ColorMode::Auto,
      terminate_on_fatal: true,
    }
  }
}
