//! # SPSC Byte Queue
//!
//! Wait-free single-producer / single-consumer byte ring with bounded
//! memory. Capacity is rounded up to a power of two so positions reduce to
//! a mask, and the two monotonic counters live on separate cache lines next
//! to a local snapshot of the opposite counter: the fast path runs entirely
//! on one line and only refreshes the snapshot (one acquire load) when it
//! reports insufficient space or data.
//!
//! Role split: exactly one thread may call the enqueue methods and exactly
//! one thread the dequeue/peek methods. Size queries use the shared atomics
//! and are callable from anywhere.

mod __test__;

use std::alloc::{alloc, dealloc, Layout};
use std::cell::UnsafeCell;
use std::ptr;
use std::sync::atomic::{fence, AtomicUsize, Ordering};

/// Alignment of the backing buffer and of each counter line.
pub const CACHE_LINE_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpscStatus {
  Ok,
  Uninitialized,
  Underflow,
  Overflow,
  SizeIsZero,
}

/// Producer-owned line: the write counter plus a stale copy of `head`.
#[repr(align(64))]
struct ProducerSide {
  tail: AtomicUsize,
  head_snapshot: UnsafeCell<usize>,
}

/// Consumer-owned line: the read counter plus a stale copy of `tail`.
#[repr(align(64))]
struct ConsumerSide {
  head: AtomicUsize,
  tail_snapshot: UnsafeCell<usize>,
}

pub struct SpscQueue {
  buffer: *mut u8,
  capacity: usize,
  mask: usize,
  producer: ProducerSide,
  consumer: ConsumerSide,
}

// SAFETY: the queue is shared across the producer and consumer threads.
// All cross-thread traffic goes through `tail`/`head`; each snapshot cell
// is touched only by its owning side (enqueue methods for the producer,
// dequeue/peek for the consumer), which the API contract restricts to one
// thread each.
unsafe impl Send for SpscQueue {}
unsafe impl Sync for SpscQueue {}

impl SpscQueue {
  /// An unreserved queue; every operation returns `Uninitialized` until
  /// `reserve` is called.
  pub fn new() -> Self {
    Self {
      buffer: ptr::null_mut(),
      capacity: 0,
      mask: 0,
      producer: ProducerSide {
        tail: AtomicUsize::new(0),
        head_snapshot: UnsafeCell::new(0),
      },
      consumer: ConsumerSide {
        head: AtomicUsize::new(0),
        tail_snapshot: UnsafeCell::new(0),
      },
    }
  }

  pub fn with_capacity(capacity_bytes: usize) -> Self {
    let mut queue = Self::new();
    queue.reserve(capacity_bytes);
    queue
  }

  /// Allocate (or reallocate) the backing buffer with at least
  /// `capacity_bytes` bytes, rounded up to a power of two, and reset both
  /// counters. Requires exclusive access, so it cannot race with either
  /// side.
  pub fn reserve(&mut self, capacity_bytes: usize) {
    assert!(capacity_bytes > 0, "queue capacity must be non-zero");

    let capacity = capacity_bytes.next_power_of_two().max(2);
    let layout = Layout::from_size_align(capacity, CACHE_LINE_SIZE)
      .expect("queue capacity overflows a valid allocation layout");

    self.release_buffer();

    // SAFETY: `layout` has non-zero size.
    let new_buffer = unsafe { alloc(layout) };
    if new_buffer.is_null() {
      self.buffer = ptr::null_mut();
      self.capacity = 0;
      self.mask = 0;
    } else {
      self.buffer = new_buffer;
      self.capacity = capacity;
      self.mask = capacity - 1;
    }

    self.producer.tail.store(0, Ordering::Relaxed);
    self.consumer.head.store(0, Ordering::Relaxed);
    *self.producer.head_snapshot.get_mut() = 0;
    *self.consumer.tail_snapshot.get_mut() = 0;
  }

  /// Producer-only. Copies `data` in as one atomic step: either the whole
  /// record is published or nothing is.
  pub fn enqueue_bytes(&self, data: &[u8]) -> SpscStatus {
    if self.buffer.is_null() {
      return SpscStatus::Uninitialized;
    }
    if data.is_empty() {
      return SpscStatus::SizeIsZero;
    }

    let tail = self.producer.tail.load(Ordering::Relaxed);

    // SAFETY: only the producer thread reaches this cell (struct contract).
    let head_snapshot = unsafe { &mut *self.producer.head_snapshot.get() };
    let mut head = *head_snapshot;
    if self.capacity - (tail - head) < data.len() {
      head = self.consumer.head.load(Ordering::Acquire);
      *head_snapshot = head;
      if self.capacity - (tail - head) < data.len() {
        return SpscStatus::Overflow;
      }
    }

    // SAFETY: the region `[tail, tail + len)` is unused: the consumer never
    // reads past `tail` and the capacity check above guarantees no
    // wrap-around collision with unread bytes.
    unsafe {
      self.copy_in(tail, data);
    }

    fence(Ordering::Release);
    self.producer.tail.store(tail + data.len(), Ordering::Relaxed);
    SpscStatus::Ok
  }

  /// Producer-only bulk variant; transfers every chunk or none (capacity is
  /// checked up front across the whole batch).
  pub fn enqueue_bulk(&self, chunks: &[&[u8]]) -> SpscStatus {
    if self.buffer.is_null() {
      return SpscStatus::Uninitialized;
    }
    let total: usize = chunks.iter().map(|chunk| chunk.len()).sum();
    if total == 0 {
      return SpscStatus::SizeIsZero;
    }

    let tail = self.producer.tail.load(Ordering::Relaxed);

    // SAFETY: producer-only cell, as above.
    let head_snapshot = unsafe { &mut *self.producer.head_snapshot.get() };
    let mut head = *head_snapshot;
    if self.capacity - (tail - head) < total {
      head = self.consumer.head.load(Ordering::Acquire);
      *head_snapshot = head;
      if self.capacity - (tail - head) < total {
        return SpscStatus::Overflow;
      }
    }

    let mut position = tail;
    for chunk in chunks {
      // SAFETY: the whole batch fits, per the check above.
      unsafe {
        self.copy_in(position, chunk);
      }
      position += chunk.len();
    }

    fence(Ordering::Release);
    self.producer.tail.store(tail + total, Ordering::Relaxed);
    SpscStatus::Ok
  }

  /// Consumer-only. Copies exactly `out.len()` bytes out and advances the
  /// read counter.
  pub fn dequeue_bytes(&self, out: &mut [u8]) -> SpscStatus {
    if self.buffer.is_null() {
      return SpscStatus::Uninitialized;
    }
    if out.is_empty() {
      return SpscStatus::SizeIsZero;
    }

    let head = self.consumer.head.load(Ordering::Relaxed);

    // SAFETY: only the consumer thread reaches this cell (struct contract).
    let tail_snapshot = unsafe { &mut *self.consumer.tail_snapshot.get() };
    let mut tail = *tail_snapshot;
    if tail - head < out.len() {
      tail = self.producer.tail.load(Ordering::Acquire);
      *tail_snapshot = tail;
      if tail - head < out.len() {
        return SpscStatus::Underflow;
      }
    }

    // SAFETY: `[head, head + len)` was published by the producer (acquire
    // load above pairs with its release fence).
    unsafe {
      self.copy_out(head, out);
    }

    fence(Ordering::Release);
    self.consumer.head.store(head + out.len(), Ordering::Relaxed);
    SpscStatus::Ok
  }

  /// Consumer-only bulk variant; all-or-none like `enqueue_bulk`.
  pub fn dequeue_bulk(&self, chunks: &mut [&mut [u8]]) -> SpscStatus {
    if self.buffer.is_null() {
      return SpscStatus::Uninitialized;
    }
    let total: usize = chunks.iter().map(|chunk| chunk.len()).sum();
    if total == 0 {
      return SpscStatus::SizeIsZero;
    }

    let head = self.consumer.head.load(Ordering::Relaxed);

    // SAFETY: consumer-only cell, as above.
    let tail_snapshot = unsafe { &mut *self.consumer.tail_snapshot.get() };
    let mut tail = *tail_snapshot;
    if tail - head < total {
      tail = self.producer.tail.load(Ordering::Acquire);
      *tail_snapshot = tail;
      if tail - head < total {
        return SpscStatus::Underflow;
      }
    }

    let mut position = head;
    for chunk in chunks.iter_mut() {
      // SAFETY: the whole batch is available, per the check above.
      unsafe {
        self.copy_out(position, chunk);
      }
      position += chunk.len();
    }

    fence(Ordering::Release);
    self.consumer.head.store(head + total, Ordering::Relaxed);
    SpscStatus::Ok
  }

  /// Consumer-only. Copies bytes out without advancing the read counter;
  /// the backend uses this to read a record header and learn the record's
  /// framed size before committing to the full dequeue.
  pub fn peek_bytes(&self, out: &mut [u8]) -> SpscStatus {
    if self.buffer.is_null() {
      return SpscStatus::Uninitialized;
    }
    if out.is_empty() {
      return SpscStatus::SizeIsZero;
    }

    let head = self.consumer.head.load(Ordering::Relaxed);
    let tail = self.producer.tail.load(Ordering::Acquire);
    if tail - head < out.len() {
      return SpscStatus::Underflow;
    }

    // SAFETY: as in `dequeue_bytes`; the counter is simply not advanced.
    unsafe {
      self.copy_out(head, out);
    }
    SpscStatus::Ok
  }

  /// Bytes currently queued. Uses the shared atomics, so any thread may
  /// call it; the answer is naturally a snapshot.
  #[inline]
  pub fn size(&self) -> usize {
    let head = self.consumer.head.load(Ordering::Acquire);
    let tail = self.producer.tail.load(Ordering::Acquire);
    tail.wrapping_sub(head)
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.size() == 0
  }

  #[inline]
  pub fn capacity(&self) -> usize {
    self.capacity
  }

  #[inline]
  pub fn available_space(&self) -> usize {
    self.capacity - self.size()
  }

  /// Copy `data` into the ring at logical position `position`, splitting at
  /// the wrap point when needed.
  ///
  /// # Safety
  ///
  /// The caller must have verified that `data.len()` bytes starting at
  /// `position` are free, and `self.buffer` must be non-null.
  unsafe fn copy_in(&self, position: usize, data: &[u8]) {
    let offset = position & self.mask;
    let to_end = self.capacity - offset;
    unsafe {
      if data.len() <= to_end {
        ptr::copy_nonoverlapping(data.as_ptr(), self.buffer.add(offset), data.len());
      } else {
        ptr::copy_nonoverlapping(data.as_ptr(), self.buffer.add(offset), to_end);
        ptr::copy_nonoverlapping(data.as_ptr().add(to_end), self.buffer, data.len() - to_end);
      }
    }
  }

  /// Copy `out.len()` bytes at logical position `position` out of the ring.
  ///
  /// # Safety
  ///
  /// The caller must have verified that the bytes are published, and
  /// `self.buffer` must be non-null.
  unsafe fn copy_out(&self, position: usize, out: &mut [u8]) {
    let offset = position & self.mask;
    let to_end = self.capacity - offset;
    unsafe {
      if out.len() <= to_end {
        ptr::copy_nonoverlapping(self.buffer.add(offset), out.as_mut_ptr(), out.len());
      } else {
        ptr::copy_nonoverlapping(self.buffer.add(offset), out.as_mut_ptr(), to_end);
        ptr::copy_nonoverlapping(self.buffer, out.as_mut_ptr().add(to_end), out.len() - to_end);
      }
    }
  }

  fn release_buffer(&mut self) {
    if self.buffer.is_null() {
      return;
    }
    let layout = Layout::from_size_align(self.capacity, CACHE_LINE_SIZE)
      .expect("layout of an existing allocation is always valid");
    // SAFETY: `buffer` was allocated with exactly this layout in `reserve`.
    unsafe {
      dealloc(self.buffer, layout);
    }
    self.buffer = ptr::null_mut();
  }
}

impl Drop for SpscQueue {
  fn drop(&mut self) {
    self.release_buffer();
  }
}

impl Default for SpscQueue {
  fn default() -> Self {
    Self::new()
  }
}
