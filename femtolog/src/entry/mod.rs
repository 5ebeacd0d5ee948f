//! # Log Entry Framing
//!
//! The fixed header every record carries through the ring, directly followed
//! by `content_len` payload bytes. Records are padded to the header's
//! 64-byte alignment so that peeking the first `LogEntry::SIZE` bytes from
//! the ring always yields a complete header.


use crate::level::LogLevel;
use std::ptr;

/// Hard ceiling for one record (header + payload) on the ring.
pub const MAX_ENTRY_SIZE: usize = 4096;

/// Maximum payload bytes a single record may carry.
pub const MAX_PAYLOAD_SIZE: usize = MAX_ENTRY_SIZE - LogEntry::SIZE;

/// Record header. Plain-old-data: every field is an integer, so reading one
/// back from arbitrary ring bytes is always defined. `level` stays a raw
/// byte on the wire and is decoded through [`LogLevel::from_u8`].
#[repr(C, align(64))]
#[derive(Debug, Clone, Copy)]
pub struct LogEntry {
  /// Producer identity; folded thread hash, never zero.
  pub thread_id: u32,
  /// Registry id of the format string, or [`LITERAL_LOG_STRING_ID`]
  /// (`crate::registry`) when the payload is the finished message.
  pub format_id: u16,
  pub level: u8,
  /// Total record size (header + payload), used for ring framing.
  pub payload_size: u16,
  /// Payload length only.
  pub content_len: u16,
  /// Filled by the backend worker at dequeue time, not the producer.
  pub timestamp_ns: u64,
}

const _: () = {
  assert!(std::mem::size_of::<LogEntry>() == 64);
  assert!(std::mem::align_of::<LogEntry>() == 64);
};

impl LogEntry {
  pub const SIZE: usize = std::mem::size_of::<LogEntry>();
  pub const ALIGN: usize = std::mem::align_of::<LogEntry>();

  #[inline]
  pub fn level(&self) -> LogLevel {
    LogLevel::from_u8(self.level)
  }

  /// Header + payload bytes.
  #[inline]
  pub fn total_size(&self) -> usize {
    self.payload_size as usize
  }

  /// Total size rounded up to the header alignment; this is the number of
  /// bytes the record occupies on the ring.
  #[inline]
  pub fn aligned_size(&self) -> usize {
    Self::align_up(self.payload_size as usize)
  }

  #[inline]
  pub const fn align_up(size: usize) -> usize {
    (size + Self::ALIGN - 1) & !(Self::ALIGN - 1)
  }

  /// Assemble a record into `buf`: header first, payload right behind it.
  /// Returns the aligned on-ring size. `buf` must hold at least that many
  /// bytes and `payload` must fit [`MAX_PAYLOAD_SIZE`]; both are enforced by
  /// the frontend before calling.
  pub fn write_into(
    buf: &mut [u8],
    thread_id: u32,
    format_id: u16,
    level: LogLevel,
    timestamp_ns: u64,
    payload: &[u8],
  ) -> usize {
    debug_assert!(payload.len() <= MAX_PAYLOAD_SIZE);
    debug_assert!(buf.len() >= Self::align_up(Self::SIZE + payload.len()));

    let header = LogEntry {
      thread_id,
      format_id,
      level: level as u8,
      payload_size: (Self::SIZE + payload.len()) as u16,
      content_len: payload.len() as u16,
      timestamp_ns,
    };

    // SAFETY: `buf` holds at least `SIZE` bytes (asserted above) and
    // `write_unaligned` has no alignment requirement on the destination.
    unsafe {
      ptr::write_unaligned(buf.as_mut_ptr() as *mut LogEntry, header);
    }
    buf[Self::SIZE..Self::SIZE + payload.len()].copy_from_slice(payload);

    header.aligned_size()
  }

  /// Read a header back out of a byte buffer.
  pub fn read_from(buf: &[u8]) -> LogEntry {
    debug_assert!(buf.len() >= Self::SIZE);
    // SAFETY: `LogEntry` is plain-old-data, so any 64 bytes form a valid
    // value; `read_unaligned` has no alignment requirement on the source.
    unsafe { ptr::read_unaligned(buf.as_ptr() as *const LogEntry) }
  }
}
