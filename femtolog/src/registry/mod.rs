//! # String Registry
//!
//! Interns format strings (and, via `register_dynamic`, runtime strings)
//! behind 16-bit ids so records carry two bytes instead of the text itself.
//!
//! The table is a fixed array of 65 536 slots, one per possible `StringId`.
//! Each slot is written at most once (`OnceLock`), which gives the two
//! properties the consumer relies on:
//!
//! - a populated slot is never mutated, so a reader can hold the `&str`
//!   for as long as it holds the registry;
//! - registration races with lookups of *other* slots without any lock.
//!
//! An unpopulated slot reads as the empty string; callers must treat that as
//! "emit a placeholder", never as an error.


use std::sync::{Arc, OnceLock};

/// Identifier of an interned string. Zero is invalid and
/// [`LITERAL_LOG_STRING_ID`] is reserved.
pub type StringId = u16;

/// Sentinel format id meaning "the record payload IS the formatted message".
pub const LITERAL_LOG_STRING_ID: StringId = u16::MAX;

const STRING_TABLE_LEN: usize = u16::MAX as usize + 1;

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// FNV-1a over the string bytes, folded to 16 bits. Usable in const context
/// so the logging macros evaluate it at compile time.
pub const fn hash_string(s: &str) -> StringId {
  let bytes = s.as_bytes();
  let mut hash = FNV_OFFSET_BASIS;
  let mut i = 0;
  while i < bytes.len() {
    hash ^= bytes[i] as u64;
    hash = hash.wrapping_mul(FNV_PRIME);
    i += 1;
  }
  ((hash >> 16) ^ hash) as StringId
}

/// Id of a format literal: the folded hash with the two reserved values
/// remapped (`LITERAL_LOG_STRING_ID` to its predecessor, zero to one).
pub const fn format_id(s: &str) -> StringId {
  let id = hash_string(s);
  if id == LITERAL_LOG_STRING_ID {
    LITERAL_LOG_STRING_ID - 1
  } else if id == 0 {
    1
  } else {
    id
  }
}

/// Identity hash for runtime strings, derived from the storage address. Only
/// meaningful while the string keeps a stable address.
pub fn hash_pointer(ptr: *const u8) -> StringId {
  let raw = ptr as usize;
  let id = ((raw >> 3) ^ raw) as StringId;
  if id == LITERAL_LOG_STRING_ID {
    LITERAL_LOG_STRING_ID - 1
  } else if id == 0 {
    1
  } else {
    id
  }
}

enum RegisteredStr {
  /// Program-lifetime literal, stored as-is.
  Static(&'static str),
  /// Runtime string copied into shared storage at registration time.
  Owned(Arc<str>),
}

pub struct StringRegistry {
  slots: Box<[OnceLock<RegisteredStr>]>,
}

impl StringRegistry {
  pub fn new() -> Self {
    let mut slots = Vec::with_capacity(STRING_TABLE_LEN);
    slots.resize_with(STRING_TABLE_LEN, OnceLock::new);
    Self {
      slots: slots.into_boxed_slice(),
    }
  }

  /// Register a literal under `id`. Idempotent; the first registration wins
  /// and later ones (same id, any content) are no-ops.
  #[inline]
  pub fn register_static(&self, id: StringId, s: &'static str) {
    debug_assert_ne!(id, 0, "string id 0 is invalid");
    debug_assert_ne!(id, LITERAL_LOG_STRING_ID, "sentinel id cannot be registered");
    let _ = self.slots[id as usize].set(RegisteredStr::Static(s));
  }

  /// Register a runtime string under `id`, copying it into shared storage.
  /// The copied bytes stay valid until the registry is dropped. First
  /// registration wins.
  pub fn register_dynamic(&self, id: StringId, s: &str) {
    debug_assert_ne!(id, 0, "string id 0 is invalid");
    debug_assert_ne!(id, LITERAL_LOG_STRING_ID, "sentinel id cannot be registered");
    if self.slots[id as usize].get().is_some() {
      return;
    }
    let _ = self.slots[id as usize].set(RegisteredStr::Owned(Arc::from(s)));
  }

  /// Total over all ids; an unpopulated slot yields the empty string.
  #[inline]
  pub fn lookup(&self, id: StringId) -> &str {
    match self.slots[id as usize].get() {
      Some(RegisteredStr::Static(s)) => s,
      Some(RegisteredStr::Owned(s)) => s,
      None => "",
    }
  }

  pub fn is_registered(&self, id: StringId) -> bool {
    self.slots[id as usize].get().is_some()
  }
}

impl Default for StringRegistry {
  fn default() -> Self {
    Self::new()
  }
}
