use std::cell::Cell;
use std::io::IsTerminal;

/// Hashed identity of the calling thread, folded to 32 bits and forced
/// non-zero so that zero can mean "no producer" in record headers.
pub fn current_thread_id_u32() -> u32 {
  thread_local! {
    static CACHED: Cell<u32> = const { Cell::new(0) };
  }

  CACHED.with(|cell| {
    let cached = cell.get();
    if cached != 0 {
      return cached;
    }

    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    let id = (hasher.finish() as u32) | 1;
    cell.set(id);
    id
  })
}

/// Wall-clock nanoseconds since the Unix epoch.
#[inline]
pub fn timestamp_ns() -> u64 {
  use std::time::{SystemTime, UNIX_EPOCH};
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_nanos() as u64)
    .unwrap_or(0)
}

/// Whether stdout is attached to a terminal that can render ANSI sequences.
pub fn stdout_is_terminal() -> bool {
  std::io::stdout().is_terminal()
}
