//! Call-site macros. Each expansion binds the format literal to a
//! monomorphized formatter/deserializer pair and hands the frontend a
//! packed argument tuple; nothing about the format string survives to
//! runtime except its 16-bit id and those two function pointers.

/// Log at an explicit level. Zero-argument calls copy the literal bytes
/// straight into the record; calls with arguments serialize them by value
/// (copy mode).
///
/// The placeholder count of the literal is checked against the argument
/// count at compile time.
#[macro_export]
macro_rules! log {
  ($logger:expr, $level:expr, $fmt:literal) => {{
    $crate::femtolog_macros::check_format!($fmt);
    let level: $crate::level::LogLevel = $level;
    if (level as u8) <= ($crate::level::STATIC_MAX_LEVEL as u8) {
      let frontend = $logger.__frontend();
      if (level as u8) <= (frontend.level() as u8) {
        frontend.log_literal(level, $fmt);
      }
    }
  }};
  ($logger:expr, $level:expr, $fmt:literal, $($arg:expr),+ $(,)?) => {{
    $crate::femtolog_macros::check_format!($fmt, $($arg),+);
    let level: $crate::level::LogLevel = $level;
    if (level as u8) <= ($crate::level::STATIC_MAX_LEVEL as u8) {
      let frontend = $logger.__frontend();
      if (level as u8) <= (frontend.level() as u8) {
        const FORMAT_ID: u16 = $crate::registry::format_id($fmt);
        let format_fn: $crate::format::FormatFn =
          |out, args| $crate::format::format_into(out, $fmt, args);
        frontend.log_serialized(level, FORMAT_ID, $fmt, format_fn, false, &($(&$arg,)+));
      }
    }
  }};
}

/// Reference-mode variant of [`log!`]: string-like arguments are captured
/// as `(pointer, length)` instead of being copied.
///
/// The caller must keep every argument alive until the record has been
/// consumed; call `flush()` (or `stop_worker()`) before dropping or
/// mutating them. Copy mode (`log!`) is the safe default.
#[macro_export]
macro_rules! log_ref {
  ($logger:expr, $level:expr, $fmt:literal, $($arg:expr),+ $(,)?) => {{
    $crate::femtolog_macros::check_format!($fmt, $($arg),+);
    let level: $crate::level::LogLevel = $level;
    if (level as u8) <= ($crate::level::STATIC_MAX_LEVEL as u8) {
      let frontend = $logger.__frontend();
      if (level as u8) <= (frontend.level() as u8) {
        const FORMAT_ID: u16 = $crate::registry::format_id($fmt);
        let format_fn: $crate::format::FormatFn =
          |out, args| $crate::format::format_into(out, $fmt, args);
        frontend.log_serialized(level, FORMAT_ID, $fmt, format_fn, true, &($(&$arg,)+));
      }
    }
  }};
}

/// Emit without any level prefix; sinks forward the bytes untouched.
#[macro_export]
macro_rules! raw {
  ($logger:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
    $crate::log!($logger, $crate::level::LogLevel::Raw, $fmt $(, $arg)*)
  };
}

/// With `terminate_on_fatal` set (the default) this stops the worker after
/// the enqueue, drains the record to the sinks, and aborts the process.
#[macro_export]
macro_rules! fatal {
  ($logger:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
    $crate::log!($logger, $crate::level::LogLevel::Fatal, $fmt $(, $arg)*)
  };
}

#[macro_export]
macro_rules! error {
  ($logger:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
    $crate::log!($logger, $crate::level::LogLevel::Error, $fmt $(, $arg)*)
  };
}

#[macro_export]
macro_rules! warn {
  ($logger:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
    $crate::log!($logger, $crate::level::LogLevel::Warn, $fmt $(, $arg)*)
  };
}

#[macro_export]
macro_rules! info {
  ($logger:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
    $crate::log!($logger, $crate::level::LogLevel::Info, $fmt $(, $arg)*)
  };
}

#[macro_export]
macro_rules! debug {
  ($logger:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
    $crate::log!($logger, $crate::level::LogLevel::Debug, $fmt $(, $arg)*)
  };
}

#[macro_export]
macro_rules! trace {
  ($logger:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
    $crate::log!($logger, $crate::level::LogLevel::Trace, $fmt $(, $arg)*)
  };
}
