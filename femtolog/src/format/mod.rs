//! # Format Dispatch
//!
//! The call-site macros bind each format literal to a non-capturing closure
//! that coerces to a [`FormatFn`] pointer; the literal lives in that
//! function's code and is never copied into a record. The matching
//! [`DeserializeFn`] is a monomorphized trampoline from `crate::serialize`
//! that rebuilds the argument sequence and hands it here.
//!
//! Substitution implements the positional `{}` mini-language: each `{}` is
//! replaced by the next decoded argument, `{{` and `}}` escape literal
//! braces, and no other format specs exist (the proc-macro check rejects
//! them at the call site). A placeholder with no remaining argument is
//! emitted verbatim rather than failing; the consumer path never errors.


use smallvec::SmallVec;

/// Upper bound on formatted arguments per call site, matching the largest
/// argument tuple the serializer implements.
pub const MAX_FORMAT_ARGS: usize = 10;

/// An argument reconstructed from a record payload, ready for substitution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodedArg<'a> {
  Bool(bool),
  Char(char),
  I64(i64),
  U64(u64),
  F64(f64),
  Str(&'a str),
}

/// Inline scratch for decoded arguments; stays on the stack for every
/// supported arity.
pub type DecodedArgs<'a> = SmallVec<[DecodedArg<'a>; MAX_FORMAT_ARGS]>;

/// Formats decoded arguments into `out` using the literal bound at the call
/// site. Returns bytes written.
pub type FormatFn = fn(&mut String, &[DecodedArg<'_>]) -> usize;

/// Decodes the packed payload that follows the serialized-args header,
/// rebuilds the argument sequence, and invokes the bound [`FormatFn`].
/// Returns bytes written into the output buffer.
pub type DeserializeFn = fn(&mut String, FormatFn, &[u8]) -> usize;

/// Positional `{}` substitution of `args` into `template`, appended to
/// `out`. Returns the number of bytes appended.
pub fn format_into(out: &mut String, template: &str, args: &[DecodedArg<'_>]) -> usize {
  let start = out.len();
  let bytes = template.as_bytes();
  let mut i = 0;
  let mut next_arg = 0;

  while i < bytes.len() {
    match bytes[i] {
      b'{' if i + 1 < bytes.len() && bytes[i + 1] == b'{' => {
        out.push('{');
        i += 2;
      },
      b'{' if i + 1 < bytes.len() && bytes[i + 1] == b'}' => {
        if next_arg < args.len() {
          write_arg(out, &args[next_arg]);
          next_arg += 1;
        } else {
          out.push_str("{}");
        }
        i += 2;
      },
      b'}' if i + 1 < bytes.len() && bytes[i + 1] == b'}' => {
        out.push('}');
        i += 2;
      },
      _ => {
        // Copy the run up to the next brace in one shot.
        let run_end = bytes[i..]
          .iter()
          .position(|&b| b == b'{' || b == b'}')
          .map(|p| i + p)
          .unwrap_or(bytes.len());
        let run_end = run_end.max(i + 1);
        out.push_str(&template[i..run_end]);
        i = run_end;
      },
    }
  }

  out.len() - start
}

fn write_arg(out: &mut String, arg: &DecodedArg<'_>) {
  match arg {
    DecodedArg::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
    DecodedArg::Char(c) => out.push(*c),
    DecodedArg::I64(v) => {
      let mut buf = itoa::Buffer::new();
      out.push_str(buf.format(*v));
    },
    DecodedArg::U64(v) => {
      let mut buf = itoa::Buffer::new();
      out.push_str(buf.format(*v));
    },
    DecodedArg::F64(v) => {
      let mut buf = ryu::Buffer::new();
      out.push_str(buf.format(*v));
    },
    DecodedArg::Str(s) => out.push_str(s),
  }
}
