//! # Argument Serialization
//!
//! Packs a heterogeneous argument tuple into a fixed-capacity staging buffer
//! without heap allocation. The buffer starts with a
//! [`SerializedArgsHeader`] (two function pointers bound at the call site)
//! followed by the arguments in source order.
//!
//! Two layouts exist, chosen per call site and fixed for the whole record:
//!
//! - **copy**: trivially-copyable values are written inline with native
//!   endianness; string-like values as `(u32 length, bytes…)`;
//! - **reference**: string-like values as `(pointer, length)` word pairs.
//!   Primitives are still copied by value, they are no larger than a
//!   pointer. The producer must flush before invalidating referenced
//!   memory.
//!
//! Decoding is the mirror image, monomorphized per argument-type-list: the
//! tuple impls unroll field by field at compile time, so even the
//! single-small-argument case is a straight-line stack copy with no
//! interpretation loop.


use crate::format::{DecodedArg, DecodedArgs, DeserializeFn, FormatFn};
use std::mem;

const WORD: usize = mem::size_of::<usize>();

/// Length prefix for copy-mode strings.
const STR_LEN_PREFIX: usize = mem::size_of::<u32>();

/// Two function pointers emitted once per (format literal, argument-type
/// list, mode) instantiation. They travel at the front of every serialized
/// payload so the consumer needs no type tables.
#[derive(Clone, Copy)]
pub struct SerializedArgsHeader {
  pub format_fn: FormatFn,
  pub deserialize_fn: DeserializeFn,
}

pub const HEADER_SIZE: usize = 2 * WORD;

impl SerializedArgsHeader {
  pub fn new(format_fn: FormatFn, deserialize_fn: DeserializeFn) -> Self {
    Self {
      format_fn,
      deserialize_fn,
    }
  }

  pub fn write_into(&self, buf: &mut [u8]) {
    debug_assert!(buf.len() >= HEADER_SIZE);
    buf[..WORD].copy_from_slice(&(self.format_fn as usize).to_ne_bytes());
    buf[WORD..HEADER_SIZE].copy_from_slice(&(self.deserialize_fn as usize).to_ne_bytes());
  }

  pub fn read_from(buf: &[u8]) -> Self {
    debug_assert!(buf.len() >= HEADER_SIZE);
    let format_addr = read_word(buf, 0);
    let deserialize_addr = read_word(buf, WORD);
    // SAFETY: the addresses were produced by `write_into` from valid
    // function pointers in this same process; transmuting them back yields
    // the original pointers.
    unsafe {
      Self {
        format_fn: mem::transmute::<usize, FormatFn>(format_addr),
        deserialize_fn: mem::transmute::<usize, DeserializeFn>(deserialize_addr),
      }
    }
  }
}

#[inline]
fn read_word(buf: &[u8], offset: usize) -> usize {
  let mut raw = [0u8; WORD];
  raw.copy_from_slice(&buf[offset..offset + WORD]);
  usize::from_ne_bytes(raw)
}

#[inline]
fn read_u32(buf: &[u8]) -> u32 {
  let mut raw = [0u8; 4];
  raw.copy_from_slice(&buf[..4]);
  u32::from_ne_bytes(raw)
}

/// One serializable argument. Implemented for the primitive numeric types,
/// `bool`, `char`, and string-like types; references forward to their
/// referent so argument tuples built from borrows work unchanged.
pub trait SerializeArg {
  fn copy_size(&self) -> usize;

  /// Writes the copy-mode encoding into `buf` (already checked to be large
  /// enough) and returns bytes written.
  fn encode_copy(&self, buf: &mut [u8]) -> usize;

  /// Reads one copy-mode argument back; returns the value and bytes
  /// consumed.
  fn decode_copy<'a>(bytes: &'a [u8]) -> (DecodedArg<'a>, usize);

  #[inline]
  fn ref_size(&self) -> usize {
    self.copy_size()
  }

  #[inline]
  fn encode_ref(&self, buf: &mut [u8]) -> usize {
    self.encode_copy(buf)
  }

  /// Reads one reference-mode argument back.
  ///
  /// # Safety
  ///
  /// Any pointer embedded in `bytes` must still reference live memory; the
  /// producer guarantees this by flushing before invalidating arguments
  /// passed to a reference-mode call.
  #[inline]
  unsafe fn decode_ref<'a>(bytes: &'a [u8]) -> (DecodedArg<'a>, usize) {
    Self::decode_copy(bytes)
  }
}

impl<T: SerializeArg + ?Sized> SerializeArg for &T {
  #[inline]
  fn copy_size(&self) -> usize {
    (**self).copy_size()
  }

  #[inline]
  fn encode_copy(&self, buf: &mut [u8]) -> usize {
    (**self).encode_copy(buf)
  }

  #[inline]
  fn decode_copy<'a>(bytes: &'a [u8]) -> (DecodedArg<'a>, usize) {
    T::decode_copy(bytes)
  }

  #[inline]
  fn ref_size(&self) -> usize {
    (**self).ref_size()
  }

  #[inline]
  fn encode_ref(&self, buf: &mut [u8]) -> usize {
    (**self).encode_ref(buf)
  }

  #[inline]
  unsafe fn decode_ref<'a>(bytes: &'a [u8]) -> (DecodedArg<'a>, usize) {
    T::decode_ref(bytes)
  }
}

macro_rules! impl_serialize_int {
  ($($ty:ty => $variant:ident as $wide:ty),+ $(,)?) => {$(
    impl SerializeArg for $ty {
      #[inline]
      fn copy_size(&self) -> usize {
        mem::size_of::<$ty>()
      }

      #[inline]
      fn encode_copy(&self, buf: &mut [u8]) -> usize {
        let n = mem::size_of::<$ty>();
        buf[..n].copy_from_slice(&self.to_ne_bytes());
        n
      }

      #[inline]
      fn decode_copy<'a>(bytes: &'a [u8]) -> (DecodedArg<'a>, usize) {
        let n = mem::size_of::<$ty>();
        let mut raw = [0u8; mem::size_of::<$ty>()];
        raw.copy_from_slice(&bytes[..n]);
        (DecodedArg::$variant(<$ty>::from_ne_bytes(raw) as $wide), n)
      }
    }
  )+};
}

impl_serialize_int! {
  i8 => I64 as i64,
  i16 => I64 as i64,
  i32 => I64 as i64,
  i64 => I64 as i64,
  isize => I64 as i64,
  u8 => U64 as u64,
  u16 => U64 as u64,
  u32 => U64 as u64,
  u64 => U64 as u64,
  usize => U64 as u64,
}

impl SerializeArg for f32 {
  #[inline]
  fn copy_size(&self) -> usize {
    4
  }

  #[inline]
  fn encode_copy(&self, buf: &mut [u8]) -> usize {
    buf[..4].copy_from_slice(&self.to_ne_bytes());
    4
  }

  #[inline]
  fn decode_copy<'a>(bytes: &'a [u8]) -> (DecodedArg<'a>, usize) {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[..4]);
    (DecodedArg::F64(f32::from_ne_bytes(raw) as f64), 4)
  }
}

impl SerializeArg for f64 {
  #[inline]
  fn copy_size(&self) -> usize {
    8
  }

  #[inline]
  fn encode_copy(&self, buf: &mut [u8]) -> usize {
    buf[..8].copy_from_slice(&self.to_ne_bytes());
    8
  }

  #[inline]
  fn decode_copy<'a>(bytes: &'a [u8]) -> (DecodedArg<'a>, usize) {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[..8]);
    (DecodedArg::F64(f64::from_ne_bytes(raw)), 8)
  }
}

impl SerializeArg for bool {
  #[inline]
  fn copy_size(&self) -> usize {
    1
  }

  #[inline]
  fn encode_copy(&self, buf: &mut [u8]) -> usize {
    buf[0] = *self as u8;
    1
  }

  #[inline]
  fn decode_copy<'a>(bytes: &'a [u8]) -> (DecodedArg<'a>, usize) {
    (DecodedArg::Bool(bytes[0] != 0), 1)
  }
}

impl SerializeArg for char {
  #[inline]
  fn copy_size(&self) -> usize {
    4
  }

  #[inline]
  fn encode_copy(&self, buf: &mut [u8]) -> usize {
    buf[..4].copy_from_slice(&(*self as u32).to_ne_bytes());
    4
  }

  #[inline]
  fn decode_copy<'a>(bytes: &'a [u8]) -> (DecodedArg<'a>, usize) {
    let raw = read_u32(bytes);
    (
      DecodedArg::Char(char::from_u32(raw).unwrap_or(char::REPLACEMENT_CHARACTER)),
      4,
    )
  }
}

impl SerializeArg for str {
  #[inline]
  fn copy_size(&self) -> usize {
    STR_LEN_PREFIX + self.len()
  }

  #[inline]
  fn encode_copy(&self, buf: &mut [u8]) -> usize {
    let len = self.len();
    buf[..STR_LEN_PREFIX].copy_from_slice(&(len as u32).to_ne_bytes());
    buf[STR_LEN_PREFIX..STR_LEN_PREFIX + len].copy_from_slice(self.as_bytes());
    STR_LEN_PREFIX + len
  }

  #[inline]
  fn decode_copy<'a>(bytes: &'a [u8]) -> (DecodedArg<'a>, usize) {
    let len = (read_u32(bytes) as usize).min(bytes.len().saturating_sub(STR_LEN_PREFIX));
    let raw = &bytes[STR_LEN_PREFIX..STR_LEN_PREFIX + len];
    // The bytes were copied out of a &str, so this only fails on a torn
    // record; degrade to empty rather than crashing the worker.
    let s = std::str::from_utf8(raw).unwrap_or("");
    (DecodedArg::Str(s), STR_LEN_PREFIX + len)
  }

  #[inline]
  fn ref_size(&self) -> usize {
    2 * WORD
  }

  #[inline]
  fn encode_ref(&self, buf: &mut [u8]) -> usize {
    buf[..WORD].copy_from_slice(&(self.as_ptr() as usize).to_ne_bytes());
    buf[WORD..2 * WORD].copy_from_slice(&self.len().to_ne_bytes());
    2 * WORD
  }

  #[inline]
  unsafe fn decode_ref<'a>(bytes: &'a [u8]) -> (DecodedArg<'a>, usize) {
    let addr = read_word(bytes, 0);
    let len = read_word(bytes, WORD);
    // SAFETY: the (pointer, length) pair was taken from a live &str by
    // `encode_ref` and the producer keeps it alive until after the drain
    // (see trait-level contract); the bytes are therefore valid UTF-8.
    let s = unsafe {
      std::str::from_utf8_unchecked(std::slice::from_raw_parts(addr as *const u8, len))
    };
    (DecodedArg::Str(s), 2 * WORD)
  }
}

impl SerializeArg for String {
  #[inline]
  fn copy_size(&self) -> usize {
    self.as_str().copy_size()
  }

  #[inline]
  fn encode_copy(&self, buf: &mut [u8]) -> usize {
    self.as_str().encode_copy(buf)
  }

  #[inline]
  fn decode_copy<'a>(bytes: &'a [u8]) -> (DecodedArg<'a>, usize) {
    <str>::decode_copy(bytes)
  }

  #[inline]
  fn ref_size(&self) -> usize {
    self.as_str().ref_size()
  }

  #[inline]
  fn encode_ref(&self, buf: &mut [u8]) -> usize {
    self.as_str().encode_ref(buf)
  }

  #[inline]
  unsafe fn decode_ref<'a>(bytes: &'a [u8]) -> (DecodedArg<'a>, usize) {
    <str>::decode_ref(bytes)
  }
}

/// An argument tuple as written at a call site. The impls below unroll the
/// per-argument work statically, so each instantiation compiles into
/// straight-line encode/decode code for exactly its type list.
pub trait SerializeArgs {
  const ARITY: usize;

  fn size_copy(&self) -> usize;
  fn size_ref(&self) -> usize;
  fn encode_copy(&self, buf: &mut [u8]) -> usize;
  fn encode_ref(&self, buf: &mut [u8]) -> usize;
  fn decode_copy<'a>(bytes: &'a [u8], out: &mut DecodedArgs<'a>);

  /// # Safety
  ///
  /// See [`SerializeArg::decode_ref`]: embedded pointers must still be
  /// live.
  unsafe fn decode_ref<'a>(bytes: &'a [u8], out: &mut DecodedArgs<'a>);
}

macro_rules! impl_serialize_args_tuple {
  ($arity:expr => $($name:ident . $idx:tt),+) => {
    impl<$($name: SerializeArg),+> SerializeArgs for ($($name,)+) {
      const ARITY: usize = $arity;

      #[inline]
      fn size_copy(&self) -> usize {
        0 $(+ self.$idx.copy_size())+
      }

      #[inline]
      fn size_ref(&self) -> usize {
        0 $(+ self.$idx.ref_size())+
      }

      #[inline]
      fn encode_copy(&self, buf: &mut [u8]) -> usize {
        let mut offset = 0;
        $(offset += self.$idx.encode_copy(&mut buf[offset..]);)+
        offset
      }

      #[inline]
      fn encode_ref(&self, buf: &mut [u8]) -> usize {
        let mut offset = 0;
        $(offset += self.$idx.encode_ref(&mut buf[offset..]);)+
        offset
      }

      #[inline]
      fn decode_copy<'a>(bytes: &'a [u8], out: &mut DecodedArgs<'a>) {
        let mut offset = 0;
        $(
          let (arg, used) = <$name>::decode_copy(&bytes[offset..]);
          out.push(arg);
          offset += used;
        )+
        let _ = offset;
      }

      #[inline]
      unsafe fn decode_ref<'a>(bytes: &'a [u8], out: &mut DecodedArgs<'a>) {
        let mut offset = 0;
        $(
          let (arg, used) = unsafe { <$name>::decode_ref(&bytes[offset..]) };
          out.push(arg);
          offset += used;
        )+
        let _ = offset;
      }
    }
  };
}

impl_serialize_args_tuple!(1 => A.0);
impl_serialize_args_tuple!(2 => A.0, B.1);
impl_serialize_args_tuple!(3 => A.0, B.1, C.2);
impl_serialize_args_tuple!(4 => A.0, B.1, C.2, D.3);
impl_serialize_args_tuple!(5 => A.0, B.1, C.2, D.3, E.4);
impl_serialize_args_tuple!(6 => A.0, B.1, C.2, D.3, E.4, F.5);
impl_serialize_args_tuple!(7 => A.0, B.1, C.2, D.3, E.4, F.5, G.6);
impl_serialize_args_tuple!(8 => A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7);
impl_serialize_args_tuple!(9 => A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8);
impl_serialize_args_tuple!(10 => A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9);

/// Copy-mode trampoline; one instantiation per argument-type list. This is
/// the `deserialize_fn` written into copy-mode headers.
pub fn deserialize_copy<T: SerializeArgs>(
  out: &mut String,
  format_fn: FormatFn,
  payload: &[u8],
) -> usize {
  let mut args = DecodedArgs::new();
  T::decode_copy(payload, &mut args);
  format_fn(out, args.as_slice())
}

/// Reference-mode trampoline, the `deserialize_fn` of reference-mode
/// headers.
pub fn deserialize_ref<T: SerializeArgs>(
  out: &mut String,
  format_fn: FormatFn,
  payload: &[u8],
) -> usize {
  let mut args = DecodedArgs::new();
  // SAFETY: reference-mode records reach the consumer only while the
  // producer keeps the referenced memory alive; `log_ref!` documents the
  // flush-before-free contract.
  unsafe { T::decode_ref(payload, &mut args) };
  format_fn(out, args.as_slice())
}

/// Fixed-capacity serialized record: header followed by packed arguments.
pub struct SerializedArgs<const CAPACITY: usize = 2048> {
  buf: [u8; CAPACITY],
  len: usize,
}

pub type SmallSerializedArgs = SerializedArgs<512>;
pub type DefaultSerializedArgs = SerializedArgs<2048>;
pub type LargeSerializedArgs = SerializedArgs<8192>;

impl<const CAPACITY: usize> SerializedArgs<CAPACITY> {
  pub fn new() -> Self {
    Self {
      buf: [0; CAPACITY],
      len: 0,
    }
  }

  #[inline]
  pub fn data(&self) -> &[u8] {
    &self.buf[..self.len]
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.len
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  #[inline]
  pub const fn capacity(&self) -> usize {
    CAPACITY
  }

  #[inline]
  pub fn clear(&mut self) {
    self.len = 0;
  }
}

impl<const CAPACITY: usize> Default for SerializedArgs<CAPACITY> {
  fn default() -> Self {
    Self::new()
  }
}

/// Per-logger staging serializer. Reuses one buffer across calls; a record
/// that does not fit yields `None` and the frontend counts it as dropped.
pub struct ArgsSerializer<const CAPACITY: usize = 2048> {
  args: SerializedArgs<CAPACITY>,
}

pub type SmallSerializer = ArgsSerializer<512>;
pub type DefaultSerializer = ArgsSerializer<2048>;
pub type LargeSerializer = ArgsSerializer<8192>;

impl<const CAPACITY: usize> ArgsSerializer<CAPACITY> {
  pub fn new() -> Self {
    Self {
      args: SerializedArgs::new(),
    }
  }

  pub fn serialize_copy<T: SerializeArgs>(
    &mut self,
    format_fn: FormatFn,
    args: &T,
  ) -> Option<&SerializedArgs<CAPACITY>> {
    let total = HEADER_SIZE + args.size_copy();
    if total > CAPACITY {
      return None;
    }

    let header = SerializedArgsHeader::new(format_fn, deserialize_copy::<T>);
    header.write_into(&mut self.args.buf[..HEADER_SIZE]);
    let written = args.encode_copy(&mut self.args.buf[HEADER_SIZE..total]);
    debug_assert_eq!(HEADER_SIZE + written, total);

    self.args.len = total;
    Some(&self.args)
  }

  pub fn serialize_ref<T: SerializeArgs>(
    &mut self,
    format_fn: FormatFn,
    args: &T,
  ) -> Option<&SerializedArgs<CAPACITY>> {
    let total = HEADER_SIZE + args.size_ref();
    if total > CAPACITY {
      return None;
    }

    let header = SerializedArgsHeader::new(format_fn, deserialize_ref::<T>);
    header.write_into(&mut self.args.buf[..HEADER_SIZE]);
    let written = args.encode_ref(&mut self.args.buf[HEADER_SIZE..total]);
    debug_assert_eq!(HEADER_SIZE + written, total);

    self.args.len = total;
    Some(&self.args)
  }
}

impl<const CAPACITY: usize> Default for ArgsSerializer<CAPACITY> {
  fn default() -> Self {
    Self::new()
  }
}
