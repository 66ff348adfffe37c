//! Variable-length integer encoding and decoding
//!
//! This module implements Google's Protocol Buffers variable-length integer encoding.
//! Each byte uses:
//! - 7 bits for the value (least-significant group first)
//! - 1 "continuation" bit to indicate if more bytes follow
//!
//! A `u64` therefore occupies between 1 and [Varint::MAX_LEN] bytes.
//!
//! Signed integers can be written two ways. Widening through [Varint] (`From<i32>`, `From<i64>`)
//! sign-extends to 64 bits, so every negative value takes the full ten bytes; this is how
//! `int32`/`int64` fields are carried. [write_signed] applies ZigZag first, which keeps
//! small-magnitude negatives short; this is how `sint32`/`sint64` fields are carried.
//!
//! `usize` and `isize` are omitted to prevent behavior from depending on the target architecture.

use crate::{
    codec::read_at,
    error::{Error, ParseError},
    Encode, EncodeSize, Read, ReadExt, Write,
};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::ops::{BitOrAssign, Shl, ShrAssign};

const BITS_PER_BYTE: usize = 8;
const DATA_BITS_PER_BYTE: usize = 7;
const DATA_BITS_MASK: u8 = 0x7F;
const CONTINUATION_BIT_MASK: u8 = 0x80;

/// A trait for unsigned integers that can be varint encoded.
pub trait UInt:
    Copy
    + From<u8>
    + Sized
    + ShrAssign<usize>
    + Shl<usize, Output = Self>
    + BitOrAssign<Self>
    + PartialOrd
{
    /// Returns the number of leading zeros in the integer.
    fn leading_zeros(self) -> u32;

    /// Returns the least significant byte of the integer.
    fn as_u8(self) -> u8;
}

// Implements the `UInt` trait for all unsigned integer types.
macro_rules! impl_uint {
    ($type:ty) => {
        impl UInt for $type {
            #[inline]
            fn leading_zeros(self) -> u32 {
                self.leading_zeros()
            }

            #[inline]
            fn as_u8(self) -> u8 {
                self as u8
            }
        }
    };
}
impl_uint!(u8);
impl_uint!(u16);
impl_uint!(u32);
impl_uint!(u64);
impl_uint!(u128);

/// A trait for signed integers that can be converted to and from unsigned integers of the
/// equivalent size.
///
/// When converted to unsigned integers, the encoding is done using ZigZag encoding, which moves the
/// sign bit to the least significant bit (shifting all other bits to the left by one). This allows
/// for more efficient encoding of numbers that are close to zero, even if they are negative.
pub trait SInt<UEq: UInt> {
    /// Converts the signed integer to an unsigned integer using ZigZag encoding.
    fn as_zigzag(&self) -> UEq;

    /// Converts a (ZigZag'ed) unsigned integer back to a signed integer.
    fn un_zigzag(value: UEq) -> Self;
}

// Implements the `SInt` trait for all signed integer types.
macro_rules! impl_sint {
    ($type:ty, $utype:ty) => {
        impl SInt<$utype> for $type {
            #[inline]
            fn as_zigzag(&self) -> $utype {
                let shr = std::mem::size_of::<$utype>() * 8 - 1;
                ((self << 1) ^ (self >> shr)) as $utype
            }

            #[inline]
            fn un_zigzag(value: $utype) -> Self {
                ((value >> 1) as $type) ^ (-((value & 1) as $type))
            }
        }
    };
}
impl_sint!(i8, u8);
impl_sint!(i16, u16);
impl_sint!(i32, u32);
impl_sint!(i64, u64);
impl_sint!(i128, u128);

/// Encodes an unsigned integer as a varint.
pub fn write<T: UInt>(value: T, buf: &mut impl BufMut) {
    let continuation_threshold = T::from(CONTINUATION_BIT_MASK);
    if value < continuation_threshold {
        // Fast path for small values (common case for tags and lengths).
        // `as_u8()` does not truncate the value or leave a continuation bit.
        buf.put_u8(value.as_u8());
        return;
    }

    let mut val = value;
    while val >= continuation_threshold {
        buf.put_u8(val.as_u8() | CONTINUATION_BIT_MASK);
        val >>= DATA_BITS_PER_BYTE;
    }
    buf.put_u8(val.as_u8());
}

/// Decodes an unsigned integer from a varint.
///
/// Non-minimal encodings (redundant zero continuation groups) are accepted as long as they fit
/// in the width of `T`.
pub fn read<T: UInt>(buf: &mut impl Buf) -> Result<T, ParseError> {
    let max_bits = std::mem::size_of::<T>() * BITS_PER_BYTE;
    let mut result: T = T::from(0);
    let mut shift = 0;

    loop {
        if !buf.has_remaining() {
            return Err(ParseError::EndOfBuffer);
        }
        let byte = buf.get_u8();

        // If this must be the last byte, check for overflow (i.e. set bits beyond the size of T).
        // Because the continuation bit is the most-significant bit, this check also rejects a
        // continuation bit on what must be the last byte, so `shift` never reaches `max_bits`.
        let remaining_bits = max_bits - shift;
        if remaining_bits <= DATA_BITS_PER_BYTE {
            let relevant_bits = BITS_PER_BYTE - byte.leading_zeros() as usize;
            if relevant_bits > remaining_bits {
                return Err(ParseError::InvalidVarint);
            }
        }

        result |= T::from(byte & DATA_BITS_MASK) << shift;

        if byte & CONTINUATION_BIT_MASK == 0 {
            return Ok(result);
        }
        shift += DATA_BITS_PER_BYTE;
    }
}

/// Calculates the number of bytes needed to encode an unsigned integer as a varint.
pub fn size<T: UInt>(value: T) -> usize {
    let total_bits = std::mem::size_of::<T>() * BITS_PER_BYTE;
    let leading_zeros = value.leading_zeros() as usize;
    let data_bits = total_bits - leading_zeros;
    usize::max(1, data_bits.div_ceil(DATA_BITS_PER_BYTE))
}

/// Encodes a signed integer as a varint using ZigZag encoding.
pub fn write_signed<U: UInt, S: SInt<U>>(value: S, buf: &mut impl BufMut) {
    write(value.as_zigzag(), buf);
}

/// Decodes a signed integer from ZigZag encoding.
pub fn read_signed<U: UInt, S: SInt<U>>(buf: &mut impl Buf) -> Result<S, ParseError> {
    Ok(S::un_zigzag(read(buf)?))
}

/// Calculates the number of bytes needed to encode a signed integer as a ZigZag varint.
pub fn size_signed<U: UInt, S: SInt<U>>(value: S) -> usize {
    size(value.as_zigzag())
}

/// Encodes `value` as a varint.
pub fn encode(value: u64) -> BytesMut {
    Varint::new(value).encode()
}

/// Decodes the varint starting at `offset` in `bytes`.
///
/// Returns the value and the number of bytes consumed.
pub fn decode(bytes: &[u8], offset: usize) -> Result<(u64, usize), Error> {
    Varint::decode(bytes, offset).map(|(varint, consumed)| (varint.value(), consumed))
}

/// Interprets raw varint bytes as a boolean.
///
/// Only the least-significant bit of the first byte is consulted (so `[0x02]` is `false`). An
/// empty sequence is `false`.
pub fn as_bool(bytes: &[u8]) -> bool {
    bytes.first().is_some_and(|byte| byte & 1 == 1)
}

/// A 64-bit value carried as a varint.
///
/// The encoding of a [Varint] is always the shortest one for its value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Varint(u64);

impl Varint {
    /// Maximum encoded length of a 64-bit varint (`ceil(64 / 7)`).
    pub const MAX_LEN: usize = 10;

    /// Creates a varint carrying `value`.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the carried value.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Returns the length of the encoding (between 1 and [Self::MAX_LEN]).
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        size(self.0)
    }

    /// Interprets the varint as a boolean (the low bit of its first byte).
    pub fn as_bool(&self) -> bool {
        self.0 & 1 == 1
    }

    /// Narrows the value to 32 bits, discarding the high bits.
    pub fn as_u32(&self) -> u32 {
        self.0 as u32
    }

    /// Reinterprets the low 32 bits as a two's complement integer.
    pub fn as_i32(&self) -> i32 {
        self.0 as i32
    }

    /// Reinterprets the value as a two's complement integer.
    pub fn as_i64(&self) -> i64 {
        self.0 as i64
    }

    /// Returns the encoded bytes.
    pub fn to_bytes(&self) -> Bytes {
        self.encode().freeze()
    }

    /// Decodes the varint starting at `offset` in `bytes`.
    ///
    /// Returns the varint and the number of bytes consumed. Fails if `bytes` ends before a byte
    /// without the continuation bit is found, or if the encoding does not fit in 64 bits (which
    /// also bounds the scan to [Self::MAX_LEN] bytes).
    pub fn decode(bytes: &[u8], offset: usize) -> Result<(Self, usize), Error> {
        read_at(bytes, offset, |cursor| Self::read(cursor))
    }
}

impl From<u64> for Varint {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<u32> for Varint {
    fn from(value: u32) -> Self {
        Self(u64::from(value))
    }
}

impl From<i64> for Varint {
    fn from(value: i64) -> Self {
        Self(value as u64)
    }
}

impl From<i32> for Varint {
    fn from(value: i32) -> Self {
        // Sign-extend first so negative values encode like their 64-bit counterparts.
        Self::from(i64::from(value))
    }
}

impl From<bool> for Varint {
    fn from(value: bool) -> Self {
        Self(u64::from(value))
    }
}

impl From<Varint> for u64 {
    fn from(varint: Varint) -> Self {
        varint.0
    }
}

impl Write for Varint {
    #[inline]
    fn write(&self, buf: &mut impl BufMut) {
        write(self.0, buf);
    }
}

impl EncodeSize for Varint {
    #[inline]
    fn encode_size(&self) -> usize {
        size(self.0)
    }
}

impl Read for Varint {
    type Cfg = ();

    #[inline]
    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, ParseError> {
        read(buf).map(Self)
    }
}
