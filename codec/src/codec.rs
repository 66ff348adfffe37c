//! Core codec traits

use crate::error::{Error, ParseError};
use bytes::{Buf, BufMut, BytesMut};

/// Trait for types that can be written (encoded) to a buffer.
pub trait Write {
    /// Encodes this value by writing to a buffer.
    ///
    /// Implementations should panic if the buffer doesn't have enough capacity.
    fn write(&self, buf: &mut impl BufMut);
}

/// Trait for types whose encoded length can be computed without encoding them.
pub trait EncodeSize {
    /// Returns the encoded length of this value.
    ///
    /// This method MUST return the exact number of bytes that will be written by `write()`.
    fn encode_size(&self) -> usize;
}

/// Trait for types that can be encoded to a buffer.
pub trait Encode: Write + EncodeSize {
    /// Encodes a value to a `BytesMut` buffer.
    ///
    /// Panics if the `write` implementation does not write the expected number of bytes.
    ///
    /// (Provided method).
    fn encode(&self) -> BytesMut {
        let len = self.encode_size();
        let mut buffer = BytesMut::with_capacity(len);
        self.write(&mut buffer);
        assert_eq!(buffer.len(), len, "write() did not write expected bytes");
        buffer
    }
}

// Automatically implement `Encode` for types that implement `Write` and `EncodeSize`.
impl<T: Write + EncodeSize> Encode for T {}

/// Trait for types that can be read/decoded from a buffer.
///
/// The `Cfg` associated type allows for configuration during the read process. For example, it
/// can be used to limit the maximum size of a length-delimited payload when decoding untrusted
/// data. Use `()` for types that do not require configuration.
pub trait Read: Sized {
    /// The configuration consulted while reading.
    type Cfg;

    /// Reads a value from the buffer using the provided configuration `cfg`, consuming the
    /// necessary bytes.
    ///
    /// Errors carry no offset: callers that track their position attach it.
    fn read_cfg(buf: &mut impl Buf, cfg: &Self::Cfg) -> Result<Self, ParseError>;
}

/// Extension trait providing an ergonomic read method for types requiring no configuration.
pub trait ReadExt: Read<Cfg = ()> {
    /// Reads a value using the default `()` config.
    fn read(buf: &mut impl Buf) -> Result<Self, ParseError> {
        Self::read_cfg(buf, &())
    }
}

// Automatically implement `ReadExt` for types that implement `Read` with no config.
impl<T: Read<Cfg = ()>> ReadExt for T {}

/// Ensures at least `len` bytes remain in `buf`.
#[inline]
pub(crate) fn at_least(buf: &mut impl Buf, len: usize) -> Result<(), ParseError> {
    if buf.remaining() < len {
        return Err(ParseError::EndOfBuffer);
    }
    Ok(())
}

/// Runs `read` over `bytes[offset..]`, returning its output and the number of bytes it consumed.
///
/// A failure is reported at `offset`.
pub(crate) fn read_at<T>(
    bytes: &[u8],
    offset: usize,
    read: impl FnOnce(&mut &[u8]) -> Result<T, ParseError>,
) -> Result<(T, usize), Error> {
    let mut cursor = bytes
        .get(offset..)
        .ok_or_else(|| Error::parse(offset, ParseError::EndOfBuffer))?;
    let available = cursor.len();
    let value = read(&mut cursor).map_err(|err| Error::parse(offset, err))?;
    Ok((value, available - cursor.len()))
}
