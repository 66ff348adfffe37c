//! Field tags and wire-type payloads.
//!
//! Every field on the wire is a tag followed by a payload. The tag is a varint holding
//! `(field_number << 3) | wire_type`, and the wire type alone determines how many payload bytes
//! follow:
//!
//! | wire type              | payload                                  |
//! |------------------------|------------------------------------------|
//! | `0` (Varint)           | a varint                                 |
//! | `1` (Fixed64)          | 8 little-endian bytes                    |
//! | `2` (LengthDelimited)  | a varint length, then that many bytes    |
//! | `5` (Fixed32)          | 4 little-endian bytes                    |
//!
//! The deprecated group markers (`3` and `4`) are not supported and are rejected like any other
//! unrecognized wire type.

use crate::{
    codec::{at_least, read_at},
    error::{Error, ParseError},
    varint::{self, Varint},
    EncodeSize, RangeCfg, Read, ReadExt, Write,
};
use bytes::{Buf, BufMut, Bytes};

/// Largest field number a tag may carry.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

const WIRE_TYPE_BITS: u32 = 3;
const WIRE_TYPE_MASK: u64 = 0x7;

/// Shape of the payload following a tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl TryFrom<u8> for WireType {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::LengthDelimited),
            5 => Ok(Self::Fixed32),
            other => Err(ParseError::InvalidWireType(other)),
        }
    }
}

/// A field number paired with the wire type of its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tag {
    field: u32,
    wire_type: WireType,
}

impl Tag {
    /// Creates a tag.
    ///
    /// # Panics
    ///
    /// Panics if `field` is zero or greater than [MAX_FIELD_NUMBER].
    pub fn new(field: u32, wire_type: WireType) -> Self {
        assert!(
            (1..=MAX_FIELD_NUMBER).contains(&field),
            "field number out of range: {field}"
        );
        Self { field, wire_type }
    }

    /// Splits a decoded tag varint into its field number and wire type.
    pub fn from_value(value: u64) -> Result<Self, ParseError> {
        let wire_type = WireType::try_from((value & WIRE_TYPE_MASK) as u8)?;
        let field = value >> WIRE_TYPE_BITS;
        if field == 0 || field > u64::from(MAX_FIELD_NUMBER) {
            return Err(ParseError::InvalidFieldNumber(field));
        }
        Ok(Self {
            field: field as u32,
            wire_type,
        })
    }

    /// Returns the field number.
    pub fn field(&self) -> u32 {
        self.field
    }

    /// Returns the wire type.
    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    /// Returns the varint value carried on the wire.
    pub fn value(&self) -> u64 {
        (u64::from(self.field) << WIRE_TYPE_BITS) | self.wire_type as u64
    }
}

impl Write for Tag {
    #[inline]
    fn write(&self, buf: &mut impl BufMut) {
        varint::write(self.value(), buf);
    }
}

impl EncodeSize for Tag {
    #[inline]
    fn encode_size(&self) -> usize {
        varint::size(self.value())
    }
}

impl Read for Tag {
    type Cfg = ();

    #[inline]
    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, ParseError> {
        Self::from_value(varint::read(buf)?)
    }
}

/// A field payload, before interpretation as a field type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WireValue {
    Varint(u64),
    Fixed64(u64),
    LengthDelimited(Bytes),
    Fixed32(u32),
}

impl WireValue {
    /// Returns the wire type this payload is carried as.
    pub fn wire_type(&self) -> WireType {
        match self {
            Self::Varint(_) => WireType::Varint,
            Self::Fixed64(_) => WireType::Fixed64,
            Self::LengthDelimited(_) => WireType::LengthDelimited,
            Self::Fixed32(_) => WireType::Fixed32,
        }
    }

    /// Returns the payload of a varint field.
    pub fn as_varint(&self) -> Option<Varint> {
        match self {
            Self::Varint(value) => Some(Varint::new(*value)),
            _ => None,
        }
    }

    /// Interprets a varint payload as a `bool` (see [Varint::as_bool]).
    pub fn as_bool(&self) -> Option<bool> {
        self.as_varint().map(|varint| varint.as_bool())
    }

    /// Returns the payload of a fixed32 field.
    pub fn as_fixed32(&self) -> Option<u32> {
        match self {
            Self::Fixed32(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the payload of a fixed64 field.
    pub fn as_fixed64(&self) -> Option<u64> {
        match self {
            Self::Fixed64(value) => Some(*value),
            _ => None,
        }
    }

    /// Interprets a fixed32 payload as an `f32`.
    pub fn as_f32(&self) -> Option<f32> {
        self.as_fixed32().map(f32::from_bits)
    }

    /// Interprets a fixed64 payload as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        self.as_fixed64().map(f64::from_bits)
    }

    /// Returns the payload of a length-delimited field.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::LengthDelimited(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl Write for WireValue {
    fn write(&self, buf: &mut impl BufMut) {
        match self {
            Self::Varint(value) => varint::write(*value, buf),
            Self::Fixed64(value) => buf.put_u64_le(*value),
            Self::LengthDelimited(bytes) => {
                varint::write(bytes.len() as u64, buf);
                buf.put_slice(bytes);
            }
            Self::Fixed32(value) => buf.put_u32_le(*value),
        }
    }
}

impl EncodeSize for WireValue {
    fn encode_size(&self) -> usize {
        match self {
            Self::Varint(value) => varint::size(*value),
            Self::Fixed64(_) => 8,
            Self::LengthDelimited(bytes) => varint::size(bytes.len() as u64) + bytes.len(),
            Self::Fixed32(_) => 4,
        }
    }
}

impl Read for WireValue {
    /// The wire type announced by the preceding tag, and the accepted payload lengths of
    /// length-delimited values.
    type Cfg = (WireType, RangeCfg<usize>);

    fn read_cfg(buf: &mut impl Buf, (wire_type, range): &Self::Cfg) -> Result<Self, ParseError> {
        match wire_type {
            WireType::Varint => Ok(Self::Varint(varint::read(buf)?)),
            WireType::Fixed64 => {
                at_least(buf, 8)?;
                Ok(Self::Fixed64(buf.get_u64_le()))
            }
            WireType::LengthDelimited => {
                // A length that does not fit in memory can never be satisfied by the buffer.
                let len = usize::try_from(varint::read::<u64>(buf)?)
                    .map_err(|_| ParseError::EndOfBuffer)?;
                if !range.contains(&len) {
                    return Err(ParseError::InvalidLength(len));
                }
                at_least(buf, len)?;
                Ok(Self::LengthDelimited(buf.copy_to_bytes(len)))
            }
            WireType::Fixed32 => {
                at_least(buf, 4)?;
                Ok(Self::Fixed32(buf.get_u32_le()))
            }
        }
    }
}

/// Decodes the tag starting at `offset` in `bytes`.
///
/// Returns the tag and the number of bytes consumed.
pub fn decode_tag(bytes: &[u8], offset: usize) -> Result<(Tag, usize), Error> {
    read_at(bytes, offset, |cursor| Tag::read(cursor))
}

/// Reads a payload of the given wire type starting at `offset` in `bytes`.
///
/// Returns the payload and the number of bytes consumed.
pub fn read_payload(
    wire_type: WireType,
    bytes: &[u8],
    offset: usize,
) -> Result<(WireValue, usize), Error> {
    read_at(bytes, offset, |cursor| {
        WireValue::read_cfg(cursor, &(wire_type, RangeCfg::default()))
    })
}

/// Writes `value` as field `field`, tag first.
pub fn write_field(field: u32, value: &WireValue, buf: &mut impl BufMut) {
    Tag::new(field, value.wire_type()).write(buf);
    value.write(buf);
}

/// Returns the number of bytes [write_field] writes.
pub fn field_size(field: u32, value: &WireValue) -> usize {
    Tag::new(field, value.wire_type()).encode_size() + value.encode_size()
}
