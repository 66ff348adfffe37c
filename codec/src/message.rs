//! Capabilities a message type provides to the codec.
//!
//! The codec does not know any message layout. A [Message] describes how it is written, and its
//! [Builder] decides which field numbers it recognizes and what to do with their payloads. The
//! reader in [crate::reader] connects the two.

use crate::{
    config::Config,
    error::Error,
    reader::decode_message,
    unknown::UnknownFields,
    wire::{Tag, WireValue},
    Encode, EncodeSize, Write,
};
use bytes::{Buf, Bytes};

/// A decoded message.
///
/// `write` must emit the recognized fields followed by [Message::unknown_fields], so that fields
/// this message does not understand survive a decode/encode cycle.
pub trait Message: Write + EncodeSize + Sized {
    /// Accumulates the fields of this message during decoding.
    type Builder: Builder<Self>;

    /// Returns the fields seen during decoding that [Message::Builder] did not recognize.
    fn unknown_fields(&self) -> &UnknownFields;

    /// Returns the serialized form of this message.
    fn bytes(&self) -> Bytes {
        self.encode().freeze()
    }

    /// Returns the length of [Message::bytes].
    fn serialized_size(&self) -> usize {
        self.encode_size()
    }

    /// Decodes a message, consuming the entire buffer.
    fn decode(buf: impl Buf) -> Result<Self, Error> {
        Self::decode_cfg(buf, &Config::default())
    }

    /// Decodes a message with the provided configuration, consuming the entire buffer.
    fn decode_cfg(buf: impl Buf, cfg: &Config) -> Result<Self, Error> {
        decode_message(buf, cfg)
    }
}

/// Mutable accumulator of a message's fields.
///
/// A builder starts empty ([Default]), receives zero or more fields, and is consumed by
/// [Builder::build].
pub trait Builder<M: Message>: Default {
    /// Returns true if `field` is part of the message.
    fn knows(&self, field: u32) -> bool;

    /// Accepts the payload of a recognized field.
    ///
    /// A payload whose wire type does not suit the field should leave the builder invalid rather
    /// than panic.
    fn add_tag(&mut self, tag: Tag, value: WireValue);

    /// Returns the store for fields this builder does not recognize.
    fn unknown_fields_mut(&mut self) -> &mut UnknownFields;

    /// Returns true if the accumulated fields form a complete message.
    ///
    /// Decoding fails with [crate::Error::InvalidMessage] when this is false, without calling
    /// [Builder::build].
    fn is_valid(&self) -> bool;

    /// Produces the message, or `None` if [Builder::is_valid] does not hold.
    fn build(self) -> Option<M>;
}
