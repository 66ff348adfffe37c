//! Read tagged fields from a buffer and dispatch them to a [Builder].

use crate::{
    config::{Config, RangeCfg},
    error::{Error, ParseError},
    message::{Builder, Message},
    wire::{Tag, WireValue},
    Read, ReadExt,
};
use bytes::Buf;
use std::iter::FusedIterator;
use tracing::{debug, trace};

/// Iterator over the `(tag, payload)` pairs of a buffer.
///
/// Iteration ends once the buffer is exhausted. The first malformed field yields an error and
/// ends iteration, so a caller never observes fields past a parse failure.
pub struct FieldReader<B: Buf> {
    buf: B,
    payload_len: RangeCfg<usize>,
    offset: usize,
    failed: bool,
}

impl<B: Buf> FieldReader<B> {
    /// Creates a reader accepting length-delimited payloads whose length is within `payload_len`.
    pub fn new(buf: B, payload_len: RangeCfg<usize>) -> Self {
        Self {
            buf,
            payload_len,
            offset: 0,
            failed: false,
        }
    }

    /// Returns the offset of the next field, relative to the start of the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn fail(&mut self, offset: usize, err: ParseError) -> Error {
        debug!(offset, ?err, "failed to read field");
        self.failed = true;
        Error::parse(offset, err)
    }

    fn read_field(&mut self) -> Result<(Tag, WireValue), Error> {
        let start = self.buf.remaining();
        let tag = match Tag::read(&mut self.buf) {
            Ok(tag) => tag,
            Err(err) => return Err(self.fail(self.offset, err)),
        };

        let payload_offset = self.offset + (start - self.buf.remaining());
        let cfg = (tag.wire_type(), self.payload_len);
        let value = match WireValue::read_cfg(&mut self.buf, &cfg) {
            Ok(value) => value,
            Err(err) => return Err(self.fail(payload_offset, err)),
        };

        trace!(
            field = tag.field(),
            wire_type = ?tag.wire_type(),
            offset = self.offset,
            "read field"
        );
        self.offset += start - self.buf.remaining();
        Ok((tag, value))
    }
}

impl<B: Buf> Iterator for FieldReader<B> {
    type Item = Result<(Tag, WireValue), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || !self.buf.has_remaining() {
            return None;
        }
        Some(self.read_field())
    }
}

impl<B: Buf> FusedIterator for FieldReader<B> {}

/// Decodes a message of type `M` from the entire buffer.
///
/// Fields recognized by `M::Builder` are handed to it; the rest are appended to its unknown
/// fields (or dropped, if `cfg` says so). Any malformed field fails the whole message.
pub fn decode_message<M: Message>(buf: impl Buf, cfg: &Config) -> Result<M, Error> {
    let mut builder = M::Builder::default();
    let mut fields = 0usize;
    for field in FieldReader::new(buf, cfg.payload_len) {
        let (tag, value) = field?;
        fields += 1;

        let number = tag.field();
        if builder.knows(number) {
            builder.add_tag(tag, value);
        } else if cfg.preserve_unknown {
            debug!(field = number, wire_type = ?tag.wire_type(), "preserved unknown field");
            builder.unknown_fields_mut().push(number, value);
        } else {
            debug!(field = number, "discarded unknown field");
        }
    }

    if !builder.is_valid() {
        debug!(fields, "builder is not valid");
        return Err(Error::InvalidMessage("builder rejected decoded fields"));
    }
    let message = builder
        .build()
        .ok_or(Error::InvalidMessage("builder failed to build message"))?;
    debug!(
        fields,
        unknown = message.unknown_fields().len(),
        "decoded message"
    );
    Ok(message)
}
