//! Encode and decode the Protocol Buffers wire format.
//!
//! # Overview
//!
//! The wire-level core of a Protocol Buffers library:
//! - [varint]: the base-128 variable-length integer every other construct is built on
//! - [wire]: field tags, wire types, and the payload shape each wire type implies
//! - [reader]: the field loop that feeds a message [Builder] and preserves fields it does not
//!   recognize in [UnknownFields]
//!
//! Message layouts are not described here. A message type implements [Message] (how it is
//! written) and [Builder] (which fields it accepts), and the codec handles the rest.
//!
//! Decoding never returns a partial result: any truncated, over-long, or unrecognized input fails
//! the whole decode with [Error::ParseFailed], carrying the offset of the offending item.
//!
//! # Example
//!
//! ```
//! use bytes::{BufMut, Bytes};
//! use protowire_codec::{
//!     wire::{field_size, write_field, Tag, WireValue},
//!     Builder, EncodeSize, Message, UnknownFields, Write,
//! };
//!
//! struct Ping {
//!     id: u64,
//!     unknown: UnknownFields,
//! }
//!
//! impl Write for Ping {
//!     fn write(&self, buf: &mut impl BufMut) {
//!         write_field(1, &WireValue::Varint(self.id), buf);
//!         self.unknown.write(buf);
//!     }
//! }
//!
//! impl EncodeSize for Ping {
//!     fn encode_size(&self) -> usize {
//!         field_size(1, &WireValue::Varint(self.id)) + self.unknown.encode_size()
//!     }
//! }
//!
//! impl Message for Ping {
//!     type Builder = PingBuilder;
//!
//!     fn unknown_fields(&self) -> &UnknownFields {
//!         &self.unknown
//!     }
//! }
//!
//! #[derive(Default)]
//! struct PingBuilder {
//!     id: Option<u64>,
//!     unknown: UnknownFields,
//! }
//!
//! impl Builder<Ping> for PingBuilder {
//!     fn knows(&self, field: u32) -> bool {
//!         field == 1
//!     }
//!
//!     fn add_tag(&mut self, _: Tag, value: WireValue) {
//!         // A payload of the wrong wire type leaves `id` unset.
//!         self.id = value.as_varint().map(|varint| varint.value());
//!     }
//!
//!     fn unknown_fields_mut(&mut self) -> &mut UnknownFields {
//!         &mut self.unknown
//!     }
//!
//!     fn is_valid(&self) -> bool {
//!         self.id.is_some()
//!     }
//!
//!     fn build(self) -> Option<Ping> {
//!         Some(Ping {
//!             id: self.id?,
//!             unknown: self.unknown,
//!         })
//!     }
//! }
//!
//! // Field 1 = 150, then field 2 = "hi", which `Ping` does not know.
//! let bytes = Bytes::from_static(&[0x08, 0x96, 0x01, 0x12, 0x02, b'h', b'i']);
//! let ping = Ping::decode(bytes.clone()).unwrap();
//! assert_eq!(ping.id, 150);
//! assert_eq!(ping.unknown_fields().get(2).unwrap().len(), 1);
//! assert_eq!(ping.bytes(), bytes);
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod message;
pub mod reader;
pub mod unknown;
pub mod varint;
pub mod wire;

// Re-export main types and traits
pub use codec::{Encode, EncodeSize, Read, ReadExt, Write};
pub use config::{Config, RangeCfg};
pub use error::{Error, ParseError};
pub use message::{Builder, Message};
pub use reader::{decode_message, FieldReader};
pub use unknown::UnknownFields;
pub use varint::Varint;
pub use wire::{Tag, WireType, WireValue};
