//! Fields a message does not recognize, kept for re-encoding.

use crate::{
    wire::{field_size, write_field, WireValue},
    EncodeSize, Write,
};
use bytes::BufMut;
use std::collections::BTreeMap;

/// Payloads of unrecognized fields, keyed by field number.
///
/// Payloads for the same field number keep their arrival order. Encoding writes fields in
/// ascending field number, so the bytes of each field's occurrences are reproduced exactly.
///
/// Payloads are stored decoded, not as the raw input bytes. Input that used a non-minimal
/// varint (for a tag, a varint payload, or a length prefix) is re-encoded in canonical form;
/// only canonically encoded input round-trips byte for byte.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnknownFields {
    fields: BTreeMap<u32, Vec<WireValue>>,
}

impl UnknownFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a payload for `field`.
    pub fn push(&mut self, field: u32, value: WireValue) {
        self.fields.entry(field).or_default().push(value);
    }

    /// Returns the payloads seen for `field`, in arrival order.
    pub fn get(&self, field: u32) -> Option<&[WireValue]> {
        self.fields.get(&field).map(Vec::as_slice)
    }

    /// Returns true if at least one payload was seen for `field`.
    pub fn contains(&self, field: u32) -> bool {
        self.fields.contains_key(&field)
    }

    /// Returns the number of distinct field numbers.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over field numbers (ascending) and their payloads.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[WireValue])> {
        self.fields
            .iter()
            .map(|(field, values)| (*field, values.as_slice()))
    }
}

impl Write for UnknownFields {
    fn write(&self, buf: &mut impl BufMut) {
        for (field, values) in &self.fields {
            for value in values {
                write_field(*field, value, buf);
            }
        }
    }
}

impl EncodeSize for UnknownFields {
    fn encode_size(&self) -> usize {
        self.fields
            .iter()
            .flat_map(|(field, values)| values.iter().map(|value| field_size(*field, value)))
            .sum()
    }
}
