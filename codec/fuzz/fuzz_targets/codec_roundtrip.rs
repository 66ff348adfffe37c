#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use protowire_codec::{
    varint::{self, SInt},
    wire::{decode_tag, field_size, read_payload, write_field, MAX_FIELD_NUMBER},
    Encode, EncodeSize, Varint, WireValue,
};

#[derive(Arbitrary, Debug)]
enum FuzzValue {
    Varint(u64),
    Fixed64(u64),
    LengthDelimited(Vec<u8>),
    Fixed32(u32),
}

impl From<FuzzValue> for WireValue {
    fn from(value: FuzzValue) -> Self {
        match value {
            FuzzValue::Varint(v) => WireValue::Varint(v),
            FuzzValue::Fixed64(v) => WireValue::Fixed64(v),
            FuzzValue::LengthDelimited(v) => WireValue::LengthDelimited(Bytes::from(v)),
            FuzzValue::Fixed32(v) => WireValue::Fixed32(v),
        }
    }
}

#[derive(Arbitrary, Debug)]
enum FuzzInput {
    U64(u64),
    U32(u32),
    I32(i32),
    I64(i64),
    Bool(bool),
    ZigZag(i64),
    Field { field: u32, value: FuzzValue },
}

fn roundtrip_varint(varint: Varint) {
    let encoded = varint.encode();
    assert_eq!(varint.encode_size(), encoded.len());
    assert!(encoded.len() <= Varint::MAX_LEN);
    let (decoded, consumed) = Varint::decode(&encoded, 0).expect("Failed to decode varint!");
    assert_eq!(decoded, varint);
    assert_eq!(consumed, encoded.len());
}

fn fuzz(input: FuzzInput) {
    match input {
        FuzzInput::U64(v) => roundtrip_varint(Varint::from(v)),
        FuzzInput::U32(v) => {
            roundtrip_varint(Varint::from(v));
            assert_eq!(Varint::from(v).as_u32(), v);
        }
        FuzzInput::I32(v) => {
            roundtrip_varint(Varint::from(v));
            assert_eq!(Varint::from(v).as_i32(), v);
        }
        FuzzInput::I64(v) => {
            roundtrip_varint(Varint::from(v));
            assert_eq!(Varint::from(v).as_i64(), v);
        }
        FuzzInput::Bool(v) => {
            let encoded = Varint::from(v).encode();
            assert_eq!(encoded.len(), 1);
            assert_eq!(varint::as_bool(&encoded), v);
        }
        FuzzInput::ZigZag(v) => {
            let mut buf = Vec::new();
            varint::write_signed(v, &mut buf);
            assert_eq!(buf.len(), varint::size_signed(v));
            let decoded = varint::read_signed::<u64, i64>(&mut &buf[..])
                .expect("Failed to decode zigzag varint!");
            assert_eq!(decoded, v);
            assert_eq!(i64::un_zigzag(v.as_zigzag()), v);
        }
        FuzzInput::Field { field, value } => {
            let field = field % MAX_FIELD_NUMBER + 1;
            let value = WireValue::from(value);
            let mut buf = Vec::new();
            write_field(field, &value, &mut buf);
            assert_eq!(buf.len(), field_size(field, &value));

            let (tag, tag_len) = decode_tag(&buf, 0).expect("Failed to decode tag!");
            assert_eq!(tag.field(), field);
            assert_eq!(tag.wire_type(), value.wire_type());
            let (decoded, payload_len) =
                read_payload(tag.wire_type(), &buf, tag_len).expect("Failed to decode payload!");
            assert_eq!(decoded, value);
            assert_eq!(tag_len + payload_len, buf.len());
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
