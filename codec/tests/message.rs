//! Decode and re-encode a message through the `Message`/`Builder` capabilities.

use bytes::{BufMut, Bytes, BytesMut};
use protowire_codec::{
    varint::SInt,
    wire::{decode_tag, field_size, read_payload, write_field},
    Builder, Config, EncodeSize, Error, Message, ParseError, Tag, UnknownFields, Varint,
    WireType, WireValue, Write,
};

#[derive(Debug, Clone, PartialEq)]
struct Person {
    id: u64,
    name: String,
    active: bool,
    score: f32,
    balance: i64,
    tags: Vec<Bytes>,
    weight: f64,
    unknown: UnknownFields,
}

impl Person {
    fn new(id: u64) -> Self {
        Self {
            id,
            name: String::new(),
            active: false,
            score: 0.0,
            balance: 0,
            tags: Vec::new(),
            weight: 0.0,
            unknown: UnknownFields::new(),
        }
    }

    fn fields(&self) -> Vec<(u32, WireValue)> {
        let mut fields = vec![(1, WireValue::Varint(self.id))];
        if !self.name.is_empty() {
            let name = Bytes::copy_from_slice(self.name.as_bytes());
            fields.push((2, WireValue::LengthDelimited(name)));
        }
        if self.active {
            fields.push((3, WireValue::Varint(1)));
        }
        if self.score != 0.0 {
            fields.push((4, WireValue::Fixed32(self.score.to_bits())));
        }
        if self.balance != 0 {
            fields.push((5, WireValue::Varint(self.balance.as_zigzag())));
        }
        for tag in &self.tags {
            fields.push((6, WireValue::LengthDelimited(tag.clone())));
        }
        if self.weight != 0.0 {
            fields.push((7, WireValue::Fixed64(self.weight.to_bits())));
        }
        fields
    }
}

impl Write for Person {
    fn write(&self, buf: &mut impl BufMut) {
        for (field, value) in self.fields() {
            write_field(field, &value, buf);
        }
        self.unknown.write(buf);
    }
}

impl EncodeSize for Person {
    fn encode_size(&self) -> usize {
        let known: usize = self
            .fields()
            .iter()
            .map(|(field, value)| field_size(*field, value))
            .sum();
        known + self.unknown.encode_size()
    }
}

impl Message for Person {
    type Builder = PersonBuilder;

    fn unknown_fields(&self) -> &UnknownFields {
        &self.unknown
    }
}

#[derive(Default)]
struct PersonBuilder {
    id: Option<u64>,
    name: String,
    active: bool,
    score: f32,
    balance: i64,
    tags: Vec<Bytes>,
    weight: f64,
    mismatched: bool,
    unknown: UnknownFields,
}

impl Builder<Person> for PersonBuilder {
    fn knows(&self, field: u32) -> bool {
        (1..=7).contains(&field)
    }

    fn add_tag(&mut self, tag: Tag, value: WireValue) {
        match (tag.field(), value) {
            (1, WireValue::Varint(id)) => self.id = Some(id),
            (2, WireValue::LengthDelimited(name)) => match String::from_utf8(name.to_vec()) {
                Ok(name) => self.name = name,
                Err(_) => self.mismatched = true,
            },
            (3, WireValue::Varint(active)) => self.active = Varint::new(active).as_bool(),
            (4, WireValue::Fixed32(bits)) => self.score = f32::from_bits(bits),
            (5, WireValue::Varint(balance)) => self.balance = i64::un_zigzag(balance),
            (6, WireValue::LengthDelimited(tag)) => self.tags.push(tag),
            (7, WireValue::Fixed64(bits)) => self.weight = f64::from_bits(bits),
            _ => self.mismatched = true,
        }
    }

    fn unknown_fields_mut(&mut self) -> &mut UnknownFields {
        &mut self.unknown
    }

    fn is_valid(&self) -> bool {
        self.id.is_some() && !self.mismatched
    }

    fn build(self) -> Option<Person> {
        if !self.is_valid() {
            return None;
        }
        Some(Person {
            id: self.id?,
            name: self.name,
            active: self.active,
            score: self.score,
            balance: self.balance,
            tags: self.tags,
            weight: self.weight,
            unknown: self.unknown,
        })
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn sample() -> Person {
    Person {
        name: "ada".to_string(),
        active: true,
        score: 0.5,
        balance: -3,
        tags: vec![Bytes::from_static(b"x"), Bytes::from_static(b"yz")],
        weight: 61.25,
        ..Person::new(42)
    }
}

#[test]
fn test_round_trip() {
    init_tracing();
    let person = sample();
    let bytes = person.bytes();
    assert_eq!(person.serialized_size(), bytes.len());

    let decoded = Person::decode(bytes.clone()).unwrap();
    assert_eq!(decoded, person);
    assert!(decoded.unknown_fields().is_empty());
    assert_eq!(decoded.bytes(), bytes);
}

#[test]
fn test_known_layout() {
    init_tracing();
    let bytes: &[u8] = &[
        0x08, 0x2A, // id = 42
        0x12, 0x03, b'a', b'd', b'a', // name = "ada"
        0x18, 0x01, // active = true
        0x28, 0x05, // balance = zigzag(-3)
    ];
    let person = Person::decode(bytes).unwrap();
    assert_eq!(person.id, 42);
    assert_eq!(person.name, "ada");
    assert!(person.active);
    assert_eq!(person.balance, -3);
    assert_eq!(&person.bytes()[..], bytes);
}

#[test]
fn test_bool_uses_low_bit() {
    // `active` carried as 2: nonzero, but the low bit is clear.
    let bytes: &[u8] = &[0x08, 0x01, 0x18, 0x02];
    let person = Person::decode(bytes).unwrap();
    assert!(!person.active);
}

#[test]
fn test_unknown_fields_preserved() {
    init_tracing();
    let person = Person::new(7);
    let mut bytes = BytesMut::from(&person.bytes()[..]);

    // Two occurrences of unknown field 9, then one of unknown field 10.
    let occurrences: &[u8] = &[0x48, 0x01, 0x48, 0x96, 0x01];
    bytes.put_slice(occurrences);
    bytes.put_slice(&[0x52, 0x02, b'o', b'k']);
    let bytes = bytes.freeze();

    let decoded = Person::decode(bytes.clone()).unwrap();
    assert_eq!(decoded.id, 7);
    let unknown = decoded.unknown_fields();
    assert_eq!(unknown.len(), 2);
    assert_eq!(
        unknown.get(9),
        Some(&[WireValue::Varint(1), WireValue::Varint(150)][..])
    );
    assert_eq!(
        unknown.get(10),
        Some(&[WireValue::LengthDelimited(Bytes::from_static(b"ok"))][..])
    );

    // Re-encoding reproduces the original bytes, including both occurrences of field 9.
    let encoded = decoded.bytes();
    assert_eq!(encoded, bytes);
    assert!(encoded
        .windows(occurrences.len())
        .any(|window| window == occurrences));
}

#[test]
fn test_unknown_fields_interleaved() {
    // Unknown field 9 on both sides of the known field 1.
    let bytes: &[u8] = &[0x48, 0x05, 0x08, 0x01, 0x48, 0x06];
    let decoded = Person::decode(bytes).unwrap();
    assert_eq!(
        decoded.unknown_fields().get(9),
        Some(&[WireValue::Varint(5), WireValue::Varint(6)][..])
    );

    // Known fields are written first; the unknown occurrences keep their order.
    assert_eq!(&decoded.bytes()[..], &[0x08, 0x01, 0x48, 0x05, 0x48, 0x06]);
}

#[test]
fn test_unknown_fields_discarded() {
    let bytes: &[u8] = &[0x08, 0x01, 0x48, 0x05, 0x52, 0x01, b'a'];
    let cfg = Config {
        preserve_unknown: false,
        ..Config::default()
    };
    let decoded = Person::decode_cfg(bytes, &cfg).unwrap();
    assert!(decoded.unknown_fields().is_empty());
    assert_eq!(&decoded.bytes()[..], &[0x08, 0x01]);
}

#[test]
fn test_discarded_fields_still_validated() {
    // Unknown field 10 declares three bytes but only one follows.
    let bytes: &[u8] = &[0x08, 0x01, 0x52, 0x03, b'a'];
    let cfg = Config {
        preserve_unknown: false,
        ..Config::default()
    };
    assert_eq!(
        Person::decode_cfg(bytes, &cfg),
        Err(Error::parse(3, ParseError::EndOfBuffer))
    );
}

#[test]
fn test_missing_required_field() {
    let bytes: &[u8] = &[0x18, 0x01];
    assert_eq!(
        Person::decode(bytes),
        Err(Error::InvalidMessage("builder rejected decoded fields"))
    );
}

/// A message whose builder always builds, but only reports itself valid once field 1 is seen.
#[derive(Debug, PartialEq)]
struct Marker {
    unknown: UnknownFields,
}

impl Write for Marker {
    fn write(&self, buf: &mut impl BufMut) {
        self.unknown.write(buf);
    }
}

impl EncodeSize for Marker {
    fn encode_size(&self) -> usize {
        self.unknown.encode_size()
    }
}

impl Message for Marker {
    type Builder = MarkerBuilder;

    fn unknown_fields(&self) -> &UnknownFields {
        &self.unknown
    }
}

#[derive(Default)]
struct MarkerBuilder {
    seen: bool,
    unknown: UnknownFields,
}

impl Builder<Marker> for MarkerBuilder {
    fn knows(&self, field: u32) -> bool {
        field == 1
    }

    fn add_tag(&mut self, _: Tag, _: WireValue) {
        self.seen = true;
    }

    fn unknown_fields_mut(&mut self) -> &mut UnknownFields {
        &mut self.unknown
    }

    fn is_valid(&self) -> bool {
        self.seen
    }

    fn build(self) -> Option<Marker> {
        Some(Marker {
            unknown: self.unknown,
        })
    }
}

#[test]
fn test_invalid_builder_not_built() {
    // Only unknown field 9: `build` would succeed, but the builder is not valid.
    let bytes: &[u8] = &[0x48, 0x01];
    assert_eq!(
        Marker::decode(bytes),
        Err(Error::InvalidMessage("builder rejected decoded fields"))
    );

    let bytes: &[u8] = &[0x08, 0x00, 0x48, 0x01];
    let marker = Marker::decode(bytes).unwrap();
    assert_eq!(marker.unknown_fields().get(9), Some(&[WireValue::Varint(1)][..]));
}

#[test]
fn test_unknown_fields_canonicalized() {
    // Two occurrences of unknown field 9, each a varint padded to two bytes.
    let bytes: &[u8] = &[0x08, 0x01, 0x48, 0x81, 0x00, 0x48, 0x82, 0x00];
    let decoded = Person::decode(bytes).unwrap();
    assert_eq!(
        decoded.unknown_fields().get(9),
        Some(&[WireValue::Varint(1), WireValue::Varint(2)][..])
    );
    assert_eq!(
        &decoded.bytes()[..],
        &[0x08, 0x01, 0x48, 0x01, 0x48, 0x02]
    );
}

#[test]
fn test_wire_type_mismatch() {
    // `id` sent as fixed32.
    let bytes: &[u8] = &[0x0D, 0x01, 0x00, 0x00, 0x00];
    assert!(matches!(
        Person::decode(bytes),
        Err(Error::InvalidMessage(_))
    ));

    // `name` is not UTF-8.
    let bytes: &[u8] = &[0x08, 0x01, 0x12, 0x01, 0xFF];
    assert!(matches!(
        Person::decode(bytes),
        Err(Error::InvalidMessage(_))
    ));
}

#[test]
fn test_truncated_message() {
    init_tracing();
    let bytes = sample().bytes();
    for len in 1..bytes.len() {
        let result = Person::decode(bytes.slice(..len));
        match result {
            // Cut exactly between fields: the prefix is itself a valid message.
            Ok(person) => assert_eq!(person.bytes(), bytes.slice(..len)),
            Err(Error::ParseFailed { source, .. }) => {
                assert_eq!(source, ParseError::EndOfBuffer)
            }
            Err(err) => panic!("unexpected error: {err}"),
        }
    }
}

#[test]
fn test_trailing_partial_tag() {
    let bytes: &[u8] = &[0x08, 0x01, 0xC8];
    assert_eq!(
        Person::decode(bytes),
        Err(Error::parse(2, ParseError::EndOfBuffer))
    );
}

#[test]
fn test_payload_limit() {
    let person = Person {
        name: "a long name".to_string(),
        ..Person::new(1)
    };
    let bytes = person.bytes();
    assert_eq!(
        Person::decode_cfg(bytes.clone(), &Config::with_max_payload(4)),
        Err(Error::parse(3, ParseError::InvalidLength(11)))
    );
    assert_eq!(
        Person::decode_cfg(bytes, &Config::with_max_payload(11)).unwrap(),
        person
    );
}

#[test]
fn test_manual_field_loop() {
    // Walk a buffer with the offset-based primitives, as a hand-written decoder would.
    let bytes = sample().bytes();
    let mut offset = 0;
    let mut fields = Vec::new();
    while offset < bytes.len() {
        let (tag, consumed) = decode_tag(&bytes, offset).unwrap();
        offset += consumed;
        let (value, consumed) = read_payload(tag.wire_type(), &bytes, offset).unwrap();
        offset += consumed;
        fields.push((tag.field(), value));
    }
    assert_eq!(offset, bytes.len());
    assert_eq!(fields, sample().fields());
    assert_eq!(
        fields.iter().map(|(_, value)| value.wire_type()).collect::<Vec<_>>(),
        vec![
            WireType::Varint,
            WireType::LengthDelimited,
            WireType::Varint,
            WireType::Fixed32,
            WireType::Varint,
            WireType::LengthDelimited,
            WireType::LengthDelimited,
            WireType::Fixed64,
        ]
    );
}

#[test]
fn test_parallel_decode() {
    let buffers: Vec<Bytes> = (0..8u64).map(|id| Person::new(id).bytes()).collect();
    std::thread::scope(|scope| {
        let handles: Vec<_> = buffers
            .iter()
            .map(|bytes| scope.spawn(move || Person::decode(bytes.clone()).unwrap().id))
            .collect();
        for (id, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), id as u64);
        }
    });
}
