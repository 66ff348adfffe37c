#![no_main]

use libfuzzer_sys::fuzz_target;
use protowire_codec::{
    wire::{decode_tag, read_payload},
    Error, FieldReader, RangeCfg,
};

fuzz_target!(|data: &[u8]| {
    // The iterator and the offset-based primitives must agree on every input.
    let mut offset = 0;
    for field in FieldReader::new(data, RangeCfg::default()) {
        let manual = decode_tag(data, offset).and_then(|(tag, tag_len)| {
            let (value, payload_len) = read_payload(tag.wire_type(), data, offset + tag_len)?;
            Ok::<_, Error>((tag, value, tag_len + payload_len))
        });
        match (field, manual) {
            (Ok((tag, value)), Ok((manual_tag, manual_value, consumed))) => {
                assert_eq!(tag, manual_tag);
                assert_eq!(value, manual_value);
                offset += consumed;
                assert!(offset <= data.len());
            }
            (Err(err), Err(manual_err)) => {
                assert_eq!(err, manual_err);
                return;
            }
            (field, manual) => panic!("mismatch: {field:?} vs {manual:?}"),
        }
    }
    assert_eq!(offset, data.len());
});
