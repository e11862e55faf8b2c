use binary_json::{doc, Binary, Bson, Code, DateTime, Document, Key, Regex, Timestamp};
use binary_json::oid::ObjectId;
use binary_json::spec::{BinarySubtype, ElementType};
use pretty_assertions::assert_eq;
use proptest::collection::vec as prop_vec;
use proptest::prelude::*;

fn round_trip(doc: &Document) -> Document {
    Document::from_bytes(doc.to_bytes().unwrap()).unwrap()
}

#[test]
fn scenario_ada() {
    let doc = doc! {
        "name": "Ada",
        "age": 36,
        "tags": ["math", "cs"],
    };
    let bytes = doc.to_bytes().unwrap();
    let decoded = Document::from_bytes(&bytes).unwrap();

    assert_eq!(decoded.get_str("name").unwrap(), "Ada");
    assert_eq!(decoded.get_i32("age").unwrap(), 36);
    assert_eq!(
        decoded.get_array("tags").unwrap(),
        &vec![Bson::from("math"), Bson::from("cs")]
    );

    assert_eq!(decoded.get("name").unwrap().element_type(), ElementType::String);
    assert_eq!(decoded.get("age").unwrap().element_type(), ElementType::Int32);
    assert_eq!(decoded.get("tags").unwrap().element_type(), ElementType::Array);
    assert_eq!(decoded, doc);
}

#[test]
fn every_variant_round_trips() {
    let doc = doc! {
        "null": null,
        "bool": true,
        "i32": i32::MIN,
        "i64": i64::MAX,
        "double": -0.5,
        "string": "test你好吗",
        "array": [1, "two", [3.0], { "four": 4 }],
        "doc": { "nested": { "deeper": null } },
        "date": DateTime::from_millis(-62_135_596_800_000),
        "timestamp": Timestamp { seconds: 4_000_000_000, ordinal: 3_000_000_000 },
        "binary": Binary { subtype: BinarySubtype::UserDefined(0x92), bytes: vec![0, 1, 255] },
        "binary_old": Binary { subtype: BinarySubtype::BinaryOld, bytes: vec![9, 8, 7] },
        "code": Code::new("function() { return 1; }"),
        "code_scoped": Code::with_scope("f", doc! { "captured": [true] }),
        "oid": ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap(),
        "regex": Regex::new("^\\d+(\\.\\d+)?$", "imx"),
        "min": Key::Min,
        "max": Key::Max,
        "empty_doc": {},
        "empty_array": [],
        "empty_string": "",
    };
    assert_eq!(round_trip(&doc), doc);
}

#[test]
fn array_encodes_with_ordinal_keys_and_decodes_as_array() {
    let doc = doc! { "a": [1, 2, 3] };
    let bytes = doc.to_bytes().unwrap();

    // inner array document: int32 elements keyed "0", "1", "2" in order
    let expected_elements: Vec<u8> = [
        &[0x10, b'0', 0][..],
        &1i32.to_le_bytes(),
        &[0x10, b'1', 0],
        &2i32.to_le_bytes(),
        &[0x10, b'2', 0],
        &3i32.to_le_bytes(),
    ]
    .concat();
    assert!(
        bytes.windows(expected_elements.len()).any(|w| w == expected_elements),
        "array elements must be keyed by sequential ordinals"
    );

    let decoded = Document::from_bytes(&bytes).unwrap();
    assert!(matches!(decoded.get("a"), Some(Bson::Array(_))));
    assert_eq!(decoded, doc);
}

#[test]
fn length_prefix_equals_total_length() {
    let docs = [
        doc! {},
        doc! { "a": 1 },
        doc! { "nested": { "xs": [1.5, "two", null] }, "flag": false },
    ];
    for doc in docs {
        let bytes = doc.to_bytes().unwrap();
        let prefix = i32::from_le_bytes(bytes[0..4].try_into().unwrap());
        assert_eq!(prefix as usize, bytes.len());
    }
}

#[test]
fn encoding_is_byte_stable() {
    let doc = doc! { "b": 2, "a": 1 };
    assert_eq!(doc.to_bytes().unwrap(), round_trip(&doc).to_bytes().unwrap());
}

#[test]
fn writer_and_reader_interop() {
    let doc = doc! { "payload": [1, 2, 3] };
    let mut buf = Vec::new();
    doc.to_writer(&mut buf).unwrap();
    assert_eq!(buf, doc.to_bytes().unwrap());
    let decoded = Document::from_reader(&mut std::io::Cursor::new(buf)).unwrap();
    assert_eq!(decoded, doc);
}

fn arb_key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

fn arb_bson() -> impl Strategy<Value = Bson> {
    let scalar = prop_oneof![
        Just(Bson::Null),
        any::<bool>().prop_map(Bson::Boolean),
        any::<i32>().prop_map(Bson::Int32),
        any::<i64>().prop_map(Bson::Int64),
        any::<f64>()
            .prop_filter("NaN is never equal to itself", |f| !f.is_nan())
            .prop_map(Bson::Double),
        "\\PC{0,8}".prop_map(Bson::String),
    ];
    let special = prop_oneof![
        any::<i64>().prop_map(|ms| Bson::DateTime(DateTime::from_millis(ms))),
        (any::<u32>(), any::<u32>()).prop_map(|(seconds, ordinal)| Bson::Timestamp(Timestamp {
            seconds,
            ordinal
        })),
        any::<[u8; 12]>().prop_map(|b| Bson::ObjectId(ObjectId::from_bytes(b))),
        (any::<u8>(), prop_vec(any::<u8>(), 0..24)).prop_map(|(subtype, bytes)| {
            Bson::Binary(Binary {
                subtype: BinarySubtype::from(subtype),
                bytes,
            })
        }),
        ("[a-z ]{0,8}", "[imsx]{0,4}")
            .prop_map(|(pattern, options)| Bson::RegularExpression(Regex::new(pattern, options))),
        "[a-z(){} ]{0,16}".prop_map(|code| Bson::Code(Code::new(code))),
        prop_oneof![Just(Key::Min), Just(Key::Max)].prop_map(Bson::Key),
    ];
    let leaf = prop_oneof![scalar, special];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop_vec(inner.clone(), 0..6).prop_map(Bson::Array),
            prop_vec((arb_key(), inner.clone()), 0..6)
                .prop_map(|entries| Bson::Document(entries.into_iter().collect())),
            ("[a-z ]{0,8}", prop_vec((arb_key(), inner), 0..4)).prop_map(|(code, scope)| {
                Bson::Code(Code::with_scope(code, scope.into_iter().collect()))
            }),
        ]
    })
}

proptest! {
    #[test]
    fn arbitrary_trees_round_trip(entries in prop_vec((arb_key(), arb_bson()), 0..8)) {
        let doc: Document = entries.into_iter().collect();
        let bytes = doc.to_bytes().unwrap();
        prop_assert_eq!(Document::from_bytes(&bytes).unwrap(), doc);
    }
}
