use binary_json::{doc, Binary, Bson, Code, DateTime, Document, Key, Regex, Timestamp};
use binary_json::oid::ObjectId;
use binary_json::spec::BinarySubtype;
use pretty_assertions::assert_eq;
use proptest::collection::vec as prop_vec;
use proptest::prelude::*;
use serde_json::{json, Value};

#[test]
fn native_types_map_natively() {
    let doc = doc! {
        "null": null,
        "bool": false,
        "i32": 42,
        "i64": 9_007_199_254_740_993i64,
        "double": 2.5,
        "string": "hi",
        "array": [1, "two"],
        "doc": { "nested": true },
    };
    let value: Value = serde_json::from_str(&doc.to_json()).unwrap();
    assert_eq!(
        value,
        json!({
            "null": null,
            "bool": false,
            "i32": 42,
            "i64": 9_007_199_254_740_993i64,
            "double": 2.5,
            "string": "hi",
            "array": [1, "two"],
            "doc": { "nested": true },
        })
    );
}

#[test]
fn marker_representations() {
    let id = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
    let doc = doc! {
        "id": id,
        "when": DateTime::from_millis(1_590_972_160_292),
        "blob": Binary { subtype: BinarySubtype::Generic, bytes: vec![1, 2, 3] },
        "ts": Timestamp { seconds: 10, ordinal: 2 },
        "re": Regex::new("ab+c", "i"),
        "min": Key::Min,
    };
    let value: Value = serde_json::from_str(&doc.to_json()).unwrap();
    assert_eq!(
        value,
        json!({
            "id": { "$oid": "507f1f77bcf86cd799439011" },
            "when": { "$date": 1_590_972_160_292i64 },
            "blob": { "$binary": { "base64": "AQID", "subType": "00" } },
            "ts": { "$timestamp": { "t": 10, "i": 2 } },
            "re": { "$regularExpression": { "pattern": "ab+c", "options": "i" } },
            "min": { "$minKey": 1 },
        })
    );
}

#[test]
fn markers_parse_back_to_exact_variants() {
    let text = r#"{
        "id": { "$oid": "507f1f77bcf86cd799439011" },
        "when": { "$date": 1590972160292 },
        "blob": { "$binary": { "base64": "AQID", "subType": "80" } },
        "code": { "$code": "f()", "$scope": { "x": 1 } },
        "plain": { "nested": { "$comment": "not a marker" } }
    }"#;
    let doc = Document::from_json(text).unwrap();

    assert_eq!(
        doc.get_object_id("id").unwrap(),
        ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap()
    );
    assert_eq!(
        doc.get_datetime("when").unwrap(),
        DateTime::from_millis(1_590_972_160_292)
    );
    assert_eq!(
        doc.get_binary("blob").unwrap(),
        &Binary {
            subtype: BinarySubtype::UserDefined(0x80),
            bytes: vec![1, 2, 3],
        }
    );
    assert_eq!(
        doc.get("code"),
        Some(&Bson::Code(Code::with_scope("f()", doc! { "x": 1 })))
    );
    // an object that merely contains a "$"-prefixed key is still a document
    assert!(doc
        .get_document("plain")
        .unwrap()
        .get_document("nested")
        .is_ok());
}

#[test]
fn json_number_collapse() {
    let doc = Document::from_json(r#"{"a": 5, "b": 3000000000, "c": 2.5}"#).unwrap();
    assert_eq!(doc.get("a"), Some(&Bson::Int32(5)));
    assert_eq!(doc.get("b"), Some(&Bson::Int64(3_000_000_000)));
    assert_eq!(doc.get("c"), Some(&Bson::Double(2.5)));
}

#[test]
fn non_finite_doubles_round_trip_through_markers() {
    let doc = doc! { "inf": f64::INFINITY, "ninf": f64::NEG_INFINITY };
    let parsed = Document::from_json(&doc.to_json()).unwrap();
    assert_eq!(parsed, doc);

    let nan = Document::from_json(r#"{"nan": {"$numberDouble": "NaN"}}"#).unwrap();
    assert!(nan.get_f64("nan").unwrap().is_nan());
}

fn arb_key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

// Trees whose numeric variants survive the documented JSON number collapse:
// Int32 always does, Int64 only outside the i32 range, and any Double except
// NaN (which is never equal to itself).
fn arb_json_faithful_bson() -> impl Strategy<Value = Bson> {
    let scalar = prop_oneof![
        Just(Bson::Null),
        any::<bool>().prop_map(Bson::Boolean),
        any::<i32>().prop_map(Bson::Int32),
        any::<i64>()
            .prop_filter("stays Int64 only outside i32 range", |i| {
                i32::try_from(*i).is_err()
            })
            .prop_map(Bson::Int64),
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
    leaf.prop_recursive(3, 32, 5, |inner| {
        prop_oneof![
            prop_vec(inner.clone(), 0..5).prop_map(Bson::Array),
            prop_vec((arb_key(), inner.clone()), 0..5)
                .prop_map(|entries| Bson::Document(entries.into_iter().collect())),
            ("[a-z ]{0,8}", prop_vec((arb_key(), inner), 0..3)).prop_map(|(code, scope)| {
                Bson::Code(Code::with_scope(code, scope.into_iter().collect()))
            }),
        ]
    })
}

proptest! {
    #[test]
    fn json_round_trip(entries in prop_vec((arb_key(), arb_json_faithful_bson()), 0..6)) {
        let doc: Document = entries.into_iter().collect();
        let parsed = Document::from_json(&doc.to_json()).unwrap();
        prop_assert_eq!(parsed, doc);
    }
}
