use binary_json::{bson, doc, Bson, Document};

#[test]
fn empty_forms() {
    assert_eq!(doc! {}, Document::new());
    assert_eq!(bson!([]), Bson::Array(vec![]));
    assert_eq!(bson!({}), Bson::Document(Document::new()));
    assert_eq!(bson!(null), Bson::Null);
}

#[test]
fn nested_literals() {
    let value = bson!({
        "code": 200,
        "success": true,
        "payload": {
            "list": [1, null, "three", [4.0], { "five": 5i64 }],
        },
    });
    let doc = value.as_document().unwrap();
    assert_eq!(doc.get_i32("code").unwrap(), 200);
    assert!(doc.get_bool("success").unwrap());
    let list = doc
        .get_document("payload")
        .unwrap()
        .get_array("list")
        .unwrap();
    assert_eq!(list.len(), 5);
    assert_eq!(list[1], Bson::Null);
    assert_eq!(list[4], bson!({ "five": 5i64 }));
}

#[test]
fn trailing_commas_and_parens() {
    let doc = doc! {
        "a": (1 + 1),
        "b": [1, 2,],
    };
    assert_eq!(doc.get_i32("a").unwrap(), 2);
    assert_eq!(doc.get_array("b").unwrap().len(), 2);
}

#[test]
fn expressions_as_keys_and_values() {
    let key = format!("k{}", 1);
    let value = 40 + 2;
    let doc = doc! { key.as_str(): value, "lit": "v" };
    assert_eq!(doc.get_i32("k1").unwrap(), 42);
    assert_eq!(doc.get_str("lit").unwrap(), "v");
}

#[test]
fn existing_values_embed_unchanged() {
    let inner = doc! { "x": 1 };
    let all = doc! { "inner": inner.clone(), "copy": (inner.clone()) };
    assert_eq!(all.get_document("inner").unwrap(), &inner);
    assert_eq!(all.get_document("copy").unwrap(), &inner);
}
