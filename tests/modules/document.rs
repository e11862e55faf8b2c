use binary_json::{doc, Bson, Document};
use pretty_assertions::assert_eq;

#[test]
fn getters_distinguish_absent_from_mistyped() {
    let doc = doc! { "count": 5, "label": "x" };

    assert_eq!(doc.get_i32("count").unwrap(), 5);
    assert_eq!(doc.get_str("label").unwrap(), "x");

    let absent = doc.get_str("missing").unwrap_err();
    assert!(absent.is_value_access_not_present());

    let mistyped = doc.get_str("count").unwrap_err();
    assert!(mistyped.is_value_access_unexpected_type());
}

#[test]
fn nested_getters() {
    let doc = doc! {
        "outer": {
            "inner": { "leaf": 3i64 },
            "xs": [1, 2],
        }
    };
    let outer = doc.get_document("outer").unwrap();
    assert_eq!(outer.get_document("inner").unwrap().get_i64("leaf").unwrap(), 3);
    assert_eq!(outer.get_array("xs").unwrap().len(), 2);
}

#[test]
fn entry_api() {
    let mut doc = doc! { "a": 1 };
    doc.entry("b").or_insert(Bson::Int32(2));
    doc.entry("a").or_insert(Bson::Int32(99));
    assert_eq!(doc, doc! { "a": 1, "b": 2 });
}

#[test]
fn mutation_through_getters() {
    let mut doc = doc! { "xs": [1], "sub": { "n": 1 } };
    doc.get_array_mut("xs").unwrap().push(Bson::Int32(2));
    doc.get_document_mut("sub").unwrap().insert("n", 2);
    assert_eq!(doc, doc! { "xs": [1, 2], "sub": { "n": 2 } });
}

#[test]
fn iteration_is_in_insertion_order() {
    let doc = doc! { "one": 1, "two": 2, "three": 3 };
    let keys: Vec<_> = doc.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, ["one", "two", "three"]);

    let values: Vec<_> = doc.values().cloned().collect();
    assert_eq!(values, [Bson::Int32(1), Bson::Int32(2), Bson::Int32(3)]);
}

#[test]
fn from_iterator_and_extend() {
    let mut doc: Document = vec![("a", 1i32), ("b", 2i32)].into_iter().collect();
    doc.extend(vec![("c", 3i32)]);
    assert_eq!(doc, doc! { "a": 1, "b": 2, "c": 3 });
}
