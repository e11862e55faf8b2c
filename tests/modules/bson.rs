use binary_json::{bson, doc, Bson, Code, DateTime, Key, Timestamp};
use binary_json::spec::ElementType;

#[test]
fn from_impls_pick_the_expected_variant() {
    assert_eq!(Bson::from(1.5f64), Bson::Double(1.5));
    assert_eq!(Bson::from(1.5f32), Bson::Double(1.5));
    assert_eq!(Bson::from(17i32), Bson::Int32(17));
    assert_eq!(Bson::from(17i64), Bson::Int64(17));
    assert_eq!(Bson::from(17u32), Bson::Int64(17));
    assert_eq!(Bson::from(true), Bson::Boolean(true));
    assert_eq!(Bson::from("hi"), Bson::String("hi".to_owned()));
    assert_eq!(Bson::from(Key::Max), Bson::Key(Key::Max));
}

#[test]
fn accessors_are_variant_exact() {
    let value = Bson::Int32(7);
    assert_eq!(value.as_i32(), Some(7));
    assert_eq!(value.as_i64(), None);
    assert_eq!(value.as_f64(), None);

    let value = Bson::from("text");
    assert_eq!(value.as_str(), Some("text"));
    assert_eq!(value.as_i32(), None);
}

#[test]
fn datetime_equality_is_millisecond_truncated() {
    use std::time::{Duration, SystemTime};

    let base = SystemTime::UNIX_EPOCH + Duration::new(1_000, 123_000_000);
    let later = base + Duration::from_nanos(400_000);
    assert_ne!(base, later);
    assert_eq!(
        Bson::DateTime(DateTime::from_system_time(base)),
        Bson::DateTime(DateTime::from_system_time(later)),
    );
}

#[test]
fn timestamp_is_not_a_datetime() {
    let ts = Bson::Timestamp(Timestamp {
        seconds: 1_000,
        ordinal: 0,
    });
    assert_eq!(ts.element_type(), ElementType::Timestamp);
    assert_eq!(ts.as_datetime(), None);
}

#[test]
fn code_scope_selects_the_element_type() {
    assert_eq!(
        bson!(Code::new("f()")).element_type(),
        ElementType::JavaScriptCode
    );
    assert_eq!(
        bson!(Code::with_scope("f()", doc! { "x": 1 })).element_type(),
        ElementType::JavaScriptCodeWithScope
    );
}

#[test]
fn collected_iterators_become_arrays() {
    let value: Bson = (1..=3i32).collect();
    assert_eq!(value, bson!([1, 2, 3]));
}
