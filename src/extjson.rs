//! Conversion between the value model and JSON text.
//!
//! # Mapping
//!
//! JSON cannot natively express most BSON types, so the bridge uses a
//! canonical marker-key convention for them (modeled on the Extended JSON
//! key set) and maps everything else natively:
//!
//! | BSON variant | JSON representation |
//! |---|---|
//! | `Null` / `Boolean` / `String` | the native JSON value |
//! | `Int32` / `Int64` / `Double` | a JSON number (see below) |
//! | `Array` / `Document` | a JSON array / object |
//! | `DateTime` | `{"$date": <milliseconds since epoch>}` |
//! | `ObjectId` | `{"$oid": "<24 hex chars>"}` |
//! | `Binary` | `{"$binary": {"base64": "...", "subType": "<2 hex chars>"}}` |
//! | `Code` | `{"$code": "..."}`, plus `"$scope"` when a scope is present |
//! | `Timestamp` | `{"$timestamp": {"t": <seconds>, "i": <ordinal>}}` |
//! | `RegularExpression` | `{"$regularExpression": {"pattern": "...", "options": "..."}}` |
//! | `Key::Min` / `Key::Max` | `{"$minKey": 1}` / `{"$maxKey": 1}` |
//!
//! Parsing reverses the table exactly: an object matching a marker form
//! reconstructs the original variant, a marker key with a malformed payload
//! is an error (never silently demoted), and any other object becomes a
//! plain [`Document`].
//!
//! # Fidelity
//!
//! The mapping is lossless for every variant except integers, which collapse
//! into plain JSON numbers by design. Parsing maps a JSON integer back to
//! `Int32` when it fits and `Int64` otherwise, so an `Int64` whose value fits
//! in 32 bits comes back as `Int32`; JSON consumers that treat all numbers as
//! doubles will additionally lose integer precision beyond 2^53. Doubles keep
//! their variant (their JSON text always carries a decimal point or
//! exponent); non-finite doubles round-trip through
//! `{"$numberDouble": "NaN" | "Infinity" | "-Infinity"}`.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::{
    base64,
    bson::{Binary, Bson, Code, Key, Regex, Timestamp},
    datetime::DateTime,
    document::Document,
    error::{Error, Result},
    oid::ObjectId,
};

pub(crate) fn document_to_json(doc: &Document) -> String {
    Value::from(Bson::Document(doc.clone())).to_string()
}

pub(crate) fn document_from_json(json: &str) -> Result<Document> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Object(map) => match object_to_bson(map)? {
            Bson::Document(doc) => Ok(doc),
            other => Err(Error::malformed(format!(
                "top-level JSON object is a {:?} marker, not a document",
                other.element_type()
            ))),
        },
        _ => Err(Error::malformed("top-level JSON value must be an object")),
    }
}

/// Render the value as JSON per the [mapping](self#mapping).
impl From<Bson> for Value {
    fn from(bson: Bson) -> Self {
        match bson {
            Bson::Null => Value::Null,
            Bson::Boolean(b) => json!(b),
            Bson::Int32(i) => json!(i),
            Bson::Int64(i) => json!(i),
            Bson::Double(d) if d.is_nan() => {
                json!({ "$numberDouble": (if d.is_sign_negative() { "-NaN" } else { "NaN" }) })
            }
            Bson::Double(d) if d.is_infinite() => {
                json!({ "$numberDouble": (if d.is_sign_negative() { "-Infinity" } else { "Infinity" }) })
            }
            Bson::Double(d) => json!(d),
            Bson::String(s) => json!(s),
            Bson::Array(arr) => Value::Array(arr.into_iter().map(Value::from).collect()),
            Bson::Document(doc) => Value::Object(
                doc.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
            Bson::DateTime(dt) => json!({ "$date": dt.timestamp_millis() }),
            Bson::ObjectId(id) => json!({ "$oid": id.to_hex() }),
            Bson::Binary(Binary { subtype, bytes }) => json!({
                "$binary": {
                    "base64": base64::encode(&bytes),
                    "subType": hex::encode([u8::from(subtype)]),
                }
            }),
            Bson::Code(Code { code, scope: None }) => json!({ "$code": code }),
            Bson::Code(Code {
                code,
                scope: Some(scope),
            }) => json!({
                "$code": code,
                "$scope": Value::from(Bson::Document(scope)),
            }),
            Bson::Timestamp(Timestamp { seconds, ordinal }) => json!({
                "$timestamp": { "t": seconds, "i": ordinal }
            }),
            Bson::RegularExpression(Regex { pattern, options }) => json!({
                "$regularExpression": { "pattern": pattern, "options": options }
            }),
            Bson::Key(Key::Min) => json!({ "$minKey": 1 }),
            Bson::Key(Key::Max) => json!({ "$maxKey": 1 }),
        }
    }
}

/// Parse a JSON value per the [mapping](self#mapping).
impl TryFrom<Value> for Bson {
    type Error = Error;

    fn try_from(value: Value) -> Result<Bson> {
        Ok(match value {
            Value::Null => Bson::Null,
            Value::Bool(b) => Bson::Boolean(b),
            Value::Number(n) => number_to_bson(n),
            Value::String(s) => Bson::String(s),
            Value::Array(arr) => Bson::Array(
                arr.into_iter()
                    .map(Bson::try_from)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Object(map) => object_to_bson(map)?,
        })
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ObjectIdBody {
    #[serde(rename = "$oid")]
    oid: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DateBody {
    #[serde(rename = "$date")]
    millis: i64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BinaryBody {
    #[serde(rename = "$binary")]
    body: BinaryFields,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BinaryFields {
    base64: String,
    #[serde(rename = "subType")]
    subtype: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CodeBody {
    #[serde(rename = "$code")]
    code: String,
    #[serde(rename = "$scope")]
    scope: Option<Value>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TimestampBody {
    #[serde(rename = "$timestamp")]
    body: TimestampFields,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TimestampFields {
    t: u32,
    i: u32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RegexBody {
    #[serde(rename = "$regularExpression")]
    body: RegexFields,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RegexFields {
    pattern: String,
    options: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MinKeyBody {
    #[serde(rename = "$minKey")]
    value: i64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MaxKeyBody {
    #[serde(rename = "$maxKey")]
    value: i64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DoubleBody {
    #[serde(rename = "$numberDouble")]
    value: String,
}

fn parse_marker<T: serde::de::DeserializeOwned>(map: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(map)).map_err(Error::from)
}

fn object_to_bson(map: Map<String, Value>) -> Result<Bson> {
    if map.contains_key("$oid") {
        let body: ObjectIdBody = parse_marker(map)?;
        return Ok(Bson::ObjectId(ObjectId::parse_str(&body.oid)?));
    }
    if map.contains_key("$date") {
        let body: DateBody = parse_marker(map)?;
        return Ok(Bson::DateTime(DateTime::from_millis(body.millis)));
    }
    if map.contains_key("$binary") {
        let body: BinaryBody = parse_marker(map)?;
        if body.body.subtype.len() != 2 {
            return Err(Error::malformed(format!(
                "binary subType must be 2 hex characters, got {:?}",
                body.body.subtype
            )));
        }
        let subtype = u8::from_str_radix(&body.body.subtype, 16)
            .map_err(|_| Error::malformed(format!("invalid binary subType {:?}", body.body.subtype)))?;
        let binary = Binary::from_base64(&body.body.base64, crate::spec::BinarySubtype::from(subtype))?;
        return Ok(Bson::Binary(binary));
    }
    if map.contains_key("$code") {
        let body: CodeBody = parse_marker(map)?;
        let scope = match body.scope {
            None => None,
            Some(value) => match Bson::try_from(value)? {
                Bson::Document(doc) => Some(doc),
                _ => return Err(Error::malformed("$scope must be a JSON object")),
            },
        };
        return Ok(Bson::Code(Code {
            code: body.code,
            scope,
        }));
    }
    if map.contains_key("$timestamp") {
        let body: TimestampBody = parse_marker(map)?;
        return Ok(Bson::Timestamp(Timestamp {
            seconds: body.body.t,
            ordinal: body.body.i,
        }));
    }
    if map.contains_key("$regularExpression") {
        let body: RegexBody = parse_marker(map)?;
        return Ok(Bson::RegularExpression(Regex {
            pattern: body.body.pattern,
            options: body.body.options,
        }));
    }
    if map.contains_key("$minKey") {
        let body: MinKeyBody = parse_marker(map)?;
        if body.value != 1 {
            return Err(Error::malformed(format!("$minKey must be 1, got {}", body.value)));
        }
        return Ok(Bson::Key(Key::Min));
    }
    if map.contains_key("$maxKey") {
        let body: MaxKeyBody = parse_marker(map)?;
        if body.value != 1 {
            return Err(Error::malformed(format!("$maxKey must be 1, got {}", body.value)));
        }
        return Ok(Bson::Key(Key::Max));
    }
    if map.contains_key("$numberDouble") {
        let body: DoubleBody = parse_marker(map)?;
        let d = match body.value.as_str() {
            "NaN" => f64::NAN,
            "-NaN" => -f64::NAN,
            "Infinity" => f64::INFINITY,
            "-Infinity" => f64::NEG_INFINITY,
            other => other.parse().map_err(|_| {
                Error::malformed(format!("invalid $numberDouble value {:?}", other))
            })?,
        };
        return Ok(Bson::Double(d));
    }

    // no marker keys: an ordinary JSON object becomes a plain document
    let mut doc = Document::new();
    for (k, v) in map {
        doc.insert(k, Bson::try_from(v)?);
    }
    Ok(Bson::Document(doc))
}

// Integral numbers prefer the narrowest integer variant; everything else is a
// double. This is the documented collapse of the three numeric variants.
fn number_to_bson(n: serde_json::Number) -> Bson {
    if let Some(i) = n.as_i64() {
        match i32::try_from(i) {
            Ok(i) => Bson::Int32(i),
            Err(_) => Bson::Int64(i),
        }
    } else if let Some(u) = n.as_u64() {
        // only reachable for integers beyond i64::MAX
        Bson::Double(u as f64)
    } else {
        Bson::Double(n.as_f64().unwrap_or(f64::NAN))
    }
}
