//! The in-memory BSON value model.

use std::fmt::{self, Debug, Display};

use crate::{
    datetime::DateTime,
    document::Document,
    error::{Error, Result},
    oid::ObjectId,
    spec::{BinarySubtype, ElementType},
};

/// A BSON array.
pub type Array = Vec<Bson>;

/// The closed set of BSON value variants.
///
/// Equality is structural and variant-exact: values of different variants are
/// never equal, even when a lossy numeric comparison would suggest otherwise
/// (`Int32(5)` is not `Int64(5)`).
#[derive(Clone, Debug, PartialEq)]
pub enum Bson {
    /// Null value
    Null,
    /// Array
    Array(Array),
    /// Embedded document
    Document(Document),
    /// 32-bit integer
    Int32(i32),
    /// 64-bit integer
    Int64(i64),
    /// 64-bit binary floating point
    Double(f64),
    /// Boolean value
    Boolean(bool),
    /// UTF-8 string
    String(String),
    /// UTC datetime, millisecond precision
    DateTime(DateTime),
    /// Internal replication timestamp; not a wall-clock time
    Timestamp(Timestamp),
    /// Binary data with a subtype
    Binary(Binary),
    /// JavaScript code, optionally bound to a scope document
    Code(Code),
    /// 12-byte object identifier
    ObjectId(ObjectId),
    /// Regular expression
    RegularExpression(Regex),
    /// Min-key/max-key sentinel markers; carry no data
    Key(Key),
}

/// A BSON timestamp, used internally for replication ordering. Despite the
/// name this is not a general datetime; see [`DateTime`] for that.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Timestamp {
    /// Seconds since the Unix epoch.
    pub seconds: u32,

    /// Ordinal distinguishing operations within a given second.
    pub ordinal: u32,
}

/// Binary data with a subtype byte.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Binary {
    pub subtype: BinarySubtype,
    pub bytes: Vec<u8>,
}

impl Binary {
    /// Construct generic (subtype 0x00) binary data.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Binary {
        Binary {
            subtype: BinarySubtype::Generic,
            bytes: bytes.into(),
        }
    }

    /// Construct from a base64 string and an optional subtype.
    pub fn from_base64(input: impl AsRef<str>, subtype: impl Into<Option<BinarySubtype>>) -> Result<Binary> {
        let bytes = crate::base64::decode(input.as_ref())
            .map_err(|e| Error::malformed(format!("invalid base64: {}", e)))?;
        let subtype = subtype.into().unwrap_or(BinarySubtype::Generic);
        Ok(Binary { subtype, bytes })
    }
}

impl Debug for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binary")
            .field("subtype", &self.subtype)
            .field("bytes", &format_args!("0x{}", hex::encode(&self.bytes)))
            .finish()
    }
}

/// A string of JavaScript source, optionally bound to a scope document.
///
/// The scope, when present, must itself be a well-formed document; this holds
/// recursively by construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Code {
    pub code: String,
    pub scope: Option<Document>,
}

impl Code {
    /// Scopeless code.
    pub fn new(code: impl Into<String>) -> Code {
        Code {
            code: code.into(),
            scope: None,
        }
    }

    /// Code bound to a scope document.
    pub fn with_scope(code: impl Into<String>, scope: Document) -> Code {
        Code {
            code: code.into(),
            scope: Some(scope),
        }
    }
}

/// A regular expression: a pattern and a string of option characters.
///
/// Neither part may contain a NUL byte; the encoder rejects values that do.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Regex {
    pub pattern: String,
    pub options: String,
}

impl Regex {
    pub fn new(pattern: impl Into<String>, options: impl Into<String>) -> Regex {
        Regex {
            pattern: pattern.into(),
            options: options.into(),
        }
    }
}

/// The min-key/max-key sentinels. They sort before and after every other
/// value respectively and never carry data.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Key {
    Min,
    Max,
}

impl Bson {
    /// The element type tag this value encodes with.
    pub fn element_type(&self) -> ElementType {
        match self {
            Bson::Null => ElementType::Null,
            Bson::Array(..) => ElementType::Array,
            Bson::Document(..) => ElementType::EmbeddedDocument,
            Bson::Int32(..) => ElementType::Int32,
            Bson::Int64(..) => ElementType::Int64,
            Bson::Double(..) => ElementType::Double,
            Bson::Boolean(..) => ElementType::Boolean,
            Bson::String(..) => ElementType::String,
            Bson::DateTime(..) => ElementType::DateTime,
            Bson::Timestamp(..) => ElementType::Timestamp,
            Bson::Binary(..) => ElementType::Binary,
            Bson::Code(Code { scope: None, .. }) => ElementType::JavaScriptCode,
            Bson::Code(Code { scope: Some(_), .. }) => ElementType::JavaScriptCodeWithScope,
            Bson::ObjectId(..) => ElementType::ObjectId,
            Bson::RegularExpression(..) => ElementType::RegularExpression,
            Bson::Key(Key::Min) => ElementType::MinKey,
            Bson::Key(Key::Max) => ElementType::MaxKey,
        }
    }

    /// If this value is a `Double`, return its value. Returns `None` otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Bson::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// If this value is an `Int32`, return its value. Returns `None` otherwise.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Bson::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// If this value is an `Int64`, return its value. Returns `None` otherwise.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Bson::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// If this value is a `String`, return its value. Returns `None` otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Bson::String(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is a `Boolean`, return its value. Returns `None` otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Bson::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// If this value is an `Array`, return a reference to it. Returns `None` otherwise.
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Bson::Array(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is an `Array`, return a mutable reference to it.
    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match self {
            Bson::Array(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is a `Document`, return a reference to it. Returns `None` otherwise.
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Bson::Document(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is a `Document`, return a mutable reference to it.
    pub fn as_document_mut(&mut self) -> Option<&mut Document> {
        match self {
            Bson::Document(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is a `DateTime`, return its value. Returns `None` otherwise.
    pub fn as_datetime(&self) -> Option<DateTime> {
        match self {
            Bson::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    /// If this value is a `Timestamp`, return its value. Returns `None` otherwise.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Bson::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// If this value is a `Binary`, return a reference to it. Returns `None` otherwise.
    pub fn as_binary(&self) -> Option<&Binary> {
        match self {
            Bson::Binary(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is a `Code`, return a reference to it. Returns `None` otherwise.
    pub fn as_code(&self) -> Option<&Code> {
        match self {
            Bson::Code(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is an `ObjectId`, return its value. Returns `None` otherwise.
    pub fn as_object_id(&self) -> Option<ObjectId> {
        match self {
            Bson::ObjectId(v) => Some(*v),
            _ => None,
        }
    }

    /// If this value is a `RegularExpression`, return a reference to it.
    pub fn as_regex(&self) -> Option<&Regex> {
        match self {
            Bson::RegularExpression(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is a `Key` sentinel, return it. Returns `None` otherwise.
    pub fn as_key(&self) -> Option<Key> {
        match self {
            Bson::Key(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether this value is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Bson::Null)
    }
}

impl Display for Bson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bson::Null => f.write_str("null"),
            Bson::Array(arr) => {
                f.write_str("[")?;
                let mut first = true;
                for v in arr {
                    if !first {
                        f.write_str(", ")?;
                    }
                    first = false;
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            }
            Bson::Document(doc) => write!(f, "{}", doc),
            Bson::Int32(v) => write!(f, "{}", v),
            Bson::Int64(v) => write!(f, "{}", v),
            Bson::Double(v) => write!(f, "{}", v),
            Bson::Boolean(v) => write!(f, "{}", v),
            Bson::String(v) => write!(f, "\"{}\"", v),
            Bson::DateTime(v) => write!(f, "Date(\"{}\")", v),
            Bson::Timestamp(Timestamp { seconds, ordinal }) => {
                write!(f, "Timestamp({}, {})", seconds, ordinal)
            }
            Bson::Binary(Binary { subtype, bytes }) => {
                write!(f, "BinData({}, 0x{})", u8::from(*subtype), hex::encode(bytes))
            }
            Bson::Code(Code { code, .. }) => f.write_str(code),
            Bson::ObjectId(id) => write!(f, "ObjectId(\"{}\")", id),
            Bson::RegularExpression(Regex { pattern, options }) => {
                write!(f, "/{}/{}", pattern, options)
            }
            Bson::Key(Key::Min) => f.write_str("MinKey"),
            Bson::Key(Key::Max) => f.write_str("MaxKey"),
        }
    }
}

impl From<f32> for Bson {
    fn from(v: f32) -> Bson {
        Bson::Double(f64::from(v))
    }
}

impl From<f64> for Bson {
    fn from(v: f64) -> Bson {
        Bson::Double(v)
    }
}

impl From<i32> for Bson {
    fn from(v: i32) -> Bson {
        Bson::Int32(v)
    }
}

impl From<i64> for Bson {
    fn from(v: i64) -> Bson {
        Bson::Int64(v)
    }
}

impl From<u32> for Bson {
    fn from(v: u32) -> Bson {
        Bson::Int64(i64::from(v))
    }
}

impl From<bool> for Bson {
    fn from(v: bool) -> Bson {
        Bson::Boolean(v)
    }
}

impl From<&str> for Bson {
    fn from(v: &str) -> Bson {
        Bson::String(v.to_owned())
    }
}

impl From<String> for Bson {
    fn from(v: String) -> Bson {
        Bson::String(v)
    }
}

impl From<&String> for Bson {
    fn from(v: &String) -> Bson {
        Bson::String(v.clone())
    }
}

impl From<Array> for Bson {
    fn from(v: Array) -> Bson {
        Bson::Array(v)
    }
}

impl From<Document> for Bson {
    fn from(v: Document) -> Bson {
        Bson::Document(v)
    }
}

impl From<DateTime> for Bson {
    fn from(v: DateTime) -> Bson {
        Bson::DateTime(v)
    }
}

impl From<Timestamp> for Bson {
    fn from(v: Timestamp) -> Bson {
        Bson::Timestamp(v)
    }
}

impl From<Binary> for Bson {
    fn from(v: Binary) -> Bson {
        Bson::Binary(v)
    }
}

impl From<Code> for Bson {
    fn from(v: Code) -> Bson {
        Bson::Code(v)
    }
}

impl From<ObjectId> for Bson {
    fn from(v: ObjectId) -> Bson {
        Bson::ObjectId(v)
    }
}

impl From<Regex> for Bson {
    fn from(v: Regex) -> Bson {
        Bson::RegularExpression(v)
    }
}

impl From<Key> for Bson {
    fn from(v: Key) -> Bson {
        Bson::Key(v)
    }
}

impl<T: Into<Bson>> From<Option<T>> for Bson {
    fn from(v: Option<T>) -> Bson {
        match v {
            Some(v) => v.into(),
            None => Bson::Null,
        }
    }
}

impl<T: Into<Bson>> FromIterator<T> for Bson {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Bson::Array(iter.into_iter().map(Into::into).collect())
    }
}
