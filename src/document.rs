//! A BSON document represented as an associative map with insertion ordering.

use std::{
    fmt::{self, Debug, Display, Formatter},
    io::{Read, Write},
    iter::FromIterator,
};

use ahash::RandomState;
use indexmap::IndexMap;

pub use indexmap::map::{Entry, IntoIter, Iter, IterMut, Keys, Values, ValuesMut};

use crate::{
    bson::{Array, Binary, Bson, Timestamp},
    datetime::DateTime,
    decoder, encoder, extjson,
    error::{Error, Result},
    oid::ObjectId,
    spec::ElementType,
};

/// A mapping from string keys to [`Bson`] values.
///
/// Keys are unique; inserting under an existing key replaces the value in
/// place. Insertion order is preserved so that a document re-encodes to the
/// same bytes it decoded from, but two documents holding the same entries in
/// different orders still compare equal.
#[derive(Clone, PartialEq, Default)]
pub struct Document {
    inner: IndexMap<String, Bson, RandomState>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Document {
        Document {
            inner: IndexMap::default(),
        }
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear()
    }

    /// Insert a key/value pair, returning the previous value for the key if
    /// one was present. An existing key keeps its position in the document.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Bson>) -> Option<Bson> {
        self.inner.insert(key.into(), value.into())
    }

    /// Remove the value for `key`, preserving the order of the remaining
    /// entries.
    pub fn remove(&mut self, key: &str) -> Option<Bson> {
        self.inner.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Get a reference to the value for `key`, if it is present.
    pub fn get(&self, key: &str) -> Option<&Bson> {
        self.inner.get(key)
    }

    /// Get a mutable reference to the value for `key`, if it is present.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Bson> {
        self.inner.get_mut(key)
    }

    pub fn entry(&mut self, key: impl Into<String>) -> Entry<'_, String, Bson> {
        self.inner.entry(key.into())
    }

    pub fn iter(&self) -> Iter<'_, String, Bson> {
        self.inner.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, String, Bson> {
        self.inner.iter_mut()
    }

    pub fn keys(&self) -> Keys<'_, String, Bson> {
        self.inner.keys()
    }

    pub fn values(&self) -> Values<'_, String, Bson> {
        self.inner.values()
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, String, Bson> {
        self.inner.values_mut()
    }

    fn typed_get<'a, T>(
        &'a self,
        key: &str,
        expected: ElementType,
        f: impl FnOnce(&'a Bson) -> Option<T>,
    ) -> Result<T> {
        let value = self
            .get(key)
            .ok_or_else(|| Error::value_access_not_present().with_key(key))?;
        let element_type = value.element_type();
        f(value).ok_or_else(|| {
            Error::value_access_unexpected_type(element_type, expected).with_key(key)
        })
    }

    /// Get the `Double` value for `key`. Reports a missing key and a value of
    /// the wrong variant as two distinct errors.
    pub fn get_f64(&self, key: &str) -> Result<f64> {
        self.typed_get(key, ElementType::Double, Bson::as_f64)
    }

    /// Get the `Int32` value for `key`.
    pub fn get_i32(&self, key: &str) -> Result<i32> {
        self.typed_get(key, ElementType::Int32, Bson::as_i32)
    }

    /// Get the `Int64` value for `key`.
    pub fn get_i64(&self, key: &str) -> Result<i64> {
        self.typed_get(key, ElementType::Int64, Bson::as_i64)
    }

    /// Get the `Boolean` value for `key`.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.typed_get(key, ElementType::Boolean, Bson::as_bool)
    }

    /// Get the `String` value for `key`.
    pub fn get_str(&self, key: &str) -> Result<&str> {
        self.typed_get(key, ElementType::String, Bson::as_str)
    }

    /// Get the `Array` value for `key`.
    pub fn get_array(&self, key: &str) -> Result<&Array> {
        self.typed_get(key, ElementType::Array, Bson::as_array)
    }

    /// Get a mutable reference to the `Array` value for `key`.
    pub fn get_array_mut(&mut self, key: &str) -> Result<&mut Array> {
        match self.get_mut(key) {
            None => Err(Error::value_access_not_present().with_key(key)),
            Some(Bson::Array(arr)) => Ok(arr),
            Some(other) => Err(Error::value_access_unexpected_type(
                other.element_type(),
                ElementType::Array,
            )
            .with_key(key)),
        }
    }

    /// Get the `Document` value for `key`.
    pub fn get_document(&self, key: &str) -> Result<&Document> {
        self.typed_get(key, ElementType::EmbeddedDocument, Bson::as_document)
    }

    /// Get a mutable reference to the `Document` value for `key`.
    pub fn get_document_mut(&mut self, key: &str) -> Result<&mut Document> {
        match self.get_mut(key) {
            None => Err(Error::value_access_not_present().with_key(key)),
            Some(Bson::Document(doc)) => Ok(doc),
            Some(other) => Err(Error::value_access_unexpected_type(
                other.element_type(),
                ElementType::EmbeddedDocument,
            )
            .with_key(key)),
        }
    }

    /// Get the `DateTime` value for `key`.
    pub fn get_datetime(&self, key: &str) -> Result<DateTime> {
        self.typed_get(key, ElementType::DateTime, Bson::as_datetime)
    }

    /// Get the `Timestamp` value for `key`.
    pub fn get_timestamp(&self, key: &str) -> Result<Timestamp> {
        self.typed_get(key, ElementType::Timestamp, Bson::as_timestamp)
    }

    /// Get the `Binary` value for `key`.
    pub fn get_binary(&self, key: &str) -> Result<&Binary> {
        self.typed_get(key, ElementType::Binary, Bson::as_binary)
    }

    /// Get the `ObjectId` value for `key`.
    pub fn get_object_id(&self, key: &str) -> Result<ObjectId> {
        self.typed_get(key, ElementType::ObjectId, Bson::as_object_id)
    }

    /// Encode into the binary wire format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encoder::encode_document(self)
    }

    /// Decode a single document from the binary wire format. The buffer must
    /// contain exactly one document.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Document> {
        decoder::decode_document(bytes.as_ref())
    }

    /// Encode into the binary wire format, writing to `writer`.
    pub fn to_writer(&self, writer: &mut impl Write) -> Result<()> {
        encoder::encode_document_to_writer(self, writer)
    }

    /// Decode a single document from an [`io::Read`](std::io::Read) source,
    /// consuming exactly the document's declared length.
    pub fn from_reader(reader: &mut impl Read) -> Result<Document> {
        decoder::decode_document_from_reader(reader)
    }

    /// Render as JSON text using the documented
    /// [mapping](crate::extjson#mapping).
    pub fn to_json(&self) -> String {
        extjson::document_to_json(self)
    }

    /// Parse JSON text into a document, reconstructing BSON-only types from
    /// the documented [mapping](crate::extjson#mapping). The top-level JSON
    /// value must be an object.
    pub fn from_json(json: &str) -> Result<Document> {
        extjson::document_from_json(json)
    }
}

impl Display for Document {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        fmt.write_str("{")?;

        let mut first = true;
        for (k, v) in self {
            if first {
                first = false;
                fmt.write_str(" ")?;
            } else {
                fmt.write_str(", ")?;
            }
            write!(fmt, "{}: {}", k, v)?;
        }

        write!(fmt, "{}}}", if self.is_empty() { "" } else { " " })
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Document(")?;
        f.debug_map().entries(self.iter()).finish()?;
        f.write_str(")")
    }
}

impl IntoIterator for Document {
    type Item = (String, Bson);
    type IntoIter = IntoIter<String, Bson>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Bson);
    type IntoIter = Iter<'a, String, Bson>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl<K: Into<String>, V: Into<Bson>> FromIterator<(K, V)> for Document {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut doc = Document::new();
        doc.extend(iter);
        doc
    }
}

impl<K: Into<String>, V: Into<Bson>> Extend<(K, V)> for Document {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}
