//! Errors raised while building, encoding, or decoding BSON values.

use hex::FromHexError;
use thiserror::Error;

use crate::spec::ElementType;

/// The result type for all fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur in the `binary-json` crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,

    /// The document key being processed when the error occurred, if any.
    pub key: Option<String>,

    /// The byte offset into the input buffer at which decoding failed, if the
    /// error came from the decoder.
    pub offset: Option<usize>,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(key) = self.key.as_deref() {
            write!(f, "error at key \"{key}\": ")?;
        }
        if let Some(offset) = self.offset {
            write!(f, "error at byte offset {offset}: ")?;
        }
        write!(f, "{}", self.kind)
    }
}

/// The types of errors that can occur in the `binary-json` crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed BSON bytes were encountered.
    #[error("malformed BSON: {message}")]
    #[non_exhaustive]
    MalformedValue { message: String },

    /// Invalid UTF-8 bytes were encountered.
    #[error("invalid UTF-8")]
    Utf8Encoding,

    /// A type tag not defined by the specification was encountered.
    #[error("unrecognized element type tag {tag:#04x}")]
    #[non_exhaustive]
    UnrecognizedElementType { tag: u8 },

    /// A deprecated type tag was encountered. These are valid on the wire but
    /// have no in-memory representation; they are reported distinctly from
    /// malformed input so callers can choose to skip the document or abort.
    #[error("deprecated element type {element:?} is not supported")]
    #[non_exhaustive]
    UnsupportedElementType { element: ElementType },

    /// A map key or C-string payload contained an embedded NUL byte and
    /// cannot be encoded.
    #[error("string contains an embedded NUL byte and cannot be encoded as a cstring: {string:?}")]
    #[non_exhaustive]
    InvalidCString { string: String },

    /// A string, binary payload, or document exceeded the protocol's signed
    /// 32-bit length limit.
    #[error("value of size {size} exceeds the maximum encodable length")]
    #[non_exhaustive]
    SizeExceeded { size: usize },

    /// Containers were nested more deeply than [`MAX_DEPTH`](crate::spec::MAX_DEPTH).
    #[error("containers nested deeper than the maximum of {max}")]
    #[non_exhaustive]
    RecursionLimitExceeded { max: usize },

    /// An error occurred when attempting to access a value in a document.
    #[error("invalid document value access: {kind}")]
    #[non_exhaustive]
    ValueAccess { kind: ValueAccessErrorKind },

    /// An error occurred while parsing an ObjectId.
    #[error("invalid ObjectId: {kind}")]
    #[non_exhaustive]
    ObjectId { kind: ObjectIdErrorKind },

    /// Malformed JSON text was encountered on the `from_json` path. The
    /// message carries `serde_json`'s line and column information.
    #[error("invalid JSON: {message}")]
    #[non_exhaustive]
    Json { message: String },

    /// A [`std::io::Error`] occurred while reading or writing a stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The types of errors that can occur when attempting to access a value in a
/// document. "Absent" and "present with the wrong variant" are deliberately
/// two different outcomes.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum ValueAccessErrorKind {
    /// No value for the specified key was present in the document.
    #[error("the key was not present in the document")]
    NotPresent,

    /// The type of the value in the document did not match the requested type.
    #[error("expected type {expected:?}, got type {actual:?}")]
    #[non_exhaustive]
    UnexpectedType {
        /// The actual type of the value.
        actual: ElementType,

        /// The expected type of the value.
        expected: ElementType,
    },
}

/// The kinds of errors that can occur when parsing an
/// [`ObjectId`](crate::oid::ObjectId) from text.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum ObjectIdErrorKind {
    /// An invalid character was found in the provided hex string. Valid
    /// characters are `0..=9`, `a..=f`, or `A..=F`.
    #[error("invalid character '{c}' encountered at index {index}")]
    #[non_exhaustive]
    InvalidHexStringCharacter { c: char, index: usize },

    /// A hex string with a length other than 24 was encountered.
    #[error("invalid hex string length {length}")]
    #[non_exhaustive]
    InvalidHexStringLength { length: usize },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            key: None,
            offset: None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        ErrorKind::Io(value).into()
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        ErrorKind::Json {
            message: value.to_string(),
        }
        .into()
    }
}

impl Error {
    pub(crate) fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub(crate) fn at_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub(crate) fn malformed(message: impl ToString) -> Self {
        ErrorKind::MalformedValue {
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn value_access_not_present() -> Self {
        ErrorKind::ValueAccess {
            kind: ValueAccessErrorKind::NotPresent,
        }
        .into()
    }

    pub(crate) fn value_access_unexpected_type(actual: ElementType, expected: ElementType) -> Self {
        ErrorKind::ValueAccess {
            kind: ValueAccessErrorKind::UnexpectedType { actual, expected },
        }
        .into()
    }

    // Not a From implementation so that it is not part of the public API.
    pub(crate) fn from_hex_error(error: FromHexError, length: usize) -> Self {
        let kind = match error {
            FromHexError::InvalidHexCharacter { c, index } => {
                ObjectIdErrorKind::InvalidHexStringCharacter { c, index }
            }
            FromHexError::InvalidStringLength | FromHexError::OddLength => {
                ObjectIdErrorKind::InvalidHexStringLength { length }
            }
        };
        ErrorKind::ObjectId { kind }.into()
    }

    pub(crate) fn oid_invalid_length(length: usize) -> Self {
        ErrorKind::ObjectId {
            kind: ObjectIdErrorKind::InvalidHexStringLength { length },
        }
        .into()
    }

    /// Whether this error represents a deprecated-but-recognized element type.
    pub fn is_unsupported_element_type(&self) -> bool {
        matches!(self.kind, ErrorKind::UnsupportedElementType { .. })
    }

    /// Whether this error represents a missing document key.
    pub fn is_value_access_not_present(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ValueAccess {
                kind: ValueAccessErrorKind::NotPresent,
            }
        )
    }

    /// Whether this error represents a document value of the wrong variant.
    pub fn is_value_access_unexpected_type(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ValueAccess {
                kind: ValueAccessErrorKind::UnexpectedType { .. },
            }
        )
    }
}
