//! Module containing functionality related to BSON ObjectIds.

use std::{fmt, str::FromStr};

use crate::{
    context::Context,
    error::{Error, Result},
};

/// A 12-byte BSON ObjectId: a 4-byte big-endian Unix timestamp in seconds,
/// 5 bytes of machine/process identity, and a 3-byte big-endian counter that
/// increments per generation and starts at an unpredictable value.
///
/// The identifier is generated once at construction from a [`Context`] and is
/// immutable afterwards. Its textual form is a fixed 24-character lowercase
/// hex string, which is also the only input [`ObjectId::parse_str`] accepts.
#[derive(Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct ObjectId {
    id: [u8; 12],
}

impl ObjectId {
    /// Generate a new ObjectId from the process-default [`Context`].
    pub fn new() -> ObjectId {
        ObjectId::new_with_context(Context::default_context())
    }

    /// Generate a new ObjectId from the given [`Context`].
    pub fn new_with_context(context: &Context) -> ObjectId {
        ObjectId {
            id: context.generate(),
        }
    }

    /// Construct an ObjectId wrapping an existing raw byte representation.
    pub const fn from_bytes(bytes: [u8; 12]) -> ObjectId {
        ObjectId { id: bytes }
    }

    /// The raw 12-byte representation.
    pub const fn bytes(&self) -> [u8; 12] {
        self.id
    }

    /// The timestamp portion (seconds since the Unix epoch).
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.id[0], self.id[1], self.id[2], self.id[3]])
    }

    /// The counter portion.
    pub fn counter(&self) -> u32 {
        u32::from_be_bytes([0, self.id[9], self.id[10], self.id[11]])
    }

    /// Parse the 24-character hex form. Any other length, and any non-hex
    /// content, is rejected.
    pub fn parse_str(s: impl AsRef<str>) -> Result<ObjectId> {
        let s = s.as_ref();
        if s.len() != 24 {
            return Err(Error::oid_invalid_length(s.len()));
        }
        let mut id = [0u8; 12];
        hex::decode_to_slice(s, &mut id).map_err(|e| Error::from_hex_error(e, s.len()))?;
        Ok(ObjectId::from_bytes(id))
    }

    /// The 24-character lowercase hex form.
    pub fn to_hex(self) -> String {
        hex::encode(self.id)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        ObjectId::new()
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<ObjectId> {
        ObjectId::parse_str(s)
    }
}

impl From<[u8; 12]> for ObjectId {
    fn from(bytes: [u8; 12]) -> Self {
        ObjectId::from_bytes(bytes)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectId").field(&self.to_hex()).finish()
    }
}
