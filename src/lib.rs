//! BSON is a binary format in which zero or more key/value pairs are stored
//! as a single entity, called a document. This library implements version 1.1
//! of the [BSON standard](http://bsonspec.org/spec.html): an in-memory value
//! model, a byte-level encoder and decoder, and conversion to and from JSON
//! text.
//!
//! ## Basic usage
//!
//! ```rust
//! use binary_json::{doc, Document};
//!
//! let doc = doc! {
//!     "name": "Ada",
//!     "age": 36,
//!     "tags": ["math", "cs"],
//! };
//!
//! let bytes = doc.to_bytes()?;
//! let decoded = Document::from_bytes(&bytes)?;
//! assert_eq!(decoded, doc);
//! assert_eq!(decoded.get_str("name")?, "Ada");
//! # Ok::<(), binary_json::Error>(())
//! ```
//!
//! ## JSON
//!
//! Documents convert to and from JSON text; BSON-only types use a reserved
//! marker-key convention described in the [`extjson`] module.
//!
//! ```rust
//! use binary_json::{doc, Document};
//!
//! let doc = Document::from_json(r#"{"tally": 7, "done": false}"#)?;
//! assert_eq!(doc, doc! { "tally": 7, "done": false });
//! # Ok::<(), binary_json::Error>(())
//! ```
//!
//! ## ObjectIds
//!
//! [`ObjectId`]s are generated from a [`Context`] holding the per-process
//! counter and identity state; [`ObjectId::new`] uses the process default.
//!
//! ```rust
//! use binary_json::oid::ObjectId;
//!
//! let id = ObjectId::new();
//! assert_eq!(ObjectId::parse_str(id.to_hex())?, id);
//! # Ok::<(), binary_json::Error>(())
//! ```

#[macro_use]
pub mod macros;
mod base64;
mod bson;
mod context;
mod datetime;
mod decoder;
mod document;
mod encoder;
mod error;
pub mod extjson;
pub mod oid;
pub mod spec;

pub use self::{
    bson::{Array, Binary, Bson, Code, Key, Regex, Timestamp},
    context::{
        Clock, Context, ContextBuilder, ContextOptions, MachineIdentity, SystemClock,
        SystemIdentity,
    },
    datetime::DateTime,
    decoder::{decode_document, decode_document_from_reader, Reader},
    document::Document,
    encoder::{encode_document, encode_document_to_writer},
    error::{Error, ErrorKind, ObjectIdErrorKind, Result, ValueAccessErrorKind},
    oid::ObjectId,
};
