//! Serialization of a value tree into the binary wire format.

use std::io::Write;

use crate::{
    bson::{Binary, Bson, Code, Key, Regex, Timestamp},
    document::Document,
    error::{ErrorKind, Result},
    spec::{BinarySubtype, MAX_DEPTH},
};

/// Encode a document into a fresh byte buffer.
///
/// Encoding is all-or-nothing: on failure (a NUL byte embedded in a key or
/// C-string payload, a length overflowing the 32-bit limit, or nesting past
/// [`MAX_DEPTH`]) no buffer is returned. A successful encode is a pure
/// function of the value tree.
pub fn encode_document(doc: &Document) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_document(&mut buf, doc, 0)?;
    Ok(buf)
}

/// Encode a document and write the bytes to `writer`. Nothing is written if
/// encoding fails.
pub fn encode_document_to_writer(doc: &Document, writer: &mut impl Write) -> Result<()> {
    let buf = encode_document(doc)?;
    writer.write_all(&buf)?;
    Ok(())
}

fn write_document(buf: &mut Vec<u8>, doc: &Document, depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(ErrorKind::RecursionLimitExceeded { max: MAX_DEPTH }.into());
    }

    let start = buf.len();
    buf.extend_from_slice(&[0; 4]);
    for (key, value) in doc {
        write_element(buf, key, value, depth).map_err(|e| match e.key {
            Some(_) => e,
            None => e.with_key(key),
        })?;
    }
    buf.push(0);
    patch_length(buf, start)
}

fn write_array(buf: &mut Vec<u8>, arr: &[Bson], depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(ErrorKind::RecursionLimitExceeded { max: MAX_DEPTH }.into());
    }

    let start = buf.len();
    buf.extend_from_slice(&[0; 4]);
    for (index, value) in arr.iter().enumerate() {
        write_element(buf, &index.to_string(), value, depth)?;
    }
    buf.push(0);
    patch_length(buf, start)
}

// Patch the 4-byte length prefix reserved at `start` with the container's
// total byte count (prefix + elements + terminator).
fn patch_length(buf: &mut Vec<u8>, start: usize) -> Result<()> {
    let len = buf.len() - start;
    if len > i32::MAX as usize {
        return Err(ErrorKind::SizeExceeded { size: len }.into());
    }
    buf[start..start + 4].copy_from_slice(&(len as i32).to_le_bytes());
    Ok(())
}

fn write_element(buf: &mut Vec<u8>, key: &str, value: &Bson, depth: usize) -> Result<()> {
    buf.push(value.element_type() as u8);
    write_cstring(buf, key)?;

    match value {
        Bson::Null | Bson::Key(Key::Min) | Bson::Key(Key::Max) => {}
        Bson::Double(v) => buf.extend_from_slice(&v.to_le_bytes()),
        Bson::Int32(v) => buf.extend_from_slice(&v.to_le_bytes()),
        Bson::Int64(v) => buf.extend_from_slice(&v.to_le_bytes()),
        Bson::Boolean(v) => buf.push(*v as u8),
        Bson::String(v) => write_string(buf, v)?,
        Bson::DateTime(v) => buf.extend_from_slice(&v.timestamp_millis().to_le_bytes()),
        Bson::Timestamp(Timestamp { seconds, ordinal }) => {
            // the wire order is ordinal first, then seconds
            buf.extend_from_slice(&ordinal.to_le_bytes());
            buf.extend_from_slice(&seconds.to_le_bytes());
        }
        Bson::ObjectId(id) => buf.extend_from_slice(&id.bytes()),
        Bson::Array(arr) => write_array(buf, arr, depth + 1)?,
        Bson::Document(doc) => write_document(buf, doc, depth + 1)?,
        Bson::Binary(Binary { subtype, bytes }) => write_binary(buf, *subtype, bytes)?,
        Bson::RegularExpression(Regex { pattern, options }) => {
            write_cstring(buf, pattern)?;
            write_cstring(buf, options)?;
        }
        Bson::Code(Code { code, scope: None }) => write_string(buf, code)?,
        Bson::Code(Code {
            code,
            scope: Some(scope),
        }) => {
            // code-with-scope carries its own total length prefix around the
            // string and the scope document
            let start = buf.len();
            buf.extend_from_slice(&[0; 4]);
            write_string(buf, code)?;
            write_document(buf, scope, depth + 1)?;
            patch_length(buf, start)?;
        }
    }
    Ok(())
}

fn write_binary(buf: &mut Vec<u8>, subtype: BinarySubtype, bytes: &[u8]) -> Result<()> {
    // the deprecated BinaryOld subtype wraps the payload in a second length
    let inner_len = if subtype == BinarySubtype::BinaryOld { 4 } else { 0 };
    let len = bytes
        .len()
        .checked_add(inner_len)
        .filter(|len| *len <= i32::MAX as usize)
        .ok_or(ErrorKind::SizeExceeded { size: bytes.len() })?;

    buf.extend_from_slice(&(len as i32).to_le_bytes());
    buf.push(subtype.into());
    if subtype == BinarySubtype::BinaryOld {
        buf.extend_from_slice(&(bytes.len() as i32).to_le_bytes());
    }
    buf.extend_from_slice(bytes);
    Ok(())
}

pub(crate) fn write_string(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    let len = s
        .len()
        .checked_add(1)
        .filter(|len| *len <= i32::MAX as usize)
        .ok_or(ErrorKind::SizeExceeded { size: s.len() })?;
    buf.extend_from_slice(&(len as i32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
    Ok(())
}

pub(crate) fn write_cstring(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    if s.as_bytes().contains(&0) {
        return Err(ErrorKind::InvalidCString {
            string: s.to_owned(),
        }
        .into());
    }
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
    Ok(())
}
