//! Deserialization of the binary wire format into a value tree.

use std::io::Read;

use crate::{
    bson::{Binary, Bson, Code, Key, Regex, Timestamp},
    datetime::DateTime,
    document::Document,
    error::{Error, ErrorKind, Result},
    oid::ObjectId,
    spec::{BinarySubtype, ElementType, MAX_DEPTH, MAX_DOCUMENT_SIZE, MIN_DOCUMENT_SIZE},
};

// 4-byte length + minimum string (5) + minimum document (5)
const MIN_CODE_WITH_SCOPE_SIZE: i32 = 4 + 5 + MIN_DOCUMENT_SIZE;

/// Decode a single document occupying the entire buffer.
///
/// Fails with a structural error, carrying the offending byte offset where
/// feasible, if the declared length does not match the buffer, any nested
/// length escapes its container, a type tag is unrecognized, or a string is
/// unterminated or not valid UTF-8. Deprecated type tags (`Undefined`,
/// `DbPointer`, `Symbol`) are reported as
/// [`ErrorKind::UnsupportedElementType`] rather than silently dropped.
pub fn decode_document(bytes: &[u8]) -> Result<Document> {
    let mut decoder = Decoder::new(bytes);
    let doc = decoder.read_document()?;
    if decoder.pos != bytes.len() {
        return Err(Error::malformed("trailing bytes after document").at_offset(decoder.pos));
    }
    Ok(doc)
}

/// Decode a single document from an [`io::Read`](std::io::Read) source,
/// consuming exactly the document's declared length from the reader.
pub fn decode_document_from_reader(reader: &mut impl Read) -> Result<Document> {
    let mut prefix = [0u8; 4];
    reader.read_exact(&mut prefix)?;
    let length = i32::from_le_bytes(prefix);
    if length < MIN_DOCUMENT_SIZE {
        return Err(Error::malformed(format!("document length {} too small", length)));
    }
    if length > MAX_DOCUMENT_SIZE {
        return Err(ErrorKind::SizeExceeded {
            size: length as usize,
        }
        .into());
    }
    let mut buf = vec![0u8; length as usize];
    buf[0..4].copy_from_slice(&prefix);
    reader.read_exact(&mut buf[4..])?;
    decode_document(&buf)
}

/// A cursor over a buffer holding zero or more concatenated top-level
/// documents, as produced by dump files and byte streams.
///
/// [`read_next`](Reader::read_next) decodes one document at a time and
/// [`bytes_consumed`](Reader::bytes_consumed) reports how far the cursor has
/// advanced, so callers feeding from an incremental source know where the
/// next document begins. Reaching the end of the buffer is a clean stop; a
/// truncated trailing document is an error.
///
/// ```
/// use binary_json::{doc, Reader};
///
/// let mut bytes = doc! { "a": 1 }.to_bytes()?;
/// bytes.extend(doc! { "b": 2 }.to_bytes()?);
///
/// let mut reader = Reader::new(&bytes);
/// while let Some(doc) = reader.read_next()? {
///     println!("{}", doc);
/// }
/// assert_eq!(reader.bytes_consumed(), bytes.len());
/// # Ok::<(), binary_json::Error>(())
/// ```
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Reader<'a> {
        Reader { bytes, pos: 0 }
    }

    /// The number of bytes consumed by the documents decoded so far.
    pub fn bytes_consumed(&self) -> usize {
        self.pos
    }

    /// Decode the next document, or return `Ok(None)` at clean end of input.
    pub fn read_next(&mut self) -> Result<Option<Document>> {
        if self.pos == self.bytes.len() {
            return Ok(None);
        }
        let mut decoder = Decoder::new(&self.bytes[self.pos..]);
        match decoder.read_document() {
            Ok(doc) => {
                self.pos += decoder.pos;
                Ok(Some(doc))
            }
            Err(mut e) => {
                // report offsets relative to the whole input, not the
                // document the cursor stopped in
                e.offset = e.offset.map(|o| o + self.pos);
                Err(e)
            }
        }
    }
}

impl Iterator for Reader<'_> {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
    // Exclusive upper bound of the container currently being read. Inner
    // reads may never cross it, which is what keeps a malformed nested
    // length from escaping into the parent's bytes.
    limit: usize,
    depth: usize,
}

impl<'a> Decoder<'a> {
    fn new(bytes: &'a [u8]) -> Decoder<'a> {
        Decoder {
            bytes,
            pos: 0,
            limit: bytes.len(),
            depth: 0,
        }
    }

    fn malformed_at(&self, message: impl ToString) -> Error {
        Error::malformed(message).at_offset(self.pos)
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.limit)
            .ok_or_else(|| self.malformed_at("unexpected end of input"))?;
        let bytes = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_i32(&mut self) -> Result<i32> {
        let b = self.read_bytes(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_i64(&mut self) -> Result<i64> {
        let b = self.read_bytes(8)?;
        Ok(i64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_i64()? as u64))
    }

    fn read_cstring(&mut self) -> Result<&'a str> {
        let start = self.pos;
        let len = self.bytes[start..self.limit]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::malformed("unterminated cstring").at_offset(start))?;
        let s = simdutf8::basic::from_utf8(&self.bytes[start..start + len])
            .map_err(|_| Error::from(ErrorKind::Utf8Encoding).at_offset(start))?;
        self.pos = start + len + 1;
        Ok(s)
    }

    fn read_string(&mut self) -> Result<String> {
        let start = self.pos;
        let len = self.read_i32()?;
        // the length includes the mandatory NUL terminator
        if len < 1 {
            return Err(Error::malformed(format!("string length {} too small", len)).at_offset(start));
        }
        let raw = self.read_bytes(len as usize)?;
        let (body, terminator) = raw.split_at(len as usize - 1);
        if terminator != [0] {
            return Err(Error::malformed("string missing NUL terminator").at_offset(start));
        }
        let s = simdutf8::basic::from_utf8(body)
            .map_err(|_| Error::from(ErrorKind::Utf8Encoding).at_offset(start))?;
        Ok(s.to_owned())
    }

    // Validate a container's length prefix against the enclosing bounds and
    // narrow `limit` to it. Returns (end, previous limit) for end_container.
    fn begin_container(&mut self) -> Result<(usize, usize)> {
        if self.depth >= MAX_DEPTH {
            return Err(
                Error::from(ErrorKind::RecursionLimitExceeded { max: MAX_DEPTH })
                    .at_offset(self.pos),
            );
        }
        let start = self.pos;
        let len = self.read_i32()?;
        if len < MIN_DOCUMENT_SIZE {
            return Err(Error::malformed(format!("document length {} too small", len)).at_offset(start));
        }
        if len > MAX_DOCUMENT_SIZE {
            return Err(Error::from(ErrorKind::SizeExceeded {
                size: len as usize,
            })
            .at_offset(start));
        }
        let end = start
            .checked_add(len as usize)
            .filter(|end| *end <= self.limit)
            .ok_or_else(|| {
                Error::malformed(format!("document length {} overruns its container", len))
                    .at_offset(start)
            })?;
        let prev_limit = self.limit;
        self.limit = end;
        self.depth += 1;
        Ok((end, prev_limit))
    }

    fn end_container(&mut self, end: usize, prev_limit: usize) -> Result<()> {
        if self.pos != end {
            return Err(self.malformed_at("document length prefix does not match its content"));
        }
        self.limit = prev_limit;
        self.depth -= 1;
        Ok(())
    }

    fn read_document(&mut self) -> Result<Document> {
        let (end, prev_limit) = self.begin_container()?;
        let mut doc = Document::new();
        loop {
            let tag = self.read_u8()?;
            if tag == 0 {
                break;
            }
            let (key, value) = self.read_element(tag)?;
            doc.insert(key, value);
        }
        self.end_container(end, prev_limit)?;
        Ok(doc)
    }

    fn read_array(&mut self) -> Result<Vec<Bson>> {
        let (end, prev_limit) = self.begin_container()?;
        let mut array = Vec::new();
        loop {
            let tag = self.read_u8()?;
            if tag == 0 {
                break;
            }
            // the key text is not trusted to be the canonical "0", "1", ...;
            // encounter order alone defines the array
            let (_, value) = self.read_element(tag)?;
            array.push(value);
        }
        self.end_container(end, prev_limit)?;
        Ok(array)
    }

    fn read_element(&mut self, tag: u8) -> Result<(String, Bson)> {
        let tag_offset = self.pos - 1;
        let element_type = ElementType::from_u8(tag).ok_or_else(|| {
            Error::from(ErrorKind::UnrecognizedElementType { tag }).at_offset(tag_offset)
        })?;
        let key = self.read_cstring()?.to_owned();
        let value = self.read_value(element_type).map_err(|e| {
            let e = match e.offset {
                Some(_) => e,
                None => e.at_offset(tag_offset),
            };
            match e.key {
                Some(_) => e,
                None => e.with_key(key.clone()),
            }
        })?;
        Ok((key, value))
    }

    fn read_value(&mut self, element_type: ElementType) -> Result<Bson> {
        Ok(match element_type {
            ElementType::Double => Bson::Double(self.read_f64()?),
            ElementType::String => Bson::String(self.read_string()?),
            ElementType::EmbeddedDocument => Bson::Document(self.read_document()?),
            ElementType::Array => Bson::Array(self.read_array()?),
            ElementType::Binary => Bson::Binary(self.read_binary()?),
            ElementType::ObjectId => {
                let b = self.read_bytes(12)?;
                let mut id = [0u8; 12];
                id.copy_from_slice(b);
                Bson::ObjectId(ObjectId::from_bytes(id))
            }
            ElementType::Boolean => match self.read_u8()? {
                0 => Bson::Boolean(false),
                1 => Bson::Boolean(true),
                other => {
                    return Err(self.malformed_at(format!("invalid boolean byte {:#04x}", other)))
                }
            },
            ElementType::DateTime => Bson::DateTime(DateTime::from_millis(self.read_i64()?)),
            ElementType::Null => Bson::Null,
            ElementType::RegularExpression => {
                let pattern = self.read_cstring()?.to_owned();
                let options = self.read_cstring()?.to_owned();
                Bson::RegularExpression(Regex { pattern, options })
            }
            ElementType::JavaScriptCode => Bson::Code(Code::new(self.read_string()?)),
            ElementType::JavaScriptCodeWithScope => self.read_code_with_scope()?,
            ElementType::Int32 => Bson::Int32(self.read_i32()?),
            ElementType::Timestamp => {
                // the wire order is ordinal first, then seconds
                let ordinal = self.read_u32()?;
                let seconds = self.read_u32()?;
                Bson::Timestamp(Timestamp { seconds, ordinal })
            }
            ElementType::Int64 => Bson::Int64(self.read_i64()?),
            ElementType::MaxKey => Bson::Key(Key::Max),
            ElementType::MinKey => Bson::Key(Key::Min),
            ElementType::Undefined | ElementType::DbPointer | ElementType::Symbol => {
                return Err(ErrorKind::UnsupportedElementType {
                    element: element_type,
                }
                .into())
            }
        })
    }

    fn read_binary(&mut self) -> Result<Binary> {
        let start = self.pos;
        let len = self.read_i32()?;
        if len < 0 {
            return Err(Error::malformed(format!("negative binary length {}", len)).at_offset(start));
        }
        let subtype = BinarySubtype::from(self.read_u8()?);
        let mut len = len as usize;
        if subtype == BinarySubtype::BinaryOld {
            // the deprecated subtype carries a redundant inner length
            if len < 4 {
                return Err(self.malformed_at("old binary payload missing its inner length"));
            }
            let inner = self.read_i32()?;
            if inner < 0 || inner as usize != len - 4 {
                return Err(Error::malformed(format!(
                    "old binary inner length {} does not match outer length {}",
                    inner, len
                ))
                .at_offset(start));
            }
            len -= 4;
        }
        let bytes = self.read_bytes(len)?.to_vec();
        Ok(Binary { subtype, bytes })
    }

    fn read_code_with_scope(&mut self) -> Result<Bson> {
        let start = self.pos;
        let total = self.read_i32()?;
        if total < MIN_CODE_WITH_SCOPE_SIZE {
            return Err(
                Error::malformed(format!("code-with-scope length {} too small", total))
                    .at_offset(start),
            );
        }
        let end = start
            .checked_add(total as usize)
            .filter(|end| *end <= self.limit)
            .ok_or_else(|| {
                Error::malformed(format!(
                    "code-with-scope length {} overruns its container",
                    total
                ))
                .at_offset(start)
            })?;
        let prev_limit = self.limit;
        self.limit = end;
        let code = self.read_string()?;
        let scope = self.read_document()?;
        if self.pos != end {
            return Err(self.malformed_at("code-with-scope length prefix does not match its content"));
        }
        self.limit = prev_limit;
        Ok(Bson::Code(Code::with_scope(code, scope)))
    }
}
