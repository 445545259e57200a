//! Reading project files from bytes or disk and writing them back
//! in the encoding they came in.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::parser::{DocumentParser, ReadOptions};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::path::Path;

// Look at the byte order mark and the document decl and figure out the document encoding
fn sniff_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    match bytes {
        [0x00, 0x3c, 0x00, 0x3f, ..] => UTF_16BE,
        [0x3c, 0x00, 0x3f, 0x00, ..] => UTF_16LE,
        [b'<', b'?', ..] => declared_encoding(bytes).unwrap_or(UTF_8),
        _ => UTF_8,
    }
}

static ENCODING_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"encoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#).unwrap());

// encoding="..." of an ASCII compatible declaration
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let end = bytes.windows(2).position(|w| w == b"?>")?;
    let label = ENCODING_LABEL
        .captures(&bytes[..end])?
        .get(1)?
        .as_bytes();
    match Encoding::for_label(label)? {
        // without a BOM the bytes read so far were single byte
        enc if enc == UTF_16LE || enc == UTF_16BE => None,
        enc => Some(enc),
    }
}

fn encode(text: &str, encoding: &'static Encoding) -> Result<Vec<u8>> {
    if encoding == UTF_16LE {
        return Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
    }
    if encoding == UTF_16BE {
        return Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
    }
    let (bytes, _, had_unmappable) = encoding.encode(text);
    if had_unmappable {
        return Err(Error::CannotEncode(encoding.name()));
    }
    Ok(bytes.into_owned())
}

impl Document {
    /// Decodes and parses raw file content.
    ///
    /// The encoding comes from the byte order mark, then from the XML
    /// declaration, and is UTF-8 otherwise.
    ///
    /// # Errors
    ///
    /// - [`Error::CannotDecode`]: The bytes are not valid in the detected encoding.
    /// - [`Error::MalformedXml`]: Could not read XML.
    pub fn from_bytes(bytes: &[u8]) -> Result<Document> {
        Document::from_bytes_with_opts(bytes, ReadOptions::default())
    }

    pub fn from_bytes_with_opts(bytes: &[u8], opts: ReadOptions) -> Result<Document> {
        let encoding = sniff_encoding(bytes);
        // the BOM stays in the text as U+FEFF and is written back from there
        let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
        if had_errors {
            return Err(Error::CannotDecode);
        }
        DocumentParser::parse_str(&text, encoding, opts)
    }

    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Document> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let document = Document::from_bytes(&bytes)?;
        tracing::debug!(
            path = %path.display(),
            encoding = document.encoding().name(),
            bom = document.has_bom(),
            eol = ?document.eol(),
            "loaded project file"
        );
        Ok(document)
    }

    /// Serializes the document in the encoding it was read with,
    /// byte order mark included if there was one.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode(&self.serialize()?, self.encoding)
    }

    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        std::fs::write(path, &bytes)?;
        tracing::debug!(
            path = %path.display(),
            encoding = self.encoding().name(),
            len = bytes.len(),
            "saved project file"
        );
        Ok(())
    }
}
