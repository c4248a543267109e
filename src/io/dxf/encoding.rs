//! Text encodings tried, in order, when a drawing is serialised.

use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::common::ensure_dir_exists;
use crate::drawing::DistrictDocument;
use crate::io::dxf::render_dxf;

/// A byte encoding for DXF output, with the `$DWGCODEPAGE` it declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// Windows Turkish.
    Windows1254,
    /// Windows Western European.
    Windows1252,
    /// Plain ASCII; other characters become DXF `\U+XXXX` escapes.
    AsciiEscaped,
}

/// Encodings tried by default, most faithful first.
pub const DEFAULT_ENCODINGS: &[TextEncoding] = &[
    TextEncoding::Windows1254,
    TextEncoding::Windows1252,
    TextEncoding::AsciiEscaped,
];

impl TextEncoding {
    /// Value of the `$DWGCODEPAGE` header variable.
    #[inline]
    pub fn codepage(self) -> &'static str {
        match self {
            Self::Windows1254 => "ANSI_1254",
            Self::Windows1252 | Self::AsciiEscaped => "ANSI_1252",
        }
    }

    /// Encode `text`, or `None` if some character cannot be represented.
    pub fn encode(self, text: &str) -> Option<Vec<u8>> {
        let encoding = match self {
            Self::Windows1254 => encoding_rs::WINDOWS_1254,
            Self::Windows1252 => encoding_rs::WINDOWS_1252,
            Self::AsciiEscaped => return Some(escape_non_ascii(text).into_bytes()),
        };
        let (bytes, _, unmappable) = encoding.encode(text);
        (!unmappable).then(|| bytes.into_owned())
    }
}

/// `\U+XXXX` takes exactly four hex digits, so characters outside the BMP
/// are written as their UTF-16 surrogate pair.
fn escape_non_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut units = [0u16; 2];
    for c in text.chars() {
        if c.is_ascii() { out.push(c); continue }
        for unit in c.encode_utf16(&mut units) {
            let _ = write!(out, "\\U+{unit:04X}");
        }
    }
    out
}

/// Raised when no configured encoding can represent a drawing.
#[derive(Debug, Error)]
#[error("no encoding could represent the drawing (tried {tried:?})")]
pub struct SerializationFailure {
    pub tried: Vec<TextEncoding>,
}

/// Render `document` and encode it with the first of `encodings` that can
/// represent every character.
pub(crate) fn serialize(document: &DistrictDocument, encodings: &[TextEncoding]) -> Result<(Vec<u8>, TextEncoding), SerializationFailure> {
    for &encoding in encodings {
        match encoding.encode(&render_dxf(document, encoding.codepage())) {
            Some(bytes) => return Ok((bytes, encoding)),
            None => debug!("[io::dxf] {encoding:?} cannot represent the drawing, trying next encoding"),
        }
    }
    Err(SerializationFailure { tried: encodings.to_vec() })
}

/// Write `bytes` to `path` via a temp file in the same directory, creating
/// the directory first if needed.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    ensure_dir_exists(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("[io::dxf] Failed to create temp file in {}", parent.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("[io::dxf] Failed to write {}", path.display()))?;
    tmp.as_file().sync_all().ok();
    tmp.persist(path)
        .with_context(|| format!("[io::dxf] Failed to rename into {}", path.display()))?;

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;
    use crate::io::dxf::DxfVersion;

    fn labelled(text: &str) -> DistrictDocument {
        let mut document = DistrictDocument::new(DxfVersion::R2000);
        document.add_label(text, Point::new(1.0, 1.0), 2.5);
        document
    }

    #[test]
    fn windows_1254_handles_turkish() {
        assert_eq!(TextEncoding::Windows1254.encode("ğş"), Some(vec![0xF0, 0xFE]));
        assert_eq!(TextEncoding::Windows1252.encode("ğ"), None);
        assert_eq!(TextEncoding::Windows1252.encode("é"), Some(vec![0xE9]));
    }

    #[test]
    fn ascii_escapes_everything_else() {
        assert_eq!(TextEncoding::AsciiEscaped.encode("aЖb"), Some(b"a\\U+0416b".to_vec()));
    }

    #[test]
    fn astral_characters_escape_as_surrogate_pairs() {
        assert_eq!(escape_non_ascii("a😀"), "a\\U+D83D\\U+DE00");
        assert_eq!(escape_non_ascii("\u{10FFFF}"), "\\U+DBFF\\U+DFFF");
        assert!(escape_non_ascii("€𝄞Ж").split("\\U+").skip(1).all(|hex| hex.len() == 4));
    }

    #[test]
    fn first_encoding_wins_for_ascii() {
        let (bytes, encoding) = serialize(&labelled("Kizilay-1-2"), DEFAULT_ENCODINGS).unwrap();
        assert_eq!(encoding, TextEncoding::Windows1254);
        assert!(String::from_utf8(bytes).unwrap().contains("ANSI_1254"));
    }

    #[test]
    fn falls_back_through_the_chain() {
        let (_, encoding) = serialize(&labelled("é Ж"), DEFAULT_ENCODINGS).unwrap();
        assert_eq!(encoding, TextEncoding::AsciiEscaped);

        let (_, encoding) = serialize(&labelled("Þ"), DEFAULT_ENCODINGS).unwrap();
        assert_eq!(encoding, TextEncoding::Windows1252);
    }

    #[test]
    fn fails_when_no_encoding_fits() {
        let err = serialize(&labelled("Ж"), &[TextEncoding::Windows1254, TextEncoding::Windows1252]).unwrap_err();
        assert_eq!(err.tried.len(), 2);
    }

    #[test]
    fn writes_atomically_into_new_directories() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("out.dxf");
        write_atomic(&path, b"0\nEOF\n").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"0\nEOF\n");

        write_atomic(&path, b"again").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"again");
        assert_eq!(std::fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }
}
