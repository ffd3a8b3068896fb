//! Encoding normalization: decode with a priority list, repair known
//! corruption, re-encode canonically.
//!
//! ## Decoding
//!
//! Candidate encodings are tried in order and the first one that decodes the
//! whole byte sequence without a malformed sequence wins. `latin-1` maps
//! every byte to one code point, so it never fails and belongs last.
//!
//! ## Repair
//!
//! Files that went through a UTF-8/GBK round-trip carry U+FFFD followed by
//! `?` where a full-width period and a line break used to be. The
//! substitution table below restores that one pattern and nothing else.
//!
//! ## Canonical form
//!
//! UTF-8, no BOM handling, `\n` line endings. Normalizing already-canonical
//! output is a fixed point.

use std::borrow::Cow;
use std::path::Path;

use encoding_rs::{Encoding, GBK, UTF_8};
use serde::Serialize;

use crate::error::{FixError, FixResult};

/// Known corrupted sequences and their intended text.
const REPAIRS: &[(&str, &str)] = &[("\u{FFFD}?", "\u{3002}\n")];

/// A text encoding the normalizer can try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceEncoding {
    Utf8,
    /// Decoded with the GBK decoder, which is a superset of GB2312.
    Gb2312,
    Gbk,
    Latin1,
}

impl SourceEncoding {
    /// Parse a configuration label. Case-insensitive.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(SourceEncoding::Utf8),
            "gb2312" => Some(SourceEncoding::Gb2312),
            "gbk" | "cp936" => Some(SourceEncoding::Gbk),
            "latin-1" | "latin1" | "iso-8859-1" => Some(SourceEncoding::Latin1),
            _ => None,
        }
    }

    /// Canonical label.
    pub fn label(self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "utf-8",
            SourceEncoding::Gb2312 => "gb2312",
            SourceEncoding::Gbk => "gbk",
            SourceEncoding::Latin1 => "latin-1",
        }
    }

    /// Decode `bytes` strictly. Returns `None` on any malformed sequence.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        let decoded: Option<Cow<'_, str>> = match self {
            SourceEncoding::Utf8 => strict(UTF_8, bytes),
            SourceEncoding::Gb2312 | SourceEncoding::Gbk => strict(GBK, bytes),
            SourceEncoding::Latin1 => Some(encoding_rs::mem::decode_latin1(bytes)),
        };
        decoded.map(Cow::into_owned)
    }
}

fn strict<'a>(encoding: &'static Encoding, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
    encoding.decode_without_bom_handling_and_without_replacement(bytes)
}

/// Result of normalizing one file's bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// Canonical text.
    pub text: String,
    /// Encoding that decoded the input.
    pub encoding: SourceEncoding,
    /// Number of corrupted sequences replaced.
    pub repairs: usize,
    /// Whether any CR or CRLF line ending was rewritten.
    pub line_endings_changed: bool,
}

/// Decode with the first encoding in `encodings` that succeeds.
pub fn decode_with_priority(
    path: &Path,
    bytes: &[u8],
    encodings: &[SourceEncoding],
) -> FixResult<(String, SourceEncoding)> {
    for &encoding in encodings {
        match encoding.decode(bytes) {
            Some(text) => {
                tracing::debug!("decoded {} as {}", path.display(), encoding.label());
                return Ok((text, encoding));
            }
            None => tracing::trace!("{} is not valid {}", path.display(), encoding.label()),
        }
    }
    Err(FixError::DecodeFailure {
        path: path.to_path_buf(),
        tried: encodings.iter().map(|e| e.label().to_string()).collect(),
    })
}

/// Rewrite CRLF and lone CR to LF.
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Apply the repair table. Returns the repaired text and the replacement count.
pub fn repair(text: &str) -> (String, usize) {
    let mut out = text.to_string();
    let mut count = 0;
    for (corrupted, intended) in REPAIRS {
        let hits = out.matches(corrupted).count();
        if hits > 0 {
            out = out.replace(corrupted, intended);
            count += hits;
        }
    }
    (out, count)
}

/// Decode, fix line endings, repair.
pub fn normalize(path: &Path, bytes: &[u8], encodings: &[SourceEncoding]) -> FixResult<Normalized> {
    let (decoded, encoding) = decode_with_priority(path, bytes, encodings)?;
    let unified = normalize_line_endings(&decoded);
    let line_endings_changed = matches!(unified, Cow::Owned(_));
    let (text, repairs) = repair(&unified);
    if repairs > 0 {
        tracing::info!("repaired {} corrupted sequence(s) in {}", repairs, path.display());
    }
    Ok(Normalized {
        text,
        encoding,
        repairs,
        line_endings_changed,
    })
}
