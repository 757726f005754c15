//! Document references
//!
//! A manual is addressed by the path segments under the storage root, e.g.
//! `ev/honda-activa-e.pdf`. Segments are kept exactly as they arrived on the
//! wire (percent-encoded) so upstream and proxy URLs round-trip unchanged, and
//! are decoded one at a time whenever something is shown to a person.

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

/// Route prefix the proxy is mounted under
pub const PROXY_PREFIX: &str = "/proxy";

/// Location of the embedded renderer's viewer page
pub const VIEWER_PAGE: &str = "/pdfjs/web/viewer.html";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentRefError {
    #[error("document path has no segments")]
    Empty,

    #[error("path segment {0:?} is not allowed")]
    Traversal(String),

    #[error("path segment {0:?} is not valid percent-encoded UTF-8")]
    Encoding(String),
}

/// Ordered, non-empty list of raw path segments identifying one PDF
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    segments: Vec<String>,
}

impl DocumentRef {
    /// Parse a raw, still-encoded path such as `ev/honda%20manual.pdf`.
    pub fn parse(raw_path: &str) -> Result<Self, DocumentRefError> {
        Self::from_segments(raw_path.split('/'))
    }

    /// Build from raw segments; empty segments are skipped.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, DocumentRefError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut kept = Vec::new();

        for segment in segments {
            let raw = segment.as_ref();
            if raw.is_empty() {
                continue;
            }

            let decoded = decode_segment(raw)?;
            if is_traversal(raw) || is_traversal(&decoded) || decoded.contains('/') {
                return Err(DocumentRefError::Traversal(raw.to_string()));
            }

            kept.push(raw.to_string());
        }

        if kept.is_empty() {
            return Err(DocumentRefError::Empty);
        }

        Ok(Self { segments: kept })
    }

    /// Raw segments as received
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Raw path, segments joined with `/`
    pub fn raw_path(&self) -> String {
        self.segments.join("/")
    }

    /// Human-readable path, each segment decoded on its own
    pub fn display_path(&self) -> String {
        self.segments
            .iter()
            .map(|s| decode_or_raw(s))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Decoded final segment
    pub fn file_name(&self) -> Cow<'_, str> {
        // Non-empty is guaranteed by construction
        let last = self.segments.last().map(String::as_str).unwrap_or_default();
        decode_or_raw(last)
    }

    /// Title shown before the renderer reports the embedded one:
    /// `honda-activa-e.pdf` becomes `Honda Activa E`.
    pub fn default_title(&self) -> String {
        let name = self.file_name();
        let stem = match name.rsplit_once('.') {
            Some((stem, _ext)) if !stem.is_empty() => stem,
            _ => name.as_ref(),
        };

        stem.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
            .filter(|word| !word.is_empty())
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether `title` is just this document's identifier echoed back
    pub fn is_identifier(&self, title: &str) -> bool {
        let title = title.trim();
        title == self.display_path() || title == self.file_name() || title == self.raw_path()
    }

    /// URL of this document on the upstream object store
    pub fn upstream_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.raw_path())
    }

    /// Path of this document on the proxy
    pub fn proxy_path(&self) -> String {
        format!("{}/{}", PROXY_PREFIX, self.raw_path())
    }

    /// Proxy path that asks for an attachment disposition
    pub fn download_path(&self) -> String {
        format!("{}?download=1", self.proxy_path())
    }

    /// Source URL for the isolated rendering frame
    pub fn frame_src(&self) -> String {
        format!(
            "{}?file={}#pagemode=none",
            VIEWER_PAGE,
            urlencoding::encode(&self.proxy_path())
        )
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_path())
    }
}

fn decode_segment(raw: &str) -> Result<Cow<'_, str>, DocumentRefError> {
    urlencoding::decode(raw).map_err(|_| DocumentRefError::Encoding(raw.to_string()))
}

fn decode_or_raw(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

fn is_traversal(segment: &str) -> bool {
    segment == "." || segment == ".."
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
