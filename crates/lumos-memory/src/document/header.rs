//! Metadata sentinel detection for structured-document exports.
//!
//! Extractors for office formats emit a bracketed metadata header ahead of
//! the document body. One anchored pattern per [`SourceType`] replaces the
//! per-format branching of ad-hoc matching: look the pattern up, split the
//! header off, and let the chunker splice it back onto the first chunk.
//! Documents whose extractor did not emit the exact sentinel shape fall
//! through to uniform chunking.

use std::sync::LazyLock;

use regex::Regex;

use super::types::SourceType;

static PDF_SENTINEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^PDF Document.*?Content:\s*").unwrap());
static DOCX_SENTINEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[DOCX Document: [^\]]*\]\s*").unwrap());
static XLSX_SENTINEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[Excel Document: [^\]]*\]\s*").unwrap());
static PPTX_SENTINEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[PowerPoint Document: [^\]]*\]\s*").unwrap());

fn sentinel(source_type: SourceType) -> Option<&'static Regex> {
    match source_type {
        SourceType::Pdf => Some(&PDF_SENTINEL),
        SourceType::Docx => Some(&DOCX_SENTINEL),
        SourceType::Xlsx => Some(&XLSX_SENTINEL),
        SourceType::Pptx => Some(&PPTX_SENTINEL),
        SourceType::Text => None,
    }
}

/// Split a leading metadata header off `text`.
///
/// Returns `(header, body)` when the source type's sentinel matches at the
/// start of the text; the header keeps its trailing whitespace so it can be
/// prepended back verbatim.
#[must_use]
pub fn detect(text: &str, source_type: SourceType) -> Option<(&str, &str)> {
    let matched = sentinel(source_type)?.find(text)?;
    Some(text.split_at(matched.end()))
}
