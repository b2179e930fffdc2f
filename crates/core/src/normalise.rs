//! Provider response normalisation.
//!
//! Turns whatever the generation provider sent back into a [`GeneratedDocument`]. The pipeline
//! short-circuits at the first success:
//!
//! 1. Probe the payload with [`EXTRACTORS`] in order and keep the first non-blank text.
//! 2. If [`classify`] reports component-framework code, ask the provider to convert it. Any
//!    failure here resolves to the fallback.
//! 3. Text that does not open with a document root is replaced by the contents of its fenced `html`
//!    block, if that block is itself a document.
//! 4. Otherwise the embedded fallback page is returned.
//!
//! Normalisation never fails and never yields a fragment.

use crate::document::{has_document_root, DocumentOrigin, GeneratedDocument};
use crate::generation::{GenerationClient, RawProviderResponse};
use serde_json::Value;

/// A single response-shape probe.
pub type Extractor = fn(&Value) -> Option<&str>;

/// Known payload shapes, in precedence order.
pub const EXTRACTORS: &[(&str, Extractor)] = &[
    ("code", code_field),
    ("html", html_field),
    ("content", content_field),
    ("choices[0].message.content", chat_message_content),
    ("body", Value::as_str),
];

fn code_field(value: &Value) -> Option<&str> {
    value.get("code").and_then(Value::as_str)
}

fn html_field(value: &Value) -> Option<&str> {
    value.get("html").and_then(Value::as_str)
}

fn content_field(value: &Value) -> Option<&str> {
    value.get("content").and_then(Value::as_str)
}

fn chat_message_content(value: &Value) -> Option<&str> {
    value
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
}

/// Substrings that mark component-framework output rather than plain markup.
const FOREIGN_FRAMEWORK_MARKERS: &[&str] = &[
    "export default",
    "import React",
    "from 'react'",
    "from \"react\"",
];

/// What kind of code a piece of extracted text is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    PlainMarkup,
    ForeignFramework,
    Unrecognized,
}

/// First non-blank text found by [`EXTRACTORS`].
pub fn extract_text(raw: &RawProviderResponse) -> Option<&str> {
    EXTRACTORS.iter().find_map(|(name, extract)| {
        let text = extract(raw.value()).filter(|t| !t.trim().is_empty())?;
        tracing::debug!(shape = *name, "extracted provider text");
        Some(text)
    })
}

/// Classify extracted text. Framework markers win over document markers.
pub fn classify(text: &str) -> ContentKind {
    if FOREIGN_FRAMEWORK_MARKERS.iter().any(|m| text.contains(m)) {
        ContentKind::ForeignFramework
    } else if has_document_root(text) {
        ContentKind::PlainMarkup
    } else {
        ContentKind::Unrecognized
    }
}

/// Trimmed inner content of the first fenced code block labelled `html`.
pub fn extract_fenced_markup(text: &str) -> Option<&str> {
    let mut rest = text;
    while let Some(start) = rest.find("```") {
        let after_ticks = &rest[start + 3..];
        let line_end = after_ticks.find('\n')?;
        let label = after_ticks[..line_end].trim();
        let body = &after_ticks[line_end + 1..];

        if label.eq_ignore_ascii_case("html") {
            let end = body.find("```").unwrap_or(body.len());
            return Some(body[..end].trim());
        }

        // Skip past this block's closing fence.
        match body.find("```") {
            Some(close) => rest = &body[close + 3..],
            None => return None,
        }
    }
    None
}

/// Normalise without a conversion step; framework output goes straight to the fallback.
pub fn normalise_offline(raw: &RawProviderResponse) -> GeneratedDocument {
    let Some(text) = extract_text(raw) else {
        tracing::warn!("no extractable text in provider response, using fallback");
        return GeneratedDocument::fallback();
    };

    if classify(text) == ContentKind::ForeignFramework {
        tracing::warn!("provider returned component code and conversion is unavailable, using fallback");
        return GeneratedDocument::fallback();
    }

    resolve_markup(text, DocumentOrigin::Model)
}

/// Normalise a provider response, converting framework output through `converter` if given.
pub async fn normalise(
    raw: &RawProviderResponse,
    converter: Option<&dyn GenerationClient>,
) -> GeneratedDocument {
    let Some(text) = extract_text(raw) else {
        tracing::warn!("no extractable text in provider response, using fallback");
        return GeneratedDocument::fallback();
    };

    if classify(text) != ContentKind::ForeignFramework {
        return resolve_markup(text, DocumentOrigin::Model);
    }

    let Some(converter) = converter else {
        tracing::warn!("provider returned component code and conversion is unavailable, using fallback");
        return GeneratedDocument::fallback();
    };

    tracing::info!("provider returned component code, requesting conversion");
    match converter.convert_to_markup(text).await {
        Ok(converted) => match extract_text(&converted) {
            Some(converted_text) => resolve_markup(converted_text, DocumentOrigin::Converted),
            None => {
                tracing::warn!("conversion response had no extractable text, using fallback");
                GeneratedDocument::fallback()
            }
        },
        Err(e) => {
            tracing::warn!("conversion failed, using fallback: {}", e);
            GeneratedDocument::fallback()
        }
    }
}

/// Steps 3 and 4: accept a document as-is, else its fenced `html` block, else the fallback.
fn resolve_markup(text: &str, origin: DocumentOrigin) -> GeneratedDocument {
    if let Some(doc) = GeneratedDocument::from_markup(text.to_string(), origin) {
        return doc;
    }

    extract_fenced_markup(text)
        .and_then(|inner| GeneratedDocument::from_markup(inner.to_string(), origin))
        .unwrap_or_else(|| {
            tracing::warn!("provider text is not a complete HTML document, using fallback");
            GeneratedDocument::fallback()
        })
}
