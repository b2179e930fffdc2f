//! Generated document type.

use crate::fallback::FALLBACK_HTML;

/// Where a [`GeneratedDocument`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentOrigin {
    /// Markup taken from the provider response as-is or from its fenced `html` block.
    Model,
    /// Markup produced by the provider's conversion step from component-framework code.
    Converted,
    /// The embedded fallback page.
    Fallback,
}

/// A complete, standalone HTML document.
///
/// Can only be constructed from text that opens with a document root, or from the fallback
/// template, so holders never need to re-validate it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedDocument {
    html: String,
    origin: DocumentOrigin,
}

impl GeneratedDocument {
    /// Wrap model-derived markup. Returns `None` unless `html` opens with a document root.
    pub fn from_markup(html: String, origin: DocumentOrigin) -> Option<Self> {
        if origin == DocumentOrigin::Fallback || !has_document_root(&html) {
            return None;
        }
        Some(Self { html, origin })
    }

    pub fn fallback() -> Self {
        Self {
            html: FALLBACK_HTML.to_string(),
            origin: DocumentOrigin::Fallback,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn origin(&self) -> DocumentOrigin {
        self.origin
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == DocumentOrigin::Fallback
    }

    pub fn into_string(self) -> String {
        self.html
    }
}

/// Whether `text`, ignoring leading whitespace, opens with a doctype declaration or an `<html`
/// root tag (ASCII case-insensitive). Prose before the root does not count.
pub fn has_document_root(text: &str) -> bool {
    let head = text.trim_start();
    DOCUMENT_ROOT_MARKERS.iter().any(|marker| {
        head.get(..marker.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(marker))
    })
}

const DOCUMENT_ROOT_MARKERS: [&str; 2] = ["<!doctype html", "<html"];
