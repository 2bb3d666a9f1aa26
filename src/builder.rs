//! Document builder: attaches metadata to merged pages.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use crate::merge::MergedPages;
use crate::model::{CanonicalDocument, DocumentMetadata, Extras, SourceKind, SCHEMA_VERSION};

/// Builds a [`CanonicalDocument`] from merged pages.
///
/// Building is pure: the same inputs always yield a value-equal document.
///
/// # Example
///
/// ```
/// use superjson::builder::DocumentBuilder;
/// use superjson::merge::MergedPages;
///
/// let merged = MergedPages { pages: Vec::new(), tools_used: Vec::new(), page_count: 0 };
/// let doc = DocumentBuilder::new("invoice-1a2b3c4d")
///     .with_source("gs://bucket/invoice.pdf")
///     .build(merged);
/// assert_eq!(doc.metadata.filename.as_deref(), Some("invoice.pdf"));
/// ```
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    doc_id: String,
    source_uri: String,
    filename: Option<String>,
    extras: Extras,
}

impl DocumentBuilder {
    /// Create a builder for the given document identifier.
    pub fn new(doc_id: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            source_uri: String::new(),
            filename: None,
            extras: Extras::new(),
        }
    }

    /// Set the source locator.
    pub fn with_source(mut self, source_uri: impl Into<String>) -> Self {
        self.source_uri = source_uri.into();
        self
    }

    /// Set the original file name.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set the loader-supplied extras.
    pub fn with_extras(mut self, extras: Extras) -> Self {
        self.extras = extras;
        self
    }

    /// Assemble the document.
    ///
    /// Without an explicit file name, the `filename` extra is used, then the
    /// last path segment of the source locator.
    pub fn build(self, merged: MergedPages) -> CanonicalDocument {
        let filename = self
            .filename
            .or_else(|| match self.extras.get("filename") {
                Some(Value::String(name)) if !name.is_empty() => Some(name.clone()),
                _ => None,
            })
            .or_else(|| last_segment(&self.source_uri));

        CanonicalDocument {
            metadata: DocumentMetadata {
                doc_id: self.doc_id,
                source: SourceKind::from_locator(&self.source_uri),
                source_uri: self.source_uri,
                filename,
                page_count: merged.page_count,
                extra: self.extras,
            },
            pages: merged.pages,
            tools_used: merged.tools_used,
            version: SCHEMA_VERSION.to_string(),
        }
    }
}

fn last_segment(locator: &str) -> Option<String> {
    locator
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty() && !s.ends_with(':'))
        .map(str::to_string)
}

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"))
}

/// Generate a document identifier from a file name.
///
/// The result is the slugified file stem followed by eight random hex
/// characters, e.g. `invoice-2024-03-5f1c9a2b`.
pub fn generate_doc_id(filename: &str) -> String {
    let name = last_segment(filename).unwrap_or_default();
    let stem = match name.rfind('.') {
        Some(pos) if pos > 0 => &name[..pos],
        _ => name.as_str(),
    };

    let lower = stem.to_lowercase();
    let slug = slug_pattern().replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    let slug = if slug.is_empty() { "document" } else { slug };

    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", slug, &suffix[..8])
}
