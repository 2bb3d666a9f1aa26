//! JSON encoding of canonical documents.

use crate::error::{Error, Result};
use crate::model::{CanonicalDocument, SCHEMA_VERSION};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document to SuperJSON.
pub fn to_json(doc: &CanonicalDocument, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc),
        JsonFormat::Compact => serde_json::to_string(doc),
    };

    result.map_err(|e| Error::Sink(format!("JSON serialization error: {}", e)))
}

/// Parse a SuperJSON document.
///
/// Documents written under a different schema version still parse; the
/// mismatch is logged.
pub fn from_json(json: &str) -> Result<CanonicalDocument> {
    let doc: CanonicalDocument = serde_json::from_str(json)?;
    if doc.version != SCHEMA_VERSION {
        log::warn!(
            "document {} has schema version {}, expected {}",
            doc.doc_id(),
            doc.version,
            SCHEMA_VERSION
        );
    }
    Ok(doc)
}
