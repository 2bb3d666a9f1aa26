//! # superjson
//!
//! Multi-source extraction merge and normalization for PDF documents.
//!
//! Several extraction tools each produce their own partial view of a
//! document: plain text, positioned text blocks, tables. This library turns
//! those tool-specific payloads into one canonical, versioned document
//! ("SuperJSON") with per-fragment provenance.
//!
//! ## Quick Start
//!
//! ```no_run
//! use superjson::extract::RecordedAdapter;
//! use superjson::loader::{DocumentLoader, LocalFileLoader};
//! use superjson::sink::{DocumentSink, JsonFileSink};
//! use superjson::Pipeline;
//!
//! fn main() -> superjson::Result<()> {
//!     let loaded = LocalFileLoader::new().load("data/raw/lease.pdf")?;
//!
//!     let doc = Pipeline::new()
//!         .with_adapter(RecordedAdapter::from_file("data/raw/lease.text_layer.json")?)
//!         .with_adapter(RecordedAdapter::from_file("data/raw/lease.layout.json")?)
//!         .run(&loaded, None)?;
//!
//!     JsonFileSink::new("data/processed")?.write(&doc)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Stages
//!
//! - [`extract`]: adapter boundary and typed per-tool payloads
//! - [`normalize`]: per-tool mapping into canonical pages
//! - [`merge`]: priority-ordered, deterministic page reconciliation
//! - [`builder`]: document metadata and schema version
//! - [`sink`]: JSON files, flat rows and retrieval chunks

pub mod builder;
pub mod error;
pub mod extract;
pub mod loader;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod sink;

// Re-export commonly used types
pub use builder::{generate_doc_id, DocumentBuilder};
pub use error::{Error, Result};
pub use extract::{ExtractorAdapter, NativeContent, RawPayload, ToolKind};
pub use loader::{DocumentLoader, LoadedDocument, LocalFileLoader};
pub use merge::{merge, MergeEngine, MergeOptions, MergedPages, ToolPriority};
pub use model::{
    BoundingBox, CanonicalDocument, DocumentMetadata, DocumentStats, Extras, Page, SourceKind,
    Table, TableCell, TextBlock, SCHEMA_VERSION,
};
pub use normalize::{
    normalize_payload, FragmentPolicy, IdStrategy, NormalizeOptions, NormalizedOutput,
};
pub use pipeline::{Pipeline, PipelineOptions};
pub use sink::{to_json, JsonFormat};

/// Normalize raw payloads with default options and merge them.
///
/// # Example
///
/// ```
/// use superjson::{merge_payloads, Extras, NativeContent, RawPayload, ToolKind};
///
/// let skipped = RawPayload::skipped("cloud_ocr", ToolKind::CloudOcr, "no credentials");
/// let result = merge_payloads("doc-1", "/in/doc.pdf", &Extras::new(), &[skipped]);
/// assert!(matches!(result, Err(superjson::Error::EmptyContributionSet)));
/// ```
pub fn merge_payloads(
    doc_id: &str,
    source_uri: &str,
    base_metadata: &Extras,
    payloads: &[RawPayload],
) -> Result<CanonicalDocument> {
    Pipeline::new().run_payloads(doc_id, source_uri, base_metadata, payloads)
}

/// Parse a payload captured as JSON.
pub fn parse_payload(json: &str) -> Result<RawPayload> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT_LAYER: &str = r#"{
        "tool": "text_layer",
        "meta": {"num_pages": 2},
        "content": {"kind": "text_layer", "pages": [
            {"page_index": 0, "text": "A", "blocks": [[0, 0, 10, 10, "A", 0, 0]]},
            {"page_index": 1, "text": "B", "blocks": []}
        ]}
    }"#;

    const LAYOUT: &str = r#"{
        "tool": "layout",
        "content": {"kind": "layout", "pages": [
            {"page_index": 1, "text": "B2", "blocks": [], "tables": [[["a", "b"], [null, "d"]]]},
            {"page_index": 2, "text": "C", "blocks": [], "tables": []}
        ]}
    }"#;

    #[test]
    fn test_merge_payloads() {
        let payloads = vec![
            parse_payload(LAYOUT).unwrap(),
            parse_payload(TEXT_LAYER).unwrap(),
        ];
        let doc = merge_payloads("d", "/in/d.pdf", &Extras::new(), &payloads).unwrap();

        let texts: Vec<&str> = doc.pages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["A", "B", "C"]);
        assert_eq!(doc.tools_used, vec!["text_layer", "layout"]);
        assert_eq!(doc.metadata.page_count, 2);
        assert_eq!(doc.pages[1].tables[0].cells.len(), 3);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_bad_block_record_drops_only_that_block() {
        let payload = parse_payload(
            r#"{
                "tool": "text_layer",
                "content": {"kind": "text_layer", "pages": [
                    {"page_index": 0, "text": "good", "blocks": [[0, 0, 1, 1, "good", 0, 0], null]}
                ]}
            }"#,
        )
        .unwrap();

        let doc = merge_payloads("d", "/in/d.pdf", &Extras::new(), &[payload.clone()]).unwrap();
        assert_eq!(doc.pages[0].blocks.len(), 1);
        assert_eq!(doc.pages[0].blocks[0].text, "good");

        let strict = Pipeline::new().strict();
        assert!(matches!(
            strict.run_payloads("d", "/in/d.pdf", &Extras::new(), &[payload]),
            Err(Error::MalformedFragment { .. })
        ));
    }

    #[test]
    fn test_parse_payload_invalid() {
        assert!(matches!(parse_payload("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_reexports() {
        let options = PipelineOptions::new()
            .with_normalize_options(NormalizeOptions::new().strict())
            .sequential();
        assert_eq!(options.normalize.fragment_policy, FragmentPolicy::Strict);
        assert_eq!(ToolPriority::default().names().len(), 3);
    }
}
