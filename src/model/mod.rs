//! Canonical document model.
//!
//! These types are the tool-agnostic representation every normalizer emits
//! and the merge engine reconciles. A [`CanonicalDocument`] is built once per
//! ingestion run and is not mutated afterwards.

mod document;
mod page;
mod table;

pub use document::{
    CanonicalDocument, DocumentMetadata, DocumentStats, Extras, SourceKind, SCHEMA_VERSION,
};
pub use page::{BoundingBox, Page, TextBlock};
pub use table::{Table, TableCell};
