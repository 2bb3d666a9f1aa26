//! Document-level types.

use super::Page;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Version stamped on every canonical document so consumers can detect format drift.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Free-form, tool- or loader-specific key/value data.
pub type Extras = serde_json::Map<String, serde_json::Value>;

/// The canonical, tool-agnostic document ("SuperJSON").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDocument {
    /// Document metadata
    pub metadata: DocumentMetadata,

    /// Pages sorted by strictly increasing index
    pub pages: Vec<Page>,

    /// Tools that contributed, in priority order
    pub tools_used: Vec<String>,

    /// Schema version
    pub version: String,
}

impl CanonicalDocument {
    /// Document identifier.
    pub fn doc_id(&self) -> &str {
        &self.metadata.doc_id
    }

    /// Get a page by index (0-indexed). Missing indices return `None`.
    pub fn page(&self, index: u32) -> Option<&Page> {
        self.pages
            .binary_search_by_key(&index, |p| p.index)
            .ok()
            .map(|pos| &self.pages[pos])
    }

    /// Indices of every observed page, ascending.
    pub fn page_indices(&self) -> Vec<u32> {
        self.pages.iter().map(|p| p.index).collect()
    }

    /// Number of page entries actually present.
    pub fn observed_page_count(&self) -> usize {
        self.pages.len()
    }

    /// Check whether a tool contributed to this document.
    pub fn used_tool(&self, tool: &str) -> bool {
        self.tools_used.iter().any(|t| t == tool)
    }

    /// Get plain text of the entire document, one page per paragraph.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.text.as_str())
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Check the structural invariants of the document.
    ///
    /// Pages must be strictly increasing, every fragment must reference its
    /// page and carry a contributing tool, and identifiers must be unique.
    pub fn validate(&self) -> Result<()> {
        if self.pages.windows(2).any(|w| w[0].index >= w[1].index) {
            return Err(Error::InvalidDocument(
                "pages are not strictly increasing".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for page in &self.pages {
            if !page.is_consistent() {
                return Err(Error::InvalidDocument(format!(
                    "page {} holds a fragment of another page",
                    page.index
                )));
            }
            let tools = page
                .blocks
                .iter()
                .map(|b| b.tool.as_str())
                .chain(page.tables.iter().map(|t| t.tool.as_str()));
            for tool in tools {
                if !self.used_tool(tool) {
                    return Err(Error::InvalidDocument(format!(
                        "page {} has fragment from unknown tool {:?}",
                        page.index, tool
                    )));
                }
            }
            for id in page.fragment_ids() {
                if !seen.insert(id) {
                    return Err(Error::IdentifierCollision { id: id.to_string() });
                }
            }
        }

        Ok(())
    }

    /// Collect fragment statistics.
    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats {
            page_count: self.pages.len() as u32,
            ..Default::default()
        };

        for page in &self.pages {
            for block in &page.blocks {
                stats.block_count += 1;
                *stats.blocks_by_tool.entry(block.tool.clone()).or_default() += 1;
            }
            for table in &page.tables {
                stats.table_count += 1;
                stats.cell_count += table.cells.len() as u32;
                *stats.tables_by_tool.entry(table.tool.clone()).or_default() += 1;
            }
        }

        stats
    }
}

/// Document-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document identifier
    pub doc_id: String,

    /// Local path or remote URI of the source bytes
    pub source_uri: String,

    /// Where the source bytes came from
    pub source: SourceKind,

    /// Original file name, if known
    pub filename: Option<String>,

    /// Total page count (tool-reported when available, else observed)
    pub page_count: u32,

    /// Loader-supplied context, copied verbatim
    #[serde(default)]
    pub extra: Extras,
}

/// Origin of the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Local filesystem path
    #[default]
    Local,
    /// Object store URI (`gs://`, `s3://`)
    ObjectStore,
    /// Other remote URI (`http://`, `https://`)
    Remote,
}

impl SourceKind {
    /// Classify a source locator by its scheme.
    pub fn from_locator(locator: &str) -> Self {
        let lower = locator.trim_start().to_ascii_lowercase();
        if lower.starts_with("gs://") || lower.starts_with("s3://") {
            SourceKind::ObjectStore
        } else if lower.starts_with("http://") || lower.starts_with("https://") {
            SourceKind::Remote
        } else {
            SourceKind::Local
        }
    }

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Local => "local",
            SourceKind::ObjectStore => "object_store",
            SourceKind::Remote => "remote",
        }
    }
}

/// Fragment counts for a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Number of page entries
    pub page_count: u32,

    /// Number of text blocks
    pub block_count: u32,

    /// Number of tables
    pub table_count: u32,

    /// Number of table cells
    pub cell_count: u32,

    /// Text blocks per tool
    pub blocks_by_tool: BTreeMap<String, u32>,

    /// Tables per tool
    pub tables_by_tool: BTreeMap<String, u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Table, TableCell, TextBlock};

    fn sample() -> CanonicalDocument {
        let mut p0 = Page::with_text(0, "first");
        p0.add_block(TextBlock::new("a", 0, "first", "text_layer"));
        let mut p2 = Page::with_text(2, "third");
        p2.add_block(TextBlock::new("b", 2, "third", "layout"));
        let mut table = Table::new("layout_p2_t0", 2, "layout");
        table.add_cell(TableCell::new(0, 0, "x"));
        table.add_cell(TableCell::new(0, 1, "y"));
        p2.add_table(table);

        CanonicalDocument {
            metadata: DocumentMetadata {
                doc_id: "doc-1".to_string(),
                source_uri: "/tmp/doc.pdf".to_string(),
                source: SourceKind::Local,
                filename: Some("doc.pdf".to_string()),
                page_count: 2,
                extra: Extras::new(),
            },
            pages: vec![p0, p2],
            tools_used: vec!["text_layer".to_string(), "layout".to_string()],
            version: SCHEMA_VERSION.to_string(),
        }
    }

    #[test]
    fn test_page_lookup_skips_gaps() {
        let doc = sample();
        assert_eq!(doc.page(0).map(|p| p.text.as_str()), Some("first"));
        assert!(doc.page(1).is_none());
        assert_eq!(doc.page_indices(), vec![0, 2]);
    }

    #[test]
    fn test_validate() {
        let doc = sample();
        assert!(doc.validate().is_ok());

        let mut dup = sample();
        dup.pages[1].blocks[0].id = "a".to_string();
        assert!(matches!(
            dup.validate(),
            Err(Error::IdentifierCollision { id }) if id == "a"
        ));

        let mut unknown = sample();
        unknown.tools_used.pop();
        assert!(matches!(unknown.validate(), Err(Error::InvalidDocument(_))));

        let mut unordered = sample();
        unordered.pages.swap(0, 1);
        assert!(matches!(unordered.validate(), Err(Error::InvalidDocument(_))));
    }

    #[test]
    fn test_stats() {
        let stats = sample().stats();
        assert_eq!(stats.page_count, 2);
        assert_eq!(stats.block_count, 2);
        assert_eq!(stats.table_count, 1);
        assert_eq!(stats.cell_count, 2);
        assert_eq!(stats.blocks_by_tool.get("layout"), Some(&1));
    }

    #[test]
    fn test_source_kind_from_locator() {
        assert_eq!(SourceKind::from_locator("gs://bucket/a.pdf"), SourceKind::ObjectStore);
        assert_eq!(SourceKind::from_locator("S3://bucket/a.pdf"), SourceKind::ObjectStore);
        assert_eq!(SourceKind::from_locator("https://host/a.pdf"), SourceKind::Remote);
        assert_eq!(SourceKind::from_locator("/data/raw/a.pdf"), SourceKind::Local);
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(sample().plain_text(), "first\n\nthird");
    }
}
