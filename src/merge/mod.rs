//! Merge engine: reconciles normalized per-tool pages into one document.
//!
//! Merging is a two-phase fold. Contributions are first collected into a map
//! keyed by page index, visiting tools in priority order; each entry is then
//! reduced to a single canonical [`Page`]. The result depends only on the
//! priority order, the page indices and each tool's emission order, never on
//! the order in which contributions were handed in.

mod priority;

pub use priority::{MergeOptions, ToolPriority};

use std::collections::{BTreeMap, HashSet};

use crate::builder::DocumentBuilder;
use crate::error::{Error, Result};
use crate::model::{CanonicalDocument, Extras, Page};
use crate::normalize::NormalizedOutput;

/// Pages and tool list produced by a merge, before document metadata is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedPages {
    /// Observed pages, sorted by index
    pub pages: Vec<Page>,

    /// Contributing tools in priority order
    pub tools_used: Vec<String>,

    /// Document page count for metadata
    pub page_count: u32,
}

/// Pure, synchronous merge of complete normalized contributions.
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    options: MergeOptions,
}

impl MergeEngine {
    /// Create a merge engine with the given options.
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    /// Options in effect.
    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Merge contributions into a page sequence.
    ///
    /// Fails with [`Error::EmptyContributionSet`] when no tool supplied a
    /// non-empty page and with [`Error::IdentifierCollision`] when two
    /// fragments share an id. Blank pages still count as observed indices,
    /// but a tool with only blank pages is not listed in `tools_used`.
    pub fn merge_pages<'a, I>(&self, contributions: I) -> Result<MergedPages>
    where
        I: IntoIterator<Item = &'a NormalizedOutput>,
    {
        let priority = &self.options.priority;
        let mut ordered: Vec<&NormalizedOutput> = contributions
            .into_iter()
            .filter(|c| !c.pages.is_empty())
            .collect();

        if !ordered.iter().any(|c| c.contributes()) {
            return Err(Error::EmptyContributionSet);
        }
        ordered.sort_by(|a, b| {
            priority
                .sort_key(&a.tool, a.kind)
                .cmp(&priority.sort_key(&b.tool, b.kind))
        });

        // Phase 1: page index -> contributing pages, in priority order.
        let mut by_index: BTreeMap<u32, Vec<&Page>> = BTreeMap::new();
        for contribution in &ordered {
            for page in &contribution.pages {
                by_index.entry(page.index).or_default().push(page);
            }
        }

        // Phase 2: reduce each index to one canonical page.
        let pages: Vec<Page> = by_index
            .into_iter()
            .map(|(index, sources)| reduce_page(index, &sources))
            .collect();

        check_unique_ids(&pages)?;

        let mut tools_used: Vec<String> = Vec::new();
        for contribution in ordered.iter().filter(|c| c.contributes()) {
            if !tools_used.contains(&contribution.tool) {
                tools_used.push(contribution.tool.clone());
            }
        }

        let page_count = page_count(&ordered, pages.len());
        log::debug!(
            "merged {} page(s) from {} tool(s)",
            pages.len(),
            tools_used.len()
        );

        Ok(MergedPages {
            pages,
            tools_used,
            page_count,
        })
    }

    /// Merge contributions and build the canonical document.
    pub fn merge<'a, I>(
        &self,
        doc_id: &str,
        source_uri: &str,
        base_metadata: &Extras,
        contributions: I,
    ) -> Result<CanonicalDocument>
    where
        I: IntoIterator<Item = &'a NormalizedOutput>,
    {
        let merged = self.merge_pages(contributions)?;
        Ok(DocumentBuilder::new(doc_id)
            .with_source(source_uri)
            .with_extras(base_metadata.clone())
            .build(merged))
    }
}

/// Merge with default options.
pub fn merge<'a, I>(
    doc_id: &str,
    source_uri: &str,
    base_metadata: &Extras,
    contributions: I,
) -> Result<CanonicalDocument>
where
    I: IntoIterator<Item = &'a NormalizedOutput>,
{
    MergeEngine::default().merge(doc_id, source_uri, base_metadata, contributions)
}

/// Text from the first source with non-blank text; blocks and tables from all.
fn reduce_page(index: u32, sources: &[&Page]) -> Page {
    let text = sources
        .iter()
        .map(|p| p.text.as_str())
        .find(|t| !t.trim().is_empty())
        .unwrap_or_default();

    let mut page = Page::with_text(index, text);
    for source in sources {
        page.blocks.extend(source.blocks.iter().cloned());
        page.tables.extend(source.tables.iter().cloned());
    }
    page
}

fn check_unique_ids(pages: &[Page]) -> Result<()> {
    let mut seen = HashSet::new();
    for id in pages.iter().flat_map(|p| p.fragment_ids()) {
        if !seen.insert(id) {
            log::error!("fragment identifier {} emitted twice", id);
            return Err(Error::IdentifierCollision { id: id.to_string() });
        }
    }
    Ok(())
}

/// Largest tool-reported count if any, else the number of observed pages.
fn page_count(contributions: &[&NormalizedOutput], observed: usize) -> u32 {
    let observed = u32::try_from(observed).unwrap_or(u32::MAX);
    let reported = contributions
        .iter()
        .filter_map(|c| c.reported_page_count)
        .max();

    match reported {
        Some(count) => {
            if count < observed {
                log::warn!(
                    "reported page count {} is below the {} observed page(s)",
                    count,
                    observed
                );
            }
            count
        }
        None => observed,
    }
}
