//! Per-tool normalization into the canonical page model.
//!
//! Each extraction tool has one normalizer that turns its native page records
//! into canonical [`Page`]s, assigning fragment identifiers and provenance
//! tags on the way. Malformed fragments are dropped by default; see
//! [`FragmentPolicy`].

mod cloud_ocr;
mod layout;
mod options;
mod text_layer;

pub use cloud_ocr::CloudOcrNormalizer;
pub use layout::LayoutNormalizer;
pub use options::{FragmentPolicy, IdStrategy, NormalizeOptions};
pub use text_layer::TextLayerNormalizer;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::extract::{NativeContent, RawPayload, ToolKind};
use crate::model::Page;

/// Converts one tool's native page records into canonical pages.
pub trait Normalizer {
    /// Native content this normalizer accepts.
    type Input;

    /// Options in effect.
    fn options(&self) -> &NormalizeOptions;

    /// Normalize using an existing fragment context.
    fn normalize_into(
        &self,
        input: &Self::Input,
        ctx: &mut FragmentContext<'_>,
    ) -> Result<Vec<Page>>;

    /// Normalize native content produced by `tool`.
    ///
    /// Emits exactly one page per native page record, in record order.
    fn normalize(&self, tool: &str, input: &Self::Input) -> Result<Vec<Page>> {
        let mut ctx = FragmentContext::new(tool, self.options());
        self.normalize_into(input, &mut ctx)
    }
}

/// Per-call state shared by the normalizers: identifier counters and the
/// malformed-fragment policy.
#[derive(Debug)]
pub struct FragmentContext<'a> {
    tool: &'a str,
    options: &'a NormalizeOptions,
    ordinals: HashMap<u32, (usize, usize)>,
    dropped: usize,
}

impl<'a> FragmentContext<'a> {
    /// Create a context for one normalization call.
    pub fn new(tool: &'a str, options: &'a NormalizeOptions) -> Self {
        Self {
            tool,
            options,
            ordinals: HashMap::new(),
            dropped: 0,
        }
    }

    /// Tool name used as the provenance tag.
    pub fn tool(&self) -> &'a str {
        self.tool
    }

    /// Number of fragments dropped so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Identifier for the next native block on a page.
    ///
    /// The ordinal advances even if the block is later dropped, so the
    /// identifiers of surviving blocks do not depend on their neighbours.
    pub fn next_block_id(&mut self, page_index: u32) -> String {
        let slot = self.ordinals.entry(page_index).or_default();
        let ordinal = slot.0;
        slot.0 += 1;
        match self.options.id_strategy {
            IdStrategy::Random => Uuid::new_v4().to_string(),
            IdStrategy::Deterministic => format!("{}_p{}_b{}", self.tool, page_index, ordinal),
        }
    }

    /// Identifier for the next native table on a page.
    pub fn next_table_id(&mut self, page_index: u32) -> String {
        let slot = self.ordinals.entry(page_index).or_default();
        let ordinal = slot.1;
        slot.1 += 1;
        format!("{}_p{}_t{}", self.tool, page_index, ordinal)
    }

    /// Report a malformed fragment.
    ///
    /// Lenient mode logs and returns `Ok` so the caller can skip the fragment;
    /// strict mode returns `Error::MalformedFragment`.
    pub fn malformed(&mut self, page_index: u32, reason: &str) -> Result<()> {
        match self.options.fragment_policy {
            FragmentPolicy::Lenient => {
                log::debug!(
                    "{}: dropping fragment on page {}: {}",
                    self.tool,
                    page_index,
                    reason
                );
                self.dropped += 1;
                Ok(())
            }
            FragmentPolicy::Strict => Err(Error::MalformedFragment {
                tool: self.tool.to_string(),
                page_index,
                reason: reason.to_string(),
            }),
        }
    }
}

/// Normalized contribution of one tool, ready for merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedOutput {
    /// Tool name
    pub tool: String,

    /// Tool kind
    pub kind: ToolKind,

    /// Canonical pages in native record order
    pub pages: Vec<Page>,

    /// Authoritative page count reported by the tool
    pub reported_page_count: Option<u32>,

    /// Whether the tool reported that it did not run
    pub skipped: bool,

    /// Why the tool was skipped
    pub skip_reason: Option<String>,

    /// Number of malformed fragments dropped
    pub dropped_fragments: usize,
}

impl NormalizedOutput {
    /// Create a contribution from already-normalized pages.
    pub fn new(tool: impl Into<String>, kind: ToolKind, pages: Vec<Page>) -> Self {
        Self {
            tool: tool.into(),
            kind,
            pages,
            reported_page_count: None,
            skipped: false,
            skip_reason: None,
            dropped_fragments: 0,
        }
    }

    /// Create an empty contribution for a tool that did not run.
    pub fn skipped(tool: impl Into<String>, kind: ToolKind, reason: Option<String>) -> Self {
        Self {
            skipped: true,
            skip_reason: reason,
            ..Self::new(tool, kind, Vec::new())
        }
    }

    /// Set the reported page count and return self.
    pub fn with_reported_page_count(mut self, count: Option<u32>) -> Self {
        self.reported_page_count = count;
        self
    }

    /// Check whether this tool supplied at least one non-empty page.
    ///
    /// A page counts when it has non-blank text, a block or a table.
    pub fn contributes(&self) -> bool {
        self.pages.iter().any(|page| !page.is_empty())
    }
}

/// Normalize a raw payload with the normalizer matching its kind.
///
/// A skipped payload yields an empty contribution, never an error. A reported
/// page count of zero is treated as absent.
pub fn normalize_payload(
    payload: &RawPayload,
    options: &NormalizeOptions,
) -> Result<NormalizedOutput> {
    let tool = payload.tool_name();
    let kind = payload.kind();

    if payload.is_skipped() {
        log::info!(
            "{} skipped: {}",
            tool,
            payload.meta.reason.as_deref().unwrap_or("no reason given")
        );
        return Ok(NormalizedOutput::skipped(tool, kind, payload.meta.reason.clone()));
    }

    let mut ctx = FragmentContext::new(tool, options);
    let pages = match &payload.content {
        NativeContent::TextLayer(content) => {
            TextLayerNormalizer::new(options.clone()).normalize_into(content, &mut ctx)?
        }
        NativeContent::Layout(content) => {
            LayoutNormalizer::new(options.clone()).normalize_into(content, &mut ctx)?
        }
        NativeContent::CloudOcr(content) => {
            CloudOcrNormalizer::new(options.clone()).normalize_into(content, &mut ctx)?
        }
    };

    let dropped = ctx.dropped();
    if dropped > 0 {
        log::warn!("{}: dropped {} malformed fragment(s)", tool, dropped);
    }
    log::debug!("{}: normalized {} page(s)", tool, pages.len());

    let mut output = NormalizedOutput::new(tool, kind, pages)
        .with_reported_page_count(payload.meta.num_pages.filter(|n| *n > 0));
    output.dropped_fragments = dropped;
    Ok(output)
}
