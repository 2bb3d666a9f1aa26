//! Native extraction payloads.
//!
//! Every extractor adapter returns a [`RawPayload`]: a tool tag, a small
//! metadata record, and page records in that tool's own shape. Each tool's
//! shape is a closed, typed variant of [`NativeContent`], so a normalizer
//! never has to probe an untyped map for keys.

use crate::model::Extras;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Kind of extraction tool, which selects the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Fast text-layer extractor (page text + positioned block tuples)
    TextLayer,
    /// Layout-aware extractor (page text + positioned blocks + tables)
    Layout,
    /// Cloud OCR extractor (anchored paragraphs + tables)
    CloudOcr,
}

impl ToolKind {
    /// All kinds in default priority order.
    pub const ALL: [ToolKind; 3] = [ToolKind::TextLayer, ToolKind::Layout, ToolKind::CloudOcr];

    /// Default tool name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::TextLayer => "text_layer",
            ToolKind::Layout => "layout",
            ToolKind::CloudOcr => "cloud_ocr",
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one extractor adapter run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPayload {
    /// Tool tag
    pub tool: String,

    /// Run metadata
    #[serde(default)]
    pub meta: PayloadMeta,

    /// Page records in the tool's native shape
    pub content: NativeContent,
}

impl RawPayload {
    /// Create a payload from native content.
    pub fn new(tool: impl Into<String>, content: NativeContent) -> Self {
        let tool = tool.into();
        Self {
            meta: PayloadMeta {
                tool: tool.clone(),
                ..Default::default()
            },
            tool,
            content,
        }
    }

    /// Create an empty payload for a tool that degraded gracefully.
    pub fn skipped(tool: impl Into<String>, kind: ToolKind, reason: impl Into<String>) -> Self {
        let mut payload = Self::new(tool, NativeContent::empty(kind));
        payload.meta.skipped = true;
        payload.meta.reason = Some(reason.into());
        payload
    }

    /// Set the tool-reported page count and return self.
    pub fn with_num_pages(mut self, num_pages: u32) -> Self {
        self.meta.num_pages = Some(num_pages);
        self
    }

    /// Kind of tool that produced the payload.
    pub fn kind(&self) -> ToolKind {
        self.content.kind()
    }

    /// Check if the tool reported that it did not run.
    pub fn is_skipped(&self) -> bool {
        self.meta.skipped
    }

    /// Effective tool name: payload tag, then meta tag, then the kind's default.
    pub fn tool_name(&self) -> &str {
        if !self.tool.trim().is_empty() {
            &self.tool
        } else if !self.meta.tool.trim().is_empty() {
            &self.meta.tool
        } else {
            self.kind().as_str()
        }
    }

    /// Number of native page records.
    pub fn page_record_count(&self) -> usize {
        self.content.page_record_count()
    }
}

/// Run metadata reported by an adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadMeta {
    /// Tool tag
    #[serde(default)]
    pub tool: String,

    /// Authoritative total page count, if the tool knows it
    #[serde(default)]
    pub num_pages: Option<u32>,

    /// Whether the tool degraded to an empty result
    #[serde(default)]
    pub skipped: bool,

    /// Why the tool was skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Tool-specific page records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NativeContent {
    /// Text-layer extractor output
    TextLayer(TextLayerContent),
    /// Layout-aware extractor output
    Layout(LayoutContent),
    /// Cloud OCR output
    CloudOcr(CloudOcrContent),
}

impl NativeContent {
    /// Empty content for the given tool kind.
    pub fn empty(kind: ToolKind) -> Self {
        match kind {
            ToolKind::TextLayer => NativeContent::TextLayer(TextLayerContent::default()),
            ToolKind::Layout => NativeContent::Layout(LayoutContent::default()),
            ToolKind::CloudOcr => NativeContent::CloudOcr(CloudOcrContent::default()),
        }
    }

    /// Kind of tool this content belongs to.
    pub fn kind(&self) -> ToolKind {
        match self {
            NativeContent::TextLayer(_) => ToolKind::TextLayer,
            NativeContent::Layout(_) => ToolKind::Layout,
            NativeContent::CloudOcr(_) => ToolKind::CloudOcr,
        }
    }

    /// Number of page records.
    pub fn page_record_count(&self) -> usize {
        match self {
            NativeContent::TextLayer(c) => c.pages.len(),
            NativeContent::Layout(c) => c.pages.len(),
            NativeContent::CloudOcr(c) => c.pages.len(),
        }
    }
}

/// A native fragment record as it arrived from the tool.
///
/// Records that do not fit the tool's shape are kept verbatim, so one bad
/// record is reported by the normalizer instead of failing the whole payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NativeFragment<T> {
    /// Record in the expected shape
    Parsed(T),
    /// Record in any other shape
    Malformed(Value),
}

impl<T> NativeFragment<T> {
    /// The decoded record, if it had the expected shape.
    pub fn parsed(&self) -> Option<&T> {
        match self {
            NativeFragment::Parsed(record) => Some(record),
            NativeFragment::Malformed(_) => None,
        }
    }
}

impl<T> From<T> for NativeFragment<T> {
    fn from(record: T) -> Self {
        NativeFragment::Parsed(record)
    }
}

// ---------------------------------------------------------------------------
// Text-layer extractor
// ---------------------------------------------------------------------------

/// Text-layer extractor pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLayerContent {
    /// Page records
    #[serde(default)]
    pub pages: Vec<TextLayerPage>,
}

/// One text-layer page record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayerPage {
    /// Page index (0-indexed)
    pub page_index: u32,

    /// Page text
    #[serde(default)]
    pub text: Option<String>,

    /// Block tuples
    #[serde(default)]
    pub blocks: Vec<NativeFragment<TextLayerBlock>>,
}

/// A text-layer block, encoded natively as the tuple
/// `[x0, y0, x1, y1, text, block_no, block_type]`.
///
/// Entries that are missing or not numeric decode to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Value>", into = "Vec<Value>")]
pub struct TextLayerBlock {
    /// Left edge
    pub x0: Option<f64>,
    /// Top edge
    pub y0: Option<f64>,
    /// Right edge
    pub x1: Option<f64>,
    /// Bottom edge
    pub y1: Option<f64>,
    /// Block text
    pub text: Option<String>,
    /// Block number assigned by the tool
    pub block_no: Option<i64>,
    /// Block type (0 = text, 1 = image)
    pub block_type: Option<i64>,
}

impl TextLayerBlock {
    /// Create a text block tuple.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64, text: impl Into<String>) -> Self {
        Self {
            x0: Some(x0),
            y0: Some(y0),
            x1: Some(x1),
            y1: Some(y1),
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

impl From<Vec<Value>> for TextLayerBlock {
    fn from(values: Vec<Value>) -> Self {
        let num = |i: usize| values.get(i).and_then(value_as_f64);
        let int = |i: usize| values.get(i).and_then(Value::as_i64);
        Self {
            x0: num(0),
            y0: num(1),
            x1: num(2),
            y1: num(3),
            text: values.get(4).and_then(|v| v.as_str()).map(str::to_string),
            block_no: int(5),
            block_type: int(6),
        }
    }
}

impl From<TextLayerBlock> for Vec<Value> {
    fn from(block: TextLayerBlock) -> Self {
        let num = |v: Option<f64>| v.map(Value::from).unwrap_or(Value::Null);
        let mut values = vec![
            num(block.x0),
            num(block.y0),
            num(block.x1),
            num(block.y1),
            block.text.map(Value::from).unwrap_or(Value::Null),
        ];
        if block.block_no.is_some() || block.block_type.is_some() {
            values.push(block.block_no.map(Value::from).unwrap_or(Value::Null));
            values.push(block.block_type.map(Value::from).unwrap_or(Value::Null));
        }
        values
    }
}

// ---------------------------------------------------------------------------
// Layout-aware extractor
// ---------------------------------------------------------------------------

/// Layout extractor pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutContent {
    /// Page records
    #[serde(default)]
    pub pages: Vec<LayoutPage>,
}

/// A native layout table: rows of optional cell strings.
pub type LayoutTable = Vec<Vec<Option<String>>>;

/// One layout page record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPage {
    /// Page index (0-indexed)
    pub page_index: u32,

    /// Page text
    #[serde(default)]
    pub text: Option<String>,

    /// Positioned text blocks
    #[serde(default)]
    pub blocks: Vec<NativeFragment<LayoutBlock>>,

    /// Tables as row-major grids; `null` marks a cell the tool did not fill
    #[serde(default)]
    pub tables: Vec<LayoutTable>,
}

/// A positioned layout block (`top`/`bottom` are the vertical edges).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    /// Block text
    #[serde(default)]
    pub text: Option<String>,
    /// Left edge
    #[serde(default, deserialize_with = "lenient_f64")]
    pub x0: Option<f64>,
    /// Top edge
    #[serde(default, deserialize_with = "lenient_f64")]
    pub top: Option<f64>,
    /// Right edge
    #[serde(default, deserialize_with = "lenient_f64")]
    pub x1: Option<f64>,
    /// Bottom edge
    #[serde(default, deserialize_with = "lenient_f64")]
    pub bottom: Option<f64>,
    /// Any other attributes the tool reported (fonts, sizes, ...)
    #[serde(flatten)]
    pub extra: Extras,
}

// ---------------------------------------------------------------------------
// Cloud OCR extractor
// ---------------------------------------------------------------------------

/// Cloud OCR output: the full document text plus page records that index into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudOcrContent {
    /// Full document text
    #[serde(default)]
    pub text: String,

    /// Page records
    #[serde(default)]
    pub pages: Vec<CloudOcrPage>,
}

/// One cloud OCR page record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudOcrPage {
    /// Page index (0-indexed)
    pub page_index: u32,

    /// Anchor of the page's text in the document text
    #[serde(default)]
    pub text_anchor: Option<TextAnchor>,

    /// Detected paragraphs
    #[serde(default)]
    pub paragraphs: Vec<CloudOcrParagraph>,

    /// Detected tables
    #[serde(default)]
    pub tables: Vec<CloudOcrTable>,
}

/// Byte ranges into the document text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnchor {
    /// Segments, concatenated in order
    #[serde(default)]
    pub text_segments: Vec<TextSegment>,
}

impl TextAnchor {
    /// Anchor covering a single range.
    pub fn span(start_index: usize, end_index: usize) -> Self {
        Self {
            text_segments: vec![TextSegment {
                start_index,
                end_index,
            }],
        }
    }

    /// Resolve the anchor against the document text.
    ///
    /// Returns `None` if any segment falls outside the text or splits a
    /// character.
    pub fn resolve(&self, text: &str) -> Option<String> {
        let mut out = String::new();
        for seg in &self.text_segments {
            out.push_str(text.get(seg.start_index..seg.end_index)?);
        }
        Some(out)
    }
}

/// A half-open byte range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    /// Start offset (inclusive)
    #[serde(default)]
    pub start_index: usize,
    /// End offset (exclusive)
    #[serde(default)]
    pub end_index: usize,
}

/// A polygon vertex in page space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Horizontal coordinate
    #[serde(default, deserialize_with = "lenient_f64")]
    pub x: Option<f64>,
    /// Vertical coordinate
    #[serde(default, deserialize_with = "lenient_f64")]
    pub y: Option<f64>,
}

impl Vertex {
    /// Create a vertex.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }
}

/// A detected paragraph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudOcrParagraph {
    /// Anchor of the paragraph text
    #[serde(default)]
    pub text_anchor: Option<TextAnchor>,

    /// Bounding polygon
    #[serde(default)]
    pub bounding_poly: Vec<Vertex>,

    /// Detection confidence
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// A detected table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudOcrTable {
    /// Header rows, top to bottom
    #[serde(default)]
    pub header_rows: Vec<CloudOcrRow>,

    /// Body rows, top to bottom
    #[serde(default)]
    pub body_rows: Vec<CloudOcrRow>,
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudOcrRow {
    /// Cells, left to right
    #[serde(default)]
    pub cells: Vec<CloudOcrCell>,
}

/// A table cell. A cell without an anchor carries no content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudOcrCell {
    /// Anchor of the cell text
    #[serde(default)]
    pub text_anchor: Option<TextAnchor>,

    /// Number of columns the cell spans
    #[serde(default)]
    pub col_span: Option<u32>,

    /// Bounding polygon
    #[serde(default)]
    pub bounding_poly: Vec<Vertex>,
}

/// Interpret a JSON value as a coordinate: numbers and numeric strings.
fn value_as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Deserialize a coordinate, mapping anything unparsable to `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value))
}
