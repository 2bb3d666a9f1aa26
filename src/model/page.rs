//! Page-level types.

use super::{Extras, Table};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x0: f64,
    /// Top edge
    pub y0: f64,
    /// Right edge
    pub x1: f64,
    /// Bottom edge
    pub y1: f64,
}

impl BoundingBox {
    /// Create a bounding box from four ordered coordinates.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Build a box from four optional coordinates.
    ///
    /// Returns `None` unless all four are present and finite.
    pub fn from_optional(
        x0: Option<f64>,
        y0: Option<f64>,
        x1: Option<f64>,
        y1: Option<f64>,
    ) -> Option<Self> {
        match (x0, y0, x1, y1) {
            (Some(x0), Some(y0), Some(x1), Some(y1))
                if [x0, y0, x1, y1].iter().all(|v| v.is_finite()) =>
            {
                Some(Self::new(x0, y0, x1, y1))
            }
            _ => None,
        }
    }

    /// Smallest box enclosing all points, or `None` for an empty set.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        points
            .into_iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .fold(None, |acc: Option<Self>, (x, y)| {
                Some(match acc {
                    None => Self::new(x, y, x, y),
                    Some(b) => Self::new(b.x0.min(x), b.y0.min(y), b.x1.max(x), b.y1.max(y)),
                })
            })
    }

    /// Box width.
    pub fn width(&self) -> f64 {
        (self.x1 - self.x0).abs()
    }

    /// Box height.
    pub fn height(&self) -> f64 {
        (self.y1 - self.y0).abs()
    }
}

/// A contiguous unit of extracted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Identifier, unique across the whole document
    pub id: String,

    /// Owning page (0-indexed)
    pub page_index: u32,

    /// Text content; empty but never null
    pub text: String,

    /// Position on the page, when the tool supplied geometry
    pub bbox: Option<BoundingBox>,

    /// Tool that produced this block
    pub tool: String,

    /// Tool-specific data that does not fit the canonical shape
    #[serde(default)]
    pub extra: Extras,
}

impl TextBlock {
    /// Create a block without geometry.
    pub fn new(
        id: impl Into<String>,
        page_index: u32,
        text: impl Into<String>,
        tool: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            page_index,
            text: text.into(),
            bbox: None,
            tool: tool.into(),
            extra: Extras::new(),
        }
    }

    /// Set the bounding box and return self.
    pub fn with_bbox(mut self, bbox: Option<BoundingBox>) -> Self {
        self.bbox = bbox;
        self
    }

    /// Set the extras map and return self.
    pub fn with_extra(mut self, extra: Extras) -> Self {
        self.extra = extra;
        self
    }

    /// Check if the block carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A single page of the canonical document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page index (0-indexed)
    pub index: u32,

    /// Full concatenated page text
    #[serde(default)]
    pub text: String,

    /// Text blocks in emission order
    #[serde(default)]
    pub blocks: Vec<TextBlock>,

    /// Tables in emission order
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Page {
    /// Create an empty page.
    pub fn new(index: u32) -> Self {
        Self {
            index,
            text: String::new(),
            blocks: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// Create a page with text and no fragments.
    pub fn with_text(index: u32, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::new(index)
        }
    }

    /// Add a block to the page.
    pub fn add_block(&mut self, block: TextBlock) {
        self.blocks.push(block);
    }

    /// Add a table to the page.
    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// Check if the page has neither text nor fragments.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.blocks.is_empty() && self.tables.is_empty()
    }

    /// Check that every fragment references this page.
    pub fn is_consistent(&self) -> bool {
        self.blocks.iter().all(|b| b.page_index == self.index)
            && self.tables.iter().all(|t| t.page_index == self.index)
    }

    /// Iterate over every fragment identifier on the page.
    pub fn fragment_ids(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .map(|b| b.id.as_str())
            .chain(self.tables.iter().map(|t| t.id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_from_optional() {
        let bbox = BoundingBox::from_optional(Some(1.0), Some(2.0), Some(3.0), Some(4.0));
        assert_eq!(bbox, Some(BoundingBox::new(1.0, 2.0, 3.0, 4.0)));

        assert!(BoundingBox::from_optional(Some(1.0), None, Some(3.0), Some(4.0)).is_none());
        let nan = BoundingBox::from_optional(Some(f64::NAN), Some(2.0), Some(3.0), Some(4.0));
        assert!(nan.is_none());
    }

    #[test]
    fn test_bbox_enclosing() {
        let bbox = BoundingBox::enclosing([(10.0, 5.0), (2.0, 8.0), (7.0, 1.0)]).unwrap();
        assert_eq!(bbox, BoundingBox::new(2.0, 1.0, 10.0, 8.0));
        assert_eq!(bbox.width(), 8.0);
        assert_eq!(bbox.height(), 7.0);

        assert!(BoundingBox::enclosing(Vec::<(f64, f64)>::new()).is_none());
    }

    #[test]
    fn test_page_consistency() {
        let mut page = Page::with_text(2, "hello");
        page.add_block(TextBlock::new("b1", 2, "hello", "layout"));
        assert!(page.is_consistent());
        assert!(!page.is_empty());

        page.add_block(TextBlock::new("b2", 3, "stray", "layout"));
        assert!(!page.is_consistent());
    }

    #[test]
    fn test_page_empty() {
        let page = Page::with_text(0, "  \n");
        assert!(page.is_empty());
    }

    #[test]
    fn test_block_serializes_null_bbox() {
        let block = TextBlock::new("b1", 0, "", "text_layer");
        let json = serde_json::to_value(&block).unwrap();
        assert!(json["bbox"].is_null());
        assert_eq!(json["text"], "");
    }
}
