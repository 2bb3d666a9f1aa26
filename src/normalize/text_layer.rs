//! Normalizer for the fast text-layer extractor.

use serde_json::Value;

use super::{FragmentContext, NormalizeOptions, Normalizer};
use crate::error::Result;
use crate::extract::{TextLayerContent, TextLayerPage};
use crate::model::{BoundingBox, Extras, Page, TextBlock};

/// Maps text-layer block tuples to positioned text blocks.
///
/// The text-layer tool reports no tables.
#[derive(Debug, Clone, Default)]
pub struct TextLayerNormalizer {
    options: NormalizeOptions,
}

impl TextLayerNormalizer {
    /// Create a normalizer with the given options.
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    fn normalize_page(
        &self,
        record: &TextLayerPage,
        ctx: &mut FragmentContext<'_>,
    ) -> Result<Page> {
        let index = record.page_index;
        let mut page = Page::with_text(index, record.text.clone().unwrap_or_default());

        for fragment in &record.blocks {
            let id = ctx.next_block_id(index);
            let Some(native) = fragment.parsed() else {
                ctx.malformed(index, "block record is not a tuple")?;
                continue;
            };
            let bbox = BoundingBox::from_optional(native.x0, native.y0, native.x1, native.y1);

            if native.text.is_none() && bbox.is_none() {
                ctx.malformed(index, "block has neither text nor geometry")?;
                continue;
            }

            let mut extra = Extras::new();
            if let Some(block_no) = native.block_no {
                extra.insert("block_no".to_string(), Value::from(block_no));
            }
            if let Some(block_type) = native.block_type {
                extra.insert("block_type".to_string(), Value::from(block_type));
            }

            let text = native.text.clone().unwrap_or_default();
            page.add_block(
                TextBlock::new(id, index, text, ctx.tool())
                    .with_bbox(bbox)
                    .with_extra(extra),
            );
        }

        Ok(page)
    }
}

impl Normalizer for TextLayerNormalizer {
    type Input = TextLayerContent;

    fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    fn normalize_into(
        &self,
        input: &TextLayerContent,
        ctx: &mut FragmentContext<'_>,
    ) -> Result<Vec<Page>> {
        input
            .pages
            .iter()
            .map(|record| self.normalize_page(record, ctx))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::extract::{NativeFragment, TextLayerBlock};

    fn content(blocks: Vec<TextLayerBlock>) -> TextLayerContent {
        fragments(blocks.into_iter().map(NativeFragment::from).collect())
    }

    fn fragments(blocks: Vec<NativeFragment<TextLayerBlock>>) -> TextLayerContent {
        TextLayerContent {
            pages: vec![TextLayerPage {
                page_index: 0,
                text: Some("Invoice 42".to_string()),
                blocks,
            }],
        }
    }

    #[test]
    fn test_blocks_with_geometry() {
        let normalizer = TextLayerNormalizer::default();
        let mut block = TextLayerBlock::new(10.0, 20.0, 110.0, 40.0, "Invoice 42");
        block.block_no = Some(0);
        let pages = normalizer.normalize("text_layer", &content(vec![block])).unwrap();

        assert_eq!(pages.len(), 1);
        let page = &pages[0];
        assert_eq!(page.text, "Invoice 42");
        assert_eq!(page.blocks.len(), 1);
        assert_eq!(page.blocks[0].tool, "text_layer");
        assert_eq!(page.blocks[0].page_index, 0);
        assert_eq!(page.blocks[0].bbox, Some(BoundingBox::new(10.0, 20.0, 110.0, 40.0)));
        assert_eq!(page.blocks[0].extra.get("block_no"), Some(&Value::from(0)));
        assert!(page.tables.is_empty());
    }

    #[test]
    fn test_unparsable_geometry_keeps_block() {
        let block = TextLayerBlock {
            x0: None,
            text: Some("kept".to_string()),
            ..TextLayerBlock::new(0.0, 0.0, 1.0, 1.0, "")
        };
        let pages = TextLayerNormalizer::default()
            .normalize("text_layer", &content(vec![block]))
            .unwrap();
        assert_eq!(pages[0].blocks.len(), 1);
        assert_eq!(pages[0].blocks[0].text, "kept");
        assert!(pages[0].blocks[0].bbox.is_none());
    }

    #[test]
    fn test_geometry_without_text_keeps_empty_text() {
        let block = TextLayerBlock {
            text: None,
            ..TextLayerBlock::new(0.0, 0.0, 1.0, 1.0, "")
        };
        let pages = TextLayerNormalizer::default()
            .normalize("text_layer", &content(vec![block]))
            .unwrap();
        assert_eq!(pages[0].blocks[0].text, "");
        assert!(pages[0].blocks[0].bbox.is_some());
    }

    #[test]
    fn test_malformed_block_dropped() {
        let good = TextLayerBlock::new(0.0, 0.0, 1.0, 1.0, "good");
        let empty = TextLayerBlock::default();
        let normalizer = TextLayerNormalizer::new(NormalizeOptions::new().deterministic_ids());
        let pages = normalizer
            .normalize("text_layer", &content(vec![empty, good]))
            .unwrap();

        assert_eq!(pages[0].blocks.len(), 1);
        assert_eq!(pages[0].blocks[0].id, "text_layer_p0_b1");
    }

    #[test]
    fn test_malformed_block_strict() {
        let normalizer = TextLayerNormalizer::new(NormalizeOptions::new().strict());
        let result = normalizer.normalize("text_layer", &content(vec![TextLayerBlock::default()]));
        assert!(matches!(result, Err(Error::MalformedFragment { .. })));
    }

    #[test]
    fn test_non_tuple_record_dropped() {
        let blocks: Vec<NativeFragment<TextLayerBlock>> = vec![
            NativeFragment::Malformed(Value::Null),
            TextLayerBlock::new(0.0, 0.0, 1.0, 1.0, "good").into(),
        ];
        let normalizer = TextLayerNormalizer::new(NormalizeOptions::new().deterministic_ids());
        let pages = normalizer.normalize("text_layer", &fragments(blocks.clone())).unwrap();
        assert_eq!(pages[0].blocks.len(), 1);
        assert_eq!(pages[0].blocks[0].text, "good");
        assert_eq!(pages[0].blocks[0].id, "text_layer_p0_b1");

        let strict = TextLayerNormalizer::new(NormalizeOptions::new().strict());
        assert!(matches!(
            strict.normalize("text_layer", &fragments(blocks)),
            Err(Error::MalformedFragment { page_index: 0, .. })
        ));
    }

    #[test]
    fn test_missing_text_is_empty_string() {
        let input = TextLayerContent {
            pages: vec![TextLayerPage {
                page_index: 5,
                text: None,
                blocks: Vec::new(),
            }],
        };
        let pages = TextLayerNormalizer::default().normalize("text_layer", &input).unwrap();
        assert_eq!(pages[0].index, 5);
        assert_eq!(pages[0].text, "");
    }

    #[test]
    fn test_zero_pages() {
        let pages = TextLayerNormalizer::default()
            .normalize("text_layer", &TextLayerContent::default())
            .unwrap();
        assert!(pages.is_empty());
    }
}
