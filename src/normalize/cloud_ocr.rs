//! Normalizer for the cloud OCR extractor.
//!
//! Cloud OCR output carries one document-wide text string; paragraphs, page
//! text and table cells refer to it through byte-range anchors.

use serde_json::Value;

use super::{FragmentContext, NormalizeOptions, Normalizer};
use crate::error::Result;
use crate::extract::{CloudOcrContent, CloudOcrPage, CloudOcrTable, Vertex};
use crate::model::{BoundingBox, Extras, Page, Table, TableCell, TextBlock};

/// Resolves text anchors and polygons into canonical fragments.
#[derive(Debug, Clone, Default)]
pub struct CloudOcrNormalizer {
    options: NormalizeOptions,
}

impl CloudOcrNormalizer {
    /// Create a normalizer with the given options.
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    fn normalize_page(
        &self,
        doc_text: &str,
        record: &CloudOcrPage,
        ctx: &mut FragmentContext<'_>,
    ) -> Result<Page> {
        let index = record.page_index;
        let mut page = Page::new(index);

        for paragraph in &record.paragraphs {
            let id = ctx.next_block_id(index);
            let text = paragraph
                .text_anchor
                .as_ref()
                .and_then(|anchor| anchor.resolve(doc_text));
            let bbox = polygon_bbox(&paragraph.bounding_poly);

            if text.is_none() && bbox.is_none() {
                ctx.malformed(index, "paragraph has neither resolvable text nor geometry")?;
                continue;
            }

            let mut extra = Extras::new();
            if let Some(confidence) = paragraph.confidence {
                extra.insert("confidence".to_string(), Value::from(confidence));
            }

            page.add_block(
                TextBlock::new(id, index, text.unwrap_or_default(), ctx.tool())
                    .with_bbox(bbox)
                    .with_extra(extra),
            );
        }

        page.text = match record.text_anchor.as_ref().map(|a| a.resolve(doc_text)) {
            Some(Some(text)) => text,
            resolved => {
                if resolved.is_some() {
                    log::debug!("{}: page {} text anchor out of range", ctx.tool(), index);
                }
                page.blocks
                    .iter()
                    .map(|b| b.text.as_str())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        };

        for native in &record.tables {
            let id = ctx.next_table_id(index);
            if native.header_rows.is_empty() && native.body_rows.is_empty() {
                ctx.malformed(index, "table has no rows")?;
                continue;
            }
            let table = table_from_rows(id, index, doc_text, native, ctx)?;
            page.add_table(table);
        }

        Ok(page)
    }
}

impl Normalizer for CloudOcrNormalizer {
    type Input = CloudOcrContent;

    fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    fn normalize_into(
        &self,
        input: &CloudOcrContent,
        ctx: &mut FragmentContext<'_>,
    ) -> Result<Vec<Page>> {
        input
            .pages
            .iter()
            .map(|record| self.normalize_page(&input.text, record, ctx))
            .collect()
    }
}

/// Flatten header and body rows into one sparse table.
///
/// Column positions honour `col_span`; cells without an anchor are omitted.
/// A cell whose span overflows the column range is malformed and ends its row.
fn table_from_rows(
    id: String,
    page_index: u32,
    doc_text: &str,
    native: &CloudOcrTable,
    ctx: &mut FragmentContext<'_>,
) -> Result<Table> {
    let mut table = Table::new(id, page_index, ctx.tool());
    let rows = native.header_rows.iter().chain(&native.body_rows);

    for (row, native_row) in rows.enumerate() {
        let mut col = 0u32;
        for cell in &native_row.cells {
            let span = cell.col_span.unwrap_or(1).max(1);
            let Some(next) = col.checked_add(span) else {
                ctx.malformed(page_index, "table cell spans past the last column")?;
                break;
            };
            if let Some(anchor) = &cell.text_anchor {
                match anchor.resolve(doc_text) {
                    Some(text) => table.add_cell(TableCell {
                        row: row as u32,
                        col,
                        text,
                        bbox: polygon_bbox(&cell.bounding_poly),
                    }),
                    None => ctx.malformed(page_index, "table cell anchor out of range")?,
                }
            }
            col = next;
        }
    }

    table.extra.insert(
        "header_rows".to_string(),
        Value::from(native.header_rows.len()),
    );
    Ok(table)
}

/// Enclosing box of the polygon's complete vertices.
fn polygon_bbox(vertices: &[Vertex]) -> Option<BoundingBox> {
    BoundingBox::enclosing(vertices.iter().filter_map(|v| Some((v.x?, v.y?))))
}
