//! Normalizer for the layout-aware extractor.

use serde_json::Value;

use super::{FragmentContext, NormalizeOptions, Normalizer};
use crate::error::Result;
use crate::extract::{LayoutContent, LayoutPage, LayoutTable};
use crate::model::{BoundingBox, Extras, Page, Table, TableCell, TextBlock};

/// Maps layout blocks and table grids to canonical fragments.
///
/// Table cells the tool reported as `null` are omitted, so tables stay
/// sparse. Cells the tool materialized as empty strings are kept as-is.
#[derive(Debug, Clone, Default)]
pub struct LayoutNormalizer {
    options: NormalizeOptions,
}

impl LayoutNormalizer {
    /// Create a normalizer with the given options.
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    fn normalize_page(
        &self,
        record: &LayoutPage,
        ctx: &mut FragmentContext<'_>,
    ) -> Result<Page> {
        let index = record.page_index;
        let text = record.text.clone().unwrap_or_default();
        let mut page = Page::with_text(index, text);

        for fragment in &record.blocks {
            let id = ctx.next_block_id(index);
            let Some(native) = fragment.parsed() else {
                ctx.malformed(index, "block record is not an object")?;
                continue;
            };
            let bbox = BoundingBox::from_optional(native.x0, native.top, native.x1, native.bottom);

            if native.text.is_none() && bbox.is_none() {
                ctx.malformed(index, "block has neither text nor geometry")?;
                continue;
            }

            page.add_block(
                TextBlock::new(id, index, native.text.clone().unwrap_or_default(), ctx.tool())
                    .with_bbox(bbox)
                    .with_extra(native.extra.clone()),
            );
        }

        // Without positioned blocks the page text itself is the only block.
        if record.blocks.is_empty() && !page.text.trim().is_empty() {
            let mut extra = Extras::new();
            extra.insert("granularity".to_string(), Value::from("page"));
            let id = ctx.next_block_id(index);
            let block = TextBlock::new(id, index, page.text.clone(), ctx.tool()).with_extra(extra);
            page.add_block(block);
        }

        for native in &record.tables {
            let id = ctx.next_table_id(index);
            if native.is_empty() {
                ctx.malformed(index, "table has no rows")?;
                continue;
            }
            page.add_table(table_from_grid(id, index, ctx.tool(), native));
        }

        Ok(page)
    }
}

impl Normalizer for LayoutNormalizer {
    type Input = LayoutContent;

    fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    fn normalize_into(
        &self,
        input: &LayoutContent,
        ctx: &mut FragmentContext<'_>,
    ) -> Result<Vec<Page>> {
        input
            .pages
            .iter()
            .map(|record| self.normalize_page(record, ctx))
            .collect()
    }
}

/// Build a sparse table from a row-major grid, skipping `null` cells.
fn table_from_grid(id: String, page_index: u32, tool: &str, grid: &LayoutTable) -> Table {
    let mut table = Table::new(id, page_index, tool);

    for (row, cells) in grid.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            if let Some(text) = cell {
                table.add_cell(TableCell::new(row as u32, col as u32, text.clone()));
            }
        }
    }

    let cols = grid.iter().map(Vec::len).max().unwrap_or(0);
    table.extra.insert("grid_rows".to_string(), Value::from(grid.len()));
    table.extra.insert("grid_cols".to_string(), Value::from(cols));
    table
}
