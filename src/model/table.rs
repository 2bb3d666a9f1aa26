//! Table types.

use super::{BoundingBox, Extras};
use serde::{Deserialize, Serialize};

/// A table extracted by one tool.
///
/// Cells are stored sparsely: a table need not cover a dense rectangle, and
/// positions the tool reported as missing are simply absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Identifier, deterministic per tool, page and ordinal
    pub id: String,

    /// Owning page (0-indexed)
    pub page_index: u32,

    /// Cells in row-major emission order
    #[serde(default)]
    pub cells: Vec<TableCell>,

    /// Tool that produced this table
    pub tool: String,

    /// Tool-specific data that does not fit the canonical shape
    #[serde(default)]
    pub extra: Extras,
}

impl Table {
    /// Create an empty table.
    pub fn new(id: impl Into<String>, page_index: u32, tool: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            page_index,
            cells: Vec::new(),
            tool: tool.into(),
            extra: Extras::new(),
        }
    }

    /// Add a cell to the table.
    pub fn add_cell(&mut self, cell: TableCell) {
        self.cells.push(cell);
    }

    /// Look up a cell by position.
    pub fn cell(&self, row: u32, col: u32) -> Option<&TableCell> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }

    /// Number of rows spanned (highest row index + 1).
    pub fn row_count(&self) -> u32 {
        self.cells.iter().map(|c| c.row + 1).max().unwrap_or(0)
    }

    /// Number of columns spanned (highest column index + 1).
    pub fn column_count(&self) -> u32 {
        self.cells.iter().map(|c| c.col + 1).max().unwrap_or(0)
    }

    /// Check if the table has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Check whether every grid position up to the extent has a cell.
    pub fn is_dense(&self) -> bool {
        self.cells.len() as u64 == self.row_count() as u64 * self.column_count() as u64
    }

    /// Check that no two cells share a (row, col) pair.
    pub fn has_unique_positions(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.cells.len());
        self.cells.iter().all(|c| seen.insert((c.row, c.col)))
    }

    /// Get plain text representation (tab-separated columns, one line per row).
    pub fn plain_text(&self) -> String {
        let rows = self.row_count();
        let cols = self.column_count();
        (0..rows)
            .map(|r| {
                (0..cols)
                    .map(|c| self.cell(r, c).map(|cell| cell.text.as_str()).unwrap_or(""))
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Row index (0-indexed)
    pub row: u32,

    /// Column index (0-indexed)
    pub col: u32,

    /// Cell text; may be empty
    #[serde(default)]
    pub text: String,

    /// Cell position, when the tool supplied geometry
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
}

impl TableCell {
    /// Create a cell without geometry.
    pub fn new(row: u32, col: u32, text: impl Into<String>) -> Self {
        Self {
            row,
            col,
            text: text.into(),
            bbox: None,
        }
    }
}
