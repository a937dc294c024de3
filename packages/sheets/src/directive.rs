use quire_common::CellValue;
use serde::{Deserialize, Serialize};

/// One queued spreadsheet edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SheetDirective {
    /// Write a single cell. `row` counts header rows.
    #[serde(rename_all = "camelCase")]
    UpdateCell {
        sheet_id: Option<i64>,
        row: usize,
        col: usize,
        value: CellValue,
    },

    /// Grow the tab by `count` blank rows
    #[serde(rename_all = "camelCase")]
    AppendRows { sheet_id: Option<i64>, count: usize },
}
