//! Shape of a spreadsheet as returned by the remote read, with cell data
//! already coerced to [`CellValue`]s.

use quire_common::CellValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetSnapshot {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sheets: Vec<SheetSnapshot>,
}

impl SpreadsheetSnapshot {
    pub fn sheet(&self, title: &str) -> Option<&SheetSnapshot> {
        self.sheets.iter().find(|sheet| sheet.title == title)
    }
}

/// One tab
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSnapshot {
    #[serde(default)]
    pub sheet_id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub frozen_row_count: usize,
    /// Rows the tab has room for, filled or not
    #[serde(default)]
    pub row_count: usize,
    /// Filled rows, headers included
    #[serde(default)]
    pub rows: Vec<Vec<CellValue>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_sheet() {
        let snapshot: SpreadsheetSnapshot = serde_json::from_value(json!({
            "spreadsheetId": "s1",
            "title": "Budget",
            "sheets": [{
                "sheetId": 7,
                "title": "Costs",
                "frozenRowCount": 1,
                "rowCount": 1000,
                "rows": [["Item", "Cost"], ["Paper", 12.5], ["Ink", null]]
            }]
        }))
        .unwrap();

        let sheet = snapshot.sheet("Costs").unwrap();
        assert_eq!(sheet.sheet_id, Some(7));
        assert_eq!(sheet.rows[1][1], CellValue::Number(12.5));
        assert_eq!(sheet.rows[2][1], CellValue::Empty);
        assert!(snapshot.sheet("Missing").is_none());
    }
}
