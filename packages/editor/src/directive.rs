//! # Directives
//!
//! Every remote edit is expressed as a [`Directive`]. Positions are absolute
//! UTF-16 offsets that already account for every directive queued before it
//! in the same batch.

use quire_common::{BulletPreset, ParagraphStyle, TableCellStyle, TextStyle};
use serde::{Deserialize, Serialize};

/// Half-open `[start, end)` range of document offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rectangle of table cells, addressed by physical row and column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRange {
    /// Start offset of the table element that owns the cells
    pub table_start: usize,
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
}

/// One queued edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Directive {
    InsertText {
        at: usize,
        text: String,
    },

    DeleteRange {
        range: TextRange,
    },

    InsertTable {
        at: usize,
        rows: usize,
        columns: usize,
    },

    /// Insert an empty row below physical row `after_row`
    #[serde(rename_all = "camelCase")]
    InsertRow {
        table_start: usize,
        after_row: usize,
    },

    #[serde(rename_all = "camelCase")]
    DeleteRow {
        table_start: usize,
        row: usize,
    },

    SetTextStyle {
        range: TextRange,
        style: TextStyle,
    },

    SetParagraphStyle {
        range: TextRange,
        style: ParagraphStyle,
    },

    SetCellStyle {
        cells: CellRange,
        style: TableCellStyle,
    },

    CreateBullets {
        range: TextRange,
        preset: BulletPreset,
    },

    CreateNamedRange {
        name: String,
        range: TextRange,
    },
}

impl Directive {
    /// Field mask for style directives, `None` for everything else
    pub fn fields(&self) -> Option<Vec<&'static str>> {
        match self {
            Directive::SetTextStyle { style, .. } => Some(style.fields()),
            Directive::SetParagraphStyle { style, .. } => Some(style.fields()),
            Directive::SetCellStyle { style, .. } => Some(style.fields()),
            _ => None,
        }
    }

    /// Net change in document length once applied, when known without the
    /// document state
    pub fn size_delta(&self) -> Option<isize> {
        match self {
            Directive::InsertText { text, .. } => {
                Some(quire_common::text::utf16_len(text) as isize)
            }
            Directive::DeleteRange { range } => Some(-(range.len() as isize)),
            Directive::SetTextStyle { .. }
            | Directive::SetParagraphStyle { .. }
            | Directive::SetCellStyle { .. }
            | Directive::CreateBullets { .. }
            | Directive::CreateNamedRange { .. } => Some(0),
            Directive::InsertTable { .. }
            | Directive::InsertRow { .. }
            | Directive::DeleteRow { .. } => None,
        }
    }
}

/// Result of one directive within a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DirectiveReply {
    #[default]
    Empty,
    NamedRange {
        id: String,
    },
}

/// Per-directive results of a batch, in directive order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReply {
    pub replies: Vec<DirectiveReply>,
}

impl BatchReply {
    /// Server-assigned id of the named range created by directive `index`
    pub fn named_range_id(&self, index: usize) -> Option<&str> {
        match self.replies.get(index)? {
            DirectiveReply::NamedRange { id } => Some(id),
            DirectiveReply::Empty => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tagged_serialization() {
        let directive = Directive::InsertRow {
            table_start: 10,
            after_row: 2,
        };
        assert_eq!(
            serde_json::to_value(&directive).unwrap(),
            json!({ "type": "insertRow", "tableStart": 10, "afterRow": 2 })
        );

        let directive = Directive::DeleteRange {
            range: TextRange::new(4, 9),
        };
        assert_eq!(
            serde_json::to_value(&directive).unwrap(),
            json!({ "type": "deleteRange", "range": { "start": 4, "end": 9 } })
        );
    }

    #[test]
    fn test_field_masks() {
        let directive = Directive::SetTextStyle {
            range: TextRange::new(0, 3),
            style: TextStyle::new().bold().with_link("https://example.com"),
        };
        assert_eq!(directive.fields(), Some(vec!["bold", "link"]));

        let directive = Directive::InsertText {
            at: 0,
            text: "x".to_string(),
        };
        assert_eq!(directive.fields(), None);
    }

    #[test]
    fn test_size_delta_counts_utf16() {
        let directive = Directive::InsertText {
            at: 0,
            text: "é😀".to_string(),
        };
        assert_eq!(directive.size_delta(), Some(3));
        assert_eq!(
            Directive::DeleteRange {
                range: TextRange::new(5, 8)
            }
            .size_delta(),
            Some(-3)
        );
    }

    #[test]
    fn test_named_range_reply_lookup() {
        let reply = BatchReply {
            replies: vec![
                DirectiveReply::Empty,
                DirectiveReply::NamedRange {
                    id: "kix.1".to_string(),
                },
            ],
        };
        assert_eq!(reply.named_range_id(1), Some("kix.1"));
        assert_eq!(reply.named_range_id(0), None);
        assert_eq!(reply.named_range_id(7), None);
    }
}
