//! Snapshot fixtures with consistent indices

#![allow(dead_code)]

use quire_editor::{DocumentSnapshot, MemoryDocumentStore};
use serde_json::{json, Value};

fn units(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Builds a document body element by element, keeping indices contiguous
pub struct DocBuilder {
    content: Vec<Value>,
    cursor: usize,
}

impl DocBuilder {
    /// Starts with the leading section break every body has
    pub fn new() -> Self {
        Self {
            content: vec![json!({ "endIndex": 1, "sectionBreak": {} })],
            cursor: 1,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn push_paragraph(mut self, text: &str, heading: bool) -> Self {
        let content = format!("{}\n", text);
        let start = self.cursor;
        let end = start + units(&content);
        let style = if heading {
            json!({ "headingId": format!("h.{}", start), "namedStyleType": "HEADING_2" })
        } else {
            json!({ "namedStyleType": "NORMAL_TEXT" })
        };
        self.content.push(json!({
            "startIndex": start,
            "endIndex": end,
            "paragraph": {
                "elements": [{ "startIndex": start, "endIndex": end, "textRun": { "content": content } }],
                "paragraphStyle": style
            }
        }));
        self.cursor = end;
        self
    }

    pub fn paragraph(self, text: &str) -> Self {
        self.push_paragraph(text, false)
    }

    pub fn heading(self, text: &str) -> Self {
        self.push_paragraph(text, true)
    }

    /// Paragraph whose end lands exactly on `index`
    pub fn pad_to(self, index: usize) -> Self {
        let filler = "x".repeat(index - self.cursor - 1);
        self.paragraph(&filler)
    }

    /// Table whose cells hold one paragraph of the given text each
    pub fn table(mut self, rows: &[&[&str]]) -> Self {
        let start = self.cursor;
        let mut cursor = start + 1;
        let mut table_rows = Vec::new();

        for row in rows {
            let row_start = cursor;
            cursor += 1;
            let mut cells = Vec::new();
            for text in row.iter() {
                let cell_start = cursor;
                let content = format!("{}\n", text);
                let paragraph_end = cell_start + 1 + units(&content);
                cells.push(json!({
                    "startIndex": cell_start,
                    "endIndex": paragraph_end,
                    "content": [{
                        "startIndex": cell_start + 1,
                        "endIndex": paragraph_end,
                        "paragraph": {
                            "elements": [{
                                "startIndex": cell_start + 1,
                                "endIndex": paragraph_end,
                                "textRun": { "content": content }
                            }]
                        }
                    }]
                }));
                cursor = paragraph_end;
            }
            table_rows.push(json!({
                "startIndex": row_start,
                "endIndex": cursor,
                "tableCells": cells
            }));
        }

        let end = cursor + 1;
        self.content.push(json!({
            "startIndex": start,
            "endIndex": end,
            "table": {
                "rows": rows.len(),
                "columns": rows.first().map(|r| r.len()).unwrap_or(0),
                "tableRows": table_rows
            }
        }));
        self.cursor = end;
        self
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        serde_json::from_value(json!({
            "documentId": "doc",
            "title": "Fixture",
            "body": { "content": self.content }
        }))
        .expect("fixture snapshot is well formed")
    }

    pub fn store(&self) -> MemoryDocumentStore {
        MemoryDocumentStore::with_document("doc", self.snapshot())
    }
}
