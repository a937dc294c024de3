//! # Document Snapshots
//!
//! Shape of a document as returned by the remote read. Every index is an
//! absolute UTF-16 offset into the document body, valid for this snapshot only.
//!
//! All payload fields are optional on the wire; validation happens when the
//! element chain is built, not here.

use serde::{Deserialize, Serialize};

const UNKNOWN_PERSON: &str = "{unknown person}";
const UNKNOWN_RICH_LINK: &str = "{unknown rich link}";

fn first_present<'a>(candidates: [Option<&'a str>; 2], fallback: &'a str) -> &'a str {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or(fallback)
}

/// Display text of a person mention: name, then email
pub(crate) fn person_display<'a>(name: Option<&'a str>, email: Option<&'a str>) -> &'a str {
    first_present([name, email], UNKNOWN_PERSON)
}

/// Display text of a rich link: title, then uri
pub(crate) fn rich_link_display<'a>(title: Option<&'a str>, uri: Option<&'a str>) -> &'a str {
    first_present([title, uri], UNKNOWN_RICH_LINK)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<BodySnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

/// One top-level block: exactly one payload is expected to be set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralElement {
    #[serde(default)]
    pub start_index: Option<usize>,
    #[serde(default)]
    pub end_index: Option<usize>,
    #[serde(default)]
    pub paragraph: Option<ParagraphSnapshot>,
    #[serde(default)]
    pub table: Option<TableSnapshot>,
    #[serde(default)]
    pub section_break: Option<serde_json::Value>,
    #[serde(default)]
    pub table_of_contents: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphSnapshot {
    #[serde(default)]
    pub elements: Vec<InlineSnapshot>,
    #[serde(default)]
    pub paragraph_style: Option<ParagraphStyleSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyleSnapshot {
    #[serde(default)]
    pub heading_id: Option<String>,
    #[serde(default)]
    pub named_style_type: Option<String>,
}

/// Inline run inside a paragraph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineSnapshot {
    #[serde(default)]
    pub start_index: Option<usize>,
    #[serde(default)]
    pub end_index: Option<usize>,
    #[serde(default)]
    pub text_run: Option<TextRunSnapshot>,
    #[serde(default)]
    pub person: Option<PersonSnapshot>,
    #[serde(default)]
    pub rich_link: Option<RichLinkSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRunSnapshot {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSnapshot {
    #[serde(default)]
    pub person_properties: Option<PersonProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonProperties {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichLinkSnapshot {
    #[serde(default)]
    pub rich_link_properties: Option<RichLinkProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichLinkProperties {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    #[serde(default)]
    pub rows: Option<usize>,
    #[serde(default)]
    pub columns: Option<usize>,
    #[serde(default)]
    pub table_rows: Vec<TableRowSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRowSnapshot {
    #[serde(default)]
    pub start_index: Option<usize>,
    #[serde(default)]
    pub end_index: Option<usize>,
    #[serde(default)]
    pub table_cells: Vec<TableCellSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCellSnapshot {
    #[serde(default)]
    pub start_index: Option<usize>,
    #[serde(default)]
    pub end_index: Option<usize>,
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

impl DocumentSnapshot {
    /// Top-level elements in document order
    pub fn content(&self) -> &[StructuralElement] {
        self.body
            .as_ref()
            .map(|body| body.content.as_slice())
            .unwrap_or(&[])
    }
}

impl InlineSnapshot {
    /// Text content, or the rendered placeholder of a mention or rich link
    pub fn display(&self) -> &str {
        if let Some(person) = &self.person {
            let props = person.person_properties.as_ref();
            return person_display(
                props.and_then(|p| p.name.as_deref()),
                props.and_then(|p| p.email.as_deref()),
            );
        }
        if let Some(link) = &self.rich_link {
            let props = link.rich_link_properties.as_ref();
            return rich_link_display(
                props.and_then(|p| p.title.as_deref()),
                props.and_then(|p| p.uri.as_deref()),
            );
        }
        self.text_run.as_ref().map(|run| run.content.as_str()).unwrap_or("")
    }
}

impl TableCellSnapshot {
    /// Plain text of every paragraph in the cell, joined by newlines, with
    /// each paragraph's terminator removed
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|element| element.paragraph.as_ref())
            .map(|paragraph| {
                let text: String = paragraph.elements.iter().map(InlineSnapshot::display).collect();
                text.strip_suffix('\n').unwrap_or(&text).to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
