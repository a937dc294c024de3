//! # Document Handle
//!
//! A [`Document`] owns one loaded element chain and the ledger of directives
//! queued against it.
//!
//! ## Lifecycle
//!
//! ```text
//! load ─► query / edit (queue directives) ─► commit ─► edit … ─► commit
//!   ▲                                                              │
//!   └──────────────────────────── reload ◄─────────────────────────┘
//! ```
//!
//! Edits never touch the store. Each one updates element sizes in memory so
//! the next edit is addressed against the document as it will be once every
//! queued directive has landed. `commit` sends the whole queue as one batch.

use quire_common::{CellValue, EditError, EditResult, MutationLedger, QuireConfig};
use std::fmt;
use tracing::{debug, info, instrument};

use crate::chain::{ElementChain, ElementId, ElementRef};
use crate::directive::{BatchReply, Directive, TextRange};
use crate::paragraph::ParagraphMut;
use crate::snapshot::DocumentSnapshot;
use crate::store::DocumentStore;
use crate::table::{TableElement, TableMut};

/// Picks a heading paragraph
pub enum HeadingSelector {
    /// First heading starting at or after this offset
    Offset(usize),
    /// Heading whose text is exactly this
    Text(String),
    Predicate(Box<dyn Fn(&str) -> bool + Send + Sync>),
}

impl HeadingSelector {
    pub fn predicate(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        HeadingSelector::Predicate(Box::new(f))
    }

    /// Only heading paragraphs ever match
    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        if !element.is_heading() {
            return false;
        }
        match self {
            HeadingSelector::Offset(min) => element.start() >= *min,
            HeadingSelector::Text(text) => element.text() == *text,
            HeadingSelector::Predicate(f) => f(&element.text()),
        }
    }
}

impl fmt::Debug for HeadingSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadingSelector::Offset(min) => f.debug_tuple("Offset").field(min).finish(),
            HeadingSelector::Text(text) => f.debug_tuple("Text").field(text).finish(),
            HeadingSelector::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<usize> for HeadingSelector {
    fn from(offset: usize) -> Self {
        HeadingSelector::Offset(offset)
    }
}

impl From<&str> for HeadingSelector {
    fn from(text: &str) -> Self {
        HeadingSelector::Text(text.to_string())
    }
}

impl From<String> for HeadingSelector {
    fn from(text: String) -> Self {
        HeadingSelector::Text(text)
    }
}

/// Editable remote document
pub struct Document<S: DocumentStore> {
    id: String,
    store: S,
    config: QuireConfig,
    title: Option<String>,
    chain: ElementChain,
    ledger: MutationLedger<Directive>,
}

impl<S: DocumentStore> Document<S> {
    /// Read a document from `store` with default configuration
    pub async fn load(store: S, id: &str) -> EditResult<Self> {
        Self::load_with_config(store, id, QuireConfig::default()).await
    }

    #[instrument(skip_all, fields(document = %id))]
    pub async fn load_with_config(store: S, id: &str, config: QuireConfig) -> EditResult<Self> {
        let snapshot = store.read(id).await?;
        let document = Self::from_snapshot(store, id, snapshot, config)?;
        info!(elements = document.chain.len(), "Loaded document");
        Ok(document)
    }

    /// Build from an already fetched snapshot
    pub fn from_snapshot(
        store: S,
        id: impl Into<String>,
        snapshot: DocumentSnapshot,
        config: QuireConfig,
    ) -> EditResult<Self> {
        let chain = ElementChain::build(snapshot.content())?;
        Ok(Self {
            id: id.into(),
            store,
            config,
            title: snapshot.title,
            chain,
            ledger: MutationLedger::new(),
        })
    }

    /// Discard the chain, queued directives and loaded tables, then read the
    /// document again. Nothing is discarded if the read fails.
    #[instrument(skip(self), fields(document = %self.id))]
    pub async fn reload(&mut self) -> EditResult<()> {
        let snapshot = self.store.read(&self.id).await?;
        let chain = ElementChain::build(snapshot.content())?;

        let dropped = self.ledger.len();
        self.ledger.clear();
        self.chain = chain;
        self.title = snapshot.title;
        info!(elements = self.chain.len(), dropped, "Reloaded document");
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &QuireConfig {
        &self.config
    }

    pub fn chain(&self) -> &ElementChain {
        &self.chain
    }

    /// Directives queued since the last commit, in application order
    pub fn pending(&self) -> &[Directive] {
        self.ledger.pending()
    }

    pub fn head(&self) -> EditResult<ElementRef<'_>> {
        self.chain.head()
    }

    pub fn tail(&self) -> EditResult<ElementRef<'_>> {
        self.chain.tail()
    }

    pub fn element(&self, id: ElementId) -> EditResult<ElementRef<'_>> {
        self.chain.element(id)
    }

    pub fn find(
        &self,
        predicate: impl FnMut(&ElementRef<'_>) -> bool,
        reverse: bool,
    ) -> Option<ElementRef<'_>> {
        self.chain.find(predicate, reverse)
    }

    fn heading(&self, selector: &HeadingSelector) -> Option<ElementRef<'_>> {
        self.chain.find(|element| selector.matches(element), false)
    }

    /// Current start of the first heading matching `selector`
    pub fn offset(&self, selector: impl Into<HeadingSelector>) -> Option<usize> {
        self.heading(&selector.into()).map(|heading| heading.start())
    }

    /// First live element after the matching heading
    pub fn first_element_after(
        &self,
        selector: impl Into<HeadingSelector>,
    ) -> Option<ElementRef<'_>> {
        let heading = self.heading(&selector.into())?;
        heading.next().ok()?.find(|_| true, false)
    }

    /// First table after the matching heading
    pub fn first_table_after(&self, selector: impl Into<HeadingSelector>) -> Option<ElementRef<'_>> {
        let heading = self.heading(&selector.into())?;
        heading.next().ok()?.find(|element| element.is_table(), false)
    }

    /// Live elements from the `start` heading (inclusive) up to the `end`
    /// heading (exclusive) or the end of the document
    pub fn elements_between(
        &self,
        start: impl Into<HeadingSelector>,
        end: Option<HeadingSelector>,
    ) -> Vec<ElementRef<'_>> {
        let mut elements = Vec::new();
        let mut cursor = self.heading(&start.into());
        while let Some(element) = cursor {
            if end.as_ref().is_some_and(|end| end.matches(&element)) {
                break;
            }
            if !element.is_deleted() {
                elements.push(element);
            }
            cursor = element.next().ok();
        }
        elements
    }

    pub fn tables_between(
        &self,
        start: impl Into<HeadingSelector>,
        end: Option<HeadingSelector>,
    ) -> Vec<ElementRef<'_>> {
        self.elements_between(start, end)
            .into_iter()
            .filter(|element| element.is_table())
            .collect()
    }

    /// Queue a directive, returning its index within the next batch
    pub fn request(&mut self, directive: Directive) -> usize {
        self.ledger.request(directive)
    }

    /// Queue a named range; read its id from the commit reply with
    /// [`BatchReply::named_range_id`]
    pub fn create_named_range(&mut self, name: impl Into<String>, range: TextRange) -> usize {
        self.ledger.request(Directive::CreateNamedRange {
            name: name.into(),
            range,
        })
    }

    /// Send every queued directive as one batch.
    ///
    /// Does nothing when the queue is empty. On failure the queue is kept, so
    /// calling again resubmits the same batch.
    #[instrument(skip(self), fields(document = %self.id, pending = self.ledger.len()))]
    pub async fn commit(&mut self) -> EditResult<BatchReply> {
        if self.ledger.is_empty() {
            debug!("Nothing to commit");
            return Ok(BatchReply::default());
        }

        let reply = self
            .store
            .batch_update(&self.id, self.ledger.pending())
            .await?;
        info!(count = self.ledger.len(), "Committed batch");
        self.ledger.clear();
        Ok(reply)
    }

    pub fn paragraph(&mut self, id: ElementId) -> EditResult<ParagraphMut<'_>> {
        let index = self.chain.resolve(id)?;
        self.chain.paragraph_mut(index)?;
        Ok(ParagraphMut {
            chain: &mut self.chain,
            ledger: &mut self.ledger,
            index,
        })
    }

    /// Open a table with `frozen_rows` header rows. A table keeps the frozen
    /// count it was first opened with.
    pub fn table(&mut self, id: ElementId, frozen_rows: usize) -> EditResult<TableMut<'_>> {
        let index = self.chain.resolve(id)?;
        let strict = self.config.strict_table_sizes;
        let (links, table) = self.chain.table_parts(index)?;
        table.load(frozen_rows, links.size(index), strict)?;
        Ok(TableMut {
            links,
            table,
            ledger: &mut self.ledger,
            index,
        })
    }

    /// Open a table with the configured default number of header rows
    pub fn table_with_defaults(&mut self, id: ElementId) -> EditResult<TableMut<'_>> {
        let frozen_rows = self.config.default_frozen_rows;
        self.table(id, frozen_rows)
    }

    /// Delete an element. Deleting it again does nothing.
    pub fn delete(&mut self, id: ElementId) -> EditResult<()> {
        let index = self.chain.resolve(id)?;
        self.chain.delete(index, &mut self.ledger);
        Ok(())
    }

    /// Insert a new table with one header row in front of `before`
    pub fn insert_table_before(
        &mut self,
        before: ElementId,
        headers: Vec<CellValue>,
    ) -> EditResult<ElementId> {
        if headers.is_empty() {
            return Err(EditError::structural("a table needs at least one column"));
        }
        let target = self.chain.resolve(before)?;
        let table = TableElement::pending(headers)?;
        let index = self
            .chain
            .insert_table_before(target, table, &mut self.ledger)?;
        Ok(self.chain.id_of(index))
    }
}

impl<S: DocumentStore> fmt::Debug for Document<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("elements", &self.chain.len())
            .field("pending", &self.ledger.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;
    use serde_json::json;

    fn paragraph(start: usize, content: &str, heading: bool) -> serde_json::Value {
        let end = start + content.encode_utf16().count();
        let style = if heading {
            json!({ "headingId": format!("h.{}", start), "namedStyleType": "HEADING_1" })
        } else {
            json!({ "namedStyleType": "NORMAL_TEXT" })
        };
        json!({
            "startIndex": start,
            "endIndex": end,
            "paragraph": {
                "elements": [{ "startIndex": start, "endIndex": end, "textRun": { "content": content } }],
                "paragraphStyle": style
            }
        })
    }

    fn outline() -> Document<MemoryDocumentStore> {
        let snapshot: DocumentSnapshot = serde_json::from_value(json!({
            "body": { "content": [
                { "endIndex": 1, "sectionBreak": {} },
                paragraph(1, "Intro\n", true),
                paragraph(7, "body\n", false),
                paragraph(12, "Intro\n", false),
                paragraph(18, "Next\n", true),
            ] }
        }))
        .unwrap();
        Document::from_snapshot(
            MemoryDocumentStore::new(),
            "doc",
            snapshot,
            QuireConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_selectors_match_headings_only() {
        let doc = outline();
        assert_eq!(doc.offset("Intro"), Some(1));
        assert_eq!(doc.offset(2usize), Some(18));
        assert_eq!(doc.offset(HeadingSelector::predicate(|t| t.starts_with('N'))), Some(18));
        assert_eq!(doc.offset("body"), None);
    }

    #[test]
    fn test_elements_between_headings() {
        let doc = outline();
        let texts: Vec<String> = doc
            .elements_between("Intro", Some("Next".into()))
            .iter()
            .map(|e| e.text())
            .collect();
        assert_eq!(texts, vec!["Intro", "body", "Intro"]);

        assert_eq!(doc.elements_between("Next", None).len(), 1);
        assert!(doc.elements_between("Missing", None).is_empty());
        assert_eq!(doc.first_element_after("Intro").unwrap().text(), "body");
        assert!(doc.first_table_after("Intro").is_none());
    }
}
