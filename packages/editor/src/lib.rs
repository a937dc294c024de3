//! # Quire Editor
//!
//! Position-tracked batch editing for structured documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ store: DocumentStore::read → snapshot       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ chain: elements linked in document order    │
//! │  - paragraphs own inline runs               │
//! │  - tables own a row/cell size ledger        │
//! │  - offsets derived from predecessor sizes   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ ledger: directives queued in order          │
//! │  → DocumentStore::batch_update on commit    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quire_editor::{Document, MemoryDocumentStore, Span};
//!
//! let mut doc = Document::load(store, "doc-id").await?;
//!
//! let id = doc.find(|e| e.text() == "Status: draft", false).unwrap().id();
//! doc.paragraph(id)?.replace("draft", ["final"])?;
//!
//! let table = doc.first_table_after("Results").unwrap().id();
//! doc.table(table, 1)?.set(0, "Score", 42)?;
//!
//! doc.commit().await?;
//! ```

mod chain;
mod directive;
mod document;
mod paragraph;
mod snapshot;
mod store;
mod table;

pub use chain::{ElementChain, ElementId, ElementKind, ElementRef};
pub use directive::{BatchReply, CellRange, Directive, DirectiveReply, TextRange};
pub use document::{Document, HeadingSelector};
pub use paragraph::{Matcher, ParagraphMut, Span};
pub use snapshot::*;
pub use store::{DocumentStore, MemoryDocumentStore};
pub use table::{
    CellSize, RowSize, RowTarget, TableMut, TableOffsets, CELL_OVERHEAD, ROW_OVERHEAD,
    TABLE_OVERHEAD,
};

// Re-export common types for convenience
pub use quire_common::{CellValue, EditError, EditResult, Link, QuireConfig};
pub use quire_grid::{Column, RowObject, RowView};
