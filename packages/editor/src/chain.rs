//! # Element Chain
//!
//! The document body as a doubly linked list of elements stored in an arena.
//!
//! ## Offsets
//!
//! No element stores its absolute position. The head keeps the start it was
//! loaded with; every other element starts where its predecessor ends, and
//! ends `size` units later. Changing one element's size therefore moves every
//! element after it without touching them.
//!
//! ## Identity
//!
//! Nodes are never removed. Deleting an element tombstones it (size 0, skipped
//! by searches), so an [`ElementId`] stays valid for the life of the chain. Ids
//! carry the chain's generation; an id from a discarded chain is rejected.

use quire_common::{EditError, EditResult, MutationLedger};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::directive::{Directive, TextRange};
use crate::paragraph::Paragraph;
use crate::snapshot::StructuralElement;
use crate::table::TableElement;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Stable handle to one element of a loaded chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId {
    index: usize,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Paragraph,
    Table,
    SectionBreak,
    TableOfContents,
}

#[derive(Debug, Clone)]
struct Slot {
    prev: Option<usize>,
    next: Option<usize>,
    initial_start: usize,
    size: usize,
    deleted: bool,
}

/// Positions and links of every element, kept apart from payloads so a table
/// can be edited while its offsets are computed
#[derive(Debug, Clone)]
pub(crate) struct ChainLinks {
    generation: u64,
    slots: Vec<Slot>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl ChainLinks {
    fn new() -> Self {
        Self {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn id_of(&self, index: usize) -> ElementId {
        ElementId {
            index,
            generation: self.generation,
        }
    }

    fn resolve(&self, id: ElementId) -> EditResult<usize> {
        if id.generation != self.generation {
            return Err(EditError::not_initialized(
                "element id belongs to a discarded chain; look it up again after reload",
            ));
        }
        if id.index >= self.slots.len() {
            return Err(EditError::not_initialized(format!(
                "unknown element {}",
                id.index
            )));
        }
        Ok(id.index)
    }

    /// Current start: the head's initial start plus every predecessor's size
    pub(crate) fn start(&self, index: usize) -> usize {
        let mut offset = 0;
        let mut first = index;
        let mut cursor = self.slots[index].prev;
        while let Some(prev) = cursor {
            offset += self.slots[prev].size;
            first = prev;
            cursor = self.slots[prev].prev;
        }
        self.slots[first].initial_start + offset
    }

    pub(crate) fn end(&self, index: usize) -> usize {
        self.start(index) + self.slots[index].size
    }

    pub(crate) fn size(&self, index: usize) -> usize {
        self.slots[index].size
    }

    pub(crate) fn set_size(&mut self, index: usize, size: usize) {
        let slot = &mut self.slots[index];
        if slot.size != size {
            debug!(element = index, from = slot.size, to = size, "Resized element");
            slot.size = size;
        }
    }

    fn is_deleted(&self, index: usize) -> bool {
        self.slots[index].deleted
    }

    fn push(&mut self, initial_start: usize, size: usize) -> usize {
        self.slots.push(Slot {
            prev: None,
            next: None,
            initial_start,
            size,
            deleted: false,
        });
        self.slots.len() - 1
    }

    fn link_before(&mut self, target: usize, node: usize) {
        let prev = self.slots[target].prev;
        self.slots[node].prev = prev;
        self.slots[node].next = Some(target);
        self.slots[target].prev = Some(node);
        match prev {
            Some(prev) => self.slots[prev].next = Some(node),
            None => self.head = Some(node),
        }
    }

    fn link_after(&mut self, target: usize, node: usize) {
        let next = self.slots[target].next;
        self.slots[node].next = next;
        self.slots[node].prev = Some(target);
        self.slots[target].next = Some(node);
        match next {
            Some(next) => self.slots[next].prev = Some(node),
            None => self.tail = Some(node),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Payload {
    Paragraph(Paragraph),
    Table(TableElement),
    SectionBreak,
    TableOfContents,
}

impl Payload {
    fn kind(&self) -> ElementKind {
        match self {
            Payload::Paragraph(_) => ElementKind::Paragraph,
            Payload::Table(_) => ElementKind::Table,
            Payload::SectionBreak => ElementKind::SectionBreak,
            Payload::TableOfContents => ElementKind::TableOfContents,
        }
    }
}

/// Ordered structural elements of one loaded document
#[derive(Debug, Clone)]
pub struct ElementChain {
    pub(crate) links: ChainLinks,
    payloads: Vec<Payload>,
}

impl ElementChain {
    /// Build a chain from the remote element list.
    ///
    /// Every element needs an end index. Only the first may omit its start
    /// (it is then 0), and each must start where the previous one ended.
    pub fn build(elements: &[StructuralElement]) -> EditResult<Self> {
        let mut chain = Self {
            links: ChainLinks::new(),
            payloads: Vec::with_capacity(elements.len()),
        };

        let mut last: Option<(usize, usize)> = None;
        for (position, element) in elements.iter().enumerate() {
            let end = element.end_index.ok_or_else(|| {
                EditError::structural(format!("element {} has no end index", position))
            })?;
            let start = match (element.start_index, position) {
                (Some(start), _) => start,
                (None, 0) => 0,
                (None, _) => {
                    return Err(EditError::structural(format!(
                        "element {} has no start index",
                        position
                    )))
                }
            };
            if end < start {
                return Err(EditError::structural(format!(
                    "element {} ends before it starts ({}..{})",
                    position, start, end
                )));
            }
            if let Some((_, previous_end)) = last {
                if previous_end != start {
                    return Err(EditError::structural(format!(
                        "element {} starts at {} but the previous element ends at {}",
                        position, start, previous_end
                    )));
                }
            }

            let payload = if let Some(paragraph) = &element.paragraph {
                Payload::Paragraph(Paragraph::parse(paragraph, start, end)?)
            } else if let Some(table) = &element.table {
                Payload::Table(TableElement::parse(table)?)
            } else if element.section_break.is_some() {
                Payload::SectionBreak
            } else if element.table_of_contents.is_some() {
                Payload::TableOfContents
            } else {
                return Err(EditError::structural(format!(
                    "element {} at {} has no recognised content",
                    position, start
                )));
            };

            let index = chain.links.push(start, end - start);
            chain.payloads.push(payload);
            match last {
                Some((prev, _)) => chain.links.link_after(prev, index),
                None => {
                    chain.links.head = Some(index);
                    chain.links.tail = Some(index);
                }
            }
            last = Some((index, end));
        }

        Ok(chain)
    }

    /// Live (non-deleted) elements
    pub fn len(&self) -> usize {
        self.links.slots.iter().filter(|slot| !slot.deleted).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn head(&self) -> EditResult<ElementRef<'_>> {
        self.links
            .head
            .map(|index| self.view(index))
            .ok_or_else(|| EditError::not_initialized("document has no elements"))
    }

    pub fn tail(&self) -> EditResult<ElementRef<'_>> {
        self.links
            .tail
            .map(|index| self.view(index))
            .ok_or_else(|| EditError::not_initialized("document has no elements"))
    }

    pub fn element(&self, id: ElementId) -> EditResult<ElementRef<'_>> {
        let index = self.links.resolve(id)?;
        Ok(self.view(index))
    }

    /// First live element matching `predicate`, scanning from the head, or
    /// from the tail when `reverse` is set
    pub fn find(
        &self,
        predicate: impl FnMut(&ElementRef<'_>) -> bool,
        reverse: bool,
    ) -> Option<ElementRef<'_>> {
        let start = if reverse { self.links.tail } else { self.links.head }?;
        self.view(start).find(predicate, reverse)
    }

    /// Live elements in document order
    pub fn iter(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        let mut cursor = self.links.head;
        std::iter::from_fn(move || {
            let index = cursor?;
            cursor = self.links.slots[index].next;
            Some(self.view(index))
        })
        .filter(|element| !element.is_deleted())
    }

    pub(crate) fn view(&self, index: usize) -> ElementRef<'_> {
        ElementRef { chain: self, index }
    }

    pub(crate) fn resolve(&self, id: ElementId) -> EditResult<usize> {
        self.links.resolve(id)
    }

    pub(crate) fn id_of(&self, index: usize) -> ElementId {
        self.links.id_of(index)
    }

    pub(crate) fn start(&self, index: usize) -> usize {
        self.links.start(index)
    }

    pub(crate) fn end(&self, index: usize) -> usize {
        self.links.end(index)
    }

    pub(crate) fn set_size(&mut self, index: usize, size: usize) {
        self.links.set_size(index, size);
    }

    fn assert_live(&self, index: usize) -> EditResult<()> {
        if self.links.is_deleted(index) {
            Err(EditError::not_initialized(format!(
                "element {} was deleted",
                index
            )))
        } else {
            Ok(())
        }
    }

    pub(crate) fn paragraph_mut(&mut self, index: usize) -> EditResult<&mut Paragraph> {
        self.assert_live(index)?;
        match &mut self.payloads[index] {
            Payload::Paragraph(paragraph) => Ok(paragraph),
            other => Err(EditError::structural(format!(
                "element {} is a {:?}, not a paragraph",
                index,
                other.kind()
            ))),
        }
    }

    /// Split borrow of the links and one table payload
    pub(crate) fn table_parts(&mut self, index: usize) -> EditResult<(&mut ChainLinks, &mut TableElement)> {
        self.assert_live(index)?;
        match &mut self.payloads[index] {
            Payload::Table(table) => Ok((&mut self.links, table)),
            other => Err(EditError::structural(format!(
                "element {} is a {:?}, not a table",
                index,
                other.kind()
            ))),
        }
    }

    /// Splice a table in front of `target` and activate it
    pub(crate) fn insert_table_before(
        &mut self,
        target: usize,
        table: TableElement,
        ledger: &mut MutationLedger<Directive>,
    ) -> EditResult<usize> {
        self.assert_live(target)?;
        let index = self.links.push(self.links.start(target), 0);
        self.payloads.push(Payload::Table(table));
        self.links.link_before(target, index);
        debug!(element = index, before = target, "Spliced table");

        self.activate(index, ledger)?;
        Ok(index)
    }

    /// Queue whatever creates an inserted element remotely
    pub(crate) fn activate(
        &mut self,
        index: usize,
        ledger: &mut MutationLedger<Directive>,
    ) -> EditResult<()> {
        let start = self.links.start(index);
        match &mut self.payloads[index] {
            Payload::Table(table) => {
                table.activate(start, ledger)?;
                let size = table.element_size();
                self.links.set_size(index, size);
                Ok(())
            }
            _ => Err(EditError::structural("only tables can be activated")),
        }
    }

    pub(crate) fn insert_paragraph_after(
        &mut self,
        target: usize,
        paragraph: Paragraph,
    ) -> EditResult<usize> {
        self.assert_live(target)?;
        let size = paragraph.size();
        let index = self.links.push(self.links.end(target), size);
        self.payloads.push(Payload::Paragraph(paragraph));
        self.links.link_after(target, index);
        debug!(element = index, after = target, "Spliced paragraph");
        Ok(index)
    }

    /// Queue removal of the element's current range and tombstone it
    pub(crate) fn delete(
        &mut self,
        index: usize,
        ledger: &mut MutationLedger<Directive>,
    ) {
        if self.links.is_deleted(index) {
            return;
        }

        let range = TextRange::new(self.links.start(index), self.links.end(index));
        if !range.is_empty() {
            ledger.request(Directive::DeleteRange { range });
        }
        self.links.set_size(index, 0);
        self.links.slots[index].deleted = true;
        debug!(element = index, start = range.start, end = range.end, "Deleted element");
    }
}

/// Read-only view of one element
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    chain: &'a ElementChain,
    index: usize,
}

impl<'a> ElementRef<'a> {
    pub fn id(&self) -> ElementId {
        self.chain.links.id_of(self.index)
    }

    pub fn kind(&self) -> ElementKind {
        self.chain.payloads[self.index].kind()
    }

    pub fn start(&self) -> usize {
        self.chain.links.start(self.index)
    }

    pub fn end(&self) -> usize {
        self.chain.links.end(self.index)
    }

    pub fn size(&self) -> usize {
        self.chain.links.size(self.index)
    }

    pub fn is_deleted(&self) -> bool {
        self.chain.links.is_deleted(self.index)
    }

    pub fn is_paragraph(&self) -> bool {
        self.kind() == ElementKind::Paragraph
    }

    pub fn is_table(&self) -> bool {
        self.kind() == ElementKind::Table
    }

    /// Paragraph text without its terminator; empty for other elements
    pub fn text(&self) -> String {
        match &self.chain.payloads[self.index] {
            Payload::Paragraph(paragraph) => paragraph.text(),
            _ => String::new(),
        }
    }

    pub fn is_heading(&self) -> bool {
        match &self.chain.payloads[self.index] {
            Payload::Paragraph(paragraph) => paragraph.is_heading(),
            _ => false,
        }
    }

    /// `(rows, columns)` of a table element
    pub fn table_dimensions(&self) -> Option<(usize, usize)> {
        match &self.chain.payloads[self.index] {
            Payload::Table(table) if table.is_activated() => {
                Some((table.row_count(), table.column_count()))
            }
            _ => None,
        }
    }

    pub fn next(&self) -> EditResult<ElementRef<'a>> {
        self.chain.links.slots[self.index]
            .next
            .map(|index| self.chain.view(index))
            .ok_or_else(|| EditError::not_initialized("no element after the tail"))
    }

    pub fn prev(&self) -> EditResult<ElementRef<'a>> {
        self.chain.links.slots[self.index]
            .prev
            .map(|index| self.chain.view(index))
            .ok_or_else(|| EditError::not_initialized("no element before the head"))
    }

    /// First live element matching `predicate`, starting with this one
    pub fn find(
        &self,
        mut predicate: impl FnMut(&ElementRef<'_>) -> bool,
        reverse: bool,
    ) -> Option<ElementRef<'a>> {
        let mut cursor = Some(self.index);
        while let Some(index) = cursor {
            let element = self.chain.view(index);
            if !element.is_deleted() && predicate(&element) {
                return Some(element);
            }
            let slot = &self.chain.links.slots[index];
            cursor = if reverse { slot.prev } else { slot.next };
        }
        None
    }
}
