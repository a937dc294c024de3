//! # Table Offset Model
//!
//! A table's cells are addressed by (row, column) but the remote store only
//! understands absolute offsets. Every cell's position is derived from a size
//! ledger:
//!
//! ```text
//! table   = open(1) + Σ rows + close(1)
//! row     = open(1) + Σ cells
//! cell    = open(1) + content + terminator(1)
//! ```
//!
//! so the content of cell (r, c) starts at
//! `table_start + 1 + Σ_{r' < r} row + 1 + Σ_{c' < c} cell + 1`.
//!
//! Every write updates the ledger and pushes the new total into the owning
//! element, which keeps every later element's offset correct as well.

use quire_common::text::utf16_len;
use quire_common::{CellStyle, CellValue, EditError, EditResult, MutationLedger, TextStyle};
use quire_grid::{Column, Grid, GridSource, RowObject, RowView};
use tracing::{debug, warn};

use crate::chain::{ChainLinks, ElementId};
use crate::directive::{CellRange, Directive, TextRange};
use crate::snapshot::TableSnapshot;

/// Cell open marker plus the cell paragraph's terminator
pub const CELL_OVERHEAD: usize = 2;
/// Row open marker
pub const ROW_OVERHEAD: usize = 1;
/// Table open and close markers
pub const TABLE_OVERHEAD: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellSize {
    pub content_len: usize,
}

impl CellSize {
    pub fn size(&self) -> usize {
        self.content_len + CELL_OVERHEAD
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSize {
    pub cells: Vec<CellSize>,
}

impl RowSize {
    /// Row of `columns` cells with no content
    pub fn empty(columns: usize) -> Self {
        Self {
            cells: vec![CellSize::default(); columns],
        }
    }

    pub fn size(&self) -> usize {
        self.cells.iter().map(CellSize::size).sum::<usize>() + ROW_OVERHEAD
    }
}

/// Per-row, per-cell size ledger of one table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOffsets {
    rows: Vec<RowSize>,
}

impl TableOffsets {
    pub fn new(rows: Vec<RowSize>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[RowSize] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Size of the whole table
    pub fn total(&self) -> usize {
        self.rows.iter().map(RowSize::size).sum::<usize>() + TABLE_OVERHEAD
    }

    /// Absolute start of the content of physical cell (row, col), for a table
    /// starting at `table_start`
    pub fn content_start(&self, table_start: usize, row: usize, col: usize) -> Option<usize> {
        let cells = &self.rows.get(row)?.cells;
        if col >= cells.len() {
            return None;
        }

        let before_row: usize = self.rows[..row].iter().map(RowSize::size).sum();
        let before_cell: usize = cells[..col].iter().map(CellSize::size).sum();
        Some(table_start + 1 + before_row + ROW_OVERHEAD + before_cell + 1)
    }

    pub fn content_len(&self, row: usize, col: usize) -> Option<usize> {
        self.rows
            .get(row)?
            .cells
            .get(col)
            .map(|cell| cell.content_len)
    }

    pub fn set_content_len(&mut self, row: usize, col: usize, len: usize) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col)) {
            cell.content_len = len;
        }
    }

    pub fn insert_row(&mut self, at: usize, columns: usize) {
        let at = at.min(self.rows.len());
        self.rows.insert(at, RowSize::empty(columns));
    }

    pub fn remove_row(&mut self, row: usize) -> Option<RowSize> {
        (row < self.rows.len()).then(|| self.rows.remove(row))
    }
}

/// Row address that distinguishes frozen header rows from data rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTarget {
    /// Frozen header row `i`
    Header(usize),
    /// Logical data row `i`
    Data(usize),
}

/// Table payload of a chain element
#[derive(Debug, Clone)]
pub(crate) struct TableElement {
    offsets: TableOffsets,
    columns: usize,
    /// Units between the element start and the table open marker
    leading: usize,
    grid: Grid,
    frozen: Option<usize>,
    activated: bool,
}

impl TableElement {
    pub(crate) fn parse(snapshot: &TableSnapshot) -> EditResult<Self> {
        let (Some(rows), Some(columns)) = (snapshot.rows, snapshot.columns) else {
            return Err(EditError::structural(format!(
                "table is missing its dimensions ({:?}x{:?})",
                snapshot.rows, snapshot.columns
            )));
        };
        if snapshot.table_rows.len() != rows {
            return Err(EditError::structural(format!(
                "table declares {} rows but has {}",
                rows,
                snapshot.table_rows.len()
            )));
        }

        let mut sizes = Vec::with_capacity(rows);
        let mut values = Vec::with_capacity(rows);

        for (r, row) in snapshot.table_rows.iter().enumerate() {
            if row.table_cells.len() != columns {
                return Err(EditError::structural(format!(
                    "table row {} has {} cells, expected {}",
                    r,
                    row.table_cells.len(),
                    columns
                )));
            }

            let mut cells = Vec::with_capacity(columns);
            let mut row_values = Vec::with_capacity(columns);
            for (c, cell) in row.table_cells.iter().enumerate() {
                let (Some(start), Some(end)) = (cell.start_index, cell.end_index) else {
                    return Err(EditError::structural(format!(
                        "table cell ({}, {}) is missing its indices",
                        r, c
                    )));
                };
                let content_len = end.checked_sub(start + CELL_OVERHEAD).ok_or_else(|| {
                    EditError::structural(format!(
                        "table cell ({}, {}) spans {}..{}, smaller than its markers",
                        r, c, start, end
                    ))
                })?;
                cells.push(CellSize { content_len });
                row_values.push(CellValue::infer(&cell.text()));
            }

            sizes.push(RowSize { cells });
            values.push(row_values);
        }

        Ok(Self {
            offsets: TableOffsets::new(sizes),
            columns,
            leading: 0,
            grid: Grid::new(values, 0, GridSource::DocumentTable)?,
            frozen: None,
            activated: true,
        })
    }

    /// Table that does not exist remotely yet; [`TableElement::activate`]
    /// requests it
    pub(crate) fn pending(headers: Vec<CellValue>) -> EditResult<Self> {
        Ok(Self {
            offsets: TableOffsets::default(),
            columns: headers.len(),
            leading: 0,
            grid: Grid::new(vec![headers], 0, GridSource::DocumentTable)?,
            frozen: None,
            activated: false,
        })
    }

    pub(crate) fn is_activated(&self) -> bool {
        self.activated
    }

    /// Request the table with a single header row, then write the headers
    pub(crate) fn activate(
        &mut self,
        start: usize,
        ledger: &mut MutationLedger<Directive>,
    ) -> EditResult<()> {
        if self.activated {
            return Err(EditError::AlreadyActivated);
        }

        ledger.request(Directive::InsertTable {
            at: start,
            rows: 1,
            columns: self.columns,
        });
        // The store puts a paragraph break ahead of an inserted table
        self.leading = 1;
        self.offsets = TableOffsets::new(vec![RowSize::empty(self.columns)]);
        self.activated = true;

        let headers = self.grid.raw(0).map(<[CellValue]>::to_vec).unwrap_or_default();
        for (col, value) in headers.iter().enumerate() {
            self.write_cell(start, 0, col, value, ledger)?;
        }
        debug!(start, columns = self.columns, "Activated inserted table");
        Ok(())
    }

    /// Size of the owning chain element
    pub(crate) fn element_size(&self) -> usize {
        if self.activated {
            self.offsets.total() + self.leading
        } else {
            0
        }
    }

    pub(crate) fn column_count(&self) -> usize {
        self.columns
    }

    pub(crate) fn row_count(&self) -> usize {
        self.offsets.row_count()
    }

    /// Fix the frozen row count, checking the load-time size once
    pub(crate) fn load(&mut self, frozen: usize, declared_size: usize, strict: bool) -> EditResult<()> {
        if !self.activated {
            return Err(EditError::not_initialized("table has not been inserted yet"));
        }

        match self.frozen {
            Some(loaded) if loaded == frozen => Ok(()),
            Some(loaded) => Err(EditError::structural(format!(
                "table was loaded with {} frozen rows, not {}",
                loaded, frozen
            ))),
            None => {
                let derived = self.element_size();
                if derived != declared_size {
                    if strict {
                        return Err(EditError::structural(format!(
                            "table cells add up to {} units but the element spans {}",
                            derived, declared_size
                        )));
                    }
                    warn!(derived, declared = declared_size, "Table size does not match its element");
                }

                self.grid = self.grid.with_frozen_rows(frozen)?;
                self.frozen = Some(frozen);
                Ok(())
            }
        }
    }

    fn frozen_rows(&self) -> usize {
        self.frozen.unwrap_or(0)
    }

    /// Replace the content of physical cell (row, col)
    fn write_cell(
        &mut self,
        start: usize,
        row: usize,
        col: usize,
        value: &CellValue,
        ledger: &mut MutationLedger<Directive>,
    ) -> EditResult<()> {
        let table_start = start + self.leading;
        let (Some(at), Some(old_len)) = (
            self.offsets.content_start(table_start, row, col),
            self.offsets.content_len(row, col),
        ) else {
            return Err(EditError::structural(format!(
                "cell ({}, {}) is outside a {}x{} table",
                row,
                col,
                self.offsets.row_count(),
                self.columns
            )));
        };

        if old_len > 0 {
            ledger.request(Directive::DeleteRange {
                range: TextRange::new(at, at + old_len),
            });
        }

        let text = value.to_string();
        let len = utf16_len(&text);
        if len > 0 {
            ledger.request(Directive::InsertText { at, text });
            if let CellValue::Link(link) = value {
                ledger.request(Directive::SetTextStyle {
                    range: TextRange::new(at, at + len),
                    style: TextStyle::new().with_link(link.url.clone()),
                });
            }
        }

        self.offsets.set_content_len(row, col, len);
        debug!(row, col, old_len, new_len = len, "Rewrote table cell");
        Ok(())
    }
}

/// Mutable handle on a loaded table
pub struct TableMut<'a> {
    pub(crate) links: &'a mut ChainLinks,
    pub(crate) table: &'a mut TableElement,
    pub(crate) ledger: &'a mut MutationLedger<Directive>,
    pub(crate) index: usize,
}

impl<'a> TableMut<'a> {
    pub fn id(&self) -> ElementId {
        self.links.id_of(self.index)
    }

    /// Start of the owning element
    pub fn start(&self) -> usize {
        self.links.start(self.index)
    }

    /// Start of the table itself, past any leading paragraph break
    pub fn table_start(&self) -> usize {
        self.start() + self.table.leading
    }

    pub fn grid(&self) -> &Grid {
        &self.table.grid
    }

    pub fn offsets(&self) -> &TableOffsets {
        &self.table.offsets
    }

    pub fn frozen_rows(&self) -> usize {
        self.table.frozen_rows()
    }

    pub fn column_count(&self) -> usize {
        self.table.columns
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.table.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.grid.is_empty()
    }

    pub fn headers(&self) -> Vec<&str> {
        self.table.grid.headers()
    }

    pub fn get(&self, row: usize, col: impl Into<Column>) -> &CellValue {
        self.table.grid.get(row, col)
    }

    pub fn obj(&self, row: usize) -> Option<RowObject> {
        self.table.grid.obj(row)
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> + '_ {
        self.table.grid.rows()
    }

    pub fn find(&self, predicate: impl FnMut(&RowView<'_>) -> bool) -> Option<RowView<'_>> {
        self.table.grid.find(predicate)
    }

    pub fn lookup(&self, col: impl Into<Column>, value: impl Into<CellValue>) -> Option<RowView<'_>> {
        self.table.grid.lookup(col, value)
    }

    fn physical(&self, target: RowTarget) -> EditResult<usize> {
        let frozen = self.frozen_rows();
        match target {
            RowTarget::Header(row) if row < frozen => Ok(row),
            RowTarget::Header(row) => Err(EditError::RowOutOfBounds { row, length: frozen }),
            RowTarget::Data(row) if row < self.len() => Ok(frozen + row),
            RowTarget::Data(row) => Err(EditError::RowOutOfBounds {
                row,
                length: self.len(),
            }),
        }
    }

    /// Absolute start of a cell's content
    pub fn content_start(&self, target: RowTarget, col: usize) -> EditResult<usize> {
        let row = self.physical(target)?;
        self.table
            .offsets
            .content_start(self.table_start(), row, col)
            .ok_or_else(|| {
                EditError::structural(format!("column {} is outside a {}-column table", col, self.table.columns))
            })
    }

    fn sync_size(&mut self) {
        let size = self.table.element_size();
        self.links.set_size(self.index, size);
    }

    /// Write one cell of a data row. Returns whether anything was queued.
    pub fn set(
        &mut self,
        row: usize,
        col: impl Into<Column>,
        value: impl Into<CellValue>,
    ) -> EditResult<bool> {
        let locator = col.into();
        if let Some(index) = self.table.grid.column(&locator) {
            if index >= self.table.columns {
                return Err(EditError::structural(format!(
                    "column {} is outside a {}-column table",
                    index, self.table.columns
                )));
            }
        }

        let Some(write) = self.table.grid.set(row, locator, value)? else {
            return Ok(false);
        };

        let start = self.start();
        let physical = self.frozen_rows() + write.row;
        self.table
            .write_cell(start, physical, write.col, &write.value, self.ledger)?;
        self.sync_size();
        Ok(true)
    }

    /// Write every known field of `obj` into a data row, in column order
    pub fn set_obj(&mut self, row: usize, obj: &RowObject) -> EditResult<usize> {
        let mut changed = 0;
        for (col, value) in self.table.grid.resolve_fields(obj) {
            if self.set(row, col, value)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Add a row below the last one and fill it from `obj`. Returns the new
    /// row's logical index.
    pub fn append(&mut self, obj: &RowObject) -> EditResult<usize> {
        let last = self.table.offsets.row_count().saturating_sub(1);
        let row = self.table.grid.push_row()?;

        self.ledger.request(Directive::InsertRow {
            table_start: self.table_start(),
            after_row: last,
        });
        self.table.offsets.insert_row(last + 1, self.table.columns);
        self.sync_size();
        debug!(table = self.index, row, "Appended table row");

        self.set_obj(row, obj)?;
        Ok(row)
    }

    /// Remove a data row. Later rows move up immediately, so writes queued
    /// after this stay correct.
    pub fn delete(&mut self, row: usize) -> EditResult<()> {
        let physical = self.physical(RowTarget::Data(row))?;
        if self.table.offsets.row_count() <= 1 {
            return Err(EditError::structural("cannot delete the only row of a table"));
        }

        self.ledger.request(Directive::DeleteRow {
            table_start: self.table_start(),
            row: physical,
        });
        self.table.grid.remove_row(row)?;
        self.table.offsets.remove_row(physical);
        self.sync_size();
        debug!(table = self.index, row, "Deleted table row");
        Ok(())
    }

    /// Style `col_span` cells of one row starting at `col`
    pub fn style(
        &mut self,
        style: &CellStyle,
        target: RowTarget,
        col: usize,
        col_span: usize,
    ) -> EditResult<()> {
        let row = self.physical(target)?;
        let col_span = col_span.max(1);
        let last = match col.checked_add(col_span - 1) {
            Some(last) if last < self.table.columns => last,
            _ => {
                return Err(EditError::structural(format!(
                    "{} columns from {} are outside a {}-column table",
                    col_span, col, self.table.columns
                )))
            }
        };

        let table_start = self.table_start();

        if !style.cell.is_empty() {
            self.ledger.request(Directive::SetCellStyle {
                cells: CellRange {
                    table_start,
                    row,
                    col,
                    row_span: 1,
                    col_span,
                },
                style: style.cell.clone(),
            });
        }

        if style.text.is_empty() && style.paragraph.is_empty() {
            return Ok(());
        }

        let offsets = &self.table.offsets;
        let (Some(start), Some(last_start), Some(last_len)) = (
            offsets.content_start(table_start, row, col),
            offsets.content_start(table_start, row, last),
            offsets.content_len(row, last),
        ) else {
            return Err(EditError::structural(format!("row {} has no cells to style", row)));
        };
        let range = TextRange::new(start, last_start + last_len);

        if !style.text.is_empty() {
            self.ledger.request(Directive::SetTextStyle {
                range,
                style: style.text.clone(),
            });
        }
        if !style.paragraph.is_empty() {
            self.ledger.request(Directive::SetParagraphStyle {
                range,
                style: style.paragraph.clone(),
            });
        }
        Ok(())
    }

    /// Style every cell of one row
    pub fn style_row(&mut self, style: &CellStyle, target: RowTarget) -> EditResult<()> {
        let columns = self.table.columns;
        self.style(style, target, 0, columns)
    }
}
