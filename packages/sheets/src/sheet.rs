//! # Sheets
//!
//! A [`Sheet`] is a [`Grid`] over one spreadsheet tab. Writes are queued as
//! cell updates and sent in one batch by [`Sheet::commit`].
//!
//! ## Growth
//!
//! Writing past the last filled row appends blank rows in the grid. A tab
//! usually has spare rows beyond the filled ones; only when the appended rows
//! outgrow that spare capacity does the commit ask the store for more rows,
//! ahead of every cell update.

use quire_common::{CellValue, EditError, EditResult, MutationLedger, QuireConfig};
use quire_grid::{Column, Grid, GridSource, RowObject, RowView};
use tracing::{debug, info, instrument};

use crate::directive::SheetDirective;
use crate::snapshot::SheetSnapshot;
use crate::store::SheetStore;

/// One tab of a loaded spreadsheet
pub struct Sheet<'a, S: SheetStore> {
    store: &'a S,
    spreadsheet_id: &'a str,
    title: String,
    sheet_id: Option<i64>,
    grid: Grid,
    filled_rows: usize,
    total_rows: usize,
    appends: usize,
    ledger: MutationLedger<SheetDirective>,
}

impl<'a, S: SheetStore> Sheet<'a, S> {
    pub(crate) fn new(
        store: &'a S,
        spreadsheet_id: &'a str,
        snapshot: &SheetSnapshot,
        config: &QuireConfig,
        editable: bool,
    ) -> EditResult<Self> {
        if snapshot.row_count == 0 {
            return Err(EditError::structural(format!(
                "sheet {} claims to have no rows",
                snapshot.title
            )));
        }

        let rows = quire_common::trim_rows(snapshot.rows.clone());
        let filled_rows = rows.len();
        let source = if editable {
            GridSource::Sheet
        } else {
            GridSource::ReadOnly
        };
        let grid = Grid::new(rows, snapshot.frozen_row_count, source)?
            .with_append_limit(config.implicit_append_limit);

        Ok(Self {
            store,
            spreadsheet_id,
            title: snapshot.title.clone(),
            sheet_id: snapshot.sheet_id,
            grid,
            filled_rows,
            total_rows: snapshot.row_count,
            appends: 0,
            ledger: MutationLedger::new(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn sheet_id(&self) -> Option<i64> {
        self.sheet_id
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn is_editable(&self) -> bool {
        self.grid.is_editable()
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn headers(&self) -> Vec<&str> {
        self.grid.headers()
    }

    pub fn get(&self, row: usize, col: impl Into<Column>) -> &CellValue {
        self.grid.get(row, col)
    }

    pub fn obj(&self, row: usize) -> Option<RowObject> {
        self.grid.obj(row)
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> + '_ {
        self.grid.rows()
    }

    pub fn find(&self, predicate: impl FnMut(&RowView<'_>) -> bool) -> Option<RowView<'_>> {
        self.grid.find(predicate)
    }

    pub fn lookup(&self, col: impl Into<Column>, value: impl Into<CellValue>) -> Option<RowView<'_>> {
        self.grid.lookup(col, value)
    }

    pub fn pending(&self) -> &[SheetDirective] {
        self.ledger.pending()
    }

    /// Blank rows appended since the last commit
    pub fn pending_appends(&self) -> usize {
        self.appends
    }

    /// Write one cell of a data row. Returns whether anything was queued.
    pub fn set(
        &mut self,
        row: usize,
        col: impl Into<Column>,
        value: impl Into<CellValue>,
    ) -> EditResult<bool> {
        let write = self.grid.set(row, col, value)?;
        self.appends += self.grid.take_appended();

        let Some(write) = write else {
            return Ok(false);
        };
        self.ledger.request(SheetDirective::UpdateCell {
            sheet_id: self.sheet_id,
            row: write.row + self.grid.frozen_row_count(),
            col: write.col,
            value: write.value,
        });
        Ok(true)
    }

    /// Write every known field of `obj` into a data row
    pub fn set_obj(&mut self, row: usize, obj: &RowObject) -> EditResult<usize> {
        let mut changed = 0;
        for (col, value) in self.grid.resolve_fields(obj) {
            if self.set(row, col, value)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Fill a new row below the last one. Returns its logical index.
    pub fn append(&mut self, obj: &RowObject) -> EditResult<usize> {
        let row = self.grid.len();
        self.set_obj(row, obj)?;
        if self.grid.len() == row {
            // Nothing known to write; still grow by one row
            self.grid.push_row()?;
            self.appends += self.grid.take_appended();
        }
        Ok(row)
    }

    /// Send queued updates, requesting more rows first when needed.
    ///
    /// Does nothing when there is nothing to send. On failure the queue is
    /// kept for a retry.
    #[instrument(skip(self), fields(sheet = %self.title, pending = self.ledger.len()))]
    pub async fn commit(&mut self) -> EditResult<()> {
        if !self.grid.is_editable() {
            return Err(EditError::read_only(format!(
                "sheet {} was opened as a snapshot",
                self.title
            )));
        }

        let spare = self.total_rows.saturating_sub(self.filled_rows);
        let grow = self.appends > spare;

        let mut batch = Vec::with_capacity(self.ledger.len() + 1);
        if grow {
            batch.push(SheetDirective::AppendRows {
                sheet_id: self.sheet_id,
                count: self.appends,
            });
        }
        batch.extend(self.ledger.pending().iter().cloned());

        if batch.is_empty() {
            debug!("Nothing to commit");
            self.filled_rows += self.appends;
            self.appends = 0;
            return Ok(());
        }

        self.store
            .batch_update(self.spreadsheet_id, &batch)
            .await?;

        self.filled_rows += self.appends;
        if grow {
            self.total_rows = self.filled_rows;
        }
        self.appends = 0;
        self.ledger.clear();
        info!(count = batch.len(), grew = grow, "Committed sheet batch");
        Ok(())
    }
}

impl<S: SheetStore> std::fmt::Debug for Sheet<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sheet")
            .field("title", &self.title)
            .field("sheet_id", &self.sheet_id)
            .field("rows", &self.grid.len())
            .field("pending", &self.ledger.len())
            .finish()
    }
}
