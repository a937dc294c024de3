use quire_common::{CellValue, EditError, EditResult, DEFAULT_IMPLICIT_APPEND_LIMIT};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::row::RowView;

/// Row projected into `header -> value`
pub type RowObject = BTreeMap<String, CellValue>;

static EMPTY: CellValue = CellValue::Empty;

/// Column addressed by position or by header name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Column {
    Index(usize),
    Name(String),
}

impl From<usize> for Column {
    fn from(index: usize) -> Self {
        Column::Index(index)
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::Name(name.to_string())
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::Name(name)
    }
}

impl From<&String> for Column {
    fn from(name: &String) -> Self {
        Column::Name(name.clone())
    }
}

/// What backs a grid, which decides how it may grow and whether it may change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridSource {
    /// A table inside a document. Growing it is a remote action, so rows must
    /// be appended explicitly before they can be written.
    DocumentTable,
    /// A spreadsheet tab. Writes past the end implicitly append blank rows,
    /// up to the configured limit.
    Sheet,
    /// A snapshot with nowhere to send changes
    ReadOnly,
}

/// A cell change accepted by [`Grid::set`]
#[derive(Debug, Clone, PartialEq)]
pub struct CellWrite {
    /// Logical (data) row index
    pub row: usize,
    pub col: usize,
    pub previous: CellValue,
    pub value: CellValue,
}

/// Tabular data with header-keyed columns.
///
/// The first `frozen_row_count` rows are headers: they are excluded from the
/// logical row index space, and the last of them names the columns.
#[derive(Debug, Clone)]
pub struct Grid {
    header_rows: Vec<Vec<CellValue>>,
    rows: Vec<Vec<CellValue>>,
    columns: HashMap<String, usize>,
    frozen_row_count: usize,
    source: GridSource,
    implicit_append_limit: usize,
    appended: usize,
}

impl Grid {
    /// Build a grid from every row of the source, headers included
    pub fn new(
        mut all_rows: Vec<Vec<CellValue>>,
        frozen_row_count: usize,
        source: GridSource,
    ) -> EditResult<Self> {
        if all_rows.len() < frozen_row_count {
            return Err(EditError::structural(format!(
                "grid has {} rows but {} frozen rows; headers must at least be filled out",
                all_rows.len(),
                frozen_row_count
            )));
        }

        let rows = all_rows.split_off(frozen_row_count);
        let header_rows = all_rows;

        let mut columns = HashMap::new();
        if let Some(names) = header_rows.last() {
            for (col, header) in names.iter().enumerate() {
                columns.insert(header.to_string(), col);
            }
        }

        Ok(Self {
            header_rows,
            rows,
            columns,
            frozen_row_count,
            source,
            implicit_append_limit: DEFAULT_IMPLICIT_APPEND_LIMIT,
            appended: 0,
        })
    }

    pub fn with_append_limit(mut self, limit: usize) -> Self {
        self.implicit_append_limit = limit;
        self
    }

    /// The same rows split with a different number of frozen header rows
    pub fn with_frozen_rows(&self, frozen_row_count: usize) -> EditResult<Self> {
        let all_rows = self.header_rows.iter().chain(&self.rows).cloned().collect();
        Ok(Self::new(all_rows, frozen_row_count, self.source)?
            .with_append_limit(self.implicit_append_limit))
    }

    pub fn source(&self) -> GridSource {
        self.source
    }

    pub fn is_editable(&self) -> bool {
        self.source != GridSource::ReadOnly
    }

    pub fn frozen_row_count(&self) -> usize {
        self.frozen_row_count
    }

    /// Number of logical (non-header) rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve a column locator to an index
    pub fn column(&self, locator: &Column) -> Option<usize> {
        match locator {
            Column::Index(index) => Some(*index),
            Column::Name(name) => self.columns.get(name).copied(),
        }
    }

    /// Header names in column order
    pub fn headers(&self) -> Vec<&str> {
        let mut named: Vec<(&str, usize)> = self
            .columns
            .iter()
            .map(|(name, col)| (name.as_str(), *col))
            .collect();
        named.sort_by_key(|(_, col)| *col);
        named.into_iter().map(|(name, _)| name).collect()
    }

    /// A frozen header row
    pub fn header_row(&self, index: usize) -> Option<&[CellValue]> {
        self.header_rows.get(index).map(Vec::as_slice)
    }

    /// Value at a logical row; `Empty` when the row, column or cell is missing
    pub fn get(&self, row: usize, col: impl Into<Column>) -> &CellValue {
        let Some(col) = self.column(&col.into()) else {
            return &EMPTY;
        };
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Raw cells of a logical row
    pub fn raw(&self, row: usize) -> Option<&[CellValue]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// Project a logical row into a header-keyed object
    pub fn obj(&self, row: usize) -> Option<RowObject> {
        let cells = self.rows.get(row)?;
        Some(
            self.columns
                .iter()
                .map(|(name, col)| (name.clone(), cells.get(*col).cloned().unwrap_or_default()))
                .collect(),
        )
    }

    pub fn row(&self, index: usize) -> Option<RowView<'_>> {
        (index < self.rows.len()).then(|| RowView::new(self, index))
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> + '_ {
        (0..self.rows.len()).map(move |index| RowView::new(self, index))
    }

    pub fn find(&self, mut predicate: impl FnMut(&RowView<'_>) -> bool) -> Option<RowView<'_>> {
        self.rows().find(|row| predicate(row))
    }

    /// First row whose `col` loosely equals `value`
    pub fn lookup(&self, col: impl Into<Column>, value: impl Into<CellValue>) -> Option<RowView<'_>> {
        let col = col.into();
        let value = value.into();
        self.find(|row| row.eq_value(col.clone(), &value))
    }

    /// Resolve a row object's fields to `(column, value)` pairs in column order.
    ///
    /// Fields naming unknown headers are dropped.
    pub fn resolve_fields(&self, obj: &RowObject) -> Vec<(usize, CellValue)> {
        let mut fields: Vec<(usize, CellValue)> = obj
            .iter()
            .filter_map(|(name, value)| match self.columns.get(name) {
                Some(col) => Some((*col, value.clone())),
                None => {
                    warn!(column = %name, "Ignoring unknown column");
                    None
                }
            })
            .collect();
        fields.sort_by_key(|(col, _)| *col);
        fields
    }

    fn assert_editable(&self) -> EditResult<()> {
        if self.is_editable() {
            Ok(())
        } else {
            Err(EditError::read_only("this grid is not editable"))
        }
    }

    /// Write a value.
    ///
    /// Returns `Ok(None)` without touching anything when the column is unknown
    /// or the existing value loosely equals the new one. Sheet-backed grids
    /// append blank rows to reach `row`, refusing to create more than the
    /// implicit-append limit ahead of it; table-backed grids refuse any row
    /// past the end.
    pub fn set(
        &mut self,
        row: usize,
        col: impl Into<Column>,
        value: impl Into<CellValue>,
    ) -> EditResult<Option<CellWrite>> {
        self.assert_editable()?;

        let locator = col.into();
        let Some(col) = self.column(&locator) else {
            warn!(column = ?locator, "Ignoring write to unknown column");
            return Ok(None);
        };

        if row >= self.rows.len() {
            match self.source {
                GridSource::Sheet => {
                    let ahead = row - self.rows.len();
                    if ahead > self.implicit_append_limit {
                        return Err(EditError::ImplicitAppendLimit {
                            requested: ahead,
                            limit: self.implicit_append_limit,
                        });
                    }
                    while row >= self.rows.len() {
                        self.push_blank();
                    }
                    debug!(row, appended = ahead + 1, "Implicitly appended rows");
                }
                GridSource::DocumentTable | GridSource::ReadOnly => {
                    return Err(EditError::RowOutOfBounds {
                        row,
                        length: self.rows.len(),
                    });
                }
            }
        }

        let value = value.into();
        let cells = &mut self.rows[row];
        if cells.get(col).unwrap_or(&EMPTY).loose_eq(&value) {
            return Ok(None);
        }

        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        let previous = std::mem::replace(&mut cells[col], value.clone());

        Ok(Some(CellWrite {
            row,
            col,
            previous,
            value,
        }))
    }

    /// Append a blank logical row and return its index
    pub fn push_row(&mut self) -> EditResult<usize> {
        self.assert_editable()?;
        Ok(self.push_blank())
    }

    fn push_blank(&mut self) -> usize {
        self.rows.push(Vec::new());
        self.appended += 1;
        self.rows.len() - 1
    }

    /// Remove a logical row, returning its cells
    pub fn remove_row(&mut self, row: usize) -> EditResult<Vec<CellValue>> {
        self.assert_editable()?;
        if row >= self.rows.len() {
            return Err(EditError::RowOutOfBounds {
                row,
                length: self.rows.len(),
            });
        }
        Ok(self.rows.remove(row))
    }

    /// Rows appended since the last call
    pub fn take_appended(&mut self) -> usize {
        std::mem::take(&mut self.appended)
    }
}
