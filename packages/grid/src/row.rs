use quire_common::CellValue;

use crate::grid::{Column, Grid, RowObject};

/// Read-only view of one logical row
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    grid: &'a Grid,
    index: usize,
}

impl<'a> RowView<'a> {
    pub(crate) fn new(grid: &'a Grid, index: usize) -> Self {
        Self { grid, index }
    }

    /// Logical row index
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn obj(&self) -> RowObject {
        self.grid.obj(self.index).unwrap_or_default()
    }

    pub fn value(&self, col: impl Into<Column>) -> &'a CellValue {
        self.grid.get(self.index, col)
    }

    /// Loose comparison against `other`
    pub fn eq_value(&self, col: impl Into<Column>, other: &CellValue) -> bool {
        self.value(col).loose_eq(other)
    }

    pub fn is_defined(&self, col: impl Into<Column>) -> bool {
        !self.value(col).is_blank()
    }

    pub fn string(&self, col: impl Into<Column>, default: &str) -> String {
        let value = self.value(col);
        if value.is_blank() {
            default.to_string()
        } else {
            value.to_string()
        }
    }

    pub fn num(&self, col: impl Into<Column>, default: f64) -> f64 {
        self.value(col).as_f64().unwrap_or(default)
    }

    /// Non-empty trimmed lines of the cell's text
    pub fn string_array(&self, col: impl Into<Column>) -> Vec<String> {
        self.string(col, "")
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn link(&self, col: impl Into<Column>) -> Option<&'a str> {
        self.value(col).as_link().map(|link| link.url.as_str())
    }
}
