//! # Quire Grid
//!
//! Uniform 2D access to tabular data, whatever backs it.
//!
//! A [`Grid`] resolves header names to columns, projects rows into objects,
//! suppresses writes whose value has not (loosely) changed, and enforces the
//! growth policy of its [`GridSource`]. It never talks to a remote store: the
//! owner of a grid (a document table or a spreadsheet tab) turns the
//! [`CellWrite`]s it returns into remote directives.

mod grid;
mod row;

pub use grid::{CellWrite, Column, Grid, GridSource, RowObject};
pub use row::RowView;
