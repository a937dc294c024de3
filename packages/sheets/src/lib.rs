//! # Quire Sheets
//!
//! Spreadsheet tabs as [`Grid`](quire_grid::Grid)s whose writes are queued and
//! committed in one batch.
//!
//! ```rust,ignore
//! use quire_sheets::{MemorySheetStore, Spreadsheet};
//!
//! let spreadsheet = Spreadsheet::load(store, "sheet-id").await?;
//! let mut costs = spreadsheet.sheet("Costs")?;
//! costs.set(0, "Cost", 14.0)?;
//! costs.commit().await?;
//! ```

mod directive;
mod sheet;
mod snapshot;
mod spreadsheet;
mod store;

pub use directive::SheetDirective;
pub use sheet::Sheet;
pub use snapshot::{SheetSnapshot, SpreadsheetSnapshot};
pub use spreadsheet::Spreadsheet;
pub use store::{MemorySheetStore, SheetStore};

pub use quire_common::{CellValue, EditError, EditResult, QuireConfig};
pub use quire_grid::{Column, RowObject, RowView};
