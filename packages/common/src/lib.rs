//! Shared building blocks for quire crates: cell values, styles, the error
//! taxonomy, configuration and the pending-directive ledger.

pub mod config;
pub mod error;
pub mod ledger;
pub mod result;
pub mod style;
pub mod text;
pub mod value;

pub use config::*;
pub use error::*;
pub use ledger::*;
pub use result::*;
pub use style::*;
pub use value::*;
