//! Tabula Grid - headless data-grid engine
//!
//! Everything a data-grid needs short of actual rendering: typed column
//! definitions, composable filter predicates, per-type cell formatting,
//! derived filter options, header sort/filter controllers, pagination,
//! row selection, and row action dispatch. The [`DataGrid`] orchestrator
//! turns a slice of records into an immutable [`GridView`] snapshot that
//! a UI layer can paint without further logic.

mod actions;
mod column;
mod filter;
mod format;
mod grid;
mod header;
mod options;
mod pagination;
mod record;
mod selection;

pub use actions::*;
pub use column::*;
pub use filter::*;
pub use format::*;
pub use grid::*;
pub use header::*;
pub use options::*;
pub use pagination::*;
pub use record::*;
pub use selection::*;
