//! # Spreadsheet Price Extractor
//!
//! Reads the active worksheet of an Excel workbook, picks an item name from the
//! first column of every data row and the first positive number to its right as
//! that item's unit price, and writes one SQL `UPDATE` per item to a script that
//! is reviewed and applied separately.
//!
//! ## Pipeline
//!
//! - [`load`]: decode the workbook into a [`Sheet`] of tagged [`CellValue`]s
//! - [`Sheet::preview`]: the leading rows for display
//! - [`extract_items`]: the (name, price) pairs, in row order
//! - [`render_update_statement`] and [`write_statements`]: the SQL script
//! - [`run`]: all of the above with a console report, driven by a [`Config`]
mod helpers;

pub mod config;
pub mod error;
pub mod extract;
pub mod run;
pub mod spreadsheet;
pub mod statement;

pub use crate::config::Config;
pub use crate::error::PriceSheetError;
pub use crate::error::SpreadsheetError;
pub use crate::extract::extract_items;
pub use crate::extract::extract_with_stats;
pub use crate::extract::ExtractedItem;
pub use crate::extract::ExtractionStats;
pub use crate::run::run;
pub use crate::run::run_with_output;
pub use crate::spreadsheet::load;
pub use crate::spreadsheet::CellValue;
pub use crate::spreadsheet::Sheet;
pub use crate::statement::render_update_statement;
pub use crate::statement::write_statements;
