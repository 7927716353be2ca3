//! # Spreadsheet Module
//!
//! Reads workbook files into a [`Sheet`] of tagged [`CellValue`]s.
//! Office Open XML packages (`.xlsx`, `.xlsm`) are decoded directly from their
//! zip parts; only the active worksheet is materialised.
pub(crate) mod cell;
pub(crate) mod excel;
pub(crate) mod sheet;
pub(crate) mod xlsx;

#[cfg(test)]
pub(crate) mod fixture;

pub use crate::spreadsheet::cell::CellValue;
pub use crate::spreadsheet::sheet::Sheet;

use crate::error::PriceSheetError;
use crate::error::SpreadsheetError;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use std::ffi::OsStr;
use std::path::Path;

/// A workbook format reader.
pub(crate) trait Spreadsheet {
    /// File name of the workbook
    fn name(&self) -> String;

    /// Loads the workbook's shared string table
    fn load_shared_strings(&mut self) -> Result<Vec<String>, SpreadsheetError>;

    /// Reads the worksheet that was active when the workbook was saved
    fn read_active_sheet(&mut self) -> Result<Sheet, SpreadsheetError>;
}

/// Opens the reader matching the file extension.
fn open_spreadsheet(path: &Path) -> Result<Box<dyn Spreadsheet>, SpreadsheetError> {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => Ok(Box::new(XlsxSpreadsheet::open(path)?)),
        _ => Err(SpreadsheetError::UnsupportedFormatError(path.to_string_lossy().to_string())),
    }
}

/// Loads the active worksheet of the workbook at `path`.
///
/// # Errors
///
/// * [`PriceSheetError::NotFound`] when nothing exists at `path`
/// * [`PriceSheetError::Load`] for any other read or decode failure
pub fn load<P: AsRef<Path>>(path: P) -> Result<Sheet, PriceSheetError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PriceSheetError::NotFound(path.to_path_buf()));
    }

    let load_error = |source: SpreadsheetError| PriceSheetError::Load {
        path: path.to_path_buf(),
        source,
    };
    let mut spreadsheet = open_spreadsheet(path).map_err(load_error)?;
    let sheet = spreadsheet.read_active_sheet().map_err(load_error)?;
    log::info!(
        "Loaded sheet '{}' from '{}' ({} rows x {} columns)",
        sheet.title(),
        spreadsheet.name(),
        sheet.row_count(),
        sheet.column_count()
    );
    Ok(sheet)
}
