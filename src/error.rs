use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading and decoding a workbook.
/// Aggregates errors from the standard library, dependencies and helper modules.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Workbook structure errors
    #[error("Cannot detect spreadsheet format of '{0}'")]
    UnsupportedFormatError(String),

    #[error("Spreadsheet '{0}' is password protected")]
    PasswordProtectedError(String),

    #[error("Spreadsheet '{0}' contains no worksheet")]
    EmptyWorkbookError(String),

    #[error("Missing part '{0}' in spreadsheet archive")]
    MissingPartError(String),

    #[error("Invalid cell value at {0}: {1}")]
    CellValueError(String, String),
}

/// Top-level error taxonomy of the price extractor.
#[derive(Error, Debug)]
pub enum PriceSheetError {
    /// The source workbook does not exist.
    #[error("Excel file not found at: {}", .0.display())]
    NotFound(PathBuf),

    /// The source workbook exists but cannot be read.
    #[error("Load spreadsheet '{}' failed: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: SpreadsheetError,
    },

    /// The output script cannot be written.
    #[error("Write SQL file '{}' failed: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, SpreadsheetError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| SpreadsheetError::WithContextError(format!("{}: {}", message, e)))
    }
}
