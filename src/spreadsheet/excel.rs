//! Microsoft Office Excel Helpers
use crate::error::SpreadsheetError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellType;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;
use zip::ZipArchive;

/// XML tag name for relationship elements in Excel files
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Leading bytes of an OLE compound file; encrypted OOXML packages are wrapped in one
const OLE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Worksheet archive type used by every OOXML reader
pub(crate) type ExcelArchive = ZipArchive<BufReader<File>>;

/// Opens an Excel package and loads its workbook metadata
///
/// # Arguments
/// * `path` - Path to the Excel file
/// * `load_workbook` - Loads the `(name, part path)` list of worksheets, the active
///   sheet index and the date system flag
/// * `load_number_formats` - Loads cell style number formats
///
/// # Returns
/// Tuple containing the archive, number formats, worksheets and active sheet index
pub(super) fn open<W, F>(path: &Path, load_workbook: W, load_number_formats: F) -> Result<(
    ExcelArchive,
    Vec<CellType>,
    Vec<(String, String)>,
    usize,
), SpreadsheetError>
where
    W: Fn(&mut ExcelArchive) -> Result<(Vec<(String, String)>, usize, bool), SpreadsheetError>,
    F: Fn(&mut ExcelArchive, bool) -> Result<Vec<CellType>, SpreadsheetError>,
{
    let name = path.to_string_lossy().to_string();
    let mut reader = BufReader::new(File::open(path)?);

    if is_password_protected(&mut reader)? {
        Err(SpreadsheetError::PasswordProtectedError(name.to_owned()))?;
    }

    let mut zip = ZipArchive::new(reader)?;
    let (sheets, active, is_1904) = load_workbook(&mut zip)?;
    if sheets.is_empty() {
        Err(SpreadsheetError::EmptyWorkbookError(name))?
    }

    let number_formats = load_number_formats(&mut zip, is_1904)?;
    Ok((zip, number_formats, sheets, active))
}

/// Loads worksheet relationships from an Excel package
///
/// # Returns
/// Mapping of relationship IDs to worksheet part paths
pub(super) fn load_relationships(zip: &mut ExcelArchive, path: &str) -> Result<HashMap<String, String>, SpreadsheetError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::MissingPartError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            // Only worksheet relationships
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(&target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Maps style format indexes to cell types using custom and built-in formats
pub(super) fn load_number_formats(format_indexes: Vec<String>, custom_formats: HashMap<String, CellType>, is_1904: bool) -> Vec<CellType> {
    format_indexes
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .copied()
                .or_else(|| CellType::parse_builtin_number_format_id(id, is_1904))
                .unwrap_or(CellType::Number)
        })
        .collect()
}

/// Normalizes a relationship target to a path inside the archive
pub(crate) fn to_zip_path(path: &str) -> String {
    if let Some(stripped) = path.strip_prefix('/') {
        stripped.to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

/// Checks whether the file is an OLE container rather than a zip package
fn is_password_protected<R: Read + Seek>(reader: &mut R) -> Result<bool, SpreadsheetError> {
    let mut signature = [0u8; 8];
    let matched = match reader.read_exact(&mut signature) {
        Ok(()) => signature == OLE_SIGNATURE,
        Err(error) if error.kind() == std::io::ErrorKind::UnexpectedEof => false,
        Err(error) => Err(error)?,
    };
    reader.seek(SeekFrom::Start(0))?;
    Ok(matched)
}
