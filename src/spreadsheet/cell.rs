use crate::error::SpreadsheetError;
use chrono::Duration;
use chrono::NaiveDate;
use std::fmt::Display;

/// Last row of a worksheet (1-based)
pub(crate) const MAX_ROWS: usize = 1_048_576;
/// Last column of a worksheet (1-based, `XFD`)
pub(crate) const MAX_COLUMNS: usize = 16_384;

/// Storage types of raw cells in workbook files.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as 0/1
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error literals such as `#N/A`
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Date/time letters inside quoted literals, escapes and `[...]` sections are ignored.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_bracket = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }
}

/// A decoded cell value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
    /// Date/time cell rendered as ISO text (`2024-01-31 08:30:00`)
    DateTime(String),
}

impl CellValue {
    /// True for `Empty` and for text made of whitespace only.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Returns the number held by a `Number` cell when it is strictly positive.
    pub fn positive_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) if *value > 0.0 => Some(*value),
            _ => None,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(text) => write!(f, "{text}"),
            CellValue::Number(value) => write!(f, "{}", format_number(*value)),
            CellValue::Boolean(value) => write!(f, "{value}"),
            CellValue::DateTime(value) => write!(f, "{value}"),
        }
    }
}

/// Integral numbers print without a fractional part, everything else in shortest form.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Represents a raw cell as read from a worksheet part.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell storage type
    pub(crate) kind: CellType,
    /// Raw cell value
    pub(crate) value: String,
}

impl Cell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Decodes the raw value, resolving shared strings through the given table.
    pub(crate) fn to_value(&self, shared_strings: &[String]) -> Result<CellValue, SpreadsheetError> {
        let error = |message: String| SpreadsheetError::CellValueError(self.reference(), message);
        let value = match self.kind {
            CellType::Empty => CellValue::Empty,
            CellType::Boolean => CellValue::Boolean(self.value == "1" || self.value.eq_ignore_ascii_case("true")),
            CellType::Number => CellValue::Number(self.to_double().map_err(error)?),
            CellType::NumberDateTime1900 | CellType::NumberDateTime1904 => {
                let value = self.to_double().map_err(error)?;
                let date = to_date_string(value, self.kind == CellType::NumberDateTime1904)
                    .ok_or_else(|| error(format!("date serial {value} out of range")))?;
                CellValue::DateTime(format!("{date} {}", to_time_string(value)))
            }
            CellType::NumberDate1900 | CellType::NumberDate1904 => {
                let value = self.to_double().map_err(error)?;
                let date = to_date_string(value, self.kind == CellType::NumberDate1904)
                    .ok_or_else(|| error(format!("date serial {value} out of range")))?;
                CellValue::DateTime(date)
            }
            CellType::NumberTime1900 | CellType::NumberTime1904 => CellValue::DateTime(to_time_string(self.to_double().map_err(error)?)),
            CellType::IsoDateTime => CellValue::DateTime(self.value.replace('T', " ")),
            CellType::InlineString | CellType::Error => CellValue::Text(self.value.to_owned()),
            CellType::SharedString => {
                let index = self.value.trim().parse::<usize>()?;
                let text = shared_strings
                    .get(index)
                    .ok_or_else(|| error(format!("shared string index {index} out of range")))?;
                CellValue::Text(text.to_owned())
            }
        };
        Ok(value)
    }

    /// Converts cell value to double-precision floating point.
    fn to_double(&self) -> Result<f64, String> {
        self.value.trim().parse::<f64>().map_err(|_| format!("parse '{}' to double failed", self.value))
    }
}

/// Converts a 0-based (row, column) pair to an Excel reference such as `AB12`.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut column = col + 1;
    let mut letters = Vec::new();
    while column > 0 {
        column -= 1;
        letters.push(b'A' + (column % 26) as u8);
        column /= 26;
    }
    letters.reverse();
    format!("{}{}", String::from_utf8_lossy(&letters), row + 1)
}

/// Converts an Excel reference such as `AB12` (optionally with `$` anchors)
/// to a 0-based (row, column) pair.
///
/// Returns `None` for malformed references and for positions past `XFD1048576`.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let reference = reference.replace('$', "");
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let mut col = 0usize;
    for letter in letters.chars() {
        if !letter.is_ascii_alphabetic() {
            return None;
        }
        col = col
            .checked_mul(26)?
            .checked_add(letter.to_ascii_uppercase() as usize - 'A' as usize + 1)
            .filter(|col| *col <= MAX_COLUMNS)?;
    }
    let row = digits.parse::<usize>().ok()?;
    if row == 0 || row > MAX_ROWS {
        return None;
    }
    Some((row - 1, col - 1))
}

/// Converts an Excel date serial to an ISO date string, `None` when the serial
/// falls outside the representable calendar.
/// Serials below 60 are shifted to compensate the Lotus 1-2-3 leap year bug.
fn to_date_string(value: f64, is_1904: bool) -> Option<String> {
    let days = value.trunc() as i64;
    let offset = if is_1904 {
        1462
    } else if days < 60 {
        1
    } else {
        0
    };
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_signed(Duration::try_days(days.checked_add(offset)?)?)?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// Converts the fractional part of an Excel serial to an ISO time string.
fn to_time_string(value: f64) -> String {
    let mut rest = (value.fract().abs() * 86_400_000f64).round() as i64;
    let milliseconds = rest % 1_000;
    rest /= 1_000;
    let seconds = rest % 60;
    rest /= 60;
    let minutes = rest % 60;
    rest /= 60;
    let hours = rest;
    if milliseconds > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{milliseconds:03}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}
