use crate::spreadsheet::cell::CellValue;

/// A worksheet anchored at A1.
///
/// Row 1 is the header row, every later row is a data row. Each row stores
/// values up to its last non-empty cell; `column_count` is the widest row and
/// [`Sheet::padded`] fills the gap with `CellValue::Empty` when iterating.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sheet {
    /// Source file name
    pub(crate) file_name: String,
    /// Worksheet name
    pub(crate) title: String,
    /// Cell values, row-major, trailing empty cells omitted
    pub(crate) rows: Vec<Vec<CellValue>>,
    /// Number of columns, counted from column A
    pub(crate) width: usize,
}

impl Sheet {
    /// Creates an empty sheet.
    pub fn new(file_name: &str, title: &str) -> Self {
        Self {
            file_name: file_name.to_owned(),
            title: title.to_owned(),
            rows: Vec::new(),
            width: 0,
        }
    }

    /// Builds a sheet from rows of values.
    pub fn from_rows(file_name: &str, title: &str, rows: Vec<Vec<CellValue>>) -> Self {
        let mut sheet = Self::new(file_name, title);
        for (row, values) in rows.into_iter().enumerate() {
            if sheet.rows.len() <= row {
                sheet.rows.resize_with(row + 1, Vec::new);
            }
            for (col, value) in values.into_iter().enumerate() {
                sheet.push(row, col, value);
            }
        }
        sheet
    }

    /// Stores a value at a 0-based position. Empty values are not stored and
    /// do not extend the sheet.
    pub(crate) fn push(&mut self, row: usize, col: usize, value: CellValue) {
        if value == CellValue::Empty {
            return;
        }
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let record = &mut self.rows[row];
        if record.len() <= col {
            record.resize(col + 1, CellValue::Empty);
        }
        record[col] = value;
        self.width = self.width.max(col + 1);
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of rows, header included.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.width
    }

    /// Values of the first row, empty when the sheet has no rows.
    pub fn header(&self) -> &[CellValue] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// All rows, each ending at its last non-empty cell.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Walks a row of this sheet padded with `Empty` to the sheet width.
    pub fn padded<'a>(&self, row: &'a [CellValue]) -> impl Iterator<Item = &'a CellValue> + Clone + 'a {
        let padding = self.width.saturating_sub(row.len());
        row.iter().chain(std::iter::repeat(&EMPTY).take(padding))
    }

    /// Rows after the header paired with their 1-based row number.
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[CellValue])> + '_ {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, record)| (index + 1, record.as_slice()))
    }

    /// The first `limit` rows, header included, in sheet order.
    ///
    /// The iterator is lazy and `Clone`, so the preview can be walked again.
    pub fn preview(&self, limit: usize) -> impl Iterator<Item = &[CellValue]> + Clone + '_ {
        self.rows.iter().take(limit).map(Vec::as_slice)
    }
}

static EMPTY: CellValue = CellValue::Empty;
