//! Heuristic item/price extraction.
//!
//! Column A of every data row names an item; the first strictly positive number
//! to its right is taken as the unit price. Header labels are not consulted.
use crate::spreadsheet::CellValue;
use crate::spreadsheet::Sheet;

/// An item name with the unit price found next to it.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedItem {
    /// Trimmed, never empty
    pub name: String,
    /// Strictly positive
    pub price: f64,
}

/// Counters describing one extraction pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Data rows scanned (header excluded)
    pub scanned: usize,
    /// Rows that produced an item
    pub matched: usize,
    /// Rows skipped for a blank first column
    pub missing_name: usize,
    /// Rows skipped for lack of a positive number
    pub missing_price: usize,
}

/// Extracts items from every data row of the sheet, in row order.
pub fn extract_items(sheet: &Sheet) -> Vec<ExtractedItem> {
    extract_with_stats(sheet).0
}

/// Same as [`extract_items`], also counting why rows were skipped.
pub fn extract_with_stats(sheet: &Sheet) -> (Vec<ExtractedItem>, ExtractionStats) {
    let mut stats = ExtractionStats::default();
    let mut items = Vec::new();
    for (number, row) in sheet.data_rows() {
        stats.scanned += 1;
        match extract_row(row) {
            Ok(item) => {
                stats.matched += 1;
                items.push(item);
            }
            Err(RowSkip::MissingName) => {
                stats.missing_name += 1;
                log::debug!("Row {number}: skipping - no item name found");
            }
            Err(RowSkip::MissingPrice(name)) => {
                stats.missing_price += 1;
                log::debug!("Row {number}: skipping \"{name}\" - no valid price found");
            }
        }
    }
    (items, stats)
}

enum RowSkip {
    MissingName,
    MissingPrice(String),
}

fn extract_row(row: &[CellValue]) -> Result<ExtractedItem, RowSkip> {
    let name = match row.first() {
        Some(cell) if !cell.is_blank() => cell.to_string().trim().to_owned(),
        _ => return Err(RowSkip::MissingName),
    };
    match row.iter().skip(1).find_map(CellValue::positive_number) {
        Some(price) => Ok(ExtractedItem { name, price }),
        None => Err(RowSkip::MissingPrice(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> CellValue {
        CellValue::Text(value.to_owned())
    }

    fn sheet(rows: Vec<Vec<CellValue>>) -> Sheet {
        let mut all = vec![vec![text("Item Name"), text("Price")]];
        all.extend(rows);
        Sheet::from_rows("supplies.xlsx", "Sheet1", all)
    }

    #[test]
    fn well_formed_row() {
        let items = extract_items(&sheet(vec![vec![text("Widget"), CellValue::Number(12.5)]]));
        assert_eq!(items, vec![ExtractedItem { name: "Widget".to_owned(), price: 12.5 }]);
    }

    #[test]
    fn first_positive_number_wins() {
        let items = extract_items(&sheet(vec![vec![
            text("Bolt"),
            CellValue::Number(-3.0),
            CellValue::Number(0.0),
            CellValue::Number(7.25),
            CellValue::Number(9.0),
        ]]));
        assert_eq!(items, vec![ExtractedItem { name: "Bolt".to_owned(), price: 7.25 }]);
    }

    #[test]
    fn missing_name_is_skipped() {
        let (items, stats) = extract_with_stats(&sheet(vec![
            vec![CellValue::Empty, CellValue::Number(5.0)],
            vec![text("   "), CellValue::Number(5.0)],
        ]));
        assert!(items.is_empty());
        assert_eq!(stats, ExtractionStats { scanned: 2, matched: 0, missing_name: 2, missing_price: 0 });
    }

    #[test]
    fn missing_price_is_skipped() {
        let (items, stats) = extract_with_stats(&sheet(vec![vec![text("Gadget"), text("n/a"), CellValue::Number(-1.0)]]));
        assert!(items.is_empty());
        assert_eq!(stats.missing_price, 1);
    }

    #[test]
    fn only_number_cells_count_as_prices() {
        let items = extract_items(&sheet(vec![vec![
            text("Clamp"),
            text("19.99"),
            CellValue::Boolean(true),
            CellValue::DateTime("2024-01-31".to_owned()),
            CellValue::Number(4.5),
        ]]));
        assert_eq!(items, vec![ExtractedItem { name: "Clamp".to_owned(), price: 4.5 }]);
    }

    #[test]
    fn names_are_trimmed_and_numbers_rendered() {
        let items = extract_items(&sheet(vec![
            vec![text("  Hex Nut  "), CellValue::Number(0.1)],
            vec![CellValue::Number(1042.0), CellValue::Number(3.0)],
        ]));
        assert_eq!(items[0].name, "Hex Nut");
        assert_eq!(items[1].name, "1042");
    }

    #[test]
    fn header_row_is_never_extracted() {
        let sheet = Sheet::from_rows("supplies.xlsx", "Sheet1", vec![vec![text("Total"), CellValue::Number(99.0)]]);
        assert!(extract_items(&sheet).is_empty());
    }

    #[test]
    fn order_is_kept_and_duplicates_are_not_merged() {
        let sheet = sheet(vec![
            vec![text("Washer"), CellValue::Number(0.2)],
            vec![text("Anchor"), CellValue::Number(1.5)],
            vec![text("Washer"), CellValue::Number(0.25)],
        ]);
        let names: Vec<String> = extract_items(&sheet).into_iter().map(|item| item.name).collect();
        assert_eq!(names, vec!["Washer", "Anchor", "Washer"]);
    }

    #[test]
    fn extraction_is_repeatable() {
        let sheet = sheet(vec![
            vec![text("Washer"), CellValue::Number(0.2)],
            vec![text("Gadget"), text("n/a")],
            vec![text("Anchor"), CellValue::Empty, CellValue::Number(1.5)],
        ]);
        assert_eq!(extract_items(&sheet), extract_items(&sheet));
        assert_eq!(extract_items(&sheet).len(), 2);
    }
}
