//! SQL rendering and output of price updates.
use crate::error::PriceSheetError;
use crate::extract::ExtractedItem;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

/// First header line of the generated script
pub const SCRIPT_TITLE: &str = "-- SQL UPDATE STATEMENTS FOR INVENTORY PRICES";

/// Renders one `UPDATE` for an item.
///
/// Single quotes in the name are doubled. Nothing else is escaped, so the
/// output must be reviewed before it is executed.
pub fn render_update_statement(item: &ExtractedItem) -> String {
    let name = item.name.replace('\'', "''");
    // `{:?}` keeps the shortest round-trip form and always shows a fraction (7.0)
    format!("UPDATE inventory_items SET unit_price = {:?} WHERE item_name = '{name}';", item.price)
}

/// Writes the script header followed by one statement per line.
///
/// The file handle is closed when this returns, whether or not writing succeeded.
pub fn write_statements<P, S>(path: P, source_name: &str, statements: &[S]) -> Result<(), PriceSheetError>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let path = path.as_ref();
    let write_error = |source: std::io::Error| PriceSheetError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(write_error)?);
    write_script(&mut writer, source_name, statements).map_err(write_error)?;
    log::info!("Wrote {} statements to '{}'", statements.len(), path.display());
    Ok(())
}

fn write_script<W: Write, S: AsRef<str>>(writer: &mut W, source_name: &str, statements: &[S]) -> std::io::Result<()> {
    writeln!(writer, "{SCRIPT_TITLE}")?;
    writeln!(writer, "-- Generated from {source_name}")?;
    writeln!(writer)?;
    for statement in statements {
        writeln!(writer, "{}", statement.as_ref())?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, price: f64) -> ExtractedItem {
        ExtractedItem { name: name.to_owned(), price }
    }

    #[test]
    fn renders_update() {
        assert_eq!(
            render_update_statement(&item("Widget", 12.5)),
            "UPDATE inventory_items SET unit_price = 12.5 WHERE item_name = 'Widget';"
        );
    }

    #[test]
    fn doubles_single_quotes() {
        let statement = render_update_statement(&item("O'Brien Supplies", 3.0));
        assert!(statement.ends_with("WHERE item_name = 'O''Brien Supplies';"));
        assert!(statement.contains("unit_price = 3.0 "));
    }

    #[test]
    fn writes_header_and_statements() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update_prices.sql");
        let statements = vec![
            render_update_statement(&item("Widget", 12.5)),
            render_update_statement(&item("Bolt", 7.25)),
        ];
        write_statements(&path, "FINAL Supplies Table.xlsx", &statements).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "\
-- SQL UPDATE STATEMENTS FOR INVENTORY PRICES
-- Generated from FINAL Supplies Table.xlsx

UPDATE inventory_items SET unit_price = 12.5 WHERE item_name = 'Widget';
UPDATE inventory_items SET unit_price = 7.25 WHERE item_name = 'Bolt';
");
    }

    #[test]
    fn writes_header_only_without_statements() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.sql");
        write_statements(&path, "book.xlsx", &Vec::<String>::new()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn missing_directory_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("update_prices.sql");
        let error = write_statements(&path, "book.xlsx", &["SELECT 1;"]).unwrap_err();
        assert!(matches!(error, PriceSheetError::Write { path: failed, .. } if failed == path));
    }
}
