//! End-to-end extraction run with a console report.
use crate::config::Config;
use crate::error::PriceSheetError;
use crate::extract::extract_with_stats;
use crate::extract::ExtractedItem;
use crate::spreadsheet::load;
use crate::spreadsheet::CellValue;
use crate::statement::render_update_statement;
use crate::statement::write_statements;
use anyhow::Result;
use std::io::Write;

const RULE_WIDTH: usize = 80;

/// Runs the pipeline, printing the report to stdout.
///
/// Failures are reported and yield an empty list; they never abort the process.
pub fn run(config: &Config) -> Vec<ExtractedItem> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with_output(config, &mut out)
}

/// Runs the pipeline, printing the report to `out`.
pub fn run_with_output<W: Write>(config: &Config, out: &mut W) -> Vec<ExtractedItem> {
    match execute(config, out) {
        Ok(items) => items,
        Err(error) => {
            report_failure(&error, out);
            Vec::new()
        }
    }
}

fn execute<W: Write>(config: &Config, out: &mut W) -> Result<Vec<ExtractedItem>> {
    let source_name = config
        .source_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| config.source_path.display().to_string());

    banner(out, &format!("READING EXCEL FILE: {source_name}"))?;
    let sheet = load(&config.source_path)?;

    writeln!(out, "Sheet name: {}", sheet.title())?;
    writeln!(out, "Total rows: {}", sheet.row_count())?;
    writeln!(out, "Total columns: {}", sheet.column_count())?;
    writeln!(out)?;
    let headers: Vec<String> = sheet.padded(sheet.header()).map(repr).collect();
    writeln!(out, "Columns found: [{}]", headers.join(", "))?;
    writeln!(out)?;

    banner(out, &format!("EXCEL DATA PREVIEW (First {} rows)", config.preview_rows.saturating_sub(1)))?;
    for (index, row) in sheet.preview(config.preview_rows).enumerate() {
        writeln!(out, "Row {}: {}", index + 1, format_row(sheet.padded(row)))?;
    }

    writeln!(out)?;
    banner(out, "GENERATING SQL UPDATE STATEMENTS")?;
    let (items, stats) = extract_with_stats(&sheet);
    log::info!(
        "Scanned {} rows: {} matched, {} without name, {} without price",
        stats.scanned,
        stats.matched,
        stats.missing_name,
        stats.missing_price
    );
    writeln!(out, "\nFound {} items with prices:\n", items.len())?;
    for item in items.iter().take(config.display_limit) {
        writeln!(out, "  {}: ${:.2}", item.name, item.price)?;
    }
    if items.len() > config.display_limit {
        writeln!(out, "  ... and {} more items\n", items.len() - config.display_limit)?;
    }

    let statements: Vec<String> = items.iter().map(render_update_statement).collect();
    write_statements(&config.output_path, &source_name, &statements)?;

    rule(out)?;
    writeln!(out, "✓ SQL file saved to: {}", config.output_path.display())?;
    rule(out)?;
    writeln!(out, "\nTo apply these updates:")?;
    writeln!(out, "1. Review the SQL file to make sure it looks correct")?;
    writeln!(out, "2. Run: {}", config.apply_command)?;
    writeln!(out, "   OR manually execute the SQL statements")?;

    Ok(items)
}

fn report_failure<W: Write>(error: &anyhow::Error, out: &mut W) {
    // The report is best effort: a failing stdout has nowhere else to go.
    let _ = match error.downcast_ref::<PriceSheetError>() {
        Some(PriceSheetError::NotFound(path)) => {
            log::warn!("{error}");
            writeln!(out, "ERROR: Excel file not found at: {}", path.display())
                .and_then(|_| writeln!(out, "Please make sure the file exists at this location."))
        }
        _ => {
            log::error!("{error:#}");
            writeln!(out, "ERROR: {error}").and_then(|_| writeln!(out, "{error:?}"))
        }
    };
}

fn rule<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

fn banner<W: Write>(out: &mut W, title: &str) -> std::io::Result<()> {
    rule(out)?;
    writeln!(out, "{title}")?;
    rule(out)
}

/// Renders a row as a tuple: `('Widget', 12.5, None)`.
fn format_row<'a>(row: impl Iterator<Item = &'a CellValue>) -> String {
    let cells: Vec<String> = row.map(repr).collect();
    match cells.as_slice() {
        [single] => format!("({single},)"),
        _ => format!("({})", cells.join(", ")),
    }
}

/// Renders a value the way the report has always shown it: `None` for empty
/// cells, quoted text, `True`/`False`.
fn repr(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => "None".to_owned(),
        CellValue::Text(text) | CellValue::DateTime(text) => quote(text),
        CellValue::Boolean(true) => "True".to_owned(),
        CellValue::Boolean(false) => "False".to_owned(),
        CellValue::Number(_) => cell.to_string(),
    }
}

/// Single quotes unless the text holds a single quote and no double quote.
fn quote(text: &str) -> String {
    let delimiter = if text.contains('\'') && !text.contains('"') { '"' } else { '\'' };
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push(delimiter);
    for character in text.chars() {
        match character {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            _ if character == delimiter => {
                quoted.push('\\');
                quoted.push(character);
            }
            _ => quoted.push(character),
        }
    }
    quoted.push(delimiter);
    quoted
}
