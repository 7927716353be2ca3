use std::path::PathBuf;

/// Environment variable naming the source workbook
pub const SOURCE_VAR: &str = "PRICE_SHEET_SOURCE";
/// Environment variable naming the generated SQL script
pub const OUTPUT_VAR: &str = "PRICE_SHEET_OUTPUT";
/// Environment variable for the number of preview rows (header included)
pub const PREVIEW_ROWS_VAR: &str = "PRICE_SHEET_PREVIEW_ROWS";
/// Environment variable for the number of items listed in the report
pub const DISPLAY_LIMIT_VAR: &str = "PRICE_SHEET_DISPLAY_LIMIT";

/// Settings of one extraction run, fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Workbook to read
    pub source_path: PathBuf,
    /// SQL script to write
    pub output_path: PathBuf,
    /// Rows shown in the preview, header included
    pub preview_rows: usize,
    /// Extracted items listed before the remainder is summarised
    pub display_limit: usize,
    /// Command suggested for applying the script
    pub apply_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_path: PathBuf::from("FINAL Supplies Table.xlsx"),
            output_path: PathBuf::from("update_prices.sql"),
            preview_rows: 11,
            display_limit: 20,
            apply_command: "node src/updatePricesFromExcel.js".to_owned(),
        }
    }
}

impl Config {
    pub fn new<S: Into<PathBuf>, O: Into<PathBuf>>(source_path: S, output_path: O) -> Self {
        Config {
            source_path: source_path.into(),
            output_path: output_path.into(),
            ..Config::default()
        }
    }

    /// Defaults overridden by the process environment, after loading `.env` if present.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from '{}'", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    /// Blank values are ignored; unparsable numbers keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value_of = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Config::default();
        if let Some(source) = value_of(SOURCE_VAR) {
            config.source_path = PathBuf::from(source);
        }
        if let Some(output) = value_of(OUTPUT_VAR) {
            config.output_path = PathBuf::from(output);
        }
        if let Some(rows) = value_of(PREVIEW_ROWS_VAR) {
            config.preview_rows = parse_count(PREVIEW_ROWS_VAR, &rows, config.preview_rows);
        }
        if let Some(limit) = value_of(DISPLAY_LIMIT_VAR) {
            config.display_limit = parse_count(DISPLAY_LIMIT_VAR, &limit, config.display_limit);
        }
        config
    }
}

fn parse_count(key: &str, value: &str, default: usize) -> usize {
    match value.trim().parse::<usize>() {
        Ok(count) => count,
        Err(error) => {
            log::warn!("Ignoring {key}='{value}': {error}, using {default}");
            default
        }
    }
}
