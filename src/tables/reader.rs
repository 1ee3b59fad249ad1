//! Column helpers shared by the table loaders.

use crate::tables::error::TableError;
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::Path;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y%m%d", "%d.%m.%Y"];

/// Reads a headed CSV file into a DataFrame of string columns. Empty tables are
/// an error.
///
/// Nothing is inferred so that ids such as `00044` keep their leading zeros.
pub(crate) fn read_csv(path: &Path) -> Result<DataFrame, TableError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| TableError::CsvRead(path.to_path_buf(), e))?
        .finish()
        .map_err(|e| TableError::CsvRead(path.to_path_buf(), e))?;
    if df.height() == 0 {
        return Err(TableError::Empty(path.to_path_buf()));
    }
    Ok(df)
}

/// A column of a loaded table, resolved through a list of accepted names.
pub(crate) struct TableColumn<'a> {
    table: &'a Path,
    column: &'a Column,
}

impl<'a> TableColumn<'a> {
    /// First column whose name is in `aliases`.
    pub(crate) fn find(table: &'a Path, df: &'a DataFrame, aliases: &[&str]) -> Option<Self> {
        aliases
            .iter()
            .find_map(|name| df.column(name).ok())
            .map(|column| TableColumn { table, column })
    }

    pub(crate) fn require(
        table: &'a Path,
        df: &'a DataFrame,
        aliases: &[&str],
    ) -> Result<Self, TableError> {
        Self::find(table, df, aliases).ok_or_else(|| TableError::MissingColumn {
            table: table.to_path_buf(),
            aliases: aliases.join(" | "),
        })
    }

    pub(crate) fn name(&self) -> String {
        self.column.name().to_string()
    }

    pub(crate) fn invalid(&self, row: usize, value: impl ToString) -> TableError {
        TableError::InvalidValue {
            table: self.table.to_path_buf(),
            column: self.name(),
            row,
            value: value.to_string(),
        }
    }

    /// Values parsed as `f64`. Cells that are empty or not numeric come back as `None`.
    pub(crate) fn floats(&self) -> Result<Vec<Option<f64>>, TableError> {
        Ok(self
            .strings()?
            .into_iter()
            .map(|value| value.and_then(|value| value.parse::<f64>().ok()))
            .collect())
    }

    /// Values rendered as trimmed strings. Empty cells come back as `None`.
    pub(crate) fn strings(&self) -> Result<Vec<Option<String>>, TableError> {
        let cast = self
            .column
            .cast(&DataType::String)
            .map_err(|e| self.type_error("string", e))?;
        let values = cast
            .str()
            .map_err(|e| self.type_error("string", e))?
            .into_iter()
            .map(|value| {
                value
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
            })
            .collect();
        Ok(values)
    }

    /// Finite floats; any missing or non-finite cell is an error.
    pub(crate) fn required_floats(&self) -> Result<Vec<f64>, TableError> {
        let raw = self.strings()?;
        self.floats()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                Some(value) if value.is_finite() => Ok(value),
                _ => Err(self.invalid(row, raw[row].as_deref().unwrap_or(""))),
            })
            .collect()
    }

    /// Non-negative whole numbers that fit into a `u32`.
    pub(crate) fn required_ids(&self) -> Result<Vec<u32>, TableError> {
        self.required_floats()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                if value.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&value) {
                    Ok(value as u32)
                } else {
                    Err(self.invalid(row, value))
                }
            })
            .collect()
    }

    pub(crate) fn required_strings(&self) -> Result<Vec<String>, TableError> {
        self.strings()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| value.ok_or_else(|| self.invalid(row, "")))
            .collect()
    }

    pub(crate) fn required_dates(&self) -> Result<Vec<NaiveDate>, TableError> {
        self.required_strings()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| parse_date(&value).ok_or_else(|| self.invalid(row, value)))
            .collect()
    }

    fn type_error(&self, expected: &'static str, source: PolarsError) -> TableError {
        TableError::ColumnType {
            column: self.name(),
            expected,
            source,
        }
    }
}

/// Parses `YYYY-MM-DD`, `YYYYMMDD` or `DD.MM.YYYY`, ignoring a trailing time part.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let date_part = value
        .split(|c: char| c == 'T' || c.is_whitespace())
        .next()
        .unwrap_or(value);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

/// Interprets the usual spellings of a boolean flag.
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "1.0" => Some(true),
        "false" | "no" | "n" | "0" | "0.0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 7, 14);
        assert_eq!(parse_date("2021-07-14"), expected);
        assert_eq!(parse_date("20210714"), expected);
        assert_eq!(parse_date("14.07.2021"), expected);
        assert_eq!(parse_date("2021-07-14 00:00:00"), expected);
        assert_eq!(parse_date("2021-07-14T00:00:00"), expected);
        assert_eq!(parse_date("July 14"), None);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" yes "), Some(true));
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("False"), Some(false));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
