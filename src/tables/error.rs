use crate::interpolation::error::ConfigurationError;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to read CSV table '{0}'")]
    CsvRead(PathBuf, #[source] PolarsError),

    #[error("Table '{0}' contains no rows")]
    Empty(PathBuf),

    #[error("Table '{table}' has none of the columns {aliases}")]
    MissingColumn { table: PathBuf, aliases: String },

    #[error("Column '{column}' could not be read as {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
        #[source]
        source: PolarsError,
    },

    #[error("Invalid value '{value}' in column '{column}' at row {row} of '{table}'")]
    InvalidValue {
        table: PathBuf,
        column: String,
        row: usize,
        value: String,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
