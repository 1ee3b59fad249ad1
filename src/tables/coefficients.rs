//! Single-row tables: Richter coefficients and interpolation parameters.

use crate::correction::richter::{CorrectionPair, RichterCoefficients};
use crate::interpolation::config::{InterpolationConfig, DEFAULT_SOLAR_STATION_COUNT};
use crate::output::OutputFormat;
use crate::tables::error::TableError;
use crate::tables::reader::{parse_flag, read_csv, TableColumn};
use crate::types::date_range::DateRange;
use log::{info, warn};
use polars::frame::DataFrame;
use std::path::Path;

/// Loads the Richter coefficients from the first row of a CSV table.
///
/// `maximum_changes` is the largest relative increase `dmax`; it becomes the
/// ratio cap `1 + dmax`. The coefficients are validated before they are
/// returned.
pub fn load_richter_coefficients(path: &Path) -> Result<RichterCoefficients, TableError> {
    let df = read_csv(path)?;
    if df.height() > 1 {
        warn!(
            "{} has {} rows, only the first is used",
            path.display(),
            df.height()
        );
    }
    let row = FirstRow { path, df: &df };

    let pair = |class: &str| -> Result<CorrectionPair, TableError> {
        Ok(CorrectionPair::new(
            row.float(&format!("b_{class}"))?,
            row.float(&format!("epsilon_{class}"))?,
        ))
    };

    let coeffs = RichterCoefficients::builder()
        .t_snow(row.float("T_Snow")?)
        .t_mix(row.float("T_Mix")?)
        .snow(pair("Snow")?)
        .mix(pair("Mix")?)
        .summer(pair("Summer")?)
        .winter(pair("Winter")?)
        .summer_start_month(row.month("Summer_month_Start")?)
        .winter_start_month(row.month("Winter_month_Start")?)
        .max_change(1.0 + row.float("maximum_changes")?)
        .build();
    coeffs.validate()?;
    info!("Loaded Richter coefficients from {}", path.display());
    Ok(coeffs)
}

/// Run settings read from an interpolation parameter table.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationParameters {
    pub config: InterpolationConfig,
    pub output_format: OutputFormat,
}

/// Loads the run settings from the first row of a CSV table.
///
/// Required columns are `radius_km` (or `distance_km`), `start_date` and
/// `end_date`. `power` defaults to 2, `apply_richter` to false,
/// `solar_station_count` to 3 and `output_format` to SWAT.
pub fn load_interpolation_parameters(path: &Path) -> Result<InterpolationParameters, TableError> {
    let df = read_csv(path)?;
    let row = FirstRow { path, df: &df };

    let radius_km = row.float_any(&["radius_km", "distance_km"])?;
    let date_range = DateRange::new(row.date("start_date")?, row.date("end_date")?)?;
    let power = row.optional_float("power")?.unwrap_or(2.0);
    let apply_richter = match row.optional_string("apply_richter")? {
        Some(value) => parse_flag(&value).ok_or_else(|| row.invalid("apply_richter", value))?,
        None => false,
    };
    let solar_station_count = match row.optional_float("solar_station_count")? {
        Some(count) if count.fract() == 0.0 && count >= 0.0 => count as usize,
        Some(count) => return Err(row.invalid("solar_station_count", count)),
        None => DEFAULT_SOLAR_STATION_COUNT,
    };
    let output_format = match row.optional_string("output_format")? {
        Some(value) => {
            OutputFormat::from_name(&value).ok_or_else(|| row.invalid("output_format", value))?
        }
        None => OutputFormat::default(),
    };

    let config = InterpolationConfig::builder()
        .radius_km(radius_km)
        .power(power)
        .apply_richter(apply_richter)
        .date_range(date_range)
        .solar_station_count(solar_station_count)
        .build();
    config.validate()?;
    info!(
        "Interpolation parameters from {}: radius {} km, power {}, {} to {}, richter {}",
        path.display(),
        config.radius_km,
        config.power,
        config.date_range.start(),
        config.date_range.end(),
        config.apply_richter
    );
    Ok(InterpolationParameters {
        config,
        output_format,
    })
}

struct FirstRow<'a> {
    path: &'a Path,
    df: &'a DataFrame,
}

impl FirstRow<'_> {
    fn column(&self, name: &str) -> Result<TableColumn<'_>, TableError> {
        TableColumn::require(self.path, self.df, &[name])
    }

    fn float(&self, name: &str) -> Result<f64, TableError> {
        self.float_any(&[name])
    }

    fn float_any(&self, names: &[&str]) -> Result<f64, TableError> {
        let column = TableColumn::require(self.path, self.df, names)?;
        first(column.required_floats()?)
    }

    fn month(&self, name: &str) -> Result<u32, TableError> {
        first(self.column(name)?.required_ids()?)
    }

    fn date(&self, name: &str) -> Result<chrono::NaiveDate, TableError> {
        first(self.column(name)?.required_dates()?)
    }

    fn optional_string(&self, name: &str) -> Result<Option<String>, TableError> {
        match TableColumn::find(self.path, self.df, &[name]) {
            Some(column) => Ok(column.strings()?.into_iter().next().flatten()),
            None => Ok(None),
        }
    }

    fn optional_float(&self, name: &str) -> Result<Option<f64>, TableError> {
        match self.optional_string(name)? {
            Some(value) => value
                .parse::<f64>()
                .map(Some)
                .map_err(|_| self.invalid(name, value)),
            None => Ok(None),
        }
    }

    fn invalid(&self, column: &str, value: impl ToString) -> TableError {
        TableError::InvalidValue {
            table: self.path.to_path_buf(),
            column: column.to_string(),
            row: 0,
            value: value.to_string(),
        }
    }
}

// `read_csv` guarantees at least one row.
fn first<T>(values: Vec<T>) -> Result<T, TableError> {
    values
        .into_iter()
        .next()
        .ok_or_else(|| TableError::Empty(Default::default()))
}
