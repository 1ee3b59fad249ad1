//! Writers for SWAT and SWAT+ climate input files.

pub mod error;
pub mod swat;
pub mod swat_plus;

use crate::interpolation::result::{InterpolationOutput, SubbasinSeries};
use crate::output::error::WriteError;
use crate::types::observation::MISSING_VALUE;
use crate::types::parameter::Parameter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Layout of the written climate files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// SWAT2012 `.txt` files with a start date header.
    #[default]
    Swat,
    /// SWAT+ files with a metadata header and `.cli` index files.
    SwatPlus,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<OutputFormat> {
        match name.trim().to_ascii_lowercase().as_str() {
            "swat" | "swat2012" | "txt" => Some(OutputFormat::Swat),
            "swat_plus" | "swat+" | "swatplus" => Some(OutputFormat::SwatPlus),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Swat => "swat",
            OutputFormat::SwatPlus => "swat_plus",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Writes `output` to `dir` in the requested layout and returns the written paths.
pub fn write_output(
    format: OutputFormat,
    dir: &Path,
    output: &InterpolationOutput,
) -> Result<Vec<PathBuf>, WriteError> {
    match format {
        OutputFormat::Swat => swat::write(dir, output),
        OutputFormat::SwatPlus => swat_plus::write(dir, output),
    }
}

/// A group of parameters that SWAT reads from one file per subbasin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClimateVariable {
    Temperature,
    Precipitation,
    Humidity,
    Wind,
    Solar,
}

impl ClimateVariable {
    pub const ALL: [ClimateVariable; 5] = [
        ClimateVariable::Temperature,
        ClimateVariable::Precipitation,
        ClimateVariable::Humidity,
        ClimateVariable::Wind,
        ClimateVariable::Solar,
    ];

    /// File name prefix, shared by both layouts.
    pub fn prefix(&self) -> &'static str {
        match self {
            ClimateVariable::Temperature => "tmp",
            ClimateVariable::Precipitation => "pcp",
            ClimateVariable::Humidity => "rh",
            ClimateVariable::Wind => "wind",
            ClimateVariable::Solar => "solar",
        }
    }

    /// Columns of a data row, in file order.
    pub fn parameters(&self) -> &'static [Parameter] {
        match self {
            ClimateVariable::Temperature => &[Parameter::TempMax, Parameter::TempMin],
            ClimateVariable::Precipitation => &[Parameter::Precipitation],
            ClimateVariable::Humidity => &[Parameter::Humidity],
            ClimateVariable::Wind => &[Parameter::Wind],
            ClimateVariable::Solar => &[Parameter::Solar],
        }
    }

    /// Variables with at least one interpolated parameter in `output`.
    pub(crate) fn present_in(output: &InterpolationOutput) -> Vec<ClimateVariable> {
        Self::ALL
            .into_iter()
            .filter(|variable| {
                variable.parameters().iter().any(|parameter| {
                    output
                        .series
                        .iter()
                        .any(|series| series.values.contains_key(parameter))
                })
            })
            .collect()
    }

    /// Formatted row values for one day.
    pub(crate) fn day_values(&self, series: &SubbasinSeries, day_index: usize) -> Vec<String> {
        self.parameters()
            .iter()
            .map(|&parameter| format_value(series.value(parameter, day_index)))
            .collect()
    }
}

/// Two decimals, with the `-99.00` sentinel for missing values.
pub(crate) fn format_value(value: Option<f64>) -> String {
    format!("{:.2}", value.unwrap_or(MISSING_VALUE))
}

/// Subbasins in ascending id order.
pub(crate) fn sorted_series(output: &InterpolationOutput) -> Vec<&SubbasinSeries> {
    let mut series: Vec<&SubbasinSeries> = output.series.iter().collect();
    series.sort_by_key(|s| s.subbasin_id());
    series
}

pub(crate) fn create_dir(dir: &Path) -> Result<(), WriteError> {
    std::fs::create_dir_all(dir).map_err(|e| WriteError::DirCreation(dir.to_path_buf(), e))
}

/// Writes `lines` to `path`, one per line.
pub(crate) fn write_lines<I, S>(path: &Path, lines: I) -> Result<(), WriteError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let io_err = |e| WriteError::FileWrite(path.to_path_buf(), e);
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{}", line.as_ref()).map_err(io_err)?;
    }
    writer.flush().map_err(io_err)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::interpolation::result::{InterpolationOutput, RunSummary, SubbasinSeries};
    use crate::types::date_range::DateRange;
    use crate::types::parameter::Parameter;
    use crate::types::point::Point;
    use crate::types::target::Target;
    use chrono::NaiveDate;

    /// Two subbasins (ids 12 and 3) over 2020-12-30..=2021-01-01 with a gap in
    /// subbasin 3's precipitation.
    pub(crate) fn sample_output() -> InterpolationOutput {
        let date_range = DateRange::new(
            NaiveDate::from_ymd_opt(2020, 12, 30).unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        )
        .unwrap();

        let mut first = SubbasinSeries::new(
            Target::new(12, Point::new(50.123, 8.456)).with_elevation(250.0),
        );
        first
            .values
            .insert(Parameter::TempMax, vec![Some(5.0), Some(6.126), Some(4.0)]);
        first
            .values
            .insert(Parameter::TempMin, vec![Some(-1.0), None, Some(-2.5)]);
        first
            .values
            .insert(Parameter::Precipitation, vec![Some(0.0), Some(3.456), Some(1.0)]);

        let mut second = SubbasinSeries::new(Target::new(3, Point::new(49.9, 8.0)));
        second
            .values
            .insert(Parameter::TempMax, vec![Some(4.0), Some(5.0), Some(3.0)]);
        second
            .values
            .insert(Parameter::TempMin, vec![Some(-3.0), Some(-2.0), Some(-4.0)]);
        second
            .values
            .insert(Parameter::Precipitation, vec![None, Some(2.0), Some(0.5)]);

        InterpolationOutput {
            date_range,
            series: vec![first, second],
            summary: RunSummary::default(),
        }
    }
}
