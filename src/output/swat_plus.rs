//! SWAT+ layout.
//!
//! Data files carry the file name, a `nbyr tstep lat lon elev` header and its
//! values, then tab separated `year yday value` rows (`year yday max min` for
//! temperature). A `.cli` index per variable lists the data files.

use crate::interpolation::result::{InterpolationOutput, SubbasinSeries};
use crate::output::error::WriteError;
use crate::output::{create_dir, sorted_series, write_lines, ClimateVariable};
use chrono::Datelike;
use log::{info, warn};
use std::path::{Path, PathBuf};

const HEADER: &str = "nbyr\ttstep\tlat\tlon\telev";
// Daily time step.
const TSTEP: u32 = 0;

impl ClimateVariable {
    pub fn swat_plus_extension(&self) -> &'static str {
        match self {
            ClimateVariable::Temperature => "tmp",
            ClimateVariable::Precipitation => "pcp",
            ClimateVariable::Humidity => "hmd",
            ClimateVariable::Wind => "wnd",
            ClimateVariable::Solar => "slr",
        }
    }

    pub fn cli_file_name(&self) -> String {
        format!("{}.cli", self.swat_plus_extension())
    }
}

pub fn data_file_name(variable: ClimateVariable, subbasin_id: u32) -> String {
    format!(
        "{}{:03}.{}",
        variable.prefix(),
        subbasin_id,
        variable.swat_plus_extension()
    )
}

/// Writes all data files and `.cli` index files to `dir`.
pub fn write(dir: &Path, output: &InterpolationOutput) -> Result<Vec<PathBuf>, WriteError> {
    create_dir(dir)?;
    let series = sorted_series(output);
    let mut written = Vec::new();

    for variable in ClimateVariable::present_in(output) {
        for subbasin in &series {
            written.push(write_data_file(dir, variable, subbasin, output)?);
        }
        written.push(write_cli_file(dir, variable, &series)?);
    }

    info!("Wrote {} SWAT+ files to {}", written.len(), dir.display());
    Ok(written)
}

fn write_data_file(
    dir: &Path,
    variable: ClimateVariable,
    subbasin: &SubbasinSeries,
    output: &InterpolationOutput,
) -> Result<PathBuf, WriteError> {
    let file_name = data_file_name(variable, subbasin.subbasin_id());
    let path = dir.join(&file_name);
    let target = &subbasin.target;
    let elevation = target.elevation.unwrap_or_else(|| {
        warn!("Subbasin {} has no elevation, writing 0 to {file_name}", target.subbasin_id);
        0.0
    });
    let metadata = format!(
        "{}\t{TSTEP}\t{:.2}\t{:.2}\t{:.2}",
        output.date_range.num_years(),
        target.location.latitude,
        target.location.longitude,
        elevation
    );

    let rows = output
        .date_range
        .days()
        .enumerate()
        .map(|(day_index, date)| {
            let mut fields = vec![date.year().to_string(), date.ordinal().to_string()];
            fields.extend(variable.day_values(subbasin, day_index));
            fields.join("\t")
        });

    let preamble = [file_name.clone(), HEADER.to_string(), metadata];
    write_lines(&path, preamble.into_iter().chain(rows))?;
    Ok(path)
}

fn write_cli_file(
    dir: &Path,
    variable: ClimateVariable,
    series: &[&SubbasinSeries],
) -> Result<PathBuf, WriteError> {
    let file_name = variable.cli_file_name();
    let path = dir.join(&file_name);
    let data_files = series
        .iter()
        .map(|subbasin| data_file_name(variable, subbasin.subbasin_id()));
    write_lines(&path, std::iter::once(file_name.clone()).chain(data_files))?;
    Ok(path)
}
