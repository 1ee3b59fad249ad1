//! SWAT2012 text layout.
//!
//! Each subbasin gets one `{prefix}{id:03}.txt` file per variable. The first
//! line is the start date as `YYYYMMDD`, followed by one line per day:
//! `max,min` for temperature and a single value otherwise. A station list
//! (`tmp.txt`, `pcp.txt`, ...) maps each file to its subbasin location.

use crate::interpolation::result::{InterpolationOutput, SubbasinSeries};
use crate::output::error::WriteError;
use crate::output::{create_dir, sorted_series, write_lines, ClimateVariable};
use log::{info, warn};
use std::path::{Path, PathBuf};

const STATION_LIST_HEADER: &str = "ID,NAME,LAT,LONG,ELEVATION";

pub fn data_file_name(variable: ClimateVariable, subbasin_id: u32) -> String {
    format!("{}{:03}.txt", variable.prefix(), subbasin_id)
}

/// Writes all data files and station lists to `dir`.
pub fn write(dir: &Path, output: &InterpolationOutput) -> Result<Vec<PathBuf>, WriteError> {
    create_dir(dir)?;
    let series = sorted_series(output);
    let mut written = Vec::new();

    for variable in ClimateVariable::present_in(output) {
        for subbasin in &series {
            written.push(write_data_file(dir, variable, subbasin, output)?);
        }
        written.push(write_station_list(dir, variable, &series)?);
    }

    info!("Wrote {} SWAT files to {}", written.len(), dir.display());
    Ok(written)
}

fn write_data_file(
    dir: &Path,
    variable: ClimateVariable,
    subbasin: &SubbasinSeries,
    output: &InterpolationOutput,
) -> Result<PathBuf, WriteError> {
    let path = dir.join(data_file_name(variable, subbasin.subbasin_id()));
    let header = output.date_range.start().format("%Y%m%d").to_string();
    let rows = (0..output.date_range.num_days())
        .map(|day_index| variable.day_values(subbasin, day_index).join(","));
    write_lines(&path, std::iter::once(header).chain(rows))?;
    Ok(path)
}

fn write_station_list(
    dir: &Path,
    variable: ClimateVariable,
    series: &[&SubbasinSeries],
) -> Result<PathBuf, WriteError> {
    let path = dir.join(format!("{}.txt", variable.prefix()));
    let rows = series.iter().map(|subbasin| {
        let target = &subbasin.target;
        let elevation = target.elevation.unwrap_or_else(|| {
            warn!(
                "Subbasin {} has no elevation, writing 0 to {}",
                target.subbasin_id,
                path.display()
            );
            0.0
        });
        format!(
            "{},{}{:03},{},{},{}",
            target.subbasin_id,
            variable.prefix(),
            target.subbasin_id,
            target.location.latitude,
            target.location.longitude,
            elevation
        )
    });
    write_lines(&path, std::iter::once(STATION_LIST_HEADER.to_string()).chain(rows))?;
    Ok(path)
}
