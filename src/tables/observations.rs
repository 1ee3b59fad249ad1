//! Long-format observation tables: one row per station, date and parameter.

use crate::tables::error::TableError;
use crate::tables::reader::{read_csv, TableColumn};
use crate::types::observation::{ObservationSet, MISSING_VALUE};
use crate::types::parameter::Parameter;
use log::{info, warn};
use std::collections::BTreeSet;
use std::path::Path;

const STATION_COLUMNS: [&str; 3] = ["station_id", "station", "id"];
const DATE_COLUMNS: [&str; 2] = ["date", "Date"];
const PARAMETER_COLUMNS: [&str; 3] = ["parameter", "variable", "Parameter"];
const VALUE_COLUMNS: [&str; 2] = ["value", "Value"];

/// Loads observations from a long-format CSV table with the columns
/// `station_id,date,parameter,value`.
///
/// Empty cells, unparsable numbers and the `-99` sentinel are missing values
/// and are not stored. Rows naming a parameter the pipeline does not use are
/// skipped.
pub fn load_observations(path: &Path) -> Result<ObservationSet, TableError> {
    let df = read_csv(path)?;
    let station_ids = TableColumn::require(path, &df, &STATION_COLUMNS)?.required_strings()?;
    let dates = TableColumn::require(path, &df, &DATE_COLUMNS)?.required_dates()?;
    let parameter_column = TableColumn::require(path, &df, &PARAMETER_COLUMNS)?;
    let parameters = parameter_column.required_strings()?;
    let values = TableColumn::require(path, &df, &VALUE_COLUMNS)?.floats()?;

    let mut observations = ObservationSet::new();
    let mut unknown = BTreeSet::new();
    let mut missing = 0usize;
    for (((station_id, date), name), value) in station_ids
        .iter()
        .zip(dates)
        .zip(parameters)
        .zip(values)
    {
        let Some(parameter) = Parameter::from_name(&name) else {
            unknown.insert(name);
            continue;
        };
        match value.filter(|v| *v != MISSING_VALUE) {
            Some(value) => {
                observations.insert(station_id, date, parameter, value);
            }
            None => missing += 1,
        }
    }

    for name in &unknown {
        warn!("Skipping unknown parameter '{name}' in {}", path.display());
    }
    info!(
        "Loaded {} observations ({} missing) from {}",
        observations.len(),
        missing,
        path.display()
    );
    Ok(observations)
}
