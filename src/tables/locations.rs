//! Watershed (subbasin centroid) and station location tables.

use crate::tables::error::TableError;
use crate::tables::reader::{read_csv, TableColumn};
use crate::types::point::Point;
use crate::types::station::Station;
use crate::types::target::Target;
use log::info;
use std::path::Path;

const SUBBASIN_COLUMNS: [&str; 4] = ["subbasin_id", "Subbasin", "subbasin", "ID"];
const STATION_COLUMNS: [&str; 3] = ["station_id", "id", "ID"];
const LATITUDE_COLUMNS: [&str; 4] = ["lat", "Lat", "latitude", "Latitude"];
const LONGITUDE_COLUMNS: [&str; 5] = ["lon", "Long_", "Long", "longitude", "Longitude"];
const ELEVATION_COLUMNS: [&str; 4] = ["elev", "Elev", "elevation", "Elevation"];

/// Loads subbasin centroids from a watershed CSV table.
///
/// Every row needs a subbasin id and a centroid latitude/longitude; elevation is
/// optional. Duplicate ids are left for the engine to reject.
pub fn load_watershed(path: &Path) -> Result<Vec<Target>, TableError> {
    let df = read_csv(path)?;
    let ids = TableColumn::require(path, &df, &SUBBASIN_COLUMNS)?.required_ids()?;
    let locations = read_locations(path, &df)?;
    let elevations = read_elevations(path, &df)?;

    let targets: Vec<Target> = ids
        .into_iter()
        .zip(locations)
        .zip(elevations)
        .map(|((id, location), elevation)| Target {
            subbasin_id: id,
            location,
            elevation,
        })
        .collect();
    info!("Loaded {} subbasins from {}", targets.len(), path.display());
    Ok(targets)
}

/// Loads station locations from a CSV table.
pub fn load_stations(path: &Path) -> Result<Vec<Station>, TableError> {
    let df = read_csv(path)?;
    let ids = TableColumn::require(path, &df, &STATION_COLUMNS)?.required_strings()?;
    let locations = read_locations(path, &df)?;
    let elevations = read_elevations(path, &df)?;

    let stations: Vec<Station> = ids
        .into_iter()
        .zip(locations)
        .zip(elevations)
        .map(|((id, location), elevation)| Station {
            id,
            location,
            elevation,
        })
        .collect();
    info!("Loaded {} stations from {}", stations.len(), path.display());
    Ok(stations)
}

fn read_locations(path: &Path, df: &polars::frame::DataFrame) -> Result<Vec<Point>, TableError> {
    let latitude = TableColumn::require(path, df, &LATITUDE_COLUMNS)?;
    let longitude = TableColumn::require(path, df, &LONGITUDE_COLUMNS)?;
    let latitudes = latitude.required_floats()?;
    let longitudes = longitude.required_floats()?;

    latitudes
        .into_iter()
        .zip(longitudes)
        .enumerate()
        .map(|(row, (lat, lon))| {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(latitude.invalid(row, lat));
            }
            if !(-180.0..=180.0).contains(&lon) {
                return Err(longitude.invalid(row, lon));
            }
            Ok(Point::new(lat, lon))
        })
        .collect()
}

fn read_elevations(
    path: &Path,
    df: &polars::frame::DataFrame,
) -> Result<Vec<Option<f64>>, TableError> {
    match TableColumn::find(path, df, &ELEVATION_COLUMNS) {
        Some(column) => Ok(column
            .floats()?
            .into_iter()
            .map(|value| value.filter(|v| v.is_finite()))
            .collect()),
        None => Ok(vec![None; df.height()]),
    }
}
