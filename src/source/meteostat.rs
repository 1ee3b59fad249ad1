//! Station observations for a watershed from the Meteostat bulk data.

use crate::source::catalog::StationCatalog;
use crate::source::error::SourceError;
use crate::source::loader::{DataLoader, Frequency};
use crate::types::date_range::DateRange;
use crate::types::observation::{Observation, ObservationSet};
use crate::types::parameter::Parameter;
use crate::types::station::Station;
use crate::types::target::Target;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use chrono::NaiveDate;
use futures_util::{stream, StreamExt};
use log::{info, warn};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

const DEFAULT_CONCURRENCY: usize = 8;
const KMH_PER_MS: f64 = 3.6;

/// Daily columns and the parameter each one feeds.
const DAILY_COLUMNS: [(&str, Parameter); 5] = [
    ("tavg", Parameter::TempMean),
    ("tmin", Parameter::TempMin),
    ("tmax", Parameter::TempMax),
    ("prcp", Parameter::Precipitation),
    ("wspd", Parameter::Wind),
];

/// Stations and their observations, ready for the interpolation engine.
#[derive(Debug, Clone, Default)]
pub struct SourceData {
    pub stations: Vec<Station>,
    pub observations: ObservationSet,
}

/// Collects station observations around a set of targets from Meteostat.
///
/// Downloads are cached below the cache folder: the station catalog as bincode,
/// data files as parquet. Meteostat publishes no solar radiation, so solar
/// values stay empty when this source is used.
pub struct MeteostatSource {
    catalog: StationCatalog,
    loader: DataLoader,
}

#[bon]
impl MeteostatSource {
    /// Creates a source that caches into `cache_folder`, creating it if needed.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, SourceError> {
        ensure_cache_dir_exists(&cache_folder).await?;
        Ok(Self {
            catalog: StationCatalog::load(&cache_folder).await?,
            loader: DataLoader::new(&cache_folder),
        })
    }

    /// Creates a source using the platform cache directory.
    pub async fn new() -> Result<Self, SourceError> {
        Self::with_cache_folder(get_cache_dir()?).await
    }

    /// Creates a source over an already loaded catalog.
    pub fn with_catalog(catalog: StationCatalog, cache_folder: PathBuf) -> Self {
        Self {
            catalog,
            loader: DataLoader::new(&cache_folder),
        }
    }

    /// Stations within `radius_km` of any target whose daily inventory overlaps
    /// `date_range`, ordered by id.
    pub fn candidate_stations(
        &self,
        targets: &[Target],
        date_range: &DateRange,
        radius_km: f64,
    ) -> Vec<Station> {
        let mut candidates = BTreeMap::new();
        for target in targets {
            for (station, _) in self.catalog.within_radius(target.location, radius_km) {
                if station.inventory.daily.overlaps(date_range) {
                    candidates
                        .entry(station.id.clone())
                        .or_insert_with(|| station.to_station());
                }
            }
        }
        candidates.into_values().collect()
    }

    /// Fetches daily observations of all candidate stations.
    ///
    /// Stations whose data file does not exist on the server are skipped with a
    /// warning; any other failure aborts the fetch. Only stations that delivered
    /// at least one observation are returned.
    ///
    /// * `.targets(&[Target])`: **Required.** Subbasin centroids.
    /// * `.date_range(DateRange)`: **Required.** Days to fetch.
    /// * `.radius_km(f64)`: **Required.** Search radius around each target.
    /// * `.hourly_humidity(bool)`: Derive daily humidity from the hourly files. Defaults to `false`.
    /// * `.concurrency(usize)`: Parallel downloads. Defaults to 8.
    #[builder]
    pub async fn fetch(
        &self,
        targets: &[Target],
        date_range: DateRange,
        radius_km: f64,
        hourly_humidity: Option<bool>,
        concurrency: Option<usize>,
    ) -> Result<SourceData, SourceError> {
        let hourly_humidity = hourly_humidity.unwrap_or(false);
        let concurrency = concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1);

        let candidates = self.candidate_stations(targets, &date_range, radius_km);
        info!(
            "{} Meteostat stations within {radius_km} km of {} targets",
            candidates.len(),
            targets.len()
        );

        let results: Vec<Result<Vec<Observation>, SourceError>> = stream::iter(&candidates)
            .map(|station| self.station_observations(&station.id, date_range, hourly_humidity))
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut observations = ObservationSet::new();
        for result in results {
            match result {
                Ok(rows) => observations.extend(rows),
                Err(e) if e.is_not_found() => warn!("Skipping station without data file: {e}"),
                Err(e) => return Err(e),
            }
        }

        let stations: Vec<Station> = candidates
            .into_iter()
            .filter(|station| observations.contains_station(&station.id))
            .collect();
        info!(
            "Fetched {} observations from {} stations, solar radiation is not available from Meteostat",
            observations.len(),
            stations.len()
        );
        Ok(SourceData {
            stations,
            observations,
        })
    }

    async fn station_observations(
        &self,
        station: &str,
        date_range: DateRange,
        hourly_humidity: bool,
    ) -> Result<Vec<Observation>, SourceError> {
        let daily = self.loader.get_frame(Frequency::Daily, station).await?;
        let mut rows = daily_observations(daily, station, &date_range)?;

        if hourly_humidity {
            match self.loader.get_frame(Frequency::Hourly, station).await {
                Ok(hourly) => rows.extend(humidity_observations(hourly, station, &date_range)?),
                Err(e) if e.is_not_found() => {
                    warn!("No hourly data for station {station}, humidity stays empty")
                }
                Err(e) => return Err(e),
            }
        }
        Ok(rows)
    }
}

fn within(frame: LazyFrame, date_range: &DateRange) -> LazyFrame {
    let start = date_range.start().format("%Y-%m-%d").to_string();
    let end = date_range.end().format("%Y-%m-%d").to_string();
    frame.filter(
        col("date")
            .cast(DataType::String)
            .gt_eq(lit(start))
            .and(col("date").cast(DataType::String).lt_eq(lit(end))),
    )
}

/// Converts a daily bulk frame into observations inside `date_range`.
///
/// Wind speed is converted from km/h to m/s.
pub(crate) fn daily_observations(
    frame: LazyFrame,
    station: &str,
    date_range: &DateRange,
) -> Result<Vec<Observation>, SourceError> {
    let polars_err = |source| SourceError::DataFrameProcessing {
        station: station.to_string(),
        source,
    };
    let mut selection = vec![col("date").cast(DataType::String)];
    selection.extend(
        DAILY_COLUMNS
            .iter()
            .map(|(name, _)| col(*name).cast(DataType::Float64)),
    );
    let df = within(frame, date_range)
        .select(selection)
        .collect()
        .map_err(polars_err)?;

    let dates = parse_dates(&df, station)?;
    let mut rows = Vec::with_capacity(dates.len() * DAILY_COLUMNS.len());
    for (name, parameter) in DAILY_COLUMNS {
        let values = df
            .column(name)
            .map_err(polars_err)?
            .f64()
            .map_err(polars_err)?;
        for (date, value) in dates.iter().zip(values) {
            let (Some(date), Some(value)) = (*date, value) else {
                continue;
            };
            let value = match parameter {
                Parameter::Wind => value / KMH_PER_MS,
                _ => value,
            };
            rows.push(Observation::new(station, date, parameter, Some(value)));
        }
    }
    Ok(rows)
}

/// Daily mean relative humidity from an hourly bulk frame.
pub(crate) fn humidity_observations(
    frame: LazyFrame,
    station: &str,
    date_range: &DateRange,
) -> Result<Vec<Observation>, SourceError> {
    let polars_err = |source| SourceError::DataFrameProcessing {
        station: station.to_string(),
        source,
    };
    let df = within(frame, date_range)
        .group_by([col("date").cast(DataType::String)])
        .agg([col("rhum").cast(DataType::Float64).mean().alias("rhum")])
        .sort(["date"], Default::default())
        .collect()
        .map_err(polars_err)?;

    let dates = parse_dates(&df, station)?;
    let values = df
        .column("rhum")
        .map_err(polars_err)?
        .f64()
        .map_err(polars_err)?;
    Ok(dates
        .into_iter()
        .zip(values)
        .filter_map(|(date, value)| {
            Some(Observation::new(station, date?, Parameter::Humidity, Some(value?)))
        })
        .collect())
}

fn parse_dates(df: &DataFrame, station: &str) -> Result<Vec<Option<NaiveDate>>, SourceError> {
    let polars_err = |source| SourceError::DataFrameProcessing {
        station: station.to_string(),
        source,
    };
    let dates = df
        .column("date")
        .map_err(polars_err)?
        .str()
        .map_err(polars_err)?;
    Ok(dates
        .into_iter()
        .map(|date| date.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
        .collect())
}
