//! The Meteostat station catalog: download, bincode cache and spatial queries.

use crate::geo::distance::distance_km;
use crate::source::error::SourceError;
use crate::types::date_range::DateRange;
use crate::types::point::Point;
use crate::types::station::Station;
use async_compression::tokio::bufread::GzipDecoder;
use bincode::config::{Configuration, Fixint, LittleEndian};
use chrono::NaiveDate;
use futures_util::TryStreamExt;
use log::info;
use reqwest::Client;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use tokio::io::{AsyncReadExt, BufReader};
use tokio_util::io::StreamReader;

const DATA_URL: &str = "https://bulk.meteostat.net/v2/stations/lite.json.gz";
const BINCODE_CACHE_FILE_NAME: &str = "stations_lite.bin";
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();
// Mean earth radius of the haversine crate, in km.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A station as listed in the Meteostat catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStation {
    /// Meteostat station id, e.g. `10637`.
    pub id: String,
    pub country: String,
    /// Station names by language code.
    pub name: HashMap<String, String>,
    pub location: CatalogLocation,
    pub inventory: Inventory,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalogLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
}

/// Reported availability of the data files of a station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub daily: InventoryRange,
    pub hourly: InventoryRange,
}

/// First and last day with data. Gaps may exist in between.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InventoryRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl InventoryRange {
    /// Whether the reported range shares at least one day with `range`.
    pub fn overlaps(&self, range: &DateRange) -> bool {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return false;
        };
        start <= range.end() && range.start() <= end
    }
}

impl CatalogStation {
    pub fn point(&self) -> Point {
        Point::new(self.location.latitude, self.location.longitude)
    }

    /// English name if present, otherwise any name.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .get("en")
            .or_else(|| self.name.values().next())
            .map(String::as_str)
    }

    pub fn to_station(&self) -> Station {
        Station {
            id: self.id.clone(),
            location: self.point(),
            elevation: self.location.elevation,
        }
    }
}

impl RTreeObject for CatalogStation {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.location.latitude, self.location.longitude])
    }
}

impl PointDistance for CatalogStation {
    // Squared planar distance in degrees, only used to order R-tree candidates.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.location.latitude - point[0];
        let dy = self.location.longitude - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index over all catalog stations.
#[derive(Debug, Clone)]
pub struct StationCatalog {
    rtree: RTree<CatalogStation>,
}

impl StationCatalog {
    /// Loads the catalog from `cache_dir`, downloading and caching it on first use.
    pub async fn load(cache_dir: &Path) -> Result<Self, SourceError> {
        let cache_file = cache_dir.join(BINCODE_CACHE_FILE_NAME);

        let stations = if tokio::fs::metadata(&cache_file).await.is_ok() {
            let path = cache_file.clone();
            tokio::task::spawn_blocking(move || Self::read_cache(&path)).await??
        } else {
            info!("Station catalog not cached, fetching {DATA_URL}");
            let stations = Self::fetch_stations().await?;
            Self::write_cache(stations.clone(), &cache_file).await?;
            stations
        };

        Ok(Self::from_stations(stations))
    }

    pub fn from_stations(stations: Vec<CatalogStation>) -> Self {
        Self {
            rtree: RTree::bulk_load(stations),
        }
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stations within `radius_km` (great-circle) of `center`, nearest first.
    ///
    /// The R-tree is searched with a latitude/longitude box that contains the
    /// whole search circle; every candidate is then checked with the haversine
    /// distance.
    pub fn within_radius(&self, center: Point, radius_km: f64) -> Vec<(&CatalogStation, f64)> {
        if radius_km.is_nan() || radius_km < 0.0 {
            return Vec::new();
        }
        let mut found: Vec<(&CatalogStation, f64)> = self
            .rtree
            .locate_in_envelope(&search_envelope(center, radius_km))
            .filter_map(|station| {
                let distance = distance_km(center, station.point());
                (distance <= radius_km).then_some((station, distance))
            })
            .collect();
        found.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        found
    }

    fn read_cache(cache_path: &Path) -> Result<Vec<CatalogStation>, SourceError> {
        let bytes = std::fs::read(cache_path)
            .map_err(|e| SourceError::CacheRead(cache_path.to_path_buf(), e))?;
        let (stations, _) =
            bincode::serde::decode_from_slice::<Vec<CatalogStation>, _>(&bytes, BINCODE_CONFIG)
                .map_err(|e| SourceError::CacheDecode(cache_path.to_path_buf(), Box::new(e)))?;
        Ok(stations)
    }

    async fn write_cache(
        stations: Vec<CatalogStation>,
        cache_path: &Path,
    ) -> Result<(), SourceError> {
        let encoded = tokio::task::spawn_blocking(move || {
            bincode::serde::encode_to_vec(stations, BINCODE_CONFIG)
                .map_err(|e| SourceError::CacheEncode(Box::new(e)))
        })
        .await??;
        tokio::fs::write(cache_path, &encoded)
            .await
            .map_err(|e| SourceError::CacheWrite(cache_path.to_path_buf(), e))?;
        info!(
            "Cached {} bytes of station catalog to {}",
            encoded.len(),
            cache_path.display()
        );
        Ok(())
    }

    async fn fetch_stations() -> Result<Vec<CatalogStation>, SourceError> {
        let client = Client::new();
        let response = client
            .get(DATA_URL)
            .send()
            .await
            .map_err(|e| SourceError::NetworkRequest(DATA_URL.to_string(), e))?;
        let response = response.error_for_status().map_err(|e| match e.status() {
            Some(status) => SourceError::HttpStatus {
                url: DATA_URL.to_string(),
                status,
                source: e,
            },
            None => SourceError::NetworkRequest(DATA_URL.to_string(), e),
        })?;

        let stream = response.bytes_stream().map_err(io::Error::other);
        let stream_reader = StreamReader::new(stream);
        let gzip_decoder = GzipDecoder::new(BufReader::new(stream_reader));
        let mut decoder_reader = BufReader::new(gzip_decoder);
        let mut decompressed_json = Vec::with_capacity(20_000_000);
        decoder_reader.read_to_end(&mut decompressed_json).await?;

        let stations = tokio::task::spawn_blocking(move || {
            serde_json::from_slice::<Vec<CatalogStation>>(&decompressed_json)
                .map_err(SourceError::from)
        })
        .await??;
        info!("Parsed {} stations from the Meteostat catalog", stations.len());
        Ok(stations)
    }
}

/// Latitude/longitude box containing every point within `radius_km` of `center`.
///
/// Falls back to the full longitude range when the circle reaches a pole or
/// crosses the antimeridian.
fn search_envelope(center: Point, radius_km: f64) -> AABB<[f64; 2]> {
    let delta_lat = (radius_km / EARTH_RADIUS_KM).to_degrees();
    let min_lat = (center.latitude - delta_lat).max(-90.0);
    let max_lat = (center.latitude + delta_lat).min(90.0);

    let widest_lat = min_lat.abs().max(max_lat.abs());
    let (min_lon, max_lon) = if widest_lat >= 90.0 {
        (-180.0, 180.0)
    } else {
        let delta_lon = delta_lat / widest_lat.to_radians().cos();
        let (west, east) = (center.longitude - delta_lon, center.longitude + delta_lon);
        if west < -180.0 || east > 180.0 {
            (-180.0, 180.0)
        } else {
            (west, east)
        }
    };

    AABB::from_corners([min_lat, min_lon], [max_lat, max_lon])
}
