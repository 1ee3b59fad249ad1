//! Download and parquet cache of Meteostat bulk data files.

use crate::source::error::SourceError;
use async_compression::tokio::bufread::GzipDecoder;
use futures_util::TryStreamExt;
use log::{info, warn};
use polars::prelude::*;
use reqwest::Client;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::io::AsyncReadExt;
use tokio::{fs, task};
use tokio_util::io::StreamReader;

const BULK_URL: &str = "https://bulk.meteostat.net/v2";

/// Granularity of a Meteostat bulk file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Hourly,
    Daily,
}

impl Frequency {
    pub(crate) fn path_segment(&self) -> &'static str {
        match self {
            Frequency::Hourly => "hourly",
            Frequency::Daily => "daily",
        }
    }

    pub(crate) fn cache_file_prefix(&self) -> String {
        format!("{}-", self.path_segment())
    }

    /// Column names of the headerless bulk CSV files.
    pub(crate) fn schema_column_names(&self) -> &'static [&'static str] {
        match self {
            Frequency::Hourly => &[
                "date", "hour", "temp", "dwpt", "rhum", "prcp", "snow", "wdir", "wspd", "wpgt",
                "pres", "tsun", "coco",
            ],
            Frequency::Daily => &[
                "date", "tavg", "tmin", "tmax", "prcp", "snow", "wdir", "wspd", "wpgt", "pres",
                "tsun",
            ],
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

/// Fetches bulk files and keeps them as parquet in the cache directory.
pub struct DataLoader {
    cache_dir: PathBuf,
    download_client: Client,
}

impl DataLoader {
    pub fn new(cache_dir: &Path) -> DataLoader {
        DataLoader {
            cache_dir: cache_dir.to_path_buf(),
            download_client: Client::new(),
        }
    }

    pub fn cache_path(&self, frequency: Frequency, station: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}{}.parquet", frequency.cache_file_prefix(), station))
    }

    /// Lazily scans the cached file of `station`, downloading it first if needed.
    pub async fn get_frame(
        &self,
        frequency: Frequency,
        station: &str,
    ) -> Result<LazyFrame, SourceError> {
        let parquet_path = self.cache_path(frequency, station);

        if fs::metadata(&parquet_path).await.is_ok() {
            info!("Cache hit for {frequency} data of station {station}");
        } else {
            info!("Cache miss for {frequency} data of station {station}, downloading");
            let raw_bytes = self.download(frequency, station).await?;
            let df = csv_to_dataframe(raw_bytes, station, frequency).await?;

            fs::create_dir_all(&self.cache_dir)
                .await
                .map_err(|e| SourceError::CacheDirCreation(self.cache_dir.clone(), e))?;
            cache_dataframe(df, &parquet_path).await?;
        }

        LazyFrame::scan_parquet(&parquet_path, Default::default())
            .map_err(|e| SourceError::ParquetScan(parquet_path.clone(), e))
    }

    async fn download(&self, frequency: Frequency, station: &str) -> Result<Vec<u8>, SourceError> {
        let url = format!("{BULK_URL}/{}/{station}.csv.gz", frequency.path_segment());
        info!("Downloading {url}");

        let response = self
            .download_client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {url}: {e}");
                return Err(match e.status() {
                    Some(status) => SourceError::HttpStatus {
                        url,
                        status,
                        source: e,
                    },
                    None => SourceError::NetworkRequest(url, e),
                });
            }
        };

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let mut decoder = GzipDecoder::new(StreamReader::new(stream));
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed).await?;
        info!(
            "Downloaded and decompressed {} bytes for station {station}",
            decompressed.len()
        );
        Ok(decompressed)
    }
}

/// Parses headerless bulk CSV bytes and names the columns after `frequency`.
pub(crate) async fn csv_to_dataframe(
    bytes: Vec<u8>,
    station: &str,
    frequency: Frequency,
) -> Result<DataFrame, SourceError> {
    let station = station.to_string();
    let schema_names = frequency.schema_column_names();

    task::spawn_blocking(move || {
        let io_err = |source| SourceError::CsvReadIo {
            station: station.clone(),
            source,
        };
        let mut temp_file = NamedTempFile::new().map_err(io_err)?;
        temp_file.write_all(&bytes).map_err(io_err)?;
        temp_file.flush().map_err(io_err)?;

        let polars_err = |source| SourceError::CsvReadPolars {
            station: station.clone(),
            source,
        };
        let mut df = CsvReadOptions::default()
            .with_has_header(false)
            .try_into_reader_with_file_path(Some(temp_file.path().to_path_buf()))
            .map_err(polars_err)?
            .finish()
            .map_err(polars_err)?;

        if df.width() != schema_names.len() {
            return Err(SourceError::SchemaMismatch {
                station,
                frequency,
                expected: schema_names.len(),
                found: df.width(),
            });
        }

        df.set_column_names(schema_names.iter().copied())
            .map_err(|source| SourceError::ColumnRename {
                station: station.clone(),
                source,
            })?;
        Ok(df)
    })
    .await?
}

async fn cache_dataframe(mut df: DataFrame, path: &Path) -> Result<(), SourceError> {
    let path_buf = path.to_path_buf();
    task::spawn_blocking(move || {
        let file = std::fs::File::create(&path_buf)
            .map_err(|e| SourceError::ParquetWriteIo(path_buf.clone(), e))?;
        ParquetWriter::new(file)
            .with_compression(ParquetCompression::Snappy)
            .finish(&mut df)
            .map_err(|e| SourceError::ParquetWritePolars(path_buf.clone(), e))?;
        info!("Cached {} rows to {}", df.height(), path_buf.display());
        Ok::<(), SourceError>(())
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DAILY_CSV: &str = "2021-07-01,18.2,12.1,24.0,0.0,,250,10.8,,1015.2,\n\
                             2021-07-02,16.0,11.0,20.5,4.2,,240,14.4,,1011.0,\n";

    #[tokio::test]
    async fn test_csv_to_dataframe_names_columns() {
        let df = csv_to_dataframe(DAILY_CSV.as_bytes().to_vec(), "10637", Frequency::Daily)
            .await
            .unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(
            df.get_column_names()
                .iter()
                .map(|name| name.as_str())
                .collect::<Vec<_>>(),
            Frequency::Daily.schema_column_names()
        );
    }

    #[tokio::test]
    async fn test_csv_schema_mismatch() {
        let err = csv_to_dataframe(b"2021-07-01,1.0,2.0\n".to_vec(), "x", Frequency::Daily)
            .await
            .unwrap_err();

        assert!(
            matches!(err, SourceError::SchemaMismatch { expected: 11, found: 3, .. }),
            "{err}"
        );
    }

    #[tokio::test]
    async fn test_cached_frame_is_scanned_without_download() {
        let dir = tempdir().unwrap();
        let loader = DataLoader::new(dir.path());
        let df = csv_to_dataframe(DAILY_CSV.as_bytes().to_vec(), "10637", Frequency::Daily)
            .await
            .unwrap();
        cache_dataframe(df, &loader.cache_path(Frequency::Daily, "10637"))
            .await
            .unwrap();

        let frame = loader
            .get_frame(Frequency::Daily, "10637")
            .await
            .unwrap()
            .collect()
            .unwrap();

        assert_eq!(frame.height(), 2);
        assert_eq!(frame.column("prcp").unwrap().f64().unwrap().get(1), Some(4.2));
    }

    #[tokio::test]
    #[ignore = "downloads from bulk.meteostat.net"]
    async fn test_download_daily_frame() -> Result<(), SourceError> {
        let dir = tempdir()?;
        let loader = DataLoader::new(dir.path());
        let frame = loader.get_frame(Frequency::Daily, "10637").await?;
        let df = frame
            .collect()
            .map_err(|source| SourceError::DataFrameProcessing {
                station: "10637".into(),
                source,
            })?;
        assert!(df.height() > 1000);
        Ok(())
    }
}
