//! Interpolates Meteostat observations onto the subbasins of a watershed table
//! and writes SWAT+ files.
//!
//! Usage: `meteostat_watershed <watershed.csv> <output_dir>`.

use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;
use swat_meteo::{
    load_watershed, write_output, DateRange, InterpolationConfig, InterpolationEngine,
    MeteostatSource, OutputFormat, Parameter, SwatMeteoError,
};

const RADIUS_KM: f64 = 30.0;

#[tokio::main]
async fn main() -> Result<(), SwatMeteoError> {
    env_logger::init();
    let mut args = env::args().skip(1);
    let watershed = PathBuf::from(args.next().unwrap_or_else(|| "data/watershed.csv".to_string()));
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| "output".to_string()));

    let targets = load_watershed(&watershed)?;
    let date_range = DateRange::new(
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
    )?;

    let source = MeteostatSource::new().await?;
    let data = source
        .fetch()
        .targets(&targets)
        .date_range(date_range)
        .radius_km(RADIUS_KM)
        .hourly_humidity(true)
        .call()
        .await?;

    let config = InterpolationConfig::builder()
        .radius_km(RADIUS_KM)
        .date_range(date_range)
        .parameters(vec![
            Parameter::Precipitation,
            Parameter::TempMax,
            Parameter::TempMin,
            Parameter::Humidity,
            Parameter::Wind,
        ])
        .build();
    let output = InterpolationEngine::new(config)?.run(
        &targets,
        &data.stations,
        &data.observations,
        None,
    )?;

    let written = write_output(OutputFormat::SwatPlus, &output_dir, &output)?;
    println!(
        "Wrote {} files for {} subbasins from {} stations",
        written.len(),
        targets.len(),
        data.stations.len()
    );
    Ok(())
}
