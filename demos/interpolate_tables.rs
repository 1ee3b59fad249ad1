//! Interpolates station observations from CSV tables and writes SWAT files.
//!
//! Usage: `interpolate_tables <data_dir> <output_dir>`. The data directory holds
//! `watershed.csv`, `stations.csv`, `observations.csv`,
//! `interpolation_parameters.csv` and, for the precipitation correction,
//! `richter_parameters.csv`.

use std::env;
use std::path::PathBuf;
use swat_meteo::{
    load_interpolation_parameters, load_observations, load_richter_coefficients, load_stations,
    load_watershed, write_output, InterpolationEngine, SwatMeteoError,
};

fn main() -> Result<(), SwatMeteoError> {
    env_logger::init();
    let mut args = env::args().skip(1);
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| "data".to_string()));
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| "output".to_string()));

    let params = load_interpolation_parameters(&data_dir.join("interpolation_parameters.csv"))?;
    let targets = load_watershed(&data_dir.join("watershed.csv"))?;
    let stations = load_stations(&data_dir.join("stations.csv"))?;
    let observations = load_observations(&data_dir.join("observations.csv"))?;
    let richter = if params.config.apply_richter {
        Some(load_richter_coefficients(&data_dir.join("richter_parameters.csv"))?)
    } else {
        None
    };

    let engine = InterpolationEngine::new(params.config)?;
    let output = engine.run(&targets, &stations, &observations, richter.as_ref())?;
    let written = write_output(params.output_format, &output_dir, &output)?;

    println!(
        "Wrote {} {} files to {} ({} of {} cells without data)",
        written.len(),
        params.output_format,
        output_dir.display(),
        output.summary.gapped_cells,
        output.summary.cells
    );
    Ok(())
}
