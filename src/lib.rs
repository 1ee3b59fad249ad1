mod correction;
mod error;
mod geo;
mod interpolation;
mod output;
mod source;
mod tables;
mod types;
mod utils;

pub use error::SwatMeteoError;

pub use types::date_range::DateRange;
pub use types::observation::{Observation, ObservationSet, MISSING_VALUE};
pub use types::parameter::Parameter;
pub use types::point::Point;
pub use types::station::Station;
pub use types::target::Target;

pub use geo::distance::distance_km;

pub use correction::richter::correct as correct_precipitation;
pub use correction::richter::{CorrectionClass, CorrectionPair, RichterCoefficients};

pub use interpolation::config::{InterpolationConfig, TieBreak, DEFAULT_SOLAR_STATION_COUNT};
pub use interpolation::engine::InterpolationEngine;
pub use interpolation::error::ConfigurationError;
pub use interpolation::idw::interpolate as idw_interpolate;
pub use interpolation::idw::{Sample, ZERO_DISTANCE_KM};
pub use interpolation::result::{
    InterpolationOutput, InterpolationResult, RunSummary, SubbasinSeries,
};
pub use interpolation::selection::{SelectedStation, SelectionPolicy, StationSelector};

pub use tables::coefficients::{
    load_interpolation_parameters, load_richter_coefficients, InterpolationParameters,
};
pub use tables::error::TableError;
pub use tables::locations::{load_stations, load_watershed};
pub use tables::observations::load_observations;

pub use source::catalog::{
    CatalogLocation, CatalogStation, Inventory, InventoryRange, StationCatalog,
};
pub use source::error::SourceError;
pub use source::loader::{DataLoader, Frequency};
pub use source::meteostat::{MeteostatSource, SourceData};

pub use output::error::WriteError;
pub use output::{swat, swat_plus, write_output, ClimateVariable, OutputFormat};
