//! Drives selection, correction and IDW over all subbasins, parameters and days.

use crate::correction::richter::{self, RichterCoefficients};
use crate::interpolation::config::InterpolationConfig;
use crate::interpolation::error::ConfigurationError;
use crate::interpolation::idw::{self, Sample};
use crate::interpolation::result::{InterpolationOutput, RunSummary, SubbasinSeries};
use crate::interpolation::selection::{SelectedStation, StationSelector};
use crate::types::observation::ObservationSet;
use crate::types::parameter::Parameter;
use crate::types::station::Station;
use crate::types::target::Target;
use chrono::NaiveDate;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::HashSet;

/// Interpolates station observations onto subbasin targets.
///
/// The engine is immutable after construction and can be shared between
/// threads. Subbasins are processed in parallel.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use swat_meteo::{
///     DateRange, InterpolationConfig, InterpolationEngine, ObservationSet, Parameter, Point,
///     Station, Target,
/// };
///
/// let day = NaiveDate::from_ymd_opt(2021, 7, 1).unwrap();
/// let config = InterpolationConfig::builder()
///     .radius_km(20.0)
///     .parameters(vec![Parameter::Precipitation])
///     .date_range(DateRange::new(day, day)?)
///     .build();
///
/// let stations = vec![
///     Station::new("north", Point::new(50.1, 8.0)),
///     Station::new("south", Point::new(49.9, 8.0)),
/// ];
/// let mut observations = ObservationSet::new();
/// observations.insert("north", day, Parameter::Precipitation, 5.0);
/// observations.insert("south", day, Parameter::Precipitation, 15.0);
/// let targets = vec![Target::new(1, Point::new(50.0, 8.0))];
///
/// let output = InterpolationEngine::new(config)?.run(&targets, &stations, &observations, None)?;
/// let value = output.series_for(1).unwrap().value(Parameter::Precipitation, 0).unwrap();
/// assert!((value - 10.0).abs() < 1e-9);
/// # Ok::<(), swat_meteo::ConfigurationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct InterpolationEngine {
    config: InterpolationConfig,
}

impl InterpolationEngine {
    /// Creates an engine after validating `config`.
    pub fn new(config: InterpolationConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &InterpolationConfig {
        &self.config
    }

    /// Runs the interpolation for every target, parameter and day of the
    /// configured date range.
    ///
    /// Precipitation is corrected with `richter` before interpolation when the
    /// configuration enables it and coefficients are supplied.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] before any interpolation happens if there
    /// are no targets or stations, if ids are duplicated, or if the Richter
    /// coefficients are invalid while correction is enabled. Cells without data
    /// are not errors; they are reported in [`RunSummary`].
    pub fn run(
        &self,
        targets: &[Target],
        stations: &[Station],
        observations: &ObservationSet,
        richter: Option<&RichterCoefficients>,
    ) -> Result<InterpolationOutput, ConfigurationError> {
        validate_inputs(targets, stations)?;
        let correction = self.active_correction(richter)?;

        info!(
            "Interpolating {} parameters for {} subbasins over {} days from {} stations",
            self.config.parameters.len(),
            targets.len(),
            self.config.date_range.num_days(),
            stations.len()
        );

        let selector = StationSelector::new(stations, self.config.tie_break);
        let per_target = targets
            .par_iter()
            .map(|target| self.run_target(target, &selector, observations, correction))
            .collect::<Result<Vec<_>, _>>()?;

        let mut summary = RunSummary::default();
        let mut series = Vec::with_capacity(per_target.len());
        for (subbasin, target_summary) in per_target {
            summary.merge(target_summary);
            series.push(subbasin);
        }

        info!(
            "Interpolated {} cells, {} without data, {} precipitation values skipped for missing temperature",
            summary.cells, summary.gapped_cells, summary.corrections_skipped
        );
        for (parameter, gaps) in &summary.gaps_by_parameter {
            debug!("{gaps} gapped cells for {parameter}");
        }

        Ok(InterpolationOutput {
            date_range: self.config.date_range,
            series,
            summary,
        })
    }

    fn active_correction<'r>(
        &self,
        richter: Option<&'r RichterCoefficients>,
    ) -> Result<Option<&'r RichterCoefficients>, ConfigurationError> {
        if !self.config.apply_richter {
            return Ok(None);
        }
        match richter {
            Some(coeffs) => {
                coeffs.validate()?;
                Ok(Some(coeffs))
            }
            None => {
                info!("Richter correction enabled but no coefficients supplied, precipitation is not corrected");
                Ok(None)
            }
        }
    }

    fn run_target(
        &self,
        target: &Target,
        selector: &StationSelector<'_>,
        observations: &ObservationSet,
        correction: Option<&RichterCoefficients>,
    ) -> Result<(SubbasinSeries, RunSummary), ConfigurationError> {
        let mut series = SubbasinSeries::new(target.clone());
        let mut summary = RunSummary::default();

        for &parameter in &self.config.parameters {
            let selected =
                selector.select(target.location, parameter.selection_policy(&self.config));
            debug!(
                "Subbasin {}: {} candidate stations for {}",
                target.subbasin_id,
                selected.len(),
                parameter
            );
            let correction = match parameter {
                Parameter::Precipitation => correction,
                _ => None,
            };

            let mut values = Vec::with_capacity(self.config.date_range.num_days());
            let mut samples = Vec::with_capacity(selected.len());
            for date in self.config.date_range.days() {
                samples.clear();
                collect_samples(
                    &selected,
                    observations,
                    date,
                    parameter,
                    correction,
                    &mut samples,
                    &mut summary,
                );
                let value = idw::interpolate(&samples, self.config.power)?;
                summary.record_cell(parameter, value.is_some());
                values.push(value);
            }
            series.values.insert(parameter, values);
        }

        Ok((series, summary))
    }
}

// Gathers the (value, distance) pairs of the stations that reported on `date`,
// correcting precipitation first when a correction is active.
fn collect_samples(
    selected: &[SelectedStation<'_>],
    observations: &ObservationSet,
    date: NaiveDate,
    parameter: Parameter,
    correction: Option<&RichterCoefficients>,
    samples: &mut Vec<Sample>,
    summary: &mut RunSummary,
) {
    for candidate in selected {
        let station_id = candidate.station.id.as_str();
        let Some(raw) = observations.get(station_id, date, parameter) else {
            continue;
        };
        let value = match correction {
            None => raw,
            Some(coeffs) => match observations.correction_temperature(station_id, date) {
                Some(temp_c) => richter::correct(raw, temp_c, date, coeffs),
                None => {
                    warn!(
                        "No temperature for station {station_id} on {date}, dropping its precipitation from the correction"
                    );
                    summary.corrections_skipped += 1;
                    continue;
                }
            },
        };
        samples.push(Sample::new(value, candidate.distance_km));
    }
}

fn validate_inputs(targets: &[Target], stations: &[Station]) -> Result<(), ConfigurationError> {
    if targets.is_empty() {
        return Err(ConfigurationError::EmptyTargets);
    }
    if stations.is_empty() {
        return Err(ConfigurationError::EmptyStations);
    }
    let mut station_ids = HashSet::with_capacity(stations.len());
    for station in stations {
        if !station_ids.insert(station.id.as_str()) {
            return Err(ConfigurationError::DuplicateStation(station.id.clone()));
        }
    }
    let mut subbasins = HashSet::with_capacity(targets.len());
    for target in targets {
        if !subbasins.insert(target.subbasin_id) {
            return Err(ConfigurationError::DuplicateSubbasin(target.subbasin_id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::richter::CorrectionPair;
    use crate::geo::distance::distance_km;
    use crate::interpolation::result::InterpolationResult;
    use crate::types::date_range::DateRange;
    use crate::types::point::Point;

    const EPS: f64 = 1e-9;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 7, d).unwrap()
    }

    fn config(radius_km: f64, parameters: Vec<Parameter>, last_day: u32) -> InterpolationConfig {
        InterpolationConfig::builder()
            .radius_km(radius_km)
            .power(2.0)
            .parameters(parameters)
            .date_range(DateRange::new(day(1), day(last_day)).unwrap())
            .build()
    }

    fn richter() -> RichterCoefficients {
        RichterCoefficients::builder()
            .t_snow(0.0)
            .t_mix(3.0)
            .snow(CorrectionPair::new(0.72, 0.82))
            .mix(CorrectionPair::new(0.535, 0.55))
            .summer(CorrectionPair::new(0.345, 0.38))
            .winter(CorrectionPair::new(0.34, 0.46))
            .summer_start_month(5)
            .winter_start_month(11)
            .max_change(2.0)
            .build()
    }

    fn target() -> Target {
        Target::new(1, Point::new(50.0, 8.0))
    }

    fn two_station_setup() -> (Vec<Station>, ObservationSet) {
        let stations = vec![
            Station::new("north", Point::new(50.1, 8.0)),
            Station::new("south", Point::new(49.9, 8.0)),
        ];
        let mut observations = ObservationSet::new();
        observations.insert("north", day(1), Parameter::Precipitation, 5.0);
        observations.insert("south", day(1), Parameter::Precipitation, 15.0);
        (stations, observations)
    }

    #[test]
    fn test_equidistant_stations_average() {
        let (stations, observations) = two_station_setup();
        let engine = InterpolationEngine::new(config(20.0, vec![Parameter::Precipitation], 1))
            .unwrap();

        let output = engine
            .run(&[target()], &stations, &observations, None)
            .unwrap();

        let rows: Vec<InterpolationResult> = output.results().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].subbasin_id, 1);
        assert_eq!(rows[0].date, day(1));
        assert_eq!(rows[0].parameter, Parameter::Precipitation);
        assert!((rows[0].value - 10.0).abs() < EPS);
        assert_eq!(output.summary.cells, 1);
        assert_eq!(output.summary.gapped_cells, 0);
    }

    #[test]
    fn test_no_station_in_radius_is_a_gap() {
        // About 50 km north of the target.
        let stations = vec![Station::new("far", Point::new(50.45, 8.0))];
        let mut observations = ObservationSet::new();
        observations.insert("far", day(1), Parameter::Precipitation, 3.0);
        let engine =
            InterpolationEngine::new(config(5.0, vec![Parameter::Precipitation], 1)).unwrap();

        let output = engine
            .run(&[target()], &stations, &observations, None)
            .unwrap();

        assert_eq!(output.results().count(), 0);
        assert_eq!(output.summary.gapped_cells, 1);
        assert_eq!(
            output.summary.gaps_by_parameter.get(&Parameter::Precipitation),
            Some(&1)
        );
        let series = output.series_for(1).unwrap();
        assert_eq!(series.series(Parameter::Precipitation), Some(&[None][..]));
    }

    #[test]
    fn test_every_day_has_a_slot_and_rows_are_chronological() {
        let stations = vec![Station::new("s", Point::new(50.05, 8.0))];
        let mut observations = ObservationSet::new();
        for d in [1, 2, 4, 5] {
            observations.insert("s", day(d), Parameter::TempMax, 20.0 + d as f64);
        }
        let engine = InterpolationEngine::new(config(20.0, vec![Parameter::TempMax], 5)).unwrap();

        let output = engine
            .run(&[target()], &stations, &observations, None)
            .unwrap();

        let series = output.series_for(1).unwrap().series(Parameter::TempMax).unwrap();
        assert_eq!(
            series,
            &[Some(21.0), Some(22.0), None, Some(24.0), Some(25.0)][..]
        );
        let dates: Vec<NaiveDate> = output.results().map(|row| row.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(4), day(5)]);
        assert_eq!(output.summary.cells, 5);
        assert_eq!(output.summary.gapped_cells, 1);
    }

    #[test]
    fn test_stations_without_observation_do_not_contribute() {
        let (stations, mut observations) = two_station_setup();
        observations.insert("north", day(2), Parameter::Precipitation, 8.0);
        let engine = InterpolationEngine::new(config(20.0, vec![Parameter::Precipitation], 2))
            .unwrap();

        let output = engine
            .run(&[target()], &stations, &observations, None)
            .unwrap();

        let series = output.series_for(1).unwrap();
        assert_eq!(series.value(Parameter::Precipitation, 1), Some(8.0));
    }

    #[test]
    fn test_solar_uses_nearest_stations_regardless_of_radius() {
        let stations = vec![
            Station::new("s1", Point::new(50.3, 8.0)),
            Station::new("s2", Point::new(50.6, 8.0)),
            Station::new("s3", Point::new(49.0, 8.0)),
            Station::new("s4", Point::new(52.0, 8.0)),
        ];
        let mut observations = ObservationSet::new();
        for (id, value) in [("s1", 10.0), ("s2", 12.0), ("s3", 14.0), ("s4", 100.0)] {
            observations.insert(id, day(1), Parameter::Solar, value);
        }
        let engine = InterpolationEngine::new(config(1.0, vec![Parameter::Solar], 1)).unwrap();

        let output = engine
            .run(&[target()], &stations, &observations, None)
            .unwrap();

        let expected = idw::interpolate(
            &stations[..3]
                .iter()
                .zip([10.0, 12.0, 14.0])
                .map(|(s, v)| Sample::new(v, distance_km(target().location, s.location)))
                .collect::<Vec<_>>(),
            2.0,
        )
        .unwrap()
        .unwrap();
        let value = output.series_for(1).unwrap().value(Parameter::Solar, 0).unwrap();
        assert!((value - expected).abs() < EPS);
    }

    #[test]
    fn test_correction_is_applied_exactly_once() {
        let stations = vec![Station::new("on_target", Point::new(50.0, 8.0))];
        let mut observations = ObservationSet::new();
        observations.insert("on_target", day(1), Parameter::Precipitation, 10.0);
        observations.insert("on_target", day(1), Parameter::TempMean, 15.0);
        let mut cfg = config(20.0, vec![Parameter::Precipitation], 1);
        cfg.apply_richter = true;
        let coeffs = richter();

        let output = InterpolationEngine::new(cfg)
            .unwrap()
            .run(&[target()], &stations, &observations, Some(&coeffs))
            .unwrap();

        let once = richter::correct(10.0, 15.0, day(1), &coeffs);
        let twice = richter::correct(once, 15.0, day(1), &coeffs);
        let value = output
            .series_for(1)
            .unwrap()
            .value(Parameter::Precipitation, 0)
            .unwrap();
        assert!((value - once).abs() < EPS);
        assert!((value - twice).abs() > 1e-6);
        assert!(value > 10.0);
    }

    #[test]
    fn test_correction_happens_before_interpolation() {
        // One station in the snow class and one in the rain class, at equal
        // distance: the result is the mean of the individually corrected values.
        let (stations, mut observations) = two_station_setup();
        observations.insert("north", day(1), Parameter::TempMean, -2.0);
        observations.insert("south", day(1), Parameter::TempMean, 18.0);
        let mut cfg = config(20.0, vec![Parameter::Precipitation], 1);
        cfg.apply_richter = true;
        let coeffs = richter();

        let output = InterpolationEngine::new(cfg)
            .unwrap()
            .run(&[target()], &stations, &observations, Some(&coeffs))
            .unwrap();

        let expected = (richter::correct(5.0, -2.0, day(1), &coeffs)
            + richter::correct(15.0, 18.0, day(1), &coeffs))
            / 2.0;
        let value = output
            .series_for(1)
            .unwrap()
            .value(Parameter::Precipitation, 0)
            .unwrap();
        assert!((value - expected).abs() < EPS);
    }

    #[test]
    fn test_station_without_temperature_is_dropped_from_correction() {
        let (stations, mut observations) = two_station_setup();
        observations.insert("south", day(1), Parameter::TempMax, 20.0);
        observations.insert("south", day(1), Parameter::TempMin, 10.0);
        let mut cfg = config(20.0, vec![Parameter::Precipitation], 1);
        cfg.apply_richter = true;
        let coeffs = richter();

        let output = InterpolationEngine::new(cfg)
            .unwrap()
            .run(&[target()], &stations, &observations, Some(&coeffs))
            .unwrap();

        let value = output
            .series_for(1)
            .unwrap()
            .value(Parameter::Precipitation, 0)
            .unwrap();
        assert!((value - richter::correct(15.0, 15.0, day(1), &coeffs)).abs() < EPS);
        assert_eq!(output.summary.corrections_skipped, 1);
        assert_eq!(output.summary.gapped_cells, 0);
    }

    #[test]
    fn test_correction_disabled_without_flag_or_coefficients() {
        let (stations, mut observations) = two_station_setup();
        observations.insert("north", day(1), Parameter::TempMean, 18.0);
        observations.insert("south", day(1), Parameter::TempMean, 18.0);
        let coeffs = richter();

        let without_flag =
            InterpolationEngine::new(config(20.0, vec![Parameter::Precipitation], 1)).unwrap();
        let output = without_flag
            .run(&[target()], &stations, &observations, Some(&coeffs))
            .unwrap();
        let value = output.series_for(1).unwrap().value(Parameter::Precipitation, 0);
        assert!((value.unwrap() - 10.0).abs() < EPS);

        let mut cfg = config(20.0, vec![Parameter::Precipitation], 1);
        cfg.apply_richter = true;
        let without_coefficients = InterpolationEngine::new(cfg).unwrap();
        let output = without_coefficients
            .run(&[target()], &stations, &observations, None)
            .unwrap();
        let value = output.series_for(1).unwrap().value(Parameter::Precipitation, 0);
        assert!((value.unwrap() - 10.0).abs() < EPS);
    }

    #[test]
    fn test_correction_only_touches_precipitation() {
        let stations = vec![Station::new("s", Point::new(50.0, 8.0))];
        let mut observations = ObservationSet::new();
        observations.insert("s", day(1), Parameter::Wind, 3.5);
        observations.insert("s", day(1), Parameter::TempMean, 15.0);
        let mut cfg = config(20.0, vec![Parameter::Wind], 1);
        cfg.apply_richter = true;

        let output = InterpolationEngine::new(cfg)
            .unwrap()
            .run(&[target()], &stations, &observations, Some(&richter()))
            .unwrap();

        assert_eq!(
            output.series_for(1).unwrap().value(Parameter::Wind, 0),
            Some(3.5)
        );
    }

    #[test]
    fn test_invalid_coefficients_fail_before_interpolation() {
        let (stations, observations) = two_station_setup();
        let mut cfg = config(20.0, vec![Parameter::Precipitation], 1);
        cfg.apply_richter = true;
        let mut coeffs = richter();
        coeffs.summer_start_month = 0;

        let err = InterpolationEngine::new(cfg)
            .unwrap()
            .run(&[target()], &stations, &observations, Some(&coeffs))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidRichterCoefficient { .. }
        ));
    }

    #[test]
    fn test_input_validation() {
        let (stations, observations) = two_station_setup();
        let engine =
            InterpolationEngine::new(config(20.0, vec![Parameter::Precipitation], 1)).unwrap();

        assert_eq!(
            engine.run(&[], &stations, &observations, None).unwrap_err(),
            ConfigurationError::EmptyTargets
        );
        assert_eq!(
            engine.run(&[target()], &[], &observations, None).unwrap_err(),
            ConfigurationError::EmptyStations
        );

        let duplicated = vec![stations[0].clone(), stations[0].clone()];
        assert_eq!(
            engine
                .run(&[target()], &duplicated, &observations, None)
                .unwrap_err(),
            ConfigurationError::DuplicateStation("north".into())
        );

        assert_eq!(
            engine
                .run(&[target(), target()], &stations, &observations, None)
                .unwrap_err(),
            ConfigurationError::DuplicateSubbasin(1)
        );
    }

    #[test]
    fn test_invalid_power_is_a_configuration_error() {
        let mut cfg = config(20.0, vec![Parameter::Precipitation], 1);
        cfg.power = -1.0;
        assert_eq!(
            InterpolationEngine::new(cfg).unwrap_err(),
            ConfigurationError::InvalidPower(-1.0)
        );
    }

    #[test]
    fn test_duplicate_parameter_is_a_configuration_error() {
        let cfg = config(
            20.0,
            vec![Parameter::Precipitation, Parameter::Precipitation],
            1,
        );
        assert_eq!(
            InterpolationEngine::new(cfg).unwrap_err(),
            ConfigurationError::DuplicateParameter(Parameter::Precipitation)
        );
    }

    #[test]
    fn test_output_keeps_target_order() {
        let (stations, observations) = two_station_setup();
        let targets: Vec<Target> = [7, 3, 11, 1]
            .into_iter()
            .map(|id| Target::new(id, Point::new(50.0, 8.0)))
            .collect();
        let engine =
            InterpolationEngine::new(config(20.0, vec![Parameter::Precipitation], 1)).unwrap();

        let output = engine.run(&targets, &stations, &observations, None).unwrap();

        let ids: Vec<u32> = output.series.iter().map(|s| s.subbasin_id()).collect();
        assert_eq!(ids, vec![7, 3, 11, 1]);
        assert_eq!(output.summary.cells, 4);
    }
}
