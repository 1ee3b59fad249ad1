//! Station observations, normalized into the lookup shape the engine consumes.

use crate::types::parameter::Parameter;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sentinel for a missing value in tabular inputs and SWAT output files.
pub const MISSING_VALUE: f64 = -99.0;

/// A single daily observation as delivered by a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub station_id: String,
    pub date: NaiveDate,
    pub parameter: Parameter,
    /// `None` (or a non-finite number) marks a missing value.
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(
        station_id: impl Into<String>,
        date: NaiveDate,
        parameter: Parameter,
        value: Option<f64>,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            date,
            parameter,
            value,
        }
    }
}

/// All observations of a run, keyed by `(station_id, date, parameter)`.
///
/// Only finite values are stored, so a lookup either yields a usable number or
/// nothing. Inserting a value for a key that already holds one replaces it.
#[derive(Debug, Clone, Default)]
pub struct ObservationSet {
    by_station: HashMap<String, HashMap<(NaiveDate, Parameter), f64>>,
    len: usize,
}

impl ObservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value and returns the value previously held by the key.
    ///
    /// Non-finite values are treated as missing and not stored.
    pub fn insert(
        &mut self,
        station_id: &str,
        date: NaiveDate,
        parameter: Parameter,
        value: f64,
    ) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let previous = match self.by_station.get_mut(station_id) {
            Some(values) => values.insert((date, parameter), value),
            None => {
                let mut values = HashMap::new();
                values.insert((date, parameter), value);
                self.by_station.insert(station_id.to_string(), values);
                None
            }
        };
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    pub fn push(&mut self, observation: Observation) -> Option<f64> {
        match observation.value {
            Some(value) => self.insert(
                &observation.station_id,
                observation.date,
                observation.parameter,
                value,
            ),
            None => None,
        }
    }

    pub fn get(&self, station_id: &str, date: NaiveDate, parameter: Parameter) -> Option<f64> {
        self.by_station
            .get(station_id)
            .and_then(|values| values.get(&(date, parameter)))
            .copied()
    }

    /// Temperature used to classify a station's precipitation on `date`.
    ///
    /// Prefers the daily mean; falls back to the midpoint of the daily maximum
    /// and minimum when both are present.
    pub fn correction_temperature(&self, station_id: &str, date: NaiveDate) -> Option<f64> {
        self.get(station_id, date, Parameter::TempMean).or_else(|| {
            let max = self.get(station_id, date, Parameter::TempMax)?;
            let min = self.get(station_id, date, Parameter::TempMin)?;
            Some((max + min) / 2.0)
        })
    }

    pub fn contains_station(&self, station_id: &str) -> bool {
        self.by_station.contains_key(station_id)
    }

    /// Number of stored (non-missing) values.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Extend<Observation> for ObservationSet {
    fn extend<I: IntoIterator<Item = Observation>>(&mut self, iter: I) {
        for observation in iter {
            self.push(observation);
        }
    }
}

impl FromIterator<Observation> for ObservationSet {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        let mut set = ObservationSet::new();
        set.extend(iter);
        set
    }
}
