//! Station selection around a target point.
//!
//! Which stations may contribute to a cell depends on the parameter: most
//! parameters use every station inside a search radius, solar radiation uses a
//! fixed number of nearest stations. [`Parameter::selection_policy`] is the only
//! place that decision is made.

use crate::geo::distance::distance_km;
use crate::interpolation::config::{InterpolationConfig, TieBreak};
use crate::types::parameter::Parameter;
use crate::types::point::Point;
use crate::types::station::Station;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// How candidate stations are chosen for a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionPolicy {
    /// Every station with `distance <= radius_km`.
    Radius { radius_km: f64 },
    /// The `count` closest stations, regardless of distance.
    Nearest { count: usize },
}

impl Parameter {
    /// The selection policy used when interpolating this parameter.
    pub fn selection_policy(&self, config: &InterpolationConfig) -> SelectionPolicy {
        match self {
            Parameter::Solar => SelectionPolicy::Nearest {
                count: config.solar_station_count,
            },
            Parameter::Precipitation
            | Parameter::TempMax
            | Parameter::TempMin
            | Parameter::Humidity
            | Parameter::Wind
            | Parameter::TempMean => SelectionPolicy::Radius {
                radius_km: config.radius_km,
            },
        }
    }
}

/// A station chosen for a target, with its great-circle distance to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedStation<'a> {
    pub station: &'a Station,
    pub distance_km: f64,
}

// Heap entry for nearest-N selection; orders by distance, then tie-break rank.
struct StationCandidate<'a> {
    distance_km: OrderedFloat<f64>,
    rank: usize,
    station: &'a Station,
}

impl PartialEq for StationCandidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for StationCandidate<'_> {}
impl PartialOrd for StationCandidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for StationCandidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_km
            .cmp(&other.distance_km)
            .then(self.rank.cmp(&other.rank))
    }
}

impl<'a> From<StationCandidate<'a>> for SelectedStation<'a> {
    fn from(candidate: StationCandidate<'a>) -> Self {
        SelectedStation {
            station: candidate.station,
            distance_km: candidate.distance_km.into_inner(),
        }
    }
}

/// Selects stations around targets according to a [`SelectionPolicy`].
///
/// The selector is built once per run. Stations at identical distance come out
/// in the order defined by the [`TieBreak`] it was created with.
#[derive(Debug, Clone)]
pub struct StationSelector<'a> {
    stations: Vec<&'a Station>,
}

impl<'a> StationSelector<'a> {
    pub fn new(stations: &'a [Station], tie_break: TieBreak) -> Self {
        let mut ordered: Vec<&Station> = stations.iter().collect();
        if tie_break == TieBreak::StationId {
            ordered.sort_by(|a, b| a.id.cmp(&b.id));
        }
        Self { stations: ordered }
    }

    /// Returns the stations eligible for `target` under `policy`, closest first.
    pub fn select(&self, target: Point, policy: SelectionPolicy) -> Vec<SelectedStation<'a>> {
        match policy {
            SelectionPolicy::Radius { radius_km } => self.within_radius(target, radius_km),
            SelectionPolicy::Nearest { count } => self.nearest(target, count),
        }
    }

    fn candidates(&self, target: Point) -> impl Iterator<Item = StationCandidate<'a>> + '_ {
        self.stations
            .iter()
            .enumerate()
            .filter_map(move |(rank, &station)| {
                let distance = distance_km(target, station.location);
                distance.is_finite().then(|| StationCandidate {
                    distance_km: OrderedFloat(distance),
                    rank,
                    station,
                })
            })
    }

    fn within_radius(&self, target: Point, radius_km: f64) -> Vec<SelectedStation<'a>> {
        let mut selected: Vec<StationCandidate<'a>> = self
            .candidates(target)
            .filter(|candidate| candidate.distance_km.into_inner() <= radius_km)
            .collect();
        selected.sort();
        selected.into_iter().map(SelectedStation::from).collect()
    }

    fn nearest(&self, target: Point, count: usize) -> Vec<SelectedStation<'a>> {
        if count == 0 {
            return vec![];
        }

        let mut heap: BinaryHeap<StationCandidate<'a>> = BinaryHeap::with_capacity(count + 1);
        for candidate in self.candidates(target) {
            if heap.len() < count {
                heap.push(candidate);
            } else if heap.peek().is_some_and(|worst| candidate < *worst) {
                heap.pop();
                heap.push(candidate);
            }
        }

        heap.into_sorted_vec()
            .into_iter()
            .map(SelectedStation::from)
            .collect()
    }
}
