//! Output of an interpolation run.

use crate::types::date_range::DateRange;
use crate::types::parameter::Parameter;
use crate::types::target::Target;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One interpolated value for a (subbasin, date, parameter) cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterpolationResult {
    pub subbasin_id: u32,
    pub date: NaiveDate,
    pub parameter: Parameter,
    pub value: f64,
}

/// All interpolated values of one subbasin.
///
/// Every parameter holds one slot per day of the run's [`DateRange`], in
/// chronological order; `None` marks a day without any contributing station.
#[derive(Debug, Clone, PartialEq)]
pub struct SubbasinSeries {
    pub target: Target,
    pub values: BTreeMap<Parameter, Vec<Option<f64>>>,
}

impl SubbasinSeries {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            values: BTreeMap::new(),
        }
    }

    pub fn subbasin_id(&self) -> u32 {
        self.target.subbasin_id
    }

    /// The dense daily series of `parameter`, if it was interpolated.
    pub fn series(&self, parameter: Parameter) -> Option<&[Option<f64>]> {
        self.values.get(&parameter).map(Vec::as_slice)
    }

    /// Value of `parameter` on the `day_index`-th day of the run.
    pub fn value(&self, parameter: Parameter, day_index: usize) -> Option<f64> {
        self.series(parameter)
            .and_then(|values| values.get(day_index))
            .copied()
            .flatten()
    }
}

/// Counts of what happened during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of (subbasin, date, parameter) cells processed.
    pub cells: usize,
    /// Cells without any contributing station.
    pub gapped_cells: usize,
    pub gaps_by_parameter: BTreeMap<Parameter, usize>,
    /// Station-days dropped from precipitation because no temperature was
    /// available to correct them.
    pub corrections_skipped: usize,
}

impl RunSummary {
    pub(crate) fn record_cell(&mut self, parameter: Parameter, has_value: bool) {
        self.cells += 1;
        if !has_value {
            self.gapped_cells += 1;
            *self.gaps_by_parameter.entry(parameter).or_insert(0) += 1;
        }
    }

    pub(crate) fn merge(&mut self, other: RunSummary) {
        self.cells += other.cells;
        self.gapped_cells += other.gapped_cells;
        self.corrections_skipped += other.corrections_skipped;
        for (parameter, gaps) in other.gaps_by_parameter {
            *self.gaps_by_parameter.entry(parameter).or_insert(0) += gaps;
        }
    }
}

/// Everything the engine produced, ready to be handed to a writer.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationOutput {
    pub date_range: DateRange,
    /// One entry per target, in the order the targets were supplied.
    pub series: Vec<SubbasinSeries>,
    pub summary: RunSummary,
}

impl InterpolationOutput {
    pub fn series_for(&self, subbasin_id: u32) -> Option<&SubbasinSeries> {
        self.series.iter().find(|s| s.subbasin_id() == subbasin_id)
    }

    /// Rows for every cell that received a value, by subbasin, then parameter,
    /// then date.
    pub fn results(&self) -> impl Iterator<Item = InterpolationResult> + '_ {
        let date_range = self.date_range;
        self.series.iter().flat_map(move |subbasin| {
            subbasin.values.iter().flat_map(move |(&parameter, values)| {
                date_range
                    .days()
                    .zip(values.iter())
                    .filter_map(move |(date, value)| {
                        value.map(|value| InterpolationResult {
                            subbasin_id: subbasin.subbasin_id(),
                            date,
                            parameter,
                            value,
                        })
                    })
            })
        })
    }
}
