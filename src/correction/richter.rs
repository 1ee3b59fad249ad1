//! Richter (1995) correction of systematic precipitation gauge undercatch.
//!
//! The measured daily amount `P` is raised by `b * P^epsilon`, where the
//! coefficient pair depends on the precipitation phase (derived from the daily
//! temperature) and, for rain, on the season. The added amount is capped so the
//! corrected value never exceeds `P * max_change`.

use crate::interpolation::error::ConfigurationError;
use bon::Builder;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The `(b, epsilon)` pair of the Richter model for one precipitation class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionPair {
    pub b: f64,
    pub epsilon: f64,
}

impl CorrectionPair {
    pub fn new(b: f64, epsilon: f64) -> Self {
        Self { b, epsilon }
    }
}

/// Precipitation class that decides which coefficient pair applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CorrectionClass {
    Snow,
    Mix,
    SummerRain,
    WinterRain,
}

/// Coefficients of the Richter model, constant for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct RichterCoefficients {
    /// Upper temperature bound (inclusive) for snow, in °C.
    pub t_snow: f64,
    /// Upper temperature bound (inclusive) for mixed precipitation, in °C.
    pub t_mix: f64,
    pub snow: CorrectionPair,
    pub mix: CorrectionPair,
    pub summer: CorrectionPair,
    pub winter: CorrectionPair,
    /// First month (1-12) of the summer rain season.
    pub summer_start_month: u32,
    /// First month (1-12) of the winter rain season.
    pub winter_start_month: u32,
    /// Cap on `corrected / raw`.
    pub max_change: f64,
}

impl RichterCoefficients {
    /// Checks that every coefficient is usable.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let finite = [
            ("T_Snow", self.t_snow),
            ("T_Mix", self.t_mix),
            ("b_Snow", self.snow.b),
            ("epsilon_Snow", self.snow.epsilon),
            ("b_Mix", self.mix.b),
            ("epsilon_Mix", self.mix.epsilon),
            ("b_Summer", self.summer.b),
            ("epsilon_Summer", self.summer.epsilon),
            ("b_Winter", self.winter.b),
            ("epsilon_Winter", self.winter.epsilon),
            ("maximum_changes", self.max_change),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(invalid(field, format!("must be finite, got {value}")));
            }
        }
        if self.t_snow > self.t_mix {
            return Err(invalid(
                "T_Snow",
                format!("{} is above T_Mix {}", self.t_snow, self.t_mix),
            ));
        }
        for (field, month) in [
            ("Summer_month_Start", self.summer_start_month),
            ("Winter_month_Start", self.winter_start_month),
        ] {
            if !(1..=12).contains(&month) {
                return Err(invalid(field, format!("month must be 1-12, got {month}")));
            }
        }
        if self.summer_start_month == self.winter_start_month {
            return Err(invalid(
                "Winter_month_Start",
                "summer and winter seasons cannot start in the same month".to_string(),
            ));
        }
        if self.max_change < 1.0 {
            return Err(invalid(
                "maximum_changes",
                format!("ratio cap must be at least 1, got {}", self.max_change),
            ));
        }
        Ok(())
    }

    /// Whether rain in `month` uses the summer coefficients.
    ///
    /// Summer runs from `summer_start_month` up to, but excluding,
    /// `winter_start_month`, wrapping over the turn of the year when summer
    /// starts later in the calendar than winter.
    pub fn is_summer_month(&self, month: u32) -> bool {
        let (summer, winter) = (self.summer_start_month, self.winter_start_month);
        if summer < winter {
            summer <= month && month < winter
        } else {
            month >= summer || month < winter
        }
    }

    /// Classifies precipitation by temperature and, for rain, by month.
    pub fn classify(&self, temp_c: f64, month: u32) -> CorrectionClass {
        if temp_c <= self.t_snow {
            CorrectionClass::Snow
        } else if temp_c <= self.t_mix {
            CorrectionClass::Mix
        } else if self.is_summer_month(month) {
            CorrectionClass::SummerRain
        } else {
            CorrectionClass::WinterRain
        }
    }

    pub fn pair(&self, class: CorrectionClass) -> CorrectionPair {
        match class {
            CorrectionClass::Snow => self.snow,
            CorrectionClass::Mix => self.mix,
            CorrectionClass::SummerRain => self.summer,
            CorrectionClass::WinterRain => self.winter,
        }
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigurationError {
    ConfigurationError::InvalidRichterCoefficient { field, reason }
}

/// Corrects one daily precipitation amount.
///
/// Returns a value in `[raw_mm, raw_mm * max_change]` for positive amounts and
/// `0` for zero or negative ones.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use swat_meteo::{correct_precipitation, CorrectionPair, RichterCoefficients};
///
/// let coeffs = RichterCoefficients::builder()
///     .t_snow(0.0)
///     .t_mix(3.0)
///     .snow(CorrectionPair::new(0.72, 0.82))
///     .mix(CorrectionPair::new(0.535, 0.55))
///     .summer(CorrectionPair::new(0.345, 0.38))
///     .winter(CorrectionPair::new(0.34, 0.46))
///     .summer_start_month(5)
///     .winter_start_month(11)
///     .max_change(1.5)
///     .build();
///
/// let july = NaiveDate::from_ymd_opt(2020, 7, 1).unwrap();
/// let corrected = correct_precipitation(4.0, 18.0, july, &coeffs);
/// assert!((corrected - (4.0 + 0.345 * 4.0f64.powf(0.38))).abs() < 1e-12);
/// assert_eq!(correct_precipitation(0.0, 18.0, july, &coeffs), 0.0);
/// ```
pub fn correct(raw_mm: f64, temp_c: f64, date: NaiveDate, coeffs: &RichterCoefficients) -> f64 {
    if raw_mm <= 0.0 || raw_mm.is_nan() {
        return 0.0;
    }
    let pair = coeffs.pair(coeffs.classify(temp_c, date.month()));
    let change = pair.b * raw_mm.powf(pair.epsilon);
    let cap = raw_mm * (coeffs.max_change - 1.0).max(0.0);
    let change = if change.is_nan() {
        0.0
    } else {
        change.clamp(0.0, cap)
    };
    (raw_mm + change).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coeffs(max_change: f64) -> RichterCoefficients {
        RichterCoefficients::builder()
            .t_snow(0.0)
            .t_mix(3.0)
            .snow(CorrectionPair::new(0.72, 0.82))
            .mix(CorrectionPair::new(0.535, 0.55))
            .summer(CorrectionPair::new(0.345, 0.38))
            .winter(CorrectionPair::new(0.34, 0.46))
            .summer_start_month(5)
            .winter_start_month(11)
            .max_change(max_change)
            .build()
    }

    fn day(month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, month, 15).unwrap()
    }

    #[test]
    fn test_zero_precipitation_stays_zero() {
        let c = coeffs(2.0);
        for temp in [-10.0, 0.0, 2.0, 25.0] {
            assert_eq!(correct(0.0, temp, day(1), &c), 0.0);
            assert_eq!(correct(0.0, temp, day(7), &c), 0.0);
        }
    }

    #[test]
    fn test_negative_precipitation_is_floored() {
        assert_eq!(correct(-3.0, 10.0, day(7), &coeffs(2.0)), 0.0);
    }

    #[test]
    fn test_corrected_within_bounds() {
        for max_change in [1.0, 1.1, 1.5, 3.0] {
            let c = coeffs(max_change);
            for raw in [0.1, 0.5, 1.0, 4.2, 10.0, 55.0] {
                for temp in [-8.0, 0.0, 1.5, 3.0, 12.0] {
                    for month in 1..=12 {
                        let corrected = correct(raw, temp, day(month), &c);
                        assert!(corrected >= raw, "{corrected} < {raw}");
                        assert!(
                            corrected <= raw * max_change + 1e-12,
                            "{corrected} > {raw} * {max_change}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_cap_limits_snow_correction() {
        // Uncapped: 10 + 0.72 * 10^0.82 = 14.757..
        let corrected = correct(10.0, -5.0, day(1), &coeffs(1.3));
        assert!((corrected - 13.0).abs() < 1e-12);

        let uncapped = correct(10.0, -5.0, day(1), &coeffs(3.0));
        assert!((uncapped - (10.0 + 0.72 * 10f64.powf(0.82))).abs() < 1e-12);
    }

    #[test]
    fn test_phase_boundaries_are_inclusive() {
        let c = coeffs(2.0);
        assert_eq!(c.classify(0.0, 7), CorrectionClass::Snow);
        assert_eq!(c.classify(0.01, 7), CorrectionClass::Mix);
        assert_eq!(c.classify(3.0, 7), CorrectionClass::Mix);
        assert_eq!(c.classify(3.01, 7), CorrectionClass::SummerRain);
        assert_eq!(c.classify(3.01, 1), CorrectionClass::WinterRain);
    }

    #[test]
    fn test_each_class_uses_its_pair() {
        let c = coeffs(10.0);
        let raw: f64 = 6.0;
        let expect = |pair: CorrectionPair| raw + pair.b * raw.powf(pair.epsilon);
        assert!((correct(raw, -1.0, day(7), &c) - expect(c.snow)).abs() < 1e-12);
        assert!((correct(raw, 2.0, day(7), &c) - expect(c.mix)).abs() < 1e-12);
        assert!((correct(raw, 15.0, day(7), &c) - expect(c.summer)).abs() < 1e-12);
        assert!((correct(raw, 15.0, day(12), &c) - expect(c.winter)).abs() < 1e-12);
    }

    #[test]
    fn test_season_without_wraparound() {
        let c = coeffs(2.0);
        let summer: Vec<u32> = (1..=12).filter(|m| c.is_summer_month(*m)).collect();
        assert_eq!(summer, vec![5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_season_wraps_over_year_end() {
        let mut c = coeffs(2.0);
        c.summer_start_month = 11;
        c.winter_start_month = 3;
        let summer: Vec<u32> = (1..=12).filter(|m| c.is_summer_month(*m)).collect();
        assert_eq!(summer, vec![1, 2, 11, 12]);
    }

    #[test]
    fn test_validation() {
        assert!(coeffs(1.5).validate().is_ok());

        let mut c = coeffs(0.9);
        assert!(matches!(
            c.validate(),
            Err(ConfigurationError::InvalidRichterCoefficient {
                field: "maximum_changes",
                ..
            })
        ));

        c = coeffs(1.5);
        c.winter_start_month = 13;
        assert!(c.validate().is_err());

        c = coeffs(1.5);
        c.winter_start_month = c.summer_start_month;
        assert!(c.validate().is_err());

        c = coeffs(1.5);
        c.mix.b = f64::NAN;
        assert!(matches!(
            c.validate(),
            Err(ConfigurationError::InvalidRichterCoefficient { field: "b_Mix", .. })
        ));

        c = coeffs(1.5);
        c.t_snow = 4.0;
        assert!(c.validate().is_err());
    }
}
