//! Synthetic dataset generation and outlier injection
//!
//! Everything here is driven by an explicit RNG so a seed fully determines
//! the dataset.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::debug;

use crate::core::limits::SpecLimits;
use crate::entities::{Dataset, ObservationRecord};

/// Parameters for the base (pre-outlier) dataset
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorParams {
    /// Number of observations to draw
    pub rows: usize,

    /// Candidate equipment ids
    pub equipment_ids: Vec<String>,

    /// Candidate lot ids
    pub lot_ids: Vec<String>,

    /// Candidate wafer ids
    pub wafer_ids: Vec<String>,

    /// First day of the window
    pub start_date: NaiveDate,

    /// Length of the window in days
    pub days: u32,

    /// Process target (mean before equipment offset)
    pub target: f64,

    /// Standard deviation shared by all equipment
    pub sigma: f64,

    /// Spacing of the default per-equipment mean offsets
    pub offset_step: f64,

    /// Explicit offsets, one per equipment id (overrides `offset_step`)
    pub equipment_offsets: Option<Vec<f64>>,
}

impl GeneratorParams {
    /// Mean offset for the equipment at `index`
    ///
    /// Without explicit offsets the equipment means are spread evenly around
    /// the target, `offset_step` apart.
    pub fn equipment_offset(&self, index: usize) -> f64 {
        if let Some(ref offsets) = self.equipment_offsets {
            return offsets.get(index).copied().unwrap_or(0.0);
        }
        let mid = (self.equipment_ids.len() as f64 - 1.0) / 2.0;
        self.offset_step * (index as f64 - mid)
    }

    fn validate(&self) -> Result<(), GenerateError> {
        if self.rows == 0 {
            return Err(GenerateError::NoRows);
        }
        if self.equipment_ids.is_empty() {
            return Err(GenerateError::EmptyCandidates("equipment"));
        }
        if self.lot_ids.is_empty() {
            return Err(GenerateError::EmptyCandidates("lot"));
        }
        if self.wafer_ids.is_empty() {
            return Err(GenerateError::EmptyCandidates("wafer"));
        }
        if self.days == 0 {
            return Err(GenerateError::NoDays);
        }
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(GenerateError::InvalidSigma(self.sigma));
        }
        if !self.target.is_finite() {
            return Err(GenerateError::InvalidTarget(self.target));
        }
        if let Some(ref offsets) = self.equipment_offsets {
            if offsets.len() != self.equipment_ids.len() {
                return Err(GenerateError::OffsetCount {
                    expected: self.equipment_ids.len(),
                    found: offsets.len(),
                });
            }
        }
        Ok(())
    }
}

/// Outlier injection settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierParams {
    /// Fraction of rows to overwrite, in [0, 1]
    pub fraction: f64,

    /// Lower end of the uniform outlier interval
    pub low: f64,

    /// Upper end of the uniform outlier interval
    pub high: f64,
}

impl OutlierParams {
    /// Number of rows that injection overwrites in a dataset of `rows`
    ///
    /// Only meaningful once `validate` has accepted the fraction.
    fn count_for(&self, rows: usize) -> usize {
        (self.fraction * rows as f64).floor() as usize
    }

    fn validate(&self) -> Result<(), GenerateError> {
        if !self.fraction.is_finite() || !(0.0..=1.0).contains(&self.fraction) {
            return Err(GenerateError::InvalidFraction(self.fraction));
        }
        if !self.low.is_finite() || !self.high.is_finite() || self.low > self.high {
            return Err(GenerateError::InvalidOutlierRange {
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GenerateError {
    #[error("row count must be greater than zero")]
    NoRows,

    #[error("no {0} ids to draw from")]
    EmptyCandidates(&'static str),

    #[error("date range must cover at least one day")]
    NoDays,

    #[error("sigma must be finite and non-negative, got {0}")]
    InvalidSigma(f64),

    #[error("target must be finite, got {0}")]
    InvalidTarget(f64),

    #[error("expected {expected} equipment offsets, found {found}")]
    OffsetCount { expected: usize, found: usize },

    #[error("outlier fraction must be within [0, 1], got {0}")]
    InvalidFraction(f64),

    #[error("outlier interval [{low}, {high}] is invalid")]
    InvalidOutlierRange { low: f64, high: f64 },
}

/// Deterministic RNG for a seed
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Draw from Normal(mean, sigma) using the Box-Muller transform
fn sample_normal<R: Rng>(rng: &mut R, mean: f64, sigma: f64) -> f64 {
    // u1 in (0, 1] keeps ln() finite
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random();
    let z = (-2.0_f64 * u1.ln()).sqrt() * (2.0_f64 * std::f64::consts::PI * u2).cos();
    mean + sigma * z
}

/// Draw `params.rows` independent observations
///
/// Equipment, lot and wafer are drawn uniformly from their candidate lists and
/// the timestamp is midnight of a uniformly drawn day in the window. The
/// measurement is normal around `target + equipment_offset`.
pub fn generate<R: Rng>(
    params: &GeneratorParams,
    limits: SpecLimits,
    rng: &mut R,
) -> Result<Dataset, GenerateError> {
    params.validate()?;

    let start = params
        .start_date
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default();

    let records: Vec<ObservationRecord> = (0..params.rows)
        .map(|_| {
            let eq_idx = rng.random_range(0..params.equipment_ids.len());
            let lot_idx = rng.random_range(0..params.lot_ids.len());
            let wafer_idx = rng.random_range(0..params.wafer_ids.len());
            let day = rng.random_range(0..params.days);

            let mean = params.target + params.equipment_offset(eq_idx);
            let measurement = sample_normal(rng, mean, params.sigma);

            ObservationRecord::new(
                params.equipment_ids[eq_idx].clone(),
                params.lot_ids[lot_idx].clone(),
                params.wafer_ids[wafer_idx].clone(),
                start + chrono::Duration::days(day as i64),
                measurement,
            )
        })
        .collect();

    debug!(rows = records.len(), "generated base dataset");
    Ok(Dataset::new(records, limits))
}

/// Overwrite `floor(fraction * N)` distinct rows with uniform outliers
///
/// Rows are chosen without replacement. The whole dataset is re-classified
/// afterwards. Returns the number of rows overwritten.
pub fn inject_outliers<R: Rng>(
    dataset: &mut Dataset,
    outliers: &OutlierParams,
    rng: &mut R,
) -> Result<usize, GenerateError> {
    outliers.validate()?;

    let n = dataset.len();
    let count = outliers.count_for(n);
    if count == 0 {
        return Ok(0);
    }

    let rows = rand::seq::index::sample(rng, n, count).into_vec();
    let updates: Vec<(usize, f64)> = rows
        .into_iter()
        .map(|row| (row, rng.random_range(outliers.low..=outliers.high)))
        .collect();

    let written = dataset.overwrite_measurements(updates);
    debug!(
        outliers = written,
        failures = dataset.failure_count(),
        "injected outliers"
    );
    Ok(written)
}

/// The full synthetic procedure: generate, inject outliers, classify
pub fn generate_with_outliers(
    params: &GeneratorParams,
    outliers: &OutlierParams,
    limits: SpecLimits,
    seed: u64,
) -> Result<Dataset, GenerateError> {
    outliers.validate()?;
    let mut rng = seeded_rng(seed);
    let mut dataset = generate(params, limits, &mut rng)?;
    inject_outliers(&mut dataset, outliers, &mut rng)?;
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{}{:02}", prefix, i)).collect()
    }

    fn test_params(rows: usize) -> GeneratorParams {
        GeneratorParams {
            rows,
            equipment_ids: ids("EQ-", 5),
            lot_ids: ids("LOT-", 10),
            wafer_ids: ids("W", 25),
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            days: 30,
            target: 10.0,
            sigma: 0.25,
            offset_step: 0.15,
            equipment_offsets: None,
        }
    }

    fn limits() -> SpecLimits {
        SpecLimits::new(9.0, 11.0).unwrap()
    }

    fn outliers(fraction: f64) -> OutlierParams {
        OutlierParams {
            fraction,
            low: 8.0,
            high: 12.0,
        }
    }

    #[test]
    fn test_same_seed_same_dataset() {
        let params = test_params(200);
        let a = generate_with_outliers(&params, &outliers(0.03), limits(), 7).unwrap();
        let b = generate_with_outliers(&params, &outliers(0.03), limits(), 7).unwrap();
        assert_eq!(a, b);

        let c = generate_with_outliers(&params, &outliers(0.03), limits(), 8).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_generated_values_stay_in_domain() {
        let params = test_params(500);
        let mut rng = seeded_rng(42);
        let ds = generate(&params, limits(), &mut rng).unwrap();

        assert_eq!(ds.len(), 500);
        let start = params.start_date.and_hms_opt(0, 0, 0).unwrap();
        let end = start + chrono::Duration::days(30);
        for obs in ds.observations() {
            assert!(params.equipment_ids.contains(&obs.equipment_id));
            assert!(params.lot_ids.contains(&obs.lot_id));
            assert!(params.wafer_ids.contains(&obs.wafer_id));
            assert!(obs.timestamp >= start && obs.timestamp < end);
            assert!(obs.measurement().is_finite());
        }
    }

    #[test]
    fn test_equipment_means_follow_offsets() {
        let mut params = test_params(5000);
        params.sigma = 0.05;
        params.equipment_offsets = Some(vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        let mut rng = seeded_rng(1);
        let ds = generate(&params, limits(), &mut rng).unwrap();

        for (i, eq) in params.equipment_ids.iter().enumerate() {
            let values: Vec<f64> = ds
                .observations()
                .iter()
                .filter(|o| &o.equipment_id == eq)
                .map(|o| o.measurement())
                .collect();
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let expected = 10.0 + params.equipment_offset(i);
            assert!((mean - expected).abs() < 0.02, "{}: {} vs {}", eq, mean, expected);
        }
    }

    #[test]
    fn test_default_offsets_are_centered() {
        let params = test_params(10);
        assert!((params.equipment_offset(0) + 0.30).abs() < 1e-12);
        assert!(params.equipment_offset(2).abs() < 1e-12);
        assert!((params.equipment_offset(4) - 0.30).abs() < 1e-12);
    }

    #[test]
    fn test_outlier_injection_changes_exact_count() {
        let params = test_params(1000);
        let mut rng = seeded_rng(3);
        let base = generate(&params, limits(), &mut rng).unwrap();

        let mut injected = base.clone();
        let written = inject_outliers(&mut injected, &outliers(0.037), &mut rng).unwrap();
        assert_eq!(written, 37);

        let changed = base
            .observations()
            .iter()
            .zip(injected.observations())
            .filter(|(a, b)| a.measurement() != b.measurement())
            .count();
        assert_eq!(changed, 37);

        for (a, b) in base.observations().iter().zip(injected.observations()) {
            if a.measurement() != b.measurement() {
                assert!((8.0..=12.0).contains(&b.measurement()));
            }
            // verdict is always re-derived
            assert_eq!(
                b.pass_fail(),
                crate::core::limits::classify(b.measurement(), limits())
            );
        }
    }

    #[test]
    fn test_zero_fraction_is_noop() {
        let params = test_params(50);
        let mut rng = seeded_rng(3);
        let mut ds = generate(&params, limits(), &mut rng).unwrap();
        let before = ds.clone();
        assert_eq!(inject_outliers(&mut ds, &outliers(0.0), &mut rng).unwrap(), 0);
        assert_eq!(ds, before);
    }

    #[test]
    fn test_fraction_outside_unit_interval_is_rejected() {
        let params = test_params(20);
        let mut rng = seeded_rng(3);
        let mut ds = generate(&params, limits(), &mut rng).unwrap();
        let before = ds.clone();

        for fraction in [-0.1, 1.5, f64::NAN] {
            let err = inject_outliers(&mut ds, &outliers(fraction), &mut rng).unwrap_err();
            assert!(matches!(err, GenerateError::InvalidFraction(_)));
        }
        assert_eq!(ds, before);

        // a full fraction overwrites every row
        assert_eq!(inject_outliers(&mut ds, &outliers(1.0), &mut rng).unwrap(), 20);
    }

    #[test]
    fn test_preconditions() {
        let mut rng = seeded_rng(0);
        assert_eq!(
            generate(&test_params(0), limits(), &mut rng),
            Err(GenerateError::NoRows)
        );

        let mut params = test_params(10);
        params.lot_ids.clear();
        assert_eq!(
            generate(&params, limits(), &mut rng),
            Err(GenerateError::EmptyCandidates("lot"))
        );

        let mut params = test_params(10);
        params.equipment_offsets = Some(vec![0.0]);
        assert_eq!(
            generate(&params, limits(), &mut rng),
            Err(GenerateError::OffsetCount {
                expected: 5,
                found: 1
            })
        );

        let bad = OutlierParams {
            fraction: 0.1,
            low: 12.0,
            high: 8.0,
        };
        assert!(generate_with_outliers(&test_params(10), &bad, limits(), 0).is_err());
        assert!(generate_with_outliers(&test_params(10), &outliers(1.5), limits(), 0).is_err());
    }
}
