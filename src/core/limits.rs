//! Spec limits and the pass/fail classifier

use serde::Serialize;
use thiserror::Error;

/// Closed specification interval [LSL, USL]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpecLimits {
    lsl: f64,
    usl: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum LimitsError {
    #[error("spec limits must be finite (lsl={lsl}, usl={usl})")]
    NotFinite { lsl: f64, usl: f64 },

    #[error("lower spec limit {lsl} must be below upper spec limit {usl}")]
    Inverted { lsl: f64, usl: f64 },
}

impl SpecLimits {
    pub fn new(lsl: f64, usl: f64) -> Result<Self, LimitsError> {
        if !lsl.is_finite() || !usl.is_finite() {
            return Err(LimitsError::NotFinite { lsl, usl });
        }
        if lsl >= usl {
            return Err(LimitsError::Inverted { lsl, usl });
        }
        Ok(Self { lsl, usl })
    }

    /// Limits used by the nine-row demo table
    pub fn demo() -> Self {
        Self {
            lsl: 10.0,
            usl: 11.0,
        }
    }

    /// Lower spec limit
    pub fn lsl(&self) -> f64 {
        self.lsl
    }

    /// Upper spec limit
    pub fn usl(&self) -> f64 {
        self.usl
    }

    /// True when the value lies inside the closed interval
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lsl && value <= self.usl
    }
}

/// Classify a measurement: `true` means the part failed (outside [LSL, USL])
///
/// Values equal to either limit pass. NaN is never inside the interval and
/// therefore fails.
pub fn classify(measurement: f64, limits: SpecLimits) -> bool {
    !limits.contains(measurement)
}
