//! Observation entity - one equipment measurement and the dataset holding them

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::core::limits::{classify, SpecLimits};

/// A single measurement taken on one wafer by one piece of equipment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    /// Stable row identifier (position in the generated dataset)
    pub row: usize,

    /// Equipment that produced the measurement
    pub equipment_id: String,

    /// Lot the wafer belongs to (informational only)
    pub lot_id: String,

    /// Wafer identifier (informational only)
    pub wafer_id: String,

    /// When the measurement was taken
    pub timestamp: NaiveDateTime,

    measurement: f64,

    /// True when the measurement is outside [LSL, USL]
    pass_fail: bool,
}

impl Observation {
    /// The measured value (microns)
    pub fn measurement(&self) -> f64 {
        self.measurement
    }

    /// True when the measurement falls outside the spec limits
    pub fn pass_fail(&self) -> bool {
        self.pass_fail
    }

    /// Human-readable verdict
    pub fn verdict(&self) -> &'static str {
        if self.pass_fail {
            "FAIL"
        } else {
            "PASS"
        }
    }
}

/// Input record for building a dataset; the row id and verdict are derived
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    pub equipment_id: String,
    pub lot_id: String,
    pub wafer_id: String,
    pub timestamp: NaiveDateTime,
    pub measurement: f64,
}

impl ObservationRecord {
    pub fn new(
        equipment_id: impl Into<String>,
        lot_id: impl Into<String>,
        wafer_id: impl Into<String>,
        timestamp: NaiveDateTime,
        measurement: f64,
    ) -> Self {
        Self {
            equipment_id: equipment_id.into(),
            lot_id: lot_id.into(),
            wafer_id: wafer_id.into(),
            timestamp,
            measurement,
        }
    }
}

/// A full set of observations together with the limits they are judged against
///
/// `pass_fail` is always derived from the measurement and the limits: the only
/// way to change a measurement is [`Dataset::overwrite_measurements`], which
/// re-classifies the whole set afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    observations: Vec<Observation>,
    limits: SpecLimits,
}

impl Dataset {
    /// Build a dataset from raw records, assigning row ids in order
    pub fn new(records: Vec<ObservationRecord>, limits: SpecLimits) -> Self {
        let observations = records
            .into_iter()
            .enumerate()
            .map(|(row, rec)| Observation {
                row,
                pass_fail: classify(rec.measurement, limits),
                equipment_id: rec.equipment_id,
                lot_id: rec.lot_id,
                wafer_id: rec.wafer_id,
                timestamp: rec.timestamp,
                measurement: rec.measurement,
            })
            .collect();

        Self {
            observations,
            limits,
        }
    }

    /// The fixed nine-row sample table (equipment A, B and C)
    pub fn demo() -> Self {
        const EQUIPMENT: [&str; 9] = ["A", "A", "B", "B", "C", "C", "A", "B", "C"];
        const VALUES: [f64; 9] = [10.2, 10.5, 11.3, 10.8, 10.9, 11.1, 10.7, 11.0, 10.8];

        let start = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();

        let records = EQUIPMENT
            .iter()
            .zip(VALUES)
            .enumerate()
            .map(|(i, (eq, value))| {
                ObservationRecord::new(
                    *eq,
                    "LOT-DEMO",
                    "W01",
                    start + chrono::Duration::days(i as i64),
                    value,
                )
            })
            .collect();

        Self::new(records, SpecLimits::demo())
    }

    /// All observations in row order
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// The limits used for classification
    pub fn limits(&self) -> SpecLimits {
        self.limits
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Look up an observation by its row id
    pub fn get(&self, row: usize) -> Option<&Observation> {
        self.observations.get(row)
    }

    /// Distinct equipment ids in order of first appearance
    pub fn equipment_ids(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for obs in &self.observations {
            if !seen.iter().any(|id| id == &obs.equipment_id) {
                seen.push(obs.equipment_id.clone());
            }
        }
        seen
    }

    /// Number of observations currently failing
    pub fn failure_count(&self) -> usize {
        self.observations.iter().filter(|o| o.pass_fail).count()
    }

    /// Overwrite measurements by row id, then re-classify every row
    ///
    /// Rows that do not exist are skipped. Returns the number of rows written.
    pub fn overwrite_measurements<I>(&mut self, updates: I) -> usize
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let mut written = 0;
        for (row, value) in updates {
            if let Some(obs) = self.observations.get_mut(row) {
                obs.measurement = value;
                written += 1;
            }
        }
        self.reclassify();
        written
    }

    fn reclassify(&mut self) {
        let limits = self.limits;
        for obs in &mut self.observations {
            obs.pass_fail = classify(obs.measurement, limits);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_assigns_rows_and_classifies() {
        let limits = SpecLimits::new(9.0, 11.0).unwrap();
        let ds = Dataset::new(
            vec![
                ObservationRecord::new("EQ-01", "LOT-01", "W01", ts(1), 10.0),
                ObservationRecord::new("EQ-02", "LOT-01", "W02", ts(2), 8.5),
            ],
            limits,
        );

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.observations()[0].row, 0);
        assert_eq!(ds.observations()[1].row, 1);
        assert!(!ds.observations()[0].pass_fail());
        assert!(ds.observations()[1].pass_fail());
        assert_eq!(ds.observations()[1].verdict(), "FAIL");
    }

    #[test]
    fn test_overwrite_reclassifies() {
        let limits = SpecLimits::new(9.0, 11.0).unwrap();
        let mut ds = Dataset::new(
            vec![
                ObservationRecord::new("EQ-01", "LOT-01", "W01", ts(1), 10.0),
                ObservationRecord::new("EQ-01", "LOT-01", "W02", ts(2), 10.1),
            ],
            limits,
        );
        assert_eq!(ds.failure_count(), 0);

        let written = ds.overwrite_measurements([(1, 12.5), (7, 0.0)]);
        assert_eq!(written, 1);
        assert_eq!(ds.observations()[1].measurement(), 12.5);
        assert!(ds.observations()[1].pass_fail());
        assert_eq!(ds.failure_count(), 1);
    }

    #[test]
    fn test_demo_dataset() {
        let ds = Dataset::demo();
        assert_eq!(ds.len(), 9);
        assert_eq!(ds.equipment_ids(), vec!["A", "B", "C"]);
        // 11.3 (B) and 11.1 (C) are above the demo USL of 11.0
        assert_eq!(ds.failure_count(), 2);
        assert_eq!(ds.observations()[8].timestamp, ts(9));
    }
}
