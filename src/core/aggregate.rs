//! Aggregation stage - per-equipment reductions over a filtered view
//!
//! Groups are emitted in equipment-id order and only for ids present in the
//! view, so an empty view yields empty tables.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::filter::FilteredView;

/// Mean measurement of one equipment group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub equipment_id: String,
    pub count: usize,
    pub mean: f64,
}

/// Failure rate of one equipment group, as a percentage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupFailureRate {
    pub equipment_id: String,
    pub count: usize,
    pub failures: usize,
    pub rate_percent: f64,
}

/// Everything the stats table shows for one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub equipment_id: String,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub failures: usize,
    pub failure_rate: f64,
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
    failures: usize,
}

impl Accumulator {
    fn push(&mut self, value: f64, failed: bool) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
        if failed {
            self.failures += 1;
        }
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }

    fn failure_rate(&self) -> f64 {
        self.failures as f64 * 100.0 / self.count as f64
    }
}

fn group(view: &FilteredView<'_>) -> BTreeMap<String, Accumulator> {
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    for obs in view.iter() {
        groups
            .entry(obs.equipment_id.clone())
            .or_default()
            .push(obs.measurement(), obs.pass_fail());
    }
    groups
}

/// Arithmetic mean of the measurement per equipment
pub fn mean_by_equipment(view: &FilteredView<'_>) -> Vec<GroupMean> {
    group(view)
        .into_iter()
        .map(|(equipment_id, acc)| GroupMean {
            equipment_id,
            count: acc.count,
            mean: acc.mean(),
        })
        .collect()
}

/// Share of failed observations per equipment, in [0, 100]
pub fn failure_rate_by_equipment(view: &FilteredView<'_>) -> Vec<GroupFailureRate> {
    group(view)
        .into_iter()
        .map(|(equipment_id, acc)| GroupFailureRate {
            equipment_id,
            count: acc.count,
            failures: acc.failures,
            rate_percent: acc.failure_rate(),
        })
        .collect()
}

/// Combined per-equipment summary
pub fn summarize(view: &FilteredView<'_>) -> Vec<GroupSummary> {
    group(view)
        .into_iter()
        .map(|(equipment_id, acc)| GroupSummary {
            equipment_id,
            count: acc.count,
            mean: acc.mean(),
            min: acc.min,
            max: acc.max,
            failures: acc.failures,
            failure_rate: acc.failure_rate(),
        })
        .collect()
}

/// Mean over the whole view, `None` when empty
pub fn overall_mean(view: &FilteredView<'_>) -> Option<f64> {
    if view.is_empty() {
        return None;
    }
    Some(view.iter().map(|o| o.measurement()).sum::<f64>() / view.len() as f64)
}
