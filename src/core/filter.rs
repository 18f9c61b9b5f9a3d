//! Filter stage - equipment subset and point selection
//!
//! A selection payload from a chart is a list of point positions in the
//! equipment-filtered view. Positions are only meaningful for the exact view
//! they were taken from, so they are validated once at the boundary and turned
//! into a [`Selection`] keyed by stable row ids and tagged with the view's
//! fingerprint.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::warn;

use crate::entities::{Dataset, Observation};

/// Which equipment ids are visible
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EquipmentFilter {
    /// Every equipment id in the dataset
    #[default]
    All,
    /// Only the listed ids (an empty set shows nothing)
    Only(BTreeSet<String>),
}

impl EquipmentFilter {
    pub fn only<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EquipmentFilter::Only(ids.into_iter().map(Into::into).collect())
    }

    /// Filter that matches nothing
    pub fn none() -> Self {
        EquipmentFilter::Only(BTreeSet::new())
    }

    pub fn matches(&self, equipment_id: &str) -> bool {
        match self {
            EquipmentFilter::All => true,
            EquipmentFilter::Only(ids) => ids.contains(equipment_id),
        }
    }

    /// Equipment ids of the dataset that pass this filter, in dataset order
    pub fn chosen(&self, dataset: &Dataset) -> Vec<String> {
        dataset
            .equipment_ids()
            .into_iter()
            .filter(|id| self.matches(id))
            .collect()
    }
}

/// Hex SHA-256 over the row ids of a view
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewFingerprint(String);

impl ViewFingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ViewFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0[..12.min(self.0.len())])
    }
}

/// An ordered subsequence of a dataset's observations
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView<'a> {
    rows: Vec<&'a Observation>,
}

impl<'a> FilteredView<'a> {
    /// The whole dataset
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            rows: dataset.observations().iter().collect(),
        }
    }

    pub fn rows(&self) -> &[&'a Observation] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Observation> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Observation at a position of this view
    pub fn get(&self, position: usize) -> Option<&'a Observation> {
        self.rows.get(position).copied()
    }

    /// Sorted distinct equipment ids present in the view
    pub fn equipment_ids(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|o| o.equipment_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Identity of this view's row sequence
    pub fn fingerprint(&self) -> ViewFingerprint {
        let mut hasher = Sha256::new();
        hasher.update((self.rows.len() as u64).to_le_bytes());
        for obs in &self.rows {
            hasher.update((obs.row as u64).to_le_bytes());
        }
        ViewFingerprint(format!("{:x}", hasher.finalize()))
    }
}

/// Rows whose equipment id passes the filter, in dataset order
pub fn filter_equipment<'a>(dataset: &'a Dataset, filter: &EquipmentFilter) -> FilteredView<'a> {
    FilteredView {
        rows: dataset
            .observations()
            .iter()
            .filter(|o| filter.matches(&o.equipment_id))
            .collect(),
    }
}

/// Full filter stage: equipment subset, then the optional selection
pub fn filter<'a>(
    dataset: &'a Dataset,
    equipment: &EquipmentFilter,
    selection: Option<&Selection>,
) -> FilteredView<'a> {
    let view = filter_equipment(dataset, equipment);
    match selection {
        Some(sel) => sel.apply(&view),
        None => view,
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("selection is empty")]
    Empty,

    #[error("point {position} is outside the view ({len} points)")]
    OutOfRange { position: usize, len: usize },
}

/// A validated set of selected points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    rows: BTreeSet<usize>,
    fingerprint: ViewFingerprint,
}

impl Selection {
    /// Validate a raw point-position payload against the view it came from
    pub fn from_positions(
        positions: &[usize],
        view: &FilteredView<'_>,
    ) -> Result<Self, SelectionError> {
        if positions.is_empty() {
            return Err(SelectionError::Empty);
        }

        let mut rows = BTreeSet::new();
        for &position in positions {
            let obs = view.get(position).ok_or(SelectionError::OutOfRange {
                position,
                len: view.len(),
            })?;
            rows.insert(obs.row);
        }

        Ok(Self {
            rows,
            fingerprint: view.fingerprint(),
        })
    }

    /// Selected row ids
    pub fn rows(&self) -> &BTreeSet<usize> {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains_row(&self, row: usize) -> bool {
        self.rows.contains(&row)
    }

    pub fn fingerprint(&self) -> &ViewFingerprint {
        &self.fingerprint
    }

    /// True when the view is not the one this selection was made on
    pub fn is_stale_for(&self, view: &FilteredView<'_>) -> bool {
        self.fingerprint != view.fingerprint()
    }

    /// Positions of the selected rows in `view`
    pub fn positions_in(&self, view: &FilteredView<'_>) -> Vec<usize> {
        view.rows()
            .iter()
            .enumerate()
            .filter(|(_, o)| self.rows.contains(&o.row))
            .map(|(p, _)| p)
            .collect()
    }

    /// Restrict the view to the selected rows
    ///
    /// A stale selection is ignored and the view passes through unchanged.
    pub fn apply<'a>(&self, view: &FilteredView<'a>) -> FilteredView<'a> {
        if self.is_stale_for(view) {
            warn!(
                selection = %self.fingerprint,
                view = %view.fingerprint(),
                "selection was made on a different view, ignoring it"
            );
            return view.clone();
        }
        FilteredView {
            rows: view
                .iter()
                .filter(|o| self.rows.contains(&o.row))
                .collect(),
        }
    }
}

/// Rectangular brush on the time-series view; open sides are unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BrushWindow {
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl BrushWindow {
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none() && self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, obs: &Observation) -> bool {
        let m = obs.measurement();
        self.from.is_none_or(|f| obs.timestamp >= f)
            && self.to.is_none_or(|t| obs.timestamp <= t)
            && self.min.is_none_or(|lo| m >= lo)
            && self.max.is_none_or(|hi| m <= hi)
    }
}

/// Point positions a brush gesture would report for this view
pub fn brush_positions(view: &FilteredView<'_>, window: &BrushWindow) -> Vec<usize> {
    view.iter()
        .enumerate()
        .filter(|(_, o)| window.contains(o))
        .map(|(p, _)| p)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::limits::SpecLimits;
    use crate::entities::ObservationRecord;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn dataset() -> Dataset {
        let rows = [
            ("A", 10.0),
            ("B", 10.2),
            ("A", 10.4),
            ("C", 8.0),
            ("B", 10.6),
            ("C", 10.8),
        ];
        let records = rows
            .iter()
            .enumerate()
            .map(|(i, (eq, m))| ObservationRecord::new(*eq, "LOT-01", "W01", ts(i as u32 + 1), *m))
            .collect();
        Dataset::new(records, SpecLimits::new(9.0, 11.0).unwrap())
    }

    fn row_ids(view: &FilteredView<'_>) -> Vec<usize> {
        view.iter().map(|o| o.row).collect()
    }

    #[test]
    fn test_full_equipment_set_is_identity() {
        let ds = dataset();
        let all = filter_equipment(&ds, &EquipmentFilter::All);
        let explicit = filter_equipment(&ds, &EquipmentFilter::only(["A", "B", "C"]));
        assert_eq!(row_ids(&all), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(all, explicit);
        assert_eq!(all, FilteredView::all(&ds));
    }

    #[test]
    fn test_empty_equipment_set_is_empty() {
        let ds = dataset();
        let view = filter_equipment(&ds, &EquipmentFilter::none());
        assert!(view.is_empty());
        assert!(view.equipment_ids().is_empty());
    }

    #[test]
    fn test_subset_keeps_dataset_order() {
        let ds = dataset();
        let view = filter_equipment(&ds, &EquipmentFilter::only(["C", "A"]));
        assert_eq!(row_ids(&view), vec![0, 2, 3, 5]);
        assert_eq!(view.equipment_ids(), vec!["A", "C"]);
    }

    #[test]
    fn test_selection_ignores_duplicates_and_order() {
        let ds = dataset();
        let view = filter_equipment(&ds, &EquipmentFilter::only(["B", "C"]));
        // view rows: 1, 3, 4, 5
        let sel = Selection::from_positions(&[3, 0, 3], &view).unwrap();
        assert_eq!(sel.len(), 2);
        assert_eq!(row_ids(&sel.apply(&view)), vec![1, 5]);
    }

    #[test]
    fn test_out_of_range_payload_is_rejected_whole() {
        let ds = dataset();
        let view = filter_equipment(&ds, &EquipmentFilter::only(["A"]));
        assert_eq!(
            Selection::from_positions(&[0, 9], &view),
            Err(SelectionError::OutOfRange {
                position: 9,
                len: view.len()
            })
        );
        assert_eq!(filter(&ds, &EquipmentFilter::only(["A"]), None), view);
    }

    #[test]
    fn test_selection_validation() {
        let ds = dataset();
        let view = filter_equipment(&ds, &EquipmentFilter::All);

        assert_eq!(
            Selection::from_positions(&[], &view),
            Err(SelectionError::Empty)
        );
        assert_eq!(
            Selection::from_positions(&[1, 6], &view),
            Err(SelectionError::OutOfRange {
                position: 6,
                len: 6
            })
        );

        let sel = Selection::from_positions(&[4, 1], &view).unwrap();
        assert_eq!(sel.len(), 2);
        assert!(sel.contains_row(1));
        assert!(sel.contains_row(4));
        assert_eq!(sel.positions_in(&view), vec![1, 4]);
    }

    #[test]
    fn test_selection_apply_and_staleness() {
        let ds = dataset();
        let view = filter_equipment(&ds, &EquipmentFilter::only(["A", "B"]));
        // view rows: 0, 1, 2, 4
        let sel = Selection::from_positions(&[1, 3], &view).unwrap();
        assert_eq!(row_ids(&sel.apply(&view)), vec![1, 4]);
        assert_eq!(
            row_ids(&filter(&ds, &EquipmentFilter::only(["A", "B"]), Some(&sel))),
            vec![1, 4]
        );

        // Same positions against another view must not select anything new
        let other = filter_equipment(&ds, &EquipmentFilter::only(["A"]));
        assert!(sel.is_stale_for(&other));
        assert_eq!(sel.apply(&other), other);
    }

    #[test]
    fn test_no_selection_is_idempotent() {
        let ds = dataset();
        let eq = EquipmentFilter::only(["A", "C"]);
        let once = filter(&ds, &eq, None);
        let twice = filter(&ds, &eq, None);
        assert_eq!(once, twice);
        assert_eq!(once, filter_equipment(&ds, &eq));
    }

    #[test]
    fn test_fingerprint_tracks_rows() {
        let ds = dataset();
        let a = filter_equipment(&ds, &EquipmentFilter::only(["A"]));
        let a2 = filter_equipment(&ds, &EquipmentFilter::only(["A"]));
        let b = filter_equipment(&ds, &EquipmentFilter::only(["B"]));
        assert_eq!(a.fingerprint(), a2.fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().as_str().len(), 64);
    }

    #[test]
    fn test_brush_positions() {
        let ds = dataset();
        let view = filter_equipment(&ds, &EquipmentFilter::All);

        let window = BrushWindow {
            from: Some(ts(2)),
            to: Some(ts(5)),
            min: Some(9.0),
            max: None,
        };
        // day 4 (row 3) is below the min
        assert_eq!(brush_positions(&view, &window), vec![1, 2, 4]);

        let everything = BrushWindow::default();
        assert!(everything.is_unbounded());
        assert_eq!(brush_positions(&view, &everything).len(), 6);
    }
}
