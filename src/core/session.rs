//! Dashboard session - the per-interaction request/response handler
//!
//! A session owns one dataset and the current equipment filter and selection.
//! Every interaction is applied as a state transition and answered with a
//! freshly rendered [`Dashboard`]; nothing is maintained incrementally.

use std::sync::Arc;

use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::core::filter::{
    brush_positions, filter_equipment, BrushWindow, EquipmentFilter, FilteredView, Selection,
    SelectionError,
};
use crate::entities::Dataset;
use crate::views::{build_dashboard, Dashboard, DashboardOptions};

/// Selection state of the time-series view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    NoSelection,
    Selected(Selection),
}

impl SelectionState {
    pub fn selection(&self) -> Option<&Selection> {
        match self {
            SelectionState::NoSelection => None,
            SelectionState::Selected(sel) => Some(sel),
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, SelectionState::Selected(_))
    }
}

/// A user gesture
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// Change the equipment multi-select; always clears the selection
    SetEquipment(EquipmentFilter),
    /// Brush gesture reporting point positions of the time-series view
    Brush(Vec<usize>),
    /// Brush expressed as a time/measurement window
    BrushWindow(BrushWindow),
    /// Click on a single point
    Click(usize),
    /// Explicit clear gesture
    ClearSelection,
}

/// Result of handling one interaction
#[derive(Debug, Clone)]
pub struct Outcome {
    pub dashboard: Dashboard,
    /// Set when a selection payload was rejected (state is `NoSelection`)
    pub rejected: Option<SelectionError>,
}

/// One user's dashboard state
#[derive(Debug, Clone)]
pub struct Session {
    id: Ulid,
    dataset: Arc<Dataset>,
    equipment: EquipmentFilter,
    selection: SelectionState,
    options: DashboardOptions,
}

impl Session {
    /// New session showing all equipment with no selection
    pub fn new(dataset: Arc<Dataset>, options: DashboardOptions) -> Self {
        let id = Ulid::new();
        info!(session = %id, rows = dataset.len(), "session started");
        Self {
            id,
            dataset,
            equipment: EquipmentFilter::All,
            selection: SelectionState::NoSelection,
            options,
        }
    }

    pub fn id(&self) -> Ulid {
        self.id
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn equipment(&self) -> &EquipmentFilter {
        &self.equipment
    }

    pub fn selection_state(&self) -> &SelectionState {
        &self.selection
    }

    pub fn options(&self) -> &DashboardOptions {
        &self.options
    }

    /// The equipment-filtered view (what the time-series view shows)
    pub fn view(&self) -> FilteredView<'_> {
        filter_equipment(&self.dataset, &self.equipment)
    }

    /// Apply an interaction and render the result
    pub fn handle(&mut self, interaction: Interaction) -> Outcome {
        debug!(session = %self.id, ?interaction, "interaction");

        let rejected = match interaction {
            Interaction::SetEquipment(filter) => {
                self.equipment = filter;
                self.selection = SelectionState::NoSelection;
                None
            }
            Interaction::Brush(positions) => self.select(&positions),
            Interaction::BrushWindow(window) => {
                let positions = brush_positions(&self.view(), &window);
                self.select(&positions)
            }
            Interaction::Click(position) => self.select(&[position]),
            Interaction::ClearSelection => {
                self.selection = SelectionState::NoSelection;
                None
            }
        };

        Outcome {
            dashboard: self.render(),
            rejected,
        }
    }

    /// Replace the selection; an invalid payload leaves no selection
    fn select(&mut self, positions: &[usize]) -> Option<SelectionError> {
        let result = Selection::from_positions(positions, &self.view());
        match result {
            Ok(selection) => {
                debug!(session = %self.id, points = selection.len(), "selection replaced");
                self.selection = SelectionState::Selected(selection);
                None
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "selection rejected");
                self.selection = SelectionState::NoSelection;
                Some(e)
            }
        }
    }

    /// The current selection, unless it no longer matches `view`
    fn live_selection(&self, view: &FilteredView<'_>) -> Option<&Selection> {
        self.selection
            .selection()
            .filter(|sel| !sel.is_stale_for(view))
    }

    /// The view feeding the distribution, mean and failure-rate charts
    pub fn dependent_view(&self) -> FilteredView<'_> {
        let view = self.view();
        match self.live_selection(&view) {
            Some(sel) => sel.apply(&view),
            None => view,
        }
    }

    /// Render the four views for the current state
    ///
    /// A selection that no longer matches the equipment view is ignored.
    pub fn render(&self) -> Dashboard {
        let view = self.view();
        match self.live_selection(&view) {
            Some(sel) => {
                let dependent = sel.apply(&view);
                build_dashboard(&view, &dependent, Some(sel), &self.options)
            }
            None => build_dashboard(&view, &view, None, &self.options),
        }
    }
}
