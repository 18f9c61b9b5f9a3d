//! Shared utilities for CLI commands

use std::sync::Arc;

use console::style;
use miette::{IntoDiagnostic, Result};
use tracing::info;

use crate::cli::args::{DataArgs, SelectionArgs};
use crate::cli::GlobalOpts;
use crate::core::{generate_with_outliers, Config, EquipmentFilter, Interaction, Session};
use crate::entities::Dataset;
use crate::views::DashboardOptions;

/// Load the layered configuration for this invocation
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    Ok(Config::load(global.config.as_deref())?)
}

/// Build the dataset: the demo table, or the seeded generator
///
/// The demo table carries its own limits (10.0 / 11.0); `--rows` and `--seed`
/// override the generator section of the config.
pub fn load_dataset(data: &DataArgs, config: &Config) -> Result<Dataset> {
    if data.demo {
        info!("using demo dataset");
        return Ok(Dataset::demo());
    }

    let mut params = config.generator_params();
    if let Some(rows) = data.rows {
        params.rows = rows;
    }
    let seed = data.seed.unwrap_or(config.generator.seed);
    let limits = config.spec_limits().into_diagnostic()?;

    let dataset = generate_with_outliers(&params, &config.outlier_params(), limits, seed)
        .into_diagnostic()?;
    info!(
        rows = dataset.len(),
        seed,
        failures = dataset.failure_count(),
        "generated dataset"
    );
    Ok(dataset)
}

/// Start a session over `dataset`
pub fn new_session(dataset: Dataset, options: DashboardOptions) -> Session {
    Session::new(Arc::new(dataset), options)
}

/// Equipment filter from `--equipment`; blank entries are dropped
pub fn equipment_filter(ids: Option<&[String]>) -> EquipmentFilter {
    match ids {
        None => EquipmentFilter::All,
        Some(ids) => EquipmentFilter::only(
            ids.iter()
                .map(|id| id.trim())
                .filter(|id| !id.is_empty()),
        ),
    }
}

/// Apply `--equipment` then `--select` / `--brush-*` to the session
///
/// Unknown equipment ids and rejected selections are reported on stderr; a
/// rejected selection leaves the session without a selection.
pub fn apply_selection(session: &mut Session, args: &SelectionArgs) {
    if let Some(ref ids) = args.equipment {
        let known = session.dataset().equipment_ids();
        for id in ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
            if !known.iter().any(|k| k == id) {
                eprintln!(
                    "{} Unknown equipment '{}' (known: {})",
                    style("!").yellow(),
                    id,
                    known.join(", ")
                );
            }
        }
        session.handle(Interaction::SetEquipment(equipment_filter(Some(ids))));
    }

    let outcome = if let Some(ref positions) = args.select {
        Some(session.handle(Interaction::Brush(positions.clone())))
    } else {
        args.brush_window()
            .map(|window| session.handle(Interaction::BrushWindow(window)))
    };

    if let Some(rejected) = outcome.and_then(|o| o.rejected) {
        eprintln!(
            "{} Selection ignored: {}",
            style("!").yellow(),
            rejected
        );
    }
}
