//! Core module - the data pipeline and its configuration

pub mod aggregate;
pub mod config;
pub mod filter;
pub mod generator;
pub mod limits;
pub mod session;

pub use aggregate::{
    failure_rate_by_equipment, mean_by_equipment, overall_mean, summarize, GroupFailureRate,
    GroupMean, GroupSummary,
};
pub use config::{Config, ConfigError};
pub use filter::{
    brush_positions, filter, filter_equipment, BrushWindow, EquipmentFilter, FilteredView,
    Selection, SelectionError, ViewFingerprint,
};
pub use generator::{
    generate, generate_with_outliers, inject_outliers, seeded_rng, GenerateError,
    GeneratorParams, OutlierParams,
};
pub use limits::{classify, LimitsError, SpecLimits};
pub use session::{Interaction, Outcome, SelectionState, Session};
