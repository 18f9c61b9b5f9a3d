//! CLI command implementations

pub mod completions;
pub mod dashboard;
pub mod generate;
pub mod interactive;
pub mod stats;
pub mod utils;
