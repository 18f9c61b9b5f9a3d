//! EQC: Equipment quality-control dashboard
//!
//! Generates synthetic per-equipment measurement data, classifies it against
//! spec limits, filters and aggregates it, and describes four charts that can
//! be rendered in the terminal or handed to Plotly / Vega-Lite.

pub mod cli;
pub mod core;
pub mod entities;
pub mod schema;
pub mod views;
pub mod yaml;
