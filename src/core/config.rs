//! Configuration - built-in defaults layered with optional YAML files
//!
//! Load order (later wins, field by field):
//! 1. built-in defaults
//! 2. user config: `<config dir>/eqc/config.yaml`
//! 3. project config: `./eqc.yaml`
//! 4. an explicit `--config` file
//!
//! Every file is validated against the embedded `config` schema before it is
//! merged.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use directories::ProjectDirs;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::generator::{GeneratorParams, OutlierParams};
use crate::core::limits::{LimitsError, SpecLimits};
use crate::schema::{SchemaRegistry, SchemaViolation};
use crate::views::{BackendKind, DashboardOptions, Layout, TimeSeriesStyle};
use crate::yaml::{parse_yaml, YamlError};

/// Project-level config file name
pub const PROJECT_CONFIG_FILE: &str = "eqc.yaml";

/// Target value and spec limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub target: f64,
    pub lsl: f64,
    pub usl: f64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            target: 10.0,
            lsl: 9.0,
            usl: 11.0,
        }
    }
}

/// Synthetic dataset shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub rows: usize,
    pub seed: u64,
    pub equipment_count: usize,
    pub lot_count: usize,
    pub wafer_count: usize,
    pub start_date: NaiveDate,
    pub days: u32,
    pub sigma: f64,
    pub offset_step: f64,
    pub equipment_offsets: Option<Vec<f64>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            rows: 500,
            seed: 42,
            equipment_count: 5,
            lot_count: 10,
            wafer_count: 25,
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap_or_default(),
            days: 30,
            sigma: 0.25,
            offset_step: 0.15,
            equipment_offsets: None,
        }
    }
}

/// Outlier injection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    pub fraction: f64,
    pub low: f64,
    pub high: f64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            fraction: 0.03,
            low: 8.0,
            high: 12.0,
        }
    }
}

/// Presentation defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    pub layout: Layout,
    pub time_style: TimeSeriesStyle,
    pub backend: BackendKind,
    pub width: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "Equipment quality statistics".to_string(),
            layout: Layout::Grid,
            time_style: TimeSeriesStyle::Auto,
            backend: BackendKind::Terminal,
            width: 120,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub limits: LimitsConfig,
    pub generator: GeneratorConfig,
    pub outliers: OutlierConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Yaml(#[from] YamlError),

    #[error("{path} does not match the configuration schema:\n{}", format_violations(.violations))]
    #[diagnostic(
        code(eqc::config::schema),
        help("see schemas/config.schema.json for the accepted keys")
    )]
    Schema {
        path: String,
        violations: Vec<SchemaViolation>,
    },

    #[error("invalid configuration: {0}")]
    #[diagnostic(code(eqc::config::invalid))]
    Invalid(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(eqc::config::limits))]
    Limits(#[from] LimitsError),
}

fn format_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {}", v))
        .collect::<Vec<_>>()
        .join("\n")
}

/// True when a YAML file holds nothing but blank lines and comments
fn is_blank_yaml(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

/// Recursively overlay `overlay` onto `base`; objects merge, everything else replaces
fn merge_values(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

impl Config {
    /// User-level config file location
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "eqc").map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Load defaults plus the user and project files that exist, then `explicit`
    ///
    /// A missing user or project file is skipped; a missing explicit file is an
    /// error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut files: Vec<PathBuf> = Vec::new();
        if let Some(user) = Self::user_config_path() {
            if user.is_file() {
                files.push(user);
            }
        }
        let project = PathBuf::from(PROJECT_CONFIG_FILE);
        if project.is_file() {
            files.push(project);
        }
        if let Some(path) = explicit {
            files.push(path.to_path_buf());
        }
        Self::load_from(&files)
    }

    /// Load defaults layered with the given files, in order
    pub fn load_from(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let registry = SchemaRegistry::new();
        let mut merged = serde_json::to_value(Config::default())?;

        for path in files {
            let content = fs::read_to_string(path).map_err(YamlError::from)?;
            if is_blank_yaml(&content) {
                continue;
            }
            let layer: serde_json::Value = parse_yaml(&content, &path.display().to_string())?;
            if layer.is_null() {
                continue;
            }
            let violations = registry.validate("config", &layer);
            if !violations.is_empty() {
                return Err(ConfigError::Schema {
                    path: path.display().to_string(),
                    violations,
                });
            }
            debug!(path = %path.display(), "applying config layer");
            merge_values(&mut merged, layer);
        }

        let config: Config = serde_json::from_value(merged)?;
        config.spec_limits()?;
        Ok(config)
    }

    /// Validated spec limits
    pub fn spec_limits(&self) -> Result<SpecLimits, LimitsError> {
        SpecLimits::new(self.limits.lsl, self.limits.usl)
    }

    /// Generated equipment ids: `EQ-01`, `EQ-02`, ...
    pub fn equipment_ids(&self) -> Vec<String> {
        (1..=self.generator.equipment_count)
            .map(|i| format!("EQ-{:02}", i))
            .collect()
    }

    pub fn generator_params(&self) -> GeneratorParams {
        let g = &self.generator;
        GeneratorParams {
            rows: g.rows,
            equipment_ids: self.equipment_ids(),
            lot_ids: (1..=g.lot_count).map(|i| format!("LOT-{:02}", i)).collect(),
            wafer_ids: (1..=g.wafer_count).map(|i| format!("W{:02}", i)).collect(),
            start_date: g.start_date,
            days: g.days,
            target: self.limits.target,
            sigma: g.sigma,
            offset_step: g.offset_step,
            equipment_offsets: g.equipment_offsets.clone(),
        }
    }

    pub fn outlier_params(&self) -> OutlierParams {
        OutlierParams {
            fraction: self.outliers.fraction,
            low: self.outliers.low,
            high: self.outliers.high,
        }
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            title: self.dashboard.title.clone(),
            layout: self.dashboard.layout,
            time_style: self.dashboard.time_style,
        }
    }
}
