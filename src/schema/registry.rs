//! Schema registry - embedded JSON schemas

use rust_embed::Embed;
use std::collections::HashMap;

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// One schema violation, located by JSON pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Registry of JSON schemas, keyed by name (`config` for `config.schema.json`)
pub struct SchemaRegistry {
    schemas: HashMap<String, serde_json::Value>,
}

impl SchemaRegistry {
    /// Create a new schema registry with embedded schemas
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        for file in EmbeddedSchemas::iter() {
            let filename = file.as_ref();
            let Some(name) = filename.strip_suffix(".schema.json") else {
                continue;
            };
            if let Some(content) = EmbeddedSchemas::get(filename) {
                if let Ok(value) = serde_json::from_slice(&content.data) {
                    schemas.insert(name.to_string(), value);
                }
            }
        }

        Self { schemas }
    }

    /// Get the JSON schema by name
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.schemas.get(name)
    }

    /// Check if a schema exists for the given name
    pub fn has_schema(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Validate an instance against a named schema
    ///
    /// An unknown schema name is reported as a single violation at the root.
    pub fn validate(&self, name: &str, instance: &serde_json::Value) -> Vec<SchemaViolation> {
        let Some(schema) = self.get(name) else {
            return vec![SchemaViolation {
                path: String::new(),
                message: format!("no schema named '{}'", name),
            }];
        };

        let validator = match jsonschema::validator_for(schema) {
            Ok(v) => v,
            Err(e) => {
                return vec![SchemaViolation {
                    path: String::new(),
                    message: format!("invalid schema '{}': {}", name, e),
                }]
            }
        };

        validator
            .iter_errors(instance)
            .map(|e| SchemaViolation {
                path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
