//! YAML parsing with error handling

use serde::de::DeserializeOwned;

use crate::yaml::diagnostics::{YamlError, YamlSyntaxError};

/// Parse YAML content into a typed value with nice error messages
pub fn parse_yaml<T: DeserializeOwned + 'static>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content).map_err(|e| {
        YamlError::Syntax(YamlSyntaxError::from_serde_error(&e, content, filename))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Limits {
        lsl: f64,
        usl: f64,
    }

    #[test]
    fn test_parse_valid_yaml() {
        let yaml = "lsl: 9.5\nusl: 10.5";
        let result: Limits = parse_yaml(yaml, "eqc.yaml").unwrap();
        assert_eq!(result, Limits { lsl: 9.5, usl: 10.5 });
    }

    #[test]
    fn test_parse_invalid_yaml_returns_error() {
        let yaml = "lsl: 9.5\n  invalid indentation: [";
        let result: Result<Limits, _> = parse_yaml(yaml, "eqc.yaml");
        assert!(matches!(result, Err(YamlError::Syntax(_))));
    }
}
