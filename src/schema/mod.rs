//! Embedded JSON schemas and HTML page templates

pub mod registry;
pub mod template;

pub use registry::{SchemaRegistry, SchemaViolation};
pub use template::{TemplateError, TemplateGenerator};
