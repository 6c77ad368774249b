//! Common types and utilities for tosca-typegen
//!
//! This crate contains the source definition model, the TOSCA target type
//! graph, generator configuration and the error types shared by the parser,
//! generator and CLI components.

pub mod config;
mod model;
pub mod tosca;

pub use config::{GeneratorConfig, ToscaProfile};
pub use model::{Bookkeeping, Definition, Field, TypeIdentity, BASELINE_REQUIRED_FIELDS};
pub use tosca::{
    Assignment, DataType, EntrySchemaDefinition, ImplementationDefinition, InterfaceDefinition,
    NodeType, OperationDefinition, PropertyDefinition, RequirementDefinition, ToscaTypes,
};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during type generation
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),

    /// A definition name that matches no known naming convention.
    #[error("Could not locate group for {name}")]
    UnresolvedIdentity { name: String },

    /// A field type token with no TOSCA representation.
    #[error("Field '{field}' has unmapped type '{type_token}'")]
    UnmappedType { field: String, type_token: String },

    #[error("No definition found for kind '{0}'")]
    UnknownKind(String),

    #[error("Could not load {} as api-spec: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: Box<GeneratorError>,
    },

    #[error("{0}")]
    Diagnostics(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl GeneratorError {
    /// Wrap an error with the path of the document that caused it
    pub fn in_document(self, path: impl Into<PathBuf>) -> Self {
        GeneratorError::Document {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_error_names_path() {
        let err = GeneratorError::Parse("unexpected token".to_string())
            .in_document("specs/apps.json");
        let message = err.to_string();
        assert!(message.contains("specs/apps.json"));
        assert!(message.contains("unexpected token"));
    }

    #[test]
    fn test_unresolved_identity_names_definition() {
        let err = GeneratorError::UnresolvedIdentity {
            name: "com.example.Widget".to_string(),
        };
        assert_eq!(err.to_string(), "Could not locate group for com.example.Widget");
    }
}
