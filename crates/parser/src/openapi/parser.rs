//! OpenAPI spec file parser

use super::types::OpenApiDocument;
use std::fs;
use std::path::Path;
use tosca_typegen_common::{GeneratorError, Result};

/// OpenAPI specification parser
///
/// Reads a single Swagger 2.0 or OpenAPI 3 document, such as the
/// `swagger.json` published by the Kubernetes API server.
#[derive(Debug, Clone)]
pub struct OpenApiParser {
    document: OpenApiDocument,
}

impl OpenApiParser {
    /// Load an OpenAPI document from file path
    ///
    /// Failures are wrapped with the offending path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| GeneratorError::from(e).in_document(path))?;

        Self::from_json(&content).map_err(|e| e.in_document(path))
    }

    /// Parse an OpenAPI document from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let document: OpenApiDocument = serde_json::from_str(json)
            .map_err(|e| GeneratorError::Parse(format!("Failed to parse OpenAPI JSON: {}", e)))?;

        if document.swagger.is_none() && document.openapi.is_none() {
            return Err(GeneratorError::Parse(
                "Document declares neither 'swagger' nor 'openapi' version".to_string(),
            ));
        }

        Ok(Self { document })
    }

    /// Get reference to the underlying document
    pub fn document(&self) -> &OpenApiDocument {
        &self.document
    }

    pub fn into_document(self) -> OpenApiDocument {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_swagger() {
        let json = r#"{
            "swagger": "2.0",
            "info": {
                "title": "Kubernetes",
                "version": "v1.19.0"
            },
            "paths": {},
            "definitions": {
                "io.k8s.api.core.v1.Pod": {
                    "description": "Pod is a collection of containers.",
                    "type": "object",
                    "properties": {}
                }
            }
        }"#;

        let parser = OpenApiParser::from_json(json).unwrap();
        assert_eq!(parser.document().info.title, "Kubernetes");
        assert_eq!(parser.document().definitions.len(), 1);
    }

    #[test]
    fn test_rejects_unversioned_document() {
        let result = OpenApiParser::from_json(r#"{"info": {"title": "x"}}"#);
        assert!(matches!(result, Err(GeneratorError::Parse(_))));
    }

    #[test]
    fn test_file_errors_carry_path() {
        let err = OpenApiParser::from_file("/nonexistent/apps.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/apps.json"));
    }
}
