//! OpenAPI specification loading
//!
//! Parses Swagger 2.0 and OpenAPI 3 documents as published by Kubernetes
//! API servers and aggregated extension servers.
//!
//! ## OpenAPI Sources
//! - From cluster: `kubectl proxy && curl http://localhost:8001/openapi/v2`
//! - From GitHub: `https://github.com/kubernetes/kubernetes/blob/master/api/openapi-spec/swagger.json`
//!
//! ## Usage
//! ```rust,ignore
//! use tosca_typegen_parser::openapi::{DocumentSource, SpecDirectory};
//!
//! let documents = SpecDirectory::new("api/openapi-spec").load()?;
//! ```

mod loader;
mod parser;
mod types;

pub use loader::{DocumentSource, SpecDirectory, SpecFiles};
pub use parser::OpenApiParser;
pub use types::*;

#[cfg(test)]
pub use loader::MockDocumentSource;
