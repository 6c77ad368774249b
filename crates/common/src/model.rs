//! Source definition model
//!
//! Definitions are built once from the loaded OpenAPI documents and are
//! read-only afterwards. Fields refer to other definitions by identity and are
//! resolved through the definition index, never by ownership.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields every Kubernetes object treats as required
pub const BASELINE_REQUIRED_FIELDS: [&str; 4] = ["apiVersion", "kind", "metadata", "spec"];

/// Group reported for names matching no known naming convention
const ERROR_GROUP: &str = "error";

/// Composite (group, version, kind) identity of a definition
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeIdentity {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl TypeIdentity {
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Identity assigned to names that could not be resolved
    pub fn error() -> Self {
        Self::new(ERROR_GROUP, "", "")
    }

    pub fn is_error(&self) -> bool {
        self.group == ERROR_GROUP
    }
}

impl fmt::Display for TypeIdentity {
    /// Formats as `Kind/version/group`, the selector syntax used in configs
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.version, self.group)
    }
}

/// Bookkeeping used by the diagnostics report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Bookkeeping {
    /// Referenced by a field of another definition
    pub found_in_field: bool,
    /// Used as a request body or response of an operation
    pub found_in_operation: bool,
    /// Listed in the table of contents
    pub in_toc: bool,
    /// A newer version of the same group/kind exists
    pub is_old_version: bool,
    /// Rendered inline within a parent definition
    pub is_inlined: bool,
    /// IDs of operations referencing this definition
    pub operations: Vec<String>,
}

/// One OpenAPI schema object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Definition {
    /// Fully-qualified source name (e.g. `io.k8s.api.apps.v1.Deployment`)
    pub name: String,
    pub identity: TypeIdentity,
    pub full_group_name: String,
    pub raw_description: String,
    pub required_fields: Vec<String>,
    /// Declared type token (`string`, `array`, `object`, ...)
    pub base_type: String,
    pub fields: Vec<Field>,
    pub bookkeeping: Bookkeeping,
}

impl Definition {
    pub fn kind(&self) -> &str {
        &self.identity.kind
    }

    /// A wrapper has no properties and is defined purely by its base type
    pub fn is_wrapper(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn is_required(&self, field_name: &str) -> bool {
        self.required_fields.iter().any(|f| f == field_name)
    }
}

/// One property of a definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    /// Raw type token, `"<base> array"` for arrays
    pub declared_type: String,
    pub required: bool,
    pub description: String,
    /// Identity of the referenced definition, looked up in the index
    pub reference: Option<TypeIdentity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_identity() {
        assert!(TypeIdentity::error().is_error());
        assert!(!TypeIdentity::new("apps", "v1", "Deployment").is_error());
    }

    #[test]
    fn test_identity_display_is_selector() {
        let id = TypeIdentity::new("apps", "v1", "Deployment");
        assert_eq!(id.to_string(), "Deployment/v1/apps");
    }

    #[test]
    fn test_wrapper_has_no_fields() {
        let def = Definition {
            name: "io.k8s.apimachinery.pkg.api.resource.Quantity".to_string(),
            identity: TypeIdentity::new("core", "resource", "Quantity"),
            full_group_name: "core".to_string(),
            raw_description: String::new(),
            required_fields: BASELINE_REQUIRED_FIELDS.iter().map(|s| s.to_string()).collect(),
            base_type: "string".to_string(),
            fields: vec![],
            bookkeeping: Bookkeeping::default(),
        };
        assert!(def.is_wrapper());
        assert!(def.is_required("metadata"));
        assert!(!def.is_required("status"));
    }
}
