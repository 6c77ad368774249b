//! OpenAPI type definitions
//!
//! Simplified representation focusing on schema definitions and the
//! operations that reference them. Both Swagger 2.0 (`definitions`) and
//! OpenAPI 3 (`components.schemas`) layouts are accepted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

const GROUP_VERSION_KIND_KEY: &str = "x-kubernetes-group-version-kind";

const DEFINITIONS_PREFIX: &str = "#/definitions/";
const COMPONENTS_PREFIX: &str = "#/components/schemas/";

/// OpenAPI document root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// Swagger version (e.g., "2.0")
    #[serde(default)]
    pub swagger: Option<String>,

    /// OpenAPI version (e.g., "3.0.0")
    #[serde(default)]
    pub openapi: Option<String>,

    /// API metadata
    #[serde(default)]
    pub info: Info,

    /// API paths (endpoints)
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,

    /// Swagger 2.0 schema definitions
    #[serde(default)]
    pub definitions: BTreeMap<String, Schema>,

    /// OpenAPI 3 reusable components
    #[serde(default)]
    pub components: Option<Components>,
}

/// API information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub version: String,
}

/// Path item (operations for a path)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub get: Option<Operation>,

    #[serde(default)]
    pub put: Option<Operation>,

    #[serde(default)]
    pub post: Option<Operation>,

    #[serde(default)]
    pub delete: Option<Operation>,

    #[serde(default)]
    pub patch: Option<Operation>,

    #[serde(default)]
    pub head: Option<Operation>,
}

impl PathItem {
    /// Operations declared on this path with their HTTP method
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        [
            ("GET", &self.get),
            ("PUT", &self.put),
            ("POST", &self.post),
            ("DELETE", &self.delete),
            ("PATCH", &self.patch),
            ("HEAD", &self.head),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }
}

/// HTTP operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId")]
    #[serde(default)]
    pub operation_id: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// OpenAPI 3 request body
    #[serde(rename = "requestBody")]
    #[serde(default)]
    pub request_body: Option<RequestBody>,

    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
}

impl Operation {
    /// Schemas exchanged by this operation: body parameters, request bodies
    /// and successful responses
    pub fn schemas(&self) -> Vec<&Schema> {
        let mut schemas: Vec<&Schema> = self
            .parameters
            .iter()
            .filter(|p| p.location == "body")
            .filter_map(|p| p.schema.as_ref())
            .collect();

        if let Some(body) = &self.request_body {
            schemas.extend(body.content.values().filter_map(|m| m.schema.as_ref()));
        }

        for (status, response) in &self.responses {
            if !status.starts_with('2') {
                continue;
            }
            schemas.extend(response.schema.as_ref());
            schemas.extend(response.content.values().filter_map(|m| m.schema.as_ref()));
        }

        schemas
    }
}

/// Parameter definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,

    /// Location: query, header, path, body
    #[serde(rename = "in")]
    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub schema: Option<Schema>,
}

/// OpenAPI 3 request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

/// Response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,

    /// Swagger 2.0 response schema
    #[serde(default)]
    pub schema: Option<Schema>,

    /// OpenAPI 3 content types
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

/// Media type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub schema: Option<Schema>,
}

/// Type token(s) declared by a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

impl SchemaType {
    /// First declared type token
    pub fn first(&self) -> Option<&str> {
        match self {
            SchemaType::Single(t) => Some(t.as_str()),
            SchemaType::Multiple(types) => types.first().map(String::as_str),
        }
    }
}

/// Schema definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Type: string, number, integer, boolean, array, object
    #[serde(rename = "type")]
    #[serde(default)]
    pub schema_type: Option<SchemaType>,

    #[serde(default)]
    pub description: Option<String>,

    /// Properties (for object type)
    #[serde(default)]
    pub properties: BTreeMap<String, Schema>,

    /// Required properties
    #[serde(default)]
    pub required: Vec<String>,

    /// Items schema (for array type)
    #[serde(default)]
    pub items: Option<Box<Schema>>,

    /// OpenAPI 3 wraps property references as a single-element `allOf`
    #[serde(rename = "allOf")]
    #[serde(default)]
    pub all_of: Vec<Schema>,

    /// Reference
    #[serde(rename = "$ref")]
    #[serde(default)]
    pub ref_path: Option<String>,

    /// Extensions (x-kubernetes-*, etc.)
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// One entry of the `x-kubernetes-group-version-kind` extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupVersionKind {
    #[serde(default)]
    pub group: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub kind: String,
}

impl Schema {
    /// First declared type token
    pub fn first_type(&self) -> Option<&str> {
        self.schema_type.as_ref().and_then(SchemaType::first)
    }

    pub fn is_array(&self) -> bool {
        self.first_type() == Some("array")
    }

    /// `$ref` path of this schema, looking through a single-element `allOf`
    pub fn reference_path(&self) -> Option<&str> {
        self.ref_path.as_deref().or_else(|| match self.all_of.as_slice() {
            [only] => only.reference_path(),
            _ => None,
        })
    }

    /// Definition name targeted by `$ref`, if any
    pub fn referenced_name(&self) -> Option<&str> {
        self.reference_path().and_then(OpenApiDocument::definition_name)
    }

    /// Definition name targeted by `$ref` directly or through array items
    pub fn referenced_name_deep(&self) -> Option<&str> {
        self.referenced_name().or_else(|| {
            self.items
                .as_deref()
                .filter(|_| self.is_array())
                .and_then(Schema::referenced_name)
        })
    }

    /// Decode the group/version/kind metadata extension.
    ///
    /// Returns `None` when the extension is absent or malformed.
    pub fn group_version_kinds(&self) -> Option<Vec<GroupVersionKind>> {
        let value = self.extensions.get(GROUP_VERSION_KIND_KEY)?;
        Vec::<GroupVersionKind>::deserialize(value).ok()
    }
}

/// OpenAPI 3 reusable components
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: BTreeMap<String, Schema>,
}

impl OpenApiDocument {
    /// All named schemas, Swagger 2.0 definitions first
    pub fn schemas(&self) -> impl Iterator<Item = (&String, &Schema)> {
        self.definitions
            .iter()
            .chain(self.components.iter().flat_map(|c| c.schemas.iter()))
    }

    /// Get a schema by reference path
    /// e.g., "#/definitions/io.k8s.api.core.v1.Pod" -> returns Pod schema
    pub fn resolve_schema_ref(&self, ref_path: &str) -> Option<&Schema> {
        let name = Self::definition_name(ref_path)?;
        self.definitions.get(name).or_else(|| {
            self.components
                .as_ref()
                .and_then(|c| c.schemas.get(name))
        })
    }

    /// Strip the local reference prefix from a `$ref` path
    pub fn definition_name(ref_path: &str) -> Option<&str> {
        ref_path
            .strip_prefix(DEFINITIONS_PREFIX)
            .or_else(|| ref_path.strip_prefix(COMPONENTS_PREFIX))
    }
}
