//! TOSCA target type graph
//!
//! Field naming mirrors the TOSCA simple profile so the graph can be
//! serialized directly into a service template consumed by orchestrators.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Output of one generation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToscaTypes {
    #[serde(
        rename = "tosca_definitions_version",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub version: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data_types: BTreeMap<String, DataType>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_types: BTreeMap<String, NodeType>,
}

impl ToscaTypes {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            ..Self::default()
        }
    }

    pub fn has_data_type(&self, name: &str) -> bool {
        self.data_types.contains_key(name)
    }

    pub fn has_node_type(&self, name: &str) -> bool {
        self.node_types.contains_key(name)
    }

    /// Insert a data type unless one with the same name exists.
    ///
    /// Returns `true` when the entry was added.
    pub fn insert_data_type(&mut self, name: String, data_type: DataType) -> bool {
        if self.has_data_type(&name) {
            return false;
        }
        self.data_types.insert(name, data_type);
        true
    }

    /// Insert a node type unless one with the same name exists.
    pub fn insert_node_type(&mut self, name: String, node_type: NodeType) -> bool {
        if self.has_node_type(&name) {
            return false;
        }
        self.node_types.insert(name, node_type);
        true
    }

    /// Serialize to a TOSCA YAML document
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the YAML document to `path`
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataType {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub derived_from: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeType {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub derived_from: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyDefinition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<BTreeMap<String, RequirementDefinition>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub interfaces: BTreeMap<String, InterfaceDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySchemaDefinition {
    #[serde(rename = "type")]
    pub entry_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    #[serde(rename = "type")]
    pub property_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Assignment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_schema: Option<EntrySchemaDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementDefinition {
    pub capability: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub node: String,

    pub relationship: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDefinition {
    #[serde(rename = "type")]
    pub interface_type: String,

    pub operations: BTreeMap<String, OperationDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationDefinition {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, PropertyDefinition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<ImplementationDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationDefinition {
    pub primary: String,
}

/// Value assigned to a property or input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Assignment {
    Value(String),
    /// A TOSCA intrinsic function such as `get_property`
    Function(BTreeMap<String, Vec<String>>),
}

impl Assignment {
    /// `{ get_property: [path...] }`
    pub fn get_property(path: &[&str]) -> Self {
        let mut function = BTreeMap::new();
        function.insert(
            "get_property".to_string(),
            path.iter().map(|s| s.to_string()).collect(),
        );
        Assignment::Function(function)
    }
}
