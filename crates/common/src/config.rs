//! Generator configuration loading from YAML files
//!
//! A configuration names the root kinds to expand, whether diagnostics may be
//! tolerated, and the TOSCA vocabulary the generated types derive from.

use crate::{GeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root structure of a generator configuration file
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Root kinds to expand, as `Kind` or `Kind/version/group`
    pub included_objects: Vec<String>,
    /// Report orphaned definitions without failing the run
    pub allow_errors: bool,
    /// Value of `tosca_definitions_version` in the output
    pub tosca_version: String,
    /// Emit node types for nested non-wrapper definitions as well as roots
    pub nested_node_types: bool,
    /// Table of contents entries, as `Kind` or `Kind/version/group`
    pub toc: Vec<String>,
    pub profile: ToscaProfile,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            included_objects: Vec::new(),
            allow_errors: false,
            tosca_version: "tosca_simple_yaml_1_3".to_string(),
            nested_node_types: true,
            toc: Vec::new(),
            profile: ToscaProfile::default(),
        }
    }
}

/// TOSCA names the generated types are built from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ToscaProfile {
    /// Abstract data type base, also the data type namespace
    pub data_type_base: String,
    /// Abstract node type base, also the node type namespace
    pub node_type_base: String,
    pub host_capability: String,
    pub host_node: String,
    pub host_relationship: String,
    pub interface_type: String,
    /// Input carrying cluster credentials into the create operation
    pub credential_input: String,
    /// Playbook implementing the create operation
    pub create_implementation: String,
}

impl Default for ToscaProfile {
    fn default() -> Self {
        Self {
            data_type_base: "sodalite.datatypes.Kubernetes.Kind".to_string(),
            node_type_base: "sodalite.nodes.Kubernetes.Kind".to_string(),
            host_capability: "tosca.capabilities.Compute".to_string(),
            host_node: "sodalite.nodes.Kubernetes.Cluster".to_string(),
            host_relationship: "tosca.relationships.HostedOn".to_string(),
            interface_type: "tosca.interfaces.node.lifecycle.Standard".to_string(),
            credential_input: "kubeconfig".to_string(),
            create_implementation: "playbooks/create_kind_from_definition.yaml".to_string(),
        }
    }
}

impl ToscaProfile {
    pub fn data_type_name(&self, kind: &str) -> String {
        format!("{}.{}", self.data_type_base, kind)
    }

    pub fn node_type_name(&self, kind: &str) -> String {
        format!("{}.{}", self.node_type_base, kind)
    }
}

impl GeneratorConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GeneratorError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_yaml(&content)
            .map_err(|e| GeneratorError::Config(format!("Failed to parse config {:?}: {}", path, e)))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.included_objects.iter().any(|o| o.trim().is_empty()) {
            return Err(GeneratorError::Config(
                "included_objects must not contain empty entries".to_string(),
            ));
        }
        if self.profile.data_type_base == self.profile.node_type_base {
            return Err(GeneratorError::Config(
                "data_type_base and node_type_base must differ".to_string(),
            ));
        }
        Ok(())
    }
}
