//! TOSCA type graph builder
//!
//! Expands root kinds into data types and node types. Every referenced
//! definition is expanded at most once: the data type name is checked
//! against the output before recursing, which keeps cyclic definition
//! graphs finite.

use std::collections::BTreeMap;
use tosca_typegen_common::{
    Assignment, DataType, Definition, EntrySchemaDefinition, GeneratorConfig, GeneratorError,
    ImplementationDefinition, InterfaceDefinition, NodeType, OperationDefinition,
    PropertyDefinition, RequirementDefinition, Result, ToscaProfile, ToscaTypes, TypeIdentity,
};
use tosca_typegen_parser::{Definitions, FieldClass, TypeMapper, TOSCA_LIST, TOSCA_MAP};
use tracing::{debug, info, warn};

/// Name of the synthesized node property holding the full definition
pub const DEFINITION_PROPERTY: &str = "definition";
/// Requirement name of the hosting cluster
pub const HOST_REQUIREMENT: &str = "host";
/// Interface name of the lifecycle interface
pub const STANDARD_INTERFACE: &str = "Standard";
/// Lifecycle operation deploying the definition
pub const CREATE_OPERATION: &str = "create";

const DEFAULT_TOSCA_VERSION: &str = "tosca_simple_yaml_1_3";

/// Identity each emitted data type name was built from
type DataTypeSources = BTreeMap<String, TypeIdentity>;

/// Identity that already claimed `name`, when it differs from `identity`
fn colliding_identity<'s>(
    sources: &'s DataTypeSources,
    name: &str,
    identity: &TypeIdentity,
) -> Option<&'s TypeIdentity> {
    sources.get(name).filter(|earlier| *earlier != identity)
}

fn warn_on_collision(sources: &DataTypeSources, name: &str, definition: &Definition) {
    if let Some(earlier) = colliding_identity(sources, name, &definition.identity) {
        warn!(
            data_type = name,
            kept = %earlier,
            dropped = %definition.identity,
            "data type name already emitted from another definition"
        );
    }
}

/// Builds a [`ToscaTypes`] graph from the definition index
pub struct GraphBuilder<'a> {
    definitions: &'a Definitions,
    profile: &'a ToscaProfile,
    tosca_version: String,
    nested_node_types: bool,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(definitions: &'a Definitions, profile: &'a ToscaProfile) -> Self {
        Self {
            definitions,
            profile,
            tosca_version: DEFAULT_TOSCA_VERSION.to_string(),
            nested_node_types: true,
        }
    }

    /// Builder configured from a generator configuration
    pub fn from_config(definitions: &'a Definitions, config: &'a GeneratorConfig) -> Self {
        Self::new(definitions, &config.profile)
            .tosca_version(&config.tosca_version)
            .nested_node_types(config.nested_node_types)
    }

    pub fn tosca_version(mut self, version: &str) -> Self {
        self.tosca_version = version.to_string();
        self
    }

    /// Emit node types for referenced non-wrapper definitions, not only roots
    pub fn nested_node_types(mut self, enabled: bool) -> Self {
        self.nested_node_types = enabled;
        self
    }

    /// Build the graph for the given root selectors (`Kind` or `Kind/version/group`)
    pub fn build<S: AsRef<str>>(&self, roots: &[S]) -> Result<ToscaTypes> {
        let mut tosca = ToscaTypes::new(&self.tosca_version);
        let mut sources = DataTypeSources::new();

        for selector in roots {
            let root = self.resolve_root(selector.as_ref())?;
            debug!(root = %root.identity, "expanding root kind");
            self.add_node_type(root, &mut tosca);
            self.expand(root, &mut tosca, &mut sources)?;
        }

        info!(
            roots = roots.len(),
            data_types = tosca.data_types.len(),
            node_types = tosca.node_types.len(),
            "built tosca type graph"
        );
        Ok(tosca)
    }

    /// Resolve a root selector, taking the first loaded definition for bare kinds
    pub fn resolve_root(&self, selector: &str) -> Result<&'a Definition> {
        let definitions: &'a Definitions = self.definitions;
        definitions
            .lookup(selector)
            .ok_or_else(|| GeneratorError::UnknownKind(selector.to_string()))
    }

    /// Data type of a definition, plus the referenced definitions to expand
    pub fn data_type(&self, definition: &'a Definition) -> Result<(DataType, Vec<&'a Definition>)> {
        let description = definition.raw_description.clone();

        if definition.is_wrapper() {
            let data_type = DataType {
                derived_from: TypeMapper::map_base_type(definition)?.to_string(),
                description,
                properties: BTreeMap::new(),
            };
            return Ok((data_type, Vec::new()));
        }

        let mut properties = BTreeMap::new();
        let mut references = Vec::new();

        for field in &definition.fields {
            let class = TypeMapper::classify(field, self.definitions).map_err(|e| match e {
                GeneratorError::UnmappedType { field, type_token } => {
                    GeneratorError::UnmappedType {
                        field: format!("{}.{}", definition.name, field),
                        type_token,
                    }
                }
                other => other,
            })?;

            let (property_type, entry_type) = match class {
                FieldClass::Primitive(tosca_type) => (tosca_type.to_string(), None),
                FieldClass::PrimitiveArray(element) => {
                    (TOSCA_LIST.to_string(), Some(element.to_string()))
                }
                FieldClass::Reference {
                    definition: target,
                    array,
                } => {
                    references.push(target);
                    let target_name = self.profile.data_type_name(target.kind());
                    match (target.is_wrapper(), array) {
                        (true, false) => (target_name, None),
                        (_, true) => (TOSCA_LIST.to_string(), Some(target_name)),
                        (false, false) => (TOSCA_MAP.to_string(), Some(target_name)),
                    }
                }
            };

            properties.insert(
                field.name.clone(),
                PropertyDefinition {
                    property_type,
                    description: field.description.clone(),
                    required: Some(field.required),
                    default: None,
                    entry_schema: entry_type.map(|entry_type| EntrySchemaDefinition { entry_type }),
                },
            );
        }

        let data_type = DataType {
            derived_from: self.profile.data_type_base.clone(),
            description,
            properties,
        };
        Ok((data_type, references))
    }

    /// Node type of a non-wrapper definition
    pub fn node_type(&self, definition: &Definition) -> NodeType {
        let profile = self.profile;
        let data_type_name = profile.data_type_name(definition.kind());

        let mut properties = BTreeMap::new();
        properties.insert(
            DEFINITION_PROPERTY.to_string(),
            PropertyDefinition {
                property_type: TOSCA_MAP.to_string(),
                description: format!("Full definition can be found in {}", data_type_name),
                required: Some(true),
                default: None,
                entry_schema: Some(EntrySchemaDefinition {
                    entry_type: data_type_name,
                }),
            },
        );

        let mut host = BTreeMap::new();
        host.insert(
            HOST_REQUIREMENT.to_string(),
            RequirementDefinition {
                capability: profile.host_capability.clone(),
                node: profile.host_node.clone(),
                relationship: profile.host_relationship.clone(),
            },
        );

        let mut inputs = BTreeMap::new();
        inputs.insert(
            profile.credential_input.clone(),
            PropertyDefinition {
                property_type: "string".to_string(),
                default: Some(Assignment::get_property(&[
                    "SELF",
                    HOST_REQUIREMENT,
                    &profile.credential_input,
                ])),
                ..PropertyDefinition::default()
            },
        );
        inputs.insert(
            DEFINITION_PROPERTY.to_string(),
            PropertyDefinition {
                property_type: TOSCA_MAP.to_string(),
                default: Some(Assignment::get_property(&["SELF", DEFINITION_PROPERTY])),
                ..PropertyDefinition::default()
            },
        );

        let mut operations = BTreeMap::new();
        operations.insert(
            CREATE_OPERATION.to_string(),
            OperationDefinition {
                inputs,
                implementation: Some(ImplementationDefinition {
                    primary: profile.create_implementation.clone(),
                }),
            },
        );

        let mut interfaces = BTreeMap::new();
        interfaces.insert(
            STANDARD_INTERFACE.to_string(),
            InterfaceDefinition {
                interface_type: profile.interface_type.clone(),
                operations,
            },
        );

        NodeType {
            derived_from: profile.node_type_base.clone(),
            description: definition.raw_description.clone(),
            properties,
            requirements: vec![host],
            interfaces,
        }
    }

    fn add_node_type(&self, definition: &Definition, tosca: &mut ToscaTypes) {
        if definition.is_wrapper() {
            return;
        }
        let name = self.profile.node_type_name(definition.kind());
        if tosca.insert_node_type(name, self.node_type(definition)) {
            debug!(kind = definition.kind(), "added node type");
        }
    }

    /// Add the data type of `definition` and everything it references.
    ///
    /// Data type names carry only the kind, so a second definition with the
    /// same kind from another group or version is dropped with a warning.
    fn expand(
        &self,
        definition: &'a Definition,
        tosca: &mut ToscaTypes,
        sources: &mut DataTypeSources,
    ) -> Result<()> {
        let name = self.profile.data_type_name(definition.kind());
        if tosca.has_data_type(&name) {
            warn_on_collision(sources, &name, definition);
            return Ok(());
        }

        let (data_type, references) = self.data_type(definition)?;
        tosca.insert_data_type(name.clone(), data_type);
        sources.insert(name, definition.identity.clone());
        debug!(kind = definition.kind(), "added data type");

        for target in references {
            let target_name = self.profile.data_type_name(target.kind());
            if tosca.has_data_type(&target_name) {
                warn_on_collision(sources, &target_name, target);
                continue;
            }
            if self.nested_node_types {
                self.add_node_type(target, tosca);
            }
            self.expand(target, tosca, sources)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tosca_typegen_common::{Bookkeeping, Field, TypeIdentity};

    fn definition(kind: &str, base_type: &str, fields: Vec<Field>) -> Definition {
        Definition {
            name: format!("io.k8s.api.apps.v1.{}", kind),
            identity: TypeIdentity::new("apps", "v1", kind),
            full_group_name: "apps".to_string(),
            raw_description: format!("{} description", kind),
            required_fields: vec![],
            base_type: base_type.to_string(),
            fields,
            bookkeeping: Bookkeeping::default(),
        }
    }

    fn reference(name: &str, kind: &str, array: bool) -> Field {
        Field {
            name: name.to_string(),
            declared_type: if array {
                format!("{} array", kind)
            } else {
                kind.to_string()
            },
            required: false,
            description: String::new(),
            reference: Some(TypeIdentity::new("apps", "v1", kind)),
        }
    }

    fn primitive(name: &str, declared_type: &str) -> Field {
        Field {
            name: name.to_string(),
            declared_type: declared_type.to_string(),
            required: false,
            description: format!("{} field", name),
            reference: None,
        }
    }

    fn index(definitions: Vec<Definition>) -> Definitions {
        let mut index = Definitions::new();
        for definition in definitions {
            index.insert(definition);
        }
        index
    }

    #[test]
    fn test_primitive_properties() {
        let defs = index(vec![definition(
            "HealthCheck",
            "object",
            vec![
                primitive("periodSeconds", "integer"),
                primitive("command", "string array"),
                primitive("labels", "object"),
            ],
        )]);
        let profile = ToscaProfile::default();
        let builder = GraphBuilder::new(&defs, &profile);

        let (data_type, references) = builder.data_type(defs.lookup("HealthCheck").unwrap()).unwrap();
        assert!(references.is_empty());
        assert_eq!(data_type.derived_from, profile.data_type_base);

        let period = &data_type.properties["periodSeconds"];
        assert_eq!(period.property_type, "integer");
        assert_eq!(period.required, Some(false));
        assert!(period.entry_schema.is_none());

        let command = &data_type.properties["command"];
        assert_eq!(command.property_type, "list");
        assert_eq!(command.entry_schema.as_ref().unwrap().entry_type, "string");

        assert_eq!(data_type.properties["labels"].property_type, "map");
    }

    #[test]
    fn test_reference_properties() {
        let defs = index(vec![
            definition(
                "PodSpec",
                "object",
                vec![
                    reference("containers", "Container", true),
                    reference("securityContext", "SecurityContext", false),
                    reference("overhead", "Quantity", false),
                    reference("limits", "Quantity", true),
                ],
            ),
            definition("Container", "object", vec![primitive("image", "string")]),
            definition("SecurityContext", "object", vec![primitive("runAsUser", "integer")]),
            definition("Quantity", "string", vec![]),
        ]);
        let profile = ToscaProfile::default();
        let builder = GraphBuilder::new(&defs, &profile);

        let (data_type, references) = builder.data_type(defs.lookup("PodSpec").unwrap()).unwrap();
        assert_eq!(references.len(), 4);

        let containers = &data_type.properties["containers"];
        assert_eq!(containers.property_type, "list");
        assert_eq!(
            containers.entry_schema.as_ref().unwrap().entry_type,
            "sodalite.datatypes.Kubernetes.Kind.Container"
        );

        let security = &data_type.properties["securityContext"];
        assert_eq!(security.property_type, "map");
        assert_eq!(
            security.entry_schema.as_ref().unwrap().entry_type,
            "sodalite.datatypes.Kubernetes.Kind.SecurityContext"
        );

        let overhead = &data_type.properties["overhead"];
        assert_eq!(
            overhead.property_type,
            "sodalite.datatypes.Kubernetes.Kind.Quantity"
        );
        assert!(overhead.entry_schema.is_none());

        let limits = &data_type.properties["limits"];
        assert_eq!(limits.property_type, "list");
        assert_eq!(
            limits.entry_schema.as_ref().unwrap().entry_type,
            "sodalite.datatypes.Kubernetes.Kind.Quantity"
        );
    }

    fn rbac_subject(group: &str, field: &str) -> Definition {
        Definition {
            name: format!("io.k8s.api.{}.v1.Subject", group),
            identity: TypeIdentity::new(group, "v1", "Subject"),
            full_group_name: group.to_string(),
            raw_description: format!("{} subject", group),
            required_fields: vec![],
            base_type: "object".to_string(),
            fields: vec![primitive(field, "string")],
            bookkeeping: Bookkeeping::default(),
        }
    }

    #[test]
    fn test_colliding_identity() {
        let mut sources = DataTypeSources::new();
        let rbac = TypeIdentity::new("rbac", "v1", "Subject");
        let flowcontrol = TypeIdentity::new("flowcontrol", "v1", "Subject");
        sources.insert("Kind.Subject".to_string(), rbac.clone());

        assert_eq!(
            colliding_identity(&sources, "Kind.Subject", &flowcontrol),
            Some(&rbac)
        );
        assert_eq!(colliding_identity(&sources, "Kind.Subject", &rbac), None);
        assert_eq!(colliding_identity(&sources, "Kind.Other", &flowcontrol), None);
    }

    #[test]
    fn test_same_kind_from_two_groups_keeps_first() {
        let mut binding = definition(
            "RoleBinding",
            "object",
            vec![reference("subject", "Subject", false)],
        );
        binding.fields[0].reference = Some(TypeIdentity::new("rbac", "v1", "Subject"));
        let mut schema = definition(
            "FlowSchema",
            "object",
            vec![reference("subject", "Subject", false)],
        );
        schema.fields[0].reference = Some(TypeIdentity::new("flowcontrol", "v1", "Subject"));

        let defs = index(vec![
            binding,
            schema,
            rbac_subject("rbac", "apiGroup"),
            rbac_subject("flowcontrol", "kind"),
        ]);
        let profile = ToscaProfile::default();
        let tosca = GraphBuilder::new(&defs, &profile)
            .build(&["RoleBinding", "FlowSchema"])
            .unwrap();

        let subject = &tosca.data_types["sodalite.datatypes.Kubernetes.Kind.Subject"];
        assert_eq!(subject.description, "rbac subject");
        assert!(subject.properties.contains_key("apiGroup"));
        assert!(!subject.properties.contains_key("kind"));
    }

    #[test]
    fn test_wrapper_derives_from_mapped_base() {
        let defs = index(vec![
            definition("Quantity", "string", vec![]),
            definition("RawExtension", "object", vec![]),
        ]);
        let profile = ToscaProfile::default();
        let builder = GraphBuilder::new(&defs, &profile);

        let (quantity, _) = builder.data_type(defs.lookup("Quantity").unwrap()).unwrap();
        assert_eq!(quantity.derived_from, "string");
        assert!(quantity.properties.is_empty());

        let (raw, _) = builder.data_type(defs.lookup("RawExtension").unwrap()).unwrap();
        assert_eq!(raw.derived_from, "map");
    }

    #[test]
    fn test_node_type_shape() {
        let defs = index(vec![definition(
            "Deployment",
            "object",
            vec![primitive("replicas", "integer")],
        )]);
        let profile = ToscaProfile::default();
        let builder = GraphBuilder::new(&defs, &profile);
        let node = builder.node_type(defs.lookup("Deployment").unwrap());

        assert_eq!(node.derived_from, "sodalite.nodes.Kubernetes.Kind");
        assert_eq!(node.properties.len(), 1);
        let property = &node.properties[DEFINITION_PROPERTY];
        assert_eq!(property.property_type, "map");
        assert_eq!(property.required, Some(true));
        assert_eq!(
            property.description,
            "Full definition can be found in sodalite.datatypes.Kubernetes.Kind.Deployment"
        );

        assert_eq!(node.requirements.len(), 1);
        let host = &node.requirements[0][HOST_REQUIREMENT];
        assert_eq!(host.capability, "tosca.capabilities.Compute");
        assert_eq!(host.node, "sodalite.nodes.Kubernetes.Cluster");
        assert_eq!(host.relationship, "tosca.relationships.HostedOn");

        let create = &node.interfaces[STANDARD_INTERFACE].operations[CREATE_OPERATION];
        assert_eq!(
            create.inputs["kubeconfig"].default,
            Some(Assignment::get_property(&["SELF", "host", "kubeconfig"]))
        );
        assert_eq!(
            create.inputs[DEFINITION_PROPERTY].default,
            Some(Assignment::get_property(&["SELF", "definition"]))
        );
        assert_eq!(
            create.implementation.as_ref().unwrap().primary,
            "playbooks/create_kind_from_definition.yaml"
        );
    }

    #[test]
    fn test_unknown_root_kind() {
        let defs = index(vec![]);
        let profile = ToscaProfile::default();
        let result = GraphBuilder::new(&defs, &profile).build(&["Deployment"]);
        assert!(matches!(result, Err(GeneratorError::UnknownKind(kind)) if kind == "Deployment"));
    }

    #[test]
    fn test_nested_node_types_can_be_disabled() {
        let defs = index(vec![
            definition("Pod", "object", vec![reference("spec", "PodSpec", false)]),
            definition("PodSpec", "object", vec![primitive("hostname", "string")]),
        ]);
        let profile = ToscaProfile::default();

        let all = GraphBuilder::new(&defs, &profile).build(&["Pod"]).unwrap();
        assert_eq!(all.node_types.len(), 2);

        let roots_only = GraphBuilder::new(&defs, &profile)
            .nested_node_types(false)
            .build(&["Pod"])
            .unwrap();
        assert_eq!(roots_only.node_types.len(), 1);
        assert_eq!(roots_only.data_types.len(), 2);
    }

    #[test]
    fn test_unmapped_field_names_owner() {
        let defs = index(vec![definition(
            "Odd",
            "object",
            vec![primitive("payload", "binary")],
        )]);
        let profile = ToscaProfile::default();

        match GraphBuilder::new(&defs, &profile).build(&["Odd"]) {
            Err(GeneratorError::UnmappedType { field, type_token }) => {
                assert_eq!(field, "io.k8s.api.apps.v1.Odd.payload");
                assert_eq!(type_token, "binary");
            }
            other => panic!("expected unmapped type, got {other:?}"),
        }
    }

    #[test]
    fn test_from_config_uses_profile_and_version() {
        let defs = index(vec![definition(
            "Service",
            "object",
            vec![primitive("type", "string")],
        )]);
        let mut config = GeneratorConfig::default();
        config.tosca_version = "tosca_simple_yaml_1_2".to_string();
        config.profile.data_type_base = "acme.datatypes".to_string();
        config.profile.node_type_base = "acme.nodes".to_string();

        let tosca = GraphBuilder::from_config(&defs, &config)
            .build(&["Service"])
            .unwrap();
        assert_eq!(tosca.version, "tosca_simple_yaml_1_2");
        assert!(tosca.has_data_type("acme.datatypes.Service"));
        assert!(tosca.has_node_type("acme.nodes.Service"));
    }
}
