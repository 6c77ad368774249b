//! Definition index
//!
//! The registry of every definition loaded from the OpenAPI documents, keyed
//! by composite identity. It is built once and read-only afterwards, except
//! for the table-of-contents marking done by the caller before generation.

use crate::group_table::GroupTable;
use crate::identity::{resolve_identity, META_GROUP, RESOURCE_VERSION};
use crate::openapi::{OpenApiDocument, Schema};
use crate::type_mapper::{ARRAY_SEPARATOR, SPEC_OBJECT};
use crate::version::compare_versions;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tosca_typegen_common::{
    Bookkeeping, Definition, Field, GeneratorError, Result, TypeIdentity,
    BASELINE_REQUIRED_FIELDS,
};
use tracing::{debug, info};

/// Description prefix of definitions superseded by another group
/// (the old `io.k8s.kubernetes.pkg.api.*` and `io.k8s.kubernetes.pkg.apis.*` names)
const DEPRECATED_PREFIX: &str = "Deprecated. Please use";

/// Internal schema variant that must never surface as a type
const LEGACY_ARTIFACT: &str = "JSONSchemaPropsOrStringArray";

/// All loaded definitions
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    all: BTreeMap<TypeIdentity, Definition>,
    /// Identities per kind, in load order
    by_kind: BTreeMap<String, Vec<TypeIdentity>>,
    /// Distinct versions per full group name, in load order
    group_versions: BTreeMap<String, Vec<String>>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from every schema of every document.
    ///
    /// Documents are processed in order; a later definition with the same
    /// identity replaces an earlier one.
    pub fn load(documents: &[OpenApiDocument], groups: &GroupTable) -> Result<Self> {
        let mut definitions = Self::new();

        for document in documents {
            for (name, schema) in document.schemas() {
                if let Some(definition) = build_definition(name, schema, document, groups)? {
                    definitions.insert(definition);
                }
            }
        }

        definitions.link();
        for document in documents {
            definitions.mark_operations(document);
        }

        info!(
            definitions = definitions.len(),
            groups = definitions.group_versions.len(),
            "indexed definitions"
        );
        Ok(definitions)
    }

    /// Insert a definition, replacing any existing one with the same identity
    pub fn insert(&mut self, definition: Definition) {
        let identity = definition.identity.clone();

        if identity.group != META_GROUP && identity.version != RESOURCE_VERSION {
            let versions = self
                .group_versions
                .entry(definition.full_group_name.clone())
                .or_default();
            if !versions.contains(&identity.version) {
                versions.push(identity.version.clone());
            }
        }

        if self.all.insert(identity.clone(), definition).is_some() {
            debug!(identity = %identity, "later definition overrides earlier one");
        } else {
            self.by_kind
                .entry(identity.kind.clone())
                .or_default()
                .push(identity);
        }
    }

    pub fn get(&self, identity: &TypeIdentity) -> Option<&Definition> {
        self.all.get(identity)
    }

    /// First loaded definition of a kind
    pub fn first_by_kind(&self, kind: &str) -> Option<&Definition> {
        self.by_kind
            .get(kind)
            .and_then(|ids| ids.first())
            .and_then(|id| self.all.get(id))
    }

    /// All definitions of a kind, in load order
    pub fn by_kind(&self, kind: &str) -> Vec<&Definition> {
        self.by_kind
            .get(kind)
            .map(|ids| ids.iter().filter_map(|id| self.all.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn contains_kind(&self, kind: &str) -> bool {
        self.by_kind.contains_key(kind)
    }

    /// Look up a definition by `Kind` (first match) or `Kind/version/group`
    pub fn lookup(&self, selector: &str) -> Option<&Definition> {
        match selector.split('/').collect::<Vec<_>>().as_slice() {
            [kind] => self.first_by_kind(kind),
            [kind, version, group] => self.get(&TypeIdentity::new(group, version, kind)),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.all.values()
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Distinct versions observed per full group name
    pub fn group_versions(&self) -> &BTreeMap<String, Vec<String>> {
        &self.group_versions
    }

    /// Mark table-of-contents entries. Returns the entries matching no definition.
    pub fn mark_toc(&mut self, entries: &[String]) -> Vec<String> {
        let mut unmatched = Vec::new();
        for entry in entries {
            let identity = self.lookup(entry).map(|d| d.identity.clone());
            match identity.and_then(|id| self.all.get_mut(&id)) {
                Some(definition) => definition.bookkeeping.in_toc = true,
                None => unmatched.push(entry.clone()),
            }
        }
        unmatched
    }

    /// Derive field-reference bookkeeping once all definitions are known
    pub fn link(&mut self) {
        let references: Vec<(String, TypeIdentity)> = self
            .all
            .values()
            .flat_map(|parent| {
                parent
                    .fields
                    .iter()
                    .filter_map(|f| f.reference.clone())
                    .map(move |id| (parent.identity.kind.clone(), id))
            })
            .collect();

        for definition in self.all.values_mut() {
            definition.bookkeeping = Bookkeeping {
                operations: std::mem::take(&mut definition.bookkeeping.operations),
                found_in_operation: definition.bookkeeping.found_in_operation,
                in_toc: definition.bookkeeping.in_toc,
                ..Bookkeeping::default()
            };
        }

        for (parent_kind, identity) in references {
            if let Some(target) = self.all.get_mut(&identity) {
                target.bookkeeping.found_in_field = true;
                if target.identity.kind != parent_kind
                    && target.identity.kind.starts_with(&parent_kind)
                {
                    target.bookkeeping.is_inlined = true;
                }
            }
        }

        let mut newest: BTreeMap<(String, String), String> = BTreeMap::new();
        for identity in self.all.keys() {
            let key = (identity.group.clone(), identity.kind.clone());
            let is_newer = newest.get(&key).map_or(true, |current| {
                compare_versions(&identity.version, current) == Ordering::Greater
            });
            if is_newer {
                newest.insert(key, identity.version.clone());
            }
        }
        for definition in self.all.values_mut() {
            let key = (
                definition.identity.group.clone(),
                definition.identity.kind.clone(),
            );
            definition.bookkeeping.is_old_version =
                newest.get(&key) != Some(&definition.identity.version);
        }
    }

    /// Mark definitions exchanged by the document's operations
    fn mark_operations(&mut self, document: &OpenApiDocument) {
        for (path, item) in &document.paths {
            for (method, operation) in item.operations() {
                let operation_id = operation
                    .operation_id
                    .clone()
                    .unwrap_or_else(|| format!("{} {}", method, path));

                for schema in operation.schemas() {
                    let Some(identity) = schema.referenced_name_deep().and_then(resolve_identity)
                    else {
                        continue;
                    };
                    if let Some(definition) = self.all.get_mut(&identity) {
                        let bookkeeping = &mut definition.bookkeeping;
                        bookkeeping.found_in_operation = true;
                        if !bookkeeping.operations.contains(&operation_id) {
                            bookkeeping.operations.push(operation_id.clone());
                        }
                    }
                }
            }
        }
    }
}

/// Definitions that are never indexed: superseded names and internal variants
fn is_excluded(name: &str, schema: &Schema) -> bool {
    schema
        .description
        .as_deref()
        .is_some_and(|d| d.starts_with(DEPRECATED_PREFIX))
        || name.contains(LEGACY_ARTIFACT)
}

/// Build one definition, or `None` when the schema is skipped
fn build_definition(
    name: &str,
    schema: &Schema,
    document: &OpenApiDocument,
    groups: &GroupTable,
) -> Result<Option<Definition>> {
    if is_excluded(name, schema) {
        debug!(name, "skipping excluded definition");
        return Ok(None);
    }

    let Some(identity) = resolve_identity(name) else {
        debug!(name, "skipping definition without api group");
        return Ok(None);
    };
    if identity.is_error() {
        return Err(GeneratorError::UnresolvedIdentity {
            name: name.to_string(),
        });
    }

    let full_group_name = groups.full_name_or_short(&identity.group).to_string();

    let mut required_fields: Vec<String> =
        BASELINE_REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect();
    for field in &schema.required {
        if !required_fields.contains(field) {
            required_fields.push(field.clone());
        }
    }

    let mut fields = Vec::with_capacity(schema.properties.len());
    for (field_name, property) in &schema.properties {
        let (declared_type, reference) = field_type(property, document)?;
        fields.push(Field {
            name: field_name.clone(),
            declared_type,
            required: required_fields.contains(field_name),
            description: property.description.clone().unwrap_or_default(),
            reference,
        });
    }

    Ok(Some(Definition {
        name: name.to_string(),
        identity,
        full_group_name,
        raw_description: schema.description.clone().unwrap_or_default(),
        required_fields,
        base_type: schema.first_type().unwrap_or(SPEC_OBJECT).to_string(),
        fields,
        bookkeeping: Bookkeeping::default(),
    }))
}

/// Declared type token of a property and the definition it references.
///
/// References to helper schemas that are never indexed are inlined as the
/// helper's own type token.
fn field_type(schema: &Schema, document: &OpenApiDocument) -> Result<(String, Option<TypeIdentity>)> {
    if let Some(target) = schema.referenced_name() {
        let target_schema = schema
            .reference_path()
            .and_then(|r| document.resolve_schema_ref(r));

        let excluded = target_schema.is_some_and(|s| is_excluded(target, s));
        match resolve_identity(target) {
            Some(identity) if identity.is_error() => {
                return Err(GeneratorError::UnresolvedIdentity {
                    name: target.to_string(),
                });
            }
            Some(identity) if !excluded => return Ok((identity.kind.clone(), Some(identity))),
            _ => {
                let token = target_schema
                    .and_then(Schema::first_type)
                    .unwrap_or(SPEC_OBJECT);
                return Ok((token.to_string(), None));
            }
        }
    }

    if schema.is_array() {
        if let Some(items) = &schema.items {
            let (item_type, reference) = field_type(items, document)?;
            return Ok((format!("{}{}", item_type, ARRAY_SEPARATOR), reference));
        }
    }

    Ok((schema.first_type().unwrap_or(SPEC_OBJECT).to_string(), None))
}
