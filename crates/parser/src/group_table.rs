//! Short group → full group name table

use crate::identity::resolve_identity;
use crate::openapi::OpenApiDocument;
use std::collections::BTreeMap;
use tracing::debug;

/// Groups whose full name is not exposed through the group/version/kind
/// extension, either because the group is empty in the metadata (`meta`,
/// `core`) or because the serving project does not publish it.
const SEEDED_GROUPS: [(&str, &str); 7] = [
    ("apiregistration", "apiregistration.k8s.io"),
    ("apiextensions", "apiextensions.k8s.io"),
    ("certificates", "certificates.k8s.io"),
    ("flowcontrol", "flowcontrol.apiserver.k8s.io"),
    ("meta", "meta"),
    ("core", "core"),
    ("extensions", "extensions"),
];

/// Maps the short group token of a definition name to its full API group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTable {
    groups: BTreeMap<String, String>,
}

impl Default for GroupTable {
    fn default() -> Self {
        Self::seeded()
    }
}

impl GroupTable {
    /// Table holding only the fixed exceptions
    pub fn seeded() -> Self {
        Self {
            groups: SEEDED_GROUPS
                .iter()
                .map(|(short, full)| (short.to_string(), full.to_string()))
                .collect(),
        }
    }

    /// Build the table from the group/version/kind metadata of every definition.
    ///
    /// The first metadata record of the first definition seen for a group is
    /// authoritative. Seeded groups are never overwritten; definitions without
    /// usable metadata are skipped.
    pub fn build(documents: &[OpenApiDocument]) -> Self {
        let mut table = Self::seeded();

        for document in documents {
            for (name, schema) in document.schemas() {
                let Some(identity) = resolve_identity(name) else {
                    continue;
                };
                if identity.is_error() || table.groups.contains_key(&identity.group) {
                    continue;
                }

                let Some(full_group) = schema
                    .group_version_kinds()
                    .and_then(|gvks| gvks.into_iter().next())
                    .map(|gvk| gvk.group)
                else {
                    continue;
                };

                if full_group.is_empty() {
                    continue;
                }

                debug!(short = %identity.group, full = %full_group, "resolved api group");
                table.groups.insert(identity.group, full_group);
            }
        }

        table
    }

    /// Full group name, if known
    pub fn full_name(&self, short_group: &str) -> Option<&str> {
        self.groups.get(short_group).map(String::as_str)
    }

    /// Full group name, falling back to the short token
    pub fn full_name_or_short<'a>(&'a self, short_group: &'a str) -> &'a str {
        self.full_name(short_group).unwrap_or(short_group)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
