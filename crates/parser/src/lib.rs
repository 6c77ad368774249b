//! OpenAPI parsing for Kubernetes-style API definitions
//!
//! This crate turns a set of OpenAPI documents into a read-only
//! [`Definitions`] index that the TOSCA generator walks.
//!
//! ## Loading Strategy
//!
//! 1. Every document is parsed (`openapi`).
//! 2. The short → full group table is built from the
//!    `x-kubernetes-group-version-kind` metadata (`GroupTable`).
//! 3. Each definition name is resolved to `(group, version, kind)` and the
//!    schema is indexed with its fields, required list and base type.
//! 4. Field references, old versions and operations are recorded for the
//!    diagnostics report.

mod group_table;
mod identity;
mod index;
pub mod openapi;
mod type_mapper;
mod version;

pub use group_table::GroupTable;
pub use identity::{resolve_identity, CORE_GROUP, META_GROUP, RESOURCE_VERSION};
pub use index::Definitions;
pub use type_mapper::{
    FieldClass, TypeMapper, ARRAY_SEPARATOR, SPEC_ARRAY, SPEC_OBJECT, TOSCA_LIST, TOSCA_MAP,
};
pub use version::compare_versions;

use openapi::{DocumentSource, OpenApiDocument};
use tosca_typegen_common::Result;
use tracing::{info, warn};

/// Definitions loaded from one document source
#[derive(Debug, Clone)]
pub struct LoadedSpecs {
    pub definitions: Definitions,
    pub groups: GroupTable,
    /// Title of the last loaded document
    pub title: Option<String>,
    pub document_count: usize,
    /// Load failures of documents skipped under `allow_errors`
    pub skipped: Vec<String>,
}

/// Index the definitions of every document in a source.
///
/// A document that fails to load aborts the run unless `allow_errors` is
/// set, in which case it is skipped and listed in [`LoadedSpecs::skipped`].
pub fn load_definitions<S: DocumentSource + ?Sized>(
    source: &S,
    allow_errors: bool,
) -> Result<LoadedSpecs> {
    let mut documents = Vec::new();
    let mut skipped = Vec::new();

    for document in source.documents()? {
        match document {
            Ok(document) => documents.push(document),
            Err(err) if allow_errors => {
                warn!(error = %err, "skipping api spec");
                skipped.push(err.to_string());
            }
            Err(err) => return Err(err),
        }
    }

    let mut loaded = index_documents(&documents)?;
    loaded.skipped = skipped;
    Ok(loaded)
}

/// Index the definitions of already parsed documents
pub fn index_documents(documents: &[OpenApiDocument]) -> Result<LoadedSpecs> {
    let groups = GroupTable::build(documents);
    let definitions = Definitions::load(documents, &groups)?;
    let title = spec_title(documents).map(str::to_string);

    info!(
        documents = documents.len(),
        title = title.as_deref().unwrap_or(""),
        "loaded api specs"
    );

    Ok(LoadedSpecs {
        definitions,
        groups,
        title,
        document_count: documents.len(),
        skipped: Vec::new(),
    })
}

/// Title of the last document declaring one
pub fn spec_title(documents: &[OpenApiDocument]) -> Option<&str> {
    documents
        .iter()
        .rev()
        .map(|d| d.info.title.as_str())
        .find(|t| !t.is_empty())
}
