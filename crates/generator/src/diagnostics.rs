//! Definition diagnostics
//!
//! Reports definitions that nothing reaches (orphans), definitions with
//! operations that the table of contents does not list, and spec documents
//! skipped while loading.

use crate::templates::{self, REPORT_TEMPLATE};
use serde::Serialize;
use tera::Context;
use tosca_typegen_common::{Definition, GeneratorError, Result};
use tosca_typegen_parser::Definitions;
use tracing::warn;

/// Definitions never reported as orphans
const ORPHAN_EXEMPT: [&str; 2] = ["meta.v1.APIVersions", "meta.v1.Patch"];

/// A definition whose operations are missing from the table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocMiss {
    pub name: String,
    pub operations: Vec<String>,
}

/// Diagnostics over a definition index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Definitions referenced by neither a field nor an operation
    pub orphans: Vec<String>,
    pub toc_missing: Vec<TocMiss>,
    /// Load failures of documents left out of the index
    pub skipped_documents: Vec<String>,
}

impl Diagnostics {
    pub fn collect(definitions: &Definitions) -> Self {
        let mut orphans: Vec<String> = definitions
            .iter()
            .filter(|d| is_orphan(d))
            .map(|d| d.name.clone())
            .collect();
        orphans.sort();

        let mut toc_missing: Vec<TocMiss> = definitions
            .iter()
            .filter(|d| is_missing_from_toc(d))
            .map(|d| TocMiss {
                name: d.name.clone(),
                operations: d.bookkeeping.operations.clone(),
            })
            .collect();
        toc_missing.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            orphans,
            toc_missing,
            skipped_documents: Vec::new(),
        }
    }

    pub fn with_skipped_documents(mut self, skipped: Vec<String>) -> Self {
        self.skipped_documents = skipped;
        self
    }

    /// No orphans; TOC misses and skipped documents never make a run unclean
    pub fn is_clean(&self) -> bool {
        self.orphans.is_empty()
    }

    /// Fail on orphaned definitions unless errors are allowed
    pub fn ensure_clean(&self, allow_errors: bool) -> Result<()> {
        if self.is_clean() {
            return Ok(());
        }
        if allow_errors {
            warn!(orphans = self.orphans.len(), "orphaned definitions found");
            return Ok(());
        }
        Err(GeneratorError::Diagnostics(format!(
            "Orphaned definitions found: {}",
            self.orphans.join(", ")
        )))
    }

    /// Render the text report
    pub fn render(&self) -> Result<String> {
        let tera = templates::load_templates()?;
        let context = Context::from_serialize(self)
            .map_err(|e| GeneratorError::Template(format!("Failed to build context: {}", e)))?;
        templates::render(&tera, REPORT_TEMPLATE, &context)
    }
}

fn is_orphan(definition: &Definition) -> bool {
    let bookkeeping = &definition.bookkeeping;
    !bookkeeping.found_in_field
        && !bookkeeping.found_in_operation
        && !ORPHAN_EXEMPT
            .iter()
            .any(|exempt| definition.name.contains(exempt))
}

fn is_missing_from_toc(definition: &Definition) -> bool {
    let bookkeeping = &definition.bookkeeping;
    !bookkeeping.in_toc
        && !bookkeeping.operations.is_empty()
        && !bookkeeping.is_old_version
        && !bookkeeping.is_inlined
}
