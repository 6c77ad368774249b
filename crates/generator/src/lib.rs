//! TOSCA type generation from indexed Kubernetes definitions
//!
//! This crate expands root kinds into a TOSCA type graph and produces the
//! text reports that accompany a run: orphan/TOC diagnostics and field trees.

mod diagnostics;
mod graph;
mod templates;
mod tree;

pub use diagnostics::{Diagnostics, TocMiss};
pub use graph::{
    GraphBuilder, CREATE_OPERATION, DEFINITION_PROPERTY, HOST_REQUIREMENT, STANDARD_INTERFACE,
};
pub use tree::{render_trees, DefinitionTree, TreeLine, TreeRoot};

use std::path::Path;
use tosca_typegen_common::{GeneratorConfig, GeneratorError, Result, ToscaTypes};
use tosca_typegen_parser::Definitions;
use tracing::{info, warn};

/// Result of a full generation run
#[derive(Debug, Clone)]
pub struct Generation {
    pub types: ToscaTypes,
    pub diagnostics: Diagnostics,
    /// TOC entries that matched no definition
    pub unmatched_toc: Vec<String>,
}

/// Runs diagnostics and graph building for one configuration
pub struct ToscaGenerator {
    definitions: Definitions,
    config: GeneratorConfig,
    unmatched_toc: Vec<String>,
    skipped_documents: Vec<String>,
}

impl ToscaGenerator {
    /// Create a generator, marking the configured table of contents
    pub fn new(mut definitions: Definitions, config: GeneratorConfig) -> Self {
        let unmatched_toc = definitions.mark_toc(&config.toc);
        for entry in &unmatched_toc {
            warn!(entry = %entry, "table of contents entry matches no definition");
        }
        Self {
            definitions,
            config,
            unmatched_toc,
            skipped_documents: Vec::new(),
        }
    }

    /// Documents skipped while loading, listed in the diagnostics
    pub fn with_skipped_documents(mut self, skipped: Vec<String>) -> Self {
        self.skipped_documents = skipped;
        self
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// TOC entries that matched no definition
    pub fn unmatched_toc(&self) -> &[String] {
        &self.unmatched_toc
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::collect(&self.definitions)
            .with_skipped_documents(self.skipped_documents.clone())
    }

    /// Check diagnostics, then build the graph for the configured roots
    pub fn generate(&self) -> Result<Generation> {
        if self.config.included_objects.is_empty() {
            return Err(GeneratorError::Config(
                "No root kinds configured in included_objects".to_string(),
            ));
        }

        let diagnostics = self.diagnostics();
        for miss in &diagnostics.toc_missing {
            warn!(definition = %miss.name, "operations missing from table of contents");
        }
        diagnostics.ensure_clean(self.config.allow_errors)?;

        let types = GraphBuilder::from_config(&self.definitions, &self.config)
            .build(self.config.included_objects.as_slice())?;

        Ok(Generation {
            types,
            diagnostics,
            unmatched_toc: self.unmatched_toc.clone(),
        })
    }

    /// Generate and write the YAML document to `output`
    pub fn generate_to_file(&self, output: &Path) -> Result<Generation> {
        let generation = self.generate()?;
        generation.types.write_to(output).map_err(|e| {
            GeneratorError::Generation(format!("Failed to write {}: {}", output.display(), e))
        })?;
        info!(path = %output.display(), "wrote tosca types");
        Ok(generation)
    }

    /// Field trees of the configured roots
    pub fn render_trees(&self) -> Result<String> {
        render_trees(self.config.included_objects.as_slice(), &self.definitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tosca_typegen_common::{Bookkeeping, Definition, Field, TypeIdentity};

    fn definition(kind: &str, fields: Vec<Field>, bookkeeping: Bookkeeping) -> Definition {
        Definition {
            name: format!("io.k8s.api.batch.v1.{}", kind),
            identity: TypeIdentity::new("batch", "v1", kind),
            full_group_name: "batch".to_string(),
            raw_description: String::new(),
            required_fields: vec![],
            base_type: "object".to_string(),
            fields,
            bookkeeping,
        }
    }

    fn index(with_orphan: bool) -> Definitions {
        let mut defs = Definitions::new();
        defs.insert(definition(
            "Job",
            vec![Field {
                name: "parallelism".to_string(),
                declared_type: "integer".to_string(),
                required: false,
                description: String::new(),
                reference: None,
            }],
            Bookkeeping {
                found_in_operation: true,
                operations: vec!["createBatchV1NamespacedJob".to_string()],
                ..Bookkeeping::default()
            },
        ));
        if with_orphan {
            defs.insert(definition("Leftover", vec![], Bookkeeping::default()));
        }
        defs
    }

    fn config(roots: &[&str]) -> GeneratorConfig {
        GeneratorConfig {
            included_objects: roots.iter().map(|r| r.to_string()).collect(),
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_generate() {
        let generator = ToscaGenerator::new(index(false), config(&["Job"]));
        let generation = generator.generate().unwrap();
        assert!(generation
            .types
            .has_node_type("sodalite.nodes.Kubernetes.Kind.Job"));
        assert_eq!(generation.diagnostics.toc_missing.len(), 1);
    }

    #[test]
    fn test_toc_marking() {
        let mut cfg = config(&["Job"]);
        cfg.toc = vec!["Job/v1/batch".to_string(), "CronJob".to_string()];

        let generator = ToscaGenerator::new(index(false), cfg);
        assert_eq!(generator.unmatched_toc().to_vec(), vec!["CronJob"]);
        assert!(generator.definitions().lookup("Job").unwrap().bookkeeping.in_toc);

        let generation = generator.generate().unwrap();
        assert!(generation.diagnostics.toc_missing.is_empty());
        assert_eq!(generation.unmatched_toc, vec!["CronJob"]);
    }

    #[test]
    fn test_skipped_documents_reach_diagnostics() {
        let generator = ToscaGenerator::new(index(false), config(&["Job"]))
            .with_skipped_documents(vec!["Could not load b_broken.json".to_string()]);

        let generation = generator.generate().unwrap();
        assert_eq!(
            generation.diagnostics.skipped_documents,
            vec!["Could not load b_broken.json"]
        );
    }

    #[test]
    fn test_orphans_block_generation() {
        let generator = ToscaGenerator::new(index(true), config(&["Job"]));
        assert!(matches!(
            generator.generate(),
            Err(GeneratorError::Diagnostics(_))
        ));

        let mut cfg = config(&["Job"]);
        cfg.allow_errors = true;
        let generation = ToscaGenerator::new(index(true), cfg).generate().unwrap();
        assert_eq!(generation.diagnostics.orphans.len(), 1);
    }

    #[test]
    fn test_no_roots_configured() {
        let generator = ToscaGenerator::new(index(false), config(&[]));
        assert!(matches!(generator.generate(), Err(GeneratorError::Config(_))));
    }

    #[test]
    fn test_generate_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("kubernetes.yaml");

        ToscaGenerator::new(index(false), config(&["Job"]))
            .generate_to_file(&output)
            .unwrap();

        let yaml = std::fs::read_to_string(&output).unwrap();
        assert!(yaml.starts_with("tosca_definitions_version: tosca_simple_yaml_1_3"));
        assert!(yaml.contains("sodalite.datatypes.Kubernetes.Kind.Job:"));
    }
}
