//! Field tree of a root definition, used by `inspect`

use crate::templates::{self, TREE_TEMPLATE};
use serde::Serialize;
use std::collections::BTreeSet;
use tera::{Context, Tera};
use tosca_typegen_common::{Definition, GeneratorError, Result, TypeIdentity};
use tosca_typegen_parser::{Definitions, FieldClass, TypeMapper};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeRoot {
    pub name: String,
    pub selector: String,
    pub required_fields: Vec<String>,
}

/// One field in the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeLine {
    pub depth: usize,
    pub name: String,
    pub field_type: String,
    pub complex: bool,
    pub required: bool,
    pub note: Option<String>,
}

/// Fields of a definition, expanded through its references
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionTree {
    pub root: TreeRoot,
    pub lines: Vec<TreeLine>,
}

impl DefinitionTree {
    /// Walk `root` depth first. Each referenced definition is expanded once;
    /// later references are noted instead.
    pub fn build(root: &Definition, definitions: &Definitions) -> Result<Self> {
        let mut tree = Self {
            root: TreeRoot {
                name: root.name.clone(),
                selector: root.identity.to_string(),
                required_fields: root.required_fields.clone(),
            },
            lines: Vec::new(),
        };
        let mut visited = BTreeSet::new();
        visited.insert(root.identity.clone());
        tree.walk(root, definitions, 0, &mut visited)?;
        Ok(tree)
    }

    fn walk(
        &mut self,
        definition: &Definition,
        definitions: &Definitions,
        depth: usize,
        visited: &mut BTreeSet<TypeIdentity>,
    ) -> Result<()> {
        for field in &definition.fields {
            let class = TypeMapper::classify(field, definitions)?;
            let target = match class {
                FieldClass::Reference { definition, .. } => Some(definition),
                _ => None,
            };

            let note = target.and_then(|t| {
                if t.is_wrapper() {
                    Some(format!(
                        "{} has no fields. Data type derived from {}",
                        t.kind(),
                        t.base_type
                    ))
                } else if visited.contains(&t.identity) {
                    Some(format!("{} expanded above", t.kind()))
                } else {
                    None
                }
            });

            self.lines.push(TreeLine {
                depth,
                name: field.name.clone(),
                field_type: field.declared_type.clone(),
                complex: target.is_some(),
                required: field.required,
                note,
            });

            if let Some(target) = target {
                if !target.is_wrapper() && visited.insert(target.identity.clone()) {
                    self.walk(target, definitions, depth + 1, visited)?;
                }
            }
        }
        Ok(())
    }

    pub fn render(&self, tera: &Tera) -> Result<String> {
        let context = Context::from_serialize(self)
            .map_err(|e| GeneratorError::Template(format!("Failed to build context: {}", e)))?;
        templates::render(tera, TREE_TEMPLATE, &context)
    }
}

/// Render the trees of several roots, separated by blank lines
pub fn render_trees<S: AsRef<str>>(roots: &[S], definitions: &Definitions) -> Result<String> {
    let tera = templates::load_templates()?;
    let mut out = Vec::new();

    for selector in roots {
        let selector = selector.as_ref();
        let root = definitions
            .lookup(selector)
            .ok_or_else(|| GeneratorError::UnknownKind(selector.to_string()))?;
        out.push(DefinitionTree::build(root, definitions)?.render(&tera)?);
    }

    Ok(out.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tosca_typegen_common::{Bookkeeping, Field};

    fn definition(kind: &str, base_type: &str, fields: Vec<Field>) -> Definition {
        Definition {
            name: format!("io.k8s.api.core.v1.{}", kind),
            identity: TypeIdentity::new("core", "v1", kind),
            full_group_name: "core".to_string(),
            raw_description: String::new(),
            required_fields: vec!["apiVersion".to_string(), "kind".to_string()],
            base_type: base_type.to_string(),
            fields,
            bookkeeping: Bookkeeping::default(),
        }
    }

    fn field(name: &str, declared_type: &str, reference: Option<&str>, required: bool) -> Field {
        Field {
            name: name.to_string(),
            declared_type: declared_type.to_string(),
            required,
            description: String::new(),
            reference: reference.map(|kind| TypeIdentity::new("core", "v1", kind)),
        }
    }

    fn index() -> Definitions {
        let mut defs = Definitions::new();
        defs.insert(definition(
            "Node",
            "object",
            vec![
                field("name", "string", None, true),
                field("children", "Node array", Some("Node"), false),
                field("spec", "NodeSpec", Some("NodeSpec"), false),
            ],
        ));
        defs.insert(definition(
            "NodeSpec",
            "object",
            vec![
                field("capacity", "Quantity", Some("Quantity"), false),
                field("parent", "Node", Some("Node"), false),
            ],
        ));
        defs.insert(definition("Quantity", "string", vec![]));
        defs
    }

    #[test]
    fn test_tree_expands_each_definition_once() {
        let defs = index();
        let tree = DefinitionTree::build(defs.lookup("Node").unwrap(), &defs).unwrap();

        let names: Vec<_> = tree
            .lines
            .iter()
            .map(|l| (l.depth, l.name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                (0, "name"),
                (0, "children"),
                (0, "spec"),
                (1, "capacity"),
                (1, "parent"),
            ]
        );

        assert_eq!(tree.lines[1].note.as_deref(), Some("Node expanded above"));
        assert_eq!(
            tree.lines[3].note.as_deref(),
            Some("Quantity has no fields. Data type derived from string")
        );
        assert!(tree.lines[0].required);
        assert!(!tree.lines[0].complex);
        assert!(tree.lines[2].complex);
    }

    #[test]
    fn test_render_trees() {
        let defs = index();
        let text = render_trees(&["Node"], &defs).unwrap();
        assert!(text.starts_with("[io.k8s.api.core.v1.Node] Node/v1/core"));
        assert!(text.contains("  capacity: Quantity complex=true required=false"));
        assert!(text.contains("required fields: apiVersion, kind"));
    }

    #[test]
    fn test_render_unknown_root() {
        let defs = index();
        assert!(matches!(
            render_trees(&["Pod"], &defs),
            Err(GeneratorError::UnknownKind(_))
        ));
    }
}
