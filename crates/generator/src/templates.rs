//! Template loading for the text reports

use std::collections::HashMap;
use tera::{Context, Tera, Value};
use tosca_typegen_common::{GeneratorError, Result};

pub const REPORT_TEMPLATE: &str = "report.txt";
pub const TREE_TEMPLATE: &str = "tree.txt";

/// Spaces per tree level
const INDENT_WIDTH: usize = 2;

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.register_filter("pad", pad_filter);

    tera.add_raw_template(REPORT_TEMPLATE, include_str!("../templates/report.txt.tera"))
        .map_err(|e| {
            GeneratorError::Template(format!("Failed to load report template: {}", e))
        })?;

    tera.add_raw_template(TREE_TEMPLATE, include_str!("../templates/tree.txt.tera"))
        .map_err(|e| GeneratorError::Template(format!("Failed to load tree template: {}", e)))?;

    Ok(tera)
}

/// Render a loaded template
pub fn render(tera: &Tera, name: &str, context: &Context) -> Result<String> {
    tera.render(name, context)
        .map_err(|e| GeneratorError::Template(format!("Failed to render {}: {:?}", name, e)))
}

/// Filter turning a tree depth into leading spaces
fn pad_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let depth = value
        .as_u64()
        .ok_or_else(|| tera::Error::msg("pad filter expects a non-negative integer"))?;

    Ok(Value::String(" ".repeat(depth as usize * INDENT_WIDTH)))
}
