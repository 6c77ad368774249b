//! tosca-typegen CLI
//!
//! Command-line interface for generating TOSCA data and node types from
//! Kubernetes OpenAPI definitions.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tosca_typegen_common::GeneratorConfig;
use tosca_typegen_generator::{Diagnostics, ToscaGenerator};
use tosca_typegen_parser::openapi::{DocumentSource, SpecDirectory, SpecFiles};
use tosca_typegen_parser::{load_definitions, LoadedSpecs};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tosca-typegen")]
#[command(version, about = "Generate TOSCA types from Kubernetes OpenAPI definitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate TOSCA data and node types for the configured root kinds
    #[command(after_help = "EXAMPLES:\n  \
        # Generate from a directory of api specs\n  \
        tosca-typegen generate \\\n    \
        --spec-dir ./openapi-spec \\\n    \
        --include Deployment,Service \\\n    \
        --output kubernetes-types.yaml\n\n  \
        # Use a configuration file and tolerate orphaned definitions\n  \
        tosca-typegen generate \\\n    \
        --specs swagger.json \\\n    \
        --config typegen.yaml \\\n    \
        --allow-errors")]
    Generate {
        #[command(flatten)]
        source: SpecSource,

        #[command(flatten)]
        selection: Selection,

        /// Report orphaned definitions without failing
        #[arg(long)]
        allow_errors: bool,

        /// Output YAML file
        #[arg(short, long, default_value = "tosca-types.yaml")]
        output: PathBuf,
    },

    /// Print the field tree of the configured root kinds
    #[command(after_help = "EXAMPLES:\n  \
        tosca-typegen inspect --spec-dir ./openapi-spec --include Deployment/v1/apps")]
    Inspect {
        #[command(flatten)]
        source: SpecSource,

        #[command(flatten)]
        selection: Selection,
    },

    /// Print orphaned definitions and definitions missing from the table of contents
    Report {
        #[command(flatten)]
        source: SpecSource,

        /// Generator configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Report orphaned definitions without failing
        #[arg(long)]
        allow_errors: bool,
    },
}

/// Where the api specs come from
#[derive(Args, Debug)]
struct SpecSource {
    /// Comma-separated list of spec file paths
    #[arg(short, long, value_delimiter = ',', conflicts_with = "spec_dir")]
    specs: Option<Vec<PathBuf>>,

    /// Directory searched recursively for *.json spec files
    #[arg(long, conflicts_with = "specs")]
    spec_dir: Option<PathBuf>,
}

/// Which root kinds to expand
#[derive(Args, Debug)]
struct Selection {
    /// Generator configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated root kinds (`Kind` or `Kind/version/group`), overriding the config
    #[arg(short, long, value_delimiter = ',')]
    include: Option<Vec<String>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        println!("{} Verbose mode enabled", "→".cyan());
    }

    match cli.command {
        Commands::Generate {
            source,
            selection,
            allow_errors,
            output,
        } => {
            let config = load_config(selection.config.as_deref(), selection.include, allow_errors)?;
            generate_command(&source, config, output.as_path(), cli.verbose)?;
        }
        Commands::Inspect { source, selection } => {
            let config = load_config(selection.config.as_deref(), selection.include, false)?;
            inspect_command(&source, config)?;
        }
        Commands::Report {
            source,
            config,
            allow_errors,
        } => {
            let config = load_config(config.as_deref(), None, allow_errors)?;
            report_command(&source, config)?;
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the configuration file, if any, and apply command-line overrides
fn load_config(
    path: Option<&Path>,
    include: Option<Vec<String>>,
    allow_errors: bool,
) -> Result<GeneratorConfig> {
    let mut config = match path {
        Some(path) => {
            println!("{} Loading config: {}", "→".cyan(), path.display());
            GeneratorConfig::load(path).context("Failed to load generator config")?
        }
        None => GeneratorConfig::default(),
    };

    if let Some(include) = include {
        config.included_objects = include;
    }
    config.allow_errors |= allow_errors;

    Ok(config)
}

fn document_source(source: &SpecSource) -> Result<Box<dyn DocumentSource>> {
    match (&source.specs, &source.spec_dir) {
        (Some(specs), _) => Ok(Box::new(SpecFiles::new(specs.clone()))),
        (None, Some(dir)) => {
            if !dir.is_dir() {
                bail!("Spec directory does not exist: {}", dir.display());
            }
            Ok(Box::new(SpecDirectory::new(dir)))
        }
        (None, None) => bail!("Either --specs or --spec-dir must be provided"),
    }
}

fn load_specs(source: &SpecSource, allow_errors: bool) -> Result<LoadedSpecs> {
    println!("{} Loading api specs...", "→".cyan());
    let documents = document_source(source)?;
    let loaded =
        load_definitions(documents.as_ref(), allow_errors).context("Failed to load api specs")?;

    println!(
        "{} Indexed {} definitions from {} documents{}",
        "✓".green(),
        loaded.definitions.len(),
        loaded.document_count,
        loaded
            .title
            .as_deref()
            .map(|t| format!(" ({})", t.yellow()))
            .unwrap_or_default()
    );
    for skipped in &loaded.skipped {
        println!("{} Skipped: {}", "!".yellow(), skipped);
    }
    Ok(loaded)
}

fn generate_command(
    source: &SpecSource,
    config: GeneratorConfig,
    output: &Path,
    verbose: bool,
) -> Result<()> {
    if config.included_objects.is_empty() {
        bail!("No root kinds to generate; use --include or included_objects in the config");
    }

    let loaded = load_specs(source, config.allow_errors)?;

    if verbose {
        println!("  Roots: {}", config.included_objects.join(", "));
        println!("  TOSCA version: {}", config.tosca_version);
        println!("  Output: {}", output.display());
    }

    println!("{} Building TOSCA types...", "→".cyan());
    let generator = ToscaGenerator::new(loaded.definitions, config)
        .with_skipped_documents(loaded.skipped);
    let generation = generator
        .generate_to_file(output)
        .context("Failed to generate TOSCA types")?;

    print_diagnostics_summary(&generation.diagnostics);
    for entry in &generation.unmatched_toc {
        println!("{} TOC entry matches no definition: {}", "!".yellow(), entry);
    }

    println!("\n{}", "✓ Generation complete!".green().bold());
    println!("  Data types: {}", generation.types.data_types.len());
    println!("  Node types: {}", generation.types.node_types.len());
    println!("  📄 {}", output.display());

    if verbose {
        println!("\n{}", "Node types:".bold());
        for name in generation.types.node_types.keys() {
            println!("  • {}", name.cyan());
        }
    }

    Ok(())
}

fn inspect_command(source: &SpecSource, config: GeneratorConfig) -> Result<()> {
    if config.included_objects.is_empty() {
        bail!("No root kinds to inspect; use --include or included_objects in the config");
    }

    let loaded = load_specs(source, config.allow_errors)?;
    let generator = ToscaGenerator::new(loaded.definitions, config);
    let trees = generator
        .render_trees()
        .context("Failed to render definition trees")?;

    println!();
    print!("{}", trees);
    Ok(())
}

fn report_command(source: &SpecSource, config: GeneratorConfig) -> Result<()> {
    let allow_errors = config.allow_errors;
    let loaded = load_specs(source, allow_errors)?;
    let generator = ToscaGenerator::new(loaded.definitions, config)
        .with_skipped_documents(loaded.skipped);
    let diagnostics = generator.diagnostics();

    println!();
    print!("{}", diagnostics.render().context("Failed to render report")?);
    diagnostics.ensure_clean(allow_errors)?;

    println!("\n{}", "✓ Report complete".green().bold());
    Ok(())
}

fn print_diagnostics_summary(diagnostics: &Diagnostics) {
    if !diagnostics.orphans.is_empty() {
        println!(
            "{} {} orphaned definitions (run `report` for details)",
            "!".yellow(),
            diagnostics.orphans.len()
        );
    }
    if !diagnostics.toc_missing.is_empty() {
        println!(
            "{} {} definitions with operations missing from the table of contents",
            "!".yellow(),
            diagnostics.toc_missing.len()
        );
    }
    if !diagnostics.skipped_documents.is_empty() {
        println!(
            "{} {} spec documents skipped",
            "!".yellow(),
            diagnostics.skipped_documents.len()
        );
    }
}
