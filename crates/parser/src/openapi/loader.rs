//! Document sources
//!
//! The definition index only needs a list of parsed documents; where they
//! come from is behind the [`DocumentSource`] trait.

use super::parser::OpenApiParser;
use super::types::OpenApiDocument;
use std::path::{Path, PathBuf};
use tosca_typegen_common::{GeneratorError, Result};
use tracing::debug;
use walkdir::WalkDir;

/// Provides the OpenAPI documents for one generation run
#[cfg_attr(test, mockall::automock)]
pub trait DocumentSource {
    /// Parse every document of the source.
    ///
    /// The outer error means the source itself could not be listed. Each
    /// inner error is one document that failed to load, wrapped with its path.
    fn documents(&self) -> Result<Vec<Result<OpenApiDocument>>>;

    /// Every document, failing on the first one that does not load
    fn load(&self) -> Result<Vec<OpenApiDocument>> {
        self.documents()?.into_iter().collect()
    }
}

fn parse(path: &Path) -> Result<OpenApiDocument> {
    debug!(path = %path.display(), "loading api spec");
    OpenApiParser::from_file(path).map(OpenApiParser::into_document)
}

/// Every `*.json` file below a directory, in file name order
#[derive(Debug, Clone)]
pub struct SpecDirectory {
    root: PathBuf,
}

impl SpecDirectory {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths of the spec files that would be loaded
    pub fn spec_paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&self.root).to_path_buf();
                GeneratorError::from(std::io::Error::from(e)).in_document(path)
            })?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|e| e.to_str()) == Some("json")
            {
                paths.push(entry.into_path());
            }
        }
        Ok(paths)
    }
}

impl DocumentSource for SpecDirectory {
    fn documents(&self) -> Result<Vec<Result<OpenApiDocument>>> {
        Ok(self.spec_paths()?.iter().map(|path| parse(path)).collect())
    }
}

/// A fixed list of spec files, loaded in the given order
#[derive(Debug, Clone)]
pub struct SpecFiles {
    paths: Vec<PathBuf>,
}

impl SpecFiles {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl DocumentSource for SpecFiles {
    fn documents(&self) -> Result<Vec<Result<OpenApiDocument>>> {
        Ok(self.paths.iter().map(|path| parse(path)).collect())
    }
}
