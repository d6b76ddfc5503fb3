//! Generator trait and orchestration.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use weaveffi_ir::Api;

use crate::error::{CodegenError, Result};
use crate::validate::validate_api;

/// A target-language binding generator.
pub trait Generator {
    /// Short target name, also used as the output subdirectory.
    fn name(&self) -> &'static str;

    /// Write bindings for `api` under `out_dir`, returning the files written.
    fn generate(&self, api: &Api, out_dir: &Path) -> Result<Vec<PathBuf>>;
}

/// Files written by each generator during one run.
#[derive(Debug, Default, Clone)]
pub struct GenerationReport {
    pub outputs: Vec<(&'static str, Vec<PathBuf>)>,
}

impl GenerationReport {
    pub fn file_count(&self) -> usize {
        self.outputs.iter().map(|(_, files)| files.len()).sum()
    }
}

/// Runs a list of generators over a validated API.
#[derive(Default)]
pub struct Orchestrator<'a> {
    generators: Vec<&'a dyn Generator>,
}

impl<'a> Orchestrator<'a> {
    pub fn new() -> Self {
        Self {
            generators: Vec::new(),
        }
    }

    pub fn with_generator(mut self, generator: &'a dyn Generator) -> Self {
        self.generators.push(generator);
        self
    }

    /// Names of the registered generators, in run order.
    pub fn generator_names(&self) -> Vec<&'static str> {
        self.generators.iter().map(|g| g.name()).collect()
    }

    /// Validate `api`, then run every generator in registration order.
    ///
    /// Stops at the first failing generator; files already written by earlier
    /// generators are left in place.
    pub fn run(&self, api: &Api, out_dir: &Path) -> Result<GenerationReport> {
        validate_api(api)?;
        let mut report = GenerationReport::default();
        for g in &self.generators {
            info!(generator = g.name(), out_dir = %out_dir.display(), "running generator");
            let files = g.generate(api, out_dir)?;
            report.outputs.push((g.name(), files));
        }
        Ok(report)
    }
}

/// Write `contents` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, contents: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| CodegenError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, contents).map_err(|source| CodegenError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = contents.len(), "file written");
    Ok(path.to_path_buf())
}
