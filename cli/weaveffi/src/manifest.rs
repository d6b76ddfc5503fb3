//! `weaveffi.toml` manifest parsing and project configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File name searched for by [`WeaveManifest::find_and_load`].
pub const MANIFEST_FILE: &str = "weaveffi.toml";

/// Default IDL file, relative to the project directory.
pub const DEFAULT_INPUT: &str = "api.toml";

/// Default output directory, relative to the project directory.
pub const DEFAULT_OUT_DIR: &str = "generated";

/// The top-level manifest structure for a WeaveFFI project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaveManifest {
    /// Project metadata (required).
    pub project: ProjectConfig,
    #[serde(default)]
    pub api: Option<ApiConfig>,
    #[serde(default)]
    pub generate: Option<GenerateConfig>,
}

/// Project metadata section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// `[api]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// IDL file path, relative to the manifest.
    #[serde(default)]
    pub input: Option<String>,
}

/// `[generate]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Output directory, relative to the manifest.
    #[serde(default)]
    pub out: Option<String>,
    /// Targets to run when none are given on the command line.
    #[serde(default)]
    pub targets: Vec<String>,
}

impl WeaveManifest {
    /// Search upward from `start_dir` for a `weaveffi.toml`, returning it with
    /// the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest = Self::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing weaveffi.toml")
    }

    pub fn input(&self) -> Option<&str> {
        self.api.as_ref().and_then(|a| a.input.as_deref())
    }

    pub fn out_dir(&self) -> Option<&str> {
        self.generate.as_ref().and_then(|g| g.out.as_deref())
    }

    /// Targets listed in `[generate]`, empty when unset.
    pub fn targets(&self) -> &[String] {
        self.generate
            .as_ref()
            .map(|g| g.targets.as_slice())
            .unwrap_or(&[])
    }

    /// Default template for `weaveffi new`.
    pub fn template(name: &str) -> String {
        format!(
            r#"[project]
name = "{name}"
version = "0.1.0"

[api]
input = "{DEFAULT_INPUT}"

[generate]
out = "{DEFAULT_OUT_DIR}"
targets = ["c", "swift", "node", "android", "wasm"]
"#
        )
    }
}
