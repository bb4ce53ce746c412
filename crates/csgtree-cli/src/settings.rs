//! Compile settings, from an optional TOML file plus command-line overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Settings for compiling a `.scad` file to CSG.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory receiving the intermediate CSG file. Created if missing.
    pub workdir: PathBuf,
    /// OpenSCAD executable; located automatically when unset.
    pub openscad: Option<PathBuf>,
    /// Parallel compile hint. Accepted for compatibility, not used.
    pub threads: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("./workdir"),
            openscad: None,
            threads: 1,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            anyhow::bail!("threads must be at least 1");
        }
        if self.workdir.as_os_str().is_empty() {
            anyhow::bail!("workdir must not be empty");
        }
        Ok(())
    }
}
