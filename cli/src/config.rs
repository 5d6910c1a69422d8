//! CLI configuration file

use anyhow::{Context, Result};
use cireg_registry::ConnectionConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Contents of the `--config` TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    /// Server the descriptors are attributed to
    pub(crate) server: ConnectionConfig,
    /// Descriptor dump (`.json`, `.yaml` or `.yml`)
    pub(crate) descriptors: Option<PathBuf>,
}

impl CliConfig {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Dump path, relative paths resolved against `base`
    pub(crate) fn descriptors_path(&self, base: Option<&Path>) -> Option<PathBuf> {
        let path = self.descriptors.as_ref()?;
        match base {
            Some(base) if path.is_relative() => Some(base.join(path)),
            _ => Some(path.clone()),
        }
    }
}
