//! CLI configuration
//!
//! Values come from an optional TOML file, then `UMBRA_*` environment
//! variables, falling back to the defaults below.

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use umbra_types::namehash;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Network name used in deploy history file names
    pub network: String,
    /// Name whose children the registrar hands out
    pub parent_name: String,
    pub deploy_history_dir: PathBuf,
    pub log_level: String,
    /// `pretty` or `json`
    pub log_format: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            network: "local".to_string(),
            parent_name: "umbra.eth".to_string(),
            deploy_history_dir: PathBuf::from("deploy-history"),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                bail!(
                    "Configuration file {} not found (specified via --config)",
                    path.display()
                );
            }
            builder = builder.add_source(ConfigFile::from(path));
        }

        builder = builder.add_source(Environment::with_prefix("UMBRA"));

        let config: CliConfig = builder
            .build()?
            .try_deserialize()
            .context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.network.trim().is_empty() {
            bail!("network must not be empty");
        }
        if self.parent_name.is_empty() {
            bail!("parent_name must not be empty");
        }
        namehash(&self.parent_name)
            .with_context(|| format!("invalid parent_name {:?}", self.parent_name))?;
        if !matches!(self.log_format.as_str(), "pretty" | "json") {
            bail!(
                "log_format must be \"pretty\" or \"json\", got {:?}",
                self.log_format
            );
        }
        Ok(())
    }
}
