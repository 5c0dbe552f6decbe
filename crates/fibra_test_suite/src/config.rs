//! Scenario runner configuration (`fibra-scenarios.toml`)

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use fibra_core::RendererConfig;
use serde::{Deserialize, Serialize};

/// Top-level configuration file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Renderer settings applied to every scenario
    pub renderer: RendererConfig,
}

impl SuiteConfig {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: SuiteConfig = toml::from_str(content)?;
        config.renderer.validate()?;
        Ok(config)
    }
}
