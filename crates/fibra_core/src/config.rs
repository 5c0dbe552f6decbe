//! Renderer configuration

use serde::{Deserialize, Serialize};

use crate::error::{FibraError, Result};
use crate::props::DEFAULT_EVENT_PREFIX;

/// Configuration for a renderer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Prefix marking event-handler props (`"on"` makes `onClick` a click
    /// handler)
    pub event_prefix: String,

    /// Maximum number of state updates processed in one flush before the rest
    /// are dropped
    pub max_update_depth: usize,

    /// Reuse host nodes for same-typed elements across passes. When false,
    /// every host element is rebuilt on each pass; component hook state is
    /// kept either way.
    pub reuse_host_nodes: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl RendererConfig {
    /// Standard configuration
    pub fn standard() -> Self {
        Self {
            event_prefix: DEFAULT_EVENT_PREFIX.to_string(),
            max_update_depth: 100,
            reuse_host_nodes: true,
        }
    }

    /// Configuration for tests: a low update limit so runaway loops fail fast
    pub fn testing() -> Self {
        Self {
            max_update_depth: 25,
            ..Self::standard()
        }
    }

    /// Always rebuild host nodes
    pub fn rebuild() -> Self {
        Self {
            reuse_host_nodes: false,
            ..Self::standard()
        }
    }

    pub fn with_event_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.event_prefix = prefix.into();
        self
    }

    pub fn with_max_update_depth(mut self, depth: usize) -> Self {
        self.max_update_depth = depth;
        self
    }

    pub fn with_reuse_host_nodes(mut self, reuse: bool) -> Self {
        self.reuse_host_nodes = reuse;
        self
    }

    /// Check the values a renderer cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.event_prefix.is_empty() {
            return Err(FibraError::Config("event_prefix must not be empty".into()));
        }
        if self.max_update_depth == 0 {
            return Err(FibraError::Config(
                "max_update_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let standard = RendererConfig::standard();
        assert_eq!(standard.event_prefix, "on");
        assert_eq!(standard.max_update_depth, 100);
        assert!(standard.reuse_host_nodes);
        assert_eq!(RendererConfig::default(), standard);

        assert!(RendererConfig::testing().max_update_depth < standard.max_update_depth);
        assert!(!RendererConfig::rebuild().reuse_host_nodes);
    }

    #[test]
    fn test_builders() {
        let config = RendererConfig::standard()
            .with_event_prefix("handle")
            .with_max_update_depth(3)
            .with_reuse_host_nodes(false);
        assert_eq!(config.event_prefix, "handle");
        assert_eq!(config.max_update_depth, 3);
        assert!(!config.reuse_host_nodes);
    }

    #[test]
    fn test_validate() {
        assert!(RendererConfig::standard().validate().is_ok());
        assert!(RendererConfig::standard()
            .with_event_prefix("")
            .validate()
            .is_err());
        assert!(matches!(
            RendererConfig::standard().with_max_update_depth(0).validate(),
            Err(FibraError::Config(_))
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: RendererConfig = toml::from_str("max_update_depth = 7").unwrap();
        assert_eq!(config.max_update_depth, 7);
        assert_eq!(config.event_prefix, "on");
        assert!(config.reuse_host_nodes);
    }
}
