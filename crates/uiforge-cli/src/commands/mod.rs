//! CLI command implementations.

pub mod access;
pub mod generate;
pub mod schema;
pub mod serve;

use std::path::{Path, PathBuf};

use anyhow::Context;
use uiforge_core::UiforgeConfig;

/// Load the full configuration, resolving the schema snapshot and all
/// component declarations.
pub fn load_config(config_path: &Path) -> anyhow::Result<UiforgeConfig> {
    UiforgeConfig::load_with_context(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))
}

/// Resolve a config-relative path against the config file's directory.
pub fn resolve_from_config(config_path: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        return p.to_path_buf();
    }
    match config_path.parent() {
        Some(base) => base.join(p),
        None => p.to_path_buf(),
    }
}
