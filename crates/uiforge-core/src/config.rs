//! Configuration loading for uiforge.
//!
//! Configuration is split across YAML files and combined at load time:
//!
//! - **uiforge.yaml**: main configuration with frontend directories,
//!   server settings, and references to the other files
//! - **schema/schema.yaml**: model schema snapshot (see
//!   `uiforge schema snapshot`)
//! - **components/*.yaml**: one component declaration per file
//!
//! Declarations are resolved against the schema snapshot once at
//! startup; the resulting registry is passed explicitly to the
//! aggregator, the endpoint factory, and the regeneration pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::actions::ActionOptions;
use crate::component::{ComponentDescriptor, ComponentKind, FieldOptions, UiFramework};
use crate::schema::SchemaDefinition;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Dev server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the REST server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// A component declaration as written in YAML, before resolution
/// against the schema snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDeclaration {
    /// Concrete component name (artifact file stem).
    pub name: String,

    /// Name of the model the component is bound to.
    pub model: String,

    /// Target UI framework.
    #[serde(default = "default_framework")]
    pub framework: UiFramework,

    /// Component shape and shape-specific options (`kind: table` or
    /// `kind: entry`, options inline).
    #[serde(flatten)]
    pub kind: ComponentKind,

    /// Field configuration.
    #[serde(default)]
    pub fields: Vec<FieldOptions>,

    /// Role-gated item actions.
    #[serde(default)]
    pub actions: Vec<ActionOptions>,

    /// Whether to emit basic styling.
    #[serde(default = "default_styling")]
    pub styling: bool,
}

fn default_framework() -> UiFramework {
    UiFramework::Vue
}

fn default_styling() -> bool {
    true
}

impl ComponentDeclaration {
    /// Load a declaration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        serde_yaml::from_str(&content).map_err(ConfigError::from)
    }

    /// Resolve the declaration against a schema snapshot into a full
    /// descriptor. Fails on unknown models or field names.
    pub fn resolve(&self, schema: &SchemaDefinition) -> Result<ComponentDescriptor, ConfigError> {
        let model = schema.get_model(&self.model).ok_or_else(|| {
            ConfigError::Config(format!(
                "Component '{}' references unknown model '{}'",
                self.name, self.model
            ))
        })?;

        let mut descriptor = ComponentDescriptor::build(
            self.name.clone(),
            self.framework,
            model,
            self.kind.clone(),
            self.fields.clone(),
            self.actions.clone(),
        )
        .map_err(|e| ConfigError::Config(e.to_string()))?;
        descriptor.styling = self.styling;
        Ok(descriptor)
    }
}

/// Complete uiforge configuration loaded from files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiforgeConfig {
    /// Project name.
    #[serde(default)]
    pub project: Option<String>,

    /// Configuration version.
    #[serde(default)]
    pub version: Option<String>,

    /// Path to the schema snapshot file.
    #[serde(default = "default_schema_file")]
    pub schema_file: PathBuf,

    /// Directory containing component declaration files.
    #[serde(default)]
    pub components_dir: Option<PathBuf>,

    /// Individual component declaration files.
    #[serde(default)]
    pub component_files: Vec<PathBuf>,

    /// Inline component declarations.
    #[serde(default)]
    pub components: Vec<ComponentDeclaration>,

    /// Frontend project directory per UI framework. Artifacts are
    /// written below `<dir>/src/components/`.
    #[serde(default)]
    pub frontends: HashMap<UiFramework, PathBuf>,

    /// Dev server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Schema snapshot, populated by `load_with_context`.
    #[serde(skip)]
    pub schema: SchemaDefinition,
}

fn default_schema_file() -> PathBuf {
    PathBuf::from("schema/schema.yaml")
}

impl UiforgeConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration and resolve all external references: the
    /// schema snapshot and component declarations from
    /// `components_dir` and `component_files`.
    pub fn load_with_context(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::from_file(path)?;

        let base_dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let schema_path = resolve_path(&base_dir, &config.schema_file);
        config.schema = SchemaDefinition::from_file(&schema_path)?;

        if let Some(components_dir) = &config.components_dir {
            let dir = resolve_path(&base_dir, components_dir);
            if dir.is_dir() {
                let mut paths: Vec<PathBuf> = fs::read_dir(&dir)?
                    .filter_map(|e| e.ok().map(|e| e.path()))
                    .filter(|p| {
                        p.extension()
                            .map(|e| e == "yaml" || e == "yml")
                            .unwrap_or(false)
                    })
                    .collect();
                paths.sort();
                for p in paths {
                    config.components.push(ComponentDeclaration::from_file(p)?);
                }
            }
        }

        for file in config.component_files.clone() {
            let p = resolve_path(&base_dir, &file);
            config.components.push(ComponentDeclaration::from_file(p)?);
        }

        Ok(config)
    }

    /// Frontend directory for a framework.
    pub fn frontend_dir(&self, framework: UiFramework) -> Option<&PathBuf> {
        self.frontends.get(&framework)
    }
}

fn resolve_path(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}
