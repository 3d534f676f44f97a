//! Component registry.
//!
//! Components are registered explicitly once during startup (either
//! programmatically or from configuration); the registry is then
//! passed into the permission aggregator, the REST endpoint factory,
//! and the regeneration pipeline. There is no ambient discovery.

use std::path::PathBuf;

use crate::component::{ComponentDescriptor, UiFramework};
use crate::config::{ConfigError, UiforgeConfig};

/// A registered component together with the frontend directory its
/// artifact is written into.
#[derive(Debug, Clone)]
pub struct RegisteredComponent {
    pub descriptor: ComponentDescriptor,
    pub frontend_dir: PathBuf,
}

/// All components declared by the application.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: Vec<RegisteredComponent>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component with the frontend directory its artifact
    /// belongs to.
    pub fn register(&mut self, descriptor: ComponentDescriptor, frontend_dir: impl Into<PathBuf>) {
        self.components.push(RegisteredComponent {
            descriptor,
            frontend_dir: frontend_dir.into(),
        });
    }

    /// Build a registry from loaded configuration, resolving every
    /// declaration against the schema snapshot.
    pub fn from_config(config: &UiforgeConfig) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for declaration in &config.components {
            let descriptor = declaration.resolve(&config.schema)?;
            let frontend_dir = config
                .frontend_dir(descriptor.ui_framework)
                .cloned()
                .ok_or_else(|| {
                    ConfigError::Config(format!(
                        "No frontend directory configured for framework '{}' (component '{}')",
                        descriptor.ui_framework, descriptor.name
                    ))
                })?;
            registry.register(descriptor, frontend_dir);
        }
        Ok(registry)
    }

    /// Registered components.
    pub fn components(&self) -> &[RegisteredComponent] {
        &self.components
    }

    /// Descriptors only, without output locations.
    pub fn descriptors(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.components.iter().map(|c| &c.descriptor)
    }

    /// Descriptors targeting a given framework.
    pub fn descriptors_for(
        &self,
        framework: UiFramework,
    ) -> impl Iterator<Item = &ComponentDescriptor> {
        self.descriptors()
            .filter(move |d| d.ui_framework == framework)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
