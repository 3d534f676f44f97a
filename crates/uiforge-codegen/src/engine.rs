//! Template engine dispatch.
//!
//! A `TemplateEngine` renders a component descriptor for a specific
//! `(framework, component kind)` combination. The generator holds the
//! available engines and fails with a capability error when no engine
//! supports a combination; it never degrades silently.

use uiforge_core::{ComponentDescriptor, ComponentKind, UiFramework};

use crate::vue::VueEngine;

/// Error type for component generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("No template engine supports framework '{framework}' with component kind '{kind}'")]
    Unsupported {
        framework: UiFramework,
        kind: &'static str,
    },
}

/// Renders descriptors into UI source text.
pub trait TemplateEngine: Send + Sync {
    /// Whether the engine can render this combination.
    fn supports(&self, framework: UiFramework, kind: &ComponentKind) -> bool;

    /// Render the descriptor into source text.
    fn render(&self, descriptor: &ComponentDescriptor) -> Result<String, GenerateError>;
}

/// Dispatches descriptors to the first engine that supports their
/// framework and kind.
pub struct ComponentGenerator {
    engines: Vec<Box<dyn TemplateEngine>>,
}

impl ComponentGenerator {
    /// A generator with no engines. Useful for hosts that bring their
    /// own.
    pub fn empty() -> Self {
        Self {
            engines: Vec::new(),
        }
    }

    /// A generator with the built-in engines registered.
    pub fn new() -> Self {
        let mut generator = Self::empty();
        generator.register_engine(Box::new(VueEngine));
        generator
    }

    /// Register an additional engine. Engines are tried in
    /// registration order.
    pub fn register_engine(&mut self, engine: Box<dyn TemplateEngine>) {
        self.engines.push(engine);
    }

    /// Render a descriptor, or fail with a capability error.
    pub fn generate(&self, descriptor: &ComponentDescriptor) -> Result<String, GenerateError> {
        let engine = self
            .engines
            .iter()
            .find(|e| e.supports(descriptor.ui_framework, &descriptor.kind))
            .ok_or(GenerateError::Unsupported {
                framework: descriptor.ui_framework,
                kind: descriptor.kind.name(),
            })?;
        engine.render(descriptor)
    }
}

impl Default for ComponentGenerator {
    fn default() -> Self {
        Self::new()
    }
}
