//! Shared types for uiforge: model schema snapshots, component
//! descriptors, actions, widget resolution, and configuration loading.

pub mod actions;
pub mod component;
pub mod config;
pub mod registry;
pub mod schema;
pub mod widget;

// Re-export the types most crates need by name.
pub use actions::{Action, ActionOptions, Direction};
pub use component::{
    ComponentDescriptor, ComponentKind, CustomComponent, DescriptorError, EntryOptions,
    FieldOptions, TableOptions, UiFramework, Visibility,
};
pub use config::{ComponentDeclaration, ConfigError, ServerConfig, UiforgeConfig};
pub use registry::{ComponentRegistry, RegisteredComponent};
pub use schema::{FieldMeta, FieldType, ModelSchema, SchemaDefinition};
pub use widget::WidgetKind;
