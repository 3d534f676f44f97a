//! Model schema snapshot types.
//!
//! A `SchemaDefinition` is an immutable snapshot of the data models the
//! generator works against, pulled from the persistence layer (see the
//! uiforge-adapter-pg crate) or loaded from `schema/schema.yaml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::ConfigError;

/// Primitive type of a model field.
///
/// Closed set: the widget table and payload validation both match on it
/// exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Integer,
    BigInt,
    SmallInt,
    /// Auto-incrementing integer primary key.
    Serial,
    Decimal,
    Float,
    Boolean,
    Date,
    DateTime,
    Time,
    Duration,
    Email,
    File,
    Text,
    LongText,
    Url,
    Uuid,
    /// Reference to another model. List-valued in payloads.
    Relation,
}

impl FieldType {
    /// Whether the type is numeric (drives the "number" input widget).
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Integer
                | FieldType::BigInt
                | FieldType::SmallInt
                | FieldType::Serial
                | FieldType::Decimal
                | FieldType::Float
        )
    }
}

/// Metadata for a single model field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMeta {
    /// Field name as stored in the persistence layer.
    pub name: String,

    /// Primitive type of the field.
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Fixed choice set, if the field is constrained to one (e.g. a
    /// database enum). Non-empty choices force the "select" widget.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,

    /// Target model for `Relation` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_model: Option<String>,
}

impl FieldMeta {
    /// Create a plain field with no choices and no relation.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            choices: Vec::new(),
            related_model: None,
        }
    }

    /// Attach a choice set.
    pub fn with_choices(mut self, choices: Vec<String>) -> Self {
        self.choices = choices;
        self
    }

    /// Mark the field as a relation to another model.
    pub fn with_related_model(mut self, model: impl Into<String>) -> Self {
        self.related_model = Some(model.into());
        self.field_type = FieldType::Relation;
        self
    }
}

/// Schema of one data model: an ordered set of typed fields plus the
/// primary key field name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSchema {
    /// Model name (singular, e.g. "invoice"). REST paths pluralize it.
    pub name: String,

    /// Primary key field name.
    #[serde(default = "default_primary_key")]
    pub primary_key: String,

    /// Ordered field metadata.
    pub fields: Vec<FieldMeta>,
}

fn default_primary_key() -> String {
    "id".to_string()
}

impl ModelSchema {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether the model has a field with the given name.
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// All field names, in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// REST collection path segment: lower-cased name plus a trailing "s".
    pub fn collection_name(&self) -> String {
        format!("{}s", self.name.to_lowercase())
    }
}

/// Immutable snapshot of all models, loadable from `schema/schema.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Snapshot format version.
    pub version: String,

    /// When the snapshot was captured (RFC 3339), if introspected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<String>,

    /// Model schemas.
    #[serde(default)]
    pub models: Vec<ModelSchema>,
}

impl Default for SchemaDefinition {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            captured_at: None,
            models: Vec::new(),
        }
    }
}

impl SchemaDefinition {
    /// Load a schema snapshot from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse a schema snapshot from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Look up a model by name.
    pub fn get_model(&self, name: &str) -> Option<&ModelSchema> {
        self.models.iter().find(|m| m.name == name)
    }
}
