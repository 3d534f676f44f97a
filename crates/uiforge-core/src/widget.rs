//! Input widget resolution.
//!
//! Each field of a component gets a widget kind derived from its
//! primitive type; a non-empty choice set overrides everything to a
//! select box.

use serde::{Deserialize, Serialize};

use crate::schema::{FieldMeta, FieldType};

/// Kind of input element a field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Number,
    Checkbox,
    Date,
    DateTime,
    Time,
    Email,
    File,
    Textarea,
    Url,
    Text,
    Select,
}

impl WidgetKind {
    /// Resolve the widget for a field.
    pub fn for_field(field: &FieldMeta) -> Self {
        if !field.choices.is_empty() {
            return WidgetKind::Select;
        }
        match field.field_type {
            t if t.is_numeric() => WidgetKind::Number,
            FieldType::Boolean => WidgetKind::Checkbox,
            FieldType::Date => WidgetKind::Date,
            FieldType::DateTime => WidgetKind::DateTime,
            FieldType::Duration | FieldType::Time => WidgetKind::Time,
            FieldType::Email => WidgetKind::Email,
            FieldType::File => WidgetKind::File,
            FieldType::LongText => WidgetKind::Textarea,
            FieldType::Url => WidgetKind::Url,
            _ => WidgetKind::Text,
        }
    }

    /// HTML input type string used by the template engines.
    pub fn as_input_type(&self) -> &'static str {
        match self {
            WidgetKind::Number => "number",
            WidgetKind::Checkbox => "checkbox",
            WidgetKind::Date => "date",
            WidgetKind::DateTime => "datetime-local",
            WidgetKind::Time => "time",
            WidgetKind::Email => "email",
            WidgetKind::File => "file",
            WidgetKind::Textarea => "textarea",
            WidgetKind::Url => "url",
            WidgetKind::Text => "text",
            WidgetKind::Select => "select",
        }
    }
}
