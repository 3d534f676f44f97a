//! Component descriptors.
//!
//! A `ComponentDescriptor` is the declarative description of one UI
//! component bound to a single model. The two shapes (table, entry
//! form) are a closed sum; shared configuration lives on the
//! descriptor itself, shape-specific options in the variant payload.

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::actions::ActionOptions;
use crate::schema::ModelSchema;
use crate::widget::WidgetKind;

/// UI framework a component is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiFramework {
    Vue,
}

impl fmt::Display for UiFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiFramework::Vue => write!(f, "vue"),
        }
    }
}

impl UiFramework {
    /// File extension of generated artifacts.
    pub fn artifact_extension(&self) -> &'static str {
        match self {
            UiFramework::Vue => "vue",
        }
    }
}

/// Which roles may view a field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Every role may view the field.
    #[default]
    All,
    /// Only the listed roles may view the field.
    Roles(BTreeSet<String>),
}

impl Visibility {
    /// Whether any of the caller's roles grants viewing.
    pub fn allows(&self, caller_roles: &[String]) -> bool {
        match self {
            Visibility::All => true,
            Visibility::Roles(roles) => caller_roles.iter().any(|r| roles.contains(r)),
        }
    }
}

impl Serialize for Visibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Visibility::All => serializer.serialize_str("all"),
            Visibility::Roles(roles) => roles.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Visibility {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VisibilityVisitor;

        impl<'de> Visitor<'de> for VisibilityVisitor {
            type Value = Visibility;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("the string \"all\" or a list of role names")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Visibility, E> {
                if v == "all" {
                    Ok(Visibility::All)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Visibility, A::Error> {
                let mut roles = BTreeSet::new();
                while let Some(role) = seq.next_element::<String>()? {
                    roles.insert(role);
                }
                Ok(Visibility::Roles(roles))
            }
        }

        deserializer.deserialize_any(VisibilityVisitor)
    }
}

/// A custom component bound into a field's cell or input slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomComponent {
    /// Name of the component in the UI framework.
    pub component_name: String,
    /// Prop the field value is passed through.
    pub prop_name: String,
}

/// Per-field UI and permission configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Name of the field on the model.
    pub field_name: String,

    /// Label shown in the UI; the field name is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Link opened when the field is clicked. `{field}` placeholders
    /// are resolved per item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Whether the table can be sorted by this field.
    #[serde(default)]
    pub sortable: bool,

    /// Roles allowed to modify the field's contents.
    #[serde(default)]
    pub modifiable_by_roles: BTreeSet<String>,

    /// Roles allowed to view the field's contents.
    #[serde(default)]
    pub visible_by_roles: Visibility,

    /// Whether the value is assigned by the persistence layer on
    /// create (e.g. a serial primary key).
    #[serde(default)]
    pub auto_generated: bool,

    /// Custom components rendered inside this field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_components: Vec<CustomComponent>,

    /// Nested field options for related-object fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldOptions>,
}

impl FieldOptions {
    /// Minimal options for a field, everything else defaulted.
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            display_name: None,
            link: None,
            sortable: false,
            modifiable_by_roles: BTreeSet::new(),
            visible_by_roles: Visibility::All,
            auto_generated: false,
            custom_components: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Label shown in the UI.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.field_name)
    }
}

/// Table-specific options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    /// Items per table page.
    #[serde(default = "default_max_items_per_page")]
    pub max_items_per_page: u64,

    /// Roles allowed to create new items from this component.
    #[serde(default)]
    pub addable_by_roles: BTreeSet<String>,

    /// Roles allowed to remove items from this component.
    #[serde(default)]
    pub removable_by_roles: BTreeSet<String>,
}

fn default_max_items_per_page() -> u64 {
    100
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            max_items_per_page: default_max_items_per_page(),
            addable_by_roles: BTreeSet::new(),
            removable_by_roles: BTreeSet::new(),
        }
    }
}

/// Entry-form-specific options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EntryOptions {
    /// Prop the entry receives its data through. When absent, the
    /// generated component fetches its own data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_by_prop: Option<String>,
}

/// Shape of a component. Closed set; the generator dispatches over it
/// exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ComponentKind {
    Table(TableOptions),
    Entry(EntryOptions),
}

impl ComponentKind {
    /// Short name used in capability errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Table(_) => "table",
            ComponentKind::Entry(_) => "entry",
        }
    }
}

/// Error raised while building a descriptor.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("Model '{model}' has no field '{field}'")]
    UnknownField { model: String, field: String },
}

/// A declarative UI component bound to one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    /// Concrete component name in the UI framework (also the artifact
    /// file stem).
    pub name: String,

    /// Framework the component is generated for.
    pub ui_framework: UiFramework,

    /// Snapshot of the bound model.
    pub model: ModelSchema,

    /// Component shape and shape-specific options.
    pub kind: ComponentKind,

    /// Field configuration, in display order.
    pub fields: Vec<FieldOptions>,

    /// Role-gated item actions.
    #[serde(default)]
    pub actions: Vec<ActionOptions>,

    /// Whether to emit basic styling.
    #[serde(default = "default_styling")]
    pub styling: bool,

    /// Derived: input widget per field.
    #[serde(default)]
    pub widgets: BTreeMap<String, WidgetKind>,

    /// Derived: choice set per field, where one exists.
    #[serde(default)]
    pub choices: BTreeMap<String, Vec<String>>,
}

fn default_styling() -> bool {
    true
}

impl ComponentDescriptor {
    /// Build a descriptor, validating every field name against the
    /// model and computing the derived widget and choice maps.
    pub fn build(
        name: impl Into<String>,
        ui_framework: UiFramework,
        model: &ModelSchema,
        kind: ComponentKind,
        fields: Vec<FieldOptions>,
        actions: Vec<ActionOptions>,
    ) -> Result<Self, DescriptorError> {
        let mut widgets = BTreeMap::new();
        let mut choices = BTreeMap::new();

        for options in &fields {
            let meta = model.field(&options.field_name).ok_or_else(|| {
                DescriptorError::UnknownField {
                    model: model.name.clone(),
                    field: options.field_name.clone(),
                }
            })?;
            widgets.insert(options.field_name.clone(), WidgetKind::for_field(meta));
            if !meta.choices.is_empty() {
                choices.insert(options.field_name.clone(), meta.choices.clone());
            }
        }

        Ok(Self {
            name: name.into(),
            ui_framework,
            model: model.clone(),
            kind,
            fields,
            actions,
            styling: true,
            widgets,
            choices,
        })
    }

    /// Disable the generated style block.
    pub fn without_styling(mut self) -> Self {
        self.styling = false;
        self
    }

    /// Table options, when the component is a table.
    pub fn table_options(&self) -> Option<&TableOptions> {
        match &self.kind {
            ComponentKind::Table(opts) => Some(opts),
            ComponentKind::Entry(_) => None,
        }
    }
}
