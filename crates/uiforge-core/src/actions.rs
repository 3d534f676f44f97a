//! Item actions exposed on components.
//!
//! An action is a named, role-gated operation rendered as a button on
//! table rows or entry forms. Each variant carries only the parameters
//! it needs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Direction for choice iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// A triggerable action on an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Step a field through its choice set.
    IterateChoice {
        field: String,
        #[serde(default)]
        direction: Direction,
    },

    /// Flip a boolean field.
    ToggleBoolean { field: String },

    /// Open a URL. `{field}` placeholders are resolved per item at
    /// render time.
    OpenUrl {
        url: String,
        #[serde(default = "default_new_tab")]
        new_tab: bool,
    },

    /// Set a date/date-time field to the current date.
    SetCurrentDate { field: String },
}

fn default_new_tab() -> bool {
    true
}

/// A named, role-gated group of actions shown on items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOptions {
    /// Label shown in the UI.
    pub display_name: String,

    /// Roles allowed to trigger the action.
    #[serde(default)]
    pub roles: BTreeSet<String>,

    /// Ordered action steps executed on trigger.
    pub actions: Vec<Action>,
}
