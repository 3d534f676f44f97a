//! Consolidated per-model access policy.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use uiforge_core::Visibility;

/// Consolidated access policy for one model, folded from every
/// component descriptor that references it. Computed once per
/// regeneration or boot cycle; read-only afterward.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelAccess {
    /// Roles allowed to create items.
    pub addable_by_roles: BTreeSet<String>,

    /// Roles allowed to delete items.
    pub removable_by_roles: BTreeSet<String>,

    /// Roles allowed to modify each field.
    pub modifiable_by_roles: BTreeMap<String, BTreeSet<String>>,

    /// Roles allowed to view each field. A field absent from this map
    /// is viewable by nobody.
    pub visible_by_roles: BTreeMap<String, Visibility>,
}

impl ModelAccess {
    /// Whether any of the caller's roles may create items.
    pub fn can_add(&self, caller_roles: &[String]) -> bool {
        intersects(&self.addable_by_roles, caller_roles)
    }

    /// Whether any of the caller's roles may delete items.
    pub fn can_remove(&self, caller_roles: &[String]) -> bool {
        intersects(&self.removable_by_roles, caller_roles)
    }

    /// Whether any of the caller's roles may modify the field.
    pub fn can_modify(&self, field: &str, caller_roles: &[String]) -> bool {
        self.modifiable_by_roles
            .get(field)
            .map(|roles| intersects(roles, caller_roles))
            .unwrap_or(false)
    }

    /// Whether any of the caller's roles may view the field.
    pub fn can_view(&self, field: &str, caller_roles: &[String]) -> bool {
        self.visible_by_roles
            .get(field)
            .map(|v| v.allows(caller_roles))
            .unwrap_or(false)
    }
}

fn intersects(roles: &BTreeSet<String>, caller_roles: &[String]) -> bool {
    caller_roles.iter().any(|r| roles.contains(r))
}
