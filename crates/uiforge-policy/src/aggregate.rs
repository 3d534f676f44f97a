//! Permission aggregation.
//!
//! Folds the access declarations of every component descriptor into
//! one `ModelAccess` per model. Add/remove rights come from table
//! components only; per-field modify rights are a plain set union;
//! visibility is an absorbing union where `All` dominates: once any
//! descriptor marks a field visible to all roles, later declarations
//! cannot narrow it.

use std::collections::BTreeMap;

use uiforge_core::{ComponentDescriptor, ComponentKind, Visibility};

use crate::access::ModelAccess;

/// Aggregate descriptors into a consolidated policy per model name.
///
/// Pure: no errors, no side effects. Missing declarations default to
/// the empty role set (nobody authorized).
pub fn aggregate<'a, I>(descriptors: I) -> BTreeMap<String, ModelAccess>
where
    I: IntoIterator<Item = &'a ComponentDescriptor>,
{
    let mut policies: BTreeMap<String, ModelAccess> = BTreeMap::new();

    for descriptor in descriptors {
        let access = policies.entry(descriptor.model.name.clone()).or_default();

        if let ComponentKind::Table(table) = &descriptor.kind {
            access
                .addable_by_roles
                .extend(table.addable_by_roles.iter().cloned());
            access
                .removable_by_roles
                .extend(table.removable_by_roles.iter().cloned());
        }

        for field in &descriptor.fields {
            access
                .modifiable_by_roles
                .entry(field.field_name.clone())
                .or_default()
                .extend(field.modifiable_by_roles.iter().cloned());

            merge_visibility(
                access
                    .visible_by_roles
                    .entry(field.field_name.clone())
                    .or_insert_with(|| Visibility::Roles(Default::default())),
                &field.visible_by_roles,
            );
        }
    }

    policies
}

/// Absorbing union: `All` wins and stays, otherwise union the sets.
fn merge_visibility(current: &mut Visibility, incoming: &Visibility) {
    match (&mut *current, incoming) {
        (Visibility::All, _) => {}
        (_, Visibility::All) => *current = Visibility::All,
        (Visibility::Roles(existing), Visibility::Roles(incoming)) => {
            existing.extend(incoming.iter().cloned());
        }
    }
}
