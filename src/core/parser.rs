//! Purpose: Populate a model's declared attributes from a JSON object payload.
//! Exports: `parse`.
//! Role: Core traversal; drives the matcher over every level of the hierarchy.
//! Invariants: Levels are visited leaf first; a name assigned at a shallower level is never reassigned deeper.
//! Invariants: Total: unmatched fields, unknown keys and empty payloads are not errors.
//! Invariants: Idempotent for a given (target, payload) pair.
use std::collections::HashSet;

use super::matcher::{JsonObject, Match, match_field};
use super::model::Reflect;
use super::reflect::walk_mut;

pub fn parse(target: &mut dyn Reflect, payload: &JsonObject) {
    let mut claimed: HashSet<&str> = HashSet::new();
    walk_mut(target, |level, node| {
        for index in 0..node.field_count() {
            let Some((key, _)) = node.field_name(index).and_then(|name| payload.get_key_value(name))
            else {
                continue;
            };
            if claimed.contains(key.as_str()) {
                continue;
            }
            let Match::Assign(value) = match_field(key, payload) else {
                continue;
            };
            if node.assign(index, value) {
                tracing::trace!(field = %key, level, "assigned attribute");
                claimed.insert(key.as_str());
            }
        }
    });
}
