//! Purpose: Enumerate declared fields level by level across a model hierarchy.
//! Exports: `DeclaredField`, `levels`, `depth`, `walk_mut`, `attributes`, `attribute`.
//! Role: Hierarchy walk shared by the parser and attribute read-back.
//! Invariants: Level 0 is the most-derived type; the root `Resource` is last.
//! Invariants: Within a level, fields keep declaration order.
//! Invariants: Read-back resolves duplicate names leaf-first, matching the parser.
use serde::Serialize;
use serde_json::Value;

use super::matcher::{FieldKind, JsonObject};
use super::model::Reflect;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DeclaredField<'a> {
    pub name: &'a str,
    pub level: usize,
    pub kind: FieldKind,
}

pub fn levels(model: &dyn Reflect) -> Vec<DeclaredField<'_>> {
    let mut fields = Vec::new();
    let mut current = Some(model);
    let mut level = 0;
    while let Some(node) = current {
        for index in 0..node.field_count() {
            if let (Some(name), Some(kind)) = (node.field_name(index), node.field_kind(index)) {
                fields.push(DeclaredField { name, level, kind });
            }
        }
        current = node.superclass();
        level += 1;
    }
    fields
}

pub fn depth(model: &dyn Reflect) -> usize {
    std::iter::successors(Some(model), |node| node.superclass()).count()
}

/// Visits every level from leaf to root, handing out mutable access to each.
pub fn walk_mut<F>(model: &mut dyn Reflect, mut visit: F)
where
    F: FnMut(usize, &mut dyn Reflect),
{
    walk_level(model, 0, &mut visit);
}

fn walk_level<F>(node: &mut dyn Reflect, level: usize, visit: &mut F)
where
    F: FnMut(usize, &mut dyn Reflect),
{
    visit(level, node);
    if let Some(parent) = node.superclass_mut() {
        walk_level(parent, level + 1, visit);
    }
}

pub fn attributes(model: &dyn Reflect) -> JsonObject {
    let mut out = JsonObject::new();
    let mut current = Some(model);
    while let Some(node) = current {
        for index in 0..node.field_count() {
            let Some(name) = node.field_name(index) else {
                continue;
            };
            if out.contains_key(name) {
                continue;
            }
            if let Some(value) = node.attribute(index) {
                out.insert(name.to_string(), value);
            }
        }
        current = node.superclass();
    }
    out
}

/// Reads one attribute by name from the shallowest level that has it set.
pub fn attribute(model: &dyn Reflect, name: &str) -> Option<Value> {
    std::iter::successors(Some(model), |node| node.superclass()).find_map(|node| {
        (0..node.field_count())
            .filter(|&index| node.field_name(index) == Some(name))
            .find_map(|index| node.attribute(index))
    })
}
