//! Purpose: Provide a model whose fields are registered at runtime.
//! Exports: `DynamicModel`.
//! Role: Backs the CLI and ad hoc consumers that only know field names at runtime.
//! Invariants: Field names are unique within the model; re-registering replaces the kind.
//! Invariants: An envelope pointer that does not resolve to an object makes `parse` a no-op.
use serde_json::Value;

use super::matcher::{FieldKind, FieldValue, JsonObject};
use super::model::{Model, Reflect, Resource};
use super::parser;

#[derive(Clone, Debug, PartialEq)]
struct DynamicField {
    name: String,
    kind: FieldKind,
    value: Option<FieldValue>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DynamicModel {
    name: String,
    fields: Vec<DynamicField>,
    envelope: Option<String>,
    pub base: Resource,
}

impl DynamicModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            envelope: None,
            base: Resource::default(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => {
                field.kind = kind;
                field.value = None;
            }
            None => self.fields.push(DynamicField {
                name,
                kind,
                value: None,
            }),
        }
        self
    }

    pub fn with_text(self, name: impl Into<String>) -> Self {
        self.with_field(name, FieldKind::Text)
    }

    pub fn with_list(self, name: impl Into<String>) -> Self {
        self.with_field(name, FieldKind::List)
    }

    /// Parse the object found at this JSON pointer instead of the payload root.
    pub fn with_envelope(mut self, pointer: impl Into<String>) -> Self {
        self.envelope = Some(pointer.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.base.url = Some(url.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .and_then(|field| field.value.as_ref())
    }
}

impl Reflect for DynamicModel {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn field_count(&self) -> usize {
        self.fields.len()
    }

    fn field_name(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(|field| field.name.as_str())
    }

    fn field_kind(&self, index: usize) -> Option<FieldKind> {
        self.fields.get(index).map(|field| field.kind)
    }

    fn assign(&mut self, index: usize, value: FieldValue) -> bool {
        match self.fields.get_mut(index) {
            Some(field) if field.kind == value.kind() => {
                field.value = Some(value);
                true
            }
            _ => false,
        }
    }

    fn attribute(&self, index: usize) -> Option<Value> {
        let value = self.fields.get(index)?.value.clone()?;
        Some(value.into_json())
    }

    fn superclass(&self) -> Option<&dyn Reflect> {
        Some(&self.base)
    }

    fn superclass_mut(&mut self) -> Option<&mut dyn Reflect> {
        Some(&mut self.base)
    }
}

impl Model for DynamicModel {
    fn parse(&mut self, payload: &JsonObject) {
        let Some(pointer) = self.envelope.clone() else {
            parser::parse(self, payload);
            return;
        };
        match resolve_pointer(payload, &pointer) {
            Some(inner) => parser::parse(self, inner),
            None => tracing::debug!(%pointer, "envelope not found in payload; nothing parsed"),
        }
    }
}

fn resolve_pointer<'a>(payload: &'a JsonObject, pointer: &str) -> Option<&'a JsonObject> {
    if pointer.is_empty() {
        return Some(payload);
    }
    let rest = pointer.strip_prefix('/')?;
    let (first, tail) = match rest.find('/') {
        Some(at) => rest.split_at(at),
        None => (rest, ""),
    };
    let first = first.replace("~1", "/").replace("~0", "~");
    payload.get(&first)?.pointer(tail)?.as_object()
}

#[cfg(test)]
mod tests {
    use super::{DynamicModel, resolve_pointer};
    use crate::core::matcher::{FieldValue, JsonObject};
    use crate::core::model::Model;
    use crate::core::reflect::levels;
    use serde_json::{Value, json};

    fn object(value: Value) -> JsonObject {
        value.as_object().cloned().expect("object payload")
    }

    #[test]
    fn runtime_fields_are_populated() {
        let mut model = DynamicModel::new("Greeting")
            .with_text("dd")
            .with_text("juancarlos")
            .with_list("items");
        model.parse(&object(json!({
            "dd": "hola",
            "juancarlos": "value",
            "items": [{"k": 1}],
            "other": "ignored",
        })));
        assert_eq!(model.get("dd"), Some(&FieldValue::Text("hola".to_string())));
        assert_eq!(
            model.attributes(),
            object(json!({"dd": "hola", "juancarlos": "value", "items": [{"k": 1}]}))
        );
    }

    #[test]
    fn reregistering_a_field_replaces_its_kind() {
        let model = DynamicModel::new("M").with_text("x").with_list("x");
        let fields = levels(&model);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "x");
        assert_eq!(fields[0].kind, crate::core::matcher::FieldKind::List);
        assert_eq!(fields[1].name, "url");
    }

    #[test]
    fn envelope_is_unwrapped_before_parsing() {
        let mut model = DynamicModel::new("Video")
            .with_text("uri")
            .with_envelope("/page/items/0");
        model.parse(&object(json!({
            "page": {"items": [{"uri": "http://www.example.com/api/videos/1"}]}
        })));
        assert_eq!(
            model.get("uri"),
            Some(&FieldValue::Text("http://www.example.com/api/videos/1".to_string()))
        );
    }

    #[test]
    fn missing_envelope_parses_nothing() {
        let mut model = DynamicModel::new("Video")
            .with_text("uri")
            .with_envelope("/page/items/0");
        model.parse(&object(json!({"page": {"items": []}, "uri": "top-level"})));
        assert_eq!(model.get("uri"), None);
    }

    #[test]
    fn pointer_escapes_are_decoded() {
        let payload = object(json!({"a/b": {"c~d": {"x": "1"}}}));
        let inner = resolve_pointer(&payload, "/a~1b/c~0d").expect("resolved");
        assert_eq!(inner.get("x"), Some(&json!("1")));
        assert!(resolve_pointer(&payload, "no-slash").is_none());
        assert!(resolve_pointer(&payload, "").is_some());
    }

    #[test]
    fn array_indices_follow_json_pointer_rules() {
        let payload = object(json!({"items": [{"x": "0"}, {"x": "1"}]}));
        assert!(resolve_pointer(&payload, "/items/0").is_some());
        assert_eq!(
            resolve_pointer(&payload, "/items/1").and_then(|item| item.get("x")),
            Some(&json!("1"))
        );
        for pointer in ["/items/+0", "/items/00", "/items/-1", "/items/2"] {
            assert!(resolve_pointer(&payload, pointer).is_none(), "pointer {pointer}");
        }
    }
}
