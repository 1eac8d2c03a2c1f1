//! Purpose: Describe model types as explicit descriptor tables with parent links.
//! Exports: `Reflect`, `Declared`, `Model`, `Resource`, `FieldDescriptor`, `FieldSlot`.
//! Role: Replaces runtime reflection; every level of a hierarchy is a `Reflect` node.
//! Invariants: Every hierarchy ends at `Resource`, which owns the `url`.
//! Invariants: Parents are embedded by value, so chains are finite and acyclic.
//! Invariants: A slot only accepts values of its own kind.
use serde_json::Value;

use super::matcher::{FieldKind, FieldValue, JsonObject};
use super::{parser, reflect};

/// Storage for a text attribute.
pub type Text = Option<String>;
/// Storage for a list-of-objects attribute.
pub type List = Option<Vec<JsonObject>>;

/// Accessors for one declared attribute, fixed when the type is declared.
pub enum FieldSlot<M> {
    Text {
        get: fn(&M) -> &Text,
        get_mut: fn(&mut M) -> &mut Text,
    },
    List {
        get: fn(&M) -> &List,
        get_mut: fn(&mut M) -> &mut List,
    },
}

impl<M> FieldSlot<M> {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldSlot::Text { .. } => FieldKind::Text,
            FieldSlot::List { .. } => FieldKind::List,
        }
    }

    /// Stores `value` when its kind matches the slot. Returns whether it was stored.
    pub fn assign(&self, model: &mut M, value: FieldValue) -> bool {
        match (self, value) {
            (FieldSlot::Text { get_mut, .. }, FieldValue::Text(text)) => {
                *get_mut(model) = Some(text);
                true
            }
            (FieldSlot::List { get_mut, .. }, FieldValue::List(items)) => {
                *get_mut(model) = Some(items);
                true
            }
            _ => false,
        }
    }

    pub fn read(&self, model: &M) -> Option<Value> {
        match self {
            FieldSlot::Text { get, .. } => get(model).clone().map(Value::String),
            FieldSlot::List { get, .. } => get(model)
                .clone()
                .map(|items| FieldValue::List(items).into_json()),
        }
    }
}

pub struct FieldDescriptor<M> {
    pub name: &'static str,
    pub slot: FieldSlot<M>,
}

/// One level of a model hierarchy, usable as a trait object.
///
/// Field access is by index into the level's own declaration order; ancestors
/// are reached through `superclass`.
pub trait Reflect: Send {
    fn type_name(&self) -> &str;
    fn field_count(&self) -> usize;
    fn field_name(&self, index: usize) -> Option<&str>;
    fn field_kind(&self, index: usize) -> Option<FieldKind>;
    fn assign(&mut self, index: usize, value: FieldValue) -> bool;
    fn attribute(&self, index: usize) -> Option<Value>;
    fn superclass(&self) -> Option<&dyn Reflect>;
    fn superclass_mut(&mut self) -> Option<&mut dyn Reflect>;

    fn resource(&self) -> Option<&Resource> {
        self.superclass()?.resource()
    }

    fn resource_mut(&mut self) -> Option<&mut Resource> {
        self.superclass_mut()?.resource_mut()
    }
}

/// Statically declared level: a descriptor table plus a link to the parent level.
///
/// Usually produced by [`declare_model!`](crate::declare_model).
pub trait Declared: Send + Sized + 'static {
    const TYPE_NAME: &'static str;
    const FIELDS: &'static [FieldDescriptor<Self>];

    fn parent(&self) -> Option<&dyn Reflect>;
    fn parent_mut(&mut self) -> Option<&mut dyn Reflect>;
}

impl<T: Declared> Reflect for T {
    fn type_name(&self) -> &str {
        T::TYPE_NAME
    }

    fn field_count(&self) -> usize {
        T::FIELDS.len()
    }

    fn field_name(&self, index: usize) -> Option<&str> {
        T::FIELDS.get(index).map(|field| field.name)
    }

    fn field_kind(&self, index: usize) -> Option<FieldKind> {
        T::FIELDS.get(index).map(|field| field.slot.kind())
    }

    fn assign(&mut self, index: usize, value: FieldValue) -> bool {
        match T::FIELDS.get(index) {
            Some(field) => field.slot.assign(self, value),
            None => false,
        }
    }

    fn attribute(&self, index: usize) -> Option<Value> {
        T::FIELDS.get(index)?.slot.read(self)
    }

    fn superclass(&self) -> Option<&dyn Reflect> {
        self.parent()
    }

    fn superclass_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.parent_mut()
    }
}

/// A populatable model. `parse` is the override point for payload pre-processing.
pub trait Model: Reflect + Sized {
    /// Populates declared attributes from `payload`. Overrides may reshape the
    /// payload and then call [`parser::parse`].
    fn parse(&mut self, payload: &JsonObject) {
        parser::parse(self, payload);
    }

    fn url(&self) -> Option<&str> {
        self.resource()?.url.as_deref()
    }

    fn set_url(&mut self, url: Option<String>) {
        if let Some(resource) = self.resource_mut() {
            resource.url = url;
        }
    }

    /// Snapshot of every set attribute, leaf-first.
    fn attributes(&self) -> JsonObject {
        reflect::attributes(self)
    }
}

/// Root of every model hierarchy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Resource {
    pub url: Text,
}

impl Resource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }
}

impl Reflect for Resource {
    fn type_name(&self) -> &str {
        "Resource"
    }

    fn field_count(&self) -> usize {
        1
    }

    fn field_name(&self, index: usize) -> Option<&str> {
        (index == 0).then_some("url")
    }

    fn field_kind(&self, index: usize) -> Option<FieldKind> {
        (index == 0).then_some(FieldKind::Text)
    }

    fn assign(&mut self, index: usize, value: FieldValue) -> bool {
        match (index, value) {
            (0, FieldValue::Text(url)) => {
                self.url = Some(url);
                true
            }
            _ => false,
        }
    }

    fn attribute(&self, index: usize) -> Option<Value> {
        if index != 0 {
            return None;
        }
        self.url.clone().map(Value::String)
    }

    fn superclass(&self) -> Option<&dyn Reflect> {
        None
    }

    fn superclass_mut(&mut self) -> Option<&mut dyn Reflect> {
        None
    }

    fn resource(&self) -> Option<&Resource> {
        Some(self)
    }

    fn resource_mut(&mut self) -> Option<&mut Resource> {
        Some(self)
    }
}

impl Model for Resource {}

/// Declares a model struct, its descriptor table, and its parent link.
///
/// Attribute kinds are `Text` (`Option<String>`) and `List`
/// (`Option<Vec<JsonObject>>`). The parent is embedded as a public field.
///
/// ```
/// use backbone_model::declare_model;
/// use backbone_model::core::model::{Model, Resource};
///
/// declare_model! {
///     pub struct Video extends Resource as base {
///         pub uri: Text,
///         pub language: Text,
///     }
/// }
///
/// impl Model for Video {}
/// ```
#[macro_export]
macro_rules! declare_model {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident extends $parent:ty as $parent_field:ident {
            $( $(#[$field_meta:meta])* $field_vis:vis $field:ident : $kind:ident ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq)]
        $vis struct $name {
            pub $parent_field: $parent,
            $( $(#[$field_meta])* $field_vis $field: $crate::core::model::$kind, )*
        }

        impl $crate::core::model::Declared for $name {
            const TYPE_NAME: &'static str = stringify!($name);
            const FIELDS: &'static [$crate::core::model::FieldDescriptor<Self>] = &[
                $(
                    $crate::core::model::FieldDescriptor {
                        name: stringify!($field),
                        slot: $crate::core::model::FieldSlot::$kind {
                            get: |model| &model.$field,
                            get_mut: |model| &mut model.$field,
                        },
                    },
                )*
            ];

            fn parent(&self) -> Option<&dyn $crate::core::model::Reflect> {
                Some(&self.$parent_field)
            }

            fn parent_mut(&mut self) -> Option<&mut dyn $crate::core::model::Reflect> {
                Some(&mut self.$parent_field)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::{Declared, Model, Reflect, Resource};
    use crate::core::matcher::{FieldKind, FieldValue};
    use serde_json::json;

    declare_model! {
        struct Clip extends Resource as base {
            title: Text,
            chapters: List,
        }
    }

    impl Model for Clip {}

    #[test]
    fn macro_registers_fields_in_declaration_order() {
        let names: Vec<_> = Clip::FIELDS.iter().map(|field| field.name).collect();
        assert_eq!(names, ["title", "chapters"]);
        let clip = Clip::default();
        assert_eq!(clip.type_name(), "Clip");
        assert_eq!(clip.field_kind(1), Some(FieldKind::List));
        assert_eq!(clip.field_name(2), None);
    }

    #[test]
    fn slots_reject_values_of_the_other_kind() {
        let mut clip = Clip::default();
        assert!(!clip.assign(0, FieldValue::List(Vec::new())));
        assert!(!clip.assign(1, FieldValue::Text("x".to_string())));
        assert!(clip.assign(0, FieldValue::Text("x".to_string())));
        assert_eq!(clip.title.as_deref(), Some("x"));
        assert!(clip.chapters.is_none());
    }

    #[test]
    fn attribute_reads_back_lists_as_json() {
        let mut clip = Clip::default();
        let chapter = json!({"at": 10}).as_object().cloned().expect("object");
        assert!(clip.assign(1, FieldValue::List(vec![chapter])));
        assert_eq!(clip.attribute(1), Some(json!([{"at": 10}])));
        assert_eq!(clip.attribute(0), None);
    }

    #[test]
    fn url_lives_on_the_root_resource() {
        let mut clip = Clip::default();
        assert_eq!(clip.url(), None);
        clip.set_url(Some("http://localhost/clip".to_string()));
        assert_eq!(clip.base.url.as_deref(), Some("http://localhost/clip"));
        assert_eq!(clip.url(), Some("http://localhost/clip"));
        assert_eq!(Resource::new("x").url(), Some("x"));
    }
}
