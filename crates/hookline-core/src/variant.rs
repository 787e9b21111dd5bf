//! The dynamic value exchanged between plugins.
//!
//! A [`Variant`] holds exactly one payload matching its [`Kind`]. Changing
//! the kind drops the previous payload, so a string buffer or array never
//! outlives a kind change. Reading a variant as a kind it does not hold is
//! not an error: the getter returns that kind's zero value.
//!
//! Cloning a variant deep-copies strings and arrays. Host references are
//! weak handles and are copied as handles, never as the entities they
//! point at.

use std::fmt;

use itertools::Itertools;
use strum::{Display, EnumIter, IntoStaticStr};

use crate::host::{ObjectRef, TypeRef};

/// Ordered list of variants passed into and returned from a hook.
pub type Payload = Vec<Variant>;

/// Tag identifying which payload a [`Variant`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, IntoStaticStr)]
pub enum Kind {
    #[default]
    None,
    Boolean,
    Integer,
    Float,
    String,
    TypeRef,
    ObjectRef,
    Array,
}

/// A single dynamic value.
///
/// Array elements are optional: `None` in an array slot is an explicit null
/// element, distinct both from a `Variant::None` element and from an empty
/// array. The distinction only holds in memory. JSON and script values have
/// a single null, so a `Variant::None` element comes back from either as a
/// null slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Variant {
    #[default]
    None,
    Boolean(bool),
    Integer(i32),
    Float(f32),
    String(String),
    TypeRef(TypeRef),
    ObjectRef(ObjectRef),
    Array(Vec<Option<Variant>>),
}

impl Variant {
    /// Create a boolean variant.
    pub fn boolean(value: bool) -> Self {
        Self::Boolean(value)
    }

    /// Create an integer variant.
    pub fn integer(value: i32) -> Self {
        Self::Integer(value)
    }

    /// Create a float variant.
    pub fn float(value: f32) -> Self {
        Self::Float(value)
    }

    /// Create a string variant.
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Create a type reference variant.
    pub fn type_ref(value: TypeRef) -> Self {
        Self::TypeRef(value)
    }

    /// Create an object reference variant.
    pub fn object_ref(value: ObjectRef) -> Self {
        Self::ObjectRef(value)
    }

    /// Create an array variant from optional elements.
    pub fn array(elements: impl IntoIterator<Item = Option<Variant>>) -> Self {
        Self::Array(elements.into_iter().collect())
    }

    /// Create an empty array variant.
    pub fn empty_array() -> Self {
        Self::Array(Vec::new())
    }

    /// The zero-initialized variant of a kind.
    pub fn zero(kind: Kind) -> Self {
        match kind {
            Kind::None => Self::None,
            Kind::Boolean => Self::Boolean(false),
            Kind::Integer => Self::Integer(0),
            Kind::Float => Self::Float(0.0),
            Kind::String => Self::String(String::new()),
            Kind::TypeRef => Self::TypeRef(TypeRef::none()),
            Kind::ObjectRef => Self::ObjectRef(ObjectRef::none()),
            Kind::Array => Self::Array(Vec::new()),
        }
    }

    /// Get the current kind tag.
    pub fn kind(&self) -> Kind {
        match self {
            Self::None => Kind::None,
            Self::Boolean(_) => Kind::Boolean,
            Self::Integer(_) => Kind::Integer,
            Self::Float(_) => Kind::Float,
            Self::String(_) => Kind::String,
            Self::TypeRef(_) => Kind::TypeRef,
            Self::ObjectRef(_) => Kind::ObjectRef,
            Self::Array(_) => Kind::Array,
        }
    }

    /// Check if this variant holds no value.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    // ==================== Getters ====================

    /// Get the boolean value, or `false` for any other kind.
    pub fn as_boolean(&self) -> bool {
        match self {
            Self::Boolean(b) => *b,
            _ => false,
        }
    }

    /// Get the integer value, or `0` for any other kind.
    pub fn as_integer(&self) -> i32 {
        match self {
            Self::Integer(i) => *i,
            _ => 0,
        }
    }

    /// Get the float value, or `0.0` for any other kind.
    pub fn as_float(&self) -> f32 {
        match self {
            Self::Float(f) => *f,
            _ => 0.0,
        }
    }

    /// Get the string value, or `""` for any other kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::String(s) => s,
            _ => "",
        }
    }

    /// Get the type reference, or an absent reference for any other kind.
    pub fn as_type_ref(&self) -> TypeRef {
        match self {
            Self::TypeRef(r) => r.clone(),
            _ => TypeRef::none(),
        }
    }

    /// Get the object reference, or an absent reference for any other kind.
    pub fn as_object_ref(&self) -> ObjectRef {
        match self {
            Self::ObjectRef(r) => r.clone(),
            _ => ObjectRef::none(),
        }
    }

    /// Get the array elements, or an empty slice for any other kind.
    pub fn as_array(&self) -> &[Option<Variant>] {
        match self {
            Self::Array(elements) => elements,
            _ => &[],
        }
    }

    // ==================== Setters ====================

    /// Replace the payload with a boolean.
    pub fn set_boolean(&mut self, value: bool) -> bool {
        *self = Self::Boolean(value);
        value
    }

    /// Replace the payload with an integer.
    pub fn set_integer(&mut self, value: i32) -> i32 {
        *self = Self::Integer(value);
        value
    }

    /// Replace the payload with a float.
    pub fn set_float(&mut self, value: f32) -> f32 {
        *self = Self::Float(value);
        value
    }

    /// Replace the payload with a string and return the stored text.
    pub fn set_string(&mut self, value: impl Into<String>) -> &str {
        *self = Self::String(value.into());
        self.as_str()
    }

    /// Replace the payload with a type reference.
    pub fn set_type_ref(&mut self, value: TypeRef) -> TypeRef {
        *self = Self::TypeRef(value.clone());
        value
    }

    /// Replace the payload with an object reference.
    pub fn set_object_ref(&mut self, value: ObjectRef) -> ObjectRef {
        *self = Self::ObjectRef(value.clone());
        value
    }

    /// Replace the payload with an empty array and return it for filling.
    pub fn set_array(&mut self) -> &mut Vec<Option<Variant>> {
        *self = Self::Array(Vec::new());
        match self {
            Self::Array(elements) => elements,
            _ => unreachable!("variant was just set to an array"),
        }
    }

    /// Drop the payload and return to `None`.
    pub fn clear(&mut self) {
        *self = Self::None;
    }

    // ==================== Array access ====================

    /// Mutable access to the array elements, if this is an array.
    pub fn array_mut(&mut self) -> Option<&mut Vec<Option<Variant>>> {
        match self {
            Self::Array(elements) => Some(elements),
            _ => None,
        }
    }

    /// Append an element. Returns `false` and leaves the variant untouched
    /// if it is not an array.
    pub fn push(&mut self, element: impl Into<Option<Variant>>) -> bool {
        match self.array_mut() {
            Some(elements) => {
                elements.push(element.into());
                true
            }
            None => false,
        }
    }

    /// Remove the element at `index`.
    ///
    /// The outer `Option` is `None` when this is not an array or the index
    /// is out of bounds; the inner one is the slot itself.
    pub fn remove(&mut self, index: usize) -> Option<Option<Variant>> {
        let elements = self.array_mut()?;
        (index < elements.len()).then(|| elements.remove(index))
    }

    /// Get the element at `index`; null slots and out-of-range indices
    /// both read as `None`.
    pub fn get(&self, index: usize) -> Option<&Variant> {
        self.as_array().get(index).and_then(Option::as_ref)
    }

    /// Number of array elements (0 for non-arrays).
    pub fn len(&self) -> usize {
        self.as_array().len()
    }

    /// Check if there are no array elements.
    pub fn is_empty(&self) -> bool {
        self.as_array().is_empty()
    }

    // ==================== Rendering ====================

    /// Render as `Kind(value)`, recursing into arrays.
    ///
    /// Array elements go on their own lines, indented by two spaces and
    /// comma-joined; null elements render as `None`.
    pub fn debug_string(&self) -> String {
        match self {
            Self::None => "None".to_string(),
            Self::Boolean(b) => format!("Boolean({b})"),
            Self::Integer(i) => format!("Integer({i})"),
            Self::Float(f) => format!("Float({f:.6})"),
            Self::String(s) => format!("String(\"{s}\")"),
            Self::TypeRef(r) => format!("TypeRef({})", r.display_name()),
            Self::ObjectRef(r) => format!("ObjectRef({})", r.display_name()),
            Self::Array(elements) => {
                let body = elements
                    .iter()
                    .map(|element| {
                        let rendered = element
                            .as_ref()
                            .map_or_else(|| "None".to_string(), Variant::debug_string);
                        format!("\n  {}", rendered.replace('\n', "\n  "))
                    })
                    .join(",");
                format!("Array[{body}\n]")
            }
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug_string())
    }
}

impl From<bool> for Variant {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i32> for Variant {
    fn from(i: i32) -> Self {
        Self::Integer(i)
    }
}

impl From<f32> for Variant {
    fn from(f: f32) -> Self {
        Self::Float(f)
    }
}

impl From<String> for Variant {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Variant {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<TypeRef> for Variant {
    fn from(r: TypeRef) -> Self {
        Self::TypeRef(r)
    }
}

impl From<ObjectRef> for Variant {
    fn from(r: ObjectRef) -> Self {
        Self::ObjectRef(r)
    }
}

impl From<Vec<Variant>> for Variant {
    fn from(elements: Vec<Variant>) -> Self {
        Self::Array(elements.into_iter().map(Some).collect())
    }
}

impl From<Vec<Option<Variant>>> for Variant {
    fn from(elements: Vec<Option<Variant>>) -> Self {
        Self::Array(elements)
    }
}
