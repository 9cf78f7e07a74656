//! Tagged property bag.
//!
//! The metadata repository has no notion of discovery types, so every domain
//! record is flattened into an `InstanceProperties` bag. Each attribute keeps
//! its category for as long as it lives in the bag; readers switch on the
//! category before extracting a value.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Primitive values. The concrete type is implied by the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrimitiveValue {
    String(String),
    Int(i64),
    Bool(bool),
    Date(DateTime<Utc>),
}

impl PrimitiveValue {
    pub fn kind(&self) -> &'static str {
        match self {
            PrimitiveValue::String(_) => "string",
            PrimitiveValue::Int(_) => "int",
            PrimitiveValue::Bool(_) => "bool",
            PrimitiveValue::Date(_) => "date",
        }
    }
}

/// Enumeration value. The ordinal is the stored identity; the symbolic name
/// and description are for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    pub ordinal: i32,
    pub symbolic_name: String,
    pub description: String,
}

/// Category of a stored attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyCategory {
    Primitive,
    Enum,
    Map,
    Array,
    Struct,
}

impl fmt::Display for PropertyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyCategory::Primitive => "primitive",
            PropertyCategory::Enum => "enum",
            PropertyCategory::Map => "map",
            PropertyCategory::Array => "array",
            PropertyCategory::Struct => "struct",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Primitive(PrimitiveValue),
    Enum(EnumValue),
    Map(IndexMap<String, PrimitiveValue>),
    Array(Vec<PropertyValue>),
    Struct(InstanceProperties),
}

impl PropertyValue {
    pub fn category(&self) -> PropertyCategory {
        match self {
            PropertyValue::Primitive(_) => PropertyCategory::Primitive,
            PropertyValue::Enum(_) => PropertyCategory::Enum,
            PropertyValue::Map(_) => PropertyCategory::Map,
            PropertyValue::Array(_) => PropertyCategory::Array,
            PropertyValue::Struct(_) => PropertyCategory::Struct,
        }
    }
}

/// Ordered attribute bag with an optional effective time window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceProperties {
    properties: IndexMap<String, PropertyValue>,
    pub effective_from_time: Option<DateTime<Utc>>,
    pub effective_to_time: Option<DateTime<Utc>>,
}

impl InstanceProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an attribute. An overwritten attribute keeps its
    /// original position.
    pub fn set(&mut self, name: &str, value: PropertyValue) {
        self.properties.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        self.properties.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Attribute names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Copy every attribute of `other` into this bag, overwriting on collision.
    pub fn merge(&mut self, other: &InstanceProperties) {
        for (name, value) in other.iter() {
            self.set(name, value.clone());
        }
    }

    pub fn with_effective_window(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.effective_from_time = from;
        self.effective_to_time = to;
        self
    }

    /// Whether the instance is active at `instant`. A missing bound is
    /// unbounded on that side; the upper bound is exclusive.
    pub fn is_active_at(&self, instant: DateTime<Utc>) -> bool {
        let started = self.effective_from_time.map_or(true, |from| from <= instant);
        let not_ended = self.effective_to_time.map_or(true, |to| instant < to);
        started && not_ended
    }
}
