//! Category encode/decode helpers.
//!
//! Every `add_*` helper is a no-op when handed `None` (or an empty map or
//! list), so builders can call every setter for every optional field. The
//! `get_*` helpers return `Ok(None)` for an absent attribute and a
//! `TypeMismatch` error when the stored category differs; they never coerce.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::error::{DiscoveryError, Result};

use super::instance::{EnumValue, InstanceProperties, PrimitiveValue, PropertyValue};

/// An enumeration with a storage-stable ordinal table.
///
/// Ordinals are persisted; changing one breaks every stored instance.
pub trait OrdinalEnum: Sized + Copy {
    const TYPE_NAME: &'static str;

    fn ordinal(&self) -> i32;
    fn symbolic_name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn from_ordinal(ordinal: i32) -> Option<Self>;

    fn to_enum_value(&self) -> EnumValue {
        EnumValue {
            ordinal: self.ordinal(),
            symbolic_name: self.symbolic_name().to_string(),
            description: self.description().to_string(),
        }
    }
}

pub fn add_string(properties: &mut InstanceProperties, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        properties.set(
            name,
            PropertyValue::Primitive(PrimitiveValue::String(value.to_string())),
        );
    }
}

pub fn add_int(properties: &mut InstanceProperties, name: &str, value: Option<i64>) {
    if let Some(value) = value {
        properties.set(name, PropertyValue::Primitive(PrimitiveValue::Int(value)));
    }
}

pub fn add_bool(properties: &mut InstanceProperties, name: &str, value: Option<bool>) {
    if let Some(value) = value {
        properties.set(name, PropertyValue::Primitive(PrimitiveValue::Bool(value)));
    }
}

pub fn add_date(properties: &mut InstanceProperties, name: &str, value: Option<DateTime<Utc>>) {
    if let Some(value) = value {
        properties.set(name, PropertyValue::Primitive(PrimitiveValue::Date(value)));
    }
}

pub fn add_enum(
    properties: &mut InstanceProperties,
    name: &str,
    ordinal: i32,
    symbolic_name: &str,
    description: &str,
) {
    properties.set(
        name,
        PropertyValue::Enum(EnumValue {
            ordinal,
            symbolic_name: symbolic_name.to_string(),
            description: description.to_string(),
        }),
    );
}

pub fn add_ordinal_enum<E: OrdinalEnum>(
    properties: &mut InstanceProperties,
    name: &str,
    value: Option<E>,
) {
    if let Some(value) = value {
        properties.set(name, PropertyValue::Enum(value.to_enum_value()));
    }
}

pub fn add_string_map(
    properties: &mut InstanceProperties,
    name: &str,
    map: Option<&BTreeMap<String, String>>,
) {
    let Some(map) = map.filter(|m| !m.is_empty()) else {
        return;
    };
    let entries: IndexMap<String, PrimitiveValue> = map
        .iter()
        .map(|(k, v)| (k.clone(), PrimitiveValue::String(v.clone())))
        .collect();
    properties.set(name, PropertyValue::Map(entries));
}

pub fn add_string_array(properties: &mut InstanceProperties, name: &str, values: Option<&[String]>) {
    let Some(values) = values.filter(|v| !v.is_empty()) else {
        return;
    };
    let elements = values
        .iter()
        .map(|v| PropertyValue::Primitive(PrimitiveValue::String(v.clone())))
        .collect();
    properties.set(name, PropertyValue::Array(elements));
}

fn mismatch(name: &str, expected: &str, actual: &str) -> DiscoveryError {
    DiscoveryError::TypeMismatch {
        name: name.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

fn describe(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Primitive(p) => format!("primitive {}", p.kind()),
        other => other.category().to_string(),
    }
}

fn get_primitive<'a>(
    properties: &'a InstanceProperties,
    name: &str,
    expected: &str,
) -> Result<Option<&'a PrimitiveValue>> {
    match properties.get(name) {
        None => Ok(None),
        Some(PropertyValue::Primitive(p)) => Ok(Some(p)),
        Some(other) => Err(mismatch(name, expected, &describe(other))),
    }
}

pub fn get_string(properties: &InstanceProperties, name: &str) -> Result<Option<String>> {
    match get_primitive(properties, name, "primitive string")? {
        None => Ok(None),
        Some(PrimitiveValue::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(mismatch(name, "primitive string", &format!("primitive {}", other.kind()))),
    }
}

pub fn get_int(properties: &InstanceProperties, name: &str) -> Result<Option<i64>> {
    match get_primitive(properties, name, "primitive int")? {
        None => Ok(None),
        Some(PrimitiveValue::Int(i)) => Ok(Some(*i)),
        Some(other) => Err(mismatch(name, "primitive int", &format!("primitive {}", other.kind()))),
    }
}

pub fn get_bool(properties: &InstanceProperties, name: &str) -> Result<Option<bool>> {
    match get_primitive(properties, name, "primitive bool")? {
        None => Ok(None),
        Some(PrimitiveValue::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(mismatch(name, "primitive bool", &format!("primitive {}", other.kind()))),
    }
}

pub fn get_date(properties: &InstanceProperties, name: &str) -> Result<Option<DateTime<Utc>>> {
    match get_primitive(properties, name, "primitive date")? {
        None => Ok(None),
        Some(PrimitiveValue::Date(d)) => Ok(Some(*d)),
        Some(other) => Err(mismatch(name, "primitive date", &format!("primitive {}", other.kind()))),
    }
}

pub fn get_enum(properties: &InstanceProperties, name: &str) -> Result<Option<EnumValue>> {
    match properties.get(name) {
        None => Ok(None),
        Some(PropertyValue::Enum(e)) => Ok(Some(e.clone())),
        Some(other) => Err(mismatch(name, "enum", &describe(other))),
    }
}

/// Decode an enum attribute through its ordinal table.
pub fn get_ordinal_enum<E: OrdinalEnum>(
    properties: &InstanceProperties,
    name: &str,
) -> Result<Option<E>> {
    let Some(value) = get_enum(properties, name)? else {
        return Ok(None);
    };
    E::from_ordinal(value.ordinal)
        .map(Some)
        .ok_or_else(|| DiscoveryError::UnknownOrdinal {
            name: name.to_string(),
            enum_type: E::TYPE_NAME.to_string(),
            ordinal: value.ordinal,
        })
}

pub fn get_string_map(
    properties: &InstanceProperties,
    name: &str,
) -> Result<Option<BTreeMap<String, String>>> {
    let entries = match properties.get(name) {
        None => return Ok(None),
        Some(PropertyValue::Map(entries)) => entries,
        Some(other) => return Err(mismatch(name, "map", &describe(other))),
    };

    let mut map = BTreeMap::new();
    for (key, value) in entries {
        match value {
            PrimitiveValue::String(s) => {
                map.insert(key.clone(), s.clone());
            }
            other => {
                return Err(mismatch(
                    &format!("{}.{}", name, key),
                    "primitive string",
                    &format!("primitive {}", other.kind()),
                ))
            }
        }
    }
    Ok(Some(map))
}

pub fn get_string_array(properties: &InstanceProperties, name: &str) -> Result<Option<Vec<String>>> {
    let elements = match properties.get(name) {
        None => return Ok(None),
        Some(PropertyValue::Array(elements)) => elements,
        Some(other) => return Err(mismatch(name, "array", &describe(other))),
    };

    elements
        .iter()
        .enumerate()
        .map(|(index, element)| match element {
            PropertyValue::Primitive(PrimitiveValue::String(s)) => Ok(s.clone()),
            other => Err(mismatch(
                &format!("{}[{}]", name, index),
                "primitive string",
                &describe(other),
            )),
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

pub fn get_struct<'a>(
    properties: &'a InstanceProperties,
    name: &str,
) -> Result<Option<&'a InstanceProperties>> {
    match properties.get(name) {
        None => Ok(None),
        Some(PropertyValue::Struct(inner)) => Ok(Some(inner)),
        Some(other) => Err(mismatch(name, "struct", &describe(other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn test_none_is_a_no_op() {
        let mut bag = InstanceProperties::new();
        add_string(&mut bag, "summary", None);
        add_int(&mut bag, "confidenceLevel", None);
        add_date(&mut bag, "reviewDate", None);
        add_string_map(&mut bag, "additionalProperties", None);
        add_string_map(&mut bag, "analysisParameters", Some(&BTreeMap::new()));
        add_string_array(&mut bag, "duplicateAnchorGUIDs", Some(&[][..]));
        assert!(bag.is_empty());
    }

    #[test]
    fn test_enum_read_as_primitive_fails() {
        let mut bag = InstanceProperties::new();
        add_enum(&mut bag, "annotationStatus", 1, "REVIEWED", "The annotation has been reviewed.");

        let err = get_string(&bag, "annotationStatus").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(matches!(err, DiscoveryError::TypeMismatch { .. }));
    }

    #[test]
    fn test_primitive_kind_is_not_coerced() {
        let mut bag = InstanceProperties::new();
        add_int(&mut bag, "confidenceLevel", Some(80));

        assert_eq!(get_int(&bag, "confidenceLevel").unwrap(), Some(80));
        assert!(get_string(&bag, "confidenceLevel").is_err());
        assert!(get_bool(&bag, "confidenceLevel").is_err());
        assert!(get_enum(&bag, "confidenceLevel").is_err());
    }

    #[test]
    fn test_absent_is_none() {
        let bag = InstanceProperties::new();
        assert_eq!(get_string(&bag, "missing").unwrap(), None);
        assert_eq!(get_string_map(&bag, "missing").unwrap(), None);
        assert_eq!(get_string_array(&bag, "missing").unwrap(), None);
        assert!(get_struct(&bag, "missing").unwrap().is_none());
    }

    #[test]
    fn test_string_array_rejects_mixed_elements() {
        let mut bag = InstanceProperties::new();
        bag.set(
            "matchingPropertyNames",
            PropertyValue::Array(vec![
                PropertyValue::Primitive(PrimitiveValue::String("name".to_string())),
                PropertyValue::Primitive(PrimitiveValue::Int(4)),
            ]),
        );
        let err = get_string_array(&bag, "matchingPropertyNames").unwrap_err();
        assert!(err.to_string().contains("matchingPropertyNames[1]"));
    }

    #[test]
    fn test_map_round_trip() {
        let mut bag = InstanceProperties::new();
        let map = BTreeMap::from([
            ("sampleSize".to_string(), "100".to_string()),
            ("mode".to_string(), "full".to_string()),
        ]);
        add_string_map(&mut bag, "analysisParameters", Some(&map));
        assert_eq!(get_string_map(&bag, "analysisParameters").unwrap(), Some(map));
        assert!(get_string_array(&bag, "analysisParameters").is_err());
    }

    fn category_value() -> impl Strategy<Value = PropertyValue> {
        prop_oneof![
            any::<String>().prop_map(|s| PropertyValue::Primitive(PrimitiveValue::String(s))),
            any::<i64>().prop_map(|i| PropertyValue::Primitive(PrimitiveValue::Int(i))),
            any::<bool>().prop_map(|b| PropertyValue::Primitive(PrimitiveValue::Bool(b))),
            (any::<i32>(), "[A-Z_]{1,12}").prop_map(|(ordinal, symbolic_name)| {
                PropertyValue::Enum(EnumValue {
                    ordinal,
                    symbolic_name,
                    description: String::new(),
                })
            }),
            proptest::collection::vec("[a-z]{1,6}", 1..4).prop_map(|v| {
                PropertyValue::Array(
                    v.into_iter()
                        .map(|s| PropertyValue::Primitive(PrimitiveValue::String(s)))
                        .collect(),
                )
            }),
            Just(PropertyValue::Map(IndexMap::new())),
        ]
    }

    proptest! {
        #[test]
        fn prop_reading_the_wrong_category_never_succeeds(value in category_value()) {
            let mut bag = InstanceProperties::new();
            bag.set("attr", value.clone());

            let readers_ok = [
                get_string(&bag, "attr").is_ok(),
                get_int(&bag, "attr").is_ok(),
                get_bool(&bag, "attr").is_ok(),
                get_date(&bag, "attr").is_ok(),
                get_enum(&bag, "attr").is_ok(),
                get_string_map(&bag, "attr").is_ok(),
                get_string_array(&bag, "attr").is_ok(),
            ];
            // Exactly one reader accepts the stored value.
            prop_assert_eq!(readers_ok.iter().filter(|ok| **ok).count(), 1);
        }
    }
}
