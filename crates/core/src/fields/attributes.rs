//! Shared helpers for typed `extraAttributes` bags.
//!
//! Each bundle declares a `#[serde(deny_unknown_fields)]` struct for its
//! attributes; these helpers move between that struct and the untyped
//! [`AttributeMap`] stored on instances.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::behavior::{PropertyDescriptor, PropertyKind};
use super::{AttributeMap, FieldInstance, FieldType};
use crate::error::CoreError;

/// Minimum label length in characters.
pub const LABEL_MIN_LENGTH: usize = 2;

/// Maximum label length in characters.
pub const LABEL_MAX_LENGTH: usize = 50;

/// Maximum helper text length in characters.
pub const HELPER_TEXT_MAX_LENGTH: usize = 200;

/// Maximum placeholder length in characters.
pub const PLACEHOLDER_MAX_LENGTH: usize = 50;

/// Serialize a typed attribute struct into a property bag.
pub fn to_map<T: Serialize>(attributes: &T) -> AttributeMap {
    match serde_json::to_value(attributes) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => AttributeMap::new(),
    }
}

/// Parse a property bag into the typed struct of `field_type`.
///
/// Unknown keys and wrongly typed values are rejected.
pub fn parse<T: DeserializeOwned>(
    field_type: FieldType,
    attributes: &AttributeMap,
) -> Result<T, CoreError> {
    serde_json::from_value(serde_json::Value::Object(attributes.clone())).map_err(|e| {
        CoreError::Validation(format!("Invalid properties for {field_type}: {e}"))
    })
}

/// Check a string property's length in characters.
pub fn check_length(
    field_type: FieldType,
    key: &str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), CoreError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(CoreError::Validation(format!(
            "{field_type}.{key} must be between {min} and {max} characters, got {len}"
        )));
    }
    Ok(())
}

/// Check a numeric property against an inclusive range.
pub fn check_range(
    field_type: FieldType,
    key: &str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), CoreError> {
    if !(min..=max).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{field_type}.{key} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

/// Whether a raw submitted value counts as empty.
pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// The `required` check shared by every input bundle.
pub fn satisfies_required(field: &FieldInstance, raw: &str) -> bool {
    !(field.is_required() && is_blank(raw))
}

// ---------------------------------------------------------------------------
// LabeledAttributes
// ---------------------------------------------------------------------------

/// Attribute shape of fields that only carry a label, helper text and a
/// `required` flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LabeledAttributes {
    pub label: String,
    pub helper_text: String,
    pub required: bool,
}

impl LabeledAttributes {
    pub fn new(label: &str, helper_text: &str) -> Self {
        Self {
            label: label.to_string(),
            helper_text: helper_text.to_string(),
            required: false,
        }
    }

    pub fn check(&self, field_type: FieldType) -> Result<(), CoreError> {
        check_label_and_helper(field_type, &self.label, &self.helper_text)
    }
}

/// Check the label/helper text pair common to all input bundles.
pub fn check_label_and_helper(
    field_type: FieldType,
    label: &str,
    helper_text: &str,
) -> Result<(), CoreError> {
    check_length(field_type, "label", label, LABEL_MIN_LENGTH, LABEL_MAX_LENGTH)?;
    check_length(field_type, "helperText", helper_text, 0, HELPER_TEXT_MAX_LENGTH)
}

/// Property panel rows for label, helper text and the required switch.
pub fn labeled_properties() -> Vec<PropertyDescriptor> {
    vec![
        PropertyDescriptor::new("label", "Label", PropertyKind::Text)
            .with_max_length(LABEL_MAX_LENGTH),
        PropertyDescriptor::new("helperText", "Helper text", PropertyKind::LongText)
            .with_max_length(HELPER_TEXT_MAX_LENGTH),
        PropertyDescriptor::new("required", "Required", PropertyKind::Boolean),
    ]
}

/// Property panel row for a placeholder.
pub fn placeholder_property() -> PropertyDescriptor {
    PropertyDescriptor::new("placeholder", "Placeholder", PropertyKind::Text)
        .with_max_length(PLACEHOLDER_MAX_LENGTH)
}
