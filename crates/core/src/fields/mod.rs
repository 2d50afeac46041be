//! Field type catalog (the closed set of form building blocks).
//!
//! A [`FieldInstance`] is one configured occurrence of a [`FieldType`] inside
//! a form. Everything type-specific lives in the behavior bundle returned by
//! [`registry::behavior`]; no other module matches on the tag.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::FieldId;

pub mod attributes;
pub mod behavior;
pub mod capture;
pub mod input;
pub mod layout;
pub mod registry;

pub use behavior::{
    DesignView, FieldBehavior, FillControl, FillView, InputType, PaletteEntry, PaletteGroup,
    PropertyDescriptor, PropertyKind, Symbology,
};

/// Type-specific property bag of a field instance (`extraAttributes`).
pub type AttributeMap = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// FieldType
// ---------------------------------------------------------------------------

/// Tag selecting a field instance's behavior bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldType {
    TextField,
    NumberField,
    DateField,
    SelectField,
    CheckboxField,
    TextAreaField,
    TitleField,
    SubTitleField,
    ParagraphField,
    SeparatorField,
    SpacerField,
    SignatureField,
    LocationField,
    ImageUploadField,
    BarcodeField,
    QRCodeField,
}

impl FieldType {
    /// Every tag, in palette order.
    pub const ALL: [FieldType; 16] = [
        Self::TitleField,
        Self::SubTitleField,
        Self::ParagraphField,
        Self::SeparatorField,
        Self::SpacerField,
        Self::TextField,
        Self::NumberField,
        Self::TextAreaField,
        Self::DateField,
        Self::SelectField,
        Self::CheckboxField,
        Self::SignatureField,
        Self::LocationField,
        Self::ImageUploadField,
        Self::BarcodeField,
        Self::QRCodeField,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextField => "TextField",
            Self::NumberField => "NumberField",
            Self::DateField => "DateField",
            Self::SelectField => "SelectField",
            Self::CheckboxField => "CheckboxField",
            Self::TextAreaField => "TextAreaField",
            Self::TitleField => "TitleField",
            Self::SubTitleField => "SubTitleField",
            Self::ParagraphField => "ParagraphField",
            Self::SeparatorField => "SeparatorField",
            Self::SpacerField => "SpacerField",
            Self::SignatureField => "SignatureField",
            Self::LocationField => "LocationField",
            Self::ImageUploadField => "ImageUploadField",
            Self::BarcodeField => "BarcodeField",
            Self::QRCodeField => "QRCodeField",
        }
    }
}

impl FromStr for FieldType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown field type: '{s}'")))
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FieldInstance
// ---------------------------------------------------------------------------

/// One configured field inside an element tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInstance {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub extra_attributes: AttributeMap,
}

impl FieldInstance {
    pub fn new(id: impl Into<FieldId>, field_type: FieldType, extra_attributes: AttributeMap) -> Self {
        Self {
            id: id.into(),
            field_type,
            extra_attributes,
        }
    }

    /// String attribute, `None` when absent or not a string.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.extra_attributes.get(key).and_then(|v| v.as_str())
    }

    /// Boolean attribute, `false` when absent.
    pub fn attr_bool(&self, key: &str) -> bool {
        self.extra_attributes
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// Numeric attribute, `None` when absent or null.
    pub fn attr_f64(&self, key: &str) -> Option<f64> {
        self.extra_attributes.get(key).and_then(|v| v.as_f64())
    }

    /// String-list attribute, empty when absent.
    pub fn attr_list(&self, key: &str) -> Vec<String> {
        self.extra_attributes
            .get(key)
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| i.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The `required` flag; decorative fields never carry one.
    pub fn is_required(&self) -> bool {
        self.attr_bool("required")
    }

    /// Human label used in validation messages and the designer.
    pub fn display_label(&self) -> String {
        self.attr_str("label")
            .or_else(|| self.attr_str("title"))
            .map(str::to_string)
            .unwrap_or_else(|| self.field_type.to_string())
    }
}

/// Generate a fresh, globally unique field id.
pub fn new_field_id() -> FieldId {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_type_round_trips_through_str() {
        for t in FieldType::ALL {
            assert_eq!(FieldType::from_str(t.as_str()).unwrap(), t);
        }
    }

    #[test]
    fn unknown_field_type_rejected() {
        assert!(FieldType::from_str("RichTextField").is_err());
    }

    #[test]
    fn all_tags_are_distinct() {
        let mut tags = FieldType::ALL.to_vec();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), 16);
    }

    #[test]
    fn instance_wire_format_uses_type_and_extra_attributes() {
        let field: FieldInstance = serde_json::from_value(json!({
            "id": "f1",
            "type": "TextField",
            "extraAttributes": {"label": "Name", "required": true}
        }))
        .unwrap();
        assert_eq!(field.field_type, FieldType::TextField);
        assert!(field.is_required());
        assert_eq!(field.display_label(), "Name");

        let back = serde_json::to_value(&field).unwrap();
        assert_eq!(back["type"], "TextField");
        assert_eq!(back["extraAttributes"]["label"], "Name");
    }

    #[test]
    fn display_label_falls_back_to_type() {
        let field = FieldInstance::new("s", FieldType::SeparatorField, AttributeMap::new());
        assert_eq!(field.display_label(), "SeparatorField");
    }

    #[test]
    fn new_field_ids_are_unique() {
        assert_ne!(new_field_id(), new_field_id());
    }
}
