//! Process-wide tag → behavior table.
//!
//! Everything that needs type-specific behavior goes through [`behavior`];
//! the match below is the only place that enumerates bundles.

use serde::Serialize;

use super::behavior::{FieldBehavior, PaletteEntry, PropertyDescriptor};
use super::capture::{
    BarcodeFieldBehavior, ImageUploadFieldBehavior, LocationFieldBehavior, QrCodeFieldBehavior,
    SignatureFieldBehavior,
};
use super::input::{
    CheckboxFieldBehavior, DateFieldBehavior, NumberFieldBehavior, SelectFieldBehavior,
    TextAreaFieldBehavior, TextFieldBehavior,
};
use super::layout::{
    ParagraphFieldBehavior, SeparatorFieldBehavior, SpacerFieldBehavior, SubTitleFieldBehavior,
    TitleFieldBehavior,
};
use super::{AttributeMap, FieldInstance, FieldType};
use crate::error::CoreError;
use crate::types::FieldId;

/// Behavior bundle for a tag.
pub fn behavior(field_type: FieldType) -> &'static dyn FieldBehavior {
    match field_type {
        FieldType::TextField => &TextFieldBehavior,
        FieldType::NumberField => &NumberFieldBehavior,
        FieldType::DateField => &DateFieldBehavior,
        FieldType::SelectField => &SelectFieldBehavior,
        FieldType::CheckboxField => &CheckboxFieldBehavior,
        FieldType::TextAreaField => &TextAreaFieldBehavior,
        FieldType::TitleField => &TitleFieldBehavior,
        FieldType::SubTitleField => &SubTitleFieldBehavior,
        FieldType::ParagraphField => &ParagraphFieldBehavior,
        FieldType::SeparatorField => &SeparatorFieldBehavior,
        FieldType::SpacerField => &SpacerFieldBehavior,
        FieldType::SignatureField => &SignatureFieldBehavior,
        FieldType::LocationField => &LocationFieldBehavior,
        FieldType::ImageUploadField => &ImageUploadFieldBehavior,
        FieldType::BarcodeField => &BarcodeFieldBehavior,
        FieldType::QRCodeField => &QrCodeFieldBehavior,
    }
}

/// New instance of `field_type` with its default attributes.
pub fn construct(field_type: FieldType, id: impl Into<FieldId>) -> FieldInstance {
    behavior(field_type).construct(id.into())
}

/// Whether `raw` is acceptable for `field`.
pub fn validate(field: &FieldInstance, raw: &str) -> bool {
    behavior(field.field_type).validate(field, raw)
}

/// Check an instance's attribute bag against its bundle.
pub fn check_instance(field: &FieldInstance) -> Result<(), CoreError> {
    behavior(field.field_type)
        .check_attributes(&field.extra_attributes)
        .map_err(|e| match e {
            CoreError::Validation(msg) => {
                CoreError::Validation(format!("Element '{}': {msg}", field.id))
            }
            other => other,
        })
}

/// Merge a property patch into `field`.
pub fn apply_properties(
    field: &FieldInstance,
    patch: &AttributeMap,
) -> Result<FieldInstance, CoreError> {
    behavior(field.field_type).apply_properties(field, patch)
}

/// Palette buttons in display order.
pub fn palette() -> Vec<PaletteEntry> {
    FieldType::ALL
        .iter()
        .map(|t| behavior(*t).palette())
        .collect()
}

/// A palette entry together with the property editor schema and defaults,
/// as served to the designer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTypeDescriptor {
    #[serde(flatten)]
    pub palette: PaletteEntry,
    pub properties: Vec<PropertyDescriptor>,
    pub defaults: AttributeMap,
}

pub fn catalog() -> Vec<FieldTypeDescriptor> {
    FieldType::ALL
        .iter()
        .map(|t| {
            let b = behavior(*t);
            FieldTypeDescriptor {
                palette: b.palette(),
                properties: b.property_editor(),
                defaults: b.default_attributes(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_bundle_reports_its_own_tag() {
        for t in FieldType::ALL {
            assert_eq!(behavior(t).field_type(), t);
            assert_eq!(behavior(t).palette().field_type, t);
        }
    }

    #[test]
    fn constructed_instances_have_type_and_valid_defaults() {
        for t in FieldType::ALL {
            let field = construct(t, "x");
            assert_eq!(field.field_type, t);
            assert_eq!(field.id, "x");
            check_instance(&field).unwrap();
        }
    }

    #[test]
    fn nothing_is_required_by_default() {
        for t in FieldType::ALL {
            let field = construct(t, "x");
            assert!(!field.is_required(), "{t} required by default");
            assert!(validate(&field, ""), "{t} rejected an empty value");
        }
    }

    #[test]
    fn documented_defaults() {
        let expected = [
            (
                FieldType::TextField,
                json!({"label": "Text field", "helperText": "Helper text", "required": false, "placeholder": "Value here..."}),
            ),
            (
                FieldType::NumberField,
                json!({"label": "Number field", "helperText": "Helper text", "required": false, "placeholder": "0", "min": null, "max": null}),
            ),
            (
                FieldType::DateField,
                json!({"label": "Date field", "helperText": "Pick a date", "required": false}),
            ),
            (
                FieldType::SelectField,
                json!({"label": "Select field", "helperText": "Helper text", "required": false, "placeholder": "Value here...", "options": []}),
            ),
            (
                FieldType::CheckboxField,
                json!({"label": "Checkbox field", "helperText": "Helper text", "required": false}),
            ),
            (
                FieldType::TextAreaField,
                json!({"label": "Text area", "helperText": "Helper text", "required": false, "placeholder": "Value here...", "rows": 3}),
            ),
            (FieldType::TitleField, json!({"title": "Title field"})),
            (FieldType::SubTitleField, json!({"title": "SubTitle field"})),
            (FieldType::ParagraphField, json!({"text": "Text here"})),
            (FieldType::SeparatorField, json!({})),
            (FieldType::SpacerField, json!({"height": 20})),
            (
                FieldType::SignatureField,
                json!({"label": "Signature", "helperText": "Sign here", "required": false}),
            ),
            (
                FieldType::LocationField,
                json!({"label": "Location", "helperText": "Capture the current location", "required": false}),
            ),
            (
                FieldType::ImageUploadField,
                json!({"label": "Image upload", "helperText": "Attach an image", "required": false, "maxSizeMb": 5}),
            ),
            (
                FieldType::BarcodeField,
                json!({"label": "Barcode", "helperText": "Scan a barcode", "required": false}),
            ),
            (
                FieldType::QRCodeField,
                json!({"label": "QR code", "helperText": "Scan a QR code", "required": false}),
            ),
        ];
        assert_eq!(expected.len(), FieldType::ALL.len());
        for (t, attrs) in expected {
            let field = construct(t, "x");
            assert_eq!(serde_json::Value::Object(field.extra_attributes), attrs, "{t}");
        }
    }

    #[test]
    fn check_instance_names_the_element() {
        let mut field = construct(FieldType::TextField, "f9");
        field
            .extra_attributes
            .insert("label".to_string(), json!("x"));
        let err = check_instance(&field).unwrap_err();
        assert!(err.to_string().contains("f9"));
    }

    #[test]
    fn palette_lists_every_type_once() {
        let palette = palette();
        assert_eq!(palette.len(), 16);
        assert_eq!(palette[0].field_type, FieldType::TitleField);
    }

    #[test]
    fn catalog_serializes_flat_entries() {
        let catalog = serde_json::to_value(catalog()).unwrap();
        let spacer = catalog
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["fieldType"] == "SpacerField")
            .unwrap();
        assert_eq!(spacer["group"], "layout");
        assert_eq!(spacer["defaults"]["height"], 20);
        assert_eq!(spacer["properties"][0]["key"], "height");
    }
}
