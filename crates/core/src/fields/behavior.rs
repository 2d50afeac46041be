//! The capability interface every field type implements, and the render
//! descriptors it produces.
//!
//! Views are plain serializable data: the designer canvas and the public
//! fill page draw them, this crate never renders anything itself.

use serde::Serialize;

use super::{AttributeMap, FieldInstance, FieldType};
use crate::error::CoreError;
use crate::types::FieldId;

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Section of the designer palette a field type is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PaletteGroup {
    Layout,
    Input,
    Capture,
}

/// A draggable palette button.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteEntry {
    pub field_type: FieldType,
    pub label: &'static str,
    pub group: PaletteGroup,
}

// ---------------------------------------------------------------------------
// Property editor schema
// ---------------------------------------------------------------------------

/// Input widget used for one editable property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    Text,
    LongText,
    Boolean,
    Number,
    Integer,
    StringList,
}

/// One row of the property panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: PropertyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl PropertyDescriptor {
    pub fn new(key: &'static str, label: &'static str, kind: PropertyKind) -> Self {
        Self {
            key,
            label,
            kind,
            min: None,
            max: None,
            max_length: None,
        }
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Compact card shown for an element on the designer canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignView {
    pub id: FieldId,
    pub field_type: FieldType,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Number,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Symbology {
    Barcode,
    QrCode,
}

/// The interactive control a filler sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FillControl {
    Input {
        input_type: InputType,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    TextArea {
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        rows: u8,
    },
    Select {
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        options: Vec<String>,
    },
    Checkbox,
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    Separator,
    Spacer {
        height: u32,
    },
    Signature,
    Location,
    ImageUpload {
        max_size_mb: u32,
    },
    Scanner {
        symbology: Symbology,
    },
}

/// Fill-mode rendering of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillView {
    pub id: FieldId,
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helper_text: Option<String>,
    pub required: bool,
    #[serde(flatten)]
    pub control: FillControl,
}

impl FillView {
    /// View for a labelled input-like field, reading the common attributes.
    pub fn labelled(field: &FieldInstance, control: FillControl) -> Self {
        Self {
            id: field.id.clone(),
            field_type: field.field_type,
            label: field.attr_str("label").map(str::to_string),
            helper_text: field.attr_str("helperText").map(str::to_string),
            required: field.is_required(),
            control,
        }
    }

    /// View for a purely decorative field.
    pub fn decorative(field: &FieldInstance, control: FillControl) -> Self {
        Self {
            id: field.id.clone(),
            field_type: field.field_type,
            label: None,
            helper_text: None,
            required: false,
            control,
        }
    }
}

// ---------------------------------------------------------------------------
// FieldBehavior
// ---------------------------------------------------------------------------

/// Behavior bundle of one field type.
///
/// Implementations are stateless unit structs registered in
/// [`registry`](super::registry).
pub trait FieldBehavior: Send + Sync {
    fn field_type(&self) -> FieldType;

    fn palette(&self) -> PaletteEntry;

    /// The documented default `extraAttributes` for a new instance.
    fn default_attributes(&self) -> AttributeMap;

    /// Editable properties shown in the designer's property panel.
    fn property_editor(&self) -> Vec<PropertyDescriptor>;

    /// Check that a property bag has exactly this type's shape and that
    /// every value is within bounds.
    fn check_attributes(&self, attributes: &AttributeMap) -> Result<(), CoreError>;

    fn design_view(&self, field: &FieldInstance) -> DesignView;

    fn fill_view(&self, field: &FieldInstance) -> FillView;

    /// Whether `raw` is an acceptable submitted value for `field`.
    ///
    /// Decorative fields accept anything.
    fn validate(&self, _field: &FieldInstance, _raw: &str) -> bool {
        true
    }

    /// Build a new instance with default attributes.
    fn construct(&self, id: FieldId) -> FieldInstance {
        FieldInstance::new(id, self.field_type(), self.default_attributes())
    }

    /// Merge a property patch into `field` and return the checked result.
    ///
    /// The original instance is untouched when the patch is rejected.
    fn apply_properties(
        &self,
        field: &FieldInstance,
        patch: &AttributeMap,
    ) -> Result<FieldInstance, CoreError> {
        let mut updated = field.clone();
        for (key, value) in patch {
            updated.extra_attributes.insert(key.clone(), value.clone());
        }
        self.check_attributes(&updated.extra_attributes)?;
        Ok(updated)
    }
}
