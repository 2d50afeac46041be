//! Device-capture bundles: signature pad, location, image upload and code
//! scanners.
//!
//! The filler's device produces the value; these bundles only check that
//! what arrives has the expected textual shape.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::attributes::{
    self, check_label_and_helper, check_range, is_blank, labeled_properties,
    satisfies_required, LabeledAttributes,
};
use super::behavior::{
    DesignView, FieldBehavior, FillControl, FillView, PaletteEntry, PaletteGroup,
    PropertyDescriptor, PropertyKind, Symbology,
};
use super::{AttributeMap, FieldInstance, FieldType};
use crate::error::CoreError;

/// Allowed image upload size limits, in megabytes.
pub const IMAGE_UPLOAD_SIZE_MB: (u32, u32) = (1, 50);

static LAT_LNG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-?\d{1,3}(?:\.\d+)?)\s*,\s*(-?\d{1,3}(?:\.\d+)?)\s*$")
        .expect("valid lat,lng regex")
});

static IMAGE_DATA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/[a-zA-Z0-9.+-]+;base64,[A-Za-z0-9+/=]+$")
        .expect("valid data url regex")
});

static HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid url regex"));

/// Parse `"lat,lng"` into coordinates within valid ranges.
pub fn parse_lat_lng(raw: &str) -> Option<(f64, f64)> {
    let caps = LAT_LNG.captures(raw)?;
    let lat: f64 = caps[1].parse().ok()?;
    let lng: f64 = caps[2].parse().ok()?;
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)).then_some((lat, lng))
}

pub fn is_image_data_url(raw: &str) -> bool {
    IMAGE_DATA_URL.is_match(raw.trim())
}

pub fn is_http_url(raw: &str) -> bool {
    HTTP_URL.is_match(raw.trim())
}

fn capture_card(field: &FieldInstance) -> DesignView {
    DesignView {
        id: field.id.clone(),
        field_type: field.field_type,
        label: field.display_label(),
        summary: None,
        required: field.is_required(),
    }
}

fn check_labeled(field_type: FieldType, attrs: &AttributeMap) -> Result<(), CoreError> {
    attributes::parse::<LabeledAttributes>(field_type, attrs)?.check(field_type)
}

// ---------------------------------------------------------------------------
// SignatureField
// ---------------------------------------------------------------------------

/// Hand-drawn signature, submitted as an image data URL.
pub struct SignatureFieldBehavior;

impl FieldBehavior for SignatureFieldBehavior {
    fn field_type(&self) -> FieldType {
        FieldType::SignatureField
    }

    fn palette(&self) -> PaletteEntry {
        PaletteEntry {
            field_type: FieldType::SignatureField,
            label: "Signature Field",
            group: PaletteGroup::Capture,
        }
    }

    fn default_attributes(&self) -> AttributeMap {
        attributes::to_map(&LabeledAttributes::new("Signature", "Sign here"))
    }

    fn property_editor(&self) -> Vec<PropertyDescriptor> {
        labeled_properties()
    }

    fn check_attributes(&self, attrs: &AttributeMap) -> Result<(), CoreError> {
        check_labeled(FieldType::SignatureField, attrs)
    }

    fn design_view(&self, field: &FieldInstance) -> DesignView {
        capture_card(field)
    }

    fn fill_view(&self, field: &FieldInstance) -> FillView {
        FillView::labelled(field, FillControl::Signature)
    }

    fn validate(&self, field: &FieldInstance, raw: &str) -> bool {
        if is_blank(raw) {
            return satisfies_required(field, raw);
        }
        is_image_data_url(raw)
    }
}

// ---------------------------------------------------------------------------
// LocationField
// ---------------------------------------------------------------------------

/// Geolocation, submitted as `"lat,lng"`.
pub struct LocationFieldBehavior;

impl FieldBehavior for LocationFieldBehavior {
    fn field_type(&self) -> FieldType {
        FieldType::LocationField
    }

    fn palette(&self) -> PaletteEntry {
        PaletteEntry {
            field_type: FieldType::LocationField,
            label: "Location Field",
            group: PaletteGroup::Capture,
        }
    }

    fn default_attributes(&self) -> AttributeMap {
        attributes::to_map(&LabeledAttributes::new(
            "Location",
            "Capture the current location",
        ))
    }

    fn property_editor(&self) -> Vec<PropertyDescriptor> {
        labeled_properties()
    }

    fn check_attributes(&self, attrs: &AttributeMap) -> Result<(), CoreError> {
        check_labeled(FieldType::LocationField, attrs)
    }

    fn design_view(&self, field: &FieldInstance) -> DesignView {
        capture_card(field)
    }

    fn fill_view(&self, field: &FieldInstance) -> FillView {
        FillView::labelled(field, FillControl::Location)
    }

    fn validate(&self, field: &FieldInstance, raw: &str) -> bool {
        if is_blank(raw) {
            return satisfies_required(field, raw);
        }
        parse_lat_lng(raw).is_some()
    }
}

// ---------------------------------------------------------------------------
// ImageUploadField
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImageUploadAttributes {
    pub label: String,
    pub helper_text: String,
    pub required: bool,
    pub max_size_mb: u32,
}

impl Default for ImageUploadAttributes {
    fn default() -> Self {
        Self {
            label: "Image upload".to_string(),
            helper_text: "Attach an image".to_string(),
            required: false,
            max_size_mb: 5,
        }
    }
}

/// Image attachment: an uploaded file URL or an inline image data URL.
pub struct ImageUploadFieldBehavior;

impl FieldBehavior for ImageUploadFieldBehavior {
    fn field_type(&self) -> FieldType {
        FieldType::ImageUploadField
    }

    fn palette(&self) -> PaletteEntry {
        PaletteEntry {
            field_type: FieldType::ImageUploadField,
            label: "Image Upload Field",
            group: PaletteGroup::Capture,
        }
    }

    fn default_attributes(&self) -> AttributeMap {
        attributes::to_map(&ImageUploadAttributes::default())
    }

    fn property_editor(&self) -> Vec<PropertyDescriptor> {
        let mut props = labeled_properties();
        props.push(
            PropertyDescriptor::new("maxSizeMb", "Max size (MB)", PropertyKind::Integer).with_range(
                IMAGE_UPLOAD_SIZE_MB.0 as f64,
                IMAGE_UPLOAD_SIZE_MB.1 as f64,
            ),
        );
        props
    }

    fn check_attributes(&self, attrs: &AttributeMap) -> Result<(), CoreError> {
        let a: ImageUploadAttributes = attributes::parse(FieldType::ImageUploadField, attrs)?;
        check_label_and_helper(FieldType::ImageUploadField, &a.label, &a.helper_text)?;
        check_range(
            FieldType::ImageUploadField,
            "maxSizeMb",
            a.max_size_mb as f64,
            IMAGE_UPLOAD_SIZE_MB.0 as f64,
            IMAGE_UPLOAD_SIZE_MB.1 as f64,
        )
    }

    fn design_view(&self, field: &FieldInstance) -> DesignView {
        let max = field.attr_f64("maxSizeMb").unwrap_or(5.0) as u32;
        DesignView {
            summary: Some(format!("up to {max} MB")),
            ..capture_card(field)
        }
    }

    fn fill_view(&self, field: &FieldInstance) -> FillView {
        FillView::labelled(
            field,
            FillControl::ImageUpload {
                max_size_mb: field.attr_f64("maxSizeMb").unwrap_or(5.0) as u32,
            },
        )
    }

    fn validate(&self, field: &FieldInstance, raw: &str) -> bool {
        if is_blank(raw) {
            return satisfies_required(field, raw);
        }
        is_http_url(raw) || is_image_data_url(raw)
    }
}

// ---------------------------------------------------------------------------
// BarcodeField / QRCodeField
// ---------------------------------------------------------------------------

/// Linear barcode scan; any non-empty decoded text is accepted.
pub struct BarcodeFieldBehavior;

impl FieldBehavior for BarcodeFieldBehavior {
    fn field_type(&self) -> FieldType {
        FieldType::BarcodeField
    }

    fn palette(&self) -> PaletteEntry {
        PaletteEntry {
            field_type: FieldType::BarcodeField,
            label: "Barcode Field",
            group: PaletteGroup::Capture,
        }
    }

    fn default_attributes(&self) -> AttributeMap {
        attributes::to_map(&LabeledAttributes::new("Barcode", "Scan a barcode"))
    }

    fn property_editor(&self) -> Vec<PropertyDescriptor> {
        labeled_properties()
    }

    fn check_attributes(&self, attrs: &AttributeMap) -> Result<(), CoreError> {
        check_labeled(FieldType::BarcodeField, attrs)
    }

    fn design_view(&self, field: &FieldInstance) -> DesignView {
        capture_card(field)
    }

    fn fill_view(&self, field: &FieldInstance) -> FillView {
        FillView::labelled(
            field,
            FillControl::Scanner {
                symbology: Symbology::Barcode,
            },
        )
    }

    fn validate(&self, field: &FieldInstance, raw: &str) -> bool {
        satisfies_required(field, raw)
    }
}

pub struct QrCodeFieldBehavior;

impl FieldBehavior for QrCodeFieldBehavior {
    fn field_type(&self) -> FieldType {
        FieldType::QRCodeField
    }

    fn palette(&self) -> PaletteEntry {
        PaletteEntry {
            field_type: FieldType::QRCodeField,
            label: "QR Code Field",
            group: PaletteGroup::Capture,
        }
    }

    fn default_attributes(&self) -> AttributeMap {
        attributes::to_map(&LabeledAttributes::new("QR code", "Scan a QR code"))
    }

    fn property_editor(&self) -> Vec<PropertyDescriptor> {
        labeled_properties()
    }

    fn check_attributes(&self, attrs: &AttributeMap) -> Result<(), CoreError> {
        check_labeled(FieldType::QRCodeField, attrs)
    }

    fn design_view(&self, field: &FieldInstance) -> DesignView {
        capture_card(field)
    }

    fn fill_view(&self, field: &FieldInstance) -> FillView {
        FillView::labelled(
            field,
            FillControl::Scanner {
                symbology: Symbology::QrCode,
            },
        )
    }

    fn validate(&self, field: &FieldInstance, raw: &str) -> bool {
        satisfies_required(field, raw)
    }
}
