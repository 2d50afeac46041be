//! Decorative layout bundles. None of these collect a value.

use serde::{Deserialize, Serialize};

use super::attributes::{self, check_length, check_range};
use super::behavior::{
    DesignView, FieldBehavior, FillControl, FillView, PaletteEntry, PaletteGroup,
    PropertyDescriptor, PropertyKind,
};
use super::{AttributeMap, FieldInstance, FieldType};
use crate::error::CoreError;

/// Maximum length of a title or subtitle.
pub const TITLE_MAX_LENGTH: usize = 100;

/// Maximum length of a paragraph.
pub const PARAGRAPH_MAX_LENGTH: usize = 2000;

/// Allowed spacer heights, in pixels.
pub const SPACER_HEIGHT: (u32, u32) = (5, 200);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeadingAttributes {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParagraphAttributes {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpacerAttributes {
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoAttributes {}

fn layout_card(field: &FieldInstance, summary: Option<String>) -> DesignView {
    DesignView {
        id: field.id.clone(),
        field_type: field.field_type,
        label: field.display_label(),
        summary,
        required: false,
    }
}

fn check_heading(field_type: FieldType, attrs: &AttributeMap) -> Result<(), CoreError> {
    let a: HeadingAttributes = attributes::parse(field_type, attrs)?;
    check_length(field_type, "title", &a.title, 1, TITLE_MAX_LENGTH)
}

fn heading_fill(field: &FieldInstance, level: u8) -> FillView {
    FillView::decorative(
        field,
        FillControl::Heading {
            level,
            text: field.attr_str("title").unwrap_or_default().to_string(),
        },
    )
}

fn title_property() -> PropertyDescriptor {
    PropertyDescriptor::new("title", "Title", PropertyKind::Text).with_max_length(TITLE_MAX_LENGTH)
}

// ---------------------------------------------------------------------------
// TitleField / SubTitleField
// ---------------------------------------------------------------------------

pub struct TitleFieldBehavior;

impl FieldBehavior for TitleFieldBehavior {
    fn field_type(&self) -> FieldType {
        FieldType::TitleField
    }

    fn palette(&self) -> PaletteEntry {
        PaletteEntry {
            field_type: FieldType::TitleField,
            label: "Title Field",
            group: PaletteGroup::Layout,
        }
    }

    fn default_attributes(&self) -> AttributeMap {
        attributes::to_map(&HeadingAttributes {
            title: "Title field".to_string(),
        })
    }

    fn property_editor(&self) -> Vec<PropertyDescriptor> {
        vec![title_property()]
    }

    fn check_attributes(&self, attrs: &AttributeMap) -> Result<(), CoreError> {
        check_heading(FieldType::TitleField, attrs)
    }

    fn design_view(&self, field: &FieldInstance) -> DesignView {
        layout_card(field, None)
    }

    fn fill_view(&self, field: &FieldInstance) -> FillView {
        heading_fill(field, 1)
    }
}

pub struct SubTitleFieldBehavior;

impl FieldBehavior for SubTitleFieldBehavior {
    fn field_type(&self) -> FieldType {
        FieldType::SubTitleField
    }

    fn palette(&self) -> PaletteEntry {
        PaletteEntry {
            field_type: FieldType::SubTitleField,
            label: "SubTitle Field",
            group: PaletteGroup::Layout,
        }
    }

    fn default_attributes(&self) -> AttributeMap {
        attributes::to_map(&HeadingAttributes {
            title: "SubTitle field".to_string(),
        })
    }

    fn property_editor(&self) -> Vec<PropertyDescriptor> {
        vec![title_property()]
    }

    fn check_attributes(&self, attrs: &AttributeMap) -> Result<(), CoreError> {
        check_heading(FieldType::SubTitleField, attrs)
    }

    fn design_view(&self, field: &FieldInstance) -> DesignView {
        layout_card(field, None)
    }

    fn fill_view(&self, field: &FieldInstance) -> FillView {
        heading_fill(field, 2)
    }
}

// ---------------------------------------------------------------------------
// ParagraphField
// ---------------------------------------------------------------------------

pub struct ParagraphFieldBehavior;

impl FieldBehavior for ParagraphFieldBehavior {
    fn field_type(&self) -> FieldType {
        FieldType::ParagraphField
    }

    fn palette(&self) -> PaletteEntry {
        PaletteEntry {
            field_type: FieldType::ParagraphField,
            label: "Paragraph Field",
            group: PaletteGroup::Layout,
        }
    }

    fn default_attributes(&self) -> AttributeMap {
        attributes::to_map(&ParagraphAttributes {
            text: "Text here".to_string(),
        })
    }

    fn property_editor(&self) -> Vec<PropertyDescriptor> {
        vec![PropertyDescriptor::new("text", "Text", PropertyKind::LongText)
            .with_max_length(PARAGRAPH_MAX_LENGTH)]
    }

    fn check_attributes(&self, attrs: &AttributeMap) -> Result<(), CoreError> {
        let a: ParagraphAttributes = attributes::parse(FieldType::ParagraphField, attrs)?;
        check_length(
            FieldType::ParagraphField,
            "text",
            &a.text,
            0,
            PARAGRAPH_MAX_LENGTH,
        )
    }

    fn design_view(&self, field: &FieldInstance) -> DesignView {
        let text = field.attr_str("text").unwrap_or_default();
        let preview: String = text.chars().take(40).collect();
        let summary = if preview.len() < text.len() {
            format!("{preview}...")
        } else {
            preview
        };
        DesignView {
            label: "Paragraph".to_string(),
            ..layout_card(field, Some(summary))
        }
    }

    fn fill_view(&self, field: &FieldInstance) -> FillView {
        FillView::decorative(
            field,
            FillControl::Paragraph {
                text: field.attr_str("text").unwrap_or_default().to_string(),
            },
        )
    }
}

// ---------------------------------------------------------------------------
// SeparatorField
// ---------------------------------------------------------------------------

pub struct SeparatorFieldBehavior;

impl FieldBehavior for SeparatorFieldBehavior {
    fn field_type(&self) -> FieldType {
        FieldType::SeparatorField
    }

    fn palette(&self) -> PaletteEntry {
        PaletteEntry {
            field_type: FieldType::SeparatorField,
            label: "Separator Field",
            group: PaletteGroup::Layout,
        }
    }

    fn default_attributes(&self) -> AttributeMap {
        AttributeMap::new()
    }

    fn property_editor(&self) -> Vec<PropertyDescriptor> {
        Vec::new()
    }

    fn check_attributes(&self, attrs: &AttributeMap) -> Result<(), CoreError> {
        attributes::parse::<NoAttributes>(FieldType::SeparatorField, attrs).map(|_| ())
    }

    fn design_view(&self, field: &FieldInstance) -> DesignView {
        DesignView {
            label: "Separator".to_string(),
            ..layout_card(field, None)
        }
    }

    fn fill_view(&self, field: &FieldInstance) -> FillView {
        FillView::decorative(field, FillControl::Separator)
    }
}

// ---------------------------------------------------------------------------
// SpacerField
// ---------------------------------------------------------------------------

pub struct SpacerFieldBehavior;

impl FieldBehavior for SpacerFieldBehavior {
    fn field_type(&self) -> FieldType {
        FieldType::SpacerField
    }

    fn palette(&self) -> PaletteEntry {
        PaletteEntry {
            field_type: FieldType::SpacerField,
            label: "Spacer Field",
            group: PaletteGroup::Layout,
        }
    }

    fn default_attributes(&self) -> AttributeMap {
        attributes::to_map(&SpacerAttributes { height: 20 })
    }

    fn property_editor(&self) -> Vec<PropertyDescriptor> {
        vec![
            PropertyDescriptor::new("height", "Height (px)", PropertyKind::Integer)
                .with_range(SPACER_HEIGHT.0 as f64, SPACER_HEIGHT.1 as f64),
        ]
    }

    fn check_attributes(&self, attrs: &AttributeMap) -> Result<(), CoreError> {
        let a: SpacerAttributes = attributes::parse(FieldType::SpacerField, attrs)?;
        check_range(
            FieldType::SpacerField,
            "height",
            a.height as f64,
            SPACER_HEIGHT.0 as f64,
            SPACER_HEIGHT.1 as f64,
        )
    }

    fn design_view(&self, field: &FieldInstance) -> DesignView {
        let height = field.attr_f64("height").unwrap_or(20.0) as u32;
        DesignView {
            label: "Spacer".to_string(),
            ..layout_card(field, Some(format!("{height}px")))
        }
    }

    fn fill_view(&self, field: &FieldInstance) -> FillView {
        FillView::decorative(
            field,
            FillControl::Spacer {
                height: field.attr_f64("height").unwrap_or(20.0) as u32,
            },
        )
    }
}
