//! Data-entry field bundles: text, number, date, select, checkbox and
//! text area.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use super::attributes::{
    self, check_label_and_helper, check_length, check_range, is_blank, labeled_properties,
    placeholder_property, satisfies_required, LabeledAttributes, PLACEHOLDER_MAX_LENGTH,
};
use super::behavior::{
    DesignView, FieldBehavior, FillControl, FillView, InputType, PaletteEntry, PaletteGroup,
    PropertyDescriptor, PropertyKind,
};
use super::{AttributeMap, FieldInstance, FieldType};
use crate::error::CoreError;

/// Maximum number of options on a select field.
pub const MAX_SELECT_OPTIONS: usize = 100;

/// Maximum length of a single select option.
pub const MAX_OPTION_LENGTH: usize = 100;

/// Allowed text area heights, in rows.
pub const TEXT_AREA_ROWS: (u8, u8) = (1, 10);

fn non_empty(s: Option<&str>) -> Option<String> {
    s.filter(|v| !v.is_empty()).map(str::to_string)
}

fn design_card(field: &FieldInstance, summary: Option<String>) -> DesignView {
    DesignView {
        id: field.id.clone(),
        field_type: field.field_type,
        label: field.display_label(),
        summary,
        required: field.is_required(),
    }
}

// ---------------------------------------------------------------------------
// TextField
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextAttributes {
    pub label: String,
    pub helper_text: String,
    pub required: bool,
    pub placeholder: String,
}

impl Default for TextAttributes {
    fn default() -> Self {
        Self {
            label: "Text field".to_string(),
            helper_text: "Helper text".to_string(),
            required: false,
            placeholder: "Value here...".to_string(),
        }
    }
}

/// Single-line free text.
pub struct TextFieldBehavior;

impl FieldBehavior for TextFieldBehavior {
    fn field_type(&self) -> FieldType {
        FieldType::TextField
    }

    fn palette(&self) -> PaletteEntry {
        PaletteEntry {
            field_type: FieldType::TextField,
            label: "Text Field",
            group: PaletteGroup::Input,
        }
    }

    fn default_attributes(&self) -> AttributeMap {
        attributes::to_map(&TextAttributes::default())
    }

    fn property_editor(&self) -> Vec<PropertyDescriptor> {
        let mut props = labeled_properties();
        props.push(placeholder_property());
        props
    }

    fn check_attributes(&self, attrs: &AttributeMap) -> Result<(), CoreError> {
        let a: TextAttributes = attributes::parse(FieldType::TextField, attrs)?;
        check_label_and_helper(FieldType::TextField, &a.label, &a.helper_text)?;
        check_length(
            FieldType::TextField,
            "placeholder",
            &a.placeholder,
            0,
            PLACEHOLDER_MAX_LENGTH,
        )
    }

    fn design_view(&self, field: &FieldInstance) -> DesignView {
        design_card(field, non_empty(field.attr_str("placeholder")))
    }

    fn fill_view(&self, field: &FieldInstance) -> FillView {
        FillView::labelled(
            field,
            FillControl::Input {
                input_type: InputType::Text,
                placeholder: non_empty(field.attr_str("placeholder")),
                min: None,
                max: None,
            },
        )
    }

    fn validate(&self, field: &FieldInstance, raw: &str) -> bool {
        satisfies_required(field, raw)
    }
}

// ---------------------------------------------------------------------------
// NumberField
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NumberAttributes {
    pub label: String,
    pub helper_text: String,
    pub required: bool,
    pub placeholder: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Default for NumberAttributes {
    fn default() -> Self {
        Self {
            label: "Number field".to_string(),
            helper_text: "Helper text".to_string(),
            required: false,
            placeholder: "0".to_string(),
            min: None,
            max: None,
        }
    }
}

/// Numeric input with optional inclusive bounds.
pub struct NumberFieldBehavior;

impl FieldBehavior for NumberFieldBehavior {
    fn field_type(&self) -> FieldType {
        FieldType::NumberField
    }

    fn palette(&self) -> PaletteEntry {
        PaletteEntry {
            field_type: FieldType::NumberField,
            label: "Number Field",
            group: PaletteGroup::Input,
        }
    }

    fn default_attributes(&self) -> AttributeMap {
        attributes::to_map(&NumberAttributes::default())
    }

    fn property_editor(&self) -> Vec<PropertyDescriptor> {
        let mut props = labeled_properties();
        props.push(placeholder_property());
        props.push(PropertyDescriptor::new("min", "Minimum", PropertyKind::Number));
        props.push(PropertyDescriptor::new("max", "Maximum", PropertyKind::Number));
        props
    }

    fn check_attributes(&self, attrs: &AttributeMap) -> Result<(), CoreError> {
        let a: NumberAttributes = attributes::parse(FieldType::NumberField, attrs)?;
        check_label_and_helper(FieldType::NumberField, &a.label, &a.helper_text)?;
        check_length(
            FieldType::NumberField,
            "placeholder",
            &a.placeholder,
            0,
            PLACEHOLDER_MAX_LENGTH,
        )?;
        if let (Some(min), Some(max)) = (a.min, a.max) {
            if min > max {
                return Err(CoreError::Validation(format!(
                    "NumberField.min ({min}) must not exceed max ({max})"
                )));
            }
        }
        Ok(())
    }

    fn design_view(&self, field: &FieldInstance) -> DesignView {
        let summary = match (field.attr_f64("min"), field.attr_f64("max")) {
            (Some(min), Some(max)) => Some(format!("between {min} and {max}")),
            (Some(min), None) => Some(format!("at least {min}")),
            (None, Some(max)) => Some(format!("at most {max}")),
            (None, None) => None,
        };
        design_card(field, summary)
    }

    fn fill_view(&self, field: &FieldInstance) -> FillView {
        FillView::labelled(
            field,
            FillControl::Input {
                input_type: InputType::Number,
                placeholder: non_empty(field.attr_str("placeholder")),
                min: field.attr_f64("min"),
                max: field.attr_f64("max"),
            },
        )
    }

    fn validate(&self, field: &FieldInstance, raw: &str) -> bool {
        if is_blank(raw) {
            return satisfies_required(field, raw);
        }
        let Ok(value) = raw.trim().parse::<f64>() else {
            return false;
        };
        if !value.is_finite() {
            return false;
        }
        let above_min = field.attr_f64("min").map_or(true, |min| value >= min);
        let below_max = field.attr_f64("max").map_or(true, |max| value <= max);
        above_min && below_max
    }
}

// ---------------------------------------------------------------------------
// DateField
// ---------------------------------------------------------------------------

/// Calendar date; accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
pub struct DateFieldBehavior;

impl DateFieldBehavior {
    fn defaults() -> LabeledAttributes {
        LabeledAttributes::new("Date field", "Pick a date")
    }

    fn parses_as_date(raw: &str) -> bool {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
            || DateTime::parse_from_rfc3339(raw).is_ok()
    }
}

impl FieldBehavior for DateFieldBehavior {
    fn field_type(&self) -> FieldType {
        FieldType::DateField
    }

    fn palette(&self) -> PaletteEntry {
        PaletteEntry {
            field_type: FieldType::DateField,
            label: "Date Field",
            group: PaletteGroup::Input,
        }
    }

    fn default_attributes(&self) -> AttributeMap {
        attributes::to_map(&Self::defaults())
    }

    fn property_editor(&self) -> Vec<PropertyDescriptor> {
        labeled_properties()
    }

    fn check_attributes(&self, attrs: &AttributeMap) -> Result<(), CoreError> {
        attributes::parse::<LabeledAttributes>(FieldType::DateField, attrs)?
            .check(FieldType::DateField)
    }

    fn design_view(&self, field: &FieldInstance) -> DesignView {
        design_card(field, None)
    }

    fn fill_view(&self, field: &FieldInstance) -> FillView {
        FillView::labelled(
            field,
            FillControl::Input {
                input_type: InputType::Date,
                placeholder: None,
                min: None,
                max: None,
            },
        )
    }

    fn validate(&self, field: &FieldInstance, raw: &str) -> bool {
        if is_blank(raw) {
            return satisfies_required(field, raw);
        }
        Self::parses_as_date(raw)
    }
}

// ---------------------------------------------------------------------------
// SelectField
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SelectAttributes {
    pub label: String,
    pub helper_text: String,
    pub required: bool,
    pub placeholder: String,
    pub options: Vec<String>,
}

impl Default for SelectAttributes {
    fn default() -> Self {
        Self {
            label: "Select field".to_string(),
            helper_text: "Helper text".to_string(),
            required: false,
            placeholder: "Value here...".to_string(),
            options: Vec::new(),
        }
    }
}

/// Single choice from a fixed option list.
pub struct SelectFieldBehavior;

impl FieldBehavior for SelectFieldBehavior {
    fn field_type(&self) -> FieldType {
        FieldType::SelectField
    }

    fn palette(&self) -> PaletteEntry {
        PaletteEntry {
            field_type: FieldType::SelectField,
            label: "Select Field",
            group: PaletteGroup::Input,
        }
    }

    fn default_attributes(&self) -> AttributeMap {
        attributes::to_map(&SelectAttributes::default())
    }

    fn property_editor(&self) -> Vec<PropertyDescriptor> {
        let mut props = labeled_properties();
        props.push(placeholder_property());
        props.push(
            PropertyDescriptor::new("options", "Options", PropertyKind::StringList)
                .with_max_length(MAX_OPTION_LENGTH),
        );
        props
    }

    fn check_attributes(&self, attrs: &AttributeMap) -> Result<(), CoreError> {
        let a: SelectAttributes = attributes::parse(FieldType::SelectField, attrs)?;
        check_label_and_helper(FieldType::SelectField, &a.label, &a.helper_text)?;
        check_length(
            FieldType::SelectField,
            "placeholder",
            &a.placeholder,
            0,
            PLACEHOLDER_MAX_LENGTH,
        )?;
        if a.options.len() > MAX_SELECT_OPTIONS {
            return Err(CoreError::Validation(format!(
                "SelectField supports at most {MAX_SELECT_OPTIONS} options, got {}",
                a.options.len()
            )));
        }
        for (i, option) in a.options.iter().enumerate() {
            check_length(FieldType::SelectField, "options", option, 1, MAX_OPTION_LENGTH)?;
            if a.options[..i].contains(option) {
                return Err(CoreError::Validation(format!(
                    "SelectField option '{option}' is listed more than once"
                )));
            }
        }
        Ok(())
    }

    fn design_view(&self, field: &FieldInstance) -> DesignView {
        let count = field.attr_list("options").len();
        let summary = match count {
            0 => "no options yet".to_string(),
            1 => "1 option".to_string(),
            n => format!("{n} options"),
        };
        design_card(field, Some(summary))
    }

    fn fill_view(&self, field: &FieldInstance) -> FillView {
        FillView::labelled(
            field,
            FillControl::Select {
                placeholder: non_empty(field.attr_str("placeholder")),
                options: field.attr_list("options"),
            },
        )
    }

    fn validate(&self, field: &FieldInstance, raw: &str) -> bool {
        if is_blank(raw) {
            return satisfies_required(field, raw);
        }
        let options = field.attr_list("options");
        options.is_empty() || options.iter().any(|o| o == raw)
    }
}

// ---------------------------------------------------------------------------
// CheckboxField
// ---------------------------------------------------------------------------

/// Boolean tick box; submitted as `"true"` / `"false"`.
///
/// A required checkbox must be ticked.
pub struct CheckboxFieldBehavior;

impl CheckboxFieldBehavior {
    fn defaults() -> LabeledAttributes {
        LabeledAttributes::new("Checkbox field", "Helper text")
    }
}

impl FieldBehavior for CheckboxFieldBehavior {
    fn field_type(&self) -> FieldType {
        FieldType::CheckboxField
    }

    fn palette(&self) -> PaletteEntry {
        PaletteEntry {
            field_type: FieldType::CheckboxField,
            label: "Checkbox Field",
            group: PaletteGroup::Input,
        }
    }

    fn default_attributes(&self) -> AttributeMap {
        attributes::to_map(&Self::defaults())
    }

    fn property_editor(&self) -> Vec<PropertyDescriptor> {
        labeled_properties()
    }

    fn check_attributes(&self, attrs: &AttributeMap) -> Result<(), CoreError> {
        attributes::parse::<LabeledAttributes>(FieldType::CheckboxField, attrs)?
            .check(FieldType::CheckboxField)
    }

    fn design_view(&self, field: &FieldInstance) -> DesignView {
        design_card(field, None)
    }

    fn fill_view(&self, field: &FieldInstance) -> FillView {
        FillView::labelled(field, FillControl::Checkbox)
    }

    fn validate(&self, field: &FieldInstance, raw: &str) -> bool {
        match raw.trim() {
            "true" => true,
            "" | "false" => !field.is_required(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// TextAreaField
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextAreaAttributes {
    pub label: String,
    pub helper_text: String,
    pub required: bool,
    pub placeholder: String,
    pub rows: u8,
}

impl Default for TextAreaAttributes {
    fn default() -> Self {
        Self {
            label: "Text area".to_string(),
            helper_text: "Helper text".to_string(),
            required: false,
            placeholder: "Value here...".to_string(),
            rows: 3,
        }
    }
}

/// Multi-line free text.
pub struct TextAreaFieldBehavior;

impl FieldBehavior for TextAreaFieldBehavior {
    fn field_type(&self) -> FieldType {
        FieldType::TextAreaField
    }

    fn palette(&self) -> PaletteEntry {
        PaletteEntry {
            field_type: FieldType::TextAreaField,
            label: "TextArea Field",
            group: PaletteGroup::Input,
        }
    }

    fn default_attributes(&self) -> AttributeMap {
        attributes::to_map(&TextAreaAttributes::default())
    }

    fn property_editor(&self) -> Vec<PropertyDescriptor> {
        let mut props = labeled_properties();
        props.push(placeholder_property());
        props.push(
            PropertyDescriptor::new("rows", "Rows", PropertyKind::Integer)
                .with_range(TEXT_AREA_ROWS.0 as f64, TEXT_AREA_ROWS.1 as f64),
        );
        props
    }

    fn check_attributes(&self, attrs: &AttributeMap) -> Result<(), CoreError> {
        let a: TextAreaAttributes = attributes::parse(FieldType::TextAreaField, attrs)?;
        check_label_and_helper(FieldType::TextAreaField, &a.label, &a.helper_text)?;
        check_length(
            FieldType::TextAreaField,
            "placeholder",
            &a.placeholder,
            0,
            PLACEHOLDER_MAX_LENGTH,
        )?;
        check_range(
            FieldType::TextAreaField,
            "rows",
            a.rows as f64,
            TEXT_AREA_ROWS.0 as f64,
            TEXT_AREA_ROWS.1 as f64,
        )
    }

    fn design_view(&self, field: &FieldInstance) -> DesignView {
        let rows = field.attr_f64("rows").unwrap_or(3.0) as u8;
        design_card(field, Some(format!("{rows} rows")))
    }

    fn fill_view(&self, field: &FieldInstance) -> FillView {
        FillView::labelled(
            field,
            FillControl::TextArea {
                placeholder: non_empty(field.attr_str("placeholder")),
                rows: field.attr_f64("rows").unwrap_or(3.0) as u8,
            },
        )
    }

    fn validate(&self, field: &FieldInstance, raw: &str) -> bool {
        satisfies_required(field, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with(behavior: &dyn FieldBehavior, patch: serde_json::Value) -> FieldInstance {
        let field = behavior.construct("f".to_string());
        let patch = patch.as_object().cloned().unwrap_or_default();
        behavior.apply_properties(&field, &patch).unwrap()
    }

    // -- Text ---------------------------------------------------------------

    #[test]
    fn text_defaults() {
        let field = TextFieldBehavior.construct("t1".to_string());
        assert_eq!(field.field_type, FieldType::TextField);
        assert_eq!(field.attr_str("label"), Some("Text field"));
        assert_eq!(field.attr_str("placeholder"), Some("Value here..."));
        assert!(!field.is_required());
    }

    #[test]
    fn required_text_rejects_blank() {
        let field = with(&TextFieldBehavior, json!({"required": true}));
        assert!(!TextFieldBehavior.validate(&field, ""));
        assert!(!TextFieldBehavior.validate(&field, "   "));
        assert!(TextFieldBehavior.validate(&field, "Alice"));
    }

    #[test]
    fn text_rejects_overlong_placeholder() {
        let field = TextFieldBehavior.construct("t".to_string());
        let patch = json!({"placeholder": "x".repeat(51)});
        let result = TextFieldBehavior.apply_properties(&field, patch.as_object().unwrap());
        assert!(result.is_err());
    }

    // -- Number -------------------------------------------------------------

    #[test]
    fn number_parses_and_respects_bounds() {
        let field = with(&NumberFieldBehavior, json!({"min": 1, "max": 10}));
        assert!(NumberFieldBehavior.validate(&field, "5"));
        assert!(NumberFieldBehavior.validate(&field, " 10 "));
        assert!(!NumberFieldBehavior.validate(&field, "11"));
        assert!(!NumberFieldBehavior.validate(&field, "0.5"));
        assert!(!NumberFieldBehavior.validate(&field, "five"));
        assert!(!NumberFieldBehavior.validate(&field, "NaN"));
    }

    #[test]
    fn optional_number_accepts_blank() {
        let field = NumberFieldBehavior.construct("n".to_string());
        assert!(NumberFieldBehavior.validate(&field, ""));
    }

    #[test]
    fn number_min_above_max_rejected() {
        let field = NumberFieldBehavior.construct("n".to_string());
        let patch = json!({"min": 10, "max": 1});
        assert!(NumberFieldBehavior
            .apply_properties(&field, patch.as_object().unwrap())
            .is_err());
    }

    #[test]
    fn number_design_summary_describes_range() {
        let field = with(&NumberFieldBehavior, json!({"min": 0}));
        let view = NumberFieldBehavior.design_view(&field);
        assert_eq!(view.summary.as_deref(), Some("at least 0"));
    }

    // -- Date ---------------------------------------------------------------

    #[test]
    fn date_accepts_iso_forms() {
        let field = DateFieldBehavior.construct("d".to_string());
        assert!(DateFieldBehavior.validate(&field, "2024-02-29"));
        assert!(DateFieldBehavior.validate(&field, "2024-05-01T00:00:00.000Z"));
        assert!(!DateFieldBehavior.validate(&field, "2023-02-29"));
        assert!(!DateFieldBehavior.validate(&field, "yesterday"));
    }

    #[test]
    fn date_defaults() {
        let field = DateFieldBehavior.construct("d".to_string());
        assert_eq!(field.attr_str("helperText"), Some("Pick a date"));
    }

    // -- Select -------------------------------------------------------------

    #[test]
    fn select_restricts_to_options() {
        let field = with(&SelectFieldBehavior, json!({"options": ["Low", "High"]}));
        assert!(SelectFieldBehavior.validate(&field, "High"));
        assert!(!SelectFieldBehavior.validate(&field, "Medium"));
        assert!(SelectFieldBehavior.validate(&field, ""));
    }

    #[test]
    fn select_without_options_accepts_anything() {
        let field = SelectFieldBehavior.construct("s".to_string());
        assert!(SelectFieldBehavior.validate(&field, "whatever"));
    }

    #[test]
    fn select_rejects_duplicate_options() {
        let field = SelectFieldBehavior.construct("s".to_string());
        let patch = json!({"options": ["A", "A"]});
        let err = SelectFieldBehavior
            .apply_properties(&field, patch.as_object().unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn select_fill_view_lists_options() {
        let field = with(&SelectFieldBehavior, json!({"options": ["A", "B"]}));
        let view = serde_json::to_value(SelectFieldBehavior.fill_view(&field)).unwrap();
        assert_eq!(view["control"], "select");
        assert_eq!(view["options"], json!(["A", "B"]));
        assert_eq!(view["label"], "Select field");
    }

    // -- Checkbox -----------------------------------------------------------

    #[test]
    fn required_checkbox_must_be_ticked() {
        let field = with(&CheckboxFieldBehavior, json!({"required": true}));
        assert!(CheckboxFieldBehavior.validate(&field, "true"));
        assert!(!CheckboxFieldBehavior.validate(&field, "false"));
        assert!(!CheckboxFieldBehavior.validate(&field, ""));
    }

    #[test]
    fn optional_checkbox_accepts_boolean_strings_only() {
        let field = CheckboxFieldBehavior.construct("c".to_string());
        assert!(CheckboxFieldBehavior.validate(&field, "false"));
        assert!(CheckboxFieldBehavior.validate(&field, ""));
        assert!(!CheckboxFieldBehavior.validate(&field, "maybe"));
    }

    // -- TextArea -----------------------------------------------------------

    #[test]
    fn text_area_rows_bounded() {
        let field = TextAreaFieldBehavior.construct("ta".to_string());
        let ok = json!({"rows": 10});
        let too_many = json!({"rows": 11});
        assert!(TextAreaFieldBehavior
            .apply_properties(&field, ok.as_object().unwrap())
            .is_ok());
        assert!(TextAreaFieldBehavior
            .apply_properties(&field, too_many.as_object().unwrap())
            .is_err());
    }

    #[test]
    fn text_area_fill_view_carries_rows() {
        let field = TextAreaFieldBehavior.construct("ta".to_string());
        match TextAreaFieldBehavior.fill_view(&field).control {
            FillControl::TextArea { rows, .. } => assert_eq!(rows, 3),
            other => panic!("unexpected control {other:?}"),
        }
    }
}
