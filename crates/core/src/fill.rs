//! Runtime fill mode: rendering a published tree for a filler and
//! collecting their values.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::designer::ElementTree;
use crate::error::CoreError;
use crate::fields::{registry, FillView};
use crate::types::{DbId, FieldId};
use crate::validation::{validate_submission, ValidationResult};

/// Collected values keyed by field id. Linkage ids travel in the same map
/// under [`LINKAGE_KEYS`].
pub type SubmissionValues = BTreeMap<String, String>;

pub const TASK_ID_KEY: &str = "taskId";
pub const ASSIGNMENT_ID_KEY: &str = "assignmentId";
pub const VISIT_ID_KEY: &str = "visitId";

/// Reserved keys carrying lifecycle linkage inside submission values.
pub const LINKAGE_KEYS: [&str; 3] = [TASK_ID_KEY, ASSIGNMENT_ID_KEY, VISIT_ID_KEY];

// ---------------------------------------------------------------------------
// Linkage
// ---------------------------------------------------------------------------

/// Optional links from a submission to externally owned lifecycle entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionLinkage {
    pub task_id: Option<DbId>,
    pub assignment_id: Option<DbId>,
    pub visit_id: Option<DbId>,
}

impl SubmissionLinkage {
    /// Read linkage from the reserved keys. Blank values count as absent;
    /// anything else must be a positive integer id.
    pub fn from_values(values: &SubmissionValues) -> Result<Self, CoreError> {
        Ok(Self {
            task_id: parse_link(values, TASK_ID_KEY)?,
            assignment_id: parse_link(values, ASSIGNMENT_ID_KEY)?,
            visit_id: parse_link(values, VISIT_ID_KEY)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.task_id.is_none() && self.assignment_id.is_none() && self.visit_id.is_none()
    }
}

fn parse_link(values: &SubmissionValues, key: &str) -> Result<Option<DbId>, CoreError> {
    let Some(raw) = values.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<DbId>() {
        Ok(id) if id > 0 => Ok(Some(id)),
        _ => Err(CoreError::Validation(format!(
            "{key} must be a positive integer id, got '{raw}'"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Fill state
// ---------------------------------------------------------------------------

/// Values a filler has entered so far. Each write replaces the previous
/// value for that field.
#[derive(Debug, Clone, Default)]
pub struct FillState {
    values: SubmissionValues,
}

impl FillState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field_id: impl Into<FieldId>, value: impl Into<String>) {
        self.values.insert(field_id.into(), value.into());
    }

    pub fn get(&self, field_id: &str) -> Option<&str> {
        self.values.get(field_id).map(String::as_str)
    }

    pub fn values(&self) -> &SubmissionValues {
        &self.values
    }

    pub fn into_values(self) -> SubmissionValues {
        self.values
    }

    /// Validate the current values against `tree`.
    pub fn validate(&self, tree: &ElementTree) -> ValidationResult {
        validate_submission(tree, &self.values)
    }
}

impl From<SubmissionValues> for FillState {
    fn from(values: SubmissionValues) -> Self {
        Self { values }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// A published form as served to an anonymous filler.
#[derive(Debug, Clone, Serialize)]
pub struct FillForm {
    pub form_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<FillView>,
}

/// Fill-mode views for every element, in tree order.
pub fn render_fill(tree: &ElementTree) -> Vec<FillView> {
    tree.iter()
        .map(|f| registry::behavior(f.field_type).fill_view(f))
        .collect()
}
