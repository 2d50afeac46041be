//! Ordered sequence of field instances making up a form's content.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::fields::{registry, FieldInstance};
use crate::types::FieldId;

/// Maximum number of elements in one form.
pub const MAX_ELEMENTS: usize = 500;

/// A form's element tree (`content`). Order is render and tab order.
///
/// Ids are unique and every element's attributes match its type; both are
/// checked when the tree is built from JSON and on every mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldInstance>", into = "Vec<FieldInstance>")]
pub struct ElementTree {
    elements: Vec<FieldInstance>,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from stored content, checking ids and attributes.
    pub fn from_elements(elements: Vec<FieldInstance>) -> Result<Self, CoreError> {
        if elements.len() > MAX_ELEMENTS {
            return Err(CoreError::Validation(format!(
                "A form may contain at most {MAX_ELEMENTS} elements, got {}",
                elements.len()
            )));
        }
        for (i, element) in elements.iter().enumerate() {
            if elements[..i].iter().any(|e| e.id == element.id) {
                return Err(CoreError::Validation(format!(
                    "Duplicate element id '{}'",
                    element.id
                )));
            }
            registry::check_instance(element)?;
        }
        Ok(Self { elements })
    }

    /// Parse serialized content (a JSON array of instances).
    pub fn from_json(content: &serde_json::Value) -> Result<Self, CoreError> {
        serde_json::from_value(content.clone())
            .map_err(|e| CoreError::Validation(format!("Invalid form content: {e}")))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.elements).unwrap_or_else(|_| serde_json::Value::Array(Vec::new()))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[FieldInstance] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldInstance> {
        self.elements.iter()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&FieldInstance> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn field_ids(&self) -> Vec<FieldId> {
        self.elements.iter().map(|e| e.id.clone()).collect()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Insert `element` at `index`, clamped to `[0, len]`. Returns the index
    /// actually used.
    pub fn insert(&mut self, index: usize, element: FieldInstance) -> Result<usize, CoreError> {
        if self.contains(&element.id) {
            return Err(CoreError::Conflict(format!(
                "Element '{}' already exists",
                element.id
            )));
        }
        if self.elements.len() >= MAX_ELEMENTS {
            return Err(CoreError::Validation(format!(
                "A form may contain at most {MAX_ELEMENTS} elements"
            )));
        }
        registry::check_instance(&element)?;
        let index = index.min(self.elements.len());
        self.elements.insert(index, element);
        Ok(index)
    }

    /// Remove the element with `id`.
    pub fn remove(&mut self, id: &str) -> Result<FieldInstance, CoreError> {
        let index = self
            .index_of(id)
            .ok_or_else(|| CoreError::not_found("element", id))?;
        Ok(self.elements.remove(index))
    }

    /// Replace the element with `id` in place. Returns whether anything
    /// changed.
    pub fn update(&mut self, id: &str, element: FieldInstance) -> Result<bool, CoreError> {
        let index = self
            .index_of(id)
            .ok_or_else(|| CoreError::not_found("element", id))?;
        if element.id != id {
            return Err(CoreError::Validation(format!(
                "Element id cannot change (expected '{id}', got '{}')",
                element.id
            )));
        }
        registry::check_instance(&element)?;
        if self.elements[index] == element {
            return Ok(false);
        }
        self.elements[index] = element;
        Ok(true)
    }

    /// Move the element at `from` so it ends up at `to` (clamped to the last
    /// position). Returns whether the order changed.
    pub fn move_element(&mut self, from: usize, to: usize) -> Result<bool, CoreError> {
        if from >= self.elements.len() {
            return Err(CoreError::Validation(format!(
                "Move source index {from} is out of range (len {})",
                self.elements.len()
            )));
        }
        let to = to.min(self.elements.len() - 1);
        if from == to {
            return Ok(false);
        }
        let element = self.elements.remove(from);
        self.elements.insert(to, element);
        Ok(true)
    }
}

impl TryFrom<Vec<FieldInstance>> for ElementTree {
    type Error = CoreError;

    fn try_from(elements: Vec<FieldInstance>) -> Result<Self, Self::Error> {
        Self::from_elements(elements)
    }
}

impl From<ElementTree> for Vec<FieldInstance> {
    fn from(tree: ElementTree) -> Self {
        tree.elements
    }
}

impl<'a> IntoIterator for &'a ElementTree {
    type Item = &'a FieldInstance;
    type IntoIter = std::slice::Iter<'a, FieldInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
