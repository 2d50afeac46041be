//! Designer session: the element tree plus selection, drag state and a
//! revision counter, driven by [`DesignerEvent`]s.

use serde::{Deserialize, Serialize};

use super::drag::{DragController, DragSource, DragState, DropResolution, DropTarget};
use super::tree::ElementTree;
use crate::error::CoreError;
use crate::fields::{new_field_id, registry, AttributeMap, DesignView, FieldInstance};
use crate::types::FieldId;

/// One input to a designer session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DesignerEvent {
    AddElement {
        index: usize,
        element: FieldInstance,
    },
    RemoveElement {
        id: FieldId,
    },
    UpdateElement {
        id: FieldId,
        element: FieldInstance,
    },
    MoveElement {
        from_index: usize,
        to_index: usize,
    },
    Select {
        id: Option<FieldId>,
    },
    UpdateProperties {
        id: FieldId,
        patch: AttributeMap,
    },
    DragStart {
        source: DragSource,
    },
    DragOver {
        target: Option<DropTarget>,
    },
    DragEnd {
        target: Option<DropTarget>,
    },
}

impl DesignerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddElement { .. } => "addElement",
            Self::RemoveElement { .. } => "removeElement",
            Self::UpdateElement { .. } => "updateElement",
            Self::MoveElement { .. } => "moveElement",
            Self::Select { .. } => "select",
            Self::UpdateProperties { .. } => "updateProperties",
            Self::DragStart { .. } => "dragStart",
            Self::DragOver { .. } => "dragOver",
            Self::DragEnd { .. } => "dragEnd",
        }
    }
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOutcome {
    /// Whether the tree changed (and an auto-save is due).
    pub mutated: bool,
    pub revision: u64,
    /// Id of an element created by this event, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<FieldId>,
}

/// Serializable view of a session for the designer client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignerSnapshot {
    pub revision: u64,
    pub selected: Option<FieldId>,
    pub elements: ElementTree,
    pub cards: Vec<DesignView>,
    pub drag: DragState,
}

/// Editing state of one form.
///
/// Invariant: `selected`, when set, names an element present in the tree.
#[derive(Debug, Clone, Default)]
pub struct DesignerSession {
    tree: ElementTree,
    selected: Option<FieldId>,
    revision: u64,
    drag: DragController,
}

impl DesignerSession {
    /// Start a session over stored content. Revision starts at zero.
    pub fn hydrate(tree: ElementTree) -> Self {
        Self {
            tree,
            ..Self::default()
        }
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_element(&self) -> Option<&FieldInstance> {
        self.selected.as_deref().and_then(|id| self.tree.get(id))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    pub fn add_element(&mut self, index: usize, element: FieldInstance) -> Result<usize, CoreError> {
        let index = self.tree.insert(index, element)?;
        self.bump();
        Ok(index)
    }

    /// Remove an element, clearing the selection if it pointed at it.
    pub fn remove_element(&mut self, id: &str) -> Result<FieldInstance, CoreError> {
        let removed = self.tree.remove(id)?;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        self.bump();
        Ok(removed)
    }

    /// Replace an element in place. Returns whether anything changed; an
    /// identical replacement leaves the revision alone.
    pub fn update_element(&mut self, id: &str, element: FieldInstance) -> Result<bool, CoreError> {
        let changed = self.tree.update(id, element)?;
        if changed {
            self.bump();
        }
        Ok(changed)
    }

    pub fn move_element(&mut self, from: usize, to: usize) -> Result<bool, CoreError> {
        let changed = self.tree.move_element(from, to)?;
        if changed {
            self.bump();
        }
        Ok(changed)
    }

    /// Set or clear the single selection.
    pub fn select(&mut self, id: Option<&str>) -> Result<(), CoreError> {
        match id {
            Some(id) if !self.tree.contains(id) => Err(CoreError::not_found("element", id)),
            Some(id) => {
                self.selected = Some(id.to_string());
                Ok(())
            }
            None => {
                self.selected = None;
                Ok(())
            }
        }
    }

    /// Merge a property patch into an element's attributes.
    pub fn update_properties(&mut self, id: &str, patch: &AttributeMap) -> Result<bool, CoreError> {
        let current = self
            .tree
            .get(id)
            .ok_or_else(|| CoreError::not_found("element", id))?;
        let updated = registry::apply_properties(current, patch)?;
        self.update_element(id, updated)
    }

    pub fn drag_start(&mut self, source: DragSource) -> bool {
        self.drag.start(source)
    }

    pub fn drag_over(&mut self, target: Option<DropTarget>) -> bool {
        self.drag.over(target)
    }

    /// Finish the active drag and apply its resolution. A palette drop
    /// selects the new element.
    pub fn drag_end(&mut self, target: Option<&DropTarget>) -> Result<Option<FieldId>, CoreError> {
        match self.drag.end(target, &self.tree) {
            DropResolution::Insert { index, field_type } => {
                let id = new_field_id();
                self.add_element(index, registry::construct(field_type, id.clone()))?;
                self.selected = Some(id.clone());
                Ok(Some(id))
            }
            DropResolution::Move { from, to } => {
                self.move_element(from, to)?;
                Ok(None)
            }
            DropResolution::NoOp => Ok(None),
        }
    }

    /// Apply one event. Failed events leave the session unchanged.
    pub fn apply(&mut self, event: DesignerEvent) -> Result<EventOutcome, CoreError> {
        let before = self.revision;
        let mut created = None;
        match event {
            DesignerEvent::AddElement { index, element } => {
                let id = element.id.clone();
                self.add_element(index, element)?;
                created = Some(id);
            }
            DesignerEvent::RemoveElement { id } => {
                self.remove_element(&id)?;
            }
            DesignerEvent::UpdateElement { id, element } => {
                self.update_element(&id, element)?;
            }
            DesignerEvent::MoveElement {
                from_index,
                to_index,
            } => {
                self.move_element(from_index, to_index)?;
            }
            DesignerEvent::Select { id } => self.select(id.as_deref())?,
            DesignerEvent::UpdateProperties { id, patch } => {
                self.update_properties(&id, &patch)?;
            }
            DesignerEvent::DragStart { source } => {
                self.drag_start(source);
            }
            DesignerEvent::DragOver { target } => {
                self.drag_over(target);
            }
            DesignerEvent::DragEnd { target } => {
                created = self.drag_end(target.as_ref())?;
            }
        }
        Ok(EventOutcome {
            mutated: self.revision != before,
            revision: self.revision,
            created,
        })
    }

    pub fn snapshot(&self) -> DesignerSnapshot {
        DesignerSnapshot {
            revision: self.revision,
            selected: self.selected.clone(),
            elements: self.tree.clone(),
            cards: self
                .tree
                .iter()
                .map(|f| registry::behavior(f.field_type).design_view(f))
                .collect(),
            drag: self.drag.state().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldType;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn session_with(ids: &[&str]) -> DesignerSession {
        let mut tree = ElementTree::new();
        for id in ids {
            tree.insert(usize::MAX, registry::construct(FieldType::TextField, *id))
                .unwrap();
        }
        DesignerSession::hydrate(tree)
    }

    // -- hydration ----------------------------------------------------------

    #[test]
    fn hydrate_starts_at_revision_zero() {
        let session = session_with(&["a", "b"]);
        assert_eq!(session.revision(), 0);
        assert_eq!(session.tree().len(), 2);
        assert!(session.selected().is_none());
    }

    // -- removal and selection ----------------------------------------------

    #[test]
    fn removing_selected_clears_selection() {
        let mut session = session_with(&["a", "b"]);
        session.select(Some("a")).unwrap();
        session.remove_element("a").unwrap();
        assert!(session.selected().is_none());
        assert_eq!(session.tree().len(), 1);
        assert!(!session.tree().contains("a"));
    }

    #[test]
    fn removing_other_keeps_selection() {
        let mut session = session_with(&["a", "b"]);
        session.select(Some("a")).unwrap();
        session.remove_element("b").unwrap();
        assert_eq!(session.selected(), Some("a"));
    }

    #[test]
    fn selecting_absent_id_fails() {
        let mut session = session_with(&["a"]);
        session.select(Some("a")).unwrap();
        assert_matches!(session.select(Some("zz")), Err(CoreError::NotFound { .. }));
        assert_eq!(session.selected(), Some("a"));
        session.select(None).unwrap();
        assert!(session.selected().is_none());
    }

    // -- revision -----------------------------------------------------------

    #[test]
    fn mutations_bump_revision_and_selection_does_not() {
        let mut session = session_with(&["a", "b"]);
        session.select(Some("b")).unwrap();
        assert_eq!(session.revision(), 0);
        session.move_element(0, 1).unwrap();
        assert_eq!(session.revision(), 1);
        session
            .add_element(0, registry::construct(FieldType::SpacerField, "s"))
            .unwrap();
        assert_eq!(session.revision(), 2);
    }

    #[test]
    fn identical_update_keeps_revision() {
        let mut session = session_with(&["a"]);
        let same = session.tree().get("a").unwrap().clone();
        assert!(!session.update_element("a", same).unwrap());
        assert_eq!(session.revision(), 0);
    }

    #[test]
    fn update_properties_validates_patch() {
        let mut session = session_with(&["a"]);
        let patch = json!({"label": "Full name", "required": true});
        assert!(session
            .update_properties("a", patch.as_object().unwrap())
            .unwrap());
        let field = session.tree().get("a").unwrap();
        assert_eq!(field.attr_str("label"), Some("Full name"));
        assert!(field.is_required());

        let bad = json!({"label": "x"});
        assert!(session.update_properties("a", bad.as_object().unwrap()).is_err());
        assert_eq!(session.tree().get("a").unwrap().attr_str("label"), Some("Full name"));
        assert_eq!(session.revision(), 1);
    }

    // -- drag and drop ------------------------------------------------------

    #[test]
    fn number_palette_drop_on_empty_canvas() {
        let mut session = DesignerSession::default();
        session.drag_start(DragSource::Palette {
            field_type: FieldType::NumberField,
        });
        let created = session.drag_end(Some(&DropTarget::Canvas)).unwrap().unwrap();
        assert_eq!(session.tree().len(), 1);
        assert_eq!(session.tree().elements()[0].field_type, FieldType::NumberField);
        assert_eq!(session.selected(), Some(created.as_str()));
    }

    #[test]
    fn drag_end_without_target_mutates_nothing() {
        let mut session = session_with(&["a", "b"]);
        session.drag_start(DragSource::Element { id: "a".to_string() });
        assert!(session.drag_end(None).unwrap().is_none());
        assert_eq!(session.revision(), 0);
        assert_eq!(session.tree().field_ids(), ["a", "b"]);
    }

    #[test]
    fn dragging_element_onto_another_moves_it() {
        let mut session = session_with(&["a", "b", "c"]);
        session.drag_start(DragSource::Element { id: "a".to_string() });
        session.drag_over(Some(DropTarget::Element { id: "c".to_string() }));
        session
            .drag_end(Some(&DropTarget::Element { id: "c".to_string() }))
            .unwrap();
        assert_eq!(session.tree().field_ids(), ["b", "c", "a"]);
    }

    // -- events -------------------------------------------------------------

    #[test]
    fn apply_reports_mutation() {
        let mut session = session_with(&["a"]);
        let event: DesignerEvent =
            serde_json::from_value(json!({"event": "select", "id": "a"})).unwrap();
        let outcome = session.apply(event).unwrap();
        assert!(!outcome.mutated);

        let event: DesignerEvent = serde_json::from_value(json!({
            "event": "updateProperties",
            "id": "a",
            "patch": {"placeholder": "Your name"}
        }))
        .unwrap();
        let outcome = session.apply(event).unwrap();
        assert!(outcome.mutated);
        assert_eq!(outcome.revision, 1);
    }

    #[test]
    fn apply_drag_sequence_reports_created_id() {
        let mut session = DesignerSession::default();
        for event in [
            json!({"event": "dragStart", "source": {"kind": "palette", "fieldType": "CheckboxField"}}),
            json!({"event": "dragOver", "target": {"kind": "canvas"}}),
        ] {
            let outcome = session.apply(serde_json::from_value(event).unwrap()).unwrap();
            assert!(!outcome.mutated);
        }
        let outcome = session
            .apply(
                serde_json::from_value(json!({"event": "dragEnd", "target": {"kind": "canvas"}}))
                    .unwrap(),
            )
            .unwrap();
        assert!(outcome.mutated);
        let created = outcome.created.unwrap();
        assert!(session.tree().contains(&created));
    }

    #[test]
    fn snapshot_includes_cards() {
        let session = session_with(&["a"]);
        let snap = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(snap["elements"][0]["id"], "a");
        assert_eq!(snap["cards"][0]["label"], "Text field");
        assert_eq!(snap["drag"]["state"], "idle");
    }
}
