//! Three-event drag/drop protocol: `dragStart`, `dragOver`, `dragEnd`.
//!
//! The controller only tracks the gesture; [`resolve_drop`] turns a finished
//! gesture into a tree operation without touching the tree.

use serde::{Deserialize, Serialize};

use super::tree::ElementTree;
use crate::fields::FieldType;
use crate::types::FieldId;

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DragSource {
    /// A palette button; dropping it creates a new instance.
    Palette { field_type: FieldType },
    /// An element already on the canvas.
    Element { id: FieldId },
}

/// Where the pointer currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DropTarget {
    /// The canvas drop area (appends).
    Canvas,
    /// An existing element.
    Element { id: FieldId },
}

/// Tree operation resulting from a drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operation", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DropResolution {
    Insert { index: usize, field_type: FieldType },
    Move { from: usize, to: usize },
    NoOp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: DragSource,
        #[serde(skip_serializing_if = "Option::is_none")]
        over: Option<DropTarget>,
    },
}

/// Single-gesture drag tracker.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Begin a drag. Ignored (returns `false`) while another is active.
    pub fn start(&mut self, source: DragSource) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.state = DragState::Dragging { source, over: None };
        true
    }

    /// Track the hovered target. Ignored outside an active drag.
    pub fn over(&mut self, target: Option<DropTarget>) -> bool {
        match &mut self.state {
            DragState::Dragging { over, .. } => {
                *over = target;
                true
            }
            DragState::Idle => false,
        }
    }

    /// Finish the gesture and resolve it against `tree`. The controller is
    /// idle afterwards whatever the outcome.
    pub fn end(&mut self, target: Option<&DropTarget>, tree: &ElementTree) -> DropResolution {
        match std::mem::take(&mut self.state) {
            DragState::Dragging { source, .. } => resolve_drop(&source, target, tree),
            DragState::Idle => DropResolution::NoOp,
        }
    }

    /// Abandon the current gesture.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

/// Map a finished drag onto a tree operation.
///
/// | dragged | dropped on | result |
/// |---|---|---|
/// | palette item | canvas | insert at end |
/// | palette item | element at `i` | insert at `i` |
/// | element at `f` | other element at `t` | move `f` to `t` |
/// | element | itself, canvas or nothing | no-op |
///
/// Targets or sources that are not in the tree resolve to a no-op.
pub fn resolve_drop(
    source: &DragSource,
    target: Option<&DropTarget>,
    tree: &ElementTree,
) -> DropResolution {
    let Some(target) = target else {
        return DropResolution::NoOp;
    };
    match (source, target) {
        (DragSource::Palette { field_type }, DropTarget::Canvas) => DropResolution::Insert {
            index: tree.len(),
            field_type: *field_type,
        },
        (DragSource::Palette { field_type }, DropTarget::Element { id }) => {
            match tree.index_of(id) {
                Some(index) => DropResolution::Insert {
                    index,
                    field_type: *field_type,
                },
                None => DropResolution::NoOp,
            }
        }
        (DragSource::Element { id: from_id }, DropTarget::Element { id: to_id }) => {
            match (tree.index_of(from_id), tree.index_of(to_id)) {
                (Some(from), Some(to)) if from != to => DropResolution::Move { from, to },
                _ => DropResolution::NoOp,
            }
        }
        (DragSource::Element { .. }, DropTarget::Canvas) => DropResolution::NoOp,
    }
}
