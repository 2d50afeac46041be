//! Visual form designer state: the element tree, the editing session that
//! owns it and the drag/drop protocol feeding it.

pub mod drag;
pub mod session;
pub mod tree;

pub use drag::{resolve_drop, DragController, DragSource, DragState, DropResolution, DropTarget};
pub use session::{DesignerEvent, DesignerSession, DesignerSnapshot, EventOutcome};
pub use tree::{ElementTree, MAX_ELEMENTS};
