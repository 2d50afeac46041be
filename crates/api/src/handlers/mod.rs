pub mod automations;
pub mod designer;
pub mod field_types;
pub mod forms;
pub mod public;
