//! Formkit domain core.
//!
//! Pure logic for the dynamic form engine, free of I/O so the API, the
//! pipeline and any future tooling share one set of rules:
//!
//! - [`fields`]: the field type catalog and its behavior bundles.
//! - [`designer`]: element tree, designer session and drag/drop protocol.
//! - [`validation`]: submission validation engine.
//! - [`fill`]: runtime value collection and submission linkage.
//! - [`automation`]: automation rule types and evaluator.
//! - [`store`]: collaborator traits implemented by the persistence,
//!   authorization and notification layers.

pub mod automation;
pub mod designer;
pub mod error;
pub mod fields;
pub mod fill;
pub mod form;
pub mod roles;
pub mod store;
pub mod types;
pub mod validation;
