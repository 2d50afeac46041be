//! External delivery channels for automation notifications.

pub mod email;
pub mod webhook;
