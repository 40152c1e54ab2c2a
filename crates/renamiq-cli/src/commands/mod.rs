//! Command handlers grouped by concern.

pub(crate) mod inventory;
pub(crate) mod rename;
pub(crate) mod template;
pub(crate) mod undo;
