//! imbridge-gtk
//!
//! Input-method module surface for `imbridge_core::ImContext`: the context
//! descriptor the toolkit lists, the module init/exit/create operations, and
//! C-compatible entry points exporting them from a loadable module.

pub mod ffi;
pub mod module;

pub use module::{context_list, ContextInfo, ImModule, CONTEXT_ID, CONTEXT_INFO};
