//! Context descriptor and module operations.

use std::cell::Cell;
use std::fmt;

use imbridge_core::ImContext;
use tracing::{debug, warn};

/// Identifier the toolkit uses to request this context.
pub const CONTEXT_ID: &str = "nimf";

/// Translation domain of the display name.
pub const GETTEXT_PACKAGE: &str = "nimf";

/// Directory holding the translation catalogs, fixed at build time.
pub const LOCALE_DIR: &str = match option_env!("IMBRIDGE_LOCALE_DIR") {
    Some(dir) => dir,
    None => "/usr/share/locale",
};

/// Static description of an input context offered by the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextInfo {
    pub context_id: &'static str,
    /// Human readable name
    pub context_name: &'static str,
    pub domain: &'static str,
    pub domain_dirname: &'static str,
    /// Colon-separated languages this context is the default for.
    pub default_locales: &'static str,
}

impl ContextInfo {
    /// Whether this context is the default for `lang` (e.g. `ko` or `ja_JP`).
    pub fn is_default_for(&self, lang: &str) -> bool {
        let lang = lang.split(['_', '.', '@']).next().unwrap_or(lang);
        self.default_locales
            .split(':')
            .any(|l| l == "*" || l.eq_ignore_ascii_case(lang))
    }
}

pub const CONTEXT_INFO: ContextInfo = ContextInfo {
    context_id: CONTEXT_ID,
    context_name: "Nimf",
    domain: GETTEXT_PACKAGE,
    domain_dirname: LOCALE_DIR,
    default_locales: "ko:ja:zh",
};

static CONTEXT_LIST: [ContextInfo; 1] = [CONTEXT_INFO];

/// Every context this module provides.
pub fn context_list() -> &'static [ContextInfo] {
    &CONTEXT_LIST
}

/// Create the context registered under `context_id` using `factory`.
///
/// Unknown ids yield `None`.
fn create_context(context_id: &str, factory: &dyn Fn() -> ImContext) -> Option<ImContext> {
    debug!("create_context: {}", context_id);
    if context_id == CONTEXT_ID {
        Some(factory())
    } else {
        None
    }
}

/// Loaded module: lists the context descriptor and creates contexts.
pub struct ImModule {
    factory: Box<dyn Fn() -> ImContext>,
    initialized: Cell<bool>,
}

impl ImModule {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> ImContext + 'static,
    {
        Self {
            factory: Box::new(factory),
            initialized: Cell::new(false),
        }
    }

    /// Called once when the toolkit loads the module.
    pub fn init(&self) {
        debug!("module init");
        self.initialized.set(true);
    }

    /// Called when the toolkit unloads the module.
    pub fn exit(&self) {
        debug!("module exit");
        self.initialized.set(false);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    pub fn list(&self) -> &'static [ContextInfo] {
        context_list()
    }

    /// Create a context; `None` for unknown ids or before `init`.
    pub fn create(&self, context_id: &str) -> Option<ImContext> {
        if !self.initialized.get() {
            warn!("create '{}' before module init", context_id);
            return None;
        }
        create_context(context_id, self.factory.as_ref())
    }
}

impl fmt::Debug for ImModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImModule")
            .field("initialized", &self.initialized.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_defaults_to_cjk_locales() {
        assert!(CONTEXT_INFO.is_default_for("ko"));
        assert!(CONTEXT_INFO.is_default_for("ja_JP.UTF-8"));
        assert!(CONTEXT_INFO.is_default_for("zh_CN"));
        assert!(!CONTEXT_INFO.is_default_for("en_US"));
    }

    #[test]
    fn list_has_one_context() {
        let list = context_list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].context_id, "nimf");
        assert_eq!(list[0].context_name, "Nimf");
        assert!(!list[0].domain_dirname.is_empty());
    }
}
