//! Persistent client settings.
//!
//! The context reads two boolean keys at creation and watches them for
//! changes. `Settings` is the store abstraction; `MemorySettings` is an
//! in-process store that can be seeded from a TOML `ClientConfig`.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::signal::{HandlerId, Signal};

/// Schema id of the client settings.
pub const SCHEMA_ID: &str = "org.nimf.clients.gtk";

/// Reset the composition when a pointer button is pressed.
pub const KEY_RESET_ON_BUTTON_PRESS: &str = "reset-on-gdk-button-press-event";

/// Route raw key events to the input method before toolkit dispatch.
pub const KEY_HOOK_EVENT_KEY: &str = "hook-gdk-event-key";

/// Keys known to the client schema.
pub const KEYS: [&str; 2] = [KEY_RESET_ON_BUTTON_PRESS, KEY_HOOK_EVENT_KEY];

/// Boolean settings store with change notification.
pub trait Settings {
    /// Current value of `key`. Unknown keys read as `false`.
    fn boolean(&self, key: &str) -> bool;

    /// Call `handler` with the key name whenever `key` changes.
    fn connect_changed(&self, key: &str, handler: Box<dyn Fn(&str)>) -> HandlerId;

    fn disconnect(&self, id: HandlerId);
}

/// Serializable snapshot of the client settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ClientConfig {
    pub reset_on_gdk_button_press_event: bool,
    pub hook_gdk_event_key: bool,
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read settings {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parse settings {}", path.display()))
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).with_context(|| format!("write settings {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Value of a schema key, `None` for unknown keys.
    pub fn get(&self, key: &str) -> Option<bool> {
        match key {
            KEY_RESET_ON_BUTTON_PRESS => Some(self.reset_on_gdk_button_press_event),
            KEY_HOOK_EVENT_KEY => Some(self.hook_gdk_event_key),
            _ => None,
        }
    }
}

/// In-memory settings store.
///
/// Cloning yields another handle to the same store.
#[derive(Clone, Default)]
pub struct MemorySettings {
    inner: Rc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    values: RefCell<AHashMap<String, bool>>,
    changed: Signal<str>,
}

impl MemorySettings {
    /// Store holding every schema key at its default (`false`).
    pub fn new() -> Self {
        Self::from_config(&ClientConfig::default())
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let settings = Self::default();
        {
            let mut values = settings.inner.values.borrow_mut();
            for key in KEYS {
                values.insert(key.to_string(), config.get(key).unwrap_or(false));
            }
        }
        settings
    }

    /// Store `value` under `key`, notifying watchers if it changed.
    ///
    /// Returns false for keys outside the schema.
    pub fn set_boolean(&self, key: &str, value: bool) -> bool {
        let changed = {
            let mut values = self.inner.values.borrow_mut();
            match values.get_mut(key) {
                Some(current) => {
                    let changed = *current != value;
                    *current = value;
                    changed
                }
                None => {
                    warn!("settings: unknown key '{}' in schema {}", key, SCHEMA_ID);
                    return false;
                }
            }
        };

        if changed {
            debug!("settings: {} = {}", key, value);
            self.inner.changed.emit(key);
        }
        true
    }

    /// Write every key of `config`.
    pub fn apply_config(&self, config: &ClientConfig) {
        for key in KEYS {
            self.set_boolean(key, config.get(key).unwrap_or(false));
        }
    }

    pub fn snapshot(&self) -> ClientConfig {
        ClientConfig {
            reset_on_gdk_button_press_event: self.boolean(KEY_RESET_ON_BUTTON_PRESS),
            hook_gdk_event_key: self.boolean(KEY_HOOK_EVENT_KEY),
        }
    }

    /// Number of connected change handlers.
    pub fn watcher_count(&self) -> usize {
        self.inner.changed.handler_count()
    }
}

impl Settings for MemorySettings {
    fn boolean(&self, key: &str) -> bool {
        match self.inner.values.borrow().get(key) {
            Some(value) => *value,
            None => {
                warn!("settings: unknown key '{}' in schema {}", key, SCHEMA_ID);
                false
            }
        }
    }

    fn connect_changed(&self, key: &str, handler: Box<dyn Fn(&str)>) -> HandlerId {
        let key = key.to_string();
        self.inner.changed.connect(move |changed: &str| {
            if changed == key {
                handler(changed);
            }
        })
    }

    fn disconnect(&self, id: HandlerId) {
        self.inner.changed.disconnect(id);
    }
}

impl std::fmt::Debug for MemorySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySettings")
            .field("values", &self.snapshot())
            .field("watchers", &self.watcher_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn toml_uses_schema_key_names() {
        let cfg = ClientConfig::from_toml_str("hook-gdk-event-key = true\n").unwrap();
        assert!(cfg.hook_gdk_event_key);
        assert!(!cfg.reset_on_gdk_button_press_event);

        let text = ClientConfig {
            reset_on_gdk_button_press_event: true,
            hook_gdk_event_key: false,
        }
        .to_toml_string()
        .unwrap();
        assert!(text.contains("reset-on-gdk-button-press-event = true"));
    }

    #[test]
    fn toml_file_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "imbridge_settings_test_{}.toml",
            std::process::id()
        ));
        let cfg = ClientConfig {
            reset_on_gdk_button_press_event: true,
            hook_gdk_event_key: true,
        };
        cfg.save_toml(&path).unwrap();
        let loaded = ClientConfig::load_toml(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ClientConfig::load_toml("/nonexistent/imbridge.toml").unwrap_err();
        assert!(err.to_string().contains("read settings"));
    }

    #[test]
    fn change_handlers_fire_only_for_their_key_and_real_changes() {
        let settings = MemorySettings::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let id = settings.connect_changed(
            KEY_HOOK_EVENT_KEY,
            Box::new(move |key| {
                assert_eq!(key, KEY_HOOK_EVENT_KEY);
                h.set(h.get() + 1);
            }),
        );

        settings.set_boolean(KEY_RESET_ON_BUTTON_PRESS, true);
        assert_eq!(hits.get(), 0);
        settings.set_boolean(KEY_HOOK_EVENT_KEY, true);
        settings.set_boolean(KEY_HOOK_EVENT_KEY, true);
        assert_eq!(hits.get(), 1);

        settings.disconnect(id);
        settings.set_boolean(KEY_HOOK_EVENT_KEY, false);
        assert_eq!(hits.get(), 1);
        assert_eq!(settings.watcher_count(), 0);
    }

    #[test]
    fn unknown_keys_read_false_and_are_rejected() {
        let settings = MemorySettings::new();
        assert!(!settings.set_boolean("no-such-key", true));
        assert!(!settings.boolean("no-such-key"));
    }
}
