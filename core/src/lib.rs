//! imbridge-core
//!
//! Toolkit-neutral input context that plugs an external input method engine
//! into a windowing toolkit's pluggable input-context mechanism.
//!
//! Public API:
//! - `ImContext` - The bridge: forwards toolkit operations to the engine and
//!   relays engine notifications as signals
//! - `InputMethod` - Contract the external engine implements
//! - `ImEvent` / `KeyEvent` / `RawEvent` - Neutral, toolkit and raw key events
//! - `Keymap` / `TableKeymap` - Keycode lookup for raw key events
//! - `EventSource` / `FilterChain` / `FilterGuard` - Low-level event filters
//! - `Settings` / `MemorySettings` / `ClientConfig` - Client settings
//! - `Signal` / `ImSignals` / `ContextSignals` - Listener lists

pub mod context;
pub use context::{Host, ImContext};

pub mod engine;
pub use engine::InputMethod;

pub mod event;
pub use event::{translate_raw_key, EventType, ImEvent, KeyData, KeyEvent, ModifierType, RawEvent, RawKeyEvent};

pub mod filter;
pub use filter::{EventSource, FilterChain, FilterFn, FilterGuard, FilterId, FilterReturn};

pub mod keymap;
pub use keymap::{keysyms, Keymap, TableKeymap};

pub mod preedit;
pub use preedit::{AttrList, AttrType, Attribute, Preedit, Underline};

pub mod settings;
pub use settings::{ClientConfig, MemorySettings, Settings};

pub mod signal;
pub use signal::{ContextSignals, HandlerId, ImSignals, Signal};

pub mod window;
pub use window::{ClientWindow, OffsetWindow, Rectangle};
