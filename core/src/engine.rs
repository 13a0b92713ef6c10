//! Contract between the input context and the input method engine.
//!
//! The engine owns composition, candidate and method-switching logic; the
//! context only forwards events and relays the engine's notifications. All
//! methods take `&self`: an engine may emit a signal whose handler calls back
//! into the context (and from there into the engine) before the original call
//! returns, so implementations keep their state behind `Cell`/`RefCell`.

use crate::event::ImEvent;
use crate::signal::ImSignals;
use crate::window::Rectangle;

pub trait InputMethod {
    /// Offer a key event; true if the engine consumed it.
    fn filter_event(&self, event: &ImEvent) -> bool;

    /// Drop any in-progress composition.
    fn reset(&self);

    fn focus_in(&self);

    fn focus_out(&self);

    /// Current preedit text and cursor position (in characters).
    fn preedit_string(&self) -> (String, i32);

    /// Cursor rectangle in root window coordinates.
    fn set_cursor_location(&self, area: &Rectangle);

    fn set_use_preedit(&self, use_preedit: bool);

    /// Surrounding text and cursor index, if the engine has it.
    fn surrounding(&self) -> Option<(String, i32)>;

    /// `len` is the byte length of `text` to use, or -1 for all of it.
    fn set_surrounding(&self, text: &str, len: i32, cursor_index: i32);

    /// Notifications the engine emits.
    fn signals(&self) -> &ImSignals;
}
