//! Minimal input method used to exercise a context from the command line.
//!
//! Printable keys accumulate in a preedit buffer; Space or Return commits it,
//! BackSpace deletes the last character and Escape discards everything.
//! Key releases and keys combined with Control or Alt pass through.

use std::cell::{Cell, RefCell};

use imbridge_core::{keysyms, ImEvent, ImSignals, InputMethod, ModifierType, Rectangle};
use tracing::debug;

#[derive(Default)]
pub struct ComposeEngine {
    signals: ImSignals,
    buffer: RefCell<String>,
    use_preedit: Cell<bool>,
    cursor: Cell<Rectangle>,
    surrounding: RefCell<Option<(String, i32)>>,
}

impl ComposeEngine {
    pub fn new() -> Self {
        Self {
            use_preedit: Cell::new(true),
            ..Self::default()
        }
    }

    pub fn cursor_location(&self) -> Rectangle {
        self.cursor.get()
    }

    pub fn uses_preedit(&self) -> bool {
        self.use_preedit.get()
    }

    fn push(&self, ch: char) {
        let was_empty = {
            let mut buffer = self.buffer.borrow_mut();
            let was_empty = buffer.is_empty();
            buffer.push(ch);
            was_empty
        };
        if was_empty {
            self.signals.preedit_start.emit(&());
        }
        self.signals.preedit_changed.emit(&());
    }

    fn pop(&self) -> bool {
        let (popped, now_empty) = {
            let mut buffer = self.buffer.borrow_mut();
            let popped = buffer.pop().is_some();
            (popped, buffer.is_empty())
        };
        if popped {
            self.signals.preedit_changed.emit(&());
            if now_empty {
                self.signals.preedit_end.emit(&());
            }
        }
        popped
    }

    /// Commit the buffer; false if there was nothing to commit.
    fn commit(&self) -> bool {
        let text = std::mem::take(&mut *self.buffer.borrow_mut());
        if text.is_empty() {
            return false;
        }
        self.signals.preedit_changed.emit(&());
        self.signals.preedit_end.emit(&());
        self.signals.commit.emit(&text);
        true
    }

    fn clear(&self) -> bool {
        let had_text = !std::mem::take(&mut *self.buffer.borrow_mut()).is_empty();
        if had_text {
            self.signals.preedit_changed.emit(&());
            self.signals.preedit_end.emit(&());
        }
        had_text
    }
}

impl InputMethod for ComposeEngine {
    fn filter_event(&self, event: &ImEvent) -> bool {
        if !event.is_press() {
            return false;
        }
        if event
            .key
            .state
            .intersects(ModifierType::CONTROL | ModifierType::MOD1)
        {
            return false;
        }

        match event.key.keyval {
            keysyms::SPACE | keysyms::RETURN => self.commit(),
            keysyms::BACKSPACE => self.pop(),
            keysyms::ESCAPE => self.clear(),
            keyval => match keysyms::to_char(keyval) {
                Some(ch) => {
                    self.push(ch);
                    true
                }
                None => false,
            },
        }
    }

    fn reset(&self) {
        debug!("compose: reset");
        self.clear();
    }

    fn focus_in(&self) {
        debug!("compose: focus_in");
    }

    fn focus_out(&self) {
        debug!("compose: focus_out");
        self.commit();
    }

    fn preedit_string(&self) -> (String, i32) {
        let buffer = self.buffer.borrow();
        if !self.use_preedit.get() {
            return (String::new(), 0);
        }
        (buffer.clone(), buffer.chars().count() as i32)
    }

    fn set_cursor_location(&self, area: &Rectangle) {
        self.cursor.set(*area);
    }

    fn set_use_preedit(&self, use_preedit: bool) {
        self.use_preedit.set(use_preedit);
    }

    fn surrounding(&self) -> Option<(String, i32)> {
        self.surrounding.borrow().clone()
    }

    fn set_surrounding(&self, text: &str, len: i32, cursor_index: i32) {
        let text = match usize::try_from(len) {
            Ok(len) => text.get(..len).unwrap_or(text),
            Err(_) => text,
        };
        *self.surrounding.borrow_mut() = Some((text.to_string(), cursor_index));
    }

    fn signals(&self) -> &ImSignals {
        &self.signals
    }
}
