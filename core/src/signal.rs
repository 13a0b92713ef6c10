//! Typed listener lists standing in for toolkit signals.
//!
//! A `Signal<A, R>` keeps its handlers in connection order. Emission works on a
//! snapshot of the list, so a handler may connect or disconnect handlers (or
//! drop the object that owns the signal's listeners) while it runs.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Identifies a connected handler for later disconnection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

type Handler<A, R> = Rc<dyn Fn(&A) -> R>;

pub struct Signal<A: ?Sized, R = ()> {
    handlers: RefCell<Vec<(HandlerId, Handler<A, R>)>>,
    next_id: Cell<u64>,
}

impl<A: ?Sized, R> Signal<A, R> {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    pub fn connect<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&A) -> R + 'static,
    {
        let id = HandlerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, Rc::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not connected.
    pub fn disconnect(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(hid, _)| *hid != id);
        handlers.len() != before
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn is_connected(&self, id: HandlerId) -> bool {
        self.handlers.borrow().iter().any(|(hid, _)| *hid == id)
    }

    fn snapshot(&self) -> Vec<Handler<A, R>> {
        self.handlers
            .borrow()
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect()
    }
}

impl<A: ?Sized> Signal<A, ()> {
    /// Run every handler in connection order.
    pub fn emit(&self, args: &A) {
        for handler in self.snapshot() {
            handler(args);
        }
    }
}

impl<A: ?Sized> Signal<A, bool> {
    /// Run handlers in order until one returns `true`.
    ///
    /// Returns `false` when no handler is connected or none handled the
    /// emission.
    pub fn emit_until_handled(&self, args: &A) -> bool {
        self.snapshot().into_iter().any(|handler| handler(args))
    }
}

impl<A: ?Sized, R> Default for Signal<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized, R> fmt::Debug for Signal<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("handlers", &self.handler_count())
            .finish()
    }
}

/// Notifications an input method emits towards its client.
#[derive(Debug, Default)]
pub struct ImSignals {
    /// Text to insert into the client.
    pub commit: Signal<str>,
    /// `(offset, n_chars)` around the cursor to delete; true if done.
    pub delete_surrounding: Signal<(i32, i32), bool>,
    pub preedit_changed: Signal<()>,
    pub preedit_start: Signal<()>,
    pub preedit_end: Signal<()>,
    /// Ask the client to supply surrounding text; true if it did.
    pub retrieve_surrounding: Signal<(), bool>,
}

impl ImSignals {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Signals an input context emits towards the toolkit.
///
/// Same shape as `ImSignals`; the context relays each engine notification to
/// its counterpart here without touching the payload.
pub type ContextSignals = ImSignals;
