//! Input context bridging a toolkit to an input method engine.
//!
//! `ImContext` implements the toolkit's input-context operations by
//! forwarding them to an `InputMethod`, relays the engine's notifications to
//! its own `ContextSignals`, and optionally hooks raw windowing events through
//! a process-wide filter:
//!
//! - with `hook-gdk-event-key` set, raw key presses and releases go to the
//!   engine before the toolkit sees them, and consumed ones are dropped;
//! - with `reset-on-gdk-button-press-event` set, a pointer button press
//!   resets the composition.
//!
//! The filter is installed exactly while at least one of the two settings is
//! on, and removed when the context is dropped. Raw events are ignored unless
//! the context has focus and a client window.
//!
//! All state lives on the dispatch thread. No `RefCell` borrow is held across
//! an engine call or a signal emission, since handlers may call back into the
//! context.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::engine::InputMethod;
use crate::event::{translate_raw_key, ImEvent, KeyEvent, RawEvent};
use crate::filter::{EventSource, FilterGuard, FilterReturn};
use crate::keymap::Keymap;
use crate::preedit::{AttrList, Preedit};
use crate::settings::{Settings, KEY_HOOK_EVENT_KEY, KEY_RESET_ON_BUTTON_PRESS};
use crate::signal::{ContextSignals, HandlerId, ImSignals};
use crate::window::{ClientWindow, Rectangle};

/// Services a context needs from its environment.
#[derive(Clone)]
pub struct Host {
    /// Where the raw event filter is registered.
    pub event_source: Rc<dyn EventSource>,
    pub settings: Rc<dyn Settings>,
    /// Resolves keycodes of raw key events.
    pub keymap: Rc<dyn Keymap>,
}

/// Input context attached to one toolkit text widget.
pub struct ImContext {
    inner: Rc<Inner>,
}

struct Inner {
    this: Weak<Inner>,
    im: Rc<dyn InputMethod>,
    host: Host,
    signals: ContextSignals,
    state: RefCell<State>,
    settings_handlers: RefCell<Vec<HandlerId>>,
    im_handlers: RefCell<Option<ImHandlers>>,
}

#[derive(Default)]
struct State {
    client_window: Option<Rc<dyn ClientWindow>>,
    cursor_area: Rectangle,
    is_reset_on_gdk_button_press_event: bool,
    is_hook_gdk_event_key: bool,
    has_focus: bool,
    event_filter: Option<FilterGuard>,
}

/// Relay handlers connected to the engine's signals.
struct ImHandlers {
    commit: HandlerId,
    delete_surrounding: HandlerId,
    preedit_changed: HandlerId,
    preedit_start: HandlerId,
    preedit_end: HandlerId,
    retrieve_surrounding: HandlerId,
}

impl ImHandlers {
    fn disconnect(self, signals: &ImSignals) {
        signals.commit.disconnect(self.commit);
        signals.delete_surrounding.disconnect(self.delete_surrounding);
        signals.preedit_changed.disconnect(self.preedit_changed);
        signals.preedit_start.disconnect(self.preedit_start);
        signals.preedit_end.disconnect(self.preedit_end);
        signals.retrieve_surrounding.disconnect(self.retrieve_surrounding);
    }
}

impl ImContext {
    /// Create a context driving `im`.
    ///
    /// Reads both client settings, installs the raw event filter if either
    /// is on, and watches the settings for the lifetime of the context.
    pub fn new(im: Rc<dyn InputMethod>, host: Host) -> Self {
        debug!("ImContext::new");

        let inner = Rc::new_cyclic(|this| Inner {
            this: this.clone(),
            im,
            host,
            signals: ContextSignals::new(),
            state: RefCell::new(State::default()),
            settings_handlers: RefCell::new(Vec::new()),
            im_handlers: RefCell::new(None),
        });

        inner.connect_im_signals();

        let reset = inner.host.settings.boolean(KEY_RESET_ON_BUTTON_PRESS);
        let hook = inner.host.settings.boolean(KEY_HOOK_EVENT_KEY);
        {
            let mut state = inner.state.borrow_mut();
            state.is_reset_on_gdk_button_press_event = reset;
            state.is_hook_gdk_event_key = hook;
        }
        inner.update_event_filter();
        inner.connect_settings();

        Self { inner }
    }

    /// Signals relayed from the engine.
    pub fn signals(&self) -> &ContextSignals {
        &self.inner.signals
    }

    pub fn input_method(&self) -> &Rc<dyn InputMethod> {
        &self.inner.im
    }

    /// Offer a toolkit key event to the engine; true if consumed.
    pub fn filter_keypress(&self, event: &KeyEvent) -> bool {
        debug!(
            "filter_keypress: {:?} keyval={:#x} keycode={}",
            event.event_type, event.keyval, event.hardware_keycode
        );
        let im_event = ImEvent::from(event);
        self.inner.im.filter_event(&im_event)
    }

    pub fn reset(&self) {
        debug!("reset");
        self.inner.im.reset();
    }

    /// Replace the client window, releasing the previous one.
    pub fn set_client_window(&self, window: Option<Rc<dyn ClientWindow>>) {
        debug!("set_client_window: {}", window.is_some());
        let previous = {
            let mut state = self.inner.state.borrow_mut();
            std::mem::replace(&mut state.client_window, window)
        };
        drop(previous);
    }

    pub fn client_window(&self) -> Option<Rc<dyn ClientWindow>> {
        self.inner.state.borrow().client_window.clone()
    }

    /// Current preedit text and cursor position.
    pub fn preedit_string(&self) -> Preedit {
        debug!("preedit_string");
        let (text, cursor_pos) = self.inner.im.preedit_string();
        Preedit { text, cursor_pos }
    }

    /// Preedit plus a single underline covering all of its text.
    pub fn preedit_string_with_attributes(&self) -> (Preedit, AttrList) {
        let preedit = self.preedit_string();
        let attrs = preedit.attributes();
        (preedit, attrs)
    }

    pub fn focus_in(&self) {
        debug!("focus_in");
        self.inner.state.borrow_mut().has_focus = true;
        self.inner.im.focus_in();
    }

    pub fn focus_out(&self) {
        debug!("focus_out");
        self.inner.im.focus_out();
        self.inner.state.borrow_mut().has_focus = false;
    }

    pub fn has_focus(&self) -> bool {
        self.inner.state.borrow().has_focus
    }

    /// Update the cursor rectangle (client window coordinates).
    ///
    /// Unchanged rectangles are ignored. The engine receives the rectangle
    /// in root coordinates, and only while a client window is set.
    pub fn set_cursor_location(&self, area: Rectangle) {
        debug!("set_cursor_location: {:?}", area);
        let window = {
            let mut state = self.inner.state.borrow_mut();
            if state.cursor_area == area {
                return;
            }
            state.cursor_area = area;
            state.client_window.clone()
        };

        if let Some(window) = window {
            let (x, y) = window.root_coords(area.x, area.y);
            let root_area = Rectangle { x, y, ..area };
            self.inner.im.set_cursor_location(&root_area);
        }
    }

    /// Last cursor rectangle, in client window coordinates.
    pub fn cursor_location(&self) -> Rectangle {
        self.inner.state.borrow().cursor_area
    }

    pub fn set_use_preedit(&self, use_preedit: bool) {
        debug!("set_use_preedit: {}", use_preedit);
        self.inner.im.set_use_preedit(use_preedit);
    }

    /// Surrounding text and cursor index, if the engine has any.
    pub fn surrounding(&self) -> Option<(String, i32)> {
        debug!("surrounding");
        self.inner.im.surrounding()
    }

    pub fn set_surrounding(&self, text: &str, len: i32, cursor_index: i32) {
        debug!("set_surrounding: len={} cursor_index={}", len, cursor_index);
        self.inner.im.set_surrounding(text, len, cursor_index);
    }

    /// Low-level filter entry point; see the module docs.
    pub fn handle_raw_event(&self, event: &RawEvent) -> FilterReturn {
        self.inner.handle_raw_event(event)
    }

    pub fn has_event_filter(&self) -> bool {
        self.inner.state.borrow().event_filter.is_some()
    }

    pub fn is_reset_on_gdk_button_press_event(&self) -> bool {
        self.inner.state.borrow().is_reset_on_gdk_button_press_event
    }

    pub fn is_hook_gdk_event_key(&self) -> bool {
        self.inner.state.borrow().is_hook_gdk_event_key
    }
}

impl Inner {
    fn connect_im_signals(&self) {
        let signals = self.im.signals();

        let this = self.this.clone();
        let commit = signals.commit.connect(move |text: &str| {
            if let Some(inner) = this.upgrade() {
                debug!("commit: {:?}", text);
                inner.signals.commit.emit(text);
            }
        });

        let this = self.this.clone();
        let delete_surrounding =
            signals
                .delete_surrounding
                .connect(move |args: &(i32, i32)| match this.upgrade() {
                    Some(inner) => {
                        debug!("delete_surrounding: offset={} n_chars={}", args.0, args.1);
                        inner.signals.delete_surrounding.emit_until_handled(args)
                    }
                    None => false,
                });

        let this = self.this.clone();
        let preedit_changed = signals.preedit_changed.connect(move |_: &()| {
            if let Some(inner) = this.upgrade() {
                debug!("preedit_changed");
                inner.signals.preedit_changed.emit(&());
            }
        });

        let this = self.this.clone();
        let preedit_start = signals.preedit_start.connect(move |_: &()| {
            if let Some(inner) = this.upgrade() {
                debug!("preedit_start");
                inner.signals.preedit_start.emit(&());
            }
        });

        let this = self.this.clone();
        let preedit_end = signals.preedit_end.connect(move |_: &()| {
            if let Some(inner) = this.upgrade() {
                debug!("preedit_end");
                inner.signals.preedit_end.emit(&());
            }
        });

        let this = self.this.clone();
        let retrieve_surrounding =
            signals
                .retrieve_surrounding
                .connect(move |_: &()| match this.upgrade() {
                    Some(inner) => {
                        debug!("retrieve_surrounding");
                        inner.signals.retrieve_surrounding.emit_until_handled(&())
                    }
                    None => false,
                });

        *self.im_handlers.borrow_mut() = Some(ImHandlers {
            commit,
            delete_surrounding,
            preedit_changed,
            preedit_start,
            preedit_end,
            retrieve_surrounding,
        });
    }

    fn connect_settings(&self) {
        let mut handlers = self.settings_handlers.borrow_mut();
        for key in [KEY_RESET_ON_BUTTON_PRESS, KEY_HOOK_EVENT_KEY] {
            let this = self.this.clone();
            let id = self.host.settings.connect_changed(
                key,
                Box::new(move |key: &str| {
                    if let Some(inner) = this.upgrade() {
                        inner.on_setting_changed(key);
                    }
                }),
            );
            handlers.push(id);
        }
    }

    fn on_setting_changed(&self, key: &str) {
        let value = self.host.settings.boolean(key);
        debug!("setting changed: {} = {}", key, value);
        {
            let mut state = self.state.borrow_mut();
            match key {
                KEY_RESET_ON_BUTTON_PRESS => state.is_reset_on_gdk_button_press_event = value,
                KEY_HOOK_EVENT_KEY => state.is_hook_gdk_event_key = value,
                _ => return,
            }
        }
        self.update_event_filter();
    }

    /// Install or remove the raw event filter so that it is present exactly
    /// while one of the two settings is on.
    fn update_event_filter(&self) {
        let (wanted, installed) = {
            let state = self.state.borrow();
            (
                state.is_reset_on_gdk_button_press_event || state.is_hook_gdk_event_key,
                state.event_filter.is_some(),
            )
        };

        if wanted && !installed {
            debug!("installing raw event filter");
            let this = self.this.clone();
            let guard = FilterGuard::install(
                Rc::clone(&self.host.event_source),
                Rc::new(move |event: &RawEvent| match this.upgrade() {
                    Some(inner) => inner.handle_raw_event(event),
                    None => FilterReturn::Continue,
                }),
            );
            self.state.borrow_mut().event_filter = Some(guard);
        } else if !wanted && installed {
            debug!("removing raw event filter");
            let guard = self.state.borrow_mut().event_filter.take();
            drop(guard);
        }
    }

    fn handle_raw_event(&self, event: &RawEvent) -> FilterReturn {
        trace!("raw event: {:?}", event);

        let (hook, reset) = {
            let state = self.state.borrow();
            if !state.has_focus || state.client_window.is_none() {
                return FilterReturn::Continue;
            }
            (
                state.is_hook_gdk_event_key,
                state.is_reset_on_gdk_button_press_event,
            )
        };

        match event {
            RawEvent::Key(key) if hook => {
                let im_event = translate_raw_key(key, self.host.keymap.as_ref());
                trace!(
                    "raw key {} -> keyval {:#x}",
                    key.keycode,
                    im_event.key.keyval
                );
                if self.im.filter_event(&im_event) {
                    return FilterReturn::Remove;
                }
            }
            RawEvent::ButtonPress { .. } if reset => {
                debug!("button press: reset");
                self.im.reset();
            }
            _ => {}
        }

        FilterReturn::Continue
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        debug!("ImContext dropped");
        for id in self.settings_handlers.get_mut().drain(..) {
            self.host.settings.disconnect(id);
        }
        if let Some(handlers) = self.im_handlers.get_mut().take() {
            handlers.disconnect(self.im.signals());
        }
        // Removed regardless of the current settings
        drop(self.state.get_mut().event_filter.take());
    }
}

impl fmt::Debug for ImContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("ImContext")
            .field("has_focus", &state.has_focus)
            .field("has_client_window", &state.client_window.is_some())
            .field("cursor_area", &state.cursor_area)
            .field(
                "reset_on_gdk_button_press_event",
                &state.is_reset_on_gdk_button_press_event,
            )
            .field("hook_gdk_event_key", &state.is_hook_gdk_event_key)
            .field("has_event_filter", &state.event_filter.is_some())
            .finish()
    }
}
