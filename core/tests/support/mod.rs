// core/tests/support/mod.rs
//
// Shared fixtures for the context integration tests:
// - RecordingIm: input method that records every call it receives
// - CountingSource: event source that counts filter (de)registrations
// - fixture(): context wired to both plus a MemorySettings store

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use imbridge_core::{
    ClientConfig, EventSource, FilterChain, FilterFn, FilterId, Host, ImContext, ImEvent,
    ImSignals, InputMethod, MemorySettings, RawEvent, FilterReturn, Rectangle, TableKeymap,
};

#[derive(Default)]
pub struct RecordingIm {
    pub signals: ImSignals,
    /// Value returned from filter_event
    pub consume: Cell<bool>,
    pub events: RefCell<Vec<ImEvent>>,
    pub resets: Cell<usize>,
    pub focus_calls: RefCell<Vec<&'static str>>,
    /// Queried from inside focus_in/focus_out; answers land in focus_seen
    pub focus_probe: RefCell<Option<Box<dyn Fn() -> bool>>>,
    pub focus_seen: RefCell<Vec<bool>>,
    pub cursor_locations: RefCell<Vec<Rectangle>>,
    pub use_preedit: Cell<Option<bool>>,
    pub preedit: RefCell<(String, i32)>,
    pub surrounding: RefCell<Option<(String, i32)>>,
    pub set_surrounding_calls: RefCell<Vec<(String, i32, i32)>>,
}

impl RecordingIm {
    pub fn event_count(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn last_event(&self) -> Option<ImEvent> {
        self.events.borrow().last().copied()
    }

    fn sample_focus(&self) {
        if let Some(probe) = self.focus_probe.borrow().as_ref() {
            self.focus_seen.borrow_mut().push(probe());
        }
    }
}

impl InputMethod for RecordingIm {
    fn filter_event(&self, event: &ImEvent) -> bool {
        self.events.borrow_mut().push(*event);
        self.consume.get()
    }

    fn reset(&self) {
        self.resets.set(self.resets.get() + 1);
    }

    fn focus_in(&self) {
        self.focus_calls.borrow_mut().push("in");
        self.sample_focus();
    }

    fn focus_out(&self) {
        self.focus_calls.borrow_mut().push("out");
        self.sample_focus();
    }

    fn preedit_string(&self) -> (String, i32) {
        self.preedit.borrow().clone()
    }

    fn set_cursor_location(&self, area: &Rectangle) {
        self.cursor_locations.borrow_mut().push(*area);
    }

    fn set_use_preedit(&self, use_preedit: bool) {
        self.use_preedit.set(Some(use_preedit));
    }

    fn surrounding(&self) -> Option<(String, i32)> {
        self.surrounding.borrow().clone()
    }

    fn set_surrounding(&self, text: &str, len: i32, cursor_index: i32) {
        self.set_surrounding_calls
            .borrow_mut()
            .push((text.to_string(), len, cursor_index));
    }

    fn signals(&self) -> &ImSignals {
        &self.signals
    }
}

#[derive(Default)]
pub struct CountingSource {
    pub chain: FilterChain,
    pub added: Cell<usize>,
    pub removed: Cell<usize>,
}

impl CountingSource {
    pub fn dispatch(&self, event: &RawEvent) -> FilterReturn {
        self.chain.dispatch(event)
    }

    pub fn installed(&self) -> usize {
        self.chain.len()
    }
}

impl EventSource for CountingSource {
    fn add_filter(&self, filter: FilterFn) -> FilterId {
        self.added.set(self.added.get() + 1);
        self.chain.add_filter(filter)
    }

    fn remove_filter(&self, id: FilterId) {
        self.removed.set(self.removed.get() + 1);
        self.chain.remove_filter(id);
    }
}

pub struct Fixture {
    pub im: Rc<RecordingIm>,
    pub source: Rc<CountingSource>,
    pub settings: MemorySettings,
}

pub fn fixture(config: ClientConfig) -> (ImContext, Fixture) {
    let im = Rc::new(RecordingIm::default());
    let source = Rc::new(CountingSource::default());
    let settings = MemorySettings::from_config(&config);

    let host = Host {
        event_source: source.clone(),
        settings: Rc::new(settings.clone()),
        keymap: Rc::new(TableKeymap::us()),
    };
    let context = ImContext::new(im.clone(), host);

    (
        context,
        Fixture {
            im,
            source,
            settings,
        },
    )
}

pub fn config(reset_on_button_press: bool, hook_event_key: bool) -> ClientConfig {
    ClientConfig {
        reset_on_gdk_button_press_event: reset_on_button_press,
        hook_gdk_event_key: hook_event_key,
    }
}
