//! Integration tests for the module registration surface.
//!
//! Covers the Rust-side `ImModule` and the C entry points exported from the
//! shared object.

use std::ffi::{c_int, CStr};
use std::rc::Rc;

use imbridge_core::{
    FilterChain, Host, ImContext, ImEvent, ImSignals, InputMethod, MemorySettings, Rectangle,
    TableKeymap,
};
use imbridge_gtk::ffi::{self, CContextInfo};
use imbridge_gtk::{ImModule, CONTEXT_ID};

#[derive(Default)]
struct NullIm {
    signals: ImSignals,
}

impl InputMethod for NullIm {
    fn filter_event(&self, _event: &ImEvent) -> bool {
        false
    }
    fn reset(&self) {}
    fn focus_in(&self) {}
    fn focus_out(&self) {}
    fn preedit_string(&self) -> (String, i32) {
        (String::new(), 0)
    }
    fn set_cursor_location(&self, _area: &Rectangle) {}
    fn set_use_preedit(&self, _use_preedit: bool) {}
    fn surrounding(&self) -> Option<(String, i32)> {
        None
    }
    fn set_surrounding(&self, _text: &str, _len: i32, _cursor_index: i32) {}
    fn signals(&self) -> &ImSignals {
        &self.signals
    }
}

fn new_context() -> ImContext {
    let host = Host {
        event_source: Rc::new(FilterChain::new()),
        settings: Rc::new(MemorySettings::new()),
        keymap: Rc::new(TableKeymap::us()),
    };
    ImContext::new(Rc::new(NullIm::default()), host)
}

#[test]
fn test_module_creates_only_its_context() {
    let module = ImModule::new(new_context);
    assert!(!module.is_initialized());
    assert!(module.create(CONTEXT_ID).is_none());
    module.init();
    assert!(module.is_initialized());

    assert_eq!(module.list().len(), 1);
    assert_eq!(module.list()[0].context_id, CONTEXT_ID);

    let ctx = module.create(CONTEXT_ID).expect("known id creates a context");
    assert!(!ctx.has_event_filter());
    assert!(module.create("xim").is_none());
    assert!(module.create("").is_none());

    module.exit();
    assert!(!module.is_initialized());
    assert!(module.create(CONTEXT_ID).is_none());
}

#[test]
fn test_c_entry_points() {
    // Without a factory there is no module to initialize
    ffi::im_module_init(std::ptr::null_mut());
    assert!(!ffi::is_initialized());

    let mut contexts: *const *const CContextInfo = std::ptr::null();
    let mut n_contexts: c_int = 0;
    unsafe { ffi::im_module_list(&mut contexts, &mut n_contexts) };
    assert_eq!(n_contexts, 1);

    let info = unsafe { &**contexts };
    let id = unsafe { CStr::from_ptr(info.context_id) };
    let name = unsafe { CStr::from_ptr(info.context_name) };
    let locales = unsafe { CStr::from_ptr(info.default_locales) };
    assert_eq!(id.to_str().unwrap(), "nimf");
    assert_eq!(name.to_str().unwrap(), "Nimf");
    assert_eq!(locales.to_str().unwrap(), "ko:ja:zh");

    // Null outputs are ignored
    unsafe { ffi::im_module_list(std::ptr::null_mut(), std::ptr::null_mut()) };

    // No factory yet
    assert!(unsafe { ffi::im_module_create(c"nimf".as_ptr()) }.is_null());

    assert!(ffi::set_context_factory(new_context));
    assert!(!ffi::set_context_factory(new_context));

    // Not initialized yet
    assert!(unsafe { ffi::im_module_create(c"nimf".as_ptr()) }.is_null());
    ffi::im_module_init(std::ptr::null_mut());
    assert!(ffi::is_initialized());

    assert!(unsafe { ffi::im_module_create(c"other".as_ptr()) }.is_null());
    assert!(unsafe { ffi::im_module_create(std::ptr::null()) }.is_null());

    let ctx = unsafe { ffi::im_module_create(c"nimf".as_ptr()) };
    assert!(!ctx.is_null());
    unsafe { ffi::im_module_context_free(ctx) };
    unsafe { ffi::im_module_context_free(std::ptr::null_mut()) };

    ffi::im_module_exit();
    assert!(!ffi::is_initialized());
    assert!(unsafe { ffi::im_module_create(c"nimf".as_ptr()) }.is_null());
}
