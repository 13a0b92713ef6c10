//! C-compatible module entry points.
//!
//! The toolkit loads input-method modules as shared objects and looks up
//! `im_module_init`, `im_module_exit`, `im_module_list` and
//! `im_module_create`. Contexts handed out by `im_module_create` are opaque
//! boxed `ImContext`s released with `im_module_context_free`.
//!
//! The entry points drive an `ImModule` owned by the toolkit's main thread.
//! It is created by `set_context_factory`, which must run on that thread
//! before the toolkit calls `im_module_init`.

#![deny(unsafe_op_in_unsafe_fn)]

use std::ffi::{c_char, c_int, c_void, CStr, CString};

use imbridge_core::ImContext;
use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use tracing::{debug, warn};

use crate::module::{context_list, ContextInfo, ImModule};

/// C layout of a context descriptor.
#[repr(C)]
#[derive(Debug)]
pub struct CContextInfo {
    pub context_id: *const c_char,
    pub context_name: *const c_char,
    pub domain: *const c_char,
    pub domain_dirname: *const c_char,
    pub default_locales: *const c_char,
}

struct CTable {
    // Owns the strings the descriptors point into
    _strings: Vec<CString>,
    // Boxed so `list` pointers stay valid
    infos: Box<[CContextInfo]>,
    list: Box<[*const CContextInfo]>,
}

// SAFETY: the table is built once and never mutated; every pointer targets
// heap data owned by the table itself.
unsafe impl Send for CTable {}
unsafe impl Sync for CTable {}

impl CTable {
    fn build(contexts: &[ContextInfo]) -> Self {
        let mut strings = Vec::new();
        let mut intern = |s: &str| {
            // Interior NULs cannot occur in the static descriptor strings
            let c = CString::new(s.replace('\0', "")).unwrap_or_default();
            let ptr = c.as_ptr();
            strings.push(c);
            ptr
        };

        let infos: Box<[CContextInfo]> = contexts
            .iter()
            .map(|info| CContextInfo {
                context_id: intern(info.context_id),
                context_name: intern(info.context_name),
                domain: intern(info.domain),
                domain_dirname: intern(info.domain_dirname),
                default_locales: intern(info.default_locales),
            })
            .collect();
        let list = infos.iter().map(|info| info as *const CContextInfo).collect();

        Self {
            _strings: strings,
            infos,
            list,
        }
    }
}

static C_TABLE: Lazy<CTable> = Lazy::new(|| CTable::build(context_list()));

thread_local! {
    static MODULE: OnceCell<ImModule> = OnceCell::new();
}

fn with_module<R>(f: impl FnOnce(&ImModule) -> R) -> Option<R> {
    MODULE.with(|module| module.get().map(f))
}

/// Create the module around `factory`. Only the first call on a thread
/// wins; later calls return false.
pub fn set_context_factory(factory: fn() -> ImContext) -> bool {
    MODULE.with(|module| module.set(ImModule::new(factory)).is_ok())
}

pub fn is_initialized() -> bool {
    with_module(ImModule::is_initialized).unwrap_or(false)
}

/// Module load hook. `type_module` is the toolkit's type module and is not
/// dereferenced.
#[no_mangle]
pub extern "C" fn im_module_init(type_module: *mut c_void) {
    debug!("im_module_init: {:p}", type_module);
    if with_module(ImModule::init).is_none() {
        warn!("im_module_init: no context factory installed");
    }
}

#[no_mangle]
pub extern "C" fn im_module_exit() {
    debug!("im_module_exit");
    with_module(ImModule::exit);
}

/// Report the context descriptors.
///
/// # Safety
///
/// `contexts` and `n_contexts` must each be null or valid for a write.
#[no_mangle]
pub unsafe extern "C" fn im_module_list(
    contexts: *mut *const *const CContextInfo,
    n_contexts: *mut c_int,
) {
    debug!("im_module_list");
    if contexts.is_null() || n_contexts.is_null() {
        warn!("im_module_list: null output pointer");
        return;
    }
    let table = &*C_TABLE;
    // SAFETY: both pointers are non-null and writable per the contract above.
    unsafe {
        *contexts = table.list.as_ptr();
        *n_contexts = table.infos.len() as c_int;
    }
}

/// Create the context named `context_id`.
///
/// The result is an opaque pointer to a boxed `ImContext`.
///
/// Returns null for unknown ids, a null or non-UTF-8 id, or when the module
/// has no factory or is not initialized. A non-null result must be released with
/// `im_module_context_free`.
///
/// # Safety
///
/// `context_id` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn im_module_create(context_id: *const c_char) -> *mut c_void {
    if context_id.is_null() {
        warn!("im_module_create: null context id");
        return std::ptr::null_mut();
    }
    // SAFETY: non-null and NUL-terminated per the contract above.
    let id = unsafe { CStr::from_ptr(context_id) };
    let Ok(id) = id.to_str() else {
        return std::ptr::null_mut();
    };
    let Some(created) = with_module(|module| module.create(id)) else {
        warn!("im_module_create: no context factory installed");
        return std::ptr::null_mut();
    };

    match created {
        Some(context) => Box::into_raw(Box::new(context)).cast::<c_void>(),
        None => std::ptr::null_mut(),
    }
}

/// Release a context returned by `im_module_create`.
///
/// # Safety
///
/// `context` must be null or a pointer obtained from `im_module_create`
/// that has not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn im_module_context_free(context: *mut c_void) {
    if context.is_null() {
        return;
    }
    // SAFETY: the pointer came from `Box::into_raw` in `im_module_create`
    // and ownership returns to Rust exactly once per the contract above.
    drop(unsafe { Box::from_raw(context.cast::<ImContext>()) });
}
