//! Process-wide low-level event filters.
//!
//! The windowing system runs registered filters over every raw event before
//! the toolkit routes it. A filter answers `Continue` to let the event through
//! or `Remove` to swallow it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::event::RawEvent;

/// Outcome of running a filter over a raw event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterReturn {
    /// Let the event propagate to the next filter and the toolkit.
    Continue,
    /// The event was consumed; stop processing it.
    Remove,
}

/// Stable identity of a registered filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterId(u64);

impl FilterId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }
}

pub type FilterFn = Rc<dyn Fn(&RawEvent) -> FilterReturn>;

/// Registration surface for process-wide event filters.
pub trait EventSource {
    fn add_filter(&self, filter: FilterFn) -> FilterId;
    fn remove_filter(&self, id: FilterId);
}

/// Registered filter that is removed again when the guard is dropped.
pub struct FilterGuard {
    source: Rc<dyn EventSource>,
    id: FilterId,
}

impl FilterGuard {
    pub fn install(source: Rc<dyn EventSource>, filter: FilterFn) -> Self {
        let id = source.add_filter(filter);
        trace!("filter {:?} installed", id);
        Self { source, id }
    }

    pub fn id(&self) -> FilterId {
        self.id
    }
}

impl Drop for FilterGuard {
    fn drop(&mut self) {
        trace!("filter {:?} removed", self.id);
        self.source.remove_filter(self.id);
    }
}

impl fmt::Debug for FilterGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterGuard").field("id", &self.id).finish()
    }
}

/// In-process filter list, dispatched in registration order.
#[derive(Default)]
pub struct FilterChain {
    filters: RefCell<Vec<(FilterId, FilterFn)>>,
    next_id: Cell<u64>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `event` through the filters; stops at the first `Remove`.
    pub fn dispatch(&self, event: &RawEvent) -> FilterReturn {
        // Filters may add or remove filters while running
        let filters: Vec<FilterFn> = self
            .filters
            .borrow()
            .iter()
            .map(|(_, f)| Rc::clone(f))
            .collect();

        for filter in filters {
            if filter(event) == FilterReturn::Remove {
                return FilterReturn::Remove;
            }
        }
        FilterReturn::Continue
    }

    pub fn len(&self) -> usize {
        self.filters.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.borrow().is_empty()
    }
}

impl EventSource for FilterChain {
    fn add_filter(&self, filter: FilterFn) -> FilterId {
        let id = FilterId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.filters.borrow_mut().push((id, filter));
        id
    }

    fn remove_filter(&self, id: FilterId) {
        self.filters.borrow_mut().retain(|(fid, _)| *fid != id);
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.len())
            .finish()
    }
}
