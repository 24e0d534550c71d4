//! Single-use cleanup handles

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Why an applied highlight went away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalCause {
    /// The caller invoked the handle
    Released,
    /// A fade timer removed it
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightState {
    /// Nothing was applied; the handle is inert
    Unapplied,
    Applied,
    Removed(RemovalCause),
}

struct Slot {
    state: HighlightState,
    cleanup: Option<Box<dyn FnOnce()>>,
}

/// Cleanup capability returned by every highlight operation
///
/// Clones share the same slot. The cleanup runs at most once, whichever clone
/// triggers it; every later call is a no-op.
#[derive(Clone)]
pub struct HighlightHandle {
    slot: Rc<RefCell<Slot>>,
}

impl HighlightHandle {
    pub fn new(cleanup: impl FnOnce() + 'static) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot {
                state: HighlightState::Applied,
                cleanup: Some(Box::new(cleanup)),
            })),
        }
    }

    /// A handle for an operation that applied nothing
    pub fn inert() -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot {
                state: HighlightState::Unapplied,
                cleanup: None,
            })),
        }
    }

    /// Remove the highlight now
    pub fn release(&self) {
        self.finish(RemovalCause::Released);
    }

    /// Remove the highlight on behalf of a timer
    pub(crate) fn expire(&self) {
        self.finish(RemovalCause::Expired);
    }

    pub fn state(&self) -> HighlightState {
        self.slot.borrow().state
    }

    pub fn is_applied(&self) -> bool {
        self.state() == HighlightState::Applied
    }

    fn finish(&self, cause: RemovalCause) {
        let cleanup = {
            let mut slot = self.slot.borrow_mut();
            if slot.state != HighlightState::Applied {
                return;
            }
            slot.state = HighlightState::Removed(cause);
            slot.cleanup.take()
        };
        // The slot borrow is dropped first so the cleanup may inspect this handle
        if let Some(cleanup) = cleanup {
            cleanup();
        }
    }
}

impl fmt::Debug for HighlightHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HighlightHandle")
            .field("state", &self.state())
            .finish()
    }
}
