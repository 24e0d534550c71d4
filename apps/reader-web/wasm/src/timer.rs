//! `setTimeout`-backed scheduler for the browser event loop

use crate::console;
use highlight_core::{Scheduler, Task, TimerId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use web_sys::Window;

#[derive(Default)]
struct Timers {
    next_id: u64,
    /// Browser timeout handle and callback for every timer not yet fired
    active: HashMap<u64, (i32, Closure<dyn FnMut()>)>,
    /// Callbacks that already ran; dropped when the next timer fires
    fired: Vec<Closure<dyn FnMut()>>,
}

/// Schedules engine tasks with `window.setTimeout`
///
/// Callbacks stay owned on the Rust side until they fire or are cancelled,
/// so cancelling a timer also frees its closure.
pub struct WindowScheduler {
    window: Window,
    timers: Rc<RefCell<Timers>>,
}

impl WindowScheduler {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            timers: Rc::new(RefCell::new(Timers::default())),
        }
    }

    pub fn pending(&self) -> usize {
        self.timers.borrow().active.len()
    }
}

/// Clamp a delay to the range `setTimeout` accepts
pub fn timeout_millis(delay: Duration) -> i32 {
    delay.as_millis().min(i32::MAX as u128) as i32
}

impl Scheduler for WindowScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerId {
        let id = {
            let mut timers = self.timers.borrow_mut();
            let id = timers.next_id;
            timers.next_id += 1;
            id
        };

        let registry = Rc::downgrade(&self.timers);
        let callback = Closure::once(move || {
            if let Some(registry) = registry.upgrade() {
                let mut timers = registry.borrow_mut();
                // The running callback is parked, not dropped
                timers.fired.clear();
                if let Some((_, closure)) = timers.active.remove(&id) {
                    timers.fired.push(closure);
                }
            }
            task();
        });

        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                timeout_millis(delay),
            ) {
            Ok(handle) => {
                self.timers.borrow_mut().active.insert(id, (handle, callback));
            }
            Err(e) => console::warn("setTimeout failed", &e),
        }
        TimerId(id)
    }

    fn cancel(&self, id: TimerId) {
        let removed = self.timers.borrow_mut().active.remove(&id.0);
        if let Some((handle, _callback)) = removed {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

impl Drop for WindowScheduler {
    fn drop(&mut self) {
        for (_, (handle, _)) in self.timers.borrow_mut().active.drain() {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}
