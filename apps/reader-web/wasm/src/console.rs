use highlight_core::{Diagnostic, Diagnostics};
use wasm_bindgen::JsValue;

/// Prefix on every console line emitted by the engine
pub const LOG_PREFIX: &str = "[highlight]";

pub fn console_line(diagnostic: &impl std::fmt::Display) -> String {
    format!("{} {}", LOG_PREFIX, diagnostic)
}

/// Warn on the browser console about a failed DOM call
pub(crate) fn warn(context: &str, error: &JsValue) {
    web_sys::console::warn_2(&JsValue::from_str(&console_line(&context)), error);
}

/// Reports engine diagnostics on the browser console
///
/// Warnings go to `console.warn`; routine conditions go to `console.debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleDiagnostics;

impl Diagnostics for ConsoleDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        let line = JsValue::from_str(&console_line(&diagnostic));
        if diagnostic.is_warning() {
            web_sys::console::warn_1(&line);
        } else {
            web_sys::console::debug_1(&line);
        }
    }
}
