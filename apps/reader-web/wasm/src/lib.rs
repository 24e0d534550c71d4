//! WASM bindings for source-document highlighting
//!
//! Connects `highlight-core` to the browser: page canvases, overlay markers,
//! paragraph elements, `setTimeout`, and the console.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { HighlightSession, pageToSurfaceBox } from './pkg/reader_wasm.js';
//!
//! await init();
//!
//! const session = new HighlightSession({ fadeDurationMs: 1500 });
//!
//! // PDF documents: canvases are `page-canvas-0`, `page-canvas-1`, ...
//! const batch = session.highlightAndScroll(node.references, 792, 1.5);
//! batch.release(); // cancels references that have not been painted yet
//!
//! // Plain-text documents
//! const container = document.getElementById('document-text');
//! session.scrollToOffset(container, node.startOffset);
//! session.highlightRegion(node.id, container, node.startOffset, node.endOffset);
//! ```

pub mod canvas;
pub mod console;
pub mod overlay;
pub mod session;
pub mod text;
pub mod timer;

use highlight_core::BoundingBox;
use wasm_bindgen::prelude::*;

pub use canvas::{CanvasLookup, CanvasPage};
pub use console::ConsoleDiagnostics;
pub use overlay::{DomMarker, DomOverlayHost};
pub use session::{HighlightSession, JsHighlightHandle};
pub use text::{DomContainer, DomParagraph};
pub use timer::WindowScheduler;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Unscaled surface-space top edge of a page-space box
#[wasm_bindgen(js_name = pageToSurfaceY)]
pub fn page_to_surface_y(page_y: f64, box_height: f64, page_height: f64) -> f64 {
    highlight_core::page_to_surface_y(page_y, box_height, page_height)
}

/// Scaled surface-space box for a page-space `{x, y, width, height}`
#[wasm_bindgen(js_name = pageToSurfaceBox)]
pub fn page_to_surface_box(bbox: JsValue, page_height: f64, scale: f64) -> Result<JsValue, JsValue> {
    let bbox: BoundingBox = serde_wasm_bindgen::from_value(bbox)
        .map_err(|e| JsValue::from_str(&format!("Invalid bounding box: {}", e)))?;
    let rect = highlight_core::page_to_surface_box(&bbox, page_height, scale)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&rect)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}


#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_page_to_surface_box_roundtrips_js_object() {
        let input = serde_wasm_bindgen::to_value(&BoundingBox::new(72.0, 720.0, 400.0, 24.0)).unwrap();
        let output = page_to_surface_box(input, 792.0, 1.5).unwrap();
        let rect: BoundingBox = serde_wasm_bindgen::from_value(output).unwrap();
        assert_eq!(rect, BoundingBox::new(108.0, 72.0, 600.0, 36.0));
    }

    #[wasm_bindgen_test]
    fn test_page_to_surface_box_rejects_zero_scale() {
        let input = serde_wasm_bindgen::to_value(&BoundingBox::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        assert!(page_to_surface_box(input, 792.0, 0.0).is_err());
    }
}
