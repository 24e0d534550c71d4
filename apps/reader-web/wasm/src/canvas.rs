//! Canvas-backed page surfaces
//!
//! Each rendered page is a `<canvas>` whose id is a shared prefix followed by
//! the 0-indexed page number (`page-canvas-0`, `page-canvas-1`, ...).

use highlight_core::{BoundingBox, PageSurface, SurfaceLookup};
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition,
};

pub const DEFAULT_CANVAS_PREFIX: &str = "page-canvas-";

/// A rendered page and its 2D drawing context
#[derive(Debug, Clone)]
pub struct CanvasPage {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasPage {
    /// Wrap a canvas, acquiring its 2D context
    ///
    /// # Errors
    /// Returns JsValue error if the canvas has no 2D context
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("Canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, context })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl PageSurface for CanvasPage {
    fn fill_rect(&self, rect: &BoundingBox, color: &str) {
        self.context.save();
        self.context.set_fill_style_str(color);
        self.context.fill_rect(rect.x, rect.y, rect.width, rect.height);
        self.context.restore();
    }

    fn stroke_rect(&self, rect: &BoundingBox, color: &str, line_width: f64) {
        self.context.save();
        self.context.set_stroke_style_str(color);
        self.context.set_line_width(line_width);
        self.context.stroke_rect(rect.x, rect.y, rect.width, rect.height);
        self.context.restore();
    }

    fn scroll_into_view(&self) {
        self.canvas
            .scroll_into_view_with_scroll_into_view_options(&smooth_scroll(ScrollLogicalPosition::Start));
    }
}

/// Smooth scroll options shared by page and paragraph scrolling
pub(crate) fn smooth_scroll(block: ScrollLogicalPosition) -> ScrollIntoViewOptions {
    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    options.set_block(block);
    options
}

/// Canvas id for a 0-indexed page
pub fn canvas_id(prefix: &str, page: u32) -> String {
    format!("{}{}", prefix, page)
}

/// Finds page canvases in the document by id
#[derive(Debug, Clone)]
pub struct CanvasLookup {
    document: Document,
    prefix: String,
}

impl CanvasLookup {
    pub fn new(document: Document, prefix: impl Into<String>) -> Self {
        Self {
            document,
            prefix: prefix.into(),
        }
    }
}

impl SurfaceLookup for CanvasLookup {
    type Surface = CanvasPage;

    fn surface(&self, page: u32) -> Option<CanvasPage> {
        let canvas = self
            .document
            .get_element_by_id(&canvas_id(&self.prefix, page))?
            .dyn_into::<HtmlCanvasElement>()
            .ok()?;
        CanvasPage::new(canvas).ok()
    }
}
