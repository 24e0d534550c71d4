//! Overlay markers positioned over rendered pages
//!
//! Each page wrapper gets one overlay container stretched over the canvas.
//! Highlight markers are absolutely positioned inside it and never intercept
//! pointer events, so text selection and clicks reach the page underneath.

use crate::console;
use highlight_core::{BoundingBox, HighlightStyle, OverlayHost, OverlayMarker};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

pub const OVERLAY_CONTAINER_CLASS: &str = "overlay-container";
pub const MARKER_CLASS: &str = "highlight-overlay";

/// Overlay container id for a 0-indexed page
pub fn overlay_id(page: u32) -> String {
    format!("overlay-page-{}", page)
}

/// Inline style declarations for a marker
pub fn marker_style(rect: &BoundingBox, style: &HighlightStyle) -> Vec<(&'static str, String)> {
    let mut props = vec![
        ("position", "absolute".to_string()),
        ("left", format!("{}px", rect.x)),
        ("top", format!("{}px", rect.y)),
        ("width", format!("{}px", rect.width)),
        ("height", format!("{}px", rect.height)),
        ("background-color", style.fill_color.clone()),
        (
            "border",
            format!("{}px solid {}", style.stroke_width, style.stroke_color),
        ),
        ("box-sizing", "border-box".to_string()),
        ("pointer-events", "none".to_string()),
    ];
    if style.animation_duration_ms > 0 {
        props.push((
            "transition",
            format!("opacity {}ms ease-in-out", style.animation_duration_ms),
        ));
    }
    props
}

fn apply_style(element: &Element, props: &[(&str, String)]) -> Result<(), JsValue> {
    if let Some(html_element) = element.dyn_ref::<HtmlElement>() {
        let css = html_element.style();
        for (name, value) in props {
            css.set_property(name, value)?;
        }
    }
    Ok(())
}

/// A highlight marker element
#[derive(Debug, Clone)]
pub struct DomMarker {
    element: Element,
}

impl DomMarker {
    pub fn element(&self) -> &Element {
        &self.element
    }
}

impl OverlayMarker for DomMarker {
    fn set_opacity(&self, opacity: f64) {
        if let Some(html_element) = self.element.dyn_ref::<HtmlElement>() {
            if let Err(e) = html_element
                .style()
                .set_property("opacity", &opacity.to_string())
            {
                console::warn("Failed to set marker opacity", &e);
            }
        }
    }

    fn remove(&self) {
        self.element.remove();
    }
}

/// Overlay container for one page
pub struct DomOverlayHost {
    document: Document,
    container: Element,
}

impl DomOverlayHost {
    /// Find or create the overlay container inside a page wrapper
    ///
    /// # Errors
    /// Returns JsValue error if the container cannot be created or styled
    pub fn attach(document: &Document, page_element: &Element, page: u32) -> Result<Self, JsValue> {
        let id = overlay_id(page);
        let container = match page_element.query_selector(&format!("#{}", id))? {
            Some(existing) => existing,
            None => {
                let overlay = document.create_element("div")?;
                overlay.set_class_name(OVERLAY_CONTAINER_CLASS);
                overlay.set_id(&id);
                apply_style(
                    &overlay,
                    &[
                        ("position", "absolute".to_string()),
                        ("top", "0".to_string()),
                        ("left", "0".to_string()),
                        ("width", "100%".to_string()),
                        ("height", "100%".to_string()),
                        ("pointer-events", "none".to_string()),
                    ],
                )?;
                page_element.append_child(&overlay)?;
                overlay
            }
        };

        Ok(Self {
            document: document.clone(),
            container,
        })
    }

    pub fn container(&self) -> &Element {
        &self.container
    }

    fn build_marker(&self, rect: &BoundingBox, style: &HighlightStyle) -> Result<Element, JsValue> {
        let marker = self.document.create_element("div")?;
        marker.set_class_name(MARKER_CLASS);
        apply_style(&marker, &marker_style(rect, style))?;
        self.container.append_child(&marker)?;
        Ok(marker)
    }
}

impl OverlayHost for DomOverlayHost {
    type Marker = DomMarker;

    fn create_marker(&self, rect: &BoundingBox, style: &HighlightStyle) -> Option<DomMarker> {
        match self.build_marker(rect, style) {
            Ok(element) => Some(DomMarker { element }),
            Err(e) => {
                console::warn("Failed to create highlight marker", &e);
                None
            }
        }
    }
}
