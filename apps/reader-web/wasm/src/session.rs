//! Session-based highlight API exposed to JavaScript
//!
//! A session owns the engine, its `setTimeout` scheduler, and the keyed
//! region highlights. Rendering targets are looked up in the document per
//! call, so the session never holds on to DOM nodes between calls.

use crate::canvas::{CanvasLookup, DEFAULT_CANVAS_PREFIX};
use crate::console::ConsoleDiagnostics;
use crate::overlay::DomOverlayHost;
use crate::text::{DomContainer, DomParagraph};
use crate::timer::WindowScheduler;
use highlight_core::{
    find_element_at_offset, get_first_page_number, BoundingBox, EngineConfig, HighlightEngine,
    HighlightHandle, HighlightState, PageGeometry, RegionHighlights, RemovalCause,
    SourceReference,
};
use serde_json::Value;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

/// Parse a JS value into JSON
///
/// Strings are treated as serialized JSON; anything else is round-tripped
/// through `JSON.stringify` so integral numbers stay integral.
pub(crate) fn json_value(value: &JsValue) -> Result<Value, JsValue> {
    let text = match value.as_string() {
        Some(text) => text,
        None => String::from(js_sys::JSON::stringify(value)?),
    };
    parse_json(&text).map_err(|e| JsValue::from_str(&e))
}

pub(crate) fn parse_json(text: &str) -> Result<Value, String> {
    serde_json::from_str(text).map_err(|e| format!("Invalid JSON: {}", e))
}

/// Split a reference payload into its entries
///
/// A single object is accepted as a batch of one.
pub(crate) fn reference_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

pub(crate) fn without_positions(indexed: &[(usize, SourceReference)]) -> Vec<SourceReference> {
    indexed.iter().map(|(_, reference)| reference.clone()).collect()
}

/// Lowercase name of a handle state, as reported to JavaScript
pub fn state_label(state: HighlightState) -> &'static str {
    match state {
        HighlightState::Unapplied => "unapplied",
        HighlightState::Applied => "applied",
        HighlightState::Removed(RemovalCause::Released) => "released",
        HighlightState::Removed(RemovalCause::Expired) => "expired",
    }
}

fn load_config(config: &JsValue) -> Result<EngineConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(EngineConfig::default());
    }
    let json = json_value(config)?;
    EngineConfig::from_json(&json.to_string()).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Cleanup handle returned to JavaScript
#[wasm_bindgen]
pub struct JsHighlightHandle {
    inner: HighlightHandle,
}

impl From<HighlightHandle> for JsHighlightHandle {
    fn from(inner: HighlightHandle) -> Self {
        Self { inner }
    }
}

#[wasm_bindgen]
impl JsHighlightHandle {
    /// Remove the highlight; calling it again does nothing
    pub fn release(&self) {
        self.inner.release();
    }

    /// True once the highlight was removed, by release or by its fade timer
    #[wasm_bindgen(js_name = isReleased)]
    pub fn is_released(&self) -> bool {
        matches!(self.inner.state(), HighlightState::Removed(_))
    }

    #[wasm_bindgen(js_name = isApplied)]
    pub fn is_applied(&self) -> bool {
        self.inner.is_applied()
    }

    /// One of `unapplied`, `applied`, `released`, `expired`
    pub fn state(&self) -> String {
        state_label(self.inner.state()).to_string()
    }
}

/// Highlighting session bound to the current document
#[wasm_bindgen]
pub struct HighlightSession {
    engine: HighlightEngine,
    document: Document,
    canvas_prefix: String,
    regions: RegionHighlights<String>,
}

impl HighlightSession {
    fn canvases(&self) -> Rc<CanvasLookup> {
        Rc::new(CanvasLookup::new(
            self.document.clone(),
            self.canvas_prefix.clone(),
        ))
    }

    fn container(&self, element: Element) -> DomContainer {
        DomContainer::new(self.document.clone(), element)
    }

    fn mark_class(&self, class: Option<String>) -> String {
        class.unwrap_or_else(|| self.engine.config().style.mark_class.clone())
    }

    /// Well-formed references paired with their position in the payload
    fn parse_references(
        &self,
        references: &JsValue,
    ) -> Result<Vec<(usize, SourceReference)>, JsValue> {
        let values = reference_list(json_value(references)?);
        Ok(self.engine.classify_references(&values))
    }

    fn parse_typed_references(
        &self,
        references: &JsValue,
    ) -> Result<Vec<SourceReference>, JsValue> {
        Ok(without_positions(&self.parse_references(references)?))
    }
}

#[wasm_bindgen]
impl HighlightSession {
    /// Create a session; `config` may be omitted, a config object, or a JSON string
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<HighlightSession, JsValue> {
        let config = load_config(&config)?;
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document"))?;

        let engine = HighlightEngine::new(Rc::new(WindowScheduler::new(window)))
            .with_diagnostics(Rc::new(ConsoleDiagnostics))
            .with_config(config);

        Ok(Self {
            engine,
            document,
            canvas_prefix: DEFAULT_CANVAS_PREFIX.to_string(),
            regions: RegionHighlights::new(),
        })
    }

    /// Change the id prefix used to find page canvases (default `page-canvas-`)
    #[wasm_bindgen(js_name = setCanvasPrefix)]
    pub fn set_canvas_prefix(&mut self, prefix: String) {
        self.canvas_prefix = prefix;
    }

    #[wasm_bindgen(js_name = getConfigJson)]
    pub fn get_config_json(&self) -> String {
        serde_json::to_string(self.engine.config()).unwrap_or_default()
    }

    /// Paint every reference on its page canvas, one every `staggerMs`
    ///
    /// `staggerMs` defaults to the configured stagger delay.
    #[wasm_bindgen(js_name = highlightAllReferences)]
    pub fn highlight_all_references(
        &self,
        references: JsValue,
        page_height: f64,
        scale: f64,
        stagger_ms: Option<u32>,
    ) -> Result<JsHighlightHandle, JsValue> {
        let values = reference_list(json_value(&references)?);
        let stagger = stagger_ms
            .map(|ms| Duration::from_millis(u64::from(ms)))
            .unwrap_or_else(|| self.engine.config().stagger_delay());

        Ok(self
            .engine
            .highlight_all_references(
                &values,
                self.canvases(),
                PageGeometry::new(page_height, scale),
                &self.engine.config().style,
                stagger,
            )
            .into())
    }

    /// Paint one reference immediately; returns the number of segments painted
    #[wasm_bindgen(js_name = highlightReference)]
    pub fn highlight_reference(
        &self,
        reference: JsValue,
        page_height: f64,
        scale: f64,
    ) -> Result<usize, JsValue> {
        let reference = SourceReference::classify(&json_value(&reference)?)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(self.engine.highlight_reference(
            &reference,
            self.canvases().as_ref(),
            PageGeometry::new(page_height, scale),
            &self.engine.config().style,
        ))
    }

    /// Place a removable marker over a page-space box inside `pageElement`
    #[wasm_bindgen(js_name = createHighlightOverlay)]
    pub fn create_highlight_overlay(
        &self,
        page_element: &Element,
        page: u32,
        bbox: JsValue,
        page_height: f64,
        scale: f64,
    ) -> Result<JsHighlightHandle, JsValue> {
        let bbox: BoundingBox = serde_wasm_bindgen::from_value(bbox)
            .map_err(|e| JsValue::from_str(&format!("Invalid bounding box: {}", e)))?;
        let host = DomOverlayHost::attach(&self.document, page_element, page)?;
        Ok(self
            .engine
            .create_highlight_overlay(
                &host,
                &bbox,
                PageGeometry::new(page_height, scale),
                &self.engine.config().style,
            )
            .into())
    }

    /// Wrap `[start, end)` of a single paragraph element
    #[wasm_bindgen(js_name = highlightTextRange)]
    pub fn highlight_text_range(
        &self,
        paragraph: Element,
        start: usize,
        end: usize,
        class: Option<String>,
    ) -> JsHighlightHandle {
        let class = self.mark_class(class);
        let paragraph = DomParagraph::new(self.document.clone(), paragraph);
        self.engine
            .highlight_text_range(&paragraph, start, end, &class)
            .into()
    }

    /// Wrap a document-level character range inside `container`
    #[wasm_bindgen(js_name = highlightDocumentRange)]
    pub fn highlight_document_range(
        &self,
        container: Element,
        start: usize,
        end: usize,
        class: Option<String>,
    ) -> JsHighlightHandle {
        let class = self.mark_class(class);
        self.engine
            .highlight_document_range(&self.container(container), start, end, &class)
            .into()
    }

    /// Highlight a document range that removes itself after `fadeMs`
    #[wasm_bindgen(js_name = highlightWithFade)]
    pub fn highlight_with_fade(
        &self,
        container: Element,
        start: usize,
        end: usize,
        fade_ms: Option<u32>,
        class: Option<String>,
    ) -> JsHighlightHandle {
        let class = self.mark_class(class);
        let fade = fade_ms.map(|ms| Duration::from_millis(u64::from(ms)));
        self.engine
            .highlight_with_fade(&self.container(container), start, end, &class, fade)
            .into()
    }

    /// Paragraph element holding a document offset
    #[wasm_bindgen(js_name = findElementAtOffset)]
    pub fn find_element_at_offset(&self, container: Element, offset: usize) -> Option<Element> {
        find_element_at_offset(&self.container(container), offset)
            .map(|found| found.block.element().clone())
    }

    /// First page of the first well-formed reference
    #[wasm_bindgen(js_name = getFirstPageNumber)]
    pub fn get_first_page_number(&self, references: JsValue) -> Result<Option<u32>, JsValue> {
        Ok(get_first_page_number(
            &self.parse_typed_references(&references)?,
        ))
    }

    #[wasm_bindgen(js_name = scrollToFirstReference)]
    pub fn scroll_to_first_reference(&self, references: JsValue) -> Result<Option<u32>, JsValue> {
        let references = self.parse_typed_references(&references)?;
        Ok(self
            .engine
            .scroll_to_first_reference(self.canvases().as_ref(), &references))
    }

    /// Scroll the paragraph holding `offset` into view; returns its index
    #[wasm_bindgen(js_name = scrollToOffset)]
    pub fn scroll_to_offset(&self, container: Element, offset: usize) -> Option<usize> {
        self.engine
            .scroll_to_offset(&self.container(container), offset)
    }

    /// Scroll to the first referenced page, then paint the batch
    ///
    /// Malformed entries keep their stagger slot, as in `highlightAllReferences`.
    #[wasm_bindgen(js_name = highlightAndScroll)]
    pub fn highlight_and_scroll(
        &self,
        references: JsValue,
        page_height: f64,
        scale: f64,
    ) -> Result<JsHighlightHandle, JsValue> {
        let indexed = self.parse_references(&references)?;
        let canvases = self.canvases();
        self.engine
            .scroll_to_first_reference(canvases.as_ref(), &without_positions(&indexed));
        Ok(self
            .engine
            .highlight_indexed_references(
                indexed,
                canvases,
                PageGeometry::new(page_height, scale),
                &self.engine.config().style,
                self.engine.config().stagger_delay(),
            )
            .into())
    }

    /// Replace the fading highlight tracked under `key`
    ///
    /// The previous highlight for the same key is removed first. Returns
    /// whether the new highlight was applied.
    #[wasm_bindgen(js_name = highlightRegion)]
    pub fn highlight_region(
        &mut self,
        key: String,
        container: Element,
        start: usize,
        end: usize,
        fade_ms: Option<u32>,
    ) -> bool {
        let engine = &self.engine;
        let container = DomContainer::new(self.document.clone(), container);
        let class = engine.config().style.mark_class.clone();
        let fade = fade_ms.map(|ms| Duration::from_millis(u64::from(ms)));

        self.regions
            .replace_with(key, || {
                engine.highlight_with_fade(&container, start, end, &class, fade)
            })
            .is_applied()
    }

    /// Remove the highlight tracked under `key`; false if there was none
    #[wasm_bindgen(js_name = clearRegion)]
    pub fn clear_region(&mut self, key: String) -> bool {
        self.regions.release(&key)
    }

    #[wasm_bindgen(js_name = clearAllRegions)]
    pub fn clear_all_regions(&mut self) {
        self.regions.release_all();
    }

    /// Number of tracked regions whose highlight is still applied
    #[wasm_bindgen(js_name = activeRegionCount)]
    pub fn active_region_count(&self) -> usize {
        self.regions.len()
    }
}
