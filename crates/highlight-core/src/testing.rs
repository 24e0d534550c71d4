//! In-memory rendering targets for tests and headless hosts

use crate::config::HighlightStyle;
use crate::surface::{OverlayHost, OverlayMarker, PageSurface, SurfaceLookup, TextBlock, TextContainer};
use shared_types::BoundingBox;
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaintKind {
    Fill,
    Stroke { line_width: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaintCall {
    pub page: u32,
    pub kind: PaintKind,
    pub rect: BoundingBox,
    pub color: String,
}

/// Page surfaces that record what was painted on them
#[derive(Debug, Default)]
pub struct MemorySurfaces {
    pages: BTreeSet<u32>,
    calls: Rc<RefCell<Vec<PaintCall>>>,
    scrolled: Rc<RefCell<Vec<u32>>>,
}

impl MemorySurfaces {
    pub fn with_pages(pages: &[u32]) -> Self {
        Self {
            pages: pages.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<PaintCall> {
        self.calls.borrow().clone()
    }

    /// Number of filled regions on one page
    pub fn fills_on(&self, page: u32) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.page == page && c.kind == PaintKind::Fill)
            .count()
    }

    /// Number of filled regions across all pages
    pub fn fill_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.kind == PaintKind::Fill)
            .count()
    }

    pub fn scrolled(&self) -> Vec<u32> {
        self.scrolled.borrow().clone()
    }
}

#[derive(Debug, Clone)]
pub struct MemorySurface {
    page: u32,
    calls: Rc<RefCell<Vec<PaintCall>>>,
    scrolled: Rc<RefCell<Vec<u32>>>,
}

impl PageSurface for MemorySurface {
    fn fill_rect(&self, rect: &BoundingBox, color: &str) {
        self.calls.borrow_mut().push(PaintCall {
            page: self.page,
            kind: PaintKind::Fill,
            rect: *rect,
            color: color.to_string(),
        });
    }

    fn stroke_rect(&self, rect: &BoundingBox, color: &str, line_width: f64) {
        self.calls.borrow_mut().push(PaintCall {
            page: self.page,
            kind: PaintKind::Stroke { line_width },
            rect: *rect,
            color: color.to_string(),
        });
    }

    fn scroll_into_view(&self) {
        self.scrolled.borrow_mut().push(self.page);
    }
}

impl SurfaceLookup for MemorySurfaces {
    type Surface = MemorySurface;

    fn surface(&self, page: u32) -> Option<MemorySurface> {
        self.pages.contains(&page).then(|| MemorySurface {
            page,
            calls: self.calls.clone(),
            scrolled: self.scrolled.clone(),
        })
    }
}

#[derive(Debug)]
struct MarkerState {
    rect: BoundingBox,
    opacity: f64,
    removals: usize,
}

/// Overlay marker backed by shared state
#[derive(Debug, Clone)]
pub struct MemoryMarker {
    state: Rc<RefCell<MarkerState>>,
}

impl MemoryMarker {
    pub fn rect(&self) -> BoundingBox {
        self.state.borrow().rect
    }

    pub fn opacity(&self) -> f64 {
        self.state.borrow().opacity
    }

    pub fn removals(&self) -> usize {
        self.state.borrow().removals
    }

    pub fn is_attached(&self) -> bool {
        self.removals() == 0
    }
}

impl OverlayMarker for MemoryMarker {
    fn set_opacity(&self, opacity: f64) {
        self.state.borrow_mut().opacity = opacity;
    }

    fn remove(&self) {
        self.state.borrow_mut().removals += 1;
    }
}

#[derive(Debug, Default)]
pub struct MemoryOverlayHost {
    markers: RefCell<Vec<MemoryMarker>>,
}

impl MemoryOverlayHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> Vec<MemoryMarker> {
        self.markers.borrow().clone()
    }
}

impl OverlayHost for MemoryOverlayHost {
    type Marker = MemoryMarker;

    fn create_marker(&self, rect: &BoundingBox, _style: &HighlightStyle) -> Option<MemoryMarker> {
        let marker = MemoryMarker {
            state: Rc::new(RefCell::new(MarkerState {
                rect: *rect,
                opacity: 1.0,
                removals: 0,
            })),
        };
        self.markers.borrow_mut().push(marker.clone());
        Some(marker)
    }
}

/// Inline content of a paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Run {
    Text(String),
    Mark { class: String, text: String },
}

impl Run {
    fn text(&self) -> &str {
        match self {
            Run::Text(text) | Run::Mark { text, .. } => text,
        }
    }
}

/// Paragraph held as a list of text and mark runs
#[derive(Debug, Clone)]
pub struct MemoryParagraph {
    runs: Rc<RefCell<Vec<Run>>>,
    scrolled: Rc<Cell<bool>>,
}

impl MemoryParagraph {
    pub fn new(text: &str) -> Self {
        let runs = if text.is_empty() {
            Vec::new()
        } else {
            vec![Run::Text(text.to_string())]
        };
        Self {
            runs: Rc::new(RefCell::new(runs)),
            scrolled: Rc::new(Cell::new(false)),
        }
    }

    pub fn text(&self) -> String {
        self.runs.borrow().iter().map(Run::text).collect()
    }

    /// Serialize the runs as HTML-like markup
    pub fn render(&self) -> String {
        self.runs
            .borrow()
            .iter()
            .map(|run| match run {
                Run::Text(text) => text.clone(),
                Run::Mark { class, text } => format!(r#"<mark class="{}">{}</mark>"#, class, text),
            })
            .collect()
    }

    pub fn was_scrolled(&self) -> bool {
        self.scrolled.get()
    }
}

fn split_chars(text: &str, at: usize) -> (String, String) {
    let byte = text.char_indices().nth(at).map_or(text.len(), |(i, _)| i);
    (text[..byte].to_string(), text[byte..].to_string())
}

impl TextBlock for MemoryParagraph {
    type Snapshot = Vec<Run>;

    fn text_len(&self) -> usize {
        self.runs.borrow().iter().map(|r| r.text().chars().count()).sum()
    }

    fn snapshot(&self) -> Vec<Run> {
        self.runs.borrow().clone()
    }

    fn restore(&self, snapshot: &Vec<Run>) {
        *self.runs.borrow_mut() = snapshot.clone();
    }

    fn wrap_range(&self, start: usize, end: usize, class: &str) -> bool {
        let mut wrapped = false;
        let mut position = 0;
        let mut next = Vec::new();

        for run in self.runs.borrow().iter() {
            let len = run.text().chars().count();
            let (run_start, run_end) = (position, position + len);
            position = run_end;

            let Run::Text(text) = run else {
                next.push(run.clone());
                continue;
            };
            if run_end <= start || run_start >= end {
                next.push(run.clone());
                continue;
            }

            let local_start = start.saturating_sub(run_start);
            let local_end = end.min(run_end) - run_start;
            let (before, rest) = split_chars(text, local_start);
            let (middle, after) = split_chars(&rest, local_end - local_start);
            if !before.is_empty() {
                next.push(Run::Text(before));
            }
            next.push(Run::Mark {
                class: class.to_string(),
                text: middle,
            });
            if !after.is_empty() {
                next.push(Run::Text(after));
            }
            wrapped = true;
        }

        if wrapped {
            *self.runs.borrow_mut() = next;
        }
        wrapped
    }

    fn scroll_into_view(&self) {
        self.scrolled.set(true);
    }
}

/// Ordered paragraphs of a plain-text document
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    blocks: Vec<MemoryParagraph>,
}

impl MemoryContainer {
    pub fn from_texts(texts: &[&str]) -> Self {
        Self {
            blocks: texts.iter().map(|t| MemoryParagraph::new(t)).collect(),
        }
    }

    pub fn block(&self, index: usize) -> &MemoryParagraph {
        &self.blocks[index]
    }

    pub fn text(&self) -> String {
        self.blocks.iter().map(MemoryParagraph::text).collect()
    }
}

impl TextContainer for MemoryContainer {
    type Block = MemoryParagraph;

    fn blocks(&self) -> Vec<MemoryParagraph> {
        self.blocks.clone()
    }
}
