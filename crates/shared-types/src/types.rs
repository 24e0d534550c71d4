//! Reference payloads produced by the graph-generation service.
//!
//! Page geometry is expressed in page coordinate space: origin at the
//! bottom-left of the page, Y increasing upward, unscaled units (PDF points).

use serde::{Deserialize, Serialize};

/// Axis-aligned box in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64, // Bottom edge, measured from the bottom of the page
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when all four fields are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// A highlight confined to a single page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReference {
    #[serde(default)]
    pub text: String,
    pub page: u32,
    pub coordinates: BoundingBox,
}

/// One page-sized piece of a reference that crosses a page boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSegment {
    pub page: u32,
    pub bbox: BoundingBox,
}

/// A highlight whose source text spans more than one page
///
/// Segments are stored in reading order, one per page touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossPageReference {
    #[serde(default)]
    pub text: String,
    pub pages: Vec<u32>,
    pub coordinates: Vec<PageSegment>,
}

/// Character span inside a plain-text document
///
/// Offsets count Unicode scalar values over the concatenation of every
/// paragraph's text, with no separators between paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRange {
    pub start_offset: usize,
    pub end_offset: usize,
}

impl CharacterRange {
    /// Build a range, returning `None` unless `start < end`
    pub fn new(start_offset: usize, end_offset: usize) -> Option<Self> {
        (start_offset < end_offset).then_some(Self {
            start_offset,
            end_offset,
        })
    }

    pub fn len(&self) -> usize {
        self.end_offset.saturating_sub(self.start_offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
