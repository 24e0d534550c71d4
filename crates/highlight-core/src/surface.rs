//! Rendering targets the engine paints on
//!
//! The UI layer owns these and hands them to the engine per call. Rectangles
//! passed to a target are already in surface space.

use crate::config::HighlightStyle;
use shared_types::BoundingBox;

/// A rendered page whose pixels can be painted over
pub trait PageSurface {
    fn fill_rect(&self, rect: &BoundingBox, color: &str);

    fn stroke_rect(&self, rect: &BoundingBox, color: &str, line_width: f64);

    fn scroll_into_view(&self) {}
}

/// Finds the rendering surface for a 0-indexed page
pub trait SurfaceLookup {
    type Surface: PageSurface;

    fn surface(&self, page: u32) -> Option<Self::Surface>;
}

/// A removable marker element placed over a surface
pub trait OverlayMarker {
    fn set_opacity(&self, opacity: f64);

    fn remove(&self);
}

/// Creates positioned, non-interactive marker elements
///
/// When `style.animation_duration_ms` is non-zero the host is expected to
/// attach a matching opacity transition to the marker.
pub trait OverlayHost {
    type Marker: OverlayMarker + Clone + 'static;

    fn create_marker(&self, rect: &BoundingBox, style: &HighlightStyle) -> Option<Self::Marker>;
}

/// One paragraph of a plain-text document
///
/// Offsets and lengths count Unicode scalar values.
pub trait TextBlock {
    /// Serialized content captured before a highlight is applied
    type Snapshot: 'static;

    fn text_len(&self) -> usize;

    fn snapshot(&self) -> Self::Snapshot;

    fn restore(&self, snapshot: &Self::Snapshot);

    /// Wrap `[start, end)` of the text in a marked inline element
    ///
    /// Returns false if nothing was wrapped.
    fn wrap_range(&self, start: usize, end: usize, class: &str) -> bool;

    fn scroll_into_view(&self) {}
}

/// Ordered paragraphs of a plain-text document
pub trait TextContainer {
    type Block: TextBlock + Clone + 'static;

    fn blocks(&self) -> Vec<Self::Block>;
}
