//! Highlight overlay management
//!
//! Three modes, each named for what it does to the target:
//!
//! - **Canvas** (`highlight_on_canvas`, `highlight_text_region`) paints
//!   directly into a surface's pixels. It is destructive: there is no handle,
//!   and only a repaint of the page removes the highlight.
//! - **Overlay** (`create_highlight_overlay`) places a positioned marker
//!   element over the surface. Removing the marker is the cleanup.
//! - **Text wrap** (`highlight_text_range`, `highlight_with_fade`) wraps a
//!   substring of a paragraph in a marked inline element. Cleanup restores the
//!   paragraph's content from a snapshot taken just before wrapping.
//!
//! Snapshot restore means only the most recent highlight on a paragraph can be
//! cleaned up correctly. Callers release the previous handle before
//! highlighting the same paragraph again, or go through
//! [`crate::RegionHighlights`].

use crate::config::HighlightStyle;
use crate::coords::PageGeometry;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::engine::HighlightEngine;
use crate::handle::HighlightHandle;
use crate::surface::{OverlayHost, OverlayMarker, PageSurface, SurfaceLookup, TextBlock, TextContainer};
use shared_types::{BoundingBox, PageSegment};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Transform one segment and paint it onto its page's surface
///
/// Returns false, after reporting why, if the segment could not be painted.
pub(crate) fn paint_segment<L: SurfaceLookup + ?Sized>(
    lookup: &L,
    segment: &PageSegment,
    geometry: PageGeometry,
    style: &HighlightStyle,
    diagnostics: &dyn Diagnostics,
) -> bool {
    let Some(surface) = lookup.surface(segment.page) else {
        diagnostics.report(Diagnostic::MissingSurface { page: segment.page });
        return false;
    };
    paint_box(&surface, segment.page, &segment.bbox, geometry, style, diagnostics)
}

fn paint_box<P: PageSurface>(
    surface: &P,
    page: u32,
    bbox: &BoundingBox,
    geometry: PageGeometry,
    style: &HighlightStyle,
    diagnostics: &dyn Diagnostics,
) -> bool {
    let rect = match geometry.to_surface(bbox) {
        Ok(rect) => rect,
        Err(e) => {
            diagnostics.report(Diagnostic::InvalidGeometry {
                page: Some(page),
                reason: e.to_string(),
            });
            return false;
        }
    };

    debug_assert!(rect.is_finite(), "validated geometry produced {:?}", rect);
    surface.fill_rect(&rect, &style.fill_color);
    surface.stroke_rect(&rect, &style.stroke_color, style.stroke_width);
    tracing::debug!(page, x = rect.x, y = rect.y, "Painted highlight region");
    true
}

impl HighlightEngine {
    /// Paint a page-space box straight onto a surface
    ///
    /// Destructive: the pixels are overwritten and no handle is returned.
    /// Returns whether anything was painted.
    pub fn highlight_on_canvas<P: PageSurface>(
        &self,
        surface: &P,
        page: u32,
        bbox: &BoundingBox,
        geometry: PageGeometry,
        style: &HighlightStyle,
    ) -> bool {
        paint_box(surface, page, bbox, geometry, style, self.diagnostics.as_ref())
    }

    /// Look up the page's surface and paint a region onto it
    ///
    /// Destructive, like [`HighlightEngine::highlight_on_canvas`].
    pub fn highlight_text_region<L: SurfaceLookup + ?Sized>(
        &self,
        lookup: &L,
        segment: &PageSegment,
        geometry: PageGeometry,
        style: &HighlightStyle,
    ) -> bool {
        paint_segment(lookup, segment, geometry, style, self.diagnostics.as_ref())
    }

    /// Place a removable marker over a page-space box
    ///
    /// With a non-zero `animation_duration_ms` the marker starts transparent
    /// and is raised to full opacity on the next tick.
    pub fn create_highlight_overlay<H: OverlayHost>(
        &self,
        host: &H,
        bbox: &BoundingBox,
        geometry: PageGeometry,
        style: &HighlightStyle,
    ) -> HighlightHandle {
        let rect = match geometry.to_surface(bbox) {
            Ok(rect) => rect,
            Err(e) => {
                self.report(Diagnostic::InvalidGeometry {
                    page: None,
                    reason: e.to_string(),
                });
                return HighlightHandle::inert();
            }
        };

        let Some(marker) = host.create_marker(&rect, style) else {
            self.report(Diagnostic::OverlayUnavailable);
            return HighlightHandle::inert();
        };

        let fade_in = if style.animation_duration_ms > 0 {
            marker.set_opacity(0.0);
            let target = marker.clone();
            Some(
                self.scheduler
                    .schedule(Duration::ZERO, Box::new(move || target.set_opacity(1.0))),
            )
        } else {
            None
        };

        let scheduler = self.scheduler.clone();
        HighlightHandle::new(move || {
            if let Some(id) = fade_in {
                scheduler.cancel(id);
            }
            marker.remove();
            tracing::debug!("Removed highlight overlay");
        })
    }

    /// Wrap `[start, end)` of one paragraph in a marked element
    ///
    /// Requires `start < end <= block.text_len()`; anything else applies
    /// nothing and returns an inert handle.
    pub fn highlight_text_range<B: TextBlock + Clone + 'static>(
        &self,
        block: &B,
        start: usize,
        end: usize,
        class: &str,
    ) -> HighlightHandle {
        let len = block.text_len();
        if start >= end || end > len {
            self.report(Diagnostic::InvalidRange { start, end, len });
            return HighlightHandle::inert();
        }

        let snapshot = block.snapshot();
        if !block.wrap_range(start, end, class) {
            block.restore(&snapshot);
            self.report(Diagnostic::InvalidRange { start, end, len });
            return HighlightHandle::inert();
        }
        tracing::debug!(start, end, "Applied text highlight");

        let block = block.clone();
        HighlightHandle::new(move || {
            block.restore(&snapshot);
            tracing::debug!(start, end, "Restored highlighted paragraph");
        })
    }

    /// Highlight a document range and remove it automatically after `fade`
    ///
    /// `None` uses the configured fade duration. Releasing the returned handle
    /// early removes the highlight immediately and cancels the timer.
    pub fn highlight_with_fade<C: TextContainer + ?Sized>(
        &self,
        container: &C,
        start_offset: usize,
        end_offset: usize,
        class: &str,
        fade: Option<Duration>,
    ) -> HighlightHandle {
        let inner = self.highlight_document_range(container, start_offset, end_offset, class);
        if !inner.is_applied() {
            return inner;
        }

        let timer = Rc::new(Cell::new(None));
        let scheduler = self.scheduler.clone();
        let pending = timer.clone();
        let handle = HighlightHandle::new(move || {
            if let Some(id) = pending.take() {
                scheduler.cancel(id);
            }
            inner.release();
        });

        let fade = fade.unwrap_or_else(|| self.config.fade_duration());
        let expiring = handle.clone();
        let id = self.scheduler.schedule(
            fade,
            Box::new(move || {
                tracing::debug!("Fade timer expired");
                expiring.expire();
            }),
        );
        timer.set(Some(id));
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingDiagnostics;
    use crate::handle::{HighlightState, RemovalCause};
    use crate::scheduler::VirtualScheduler;
    use crate::testing::{MemoryContainer, MemoryOverlayHost, MemoryParagraph, MemorySurfaces, PaintKind};
    use pretty_assertions::assert_eq;

    fn engine() -> (HighlightEngine, Rc<VirtualScheduler>, Rc<RecordingDiagnostics>) {
        let scheduler = Rc::new(VirtualScheduler::new());
        let diagnostics = Rc::new(RecordingDiagnostics::new());
        let engine =
            HighlightEngine::new(scheduler.clone()).with_diagnostics(diagnostics.clone());
        (engine, scheduler, diagnostics)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_canvas_paints_fill_then_stroke() {
        let (engine, _, _) = engine();
        let surfaces = MemorySurfaces::with_pages(&[0]);
        let style = HighlightStyle::default();
        let segment = PageSegment::new(0, BoundingBox::new(72.0, 720.0, 400.0, 24.0));

        assert!(engine.highlight_text_region(
            &surfaces,
            &segment,
            PageGeometry::new(792.0, 1.5),
            &style
        ));

        let calls = surfaces.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].kind, PaintKind::Fill);
        assert_eq!(calls[0].color, style.fill_color);
        assert_eq!(calls[1].kind, PaintKind::Stroke { line_width: 2.0 });
        assert_eq!(calls[1].rect, BoundingBox::new(108.0, 72.0, 600.0, 36.0));
    }

    #[test]
    fn test_canvas_missing_surface() {
        let (engine, _, diagnostics) = engine();
        let surfaces = MemorySurfaces::with_pages(&[0]);
        let segment = PageSegment::new(4, BoundingBox::new(0.0, 0.0, 1.0, 1.0));

        assert!(!engine.highlight_text_region(
            &surfaces,
            &segment,
            PageGeometry::new(792.0, 1.0),
            &HighlightStyle::default()
        ));
        assert_eq!(diagnostics.warnings(), vec![Diagnostic::MissingSurface { page: 4 }]);
    }

    #[test]
    fn test_overlay_created_and_removed() {
        let (engine, _, _) = engine();
        let host = MemoryOverlayHost::new();
        let handle = engine.create_highlight_overlay(
            &host,
            &BoundingBox::new(72.0, 720.0, 400.0, 24.0),
            PageGeometry::new(792.0, 1.5),
            &HighlightStyle::default(),
        );

        let markers = host.markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].rect(), BoundingBox::new(108.0, 72.0, 600.0, 36.0));
        assert_eq!(markers[0].opacity(), 1.0);

        handle.release();
        handle.release();
        assert_eq!(markers[0].removals(), 1);
    }

    #[test]
    fn test_overlay_fades_in() {
        let (engine, scheduler, _) = engine();
        let host = MemoryOverlayHost::new();
        let style = HighlightStyle {
            animation_duration_ms: 300,
            ..HighlightStyle::default()
        };
        let _handle = engine.create_highlight_overlay(
            &host,
            &BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            PageGeometry::new(100.0, 1.0),
            &style,
        );

        let marker = &host.markers()[0];
        assert_eq!(marker.opacity(), 0.0);
        scheduler.advance(ms(0));
        assert_eq!(marker.opacity(), 1.0);
    }

    #[test]
    fn test_overlay_release_before_fade_in() {
        let (engine, scheduler, _) = engine();
        let host = MemoryOverlayHost::new();
        let style = HighlightStyle {
            animation_duration_ms: 300,
            ..HighlightStyle::default()
        };
        let handle = engine.create_highlight_overlay(
            &host,
            &BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            PageGeometry::new(100.0, 1.0),
            &style,
        );
        handle.release();
        assert_eq!(scheduler.pending(), 0);
        scheduler.advance(ms(10));
        assert_eq!(host.markers()[0].opacity(), 0.0);
    }

    #[test]
    fn test_overlay_rejects_bad_scale() {
        let (engine, _, diagnostics) = engine();
        let host = MemoryOverlayHost::new();
        let handle = engine.create_highlight_overlay(
            &host,
            &BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            PageGeometry::new(100.0, 0.0),
            &HighlightStyle::default(),
        );
        assert_eq!(handle.state(), HighlightState::Unapplied);
        assert!(host.markers().is_empty());
        assert_eq!(diagnostics.warnings().len(), 1);
    }

    #[test]
    fn test_text_range_wraps_and_restores() {
        let (engine, _, _) = engine();
        let paragraph = MemoryParagraph::new("The quick brown fox");
        let handle = engine.highlight_text_range(&paragraph, 4, 9, "hl");

        assert_eq!(paragraph.render(), r#"The <mark class="hl">quick</mark> brown fox"#);
        handle.release();
        assert_eq!(paragraph.render(), "The quick brown fox");
        handle.release();
        assert_eq!(paragraph.render(), "The quick brown fox");
    }

    #[test]
    fn test_text_range_rejects_bad_bounds() {
        let (engine, _, diagnostics) = engine();
        let paragraph = MemoryParagraph::new("short");
        for (start, end) in [(3, 3), (4, 2), (0, 6)] {
            let handle = engine.highlight_text_range(&paragraph, start, end, "hl");
            assert_eq!(handle.state(), HighlightState::Unapplied);
        }
        assert_eq!(paragraph.render(), "short");
        assert_eq!(diagnostics.entries().len(), 3);
        assert!(diagnostics.warnings().is_empty());
    }

    #[test]
    fn test_fade_expires() {
        let (engine, scheduler, _) = engine();
        let container = MemoryContainer::from_texts(&["abcdefghij"]);
        let handle = engine.highlight_with_fade(&container, 2, 5, "hl", Some(ms(2000)));

        assert_eq!(container.block(0).render(), r#"ab<mark class="hl">cde</mark>fghij"#);
        scheduler.advance(ms(1999));
        assert!(handle.is_applied());
        scheduler.advance(ms(1));
        assert_eq!(container.block(0).render(), "abcdefghij");
        assert_eq!(handle.state(), HighlightState::Removed(RemovalCause::Expired));

        handle.release();
        assert_eq!(handle.state(), HighlightState::Removed(RemovalCause::Expired));
    }

    #[test]
    fn test_fade_uses_configured_default() {
        let (engine, scheduler, _) = engine();
        let container = MemoryContainer::from_texts(&["abcdefghij"]);
        let handle = engine.highlight_with_fade(&container, 0, 3, "hl", None);
        scheduler.advance(engine.config().fade_duration());
        assert!(!handle.is_applied());
    }

    #[test]
    fn test_fade_on_invalid_range_schedules_nothing() {
        let (engine, scheduler, _) = engine();
        let container = MemoryContainer::from_texts(&["abc"]);
        let handle = engine.highlight_with_fade(&container, 5, 2, "hl", None);
        assert_eq!(handle.state(), HighlightState::Unapplied);
        assert_eq!(scheduler.pending(), 0);
    }
}
