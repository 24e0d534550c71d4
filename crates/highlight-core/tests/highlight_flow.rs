//! End-to-end highlight flows against in-memory surfaces and a virtual clock

use highlight_core::testing::{MemoryContainer, MemorySurfaces, PaintKind};
use highlight_core::{
    find_element_at_offset, BoundingBox, Diagnostic, HighlightEngine, HighlightState,
    HighlightStyle, PageGeometry, RecordingDiagnostics, RegionHighlights, RemovalCause,
    VirtualScheduler,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::rc::Rc;
use std::time::Duration;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

struct Fixture {
    engine: HighlightEngine,
    scheduler: Rc<VirtualScheduler>,
    diagnostics: Rc<RecordingDiagnostics>,
}

fn fixture() -> Fixture {
    let scheduler = Rc::new(VirtualScheduler::new());
    let diagnostics = Rc::new(RecordingDiagnostics::new());
    let engine = HighlightEngine::new(scheduler.clone()).with_diagnostics(diagnostics.clone());
    Fixture {
        engine,
        scheduler,
        diagnostics,
    }
}

fn single(page: u32, x: f64, y: f64) -> Value {
    json!({
        "text": "concept",
        "page": page,
        "coordinates": {"x": x, "y": y, "width": 100.0, "height": 12.0}
    })
}

// ============================================================
// Canvas batches
// ============================================================

#[test]
fn end_to_end_letter_page_transform() {
    let f = fixture();
    let surfaces = Rc::new(MemorySurfaces::with_pages(&[0]));
    let reference = json!({
        "text": "The mitochondria is the powerhouse of the cell",
        "page": 0,
        "coordinates": {"x": 72, "y": 720, "width": 400, "height": 24}
    });

    f.engine.highlight_all_references(
        &[reference],
        surfaces.clone(),
        PageGeometry::new(792.0, 1.5),
        &HighlightStyle::default(),
        ms(100),
    );
    f.scheduler.advance(ms(0));

    let calls = surfaces.calls();
    assert_eq!(calls.len(), 2);
    for call in &calls {
        assert_eq!(call.rect, BoundingBox::new(108.0, 72.0, 600.0, 36.0));
    }
}

#[test]
fn stagger_timing_for_three_references() {
    let f = fixture();
    let surfaces = Rc::new(MemorySurfaces::with_pages(&[0, 1, 2]));
    let references = vec![single(0, 10.0, 10.0), single(1, 20.0, 20.0), single(2, 30.0, 30.0)];

    f.engine.highlight_all_references(
        &references,
        surfaces.clone(),
        PageGeometry::new(792.0, 1.0),
        &HighlightStyle::default(),
        ms(100),
    );

    assert_eq!(surfaces.fill_count(), 0);
    f.scheduler.advance(ms(0));
    assert_eq!(surfaces.fill_count(), 1);
    f.scheduler.advance(ms(99));
    assert_eq!(surfaces.fill_count(), 1);
    f.scheduler.advance(ms(1));
    assert_eq!(surfaces.fill_count(), 2);
    f.scheduler.advance(ms(99));
    assert_eq!(surfaces.fills_on(2), 0, "third reference painted before 200ms");
    f.scheduler.advance(ms(1));
    assert_eq!(surfaces.fills_on(2), 1);
}

#[test]
fn cross_page_reference_paints_once_per_page() {
    let f = fixture();
    let surfaces = Rc::new(MemorySurfaces::with_pages(&[2, 3]));
    let reference = json!({
        "text": "a sentence broken across a page",
        "pages": [2, 3],
        "coordinates": [
            {"page": 2, "bbox": {"x": 72.0, "y": 40.0, "width": 400.0, "height": 12.0}},
            {"page": 3, "bbox": {"x": 72.0, "y": 760.0, "width": 180.0, "height": 12.0}}
        ]
    });

    f.engine.highlight_all_references(
        &[reference],
        surfaces.clone(),
        PageGeometry::new(792.0, 2.0),
        &HighlightStyle::default(),
        ms(100),
    );
    f.scheduler.run_until_idle();

    let fills: Vec<_> = surfaces
        .calls()
        .into_iter()
        .filter(|c| c.kind == PaintKind::Fill)
        .collect();
    assert_eq!(fills.len(), 2);
    assert_eq!(fills[0].page, 2);
    assert_eq!(fills[0].rect, BoundingBox::new(144.0, 1480.0, 800.0, 24.0));
    assert_eq!(fills[1].page, 3);
    assert_eq!(fills[1].rect, BoundingBox::new(144.0, 40.0, 360.0, 24.0));
}

#[test]
fn malformed_reference_is_skipped() {
    let f = fixture();
    let surfaces = Rc::new(MemorySurfaces::with_pages(&[0, 1]));
    let references = vec![
        single(0, 10.0, 10.0),
        json!({"text": "no page information", "coordinates": {"x": 1, "y": 1, "width": 1, "height": 1}}),
        single(1, 10.0, 10.0),
    ];

    f.engine.highlight_all_references(
        &references,
        surfaces.clone(),
        PageGeometry::new(792.0, 1.0),
        &HighlightStyle::default(),
        ms(50),
    );
    f.scheduler.run_until_idle();

    assert_eq!(surfaces.fill_count(), 2);
    let warnings = f.diagnostics.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        warnings[0],
        Diagnostic::MalformedReference { index: 1, .. }
    ));
    // The third reference keeps its slot in the schedule
    assert_eq!(f.scheduler.now(), ms(100));
}

#[test]
fn scroll_then_indexed_batch_keeps_stagger_slots() {
    let f = fixture();
    let surfaces = Rc::new(MemorySurfaces::with_pages(&[0, 2]));
    let references = vec![
        single(0, 10.0, 10.0),
        json!({"text": "no page information"}),
        single(2, 10.0, 10.0),
    ];

    let classified = f.engine.classify_references(&references);
    let typed: Vec<_> = classified.iter().map(|(_, r)| r.clone()).collect();
    assert_eq!(f.engine.scroll_to_first_reference(surfaces.as_ref(), &typed), Some(0));
    f.engine.highlight_indexed_references(
        classified,
        surfaces.clone(),
        PageGeometry::new(792.0, 1.0),
        &HighlightStyle::default(),
        ms(100),
    );

    f.scheduler.advance(ms(150));
    assert_eq!(surfaces.fills_on(2), 0, "third reference painted before 200ms");
    f.scheduler.advance(ms(50));
    assert_eq!(surfaces.fills_on(2), 1);
    assert_eq!(surfaces.scrolled(), vec![0]);
}

#[test]
fn missing_page_does_not_stop_siblings() {
    let f = fixture();
    let surfaces = Rc::new(MemorySurfaces::with_pages(&[3]));
    let reference = json!({
        "pages": [2, 3],
        "coordinates": [
            {"page": 2, "bbox": {"x": 0.0, "y": 0.0, "width": 10.0, "height": 10.0}},
            {"page": 3, "bbox": {"x": 0.0, "y": 0.0, "width": 10.0, "height": 10.0}}
        ]
    });

    f.engine.highlight_all_references(
        &[reference],
        surfaces.clone(),
        PageGeometry::new(792.0, 1.0),
        &HighlightStyle::default(),
        ms(0),
    );
    f.scheduler.run_until_idle();

    assert_eq!(surfaces.fills_on(3), 1);
    assert_eq!(
        f.diagnostics.warnings(),
        vec![Diagnostic::MissingSurface { page: 2 }]
    );
}

#[test]
fn batch_handle_cancels_pending_references() {
    let f = fixture();
    let surfaces = Rc::new(MemorySurfaces::with_pages(&[0, 1, 2]));
    let references = vec![single(0, 0.0, 0.0), single(1, 0.0, 0.0), single(2, 0.0, 0.0)];

    let handle = f.engine.highlight_all_references(
        &references,
        surfaces.clone(),
        PageGeometry::new(792.0, 1.0),
        &HighlightStyle::default(),
        ms(100),
    );
    f.scheduler.advance(ms(150));
    handle.release();
    handle.release();
    f.scheduler.advance(ms(1000));

    assert_eq!(surfaces.fill_count(), 2);
    assert_eq!(f.scheduler.pending(), 0);
}

#[test]
fn empty_batch_returns_inert_handle() {
    let f = fixture();
    let surfaces = Rc::new(MemorySurfaces::with_pages(&[0]));
    let handle = f.engine.highlight_all_references(
        &[],
        surfaces,
        PageGeometry::new(792.0, 1.0),
        &HighlightStyle::default(),
        ms(100),
    );
    assert_eq!(handle.state(), HighlightState::Unapplied);
}

// ============================================================
// Text highlighting
// ============================================================

#[test]
fn fade_cancelled_early() {
    let f = fixture();
    let container = MemoryContainer::from_texts(&["Enzymes lower activation energy."]);

    let handle = f
        .engine
        .highlight_with_fade(&container, 0, 7, "hl", Some(ms(2000)));
    assert_eq!(
        container.block(0).render(),
        r#"<mark class="hl">Enzymes</mark> lower activation energy."#
    );

    f.scheduler.advance(ms(500));
    handle.release();
    assert_eq!(container.block(0).render(), "Enzymes lower activation energy.");
    assert_eq!(
        handle.state(),
        HighlightState::Removed(RemovalCause::Released)
    );

    // Re-highlight after the early release; the old timer must not clear it
    let second = f.engine.highlight_document_range(&container, 8, 13, "hl");
    f.scheduler.advance(ms(1500));
    assert!(second.is_applied());
    assert_eq!(
        container.block(0).render(),
        r#"Enzymes <mark class="hl">lower</mark> activation energy."#
    );
    assert_eq!(f.scheduler.pending(), 0);
}

#[test]
fn region_tracking_replaces_fading_highlight() {
    let f = fixture();
    let container = MemoryContainer::from_texts(&["alpha beta gamma"]);
    let mut regions = RegionHighlights::new();

    regions.replace_with("node-1", || {
        f.engine
            .highlight_with_fade(&container, 0, 5, "hl", Some(ms(2000)))
    });
    f.scheduler.advance(ms(300));
    regions.replace_with("node-1", || {
        f.engine
            .highlight_with_fade(&container, 6, 10, "hl", Some(ms(2000)))
    });

    assert_eq!(
        container.block(0).render(),
        r#"alpha <mark class="hl">beta</mark> gamma"#
    );
    f.scheduler.advance(ms(1800));
    assert_eq!(
        container.block(0).render(),
        r#"alpha <mark class="hl">beta</mark> gamma"#
    );
    f.scheduler.advance(ms(200));
    assert_eq!(container.block(0).render(), "alpha beta gamma");
    assert!(regions.is_empty());
}

#[test]
fn scroll_then_highlight_offset() {
    let f = fixture();
    let container = MemoryContainer::from_texts(&["First paragraph. ", "Second paragraph."]);

    assert_eq!(f.engine.scroll_to_offset(&container, 20), Some(1));
    let handle = f.engine.highlight_document_range(&container, 17, 23, "hl");
    assert_eq!(
        container.block(1).render(),
        r#"<mark class="hl">Second</mark> paragraph."#
    );
    handle.release();
    assert_eq!(container.text(), "First paragraph. Second paragraph.");
}

// ============================================================
// Properties
// ============================================================

fn paragraph_lengths() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..40, 1..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: the matched paragraph's span reaches the offset, and no
    /// earlier paragraph's span does
    #[test]
    fn offset_resolution_picks_first_reaching_paragraph(
        lens in paragraph_lengths(),
        offset in 0usize..300,
    ) {
        let texts: Vec<String> = lens.iter().map(|&n| "y".repeat(n)).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let container = MemoryContainer::from_texts(&refs);
        let total: usize = lens.iter().sum();

        let found = find_element_at_offset(&container, offset).unwrap();
        if offset > total {
            prop_assert_eq!(found.index, lens.len() - 1);
        } else {
            prop_assert!(found.offset_before + found.len >= offset);
            let before: usize = lens[..found.index].iter().sum();
            prop_assert_eq!(before, found.offset_before);
            if found.index > 0 {
                prop_assert!(before < offset);
            }
        }
    }

    /// Property: releasing a text highlight twice leaves the original text
    #[test]
    fn release_is_idempotent(
        text in "[a-z ]{1,40}",
        a in 0usize..40,
        b in 0usize..40,
    ) {
        let f = fixture();
        let container = MemoryContainer::from_texts(&[text.as_str()]);
        let handle = f.engine.highlight_document_range(&container, a.min(b), a.max(b), "hl");
        handle.release();
        let once = container.block(0).render();
        handle.release();
        prop_assert_eq!(&once, &container.block(0).render());
        prop_assert_eq!(once, text);
    }
}
