//! Reference resolution
//!
//! Decides which surfaces a reference touches and drives painting, and maps
//! character offsets in a plain-text document onto its paragraphs.

use crate::config::HighlightStyle;
use crate::coords::PageGeometry;
use crate::diagnostics::Diagnostic;
use crate::engine::HighlightEngine;
use crate::handle::HighlightHandle;
use crate::overlay::paint_segment;
use crate::surface::{SurfaceLookup, TextBlock, TextContainer};
use serde_json::Value;
use shared_types::{CharacterRange, SourceReference};
use std::rc::Rc;
use std::time::Duration;

/// A paragraph located by character offset
#[derive(Debug, Clone)]
pub struct BlockMatch<B> {
    /// Position of the paragraph in the container
    pub index: usize,
    pub block: B,
    /// Total length of all paragraphs before this one
    pub offset_before: usize,
    pub len: usize,
}

impl<B> BlockMatch<B> {
    /// Convert a document offset to an offset inside this paragraph
    pub fn local_offset(&self, offset: usize) -> usize {
        offset.saturating_sub(self.offset_before)
    }
}

/// First page touched by the first reference, if any
pub fn get_first_page_number(references: &[SourceReference]) -> Option<u32> {
    references.first().and_then(SourceReference::first_page)
}

/// Find the paragraph whose cumulative end length first reaches `offset`
///
/// A boundary offset belongs to the paragraph it ends. Offsets past the end of
/// the document resolve to the last paragraph; an empty container gives `None`.
pub fn find_element_at_offset<C: TextContainer + ?Sized>(
    container: &C,
    offset: usize,
) -> Option<BlockMatch<C::Block>> {
    let blocks = container.blocks();
    let mut consumed = 0;
    let mut last = None;

    for (index, block) in blocks.into_iter().enumerate() {
        let len = block.text_len();
        let found = BlockMatch {
            index,
            block,
            offset_before: consumed,
            len,
        };
        if consumed + len >= offset {
            return Some(found);
        }
        consumed += len;
        last = Some(found);
    }

    last
}

/// Find the paragraph holding the character at `offset`
///
/// Unlike [`find_element_at_offset`] this is half-open: an offset equal to a
/// paragraph's cumulative end belongs to the next paragraph, and offsets past
/// the end of the document match nothing.
pub(crate) fn find_block_containing<C: TextContainer + ?Sized>(
    container: &C,
    offset: usize,
) -> Option<BlockMatch<C::Block>> {
    let mut consumed = 0;
    for (index, block) in container.blocks().into_iter().enumerate() {
        let len = block.text_len();
        if offset < consumed + len {
            return Some(BlockMatch {
                index,
                block,
                offset_before: consumed,
                len,
            });
        }
        consumed += len;
    }
    None
}

impl HighlightEngine {
    /// Classify untyped payloads, reporting and dropping malformed ones
    ///
    /// Each surviving reference keeps its position in the original batch.
    pub fn classify_references(&self, references: &[Value]) -> Vec<(usize, SourceReference)> {
        references
            .iter()
            .enumerate()
            .filter_map(|(index, value)| match SourceReference::classify(value) {
                Ok(reference) => Some((index, reference)),
                Err(e) => {
                    self.report(Diagnostic::MalformedReference {
                        index,
                        reason: e.to_string(),
                    });
                    None
                }
            })
            .collect()
    }

    /// Paint every segment of one reference immediately
    ///
    /// Returns the number of segments painted. A missing surface skips only
    /// that segment.
    pub fn highlight_reference<L: SurfaceLookup + ?Sized>(
        &self,
        reference: &SourceReference,
        lookup: &L,
        geometry: PageGeometry,
        style: &HighlightStyle,
    ) -> usize {
        reference
            .segments()
            .iter()
            .filter(|segment| {
                paint_segment(lookup, segment, geometry, style, self.diagnostics.as_ref())
            })
            .count()
    }

    /// Paint a batch of references, one every `stagger_delay`
    ///
    /// The reference at batch position N is painted no earlier than
    /// `N * stagger_delay` after this call. Malformed entries are reported
    /// and skipped without shifting the schedule of the others. Surfaces
    /// must already be rendered when the tasks fire.
    ///
    /// The returned handle cancels tasks that have not fired yet. Pixels that
    /// were already painted stay painted.
    pub fn highlight_all_references<L: SurfaceLookup + 'static>(
        &self,
        references: &[Value],
        lookup: Rc<L>,
        geometry: PageGeometry,
        style: &HighlightStyle,
        stagger_delay: Duration,
    ) -> HighlightHandle {
        let classified = self.classify_references(references);
        self.highlight_indexed_references(
            classified,
            lookup,
            geometry,
            style,
            stagger_delay,
        )
    }

    /// Typed counterpart of [`HighlightEngine::highlight_all_references`]
    pub fn highlight_typed_references<L: SurfaceLookup + 'static>(
        &self,
        references: &[SourceReference],
        lookup: Rc<L>,
        geometry: PageGeometry,
        style: &HighlightStyle,
        stagger_delay: Duration,
    ) -> HighlightHandle {
        let indexed = references.iter().cloned().enumerate().collect();
        self.highlight_indexed_references(
            indexed,
            lookup,
            geometry,
            style,
            stagger_delay,
        )
    }

    /// Paint references already paired with their batch positions
    ///
    /// Each reference is delayed by its paired position rather than its place
    /// in `references`, so entries dropped by [`HighlightEngine::classify_references`]
    /// leave their slot empty instead of pulling later references forward.
    pub fn highlight_indexed_references<L: SurfaceLookup + 'static>(
        &self,
        references: Vec<(usize, SourceReference)>,
        lookup: Rc<L>,
        geometry: PageGeometry,
        style: &HighlightStyle,
        stagger_delay: Duration,
    ) -> HighlightHandle {
        if references.is_empty() {
            return HighlightHandle::inert();
        }
        tracing::debug!(count = references.len(), "Scheduling reference highlights");

        let mut timers = Vec::with_capacity(references.len());
        for (index, reference) in references {
            let lookup = lookup.clone();
            let style = style.clone();
            let diagnostics = self.diagnostics.clone();
            let delay = stagger_delay.saturating_mul(index as u32);

            let id = self.scheduler.schedule(
                delay,
                Box::new(move || {
                    for segment in reference.segments() {
                        paint_segment(
                            lookup.as_ref(),
                            &segment,
                            geometry,
                            &style,
                            diagnostics.as_ref(),
                        );
                    }
                }),
            );
            timers.push(id);
        }

        let scheduler = self.scheduler.clone();
        HighlightHandle::new(move || {
            for id in timers {
                scheduler.cancel(id);
            }
        })
    }

    /// Wrap a document-level character range in a marked element
    ///
    /// The range is mapped onto the paragraph holding `start_offset` and
    /// clipped to that paragraph's end. Invalid ranges, empty containers, and
    /// offsets past the end of the text all return an inert handle.
    pub fn highlight_document_range<C: TextContainer + ?Sized>(
        &self,
        container: &C,
        start_offset: usize,
        end_offset: usize,
        class: &str,
    ) -> HighlightHandle {
        if start_offset >= end_offset {
            self.report(Diagnostic::InvalidRange {
                start: start_offset,
                end: end_offset,
                len: 0,
            });
            return HighlightHandle::inert();
        }

        // Half-open lookup: a start on a paragraph boundary belongs to the
        // paragraph that begins there, unlike `find_element_at_offset`
        let Some(found) = find_block_containing(container, start_offset) else {
            if container.blocks().is_empty() {
                self.report(Diagnostic::EmptyContainer);
            } else {
                self.report(Diagnostic::InvalidRange {
                    start: start_offset,
                    end: end_offset,
                    len: total_len(container),
                });
            }
            return HighlightHandle::inert();
        };

        let local_start = found.local_offset(start_offset);
        let local_end = found.local_offset(end_offset).min(found.len);
        debug_assert!(
            local_start < local_end,
            "containing paragraph must overlap the range"
        );
        self.highlight_text_range(&found.block, local_start, local_end, class)
    }

    /// [`HighlightEngine::highlight_document_range`] for a typed range
    pub fn highlight_character_range<C: TextContainer + ?Sized>(
        &self,
        container: &C,
        range: CharacterRange,
        class: &str,
    ) -> HighlightHandle {
        self.highlight_document_range(container, range.start_offset, range.end_offset, class)
    }
}

fn total_len<C: TextContainer + ?Sized>(container: &C) -> usize {
    container.blocks().iter().map(TextBlock::text_len).sum()
}
