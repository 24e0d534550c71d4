//! Scroll synchronization between graph selection and the document view

use crate::diagnostics::Diagnostic;
use crate::engine::HighlightEngine;
use crate::resolver::{find_element_at_offset, get_first_page_number};
use crate::surface::{PageSurface, SurfaceLookup, TextBlock, TextContainer};
use shared_types::SourceReference;

impl HighlightEngine {
    /// Bring the first page touched by `references` into view
    ///
    /// Returns the page scrolled to.
    pub fn scroll_to_first_reference<L: SurfaceLookup + ?Sized>(
        &self,
        lookup: &L,
        references: &[SourceReference],
    ) -> Option<u32> {
        let page = get_first_page_number(references)?;
        match lookup.surface(page) {
            Some(surface) => {
                surface.scroll_into_view();
                tracing::debug!(page, "Scrolled to first referenced page");
                Some(page)
            }
            None => {
                self.report(Diagnostic::MissingSurface { page });
                None
            }
        }
    }

    /// Bring the paragraph at a document offset into view
    ///
    /// Returns the index of the paragraph scrolled to.
    pub fn scroll_to_offset<C: TextContainer + ?Sized>(
        &self,
        container: &C,
        offset: usize,
    ) -> Option<usize> {
        let Some(found) = find_element_at_offset(container, offset) else {
            self.report(Diagnostic::EmptyContainer);
            return None;
        };
        found.block.scroll_into_view();
        Some(found.index)
    }
}
