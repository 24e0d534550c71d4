//! Coordinate-based highlighting for source documents
//!
//! Highlights the passages a knowledge-graph node was generated from, either
//! on rendered PDF pages (page-space boxes) or inside plain-text paragraphs
//! (character ranges), and keeps the document view scrolled to them.
//!
//! ## Architecture
//!
//! - [`coords`]: page space ↔ surface space transforms
//! - [`resolver`]: reference classification, staggered batches, offset lookup
//! - [`overlay`]: canvas, overlay-marker, and text-wrap highlighting
//! - [`surface`]: traits the host implements for its rendering targets
//! - [`scheduler`]: deferred tasks on a single-threaded event loop
//!
//! Everything runs on one thread. Rendering targets are borrowed per call;
//! the engine itself keeps no state between calls beyond pending timers,
//! which every returned [`HighlightHandle`] can cancel.

pub mod config;
pub mod coords;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod handle;
pub mod overlay;
pub mod region;
pub mod resolver;
pub mod scheduler;
pub mod scroll;
pub mod surface;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::{EngineConfig, HighlightStyle};
pub use coords::{
    page_to_surface_box, page_to_surface_y, surface_to_page_box, surface_to_page_y, PageGeometry,
};
pub use diagnostics::{Diagnostic, Diagnostics, RecordingDiagnostics, TracingDiagnostics};
pub use engine::HighlightEngine;
pub use error::HighlightError;
pub use handle::{HighlightHandle, HighlightState, RemovalCause};
pub use region::RegionHighlights;
pub use resolver::{find_element_at_offset, get_first_page_number, BlockMatch};
pub use scheduler::{Scheduler, Task, TimerId, VirtualScheduler};
pub use surface::{OverlayHost, OverlayMarker, PageSurface, SurfaceLookup, TextBlock, TextContainer};

pub use shared_types::{
    BoundingBox, CharacterRange, CrossPageReference, PageReference, PageSegment, ReferenceError,
    SourceReference,
};
