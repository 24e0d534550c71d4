//! Injectable diagnostics sink
//!
//! Highlighting is best-effort: recoverable failures are reported here and
//! never propagated to the caller. The default sink forwards to `tracing`, so
//! the engine stays silent until the host installs a subscriber.

use std::cell::RefCell;
use std::fmt;

/// A recovered failure inside the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A batch entry matched neither reference shape and was skipped
    MalformedReference { index: usize, reason: String },
    /// No rendering surface is registered for the page
    MissingSurface { page: u32 },
    /// A segment's geometry could not be transformed
    InvalidGeometry { page: Option<u32>, reason: String },
    /// The overlay host could not create a marker element
    OverlayUnavailable,
    /// A character range was out of bounds or inverted
    InvalidRange { start: usize, end: usize, len: usize },
    /// The text container has no paragraphs
    EmptyContainer,
}

impl Diagnostic {
    /// Whether the condition deserves a warning
    ///
    /// Range and empty-container failures happen routinely while content is
    /// still loading, so they are reported at debug level.
    pub fn is_warning(&self) -> bool {
        !matches!(
            self,
            Diagnostic::InvalidRange { .. } | Diagnostic::EmptyContainer
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedReference { index, reason } => {
                write!(f, "Skipping malformed reference at index {}: {}", index, reason)
            }
            Diagnostic::MissingSurface { page } => {
                write!(f, "No rendering surface for page {}", page)
            }
            Diagnostic::InvalidGeometry {
                page: Some(page),
                reason,
            } => write!(f, "Invalid geometry on page {}: {}", page, reason),
            Diagnostic::InvalidGeometry { page: None, reason } => {
                write!(f, "Invalid geometry: {}", reason)
            }
            Diagnostic::OverlayUnavailable => write!(f, "Unable to create highlight overlay"),
            Diagnostic::InvalidRange { start, end, len } => write!(
                f,
                "Character range {}..{} is invalid for text of length {}",
                start, end, len
            ),
            Diagnostic::EmptyContainer => write!(f, "Text container has no paragraphs"),
        }
    }
}

pub trait Diagnostics {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::MalformedReference { index, reason } => {
                tracing::warn!(index, reason = %reason, "{}", diagnostic)
            }
            Diagnostic::MissingSurface { page }
            | Diagnostic::InvalidGeometry {
                page: Some(page), ..
            } => tracing::warn!(page, "{}", diagnostic),
            d if d.is_warning() => tracing::warn!("{}", diagnostic),
            _ => tracing::debug!("{}", diagnostic),
        }
    }
}

/// Keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    entries: RefCell<Vec<Diagnostic>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.entries
            .borrow()
            .iter()
            .filter(|d| d.is_warning())
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        self.entries.borrow_mut().push(diagnostic);
    }
}
