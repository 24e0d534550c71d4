//! Shape-based classification of reference payloads
//!
//! The upstream service does not tag its references. A payload is treated as
//! single-page when it carries a scalar `page` and an object `coordinates`, and
//! as cross-page when it carries a `pages` array and an array `coordinates`.

use crate::types::{BoundingBox, CrossPageReference, PageReference, PageSegment};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReferenceError {
    #[error("Reference is not a JSON object")]
    NotAnObject,

    #[error("Reference has neither a page/coordinates pair nor a pages/coordinates list")]
    UnrecognizedShape,

    #[error("Invalid {kind} reference: {message}")]
    InvalidField { kind: &'static str, message: String },
}

/// A reference to source text, either confined to one page or spanning several
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceReference {
    Single(PageReference),
    CrossPage(CrossPageReference),
}

impl SourceReference {
    /// Classify an untyped payload by the fields it carries
    pub fn classify(value: &Value) -> Result<Self, ReferenceError> {
        let obj = value.as_object().ok_or(ReferenceError::NotAnObject)?;
        let coordinates = obj.get("coordinates");

        let is_single = obj.get("page").is_some_and(Value::is_number)
            && coordinates.is_some_and(Value::is_object);
        if is_single {
            return PageReference::deserialize(value)
                .map(SourceReference::Single)
                .map_err(|e| ReferenceError::InvalidField {
                    kind: "single-page",
                    message: e.to_string(),
                });
        }

        let is_cross_page = obj.get("pages").is_some_and(Value::is_array)
            && coordinates.is_some_and(Value::is_array);
        if is_cross_page {
            return CrossPageReference::deserialize(value)
                .map(SourceReference::CrossPage)
                .map_err(|e| ReferenceError::InvalidField {
                    kind: "cross-page",
                    message: e.to_string(),
                });
        }

        Err(ReferenceError::UnrecognizedShape)
    }

    pub fn text(&self) -> &str {
        match self {
            SourceReference::Single(r) => &r.text,
            SourceReference::CrossPage(r) => &r.text,
        }
    }

    /// First page touched, in reading order
    pub fn first_page(&self) -> Option<u32> {
        match self {
            SourceReference::Single(r) => Some(r.page),
            SourceReference::CrossPage(r) => r
                .pages
                .first()
                .copied()
                .or_else(|| r.coordinates.first().map(|s| s.page)),
        }
    }

    /// Every page touched, in reading order
    pub fn pages(&self) -> Vec<u32> {
        match self {
            SourceReference::Single(r) => vec![r.page],
            SourceReference::CrossPage(r) => r.pages.clone(),
        }
    }

    /// The paintable pieces of this reference, one per page
    pub fn segments(&self) -> Vec<PageSegment> {
        match self {
            SourceReference::Single(r) => vec![PageSegment {
                page: r.page,
                bbox: r.coordinates,
            }],
            SourceReference::CrossPage(r) => r.coordinates.clone(),
        }
    }

    pub fn is_cross_page(&self) -> bool {
        matches!(self, SourceReference::CrossPage(_))
    }
}

impl From<PageReference> for SourceReference {
    fn from(r: PageReference) -> Self {
        SourceReference::Single(r)
    }
}

impl From<CrossPageReference> for SourceReference {
    fn from(r: CrossPageReference) -> Self {
        SourceReference::CrossPage(r)
    }
}

impl PageSegment {
    pub fn new(page: u32, bbox: BoundingBox) -> Self {
        Self { page, bbox }
    }
}
