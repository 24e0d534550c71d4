pub mod reference;
pub mod types;

pub use reference::{ReferenceError, SourceReference};
pub use types::{BoundingBox, CharacterRange, CrossPageReference, PageReference, PageSegment};
