//! Coordinate transformation between page and surface coordinate systems
//!
//! Page space: origin bottom-left, Y up, unscaled points.
//! Surface space: origin top-left, Y down, multiplied by the render scale.

use crate::error::HighlightError;
use shared_types::BoundingBox;

/// Top edge of a box in surface space, before scaling
pub fn page_to_surface_y(page_y: f64, box_height: f64, page_height: f64) -> f64 {
    page_height - page_y - box_height
}

/// Bottom edge of a box in page space, given its unscaled surface top edge
///
/// The flip is its own inverse, so this is the same arithmetic as
/// [`page_to_surface_y`] read in the other direction.
pub fn surface_to_page_y(surface_y: f64, box_height: f64, page_height: f64) -> f64 {
    page_height - surface_y - box_height
}

/// Convert a page-space box to a scaled surface-space box
///
/// # Errors
/// Returns an error if `scale` is not strictly positive, any input is
/// non-finite, or the page height or box dimensions are negative.
pub fn page_to_surface_box(
    bbox: &BoundingBox,
    page_height: f64,
    scale: f64,
) -> Result<BoundingBox, HighlightError> {
    check_geometry(bbox, page_height, scale)?;

    let top = page_to_surface_y(bbox.y, bbox.height, page_height);
    Ok(BoundingBox {
        x: bbox.x * scale,
        y: top * scale,
        width: bbox.width * scale,
        height: bbox.height * scale,
    })
}

/// Convert a scaled surface-space box back to page space
///
/// # Errors
/// Same conditions as [`page_to_surface_box`].
pub fn surface_to_page_box(
    rect: &BoundingBox,
    page_height: f64,
    scale: f64,
) -> Result<BoundingBox, HighlightError> {
    check_geometry(rect, page_height, scale)?;

    let height = rect.height / scale;
    Ok(BoundingBox {
        x: rect.x / scale,
        y: surface_to_page_y(rect.y / scale, height, page_height),
        width: rect.width / scale,
        height,
    })
}

fn check_geometry(bbox: &BoundingBox, page_height: f64, scale: f64) -> Result<(), HighlightError> {
    if !scale.is_finite() {
        return Err(HighlightError::NonFinite("scale"));
    }
    if scale <= 0.0 {
        return Err(HighlightError::InvalidScale(scale));
    }
    if !page_height.is_finite() {
        return Err(HighlightError::NonFinite("page height"));
    }
    if !bbox.is_finite() {
        return Err(HighlightError::NonFinite("bounding box"));
    }
    if page_height < 0.0 {
        return Err(HighlightError::NegativeDimension {
            field: "page height",
            value: page_height,
        });
    }
    if bbox.height < 0.0 {
        return Err(HighlightError::NegativeDimension {
            field: "box height",
            value: bbox.height,
        });
    }
    if bbox.width < 0.0 {
        return Err(HighlightError::NegativeDimension {
            field: "box width",
            value: bbox.width,
        });
    }
    Ok(())
}

/// Page height and render scale shared by every segment painted in one call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Page height in page-space units
    pub page_height: f64,
    /// Surface units per page unit
    pub scale: f64,
}

impl PageGeometry {
    pub fn new(page_height: f64, scale: f64) -> Self {
        Self { page_height, scale }
    }

    pub fn to_surface(&self, bbox: &BoundingBox) -> Result<BoundingBox, HighlightError> {
        page_to_surface_box(bbox, self.page_height, self.scale)
    }

    pub fn to_page(&self, rect: &BoundingBox) -> Result<BoundingBox, HighlightError> {
        surface_to_page_box(rect, self.page_height, self.scale)
    }
}
