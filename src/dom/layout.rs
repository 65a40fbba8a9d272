//! Vertical geometry for document snapshots
//!
//! Only the vertical axis matters for turn navigation, so a rect is just a top
//! edge and a height. Snapshots captured from a live browser carry the real
//! geometry in `data-layout-top` / `data-layout-height` attributes; markup
//! without annotations falls back to a flow estimate derived from text length.

use serde::Serialize;

use super::ElementId;

/// Document height used when a snapshot reports no usable height.
pub const DEFAULT_DOCUMENT_HEIGHT: f64 = 1000.0;

/// Viewport height used when the caller does not provide one.
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;

/// Annotation holding an element's absolute top offset in layout pixels.
pub const TOP_ATTR: &str = "data-layout-top";

/// Annotation holding an element's height in layout pixels.
pub const HEIGHT_ATTR: &str = "data-layout-height";

/// Vertical extent of an element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Shift the rect vertically by `dy` pixels.
    pub fn translate(self, dy: f64) -> Self {
        Self {
            top: self.top + dy,
            height: self.height,
        }
    }
}

/// The visible window onto the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    /// Document offset of the viewport's top edge
    pub scroll_y: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(scroll_y: f64, height: f64) -> Self {
        Self { scroll_y, height }
    }

    /// Half the viewport height, in viewport coordinates.
    pub fn midline(&self) -> f64 {
        self.height / 2.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_y: 0.0,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

/// Read access to live geometry.
///
/// This is the seam the index manager measures through. [`crate::Page`] is the
/// production implementation; tests substitute doubles that count reads.
pub trait LayoutSource {
    /// Element rect relative to the viewport's top edge.
    ///
    /// Returns `None` for handles this layout cannot resolve (e.g. handles from
    /// an older snapshot).
    fn bounding_rect(&self, element: ElementId) -> Option<Rect>;

    fn viewport(&self) -> Viewport;

    /// Total scrollable height of the document.
    fn document_height(&self) -> f64;
}

/// Parameters of the flow estimate used for un-annotated markup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowEstimate {
    pub line_height: f64,
    pub chars_per_line: usize,
    /// Padding added above and below every element that has content
    pub block_padding: f64,
    /// Height of replaced content (images, canvases, video)
    pub media_height: f64,
}

impl Default for FlowEstimate {
    fn default() -> Self {
        Self {
            line_height: 24.0,
            chars_per_line: 80,
            block_padding: 4.0,
            media_height: 160.0,
        }
    }
}

impl FlowEstimate {
    /// Estimated height of a run of `chars` characters.
    pub fn text_height(&self, chars: usize) -> f64 {
        if chars == 0 {
            return 0.0;
        }
        let per_line = self.chars_per_line.max(1);
        chars.div_ceil(per_line) as f64 * self.line_height
    }
}

/// Parse a pixel annotation such as `120`, `120px` or `12.5`.
pub(crate) fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}
