//! Validity rules applied to every strategy's candidates
//!
//! Chat pages surround the transcript with chrome that matches the same
//! selectors as real turns: the compose box, the model picker in the header,
//! tiny labels. These rules weed that out before a strategy's result counts.

use scraper::Selector;

use crate::dom::{ElementId, LayoutSource, Page, css};

/// Structural and content checks a candidate turn must pass.
#[derive(Debug, Clone)]
pub struct ValidityRules {
    /// Elements that mark an interactive input surface
    pub input_surfaces: Selector,
    /// Height of the fixed-header band at the top of the viewport
    pub header_band: f64,
    /// Elements in the header band shorter than this are chrome
    pub header_min_height: f64,
    /// Candidates with less text than this are always rejected
    pub min_text_chars: usize,
    /// Candidates with less text than this need rich content to pass
    pub plain_text_min_chars: usize,
    /// Elements that count as rich content
    pub rich_content: Selector,
}

impl ValidityRules {
    /// Rules for answer turns: substantial text or structured content.
    pub fn strict() -> Self {
        Self {
            input_surfaces: input_surfaces(),
            header_band: 100.0,
            header_min_height: 100.0,
            min_text_chars: 10,
            plain_text_min_chars: 30,
            rich_content: css("pre, code, ol, ul"),
        }
    }

    /// Rules for prompt turns: any text, or media/code content.
    pub fn lenient() -> Self {
        Self {
            input_surfaces: input_surfaces(),
            header_band: 100.0,
            header_min_height: 100.0,
            min_text_chars: 0,
            plain_text_min_chars: 1,
            rich_content: css("img, svg, canvas, pre, code"),
        }
    }

    /// Check a candidate against every rule.
    pub fn accepts(&self, page: &Page, element: ElementId) -> bool {
        self.check(page, element).is_ok()
    }

    /// Check a candidate, naming the first rule it fails.
    pub fn check(&self, page: &Page, element: ElementId) -> Result<(), Rejection> {
        if page.matches(element, &self.input_surfaces)
            || page.contains(element, &self.input_surfaces)
        {
            return Err(Rejection::InputSurface);
        }

        if let Some(rect) = page.bounding_rect(element) {
            // Visible strip under the viewport top only
            let in_band = (0.0..self.header_band).contains(&rect.top);
            if in_band && rect.height < self.header_min_height {
                return Err(Rejection::HeaderChrome);
            }
        }

        let chars = page.text_content(element).chars().count();
        if chars < self.min_text_chars {
            return Err(Rejection::TooLittleText);
        }
        if chars < self.plain_text_min_chars && !page.contains(element, &self.rich_content) {
            return Err(Rejection::TooLittleText);
        }

        Ok(())
    }
}

/// Why a candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The element is or contains a compose box or form
    InputSurface,
    /// Short element inside the fixed-header band
    HeaderChrome,
    /// Not enough text and no rich content
    TooLittleText,
}

fn input_surfaces() -> Selector {
    css(r#"textarea, [contenteditable="true"], form"#)
}
