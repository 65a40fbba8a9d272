//! Candidate strategies for locating turn elements
//!
//! Each strategy is a self-contained heuristic with the same contract: given a
//! snapshot and a root, return candidate elements in document order. Strategies
//! do not filter for validity or deduplicate; the cascade does both.

use regex::Regex;
use scraper::Selector;

use super::Strategy;
use crate::dom::{ElementId, Page, css};

/// Attribute-based exact match.
///
/// Tries each selector in order and returns the matches of the first selector
/// that finds anything. Put the most specific marker first.
pub struct AttributeMatch {
    selectors: Vec<Selector>,
}

impl AttributeMatch {
    pub fn new(selectors: &[&str]) -> Self {
        Self {
            selectors: selectors.iter().map(|s| css(s)).collect(),
        }
    }
}

impl Strategy for AttributeMatch {
    fn name(&self) -> &'static str {
        "attribute"
    }

    fn candidates(&self, page: &Page, root: ElementId) -> Vec<ElementId> {
        self.selectors
            .iter()
            .map(|selector| page.select_within(root, selector))
            .find(|found| !found.is_empty())
            .unwrap_or_default()
    }
}

/// Turn containers that hold an author-role marker somewhere inside.
pub struct ScopedContainer {
    container: Selector,
    marker: Selector,
}

impl ScopedContainer {
    pub fn new(container: &str, marker: &str) -> Self {
        Self {
            container: css(container),
            marker: css(marker),
        }
    }
}

impl Strategy for ScopedContainer {
    fn name(&self) -> &'static str {
        "scoped-container"
    }

    fn candidates(&self, page: &Page, root: ElementId) -> Vec<ElementId> {
        page.select_within(root, &self.container)
            .into_iter()
            .filter(|container| page.contains(*container, &self.marker))
            .collect()
    }
}

/// Which positions in a run of alternating blocks belong to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    /// Positions 0, 2, 4, ... (the user speaks first)
    Even,
    /// Positions 1, 3, 5, ...
    Odd,
}

impl Parity {
    pub fn matches(self, index: usize) -> bool {
        match self {
            Parity::Even => index % 2 == 0,
            Parity::Odd => index % 2 == 1,
        }
    }
}

/// Repeating blocks inside the main content region, classified by position.
///
/// Best effort for layouts without a stable attribute vocabulary: a block is a
/// candidate when it carries the role marker or sits at the role's parity.
/// Parity counts every block in the region, valid or not.
pub struct StructuralPosition {
    region: Selector,
    block: Selector,
    marker: Selector,
    parity: Parity,
}

impl StructuralPosition {
    pub fn new(region: &str, block: &str, marker: &str, parity: Parity) -> Self {
        Self {
            region: css(region),
            block: css(block),
            marker: css(marker),
            parity,
        }
    }
}

impl Strategy for StructuralPosition {
    fn name(&self) -> &'static str {
        "structural-position"
    }

    fn candidates(&self, page: &Page, root: ElementId) -> Vec<ElementId> {
        let Some(region) = page.first_within(root, &self.region) else {
            return Vec::new();
        };
        page.select_within(region, &self.block)
            .into_iter()
            .enumerate()
            .filter(|(index, block)| {
                self.parity.matches(*index) || page.contains(*block, &self.marker)
            })
            .map(|(_, block)| block)
            .collect()
    }
}

/// Fuzzy class and attribute naming conventions.
///
/// Candidates are elements whose class mentions a chat-ish word. Each one is
/// scored by how many "author is this role" signals it carries; a candidate
/// needs at least one signal and some content.
pub struct FuzzyNameMatch {
    candidates: Selector,
    role_pattern: Regex,
    role_attributes: Vec<(String, String)>,
    content: Selector,
}

impl FuzzyNameMatch {
    /// Fuzzy matcher for the user's own turns.
    pub fn user() -> Self {
        Self::for_role(&["user", "human"], "user")
    }

    /// Build a matcher whose class signal is any of `keywords` and whose
    /// attribute signal is `data-sender` / `data-role` equal to `role`.
    pub fn for_role(keywords: &[&str], role: &str) -> Self {
        let alternation = keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let role_pattern = Regex::new(&format!("(?i)(?:{alternation})"))
            .expect("escaped keyword alternation is a valid regex");
        Self {
            candidates: css(r#"[class*="message"], [class*="chat"], [class*="turn"]"#),
            role_pattern,
            role_attributes: vec![
                ("data-sender".to_string(), role.to_string()),
                ("data-role".to_string(), role.to_string()),
            ],
            content: css("img, svg, canvas, pre, code"),
        }
    }

    /// Number of role signals the element carries.
    pub fn score(&self, page: &Page, element: ElementId) -> usize {
        let class_signal = usize::from(self.role_pattern.is_match(page.class_name(element)));
        let attr_signals = self
            .role_attributes
            .iter()
            .filter(|(name, value)| page.attr(element, name) == Some(value.as_str()))
            .count();
        class_signal + attr_signals
    }

    fn has_content(&self, page: &Page, element: ElementId) -> bool {
        !page.text_content(element).is_empty() || page.contains(element, &self.content)
    }
}

impl Strategy for FuzzyNameMatch {
    fn name(&self) -> &'static str {
        "fuzzy-name"
    }

    fn candidates(&self, page: &Page, root: ElementId) -> Vec<ElementId> {
        page.select_within(root, &self.candidates)
            .into_iter()
            .filter(|el| self.score(page, *el) > 0 && self.has_content(page, *el))
            .collect()
    }
}
