//! Read-only document snapshots
//!
//! A [`Page`] is one parsed state of a chat transcript: the markup, a handle for
//! every element, and the vertical layout of each element. The live document
//! keeps changing while the user chats; each change is modelled as a new
//! snapshot with a new generation. Handles remember the generation they were
//! issued for, so a handle kept across a mutation resolves to nothing instead
//! of silently pointing at a different element.
//!
//! Queries use `scraper` selectors and always return handles in document order.

mod layout;
mod text;

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use ego_tree::NodeId;
use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::error::{Error, Result};

pub use layout::{
    DEFAULT_DOCUMENT_HEIGHT, DEFAULT_VIEWPORT_HEIGHT, FlowEstimate, HEIGHT_ATTR, LayoutSource,
    Rect, TOP_ATTR, Viewport,
};
pub use text::{collapse_whitespace, preview};

use layout::parse_px;

/// Source of snapshot generations. Starts at 1 so a zeroed handle never resolves.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Tags that never render.
const HIDDEN_TAGS: &[&str] = &[
    "head", "link", "meta", "noscript", "script", "style", "template", "title",
];

/// Tags rendered as replaced content with an intrinsic height.
const MEDIA_TAGS: &[&str] = &["canvas", "img", "video"];

/// Handle of an element inside one snapshot.
///
/// Ordering follows document order for handles of the same snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementId {
    generation: u64,
    ordinal: usize,
}

impl ElementId {
    /// Position of the element in document order.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Snapshot generation this handle belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
struct NodeInfo {
    node: NodeId,
    parent: Option<usize>,
    /// One past the ordinal of the last descendant
    end: usize,
    rect: Rect,
}

/// A parsed transcript snapshot with layout.
pub struct Page {
    html: Html,
    nodes: Vec<NodeInfo>,
    viewport: Viewport,
    document_height: f64,
    generation: u64,
}

impl Page {
    /// Parse markup using the default flow estimate for un-annotated geometry.
    pub fn parse(markup: &str) -> Self {
        Self::parse_with(markup, FlowEstimate::default())
    }

    /// Parse markup with a custom flow estimate.
    pub fn parse_with(markup: &str, estimate: FlowEstimate) -> Self {
        let html = Html::parse_document(markup);
        let mut indexer = Indexer {
            nodes: Vec::new(),
            estimate,
        };
        indexer.visit(html.root_element(), None, 0.0, false);
        let nodes = indexer.nodes;

        let document_height = nodes
            .first()
            .map(|root| root.rect.bottom())
            .filter(|height| *height > 0.0)
            .unwrap_or(DEFAULT_DOCUMENT_HEIGHT);

        Self {
            html,
            nodes,
            viewport: Viewport::default(),
            document_height,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Read and parse a snapshot file.
    pub fn load(path: &Path) -> Result<Self> {
        let markup = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&markup))
    }

    /// Replace the viewport (scroll offset and height).
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.set_viewport(viewport);
        self
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.scroll_to(viewport.scroll_y);
    }

    /// Scroll to `y`, clamped to the scrollable range. Returns the applied offset.
    pub fn scroll_to(&mut self, y: f64) -> f64 {
        let max = (self.document_height - self.viewport.height).max(0.0);
        self.viewport.scroll_y = if y.is_finite() { y.clamp(0.0, max) } else { 0.0 };
        self.viewport.scroll_y
    }

    /// Snapshot generation; bumps on every parse.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of elements in the snapshot.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The `<html>` element.
    pub fn root(&self) -> ElementId {
        self.id(0)
    }

    /// Whether `id` was issued by this snapshot.
    pub fn owns(&self, id: ElementId) -> bool {
        id.generation == self.generation && id.ordinal < self.nodes.len()
    }

    /// All elements matching `selector`, in document order.
    pub fn select(&self, selector: &Selector) -> Vec<ElementId> {
        self.matching(0..self.nodes.len(), selector).collect()
    }

    /// Strict descendants of `scope` matching `selector`, in document order.
    pub fn select_within(&self, scope: ElementId, selector: &Selector) -> Vec<ElementId> {
        let Some((start, end)) = self.descendant_range(scope) else {
            return Vec::new();
        };
        self.matching(start..end, selector).collect()
    }

    /// First strict descendant of `scope` matching `selector`.
    pub fn first_within(&self, scope: ElementId, selector: &Selector) -> Option<ElementId> {
        let (start, end) = self.descendant_range(scope)?;
        self.matching(start..end, selector).next()
    }

    /// Whether any strict descendant of `scope` matches `selector`.
    pub fn contains(&self, scope: ElementId, selector: &Selector) -> bool {
        self.first_within(scope, selector).is_some()
    }

    /// Whether the element itself matches `selector`.
    pub fn matches(&self, id: ElementId, selector: &Selector) -> bool {
        self.element_ref(id).is_some_and(|el| selector.matches(&el))
    }

    /// Whether `ancestor` strictly contains `descendant`.
    pub fn is_ancestor(&self, ancestor: ElementId, descendant: ElementId) -> bool {
        if !self.owns(ancestor) || !self.owns(descendant) {
            return false;
        }
        let end = self.nodes[ancestor.ordinal].end;
        ancestor.ordinal < descendant.ordinal && descendant.ordinal < end
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        if !self.owns(id) {
            return None;
        }
        self.nodes[id.ordinal].parent.map(|ordinal| self.id(ordinal))
    }

    /// Lowercase tag name.
    pub fn tag(&self, id: ElementId) -> Option<&str> {
        self.element_ref(id).map(|el| el.value().name())
    }

    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.element_ref(id).and_then(|el| el.value().attr(name))
    }

    /// Raw `class` attribute, empty when absent.
    pub fn class_name(&self, id: ElementId) -> &str {
        self.attr(id, "class").unwrap_or_default()
    }

    /// All text under the element, trimmed (the DOM's `textContent`).
    pub fn text_content(&self, id: ElementId) -> String {
        self.element_ref(id)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }

    /// Rendered text under the element with whitespace collapsed.
    pub fn visible_text(&self, id: ElementId) -> String {
        self.element_ref(id).map(text::visible_text).unwrap_or_default()
    }

    /// Element rect in document coordinates.
    pub fn document_rect(&self, id: ElementId) -> Option<Rect> {
        self.owns(id).then(|| self.nodes[id.ordinal].rect)
    }

    fn id(&self, ordinal: usize) -> ElementId {
        ElementId {
            generation: self.generation,
            ordinal,
        }
    }

    /// Handles in `ordinals` whose element matches `selector`.
    fn matching<'a>(
        &'a self,
        ordinals: std::ops::Range<usize>,
        selector: &'a Selector,
    ) -> impl Iterator<Item = ElementId> + 'a {
        ordinals
            .filter(move |ordinal| {
                self.element_at(*ordinal)
                    .is_some_and(|el| selector.matches(&el))
            })
            .map(|ordinal| self.id(ordinal))
    }

    fn element_at(&self, ordinal: usize) -> Option<ElementRef<'_>> {
        let info = self.nodes.get(ordinal)?;
        self.html.tree.get(info.node).and_then(ElementRef::wrap)
    }

    fn element_ref(&self, id: ElementId) -> Option<ElementRef<'_>> {
        if !self.owns(id) {
            return None;
        }
        self.element_at(id.ordinal)
    }

    fn descendant_range(&self, scope: ElementId) -> Option<(usize, usize)> {
        self.owns(scope)
            .then(|| (scope.ordinal + 1, self.nodes[scope.ordinal].end))
    }
}

impl LayoutSource for Page {
    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        self.document_rect(element)
            .map(|rect| rect.translate(-self.viewport.scroll_y))
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn document_height(&self) -> f64 {
        self.document_height
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("generation", &self.generation)
            .field("elements", &self.nodes.len())
            .field("viewport", &self.viewport)
            .field("document_height", &self.document_height)
            .finish()
    }
}

/// Whether an element is excluded from rendering.
pub(crate) fn is_hidden(element: &Element) -> bool {
    if HIDDEN_TAGS.contains(&element.name()) {
        return true;
    }
    if element.attr("hidden").is_some() || element.attr("aria-hidden") == Some("true") {
        return true;
    }
    element.attr("style").is_some_and(|style| {
        style
            .split(';')
            .any(|decl| decl.replace(char::is_whitespace, "").eq_ignore_ascii_case("display:none"))
    })
}

/// Builds the element index and flow layout in one preorder pass.
///
/// Ordinals are preorder positions, so a subtree is a contiguous range.
struct Indexer {
    nodes: Vec<NodeInfo>,
    estimate: FlowEstimate,
}

impl Indexer {
    /// Index `element` and its subtree starting at `cursor`; returns the
    /// document offset just below the element.
    fn visit(
        &mut self,
        element: ElementRef<'_>,
        parent: Option<usize>,
        cursor: f64,
        hidden: bool,
    ) -> f64 {
        let ordinal = self.nodes.len();
        self.nodes.push(NodeInfo {
            node: element.id(),
            parent,
            end: ordinal + 1,
            rect: Rect::new(cursor, 0.0),
        });

        let value = element.value();
        let hidden = hidden || is_hidden(value);
        let top = value.attr(TOP_ATTR).and_then(parse_px).unwrap_or(cursor);
        let padding = if hidden { 0.0 } else { self.estimate.block_padding };

        let content_top = top + padding;
        let mut inner = content_top;
        if !hidden && MEDIA_TAGS.contains(&value.name()) {
            inner += self.estimate.media_height;
        }
        for child in element.children() {
            if let Some(child_el) = ElementRef::wrap(child) {
                inner = self.visit(child_el, Some(ordinal), inner, hidden);
            } else if let Some(text) = child.value().as_text() {
                if !hidden {
                    inner += self.estimate.text_height(text.trim().chars().count());
                }
            }
        }

        let estimated = if inner > content_top {
            inner + padding - top
        } else {
            0.0
        };
        let height = value
            .attr(HEIGHT_ATTR)
            .and_then(parse_px)
            .map(|h| h.max(0.0))
            .unwrap_or(estimated);

        let end = self.nodes.len();
        let node = &mut self.nodes[ordinal];
        node.end = end;
        node.rect = Rect::new(top, height);

        (top + height).max(cursor)
    }
}

/// Compile a built-in selector.
///
/// Panics on invalid syntax; only use with literal selectors.
pub(crate) fn css(selector: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| panic!("invalid built-in selector {selector:?}: {e:?}"))
}
