//! Ordered pair index with a scroll-synchronized cursor

use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, trace};

use super::cache::{Clock, DEFAULT_FRESHNESS, GeometryCache, SystemClock};
use crate::adapters::{PromptAnswerPair, SiteAdapter};
use crate::dom::{DEFAULT_DOCUMENT_HEIGHT, LayoutSource, Page};

/// A pair plus its position along the whole document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptAnswerItem {
    #[serde(flatten)]
    pub pair: PromptAnswerPair,
    /// `top_offset / document height` in `[0, 1]`; `None` until computed
    pub relative_position: Option<f64>,
}

impl PromptAnswerItem {
    fn new(pair: PromptAnswerPair) -> Self {
        Self {
            pair,
            relative_position: None,
        }
    }
}

/// Owns the extracted items of one page and the cursor over them.
///
/// Items are replaced wholesale on every [`IndexManager::refresh`] and are
/// always sorted by `top_offset`. The cursor is always in range, or 0 when
/// there are no items.
pub struct IndexManager {
    adapter: Rc<dyn SiteAdapter>,
    items: Vec<PromptAnswerItem>,
    current_index: usize,
    cache: GeometryCache,
    clock: Box<dyn Clock>,
    document_height: f64,
    /// Snapshot generation the items were extracted from
    generation: Option<u64>,
}

impl IndexManager {
    /// Empty index bound to `adapter`; call [`IndexManager::refresh`] to populate it.
    pub fn new(adapter: Rc<dyn SiteAdapter>) -> Self {
        Self {
            adapter,
            items: Vec::new(),
            current_index: 0,
            cache: GeometryCache::new(DEFAULT_FRESHNESS),
            clock: Box::new(SystemClock),
            document_height: DEFAULT_DOCUMENT_HEIGHT,
            generation: None,
        }
    }

    /// Use a different geometry freshness window.
    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.cache = GeometryCache::new(freshness);
        self
    }

    /// Use a different time source for cache expiry.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn adapter(&self) -> &Rc<dyn SiteAdapter> {
        &self.adapter
    }

    /// Re-extract, sort, recompute relative positions and drop cached geometry.
    ///
    /// The cursor keeps its value where it is still in range.
    pub fn refresh(&mut self, page: &Page) {
        let mut items: Vec<_> = self
            .adapter
            .extract_pairs(page, page.root())
            .into_iter()
            .map(PromptAnswerItem::new)
            .collect();
        items.sort_by(|a, b| a.pair.top_offset.total_cmp(&b.pair.top_offset));

        self.items = items;
        self.document_height = page.document_height();
        self.generation = Some(page.generation());
        self.recompute_relative_positions();
        self.cache.clear();
        self.set_current_index(self.current_index);

        debug!(
            adapter = self.adapter.key(),
            items = self.items.len(),
            current = self.current_index,
            "index refreshed"
        );
    }

    pub fn items(&self) -> &[PromptAnswerItem] {
        &self.items
    }

    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn item(&self, index: usize) -> Option<&PromptAnswerItem> {
        self.items.get(index)
    }

    pub fn current_item(&self) -> Option<&PromptAnswerItem> {
        self.item(self.current_index)
    }

    /// Relative position of every item, in item order.
    pub fn relative_positions(&self) -> Vec<f64> {
        self.items
            .iter()
            .map(|item| item.relative_position.unwrap_or_default())
            .collect()
    }

    /// Document height the relative positions were computed against.
    pub fn document_height(&self) -> f64 {
        self.document_height
    }

    /// Move the cursor to `index`, clamped into range.
    pub fn set_current_index(&mut self, index: usize) {
        self.current_index = match self.items.len() {
            0 => 0,
            len => index.min(len - 1),
        };
    }

    /// Step back one item. Returns `false` at the first item.
    pub fn move_to_prev(&mut self) -> bool {
        if self.current_index == 0 {
            return false;
        }
        self.set_current_index(self.current_index - 1);
        true
    }

    /// Step forward one item. Returns `false` at the last item.
    pub fn move_to_next(&mut self) -> bool {
        if self.current_index + 1 >= self.items.len() {
            return false;
        }
        self.set_current_index(self.current_index + 1);
        true
    }

    /// Point the cursor at the deepest item whose top has passed the viewport
    /// midline.
    ///
    /// Scanning stops at the first item at or below the midline, since items
    /// are sorted. Returns whether the cursor moved.
    pub fn update_current_index_by_scroll<L>(&mut self, layout: &L, scroll_y: f64) -> bool
    where
        L: LayoutSource + ?Sized,
    {
        if self.items.is_empty() {
            return false;
        }

        let viewport = layout.viewport();
        let midline = viewport.midline();
        let now = self.clock.now();
        let mut active = 0;

        for (index, item) in self.items.iter().enumerate() {
            let document_top = match self.cache.get(index, now) {
                Some(cached) => cached.top,
                None => {
                    let Some(rect) = layout.bounding_rect(item.pair.prompt) else {
                        trace!(index, "item no longer resolves, skipping");
                        continue;
                    };
                    // Layout rects are relative to the layout's own scroll offset
                    let rect = rect.translate(viewport.scroll_y);
                    self.cache.insert(index, rect, now);
                    rect.top
                }
            };
            let top = document_top - scroll_y;

            if top < midline {
                active = index;
            } else {
                break;
            }
        }

        if active == self.current_index {
            return false;
        }
        debug!(from = self.current_index, to = active, "cursor follows scroll");
        self.current_index = active;
        true
    }

    /// Whether the page has drifted from the held items.
    ///
    /// Compares the adapter's cheap count against the item count, and treats
    /// items from an older snapshot as stale.
    pub fn needs_refresh(&self, page: &Page) -> bool {
        if self.generation != Some(page.generation()) {
            return true;
        }
        self.adapter.prompt_count(page, page.root()) != self.items.len()
    }

    /// Recompute relative positions if the document height changed.
    pub fn sync_document_height<L>(&mut self, layout: &L) -> bool
    where
        L: LayoutSource + ?Sized,
    {
        let height = layout.document_height();
        if (height - self.document_height).abs() < f64::EPSILON {
            return false;
        }
        self.document_height = height;
        self.recompute_relative_positions();
        true
    }

    /// Forget every cached geometry reading.
    pub fn invalidate_cache(&mut self) {
        self.cache.clear();
    }

    fn recompute_relative_positions(&mut self) {
        let height = if self.document_height.is_finite() && self.document_height > 0.0 {
            self.document_height
        } else {
            DEFAULT_DOCUMENT_HEIGHT
        };
        let single = self.items.len() == 1;
        for item in &mut self.items {
            item.relative_position = Some(if single {
                0.0
            } else {
                (item.pair.top_offset / height).clamp(0.0, 1.0)
            });
        }
    }
}
