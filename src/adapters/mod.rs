//! Site adapters and the registry that picks one for a page
//!
//! An adapter recognizes a chat site from the page identity and knows how to
//! pull prompt/answer pairs out of that site's markup. Adding a site means
//! implementing [`SiteAdapter`] and registering it in
//! [`AdapterRegistry::builtin`].

mod chatgpt;
mod grok;

use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::dom::{ElementId, Page};
use crate::identity::PageIdentity;

pub use chatgpt::ChatGptAdapter;
pub use grok::GrokAdapter;

/// One user prompt and the answer it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptAnswerPair {
    /// Unique within one extraction pass
    pub id: String,
    /// The user's turn
    pub prompt: ElementId,
    /// Visible prompt text, for display and debugging only
    pub prompt_text: String,
    /// The answer turn; equals `prompt` when the adapter cannot locate answers
    pub answer: ElementId,
    /// Absolute offset of the prompt from the top of the document
    pub top_offset: f64,
}

impl PromptAnswerPair {
    /// Whether the answer fell back to the prompt element.
    pub fn answer_is_prompt(&self) -> bool {
        self.answer == self.prompt
    }
}

/// A site-specific matcher.
pub trait SiteAdapter {
    /// Display name, e.g. "ChatGPT".
    fn name(&self) -> &'static str;

    /// Stable key used for settings and pair ids, e.g. "chatgpt".
    fn key(&self) -> &'static str;

    /// Whether this adapter handles the page.
    fn is_supported(&self, identity: &PageIdentity) -> bool;

    /// All prompt/answer pairs under `root`, in document order.
    fn extract_pairs(&self, page: &Page, root: ElementId) -> Vec<PromptAnswerPair>;

    /// Number of pairs [`SiteAdapter::extract_pairs`] would return.
    ///
    /// Used as a cheap staleness check, so implementations should skip text
    /// extraction and geometry.
    fn prompt_count(&self, page: &Page, root: ElementId) -> usize;
}

/// Ordered set of adapters; the first one that supports a page wins.
#[derive(Clone)]
pub struct AdapterRegistry {
    adapters: Vec<Rc<dyn SiteAdapter>>,
}

impl AdapterRegistry {
    /// Registry without any adapters.
    pub fn empty() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Registry with every built-in adapter, in priority order.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(ChatGptAdapter::new());
        registry.register(GrokAdapter::new());
        registry
    }

    /// Append an adapter at the lowest priority.
    pub fn register(&mut self, adapter: impl SiteAdapter + 'static) {
        self.adapters.push(Rc::new(adapter));
    }

    pub fn adapters(&self) -> &[Rc<dyn SiteAdapter>] {
        &self.adapters
    }

    /// First adapter supporting the page, or `None` for unsupported pages.
    pub fn select_adapter(&self, identity: &PageIdentity) -> Option<Rc<dyn SiteAdapter>> {
        let found = self
            .adapters
            .iter()
            .find(|adapter| adapter.is_supported(identity))
            .cloned();
        if found.is_none() {
            debug!(page = %identity, "no adapter supports page");
        }
        found
    }

    /// Like [`AdapterRegistry::select_adapter`], skipping adapters whose site is
    /// disabled in settings.
    pub fn select_enabled(
        &self,
        identity: &PageIdentity,
        settings: &Settings,
    ) -> Option<Rc<dyn SiteAdapter>> {
        self.adapters
            .iter()
            .filter(|adapter| {
                let enabled = settings.site_enabled(adapter.key());
                if !enabled {
                    debug!(adapter = adapter.key(), "site disabled in settings");
                }
                enabled
            })
            .find(|adapter| adapter.is_supported(identity))
            .cloned()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Pair each prompt with the first answer after it and before the next prompt.
///
/// Prompts without such an answer pair with themselves. Answers nested inside
/// their prompt are ignored.
pub(crate) fn pair_answers(
    page: &Page,
    prompts: &[ElementId],
    answers: &[ElementId],
) -> Vec<(ElementId, ElementId)> {
    prompts
        .iter()
        .enumerate()
        .map(|(index, prompt)| {
            let next = prompts.get(index + 1);
            let answer = answers
                .iter()
                .find(|answer| {
                    *answer > prompt
                        && next.is_none_or(|next| *answer < next)
                        && !page.is_ancestor(*prompt, **answer)
                })
                .unwrap_or(prompt);
            (*prompt, *answer)
        })
        .collect()
}

/// Turn matched elements into pairs with ids, text and offsets.
pub(crate) fn build_pairs(
    page: &Page,
    key: &str,
    matches: Vec<(ElementId, ElementId)>,
) -> Vec<PromptAnswerPair> {
    if matches.is_empty() {
        warn!(adapter = key, "no conversation turns found; page structure may have changed");
    }
    matches
        .into_iter()
        .enumerate()
        .map(|(index, (prompt, answer))| PromptAnswerPair {
            id: format!("{key}-turn-{index}"),
            prompt,
            prompt_text: page.visible_text(prompt),
            answer,
            top_offset: page.document_rect(prompt).map(|r| r.top).unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::css;

    struct HostAdapter {
        key: &'static str,
        host: &'static str,
    }

    impl SiteAdapter for HostAdapter {
        fn name(&self) -> &'static str {
            self.key
        }

        fn key(&self) -> &'static str {
            self.key
        }

        fn is_supported(&self, identity: &PageIdentity) -> bool {
            identity.host == self.host
        }

        fn extract_pairs(&self, _page: &Page, _root: ElementId) -> Vec<PromptAnswerPair> {
            Vec::new()
        }

        fn prompt_count(&self, _page: &Page, _root: ElementId) -> usize {
            0
        }
    }

    fn overlapping() -> AdapterRegistry {
        let mut registry = AdapterRegistry::empty();
        registry.register(HostAdapter {
            key: "first",
            host: "chat.example",
        });
        registry.register(HostAdapter {
            key: "second",
            host: "chat.example",
        });
        registry
    }

    #[test]
    fn test_first_registered_match_wins() {
        let identity = PageIdentity::new("chat.example", "/", "");
        let adapter = overlapping().select_adapter(&identity).unwrap();
        assert_eq!(adapter.key(), "first");
    }

    #[test]
    fn test_unsupported_page_selects_nothing() {
        let identity = PageIdentity::new("example.org", "/", "");
        assert!(overlapping().select_adapter(&identity).is_none());
        assert!(AdapterRegistry::builtin().select_adapter(&identity).is_none());
    }

    #[test]
    fn test_disabled_site_is_skipped() {
        let identity = PageIdentity::new("chat.example", "/", "");
        let mut settings = Settings::default();
        settings.set_site_enabled("first", false);
        let adapter = overlapping().select_enabled(&identity, &settings).unwrap();
        assert_eq!(adapter.key(), "second");

        settings.set_site_enabled("second", false);
        assert!(overlapping().select_enabled(&identity, &settings).is_none());
    }

    #[test]
    fn test_builtin_order() {
        let keys: Vec<_> = AdapterRegistry::builtin()
            .adapters()
            .iter()
            .map(|a| a.key())
            .collect();
        assert_eq!(keys, vec!["chatgpt", "grok"]);
    }

    #[test]
    fn test_pair_answers_between_prompts() {
        let page = Page::parse(
            r#"<div class="q" id="q1">q1</div><div class="a" id="a1">a1</div>
               <div class="q" id="q2">q2</div>
               <div class="q" id="q3">q3</div><div class="a" id="a3">a3</div><div class="a" id="a3b">a3b</div>"#,
        );
        let prompts = page.select(&css(".q"));
        let answers = page.select(&css(".a"));
        let pairs = pair_answers(&page, &prompts, &answers);
        let names: Vec<_> = pairs
            .iter()
            .map(|(p, a)| (page.attr(*p, "id").unwrap(), page.attr(*a, "id").unwrap()))
            .collect();
        assert_eq!(names, vec![("q1", "a1"), ("q2", "q2"), ("q3", "a3")]);
    }

    #[test]
    fn test_build_pairs_assigns_ids_and_offsets() {
        let page = Page::parse(
            r#"<html data-layout-height="1000"><body>
               <div class="q" data-layout-top="120" data-layout-height="40">  Hello
                 there </div></body></html>"#,
        );
        let prompt = page.select(&css(".q"))[0];
        let pairs = build_pairs(&page, "demo", vec![(prompt, prompt)]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].id, "demo-turn-0");
        assert_eq!(pairs[0].prompt_text, "Hello there");
        assert_eq!(pairs[0].top_offset, 120.0);
        assert!(pairs[0].answer_is_prompt());
    }
}
