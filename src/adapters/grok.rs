use super::{PromptAnswerPair, SiteAdapter, build_pairs};
use crate::dom::{ElementId, Page};
use crate::extract::{AttributeMatch, Cascade, FuzzyNameMatch, ValidityRules};
use crate::identity::PageIdentity;

/// User-turn markers seen across Grok releases, most specific first.
const USER_SELECTORS: &[&str] = &[
    r#"[data-message-author-role="user"]"#,
    r#"[data-testid="user-message"]"#,
    ".user-message",
    r#"div[class*="user"][class*="message"]"#,
    r#"[role="user"]"#,
    r#"div[data-sender="user"]"#,
    r#"div[data-role="user"]"#,
];

/// Grok conversations, including chats inside projects.
///
/// Grok's answer markup has no reliable boundary, so only prompts are located
/// and every pair's answer is the prompt itself. Navigation lands on the
/// prompt, which is where the user wants to be anyway.
pub struct GrokAdapter {
    prompts: Cascade,
}

impl GrokAdapter {
    pub fn new() -> Self {
        let prompts = Cascade::new("grok/prompts", ValidityRules::lenient())
            .then(AttributeMatch::new(USER_SELECTORS))
            .then(FuzzyNameMatch::user());
        Self { prompts }
    }
}

impl Default for GrokAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteAdapter for GrokAdapter {
    fn name(&self) -> &'static str {
        "Grok"
    }

    fn key(&self) -> &'static str {
        "grok"
    }

    fn is_supported(&self, identity: &PageIdentity) -> bool {
        let host = identity.host.as_str();
        if host != "grok.com" && !host.ends_with(".grok.com") {
            return false;
        }
        identity.path.starts_with("/c/")
            || (identity.path.starts_with("/project/") && identity.query.contains("chat="))
    }

    fn extract_pairs(&self, page: &Page, root: ElementId) -> Vec<PromptAnswerPair> {
        let prompts = self.prompts.run(page, root);
        let matches = prompts.elements.iter().map(|p| (*p, *p)).collect();
        build_pairs(page, self.key(), matches)
    }

    fn prompt_count(&self, page: &Page, root: ElementId) -> usize {
        self.prompts.count(page, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supported(url: &str) -> bool {
        GrokAdapter::new().is_supported(&PageIdentity::parse(url).unwrap())
    }

    #[test]
    fn test_supported_pages() {
        assert!(supported("https://grok.com/c/123"));
        assert!(supported("https://eu.grok.com/c/123"));
        assert!(supported("https://grok.com/project/p1?tab=chats&chat=42"));
        // Any query containing `chat=` counts
        assert!(supported("https://grok.com/project/p1?subchat=1"));
        assert!(!supported("https://grok.com/project/p1?tab=files"));
        assert!(!supported("https://grok.com/project/p1?chat"));
        assert!(!supported("https://grok.com/"));
        assert!(!supported("https://notgrok.com/c/123"));
    }

    #[test]
    fn test_prompts_answer_with_themselves() {
        let page = Page::parse(
            r#"<html data-layout-height="1500"><body>
                <div data-testid="user-message" data-layout-top="200" data-layout-height="50">First</div>
                <div class="response" data-layout-top="260" data-layout-height="300">Reply</div>
                <div data-testid="user-message" data-layout-top="700" data-layout-height="50">Second</div>
            </body></html>"#,
        );
        let pairs = GrokAdapter::new().extract_pairs(&page, page.root());
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(PromptAnswerPair::answer_is_prompt));
        assert_eq!(pairs[1].id, "grok-turn-1");
        assert_eq!(pairs[1].top_offset, 700.0);
    }

    #[test]
    fn test_fuzzy_fallback_finds_all_user_turns() {
        let page = Page::parse(
            r#"<html data-layout-height="2000"><body>
                <div class="chat-bubble human" data-layout-top="200" data-layout-height="50">one</div>
                <div class="chat-bubble bot" data-layout-top="300" data-layout-height="200">reply</div>
                <div class="chat-bubble from-human" data-layout-top="600" data-layout-height="50">two</div>
                <div class="turn user-turn" data-layout-top="900" data-layout-height="50">three</div>
            </body></html>"#,
        );
        let adapter = GrokAdapter::new();
        let pairs = adapter.extract_pairs(&page, page.root());
        let texts: Vec<_> = pairs.iter().map(|p| p.prompt_text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert_eq!(adapter.prompt_count(&page, page.root()), 3);
    }
}
