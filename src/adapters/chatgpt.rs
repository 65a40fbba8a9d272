use tracing::debug;

use super::{PromptAnswerPair, SiteAdapter, build_pairs, pair_answers};
use crate::dom::{ElementId, Page};
use crate::extract::{
    AttributeMatch, Cascade, FuzzyNameMatch, Parity, ScopedContainer, StructuralPosition,
    ValidityRules,
};
use crate::identity::PageIdentity;

const HOSTS: &[&str] = &["chatgpt.com", "chat.openai.com"];

const USER_MARKER: &str = r#"[data-message-author-role="user"]"#;
const ASSISTANT_MARKER: &str = r#"[data-message-author-role="assistant"]"#;
const TURN_CONTAINER: &str = r#"[data-testid^="conversation-turn"]"#;

/// ChatGPT conversations.
///
/// Turns carry `data-message-author-role`, usually nested in
/// `conversation-turn` containers inside `main > article` blocks.
pub struct ChatGptAdapter {
    prompts: Cascade,
    answers: Cascade,
}

impl ChatGptAdapter {
    pub fn new() -> Self {
        let prompts = Cascade::new("chatgpt/prompts", ValidityRules::lenient())
            .then(AttributeMatch::new(&[USER_MARKER]))
            .then(ScopedContainer::new(TURN_CONTAINER, USER_MARKER))
            .then(StructuralPosition::new(
                "main",
                "article",
                USER_MARKER,
                Parity::Even,
            ))
            .then(FuzzyNameMatch::user());

        let answers = Cascade::new("chatgpt/answers", ValidityRules::strict())
            .then(AttributeMatch::new(&[ASSISTANT_MARKER]))
            .then(ScopedContainer::new(TURN_CONTAINER, ASSISTANT_MARKER))
            .then(StructuralPosition::new(
                "main",
                "article",
                ASSISTANT_MARKER,
                Parity::Odd,
            ));

        Self { prompts, answers }
    }
}

impl Default for ChatGptAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteAdapter for ChatGptAdapter {
    fn name(&self) -> &'static str {
        "ChatGPT"
    }

    fn key(&self) -> &'static str {
        "chatgpt"
    }

    fn is_supported(&self, identity: &PageIdentity) -> bool {
        HOSTS.contains(&identity.host.as_str())
            && (identity.path == "/" || identity.path.starts_with("/c/"))
    }

    fn extract_pairs(&self, page: &Page, root: ElementId) -> Vec<PromptAnswerPair> {
        let prompts = self.prompts.run(page, root);
        let answers = self.answers.run(page, root);

        let matches = if prompts.is_empty() {
            // Answer-only transcripts (shared links, partial renders)
            debug!(answers = answers.len(), "no prompts found, pairing answers with themselves");
            answers.elements.iter().map(|a| (*a, *a)).collect()
        } else {
            pair_answers(page, &prompts.elements, &answers.elements)
        };

        build_pairs(page, self.key(), matches)
    }

    fn prompt_count(&self, page: &Page, root: ElementId) -> usize {
        match self.prompts.count(page, root) {
            0 => self.answers.count(page, root),
            n => n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supported(url: &str) -> bool {
        ChatGptAdapter::new().is_supported(&PageIdentity::parse(url).unwrap())
    }

    #[test]
    fn test_supported_pages() {
        assert!(supported("https://chatgpt.com/"));
        assert!(supported("https://chatgpt.com/c/abc-123"));
        assert!(supported("https://chat.openai.com/c/abc"));
        assert!(!supported("https://chatgpt.com/gpts"));
        assert!(!supported("https://example.com/c/abc"));
        assert!(!supported("https://grok.com/c/abc"));
    }

    const ROLE_MARKUP: &str = r#"<html data-layout-height="2000"><body><main>
        <div data-testid="conversation-turn-1" data-layout-top="150" data-layout-height="80">
          <div data-message-author-role="user" data-layout-top="150" data-layout-height="80">How do I reverse a Vec?</div>
        </div>
        <div data-testid="conversation-turn-2" data-layout-top="250" data-layout-height="300">
          <div data-message-author-role="assistant">Call <code>reverse()</code> on it, which reverses the vector in place.</div>
        </div>
        <div data-testid="conversation-turn-3" data-layout-top="600" data-layout-height="80">
          <div data-message-author-role="user" data-layout-top="600" data-layout-height="80">And an iterator?</div>
        </div>
        <div data-testid="conversation-turn-4" data-layout-top="700" data-layout-height="300">
          <div data-message-author-role="assistant">Use <code>iter().rev()</code> to walk the elements back to front.</div>
        </div>
        <form data-layout-top="1900" data-layout-height="80"><div data-message-author-role="user"><textarea></textarea></div></form>
    </main></body></html>"#;

    #[test]
    fn test_pairs_prompts_with_following_answers() {
        let page = Page::parse(ROLE_MARKUP);
        let pairs = ChatGptAdapter::new().extract_pairs(&page, page.root());

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].id, "chatgpt-turn-0");
        assert_eq!(pairs[0].prompt_text, "How do I reverse a Vec?");
        assert_eq!(pairs[1].prompt_text, "And an iterator?");
        assert!(pairs.iter().all(|p| !p.answer_is_prompt()));
        assert!(pairs[0].answer < pairs[1].prompt);
        assert_eq!(pairs[0].top_offset, 150.0);
        assert_eq!(pairs[1].top_offset, 600.0);
    }

    #[test]
    fn test_prompt_count_matches_extraction() {
        let page = Page::parse(ROLE_MARKUP);
        let adapter = ChatGptAdapter::new();
        assert_eq!(adapter.prompt_count(&page, page.root()), 2);
    }

    #[test]
    fn test_structural_fallback_without_role_attributes() {
        let page = Page::parse(
            r#"<html data-layout-height="2000"><body><main>
                <article data-layout-top="120" data-layout-height="60">What is a trait object?</article>
                <article data-layout-top="200" data-layout-height="300">A trait object is a value of type dyn Trait that uses dynamic dispatch.</article>
                <article data-layout-top="520" data-layout-height="60">Are they Sized?</article>
                <article data-layout-top="600" data-layout-height="300">No, dyn Trait is unsized and lives behind a pointer such as Box or a reference.</article>
            </main></body></html>"#,
        );
        let pairs = ChatGptAdapter::new().extract_pairs(&page, page.root());
        let texts: Vec<_> = pairs.iter().map(|p| p.prompt_text.as_str()).collect();
        assert_eq!(texts, vec!["What is a trait object?", "Are they Sized?"]);
        assert!(pairs.iter().all(|p| !p.answer_is_prompt()));
    }

    #[test]
    fn test_answers_without_prompts_pair_with_themselves() {
        let page = Page::parse(
            r#"<html data-layout-height="1000"><body>
                <div data-message-author-role="assistant" data-layout-top="300" data-layout-height="200">Here is a fairly long answer that passes the strict rules.</div>
            </body></html>"#,
        );
        let adapter = ChatGptAdapter::new();
        let pairs = adapter.extract_pairs(&page, page.root());
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].answer_is_prompt());
        assert_eq!(adapter.prompt_count(&page, page.root()), 1);
    }

    #[test]
    fn test_empty_page_yields_no_pairs() {
        let page = Page::parse("<html><body><main></main></body></html>");
        let adapter = ChatGptAdapter::new();
        assert!(adapter.extract_pairs(&page, page.root()).is_empty());
        assert_eq!(adapter.prompt_count(&page, page.root()), 0);
    }
}
