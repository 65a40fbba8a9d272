//! Edge cases of extraction and navigation on saved snapshots


use std::rc::Rc;
use std::time::Duration;

use chatnav::dom::Viewport;
use chatnav::extract::{AttributeMatch, FuzzyNameMatch};
use chatnav::navigation::{ColorSchemePreference, EnvPreference};
use chatnav::test_utils::{CountingLayout, ManualClock, TurnAdapter, chatgpt_transcript};
use chatnav::{
    AdapterRegistry, Cascade, ChatGptAdapter, Command, GrokAdapter, IndexManager, Navigator,
    Page, PageIdentity, Settings, SiteAdapter, ValidityRules, channel,
};
use harness::{CHATGPT_URL, GROK_URL, read_fixture};
use pretty_assertions::assert_eq;

fn texts(adapter: &dyn SiteAdapter, page: &Page) -> Vec<String> {
    adapter
        .extract_pairs(page, page.root())
        .into_iter()
        .map(|pair| pair.prompt_text)
        .collect()
}

// ============================================================================
// Extraction cascade
// ============================================================================

#[test]
fn test_fuzzy_fallback_returns_exactly_its_results() {
    let page = Page::parse(&read_fixture("fuzzy.html"));
    let adapter = GrokAdapter::new();

    assert_eq!(
        texts(&adapter, &page),
        vec![
            "How do I reverse a vector?",
            "And without mutating it?",
            "Perfect, thanks",
        ]
    );
    assert_eq!(adapter.prompt_count(&page, page.root()), 3);
}

#[test]
fn test_rejected_attribute_hits_do_not_mix_with_fallback() {
    // The only attribute hit is a compose box, so it is filtered out and the
    // fuzzy strategy decides alone
    let mut markup = read_fixture("fuzzy.html");
    markup = markup.replace(
        "</body>",
        r#"<div data-role="user" data-layout-top="2200" data-layout-height="100"><textarea></textarea></div></body>"#,
    );
    let page = Page::parse(&markup);

    let cascade = Cascade::new("test/prompts", ValidityRules::lenient())
        .then(AttributeMatch::new(&[r#"div[data-role="user"]"#]))
        .then(FuzzyNameMatch::user());
    let outcome = cascade.run(&page, page.root());

    assert_eq!(outcome.strategy, Some("fuzzy-name"));
    assert_eq!(outcome.len(), 3);
    assert_eq!(outcome.attempts[0].candidates, 1);
    assert_eq!(outcome.attempts[0].accepted, 0);
}

#[test]
fn test_compose_box_user_marker_is_excluded() {
    let page = Page::parse(&read_fixture("chatgpt.html"));
    let adapter = ChatGptAdapter::new();
    let pairs = adapter.extract_pairs(&page, page.root());

    assert_eq!(pairs.len(), 3);
    for pair in &pairs {
        let parent = page.parent(pair.prompt).and_then(|p| page.tag(p));
        assert_ne!(parent, Some("form"));
        assert!(!pair.prompt_text.is_empty());
    }
}

#[test]
fn test_short_answer_falls_back_to_prompt() {
    let page = Page::parse(&read_fixture("chatgpt.html"));
    let pairs = ChatGptAdapter::new().extract_pairs(&page, page.root());

    assert!(!pairs[0].answer_is_prompt());
    // Code block keeps a short answer
    assert!(!pairs[1].answer_is_prompt());
    // "Ok" is too short for a strict answer
    assert!(pairs[2].answer_is_prompt());
}

#[test]
fn test_grok_compose_box_is_excluded() {
    let page = Page::parse(&read_fixture("grok.html"));
    let pairs = GrokAdapter::new().extract_pairs(&page, page.root());

    assert_eq!(pairs.len(), 3);
    assert!(pairs.iter().all(|pair| pair.answer_is_prompt()));
    assert_eq!(pairs[2].prompt_text, "");
}

#[test]
fn test_pair_ids_are_unique_and_stable() {
    let markup = read_fixture("chatgpt.html");
    let adapter = ChatGptAdapter::new();
    let ids = |page: &Page| -> Vec<String> {
        adapter
            .extract_pairs(page, page.root())
            .into_iter()
            .map(|pair| pair.id)
            .collect()
    };

    let first = ids(&Page::parse(&markup));
    let second = ids(&Page::parse(&markup));

    assert_eq!(first, vec!["chatgpt-turn-0", "chatgpt-turn-1", "chatgpt-turn-2"]);
    assert_eq!(first, second);
}

#[test]
fn test_registry_picks_by_url() {
    let registry = AdapterRegistry::builtin();
    let chatgpt = registry
        .select_adapter(&PageIdentity::parse(CHATGPT_URL).unwrap())
        .unwrap();
    let grok = registry
        .select_adapter(&PageIdentity::parse(GROK_URL).unwrap())
        .unwrap();

    assert_eq!(chatgpt.key(), "chatgpt");
    assert_eq!(grok.key(), "grok");
    assert!(
        registry
            .select_adapter(&PageIdentity::parse("https://chatgpt.com/gpts").unwrap())
            .is_none()
    );
}

// ============================================================================
// Index manager
// ============================================================================

#[test]
fn test_index_over_generated_transcript() {
    let turns: Vec<(String, String)> = (0..20)
        .map(|i| {
            (
                format!("Question number {i}"),
                format!("Answer number {i}, long enough to count as a real answer."),
            )
        })
        .collect();
    let borrowed: Vec<(&str, &str)> = turns
        .iter()
        .map(|(p, a)| (p.as_str(), a.as_str()))
        .collect();
    let page = Page::parse(&chatgpt_transcript(&borrowed));

    let mut index = IndexManager::new(Rc::new(ChatGptAdapter::new()));
    index.refresh(&page);

    assert_eq!(index.total_count(), 20);
    let positions = index.relative_positions();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(positions.iter().all(|p| (0.0..=1.0).contains(p)));
    assert!(index.items().iter().all(|item| !item.pair.answer_is_prompt()));
}

#[test]
fn test_mutation_is_detected_and_refreshed() {
    let mut markup = read_fixture("chatgpt.html");
    let page = Page::parse(&markup);
    let mut index = IndexManager::new(Rc::new(ChatGptAdapter::new()));
    index.refresh(&page);
    index.set_current_index(2);
    assert!(!index.needs_refresh(&page));

    // A new turn arrives
    markup = markup.replace(
        "</main>",
        r#"<article data-layout-top="1640" data-layout-height="100"><div data-message-author-role="user" data-layout-top="1640" data-layout-height="100">One more question</div></article></main>"#,
    );
    let grown = Page::parse(&markup);
    assert!(index.needs_refresh(&grown));

    index.refresh(&grown);
    assert_eq!(index.total_count(), 4);
    assert_eq!(index.current_index(), 2, "cursor survives a refresh");
    assert!(!index.needs_refresh(&grown));
}

#[test]
fn test_cursor_clamped_when_turns_disappear() {
    let markup = read_fixture("chatgpt.html");
    let page = Page::parse(&markup);
    let mut index = IndexManager::new(Rc::new(ChatGptAdapter::new()));
    index.refresh(&page);
    index.set_current_index(2);

    let empty = Page::parse("<html><body><main></main></body></html>");
    index.refresh(&empty);
    assert_eq!(index.total_count(), 0);
    assert_eq!(index.current_index(), 0);
    assert!(!index.move_to_next());
    assert!(!index.move_to_prev());
    assert!(index.current_item().is_none());
}

#[test]
fn test_scroll_uses_cache_within_freshness() {
    let mut page = Page::parse(&read_fixture("chatgpt.html")).with_viewport(Viewport::new(0.0, 800.0));
    let clock = ManualClock::new();
    let mut index = IndexManager::new(Rc::new(ChatGptAdapter::new()))
        .with_freshness(Duration::from_millis(500))
        .with_clock(clock.clone());
    index.refresh(&page);

    let scroll_y = page.scroll_to(650.0);
    let layout = CountingLayout::new(&page);
    assert!(index.update_current_index_by_scroll(&layout, scroll_y));
    assert_eq!(index.current_index(), 1);
    let reads = layout.reads();

    clock.advance(Duration::from_millis(100));
    index.update_current_index_by_scroll(&layout, scroll_y);
    assert_eq!(layout.reads(), reads, "fresh cache entries are reused");

    clock.advance(Duration::from_millis(600));
    index.update_current_index_by_scroll(&layout, scroll_y);
    assert!(layout.reads() > reads, "stale entries are read again");
}

#[test]
fn test_short_prompts_survive_refresh_while_scrolled() {
    let mut page =
        Page::parse(&read_fixture("grok.html")).with_viewport(Viewport::new(0.0, 800.0));
    let mut index = IndexManager::new(Rc::new(GrokAdapter::new()));
    index.refresh(&page);
    assert_eq!(index.total_count(), 3);

    // The first two 80px prompts now sit above the viewport
    page.scroll_to(900.0);
    assert!(!index.needs_refresh(&page));
    index.refresh(&page);
    assert_eq!(index.total_count(), 3);
}

#[test]
fn test_scroll_to_clamps_to_document() {
    let mut page = Page::parse(&read_fixture("chatgpt.html")).with_viewport(Viewport::new(0.0, 800.0));
    assert_eq!(page.scroll_to(-20.0), 0.0);
    assert_eq!(page.scroll_to(5000.0), 1200.0);
}

// ============================================================================
// Navigator
// ============================================================================

#[test]
fn test_navigator_replaces_session_on_new_page() {
    let mut registry = AdapterRegistry::builtin();
    registry.register(TurnAdapter);
    let (sender, receiver) = channel();
    let mut navigator = Navigator::new(
        registry,
        Settings::default(),
        EnvPreference::new(Some("dark"), None),
        receiver,
    );

    let chatgpt = Page::parse(&read_fixture("chatgpt.html"));
    let signal = navigator
        .on_page_load(PageIdentity::parse(CHATGPT_URL).unwrap(), &chatgpt)
        .unwrap();
    assert_eq!(signal.adapter, "ChatGPT");
    assert_eq!(signal.theme.as_str(), "dark");

    sender.send(Command::NextAnswer).unwrap();
    let signals = navigator.pump(&chatgpt);
    assert_eq!(signals[0].scroll_target, Some(700.0));

    let grok = Page::parse(&read_fixture("grok.html"));
    let signal = navigator
        .on_page_load(PageIdentity::parse(GROK_URL).unwrap(), &grok)
        .unwrap();
    assert_eq!(signal.adapter, "Grok");
    assert_eq!(signal.current_index, 0, "a new page starts a fresh cursor");

    assert!(
        navigator
            .on_page_load(PageIdentity::parse("https://example.com/").unwrap(), &grok)
            .is_none()
    );
    assert!(navigator.session().is_none());
    sender.send(Command::NextAnswer).unwrap();
    assert!(navigator.pump(&grok).is_empty());
}

#[test]
fn test_environment_preference_parsing() {
    assert!(EnvPreference::new(None, Some("15;0")).prefers_dark());
    assert!(!EnvPreference::new(None, Some("0;15")).prefers_dark());
    assert!(!EnvPreference::new(Some("light"), Some("15;0")).prefers_dark());
}
