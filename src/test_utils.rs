//! Test utilities: fixture transcripts, a manual clock and a counting layout.
//!
//! This module is only compiled for tests and benchmarks.

use std::cell::Cell;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use crate::adapters::{PromptAnswerPair, SiteAdapter, build_pairs};
use crate::dom::{ElementId, LayoutSource, Page, Rect, Viewport, css};
use crate::identity::PageIdentity;
use crate::navigation::Clock;

/// Host served by [`TurnAdapter`].
pub const FIXTURE_HOST: &str = "chat.test";

/// Adapter for fixture transcripts: every `.turn` element is a prompt that
/// answers itself. No validity rules apply.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnAdapter;

impl SiteAdapter for TurnAdapter {
    fn name(&self) -> &'static str {
        "Fixture"
    }

    fn key(&self) -> &'static str {
        "fixture"
    }

    fn is_supported(&self, identity: &PageIdentity) -> bool {
        identity.host == FIXTURE_HOST
    }

    fn extract_pairs(&self, page: &Page, root: ElementId) -> Vec<PromptAnswerPair> {
        let turns = page.select_within(root, &css(".turn"));
        build_pairs(page, self.key(), turns.into_iter().map(|t| (t, t)).collect())
    }

    fn prompt_count(&self, page: &Page, root: ElementId) -> usize {
        page.select_within(root, &css(".turn")).len()
    }
}

/// Markup with one `.turn` per entry of `tops`, in the given order.
///
/// Turns are 120px tall and read `Turn 0`, `Turn 1`, ...
pub fn transcript(tops: &[f64], document_height: f64) -> String {
    let mut html = format!(r#"<html data-layout-height="{document_height}"><body><main>"#);
    for (i, top) in tops.iter().enumerate() {
        let _ = write!(
            html,
            r#"<div class="turn" data-layout-top="{top}" data-layout-height="120">Turn {i}</div>"#
        );
    }
    html.push_str("</main></body></html>");
    html
}

pub fn transcript_page(tops: &[f64], document_height: f64) -> Page {
    Page::parse(&transcript(tops, document_height))
}

/// ChatGPT-style conversation markup with annotated layout.
///
/// Includes a short header and a compose form, which extraction must skip.
pub fn chatgpt_transcript(turns: &[(&str, &str)]) -> String {
    let mut html = String::new();
    let mut top = 120.0;
    let mut body = String::new();
    for (i, (prompt, answer)) in turns.iter().enumerate() {
        let _ = write!(
            body,
            r#"<article data-testid="conversation-turn-{user}" data-layout-top="{top}" data-layout-height="120"><div data-message-author-role="user" data-layout-top="{top}" data-layout-height="120">{prompt}</div></article>"#,
            user = i * 2 + 1,
        );
        top += 140.0;
        let _ = write!(
            body,
            r#"<article data-testid="conversation-turn-{bot}" data-layout-top="{top}" data-layout-height="400"><div data-message-author-role="assistant" data-layout-top="{top}" data-layout-height="400">{answer}</div></article>"#,
            bot = i * 2 + 2,
        );
        top += 420.0;
    }
    let height = top + 200.0;
    let _ = write!(
        html,
        r#"<html data-layout-height="{height}"><head><title>ChatGPT</title></head><body>
<header data-layout-top="0" data-layout-height="56"><div class="model-picker">ChatGPT 4o</div></header>
<main>{body}</main>
<form data-layout-top="{top}" data-layout-height="120"><div data-message-author-role="user"><textarea placeholder="Message ChatGPT"></textarea></div></form>
</body></html>"#
    );
    html
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Layout that delegates to a page and counts geometry reads.
pub struct CountingLayout<'a> {
    page: &'a Page,
    reads: Cell<usize>,
}

impl<'a> CountingLayout<'a> {
    pub fn new(page: &'a Page) -> Self {
        Self {
            page,
            reads: Cell::new(0),
        }
    }

    /// Number of `bounding_rect` calls so far.
    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl LayoutSource for CountingLayout<'_> {
    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        self.reads.set(self.reads.get() + 1);
        self.page.bounding_rect(element)
    }

    fn viewport(&self) -> Viewport {
        self.page.viewport()
    }

    fn document_height(&self) -> f64 {
        self.page.document_height()
    }
}

/// Temporary directory for snapshot and settings files.
///
/// Cleaned up when dropped.
pub struct SnapshotDir {
    dir: TempDir,
}

impl SnapshotDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file, creating parent directories as needed.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(name);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }
}

impl Default for SnapshotDir {
    fn default() -> Self {
        Self::new()
    }
}
