//! Page-bound navigation sessions
//!
//! A [`NavigatorSession`] lives exactly as long as one page identity: it owns
//! the [`IndexManager`] for that page and turns scroll, mutation and command
//! events into [`NavigationSignal`]s for the rendering layer. [`Navigator`]
//! swaps sessions as pages come and go and pumps the command channel.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::adapters::AdapterRegistry;
use crate::config::Settings;
use crate::dom::Page;
use crate::identity::PageIdentity;
use crate::messaging::{Command, CommandReceiver};
use crate::navigation::theme::{self, Palette};
use crate::navigation::{
    ColorSchemePreference, DEFAULT_FRESHNESS, IndexManager, PromptAnswerItem, ThemeName,
};

/// What the rendering layer needs to draw the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationSignal {
    pub adapter: &'static str,
    pub theme: ThemeName,
    pub current_index: usize,
    pub total: usize,
    pub current: Option<ItemSummary>,
    /// Relative position of every item, in item order
    pub positions: Vec<f64>,
    /// Pin flag of every item, in item order
    pub pinned: Vec<bool>,
    pub overlay_visible: bool,
    /// Document offset to scroll to after a navigation command
    pub scroll_target: Option<f64>,
}

/// The current item, as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSummary {
    pub id: String,
    pub prompt_text: String,
    pub top_offset: f64,
    /// The adapter could not locate the answer and points at the prompt
    pub answer_is_prompt: bool,
}

impl From<&PromptAnswerItem> for ItemSummary {
    fn from(item: &PromptAnswerItem) -> Self {
        Self {
            id: item.pair.id.clone(),
            prompt_text: item.pair.prompt_text.clone(),
            top_offset: item.pair.top_offset,
            answer_is_prompt: item.pair.answer_is_prompt(),
        }
    }
}

/// Navigation state for one page identity.
pub struct NavigatorSession {
    identity: PageIdentity,
    index: IndexManager,
    theme: ThemeName,
    overlay_visible: bool,
    pinned: BTreeSet<String>,
}

impl NavigatorSession {
    /// Bind a session to the page, or `None` when no enabled adapter supports it.
    pub fn start(
        registry: &AdapterRegistry,
        settings: &Settings,
        identity: PageIdentity,
        page: &Page,
        preference: &dyn ColorSchemePreference,
    ) -> Option<Self> {
        let adapter = registry.select_enabled(&identity, settings)?;

        let freshness = settings.freshness().unwrap_or_else(|e| {
            warn!("{e}; using default geometry freshness");
            DEFAULT_FRESHNESS
        });
        let mut index = IndexManager::new(adapter).with_freshness(freshness);
        index.refresh(page);

        let theme = theme::resolve(settings.theme_mode(), preference);
        info!(
            page = %identity,
            adapter = index.adapter().name(),
            items = index.total_count(),
            %theme,
            "navigator session started"
        );

        Some(Self {
            identity,
            index,
            theme,
            overlay_visible: true,
            pinned: BTreeSet::new(),
        })
    }

    pub fn identity(&self) -> &PageIdentity {
        &self.identity
    }

    pub fn is_bound_to(&self, identity: &PageIdentity) -> bool {
        &self.identity == identity
    }

    pub fn index(&self) -> &IndexManager {
        &self.index
    }

    pub fn theme(&self) -> ThemeName {
        self.theme
    }

    pub fn palette(&self) -> &'static Palette {
        theme::palette(self.theme)
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn is_pinned(&self, id: &str) -> bool {
        self.pinned.contains(id)
    }

    /// Apply a command and report the resulting state.
    pub fn handle_command(&mut self, command: Command, page: &Page) -> NavigationSignal {
        match command {
            Command::PrevAnswer | Command::NextAnswer => {
                if self.index.needs_refresh(page) {
                    self.index.refresh(page);
                }
                let moved = if command == Command::PrevAnswer {
                    self.index.move_to_prev()
                } else {
                    self.index.move_to_next()
                };
                if !moved {
                    debug!(?command, index = self.index.current_index(), "already at boundary");
                }
                let target = self.index.current_item().map(|item| item.pair.top_offset);
                self.signal(target)
            }
            Command::ToggleOverlay => {
                self.overlay_visible = !self.overlay_visible;
                debug!(visible = self.overlay_visible, "overlay toggled");
                self.signal(None)
            }
            Command::TogglePin => {
                if let Some(id) = self.index.current_item().map(|item| item.pair.id.clone()) {
                    if !self.pinned.remove(&id) {
                        self.pinned.insert(id);
                    }
                }
                self.signal(None)
            }
        }
    }

    /// Follow the scroll position; a signal is returned only when the cursor moved.
    pub fn on_scroll(&mut self, page: &Page, scroll_y: f64) -> Option<NavigationSignal> {
        self.index
            .update_current_index_by_scroll(page, scroll_y)
            .then(|| self.signal(None))
    }

    /// React to a document change. Returns a signal when the index changed.
    pub fn on_mutation(&mut self, page: &Page) -> Option<NavigationSignal> {
        if self.index.needs_refresh(page) {
            self.index.refresh(page);
            return Some(self.signal(None));
        }
        self.index
            .sync_document_height(page)
            .then(|| self.signal(None))
    }

    /// Current state without a scroll request.
    pub fn snapshot(&self) -> NavigationSignal {
        self.signal(None)
    }

    fn signal(&self, scroll_target: Option<f64>) -> NavigationSignal {
        let items = self.index.items();
        NavigationSignal {
            adapter: self.index.adapter().name(),
            theme: self.theme,
            current_index: self.index.current_index(),
            total: self.index.total_count(),
            current: self.index.current_item().map(ItemSummary::from),
            positions: self.index.relative_positions(),
            pinned: items.iter().map(|item| self.is_pinned(&item.pair.id)).collect(),
            overlay_visible: self.overlay_visible,
            scroll_target,
        }
    }
}

/// Owns the session for whatever page is currently loaded.
pub struct Navigator {
    registry: AdapterRegistry,
    settings: Settings,
    preference: Box<dyn ColorSchemePreference>,
    commands: CommandReceiver,
    session: Option<NavigatorSession>,
}

impl Navigator {
    pub fn new(
        registry: AdapterRegistry,
        settings: Settings,
        preference: impl ColorSchemePreference + 'static,
        commands: CommandReceiver,
    ) -> Self {
        Self {
            registry,
            settings,
            preference: Box::new(preference),
            commands,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&NavigatorSession> {
        self.session.as_ref()
    }

    /// A page finished loading.
    ///
    /// The same identity keeps its session and is treated as a mutation; a new
    /// identity replaces the session (or clears it on unsupported pages).
    pub fn on_page_load(
        &mut self,
        identity: PageIdentity,
        page: &Page,
    ) -> Option<NavigationSignal> {
        if let Some(session) = self.session.as_mut().filter(|s| s.is_bound_to(&identity)) {
            return session.on_mutation(page);
        }

        self.session = NavigatorSession::start(
            &self.registry,
            &self.settings,
            identity,
            page,
            self.preference.as_ref(),
        );
        self.session.as_ref().map(NavigatorSession::snapshot)
    }

    /// Drop the session of a page that went away.
    pub fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(page = %session.identity(), "navigator session ended");
        }
    }

    pub fn on_scroll(&mut self, page: &Page, scroll_y: f64) -> Option<NavigationSignal> {
        self.session.as_mut()?.on_scroll(page, scroll_y)
    }

    pub fn on_mutation(&mut self, page: &Page) -> Option<NavigationSignal> {
        self.session.as_mut()?.on_mutation(page)
    }

    /// Apply every pending command. Without a session commands have no effect.
    pub fn pump(&mut self, page: &Page) -> Vec<NavigationSignal> {
        let commands = self.commands.drain();
        let Some(session) = self.session.as_mut() else {
            if !commands.is_empty() {
                debug!(dropped = commands.len(), "no active session, ignoring commands");
            }
            return Vec::new();
        };
        commands
            .into_iter()
            .map(|command| session.handle_command(command, page))
            .collect()
    }
}
