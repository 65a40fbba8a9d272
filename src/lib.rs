//! chatnav - find prompt/answer turns in chat transcripts and navigate them
//!
//! A [`Page`] snapshot goes through the [`AdapterRegistry`], which picks the
//! [`SiteAdapter`] for the page identity. The adapter's extraction cascade
//! yields [`PromptAnswerPair`]s, and an [`IndexManager`] keeps them sorted with
//! a cursor that follows scrolling and prev/next [`Command`]s.

pub mod adapters;
pub mod config;
pub mod dom;
pub mod error;
pub mod extract;
pub mod identity;
pub mod messaging;
pub mod navigation;
pub mod output;
pub mod session;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::{AdapterRegistry, ChatGptAdapter, GrokAdapter, PromptAnswerPair, SiteAdapter};
pub use config::Settings;
pub use dom::{ElementId, LayoutSource, Page, Rect, Viewport};
pub use error::{Error, Result};
pub use extract::{Cascade, CascadeOutcome, Strategy, ValidityRules};
pub use identity::PageIdentity;
pub use messaging::{Command, CommandReceiver, CommandSender, channel};
pub use navigation::{EnvPreference, IndexManager, PromptAnswerItem, ThemeMode, ThemeName};
pub use output::{OutputConfig, SessionReport, TimelineFormatter, print_json};
pub use session::{NavigationSignal, Navigator, NavigatorSession};
