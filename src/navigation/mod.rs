//! Navigation state over extracted turns
//!
//! [`IndexManager`] owns the sorted items and the cursor; [`GeometryCache`]
//! keeps layout reads cheap while scrolling; [`theme`] maps the configured
//! mode to a palette for rendering.

mod cache;
mod index;
pub mod theme;

pub use cache::{CachedGeometry, Clock, DEFAULT_FRESHNESS, GeometryCache, SystemClock};
pub use index::{IndexManager, PromptAnswerItem};
pub use theme::{ColorSchemePreference, EnvPreference, Palette, ThemeMode, ThemeName};
