//! Output configuration types

use crate::navigation::theme::{self, Palette};
use crate::navigation::ThemeName;

const DEFAULT_PREVIEW_WIDTH: usize = 72;

/// Configuration for timeline output.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
    /// Colors for markers and the active line
    pub palette: &'static Palette,
    /// Maximum characters of prompt text per line
    pub preview_width: usize,
}

impl OutputConfig {
    pub fn with_theme(mut self, theme: ThemeName) -> Self {
        self.palette = theme::palette(theme);
        self
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_color: true,
            palette: theme::palette(ThemeName::default()),
            preview_width: DEFAULT_PREVIEW_WIDTH,
        }
    }
}
