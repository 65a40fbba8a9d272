//! Timeline color themes

use std::fmt;

use serde::Serialize;
use termcolor::Color;
use tracing::debug;

/// Environment variable that forces the light/dark preference.
pub const COLOR_SCHEME_ENV: &str = "CHATNAV_COLOR_SCHEME";

/// Colors for one timeline theme, as CSS color strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub name: &'static str,
    /// Active node fill
    pub active_color: &'static str,
    pub active_shadow: &'static str,
    /// Inactive node fill
    pub default_node_color: &'static str,
    pub timeline_bar_color: &'static str,
    /// Fill for pinned nodes
    pub pinned_color: &'static str,
}

impl Palette {
    pub fn active(&self) -> Color {
        terminal_color(self.active_color)
    }

    pub fn node(&self) -> Color {
        terminal_color(self.default_node_color)
    }

    pub fn bar(&self) -> Color {
        terminal_color(self.timeline_bar_color)
    }

    pub fn pinned(&self) -> Color {
        terminal_color(self.pinned_color)
    }
}

const LIGHT: Palette = Palette {
    name: "Light",
    active_color: "#4CAF50",
    active_shadow: "rgba(76, 175, 80, 0.5)",
    default_node_color: "#888888",
    timeline_bar_color: "rgba(150, 150, 150, 0.3)",
    pinned_color: "#FF9800",
};

const DARK: Palette = Palette {
    name: "Dark",
    active_color: "#E0E0E0",
    active_shadow: "rgba(255, 255, 255, 0.3)",
    default_node_color: "#FFFFFF",
    timeline_bar_color: "rgba(255, 255, 255, 0.2)",
    pinned_color: "#FF9800",
};

const BLUE: Palette = Palette {
    name: "Sky blue",
    active_color: "#2196F3",
    active_shadow: "rgba(33, 150, 243, 0.5)",
    default_node_color: "#90CAF9",
    timeline_bar_color: "rgba(33, 150, 243, 0.3)",
    pinned_color: "#0D47A1",
};

const LAVENDER: Palette = Palette {
    name: "Lavender",
    active_color: "#9C88FF",
    active_shadow: "rgba(156, 136, 255, 0.5)",
    default_node_color: "#D1C4E9",
    timeline_bar_color: "rgba(156, 136, 255, 0.3)",
    pinned_color: "#673AB7",
};

/// A concrete palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Light,
    Dark,
    Blue,
    Lavender,
}

impl ThemeName {
    pub const ALL: [ThemeName; 4] = [
        ThemeName::Light,
        ThemeName::Dark,
        ThemeName::Blue,
        ThemeName::Lavender,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::Light => "light",
            ThemeName::Dark => "dark",
            ThemeName::Blue => "blue",
            ThemeName::Lavender => "lavender",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configured theme selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    /// Follow the platform light/dark preference
    #[default]
    Auto,
    Named(ThemeName),
}

impl ThemeMode {
    /// Parse a setting value. Unknown names select the light theme.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("auto") {
            return ThemeMode::Auto;
        }
        match ThemeName::from_name(value) {
            Some(theme) => ThemeMode::Named(theme),
            None => {
                debug!(value, "unknown theme, using light");
                ThemeMode::Named(ThemeName::Light)
            }
        }
    }
}

/// Platform light/dark preference, read when a theme is resolved.
pub trait ColorSchemePreference {
    fn prefers_dark(&self) -> bool;
}

/// Preference read from the environment.
///
/// `CHATNAV_COLOR_SCHEME=dark|light` wins; otherwise the terminal's
/// `COLORFGBG` background index decides. Defaults to light.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvPreference {
    scheme: Option<String>,
    colorfgbg: Option<String>,
}

impl EnvPreference {
    pub fn new(scheme: Option<&str>, colorfgbg: Option<&str>) -> Self {
        Self {
            scheme: scheme.map(str::to_string),
            colorfgbg: colorfgbg.map(str::to_string),
        }
    }

    pub fn from_env() -> Self {
        Self {
            scheme: std::env::var(COLOR_SCHEME_ENV).ok(),
            colorfgbg: std::env::var("COLORFGBG").ok(),
        }
    }
}

impl ColorSchemePreference for EnvPreference {
    fn prefers_dark(&self) -> bool {
        if let Some(scheme) = self.scheme.as_deref().map(str::trim) {
            if scheme.eq_ignore_ascii_case("dark") {
                return true;
            }
            if scheme.eq_ignore_ascii_case("light") {
                return false;
            }
        }
        // "fg;bg" or "fg;default;bg"; dark backgrounds are 0-6 and 8
        self.colorfgbg
            .as_deref()
            .and_then(|value| value.rsplit(';').next())
            .and_then(|bg| bg.trim().parse::<u8>().ok())
            .is_some_and(|bg| bg <= 6 || bg == 8)
    }
}

/// Concrete theme for `mode`; `Auto` consults `preference` now.
pub fn resolve(mode: ThemeMode, preference: &dyn ColorSchemePreference) -> ThemeName {
    match mode {
        ThemeMode::Named(theme) => theme,
        ThemeMode::Auto if preference.prefers_dark() => ThemeName::Dark,
        ThemeMode::Auto => ThemeName::Light,
    }
}

pub fn palette(theme: ThemeName) -> &'static Palette {
    match theme {
        ThemeName::Light => &LIGHT,
        ThemeName::Dark => &DARK,
        ThemeName::Blue => &BLUE,
        ThemeName::Lavender => &LAVENDER,
    }
}

/// Convert `#rrggbb` or `rgb[a](r, g, b[, a])` to a terminal color.
pub fn parse_css_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?));
    }

    let inner = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let mut channels = inner.split(',').map(|c| c.trim().parse::<u8>().ok());
    Some(Color::Rgb(
        channels.next()??,
        channels.next()??,
        channels.next()??,
    ))
}

fn terminal_color(value: &str) -> Color {
    parse_css_color(value).unwrap_or(Color::White)
}
