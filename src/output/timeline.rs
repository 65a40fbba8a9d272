//! Console timeline of a navigation session
//!
//! One line per turn, in document order: a marker for the active or pinned
//! turn, the turn's position along the document and a preview of the prompt.

use std::io;

use termcolor::{ColorChoice, ColorSpec, NoColor, StandardStream, WriteColor};

use crate::dom::preview;
use crate::session::NavigatorSession;

use super::config::OutputConfig;

const ACTIVE_MARKER: &str = "▶";
const PINNED_MARKER: &str = "◆";
const NODE_MARKER: &str = "○";

/// Formatter for the session timeline.
pub struct TimelineFormatter {
    config: OutputConfig,
}

impl TimelineFormatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Render without colors.
    pub fn format(&self, session: &NavigatorSession) -> String {
        let mut out = NoColor::new(Vec::new());
        // Writing into a Vec cannot fail
        let _ = self.write(&mut out, session);
        String::from_utf8_lossy(&out.into_inner()).into_owned()
    }

    /// Print to stdout, colored with the configured palette.
    pub fn print(&self, session: &NavigatorSession) -> io::Result<()> {
        let choice = if self.config.use_color {
            ColorChoice::Always
        } else {
            ColorChoice::Never
        };
        let mut stdout = StandardStream::stdout(choice);
        self.write(&mut stdout, session)
    }

    fn write<W: WriteColor>(&self, out: &mut W, session: &NavigatorSession) -> io::Result<()> {
        let palette = self.config.palette;
        let index = session.index();

        out.set_color(ColorSpec::new().set_fg(Some(palette.bar())).set_bold(true))?;
        write!(out, "{}", index.adapter().name())?;
        out.reset()?;
        writeln!(
            out,
            "  {}  {} turns  theme: {}",
            session.identity(),
            index.total_count(),
            session.theme()
        )?;

        if index.total_count() == 0 {
            writeln!(out, "no conversation turns found")?;
            return Ok(());
        }

        for (i, item) in index.items().iter().enumerate() {
            let active = i == index.current_index();
            let pinned = session.is_pinned(&item.pair.id);
            let (marker, color) = if active {
                (ACTIVE_MARKER, palette.active())
            } else if pinned {
                (PINNED_MARKER, palette.pinned())
            } else {
                (NODE_MARKER, palette.node())
            };

            out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(active))?;
            write!(out, "{marker}")?;
            out.reset()?;

            let percent = item.relative_position.unwrap_or_default() * 100.0;
            write!(out, " {:>3}  {:>5.1}%  ", i + 1, percent)?;

            if active {
                out.set_color(ColorSpec::new().set_bold(true))?;
            }
            write!(out, "{}", preview(&item.pair.prompt_text, self.config.preview_width))?;
            out.reset()?;

            if active && pinned {
                out.set_color(ColorSpec::new().set_fg(Some(palette.pinned())))?;
                write!(out, "  {PINNED_MARKER}")?;
                out.reset()?;
            }
            if item.pair.answer_is_prompt() {
                write!(out, "  (prompt only)")?;
            }
            writeln!(out)?;
        }

        writeln!(out)?;
        writeln!(
            out,
            "turn {} of {}{}",
            index.current_index() + 1,
            index.total_count(),
            if session.overlay_visible() { "" } else { "  (overlay hidden)" }
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::AdapterRegistry;
    use crate::config::Settings;
    use crate::identity::PageIdentity;
    use crate::messaging::Command;
    use crate::navigation::EnvPreference;
    use crate::test_utils::{TurnAdapter, transcript_page};

    fn session(tops: &[f64]) -> (NavigatorSession, crate::dom::Page) {
        let mut registry = AdapterRegistry::empty();
        registry.register(TurnAdapter);
        let page = transcript_page(tops, 1000.0);
        let session = NavigatorSession::start(
            &registry,
            &Settings::default(),
            PageIdentity::new("chat.test", "/c/1", ""),
            &page,
            &EnvPreference::default(),
        )
        .unwrap();
        (session, page)
    }

    #[test]
    fn test_timeline_lines() {
        let (mut session, page) = session(&[0.0, 250.0, 500.0]);
        session.handle_command(Command::NextAnswer, &page);
        session.handle_command(Command::TogglePin, &page);
        session.handle_command(Command::PrevAnswer, &page);

        let output = TimelineFormatter::new(OutputConfig::default()).format(&session);
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].starts_with("Fixture  chat.test/c/1  3 turns"));
        assert_eq!(lines[1], "▶   1    0.0%  Turn 0  (prompt only)");
        assert_eq!(lines[2], "◆   2   25.0%  Turn 1  (prompt only)");
        assert_eq!(lines[3], "○   3   50.0%  Turn 2  (prompt only)");
        assert!(output.ends_with("turn 1 of 3\n"));
    }

    #[test]
    fn test_empty_timeline() {
        let (session, _page) = session(&[]);
        let output = TimelineFormatter::new(OutputConfig::default()).format(&session);
        assert!(output.contains("0 turns"));
        assert!(output.contains("no conversation turns found"));
    }

    #[test]
    fn test_hidden_overlay_is_noted() {
        let (mut session, page) = session(&[100.0]);
        session.handle_command(Command::ToggleOverlay, &page);
        let output = TimelineFormatter::new(OutputConfig::default()).format(&session);
        assert!(output.contains("turn 1 of 1  (overlay hidden)"));
    }
}
