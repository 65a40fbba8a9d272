//! CLI entry point for chatnav

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use chatnav::config::parse_duration;
use chatnav::dom::Viewport;
use chatnav::{
    AdapterRegistry, Command, EnvPreference, Navigator, OutputConfig, Page, PageIdentity,
    SessionReport, Settings, TimelineFormatter, channel, print_json,
};
use tracing_subscriber::EnvFilter;

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // https://no-color.org/
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "chatnav")]
#[command(about = "Index the prompt/answer turns of a saved chat page and step through them")]
#[command(version)]
struct Args {
    /// Saved HTML snapshot of the chat page
    file: PathBuf,

    /// Address the snapshot was taken from; picks the site adapter
    #[arg(short, long)]
    url: String,

    /// Scroll offset to apply before reporting, in pixels
    #[arg(short, long, value_name = "PX")]
    scroll: Option<f64>,

    /// Viewport height in pixels
    #[arg(long = "viewport-height", value_name = "PX", default_value = "800")]
    viewport_height: f64,

    /// Keyboard command to apply, in order (can be used multiple times)
    #[arg(
        short = 'c',
        long = "command",
        value_name = "SHORTCUT",
        value_parser = ["prev-answer", "next-answer", "toggle-ui", "toggle-pin"]
    )]
    commands: Vec<String>,

    /// Theme: auto, light, dark, blue or lavender (overrides settings)
    #[arg(
        long,
        value_parser = ["auto", "light", "dark", "blue", "lavender"]
    )]
    theme: Option<String>,

    /// How long geometry readings stay valid, e.g. 250ms (overrides settings)
    #[arg(long, value_name = "DURATION")]
    freshness: Option<String>,

    /// Disable the adapter with this key (can be used multiple times)
    #[arg(long = "disable-site", value_name = "KEY")]
    disable_site: Vec<String>,

    /// Settings file (default: <config dir>/chatnav/settings.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Log extraction and navigation details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("chatnav: {}", message);
    process::exit(1);
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_settings(args: &Args) -> Settings {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path).unwrap_or_else(|e| fail(e)),
        None => Settings::load_default(),
    };

    if let Some(theme) = &args.theme {
        settings.theme_mode = theme.clone();
    }
    if let Some(freshness) = &args.freshness {
        if let Err(e) = parse_duration(freshness) {
            fail(e);
        }
        settings.geometry_freshness = freshness.clone();
    }
    for key in &args.disable_site {
        settings.set_site_enabled(key, false);
    }
    settings
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let settings = load_settings(&args);
    let identity = PageIdentity::parse(&args.url).unwrap_or_else(|e| fail(e));
    let mut page = Page::load(&args.file)
        .unwrap_or_else(|e| fail(e))
        .with_viewport(Viewport::new(0.0, args.viewport_height));

    let (sender, receiver) = channel();
    let mut navigator = Navigator::new(
        AdapterRegistry::builtin(),
        settings,
        EnvPreference::from_env(),
        receiver,
    );

    if navigator.on_page_load(identity.clone(), &page).is_none() {
        eprintln!("chatnav: no adapter supports {}", identity);
        return;
    }

    if let Some(offset) = args.scroll {
        let scroll_y = page.scroll_to(offset);
        navigator.on_scroll(&page, scroll_y);
    }

    let mut applied: Vec<Command> = Vec::new();
    for shortcut in &args.commands {
        match sender.dispatch_shortcut(shortcut) {
            Ok(Some(command)) => applied.push(command),
            Ok(None) => {}
            Err(e) => fail(e),
        }
    }
    navigator.pump(&page);

    let Some(session) = navigator.session() else {
        return;
    };

    let result = if args.json {
        print_json(&SessionReport::new(session, &applied))
    } else {
        let config = OutputConfig {
            use_color: should_use_color(args.color),
            ..OutputConfig::default()
        }
        .with_theme(session.theme());
        TimelineFormatter::new(config).print(session)
    };

    if let Err(e) = result {
        fail(format!("error writing output: {}", e));
    }
}
