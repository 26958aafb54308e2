use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use clusterwatch::data::duration::parse_duration;
use clusterwatch::{events, ui};
use clusterwatch::{App, Console, EventSource, HttpBackend, LanguagePack, PollingSource, Settings};

#[derive(Parser, Debug)]
#[command(name = "clusterwatch")]
#[command(about = "Terminal console for live cluster node statistics and plots")]
struct Args {
    /// Base URL of the cluster's HTTP endpoint
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Adapter whose nodes are watched
    #[arg(short, long)]
    adapter: Option<String>,

    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Language pack with labels and formatting rules (JSON)
    #[arg(long)]
    lang: Option<PathBuf>,

    /// Statistics interval (e.g., "5s", "1m"); never below 5s
    #[arg(short, long)]
    interval: Option<String>,

    /// Connectivity check interval (e.g., "5s")
    #[arg(long)]
    connect_interval: Option<String>,

    /// Snapshots kept per node
    #[arg(long)]
    history: Option<usize>,

    /// Write logs to this file (logs are discarded otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.log_file.as_deref())?;

    let settings = resolve_settings(&args)?;
    info!(endpoint = %settings.endpoint, adapter = %settings.adapter, "starting");

    // A broken language pack is fatal before the terminal is taken over
    let pack = match settings.lang {
        Some(ref path) => LanguagePack::load(path)
            .with_context(|| format!("Failed to load language pack {}", path.display()))?,
        None => LanguagePack::builtin()?,
    };
    let (labels, registry) = pack.into_parts();
    let console = Console::new(labels, registry, settings.history);

    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let backend = HttpBackend::builder()
        .endpoint(settings.endpoint.clone())
        .adapter(settings.adapter.clone())
        .build()?;
    let source = PollingSource::spawn(
        Arc::new(backend),
        &settings.endpoint,
        settings.connect_interval(),
        settings.statistics_interval(),
    );

    run_tui(Box::new(source), console)
}

/// Layer command line overrides on top of the loaded settings.
fn resolve_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref())?;

    if let Some(ref endpoint) = args.endpoint {
        settings.endpoint = endpoint.clone();
    }
    if let Some(ref adapter) = args.adapter {
        settings.adapter = adapter.clone();
    }
    if let Some(ref lang) = args.lang {
        settings.lang = Some(lang.clone());
    }
    if let Some(ref interval) = args.interval {
        settings.statistics_interval_ms = millis(parse_duration(interval)?);
    }
    if let Some(ref interval) = args.connect_interval {
        settings.connect_interval_ms = millis(parse_duration(interval)?);
    }
    if let Some(history) = args.history {
        settings.history = history;
    }

    settings.validate()?;
    Ok(settings)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Route tracing output to a file, or drop it so it cannot corrupt the TUI.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
    Ok(())
}

/// Run the TUI with the given event source
fn run_tui(source: Box<dyn EventSource>, console: Console) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(source, console);
    app.reload_data();

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 14;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                frame.render_widget(paragraph, area);
                return;
            }

            ui::render(frame, app, area);
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                _ => {}
            }
        }

        // Events arrive on the source's own schedule; drain whatever is queued
        app.reload_data();
    }

    info!("shutting down");
    Ok(())
}
