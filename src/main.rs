mod app;
mod clipboard;
mod config;
mod debounce;
mod format;
mod notify;
mod refresh;
mod table;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, AppOptions, Popup};
use clipboard::SystemClipboard;
use config::preferences::{FilePreferences, MemoryPreferences, ThemeStore};
use config::AppConfig;
use theme::{ThemeMode, ThemeService};

#[derive(Parser, Debug)]
#[command(name = "tablewatch")]
#[command(version = "0.1.0")]
#[command(about = "Watch a JSON file of records as a sortable, searchable table")]
struct Args {
    /// JSON file holding an array of records
    file: PathBuf,

    /// Auto-refresh interval in seconds (overrides config)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Start with auto-refresh paused
    #[arg(long)]
    no_refresh: bool,

    /// Sort by this column (header name or index)
    #[arg(short, long)]
    sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    desc: bool,

    /// Only show rows containing this text
    #[arg(short, long)]
    filter: Option<String>,

    /// Write the shown rows as CSV to this path and exit
    #[arg(short, long, value_name = "CSV")]
    export: Option<PathBuf>,

    /// Save the theme preference (dark or light) and exit
    #[arg(long)]
    theme: Option<ThemeMode>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never land inside the TUI or exported CSV on stdout
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = AppConfig::load();

    // Handle CLI-only commands
    if let Some(mode) = args.theme {
        return save_theme(mode);
    }

    if let Some(path) = &args.export {
        return export_headless(&args, &config, path);
    }

    run_tui(args, config).await
}

fn save_theme(mode: ThemeMode) -> Result<()> {
    let mut store = FilePreferences::default_location()?;
    store.save(mode)?;
    println!("Theme set to {}", mode);
    Ok(())
}

fn export_headless(args: &Args, config: &AppConfig, path: &Path) -> Result<()> {
    let mut table = table::load::load_json(&args.file, &config.date_columns)?;

    if let Some(column) = &args.sort {
        let idx = table
            .column_index(column)
            .with_context(|| format!("Unknown column: {}", column))?;
        table.sort_by(idx, !args.desc)?;
    }
    if let Some(query) = &args.filter {
        table.filter(query);
    }

    let rows = table::export::export_csv(&table, path)?;
    println!("Exported {} rows to {}", rows, path.display());
    Ok(())
}

/// `<stem>.csv` next to where tablewatch was started
fn default_export_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export".to_string());
    PathBuf::from(format!("{}.csv", stem))
}

fn theme_store() -> Box<dyn ThemeStore> {
    match FilePreferences::default_location() {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!("Theme preference will not be saved: {}", e);
            Box::new(MemoryPreferences::default())
        }
    }
}

async fn run_tui(args: Args, config: AppConfig) -> Result<()> {
    let refresh_interval = match args.interval {
        Some(secs) => Duration::from_secs(secs),
        None => config.refresh_interval(),
    };

    let options = AppOptions {
        export_path: default_export_path(&args.file),
        source: args.file,
        refresh_interval,
        auto_refresh: !args.no_refresh,
        search_debounce: config.search_debounce(),
        date_columns: config.date_columns.clone(),
        notifications: config.notifications,
        sort: args.sort.map(|column| (column, !args.desc)),
        filter: args.filter,
    };

    let theme = ThemeService::init(theme_store(), config.accent.as_deref());

    // Create app state before touching the terminal so load errors print normally
    let mut app = App::new(options, theme, Box::new(SystemClipboard::new()))?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

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

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => {
                            // Handle key and catch any errors to prevent crashes
                            if let Err(e) = app.handle_key(key) {
                                app.toasts.error(format!("Error: {}", e));
                            }
                        }
                    }
                }
            }
        }

        // Timer events, finished loads, toast expiry
        app.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_export_path() {
        assert_eq!(
            default_export_path(Path::new("/data/tasks.json")),
            PathBuf::from("tasks.csv")
        );
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "tablewatch", "tasks.json", "--sort", "title", "--desc", "--theme", "light",
        ]);
        assert_eq!(args.file, PathBuf::from("tasks.json"));
        assert_eq!(args.sort.as_deref(), Some("title"));
        assert!(args.desc);
        assert_eq!(args.theme, Some(ThemeMode::Light));

        assert!(Args::try_parse_from(["tablewatch", "tasks.json", "--desc"]).is_err());
        assert!(Args::try_parse_from(["tablewatch", "tasks.json", "--interval", "0"]).is_err());
        assert_eq!(
            Args::parse_from(["tablewatch", "tasks.json", "-i", "5"]).interval,
            Some(5)
        );
    }
}
