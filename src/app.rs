use anyhow::Result;
use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::clipboard::{copy_to_clipboard, ClipboardSink};
use crate::debounce::Debouncer;
use crate::notify::Toasts;
use crate::refresh::AutoRefresh;
use crate::table::export::export_csv;
use crate::table::load::{load_json, LoadError};
use crate::table::{Row, TableView};
use crate::theme::ThemeService;

/// Messages delivered to the app loop from timers and background loads
#[derive(Debug)]
pub enum AppEvent {
    /// Auto-refresh tick
    Refresh,
    /// Background load finished
    Loaded {
        result: Result<TableView, LoadError>,
        manual: bool,
    },
    /// Debounced search input
    ApplySearch(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Search,
    Help,
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    OverwriteExport(PathBuf),
}

/// Question shown in the confirm dialog and what to do on "yes"
#[derive(Debug, Clone)]
pub struct PendingConfirm {
    pub message: String,
    pub action: ConfirmAction,
}

/// Startup settings, merged from config and CLI flags
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub source: PathBuf,
    pub export_path: PathBuf,
    pub refresh_interval: Duration,
    pub auto_refresh: bool,
    pub search_debounce: Duration,
    pub date_columns: Vec<String>,
    pub notifications: bool,
    pub sort: Option<(String, bool)>,
    pub filter: Option<String>,
}

pub struct App {
    pub source: PathBuf,
    pub table: TableView,
    pub selected_row: usize,    // Index into visible rows
    pub selected_column: usize,
    pub popup: Popup,

    // Search bar input (applied through the debouncer)
    pub search_input: String,

    pub confirm: Option<PendingConfirm>,
    pub toasts: Toasts,

    // Loading overlay is shown while a reload is in flight
    pub loading: bool,
    pub last_loaded: Option<DateTime<Local>>,

    pub theme: ThemeService,
    pub export_path: PathBuf,

    date_columns: Vec<String>,
    refresher: AutoRefresh,
    debouncer: Debouncer,
    clipboard: Box<dyn ClipboardSink>,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
}

impl App {
    /// Load the source file and set up refresh. Must run inside a tokio runtime.
    pub fn new(
        options: AppOptions,
        theme: ThemeService,
        clipboard: Box<dyn ClipboardSink>,
    ) -> Result<Self> {
        let mut table = load_json(&options.source, &options.date_columns)?;

        if let Some((column, ascending)) = &options.sort {
            let idx = table
                .column_index(column)
                .ok_or_else(|| anyhow::anyhow!("Unknown column: {}", column))?;
            table.sort_by(idx, *ascending)?;
        }
        if let Some(query) = &options.filter {
            table.filter(query);
        }

        let (events_tx, events_rx) = unbounded_channel();

        let mut refresher = AutoRefresh::new(options.refresh_interval)?;
        let tx = events_tx.clone();
        refresher.on_refresh(move || {
            tx.send(AppEvent::Refresh)
                .map_err(|_| anyhow::anyhow!("app event channel closed"))
        });
        if options.auto_refresh {
            refresher.start();
        }

        let search_input = table.query().to_string();

        Ok(Self {
            source: options.source,
            table,
            selected_row: 0,
            selected_column: 0,
            popup: Popup::None,
            search_input,
            confirm: None,
            toasts: Toasts::new(options.notifications),
            loading: false,
            last_loaded: Some(Local::now()),
            theme,
            export_path: options.export_path,
            date_columns: options.date_columns,
            refresher,
            debouncer: Debouncer::new(options.search_debounce),
            clipboard,
            events_tx,
            events_rx,
        })
    }

    pub fn is_auto_refreshing(&self) -> bool {
        self.refresher.is_running()
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresher.interval()
    }

    /// Row under the cursor
    pub fn selected(&self) -> Option<&Row> {
        self.table.visible_rows().nth(self.selected_row)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle popups first
        if self.popup != Popup::None {
            return self.handle_popup_key(key);
        }

        self.handle_normal_key(key)
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('h') | KeyCode::Left => {
                self.selected_column = self.selected_column.saturating_sub(1);
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if self.selected_column + 1 < self.table.headers().len() {
                    self.selected_column += 1;
                }
            }
            KeyCode::Char('g') | KeyCode::Home => self.selected_row = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.selected_row = self.table.visible_len().saturating_sub(1);
            }

            KeyCode::Char('s') => self.sort_selected_column()?,

            KeyCode::Char('/') => {
                self.search_input = self.table.query().to_string();
                self.popup = Popup::Search;
            }
            KeyCode::Esc if !self.table.query().is_empty() => {
                self.search_input.clear();
                self.apply_search("");
                self.toasts.info("Filter cleared");
            }

            KeyCode::Char('r') => self.reload(true),
            KeyCode::Char('p') => self.toggle_auto_refresh(),

            KeyCode::Char('y') => self.copy_cell(),
            KeyCode::Char('Y') => self.copy_row(),

            KeyCode::Char('e') => self.request_export(),
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('?') => self.popup = Popup::Help,

            _ => {}
        }
        Ok(())
    }

    fn handle_popup_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.popup {
            Popup::Search => match key.code {
                KeyCode::Enter => {
                    self.debouncer.cancel();
                    let query = self.search_input.clone();
                    self.apply_search(&query);
                    self.popup = Popup::None;
                }
                KeyCode::Esc => {
                    self.debouncer.cancel();
                    self.search_input.clear();
                    self.apply_search("");
                    self.popup = Popup::None;
                }
                KeyCode::Backspace => {
                    self.search_input.pop();
                    self.schedule_search();
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.search_input.push(c);
                    self.schedule_search();
                }
                _ => {}
            },
            Popup::Confirm => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.popup = Popup::None;
                    if let Some(pending) = self.confirm.take() {
                        self.run_confirmed(pending.action);
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.popup = Popup::None;
                    self.confirm = None;
                    self.toasts.info("Cancelled");
                }
                _ => {}
            },
            Popup::Help => self.popup = Popup::None,
            Popup::None => {}
        }
        Ok(())
    }

    fn move_down(&mut self) {
        if self.selected_row + 1 < self.table.visible_len() {
            self.selected_row += 1;
        }
    }

    fn move_up(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let visible = self.table.visible_len();
        if self.selected_row >= visible {
            self.selected_row = visible.saturating_sub(1);
        }
        let columns = self.table.headers().len();
        if self.selected_column >= columns {
            self.selected_column = columns.saturating_sub(1);
        }
    }

    /// Sort ascending, or flip direction when this column is already sorted
    fn sort_selected_column(&mut self) -> Result<()> {
        if self.table.headers().is_empty() {
            return Ok(());
        }

        let ascending = match self.table.sort_state() {
            Some(sort) if sort.column == self.selected_column => !sort.ascending,
            _ => true,
        };
        self.table.sort_by(self.selected_column, ascending)?;
        Ok(())
    }

    fn schedule_search(&mut self) {
        let tx = self.events_tx.clone();
        let query = self.search_input.clone();
        self.debouncer.call(move || {
            let _ = tx.send(AppEvent::ApplySearch(query));
        });
    }

    fn apply_search(&mut self, query: &str) {
        self.table.filter(query);
        self.selected_row = 0;
        self.clamp_selection();
    }

    /// Reload the source file in the background. Ignored while a load is
    /// already running.
    pub fn reload(&mut self, manual: bool) {
        if self.loading {
            tracing::debug!("Reload skipped, load already in flight");
            return;
        }

        self.loading = true;
        let path = self.source.clone();
        let date_columns = self.date_columns.clone();
        let tx = self.events_tx.clone();

        tokio::task::spawn_blocking(move || {
            let result = load_json(&path, &date_columns);
            let _ = tx.send(AppEvent::Loaded { result, manual });
        });
    }

    fn toggle_auto_refresh(&mut self) {
        if self.refresher.is_running() {
            self.refresher.stop();
            self.toasts.info("Auto-refresh paused");
        } else {
            self.refresher.start();
            self.toasts
                .info(format!("Auto-refresh every {}s", self.refresher.interval().as_secs()));
        }
    }

    fn copy_cell(&mut self) {
        let text = match self.selected() {
            Some(row) => row.cell(self.selected_column).unwrap_or("").to_string(),
            None => return self.toasts.warning("Nothing to copy"),
        };
        copy_to_clipboard(self.clipboard.as_mut(), &text, &mut self.toasts);
    }

    fn copy_row(&mut self) {
        let text = match self.selected() {
            Some(row) => row.cells().join("\t"),
            None => return self.toasts.warning("Nothing to copy"),
        };
        copy_to_clipboard(self.clipboard.as_mut(), &text, &mut self.toasts);
    }

    fn request_export(&mut self) {
        let path = self.export_path.clone();
        if path.exists() {
            self.confirm = Some(PendingConfirm {
                message: format!("Overwrite {}?", path.display()),
                action: ConfirmAction::OverwriteExport(path),
            });
            self.popup = Popup::Confirm;
        } else {
            self.export_to(&path);
        }
    }

    fn run_confirmed(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::OverwriteExport(path) => self.export_to(&path),
        }
    }

    fn export_to(&mut self, path: &std::path::Path) {
        match export_csv(&self.table, path) {
            Ok(rows) => self
                .toasts
                .success(format!("Exported {} rows to {}", rows, path.display())),
            Err(e) => self.toasts.error(format!("Export failed: {}", e)),
        }
    }

    fn toggle_theme(&mut self) {
        match self.theme.toggle() {
            Ok(mode) => self.toasts.info(format!("Theme: {}", mode)),
            Err(e) => self.toasts.error(format!("Could not save theme: {}", e)),
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Refresh => self.reload(false),
            AppEvent::Loaded { result, manual } => {
                self.loading = false;
                match result {
                    Ok(fresh) => {
                        // Keep the cursor on the same header if it still exists
                        let selected_header = self.table.headers().get(self.selected_column).cloned();
                        self.table.replace_rows(fresh);
                        if let Some(idx) = selected_header
                            .and_then(|name| self.table.headers().iter().position(|h| *h == name))
                        {
                            self.selected_column = idx;
                        }
                        self.clamp_selection();
                        self.last_loaded = Some(Local::now());
                        if manual {
                            self.toasts.info(format!("Reloaded {} rows", self.table.len()));
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Reload of {} failed: {}", self.source.display(), e);
                        self.toasts.error(format!("Reload failed: {}", e));
                    }
                }
            }
            AppEvent::ApplySearch(query) => {
                // Stale results from a search bar that has since been closed
                if self.popup == Popup::Search {
                    self.apply_search(&query);
                }
            }
        }
    }

    /// Drain pending events and expire toasts. Called once per UI loop.
    pub fn tick(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
        self.toasts.prune();
    }
}
