mod components;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::{App, Popup};
use crate::theme::Theme;
use components::{centered_rect, draw_confirm, draw_loading, draw_toasts};

pub fn draw(f: &mut Frame, app: &App) {
    let theme = app.theme.palette();
    let area = f.area();

    f.render_widget(Block::default().style(Style::default().bg(theme.bg)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Min(3),    // Table
            Constraint::Length(1), // Footer
        ])
        .split(area);

    draw_info_line(f, app, theme, chunks[0]);
    draw_table(f, app, theme, chunks[1]);
    draw_footer(f, app, theme, chunks[2]);

    // Draw popups on top
    match app.popup {
        Popup::None => {}
        Popup::Search => draw_search_bar(f, app, theme, chunks[1]),
        Popup::Help => draw_help_popup(f, theme),
        Popup::Confirm => {
            let message = app
                .confirm
                .as_ref()
                .map(|c| c.message.as_str())
                .unwrap_or("Are you sure?");
            draw_confirm(f, message, theme);
        }
    }

    if app.loading {
        draw_loading(f, theme);
    }

    draw_toasts(f, &app.toasts, theme);
}

fn draw_info_line(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let source = app
        .source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| app.source.display().to_string());

    let mut spans = vec![
        Span::styled(format!("{} ", app.theme.icon()), Style::default().fg(theme.accent)),
        Span::styled(source, Style::default().fg(theme.text).add_modifier(Modifier::BOLD)),
        Span::styled(" │ ", Style::default().fg(theme.inactive)),
        Span::styled(
            format!("{}/{} rows", app.table.visible_len(), app.table.len()),
            Style::default().fg(theme.text_dim),
        ),
    ];

    if !app.table.query().is_empty() {
        spans.push(Span::styled(" │ ", Style::default().fg(theme.inactive)));
        spans.push(Span::styled(
            format!("filter \"{}\"", app.table.query()),
            Style::default().fg(theme.warning),
        ));
    }

    spans.push(Span::styled(" │ ", Style::default().fg(theme.inactive)));
    if app.is_auto_refreshing() {
        spans.push(Span::styled(
            format!("⟳ {}s", app.refresh_interval().as_secs()),
            Style::default().fg(theme.success),
        ));
    } else {
        spans.push(Span::styled("⟳ paused", Style::default().fg(theme.text_dim)));
    }

    if let Some(loaded) = app.last_loaded {
        spans.push(Span::styled(
            format!("  updated {}", loaded.format("%H:%M:%S")),
            Style::default().fg(theme.text_dim),
        ));
    }

    let info = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_table(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.inactive));

    if app.table.is_empty() || app.table.headers().is_empty() {
        let empty = Paragraph::new(Span::styled("  No records", Style::default().fg(theme.text_dim)))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let sort = app.table.sort_state();
    let header = Row::new(app.table.headers().iter().enumerate().map(|(i, name)| {
        let arrow = match sort {
            Some(s) if s.column == i && s.ascending => " ▲",
            Some(s) if s.column == i => " ▼",
            _ => "",
        };
        let style = if i == app.selected_column {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.header).add_modifier(Modifier::BOLD)
        };
        Cell::from(Span::styled(format!("{}{}", name, arrow), style))
    }));

    let rows: Vec<Row> = app
        .table
        .visible_rows()
        .map(|row| {
            Row::new(row.cells().iter().enumerate().map(|(i, text)| {
                let style = if i == app.selected_column {
                    Style::default().fg(theme.text).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.text)
                };
                Cell::from(Span::styled(text.as_str(), style))
            }))
        })
        .collect();

    let widths = vec![Constraint::Fill(1); app.table.headers().len()];

    let table = Table::new(rows, widths)
        .header(header.bottom_margin(1))
        .block(block)
        .row_highlight_style(Style::default().bg(theme.bg_selected).fg(theme.text));

    if app.table.visible_len() == 0 {
        f.render_widget(table, area);
        let note_area = Rect::new(area.x + 2, area.y + 3, area.width.saturating_sub(4), 1);
        if note_area.y < area.bottom() {
            f.render_widget(
                Paragraph::new(Span::styled("No matching rows", Style::default().fg(theme.text_dim))),
                note_area,
            );
        }
        return;
    }

    let mut state = TableState::default().with_selected(Some(app.selected_row));
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_footer(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let hints: Vec<(&str, &str)> = match app.popup {
        Popup::Search => vec![("Enter", "Keep"), ("Esc", "Clear")],
        Popup::Confirm => vec![("y", "Confirm"), ("n", "Cancel")],
        _ => vec![
            ("↑↓←→", "Nav"),
            ("s", "Sort"),
            ("/", "Search"),
            ("r", "Reload"),
            ("p", "Pause"),
            ("y", "Copy"),
            ("e", "Export"),
            ("t", "Theme"),
            ("?", "Help"),
        ],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 4 } else if area.width < 90 { 6 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(theme.accent)),
                Span::styled(format!(" {} │ ", action), Style::default().fg(theme.text_dim)),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_search_bar(f: &mut Frame, app: &App, theme: &Theme, table_area: Rect) {
    let height = 3;
    if table_area.height < height {
        return;
    }
    let area = Rect::new(
        table_area.x,
        table_area.bottom() - height,
        table_area.width,
        height,
    );

    f.render_widget(Clear, area);

    let input = Paragraph::new(Line::from(vec![
        Span::styled("/", Style::default().fg(theme.accent)),
        Span::styled(app.search_input.as_str(), Style::default().fg(theme.text)),
        Span::styled("█", Style::default().fg(theme.accent)),
    ]))
    .block(
        Block::default()
            .title(Span::styled(" Search ", Style::default().fg(theme.accent)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent)),
    );

    f.render_widget(input, area);
}

fn draw_help_popup(f: &mut Frame, theme: &Theme) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            format!("═══ {} ═══", title),
            Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
        ))
    };
    let key = |keys: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", keys), Style::default().fg(theme.accent)),
            Span::styled(what, Style::default().fg(theme.text)),
        ])
    };

    let help_text = vec![
        section("Navigation"),
        key("↑/↓ j/k", "Move between rows"),
        key("←/→ h/l", "Move between columns"),
        key("g / G", "First / last row"),
        Line::from(""),
        section("Table"),
        key("s", "Sort by selected column (again to reverse)"),
        key("/", "Search all columns"),
        key("Esc", "Clear search"),
        key("r", "Reload now"),
        key("p", "Pause / resume auto-refresh"),
        Line::from(""),
        section("Output"),
        key("y", "Copy selected cell"),
        key("Y", "Copy selected row"),
        key("e", "Export shown rows to CSV"),
        Line::from(""),
        section("Other"),
        key("t", "Toggle light / dark theme"),
        key("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled("  Press any key to close", Style::default().fg(theme.text_dim))),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" tablewatch Help ", Style::default().fg(theme.accent)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}
