//! Overlay widgets shared by the main view: toasts, loading, dialogs

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::notify::Toasts;
use crate::theme::Theme;

const TOAST_WIDTH: u16 = 40;
const TOAST_HEIGHT: u16 = 3;
const MAX_VISIBLE_TOASTS: usize = 3;

/// Stack toasts in the top-right corner, newest on top
pub fn draw_toasts(f: &mut Frame, toasts: &Toasts, theme: &Theme) {
    let area = f.area();
    let width = TOAST_WIDTH.min(area.width);

    for (i, toast) in toasts.active().take(MAX_VISIBLE_TOASTS).enumerate() {
        let y = area.y + 1 + (i as u16) * TOAST_HEIGHT;
        if y + TOAST_HEIGHT > area.bottom() {
            break;
        }
        let rect = Rect::new(area.right().saturating_sub(width + 1), y, width, TOAST_HEIGHT);
        let color = toast.level.color();

        f.render_widget(Clear, rect);
        let body = Paragraph::new(Line::from(vec![
            Span::styled(format!("{} ", toast.level.icon()), Style::default().fg(color)),
            Span::styled(toast.message.as_str(), Style::default().fg(theme.text)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
        f.render_widget(body, rect);
    }
}

pub fn draw_loading(f: &mut Frame, theme: &Theme) {
    let popup_area = centered_rect(30, 20, f.area());
    f.render_widget(Clear, popup_area);

    let loading = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("◌", Style::default().fg(theme.accent))),
        Line::from(Span::styled("Loading...", Style::default().fg(theme.text))),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.inactive)),
    )
    .alignment(Alignment::Center);

    f.render_widget(loading, popup_area);
}

pub fn draw_confirm(f: &mut Frame, message: &str, theme: &Theme) {
    let popup_area = centered_rect(40, 20, f.area());

    f.render_widget(Clear, popup_area);

    let confirm = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(theme.text))),
        Line::from(""),
        Line::from(vec![
            Span::styled("n", Style::default().fg(theme.text_dim).add_modifier(Modifier::BOLD)),
            Span::raw(" Cancel   "),
            Span::styled("y", Style::default().fg(theme.danger).add_modifier(Modifier::BOLD)),
            Span::raw(" Confirm"),
        ]),
    ])
    .block(
        Block::default()
            .title(Span::styled(" Confirm Action ", Style::default().fg(theme.warning)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.warning)),
    )
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    f.render_widget(confirm, popup_area);
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(40, 20, outer);

        assert_eq!(inner.width, 40);
        assert_eq!(inner.height, 10);
        assert_eq!(inner.x, 30);
        assert_eq!(inner.y, 20);
    }
}
