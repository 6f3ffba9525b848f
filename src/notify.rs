//! Toast notifications
//!
//! Short-lived messages drawn over the UI. Errors can also be sent to the
//! desktop notification daemon.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use anyhow::Result;
use ratatui::style::Color;

/// How long a toast stays on screen
pub const TOAST_LIFETIME: Duration = Duration::from_secs(3);

/// Oldest toasts are dropped beyond this many
const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastLevel {
    pub fn color(self) -> Color {
        match self {
            ToastLevel::Success => Color::Rgb(0x10, 0xb9, 0x81),
            ToastLevel::Error => Color::Rgb(0xef, 0x44, 0x44),
            ToastLevel::Warning => Color::Rgb(0xf5, 0x9e, 0x0b),
            ToastLevel::Info => Color::Rgb(0x3b, 0x82, 0xf6),
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ToastLevel::Success => "✔",
            ToastLevel::Error => "✖",
            ToastLevel::Warning => "⚠",
            ToastLevel::Info => "ℹ",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub shown_at: Instant,
}

#[derive(Debug)]
pub struct Toasts {
    queue: VecDeque<Toast>,
    lifetime: Duration,
    desktop: bool,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Toasts {
    pub fn new(desktop: bool) -> Self {
        Self {
            queue: VecDeque::new(),
            lifetime: TOAST_LIFETIME,
            desktop,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, level: ToastLevel) {
        let message = message.into();

        if self.desktop && level == ToastLevel::Error {
            if let Err(e) = desktop_notify("tablewatch", &message) {
                tracing::debug!("Desktop notification failed: {}", e);
            }
        }

        self.queue.push_back(Toast {
            message,
            level,
            shown_at: Instant::now(),
        });
        while self.queue.len() > MAX_TOASTS {
            self.queue.pop_front();
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, ToastLevel::Success);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, ToastLevel::Error);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(message, ToastLevel::Warning);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message, ToastLevel::Info);
    }

    /// Toasts still on screen, newest first
    pub fn active(&self) -> impl Iterator<Item = &Toast> {
        self.queue.iter().rev()
    }

    /// Remove expired toasts
    pub fn prune(&mut self) {
        self.prune_at(Instant::now());
    }

    fn prune_at(&mut self, now: Instant) {
        let lifetime = self.lifetime;
        self.queue
            .retain(|toast| now.duration_since(toast.shown_at) < lifetime);
    }
}

fn desktop_notify(summary: &str, body: &str) -> Result<()> {
    notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .icon("dialog-error")
        .show()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let mut toasts = Toasts::default();
        toasts.info("first");
        toasts.success("second");

        let messages: Vec<&str> = toasts.active().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
    }

    #[test]
    fn test_prune_expired() {
        let mut toasts = Toasts::default();
        toasts.warning("old");
        let later = toasts.queue[0].shown_at + TOAST_LIFETIME;
        toasts.error("new");
        toasts.queue[1].shown_at = later;

        toasts.prune_at(later);
        let left: Vec<&str> = toasts.active().map(|t| t.message.as_str()).collect();
        assert_eq!(left, vec!["new"]);
    }

    #[test]
    fn test_queue_is_bounded() {
        let mut toasts = Toasts::default();
        for i in 0..10 {
            toasts.info(format!("toast {}", i));
        }
        assert_eq!(toasts.active().count(), MAX_TOASTS);
        assert_eq!(toasts.active().next().unwrap().message, "toast 9");
    }

    #[test]
    fn test_level_colors() {
        assert_eq!(ToastLevel::Error.color(), Color::Rgb(239, 68, 68));
        assert_eq!(ToastLevel::Info.color(), Color::Rgb(59, 130, 246));
    }
}
