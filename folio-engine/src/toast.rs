//! Transient toast messages and the clipboard seam

use std::time::{Duration, Instant};
use thiserror::Error;

/// How long a toast stays up
pub const TOAST_DURATION: Duration = Duration::from_millis(1400);

/// Clipboard write refused
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

/// System clipboard
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard kept in memory; can be told to refuse writes
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
    pub refuse: bool,
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.refuse {
            return Err(ClipboardError("permission denied".to_string()));
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// Single toast slot; a new message replaces the old and restarts the timer
#[derive(Debug, Default, Clone)]
pub struct Toast {
    current: Option<(String, Instant)>,
}

impl Toast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: &str, now: Instant) {
        self.current = Some((message.to_string(), now + TOAST_DURATION));
    }

    /// Message still on screen at `now`
    pub fn visible(&self, now: Instant) -> Option<&str> {
        match &self.current {
            Some((message, hide_at)) if now < *hide_at => Some(message.as_str()),
            _ => None,
        }
    }

    /// Drop an expired message
    pub fn tick(&mut self, now: Instant) {
        if self.visible(now).is_none() {
            self.current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_hides_after_duration() {
        let t0 = Instant::now();
        let mut toast = Toast::new();
        toast.show("Copied!", t0);
        assert_eq!(toast.visible(t0 + Duration::from_millis(1399)), Some("Copied!"));
        assert_eq!(toast.visible(t0 + TOAST_DURATION), None);
    }

    #[test]
    fn test_new_message_restarts_timer() {
        let t0 = Instant::now();
        let mut toast = Toast::new();
        toast.show("Copied!", t0);
        toast.show("Copy failed", t0 + Duration::from_millis(1000));
        assert_eq!(toast.visible(t0 + Duration::from_millis(2000)), Some("Copy failed"));
        toast.tick(t0 + Duration::from_millis(2400));
        assert_eq!(toast.visible(t0 + Duration::from_millis(2400)), None);
    }

    #[test]
    fn test_memory_clipboard() {
        let mut clip = MemoryClipboard::default();
        clip.write_text("a@b.c").unwrap();
        assert_eq!(clip.contents.as_deref(), Some("a@b.c"));
        clip.refuse = true;
        assert!(clip.write_text("x").is_err());
    }
}
