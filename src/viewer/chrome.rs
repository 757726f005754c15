//! Auto-hiding viewer chrome

use std::time::Duration;

use tokio::time::Instant;

/// User activity that keeps the chrome on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    PointerMove,
    Touch,
    Scroll,
    Tap,
}

/// Countdown after which back/zoom/download controls fade out.
///
/// Wide viewports never hide them.
#[derive(Debug, Clone)]
pub struct ChromeVisibility {
    hide_after: Duration,
    wide_min_width: u32,
    visible_until: Option<Instant>,
}

impl ChromeVisibility {
    pub fn new(hide_after: Duration, wide_min_width: u32) -> Self {
        Self {
            hide_after,
            wide_min_width,
            visible_until: None,
        }
    }

    /// Show the chrome and restart the countdown
    pub fn touch(&mut self, now: Instant) {
        self.visible_until = Some(now + self.hide_after);
    }

    /// Drop the countdown entirely
    pub fn clear(&mut self) {
        self.visible_until = None;
    }

    pub fn is_visible(&self, now: Instant, viewport_width: u32) -> bool {
        if viewport_width >= self.wide_min_width {
            return true;
        }
        self.visible_until.is_some_and(|until| now < until)
    }
}
