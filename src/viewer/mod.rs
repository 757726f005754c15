//! Manual viewer
//!
//! Host-side model of the viewer page: the PDF renders inside an isolated
//! frame whose runtime is only reachable after it starts on its own, so the
//! host learns about the document through a bounded polling bridge and drives
//! the renderer through a small control surface.
//!
//! # Modules
//!
//! - `renderer`: traits for the frame and the renderer's application object
//! - `bridge`: polling state machine and event forwarding
//! - `host`: per-mount session state, chrome and controls

mod bridge;
mod chrome;
mod host;
mod renderer;

#[cfg(test)]
mod testing;

use std::time::Duration;

pub use bridge::{BridgeConfig, BridgeEvent, BridgeMessage, BridgePhase, RendererBridge};
pub use chrome::{ChromeVisibility, Interaction};
pub use host::{ViewerError, ViewerHost, ViewerSession};
pub use renderer::{
    Destination, EventBus, ListenerId, OutlineNode, RendererError, RendererEvent,
    RendererEventKind, RendererFrame, RendererListener, Subscription, Subscriptions,
    ViewerApplication,
};

/// Timing and layout knobs for the viewer
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub poll_interval: Duration,
    /// Polls before giving up and offering a reload
    pub max_poll_attempts: u32,
    pub chrome_hide_delay: Duration,
    /// Viewports at least this wide keep the chrome on screen
    pub wide_viewport_min_width: u32,
    /// Wait after a destination jump before correcting the scroll position
    pub settle_delay: Duration,
    /// Fraction of the viewport height scrolled back after a jump
    pub scroll_correction: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            max_poll_attempts: 60,
            chrome_hide_delay: Duration::from_millis(2500),
            wide_viewport_min_width: 768,
            settle_delay: Duration::from_millis(100),
            scroll_correction: 0.25,
        }
    }
}

impl ViewerConfig {
    pub fn bridge(&self) -> BridgeConfig {
        BridgeConfig {
            poll_interval: self.poll_interval,
            max_attempts: self.max_poll_attempts,
        }
    }
}
