//! Viewer host
//!
//! Owns the state of one mounted manual and the renderer bridge feeding it.
//! Every mount gets a fresh session and a new generation number; bridge
//! events carry the generation they were produced for, so anything arriving
//! late from a previous document is dropped instead of bleeding into the
//! current one.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::document::DocumentRef;

use super::bridge::{BridgeEvent, BridgeMessage, RendererBridge};
use super::chrome::{ChromeVisibility, Interaction};
use super::renderer::{
    Destination, OutlineNode, RendererError, RendererFrame, Subscriptions, ViewerApplication,
};
use super::ViewerConfig;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("no document is mounted")]
    NotMounted,

    #[error("renderer is not ready")]
    NotReady,

    #[error(transparent)]
    Renderer(#[from] RendererError),
}

/// State of the currently mounted document
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSession {
    pub document: DocumentRef,
    pub generation: u64,
    pub title: String,
    pub current_page: u32,
    pub total_pages: u32,
    pub outline: Vec<OutlineNode>,
    pub loading: bool,
    /// Download progress as a fraction, when the renderer knows the size
    pub progress: Option<f64>,
    pub renderer_error: Option<String>,
    /// Polling gave up; offer a manual reload
    pub reload_prompt: bool,
    pub outline_open: bool,
}

impl ViewerSession {
    fn new(document: DocumentRef, generation: u64) -> Self {
        Self {
            title: document.default_title(),
            document,
            generation,
            current_page: 1,
            total_pages: 0,
            outline: Vec::new(),
            loading: true,
            progress: None,
            renderer_error: None,
            reload_prompt: false,
            outline_open: false,
        }
    }

    /// `Page 3 of 48`, once the page count is known
    pub fn page_label(&self) -> Option<String> {
        (self.total_pages > 0).then(|| format!("Page {} of {}", self.current_page, self.total_pages))
    }

    fn apply(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::PageChanged { page, total } => {
                self.current_page = page;
                if let Some(total) = total {
                    self.total_pages = total;
                }
            }
            BridgeEvent::Progress { loaded, total } => {
                self.progress = total
                    .filter(|total| *total > 0)
                    .map(|total| (loaded as f64 / total as f64).min(1.0));
            }
            BridgeEvent::RendererFailed(message) => {
                tracing::warn!(document = %self.document, %message, "Renderer reported an error");
                self.renderer_error = Some(message);
            }
            BridgeEvent::TitleExtracted(title) => {
                let title = title.trim();
                if !title.is_empty() && !self.document.is_identifier(title) {
                    self.title = title.to_string();
                }
            }
            BridgeEvent::OutlineExtracted(outline) => {
                self.outline = outline;
            }
            BridgeEvent::Settled { page, total } => {
                self.current_page = page;
                self.total_pages = total;
                self.loading = false;
            }
            BridgeEvent::PollingAbandoned { attempts } => {
                tracing::warn!(document = %self.document, attempts, "Viewer did not initialize");
                self.reload_prompt = true;
            }
        }
    }
}

/// Frame, polling task and listeners belonging to one mount.
///
/// Dropping it tears all three down.
struct Mount {
    frame: Arc<dyn RendererFrame>,
    poller: JoinHandle<()>,
    subscriptions: Subscriptions,
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.poller.abort();
        self.subscriptions.release_all();
    }
}

pub struct ViewerHost {
    config: ViewerConfig,
    generation: u64,
    session: Option<ViewerSession>,
    mount: Option<Mount>,
    chrome: ChromeVisibility,
    events_tx: mpsc::UnboundedSender<BridgeMessage>,
    events_rx: mpsc::UnboundedReceiver<BridgeMessage>,
}

impl ViewerHost {
    pub fn new(config: ViewerConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            chrome: ChromeVisibility::new(config.chrome_hide_delay, config.wide_viewport_min_width),
            config,
            generation: 0,
            session: None,
            mount: None,
            events_tx,
            events_rx,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn session(&self) -> Option<&ViewerSession> {
        self.session.as_ref()
    }

    /// Mount `document` in `frame`, replacing whatever was mounted before.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(&mut self, document: DocumentRef, frame: Arc<dyn RendererFrame>) -> u64 {
        self.teardown();
        self.generation += 1;
        let generation = self.generation;

        tracing::info!(document = %document, generation, src = %document.frame_src(), "Mounting viewer");

        let subscriptions = Subscriptions::new();
        let bridge = RendererBridge::new(
            frame.clone(),
            generation,
            self.events_tx.clone(),
            subscriptions.clone(),
            self.config.bridge(),
        );
        let poller = tokio::spawn(async move {
            bridge.run().await;
        });

        self.session = Some(ViewerSession::new(document, generation));
        self.mount = Some(Mount {
            frame,
            poller,
            subscriptions,
        });
        self.chrome.touch(Instant::now());

        generation
    }

    /// Re-mount the current document in a fresh frame
    pub fn reload(&mut self, frame: Arc<dyn RendererFrame>) -> Result<u64, ViewerError> {
        let document = self
            .session
            .as_ref()
            .map(|session| session.document.clone())
            .ok_or(ViewerError::NotMounted)?;
        Ok(self.mount(document, frame))
    }

    pub fn unmount(&mut self) {
        self.teardown();
        self.session = None;
    }

    fn teardown(&mut self) {
        if self.mount.take().is_some() {
            tracing::debug!(generation = self.generation, "Tore down viewer mount");
        }
        self.chrome.clear();
    }

    /// Apply one bridge message; stale generations are ignored.
    pub fn apply(&mut self, message: BridgeMessage) -> bool {
        match self.session.as_mut() {
            Some(session) if session.generation == message.generation => {
                session.apply(message.event);
                true
            }
            _ => {
                tracing::trace!(
                    stale = message.generation,
                    current = self.generation,
                    "Dropping bridge event from previous mount"
                );
                false
            }
        }
    }

    /// Apply every queued bridge message without waiting
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.events_rx.try_recv() {
            if self.apply(message) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next bridge message and apply it
    pub async fn next_event(&mut self) -> Option<bool> {
        let message = self.events_rx.recv().await?;
        Some(self.apply(message))
    }

    pub fn interact(&mut self, interaction: Interaction) {
        tracing::trace!(?interaction, "Chrome interaction");
        self.chrome.touch(Instant::now());
    }

    pub fn controls_visible(&self, viewport_width: u32) -> bool {
        self.chrome.is_visible(Instant::now(), viewport_width)
    }

    fn application(&self) -> Option<Arc<dyn ViewerApplication>> {
        self.mount.as_ref()?.frame.application().ok().flatten()
    }

    /// Returns whether the renderer was there to act on it
    pub fn zoom_in(&self) -> bool {
        match self.application() {
            Some(app) => {
                app.zoom_in();
                true
            }
            None => false,
        }
    }

    pub fn zoom_out(&self) -> bool {
        match self.application() {
            Some(app) => {
                app.zoom_out();
                true
            }
            None => false,
        }
    }

    /// Jump to an outline destination.
    ///
    /// The renderer scrolls the target to the very top of its container; after
    /// it settles the container is pulled back by a fraction of its height so
    /// the heading is not hidden under the chrome.
    pub async fn navigate_to(&mut self, destination: &Destination) -> Result<(), ViewerError> {
        let mount = self.mount.as_ref().ok_or(ViewerError::NotMounted)?;
        let frame = mount.frame.clone();
        let app = self.application().ok_or(ViewerError::NotReady)?;

        self.close_outline();

        if let Err(e) = app.go_to_destination(destination).await {
            tracing::warn!(error = %e, "Outline navigation failed");
            return Err(e.into());
        }

        tokio::time::sleep(self.config.settle_delay).await;

        if let Some(height) = frame.viewport_height() {
            frame.scroll_by(-(height * self.config.scroll_correction));
        }

        Ok(())
    }

    /// Where the download control sends the browser
    pub fn download_url(&self) -> Option<String> {
        self.session
            .as_ref()
            .map(|session| session.document.download_path())
    }

    pub fn open_outline(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.outline_open = true;
        }
    }

    pub fn close_outline(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.outline_open = false;
        }
    }

    pub fn toggle_outline(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.outline_open = !session.outline_open;
        }
    }
}

impl Drop for ViewerHost {
    fn drop(&mut self) {
        self.teardown();
    }
}
