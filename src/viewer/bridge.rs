//! Renderer bridge
//!
//! Bounded polling relationship with the renderer inside a mounted frame:
//!
//! ```text
//! Waiting -> ListenersAttached -> DataExtracted -> Settled
//!    \______________\__________________\__________> Abandoned (attempt ceiling)
//! ```
//!
//! Each tick re-reads the frame's application object, since the renderer may
//! still be starting or may have replaced it. A phase whose prerequisites are
//! missing simply repeats on the next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::renderer::{
    EventBus, OutlineNode, RendererEvent, RendererEventKind, RendererFrame, RendererListener,
    Subscriptions, ViewerApplication,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgePhase {
    Waiting,
    ListenersAttached,
    DataExtracted,
    Settled,
    Abandoned,
}

impl BridgePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BridgePhase::Settled | BridgePhase::Abandoned)
    }
}

/// What the bridge learned about the mounted document
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    PageChanged { page: u32, total: Option<u32> },
    Progress { loaded: u64, total: Option<u64> },
    RendererFailed(String),
    TitleExtracted(String),
    OutlineExtracted(Vec<OutlineNode>),
    Settled { page: u32, total: u32 },
    PollingAbandoned { attempts: u32 },
}

/// A bridge event tagged with the mount generation that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeMessage {
    pub generation: u64,
    pub event: BridgeEvent,
}

pub type BridgeSender = mpsc::UnboundedSender<BridgeMessage>;

#[derive(Debug, Clone, Copy)]
pub struct BridgeConfig {
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            max_attempts: 60,
        }
    }
}

pub struct RendererBridge {
    frame: Arc<dyn RendererFrame>,
    generation: u64,
    events: BridgeSender,
    subscriptions: Subscriptions,
    config: BridgeConfig,
    phase: BridgePhase,
    attempts: u32,
    title_found: bool,
    outline_found: bool,
}

impl RendererBridge {
    pub fn new(
        frame: Arc<dyn RendererFrame>,
        generation: u64,
        events: BridgeSender,
        subscriptions: Subscriptions,
        config: BridgeConfig,
    ) -> Self {
        Self {
            frame,
            generation,
            events,
            subscriptions,
            config,
            phase: BridgePhase::Waiting,
            attempts: 0,
            title_found: false,
            outline_found: false,
        }
    }

    pub fn phase(&self) -> BridgePhase {
        self.phase
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Poll every `poll_interval` until settled or the attempt ceiling is hit.
    ///
    /// Ticks never overlap: a slow outline fetch delays the next tick rather
    /// than running concurrently with it.
    pub async fn run(mut self) -> BridgePhase {
        let period = self.config.poll_interval;
        let mut ticks = interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticks.tick().await;
            if self.poll_once().await.is_terminal() {
                break;
            }
        }

        tracing::debug!(
            generation = self.generation,
            phase = ?self.phase,
            attempts = self.attempts,
            "Renderer bridge stopped polling"
        );
        self.phase
    }

    /// One polling attempt
    pub async fn poll_once(&mut self) -> BridgePhase {
        if self.phase.is_terminal() {
            return self.phase;
        }
        self.attempts += 1;

        match self.frame.application() {
            Ok(Some(app)) => self.advance(app).await,
            Ok(None) => {
                tracing::trace!(attempt = self.attempts, "Renderer not started yet");
            }
            Err(e) => {
                tracing::trace!(attempt = self.attempts, error = %e, "Renderer frame not reachable yet");
            }
        }

        if !self.phase.is_terminal() && self.attempts >= self.config.max_attempts {
            tracing::warn!(
                generation = self.generation,
                attempts = self.attempts,
                "Renderer never became ready, giving up"
            );
            self.phase = BridgePhase::Abandoned;
            self.publish(BridgeEvent::PollingAbandoned {
                attempts: self.attempts,
            });
        }

        self.phase
    }

    async fn advance(&mut self, app: Arc<dyn ViewerApplication>) {
        if self.phase == BridgePhase::Waiting {
            let Some(bus) = app.event_bus() else {
                return;
            };
            self.attach_listeners(&app, &bus);
            self.phase = BridgePhase::ListenersAttached;

            if app.has_document() && app.pages_count() > 0 {
                self.publish(BridgeEvent::PageChanged {
                    page: app.page().max(1),
                    total: Some(app.pages_count()),
                });
            }
        }

        if !app.has_document() {
            return;
        }

        self.extract_metadata(app.as_ref()).await;
        if self.phase == BridgePhase::ListenersAttached {
            self.phase = BridgePhase::DataExtracted;
        }

        let total = app.pages_count();
        if total > 0 {
            self.phase = BridgePhase::Settled;
            self.publish(BridgeEvent::Settled {
                page: app.page().max(1),
                total,
            });
        }
    }

    fn attach_listeners(&self, app: &Arc<dyn ViewerApplication>, bus: &Arc<dyn EventBus>) {
        let generation = self.generation;

        let events = self.events.clone();
        // Weak: the renderer owns its application object, not us
        let weak_app = Arc::downgrade(app);
        let on_page: RendererListener = Arc::new(move |event: &RendererEvent| {
            if let RendererEvent::PageChanging { page_number } = event {
                let total = weak_app
                    .upgrade()
                    .map(|app| app.pages_count())
                    .filter(|count| *count > 0);
                let _ = events.send(BridgeMessage {
                    generation,
                    event: BridgeEvent::PageChanged {
                        page: *page_number,
                        total,
                    },
                });
            }
        });

        let events = self.events.clone();
        let on_progress: RendererListener = Arc::new(move |event: &RendererEvent| {
            if let RendererEvent::Progress { loaded, total } = event {
                let _ = events.send(BridgeMessage {
                    generation,
                    event: BridgeEvent::Progress {
                        loaded: *loaded,
                        total: *total,
                    },
                });
            }
        });

        let events = self.events.clone();
        let on_error: RendererListener = Arc::new(move |event: &RendererEvent| {
            if let RendererEvent::Error { message } = event {
                let _ = events.send(BridgeMessage {
                    generation,
                    event: BridgeEvent::RendererFailed(message.clone()),
                });
            }
        });

        self.subscriptions
            .attach(bus, RendererEventKind::PageChanging, on_page);
        self.subscriptions
            .attach(bus, RendererEventKind::Progress, on_progress);
        self.subscriptions.attach(bus, RendererEventKind::Error, on_error);

        tracing::debug!(generation, "Attached renderer listeners");
    }

    /// Title and outline; failures are retried on later ticks.
    async fn extract_metadata(&mut self, app: &dyn ViewerApplication) {
        if !self.title_found {
            if let Some(title) = extract_title(app) {
                self.title_found = true;
                self.publish(BridgeEvent::TitleExtracted(title));
            }
        }

        if !self.outline_found {
            match app.outline().await {
                Ok(outline) if !outline.is_empty() => {
                    tracing::debug!(
                        generation = self.generation,
                        entries = outline.iter().map(OutlineNode::count).sum::<usize>(),
                        "Extracted outline"
                    );
                    self.outline_found = true;
                    self.publish(BridgeEvent::OutlineExtracted(outline));
                }
                Ok(_) => {}
                Err(e) => tracing::trace!(error = %e, "Outline not available"),
            }
        }
    }

    fn publish(&self, event: BridgeEvent) {
        // A closed channel means the host is gone; nothing left to tell.
        let _ = self.events.send(BridgeMessage {
            generation: self.generation,
            event,
        });
    }
}

/// Metadata `dc:title`, falling back to the document-info `Title`
fn extract_title(app: &dyn ViewerApplication) -> Option<String> {
    let non_empty = |title: Option<String>| title.filter(|t| !t.trim().is_empty());

    let from_metadata = match app.metadata_title() {
        Ok(title) => non_empty(title),
        Err(e) => {
            tracing::trace!(error = %e, "Metadata title unavailable");
            None
        }
    };

    from_metadata.or_else(|| non_empty(app.document_info_title().ok().flatten()))
}
