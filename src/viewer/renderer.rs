//! Embedded renderer surface
//!
//! The PDF renderer runs inside an isolated frame and only becomes reachable
//! after its own asynchronous start-up. These traits describe the small part
//! of its runtime the host talks to; nothing here assumes the application
//! object exists when the frame is mounted.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Opaque in-document location (named destination or explicit array)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Destination(pub Value);

impl Destination {
    pub fn named(name: impl Into<String>) -> Self {
        Self(Value::String(name.into()))
    }
}

/// One table-of-contents entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineNode {
    pub title: String,
    #[serde(default, rename = "dest", skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
    #[serde(default, rename = "items")]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Number of entries in this subtree, itself included
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(OutlineNode::count).sum::<usize>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererEventKind {
    PageChanging,
    Progress,
    Error,
}

impl RendererEventKind {
    /// Event name on the renderer's bus
    pub fn as_str(&self) -> &'static str {
        match self {
            RendererEventKind::PageChanging => "pagechanging",
            RendererEventKind::Progress => "progress",
            RendererEventKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RendererEvent {
    PageChanging { page_number: u32 },
    Progress { loaded: u64, total: Option<u64> },
    Error { message: String },
}

impl RendererEvent {
    pub fn kind(&self) -> RendererEventKind {
        match self {
            RendererEvent::PageChanging { .. } => RendererEventKind::PageChanging,
            RendererEvent::Progress { .. } => RendererEventKind::Progress,
            RendererEvent::Error { .. } => RendererEventKind::Error,
        }
    }
}

pub type ListenerId = u64;

pub type RendererListener = Arc<dyn Fn(&RendererEvent) + Send + Sync>;

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("renderer frame is not accessible yet")]
    NotReady,

    #[error("renderer has no {0}")]
    Missing(&'static str),

    #[error("renderer call failed: {0}")]
    Call(String),
}

/// The renderer's event bus
pub trait EventBus: Send + Sync {
    fn on(&self, kind: RendererEventKind, listener: RendererListener) -> ListenerId;
    fn off(&self, kind: RendererEventKind, id: ListenerId);
}

/// The renderer's application object
#[async_trait]
pub trait ViewerApplication: Send + Sync {
    fn event_bus(&self) -> Option<Arc<dyn EventBus>>;

    /// Whether a document object has been loaded
    fn has_document(&self) -> bool;

    fn pages_count(&self) -> u32;

    /// Current 1-based page
    fn page(&self) -> u32;

    /// `dc:title` from the document's XMP metadata
    fn metadata_title(&self) -> Result<Option<String>, RendererError>;

    /// `Title` from the document-info dictionary
    fn document_info_title(&self) -> Result<Option<String>, RendererError>;

    async fn outline(&self) -> Result<Vec<OutlineNode>, RendererError>;

    fn zoom_in(&self);

    fn zoom_out(&self);

    /// Resolves once the renderer has jumped to `destination`
    async fn go_to_destination(&self, destination: &Destination) -> Result<(), RendererError>;
}

/// The isolated frame hosting the renderer
pub trait RendererFrame: Send + Sync {
    /// `Ok(None)` while the renderer is still starting; `Err` when the frame
    /// cannot be reached at all yet. Both mean "try again later".
    fn application(&self) -> Result<Option<Arc<dyn ViewerApplication>>, RendererError>;

    /// Visible height of the renderer's scroll container
    fn viewport_height(&self) -> Option<f64>;

    /// Scroll the renderer's container by `delta` pixels
    fn scroll_by(&self, delta: f64);
}

/// Registered listener; unregisters itself when dropped.
pub struct Subscription {
    bus: Weak<dyn EventBus>,
    kind: RendererEventKind,
    id: ListenerId,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.off(self.kind, self.id);
        }
    }
}

/// Listeners attached on behalf of one mounted document
#[derive(Clone, Default)]
pub struct Subscriptions {
    inner: Arc<Mutex<Vec<Subscription>>>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(
        &self,
        bus: &Arc<dyn EventBus>,
        kind: RendererEventKind,
        listener: RendererListener,
    ) {
        let id = bus.on(kind, listener);
        self.inner.lock().push(Subscription {
            bus: Arc::downgrade(bus),
            kind,
            id,
        });
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unregister everything
    pub fn release_all(&self) {
        let released = std::mem::take(&mut *self.inner.lock());
        tracing::trace!(count = released.len(), "Releasing renderer listeners");
        drop(released);
    }
}
