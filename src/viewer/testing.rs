//! In-memory renderer used by the viewer tests

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::renderer::{
    Destination, EventBus, ListenerId, OutlineNode, RendererError, RendererEvent,
    RendererEventKind, RendererFrame, RendererListener, ViewerApplication,
};

#[derive(Default)]
pub struct FakeBus {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(RendererEventKind, ListenerId, RendererListener)>>,
}

impl FakeBus {
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn emit(&self, event: RendererEvent) {
        let kind = event.kind();
        let matching: Vec<RendererListener> = self
            .listeners
            .lock()
            .iter()
            .filter(|(k, _, _)| *k == kind)
            .map(|(_, _, listener)| listener.clone())
            .collect();
        for listener in matching {
            listener(&event);
        }
    }
}

impl EventBus for FakeBus {
    fn on(&self, kind: RendererEventKind, listener: RendererListener) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().push((kind, id, listener));
        id
    }

    fn off(&self, kind: RendererEventKind, id: ListenerId) {
        self.listeners
            .lock()
            .retain(|(k, existing, _)| !(*k == kind && *existing == id));
    }
}

pub struct FakeApp {
    bus: Arc<FakeBus>,
    bus_ready: AtomicBool,
    document: AtomicBool,
    pages: AtomicU32,
    page: AtomicU32,
    zoom: AtomicI32,
    metadata_title: Mutex<Option<String>>,
    info_title: Mutex<Option<String>>,
    outline: Mutex<Result<Vec<OutlineNode>, ()>>,
    outline_gate: Mutex<Option<Arc<Notify>>>,
    visited: Mutex<Vec<Destination>>,
}

impl FakeApp {
    /// Application object exists but its event bus does not yet
    pub fn starting() -> Self {
        Self {
            bus: Arc::new(FakeBus::default()),
            bus_ready: AtomicBool::new(false),
            document: AtomicBool::new(false),
            pages: AtomicU32::new(0),
            page: AtomicU32::new(1),
            zoom: AtomicI32::new(0),
            metadata_title: Mutex::new(None),
            info_title: Mutex::new(None),
            outline: Mutex::new(Ok(Vec::new())),
            outline_gate: Mutex::new(None),
            visited: Mutex::new(Vec::new()),
        }
    }

    /// Fully started with a document of `pages` pages
    pub fn loaded(pages: u32) -> Self {
        let app = Self::starting();
        app.enable_event_bus();
        app.load_document(pages);
        app
    }

    pub fn enable_event_bus(&self) {
        self.bus_ready.store(true, Ordering::SeqCst);
    }

    pub fn load_document(&self, pages: u32) {
        self.document.store(true, Ordering::SeqCst);
        self.pages.store(pages, Ordering::SeqCst);
    }

    pub fn set_pages(&self, pages: u32) {
        self.pages.store(pages, Ordering::SeqCst);
    }

    pub fn set_metadata_title(&self, title: Option<&str>) {
        *self.metadata_title.lock() = title.map(str::to_string);
    }

    pub fn set_info_title(&self, title: Option<&str>) {
        *self.info_title.lock() = title.map(str::to_string);
    }

    pub fn set_outline(&self, outline: Vec<OutlineNode>) {
        *self.outline.lock() = Ok(outline);
    }

    pub fn fail_outline(&self) {
        *self.outline.lock() = Err(());
    }

    /// Make `outline()` wait until the returned handle is notified
    pub fn hold_outline(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.outline_gate.lock() = Some(gate.clone());
        gate
    }

    pub fn emit(&self, event: RendererEvent) {
        self.bus.emit(event);
    }

    pub fn listener_count(&self) -> usize {
        self.bus.listener_count()
    }

    pub fn zoom_level(&self) -> i32 {
        self.zoom.load(Ordering::SeqCst)
    }

    pub fn visited(&self) -> Vec<Destination> {
        self.visited.lock().clone()
    }
}

#[async_trait]
impl ViewerApplication for FakeApp {
    fn event_bus(&self) -> Option<Arc<dyn EventBus>> {
        if self.bus_ready.load(Ordering::SeqCst) {
            Some(self.bus.clone() as Arc<dyn EventBus>)
        } else {
            None
        }
    }

    fn has_document(&self) -> bool {
        self.document.load(Ordering::SeqCst)
    }

    fn pages_count(&self) -> u32 {
        self.pages.load(Ordering::SeqCst)
    }

    fn page(&self) -> u32 {
        self.page.load(Ordering::SeqCst)
    }

    fn metadata_title(&self) -> Result<Option<String>, RendererError> {
        Ok(self.metadata_title.lock().clone())
    }

    fn document_info_title(&self) -> Result<Option<String>, RendererError> {
        Ok(self.info_title.lock().clone())
    }

    async fn outline(&self) -> Result<Vec<OutlineNode>, RendererError> {
        let gate = self.outline_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.outline
            .lock()
            .clone()
            .map_err(|_| RendererError::Missing("outline"))
    }

    fn zoom_in(&self) {
        self.zoom.fetch_add(1, Ordering::SeqCst);
    }

    fn zoom_out(&self) {
        self.zoom.fetch_sub(1, Ordering::SeqCst);
    }

    async fn go_to_destination(&self, destination: &Destination) -> Result<(), RendererError> {
        self.visited.lock().push(destination.clone());
        Ok(())
    }
}

pub struct FakeFrame {
    app: Mutex<Option<Arc<FakeApp>>>,
    reachable: AtomicBool,
    accesses: AtomicU32,
    viewport_height: f64,
    scrolled: Mutex<f64>,
}

impl FakeFrame {
    /// Reachable frame whose renderer has not started
    pub fn empty() -> Self {
        Self {
            app: Mutex::new(None),
            reachable: AtomicBool::new(true),
            accesses: AtomicU32::new(0),
            viewport_height: 800.0,
            scrolled: Mutex::new(0.0),
        }
    }

    /// Frame whose runtime cannot be touched yet
    pub fn unreachable() -> Self {
        let frame = Self::empty();
        frame.reachable.store(false, Ordering::SeqCst);
        frame
    }

    pub fn with_app(app: Arc<FakeApp>) -> Self {
        let frame = Self::empty();
        frame.install(app);
        frame
    }

    pub fn install(&self, app: Arc<FakeApp>) {
        *self.app.lock() = Some(app);
        self.reachable.store(true, Ordering::SeqCst);
    }

    pub fn access_count(&self) -> u32 {
        self.accesses.load(Ordering::SeqCst)
    }

    pub fn scrolled(&self) -> f64 {
        *self.scrolled.lock()
    }
}

impl RendererFrame for FakeFrame {
    fn application(&self) -> Result<Option<Arc<dyn ViewerApplication>>, RendererError> {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(RendererError::NotReady);
        }
        Ok(self
            .app
            .lock()
            .clone()
            .map(|app| app as Arc<dyn ViewerApplication>))
    }

    fn viewport_height(&self) -> Option<f64> {
        Some(self.viewport_height)
    }

    fn scroll_by(&self, delta: f64) {
        *self.scrolled.lock() += delta;
    }
}
