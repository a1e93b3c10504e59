//! Viewer panel state: active system, search text, selected part, auto-rotate.
//!
//! Every mutation follows the same order: update the state, recompute derived
//! view state (the highlight pass over the active scene), then notify
//! subscribers with exactly one [`ViewerEvent`].

use glam::Vec3;

use crate::catalog::Catalog;
use crate::highlight::{HighlightQuery, HighlightStats, Highlighter};
use crate::loader::task::Waker;
use crate::loader::{AssetLoad, AssetSource, FsSource, LoadError, LoadPoll, Progress};
use crate::model::{PartId, PartInfo, SystemContent, SystemDescriptor};
use crate::procedural;
use crate::scene::SceneGraph;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    SystemChanged { index: usize, id: String },
    SelectionChanged(Option<PartInfo>),
    SearchChanged { text: String, matches: usize },
    AutoRotateChanged(bool),
    ResetView,
    LoadProgress(Progress),
    ContentReady { parts: usize },
    LoadFailed(String),
    LoadCancelled,
}

/// Scene of the active system together with its original-material table.
#[derive(Debug, Clone)]
pub struct ActiveScene {
    pub graph: SceneGraph,
    highlighter: Highlighter,
}

impl ActiveScene {
    pub fn new(graph: SceneGraph) -> Self {
        Self {
            graph,
            highlighter: Highlighter::new(),
        }
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    fn highlight(&mut self, search: &str, selected: Option<&PartId>) -> HighlightStats {
        self.highlighter.apply(Some(&mut self.graph), search, selected)
    }
}

#[derive(Debug)]
pub enum Content {
    Empty,
    Loading(Progress),
    Ready(ActiveScene),
    Failed(String),
}

type Subscriber = Box<dyn FnMut(&ViewerEvent)>;
type SourceFactory = Box<dyn Fn() -> Box<dyn AssetSource>>;

pub struct ViewerState {
    catalog: Catalog,
    active: usize,
    selected: Option<PartId>,
    search: String,
    auto_rotate: bool,
    reset_view: bool,
    content: Content,
    load: Option<AssetLoad>,
    generation: u64,
    waker: Option<Waker>,
    make_source: SourceFactory,
    subscribers: Vec<Subscriber>,
}

impl ViewerState {
    /// Show the first system of `catalog`.
    pub fn new(catalog: Catalog) -> Self {
        Self::with_source(catalog, Box::new(|| Box::new(FsSource)), None)
    }

    /// Like [`ViewerState::new`] with a custom byte source for asset systems and
    /// an optional waker called from the loader thread.
    pub fn with_source(catalog: Catalog, make_source: SourceFactory, waker: Option<Waker>) -> Self {
        let mut state = Self {
            catalog,
            active: 0,
            selected: None,
            search: String::new(),
            auto_rotate: false,
            reset_view: false,
            content: Content::Empty,
            load: None,
            generation: 0,
            waker,
            make_source,
            subscribers: Vec::new(),
        };
        state.load_active_content();
        state
    }

    pub fn set_waker(&mut self, waker: Option<Waker>) {
        self.waker = waker;
    }

    /// Register a callback invoked once after every state change.
    pub fn subscribe(&mut self, callback: impl FnMut(&ViewerEvent) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    fn emit(&mut self, event: ViewerEvent) {
        log::debug!("viewer event: {:?}", event);
        for s in &mut self.subscribers {
            s(&event);
        }
    }

    // ── queries ─────────────────────────────────────────────────────────────

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_system(&self) -> Option<&SystemDescriptor> {
        self.catalog.systems.get(self.active)
    }

    pub fn selected(&self) -> Option<&PartId> {
        self.selected.as_ref()
    }

    pub fn selected_info(&self) -> Option<PartInfo> {
        let id = self.selected.as_ref()?;
        let scene = self.scene()?;
        scene.part_info(scene.find_part(id)?)
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn scene(&self) -> Option<&SceneGraph> {
        match &self.content {
            Content::Ready(s) => Some(&s.graph),
            _ => None,
        }
    }

    pub fn active_scene(&self) -> Option<&ActiveScene> {
        match &self.content {
            Content::Ready(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.content, Content::Loading(_))
    }

    /// Bumped whenever a new scene becomes ready; the canvas reframes on change.
    pub fn content_generation(&self) -> u64 {
        self.generation
    }

    pub fn parts(&self) -> Vec<PartInfo> {
        self.scene().map(SceneGraph::parts).unwrap_or_default()
    }

    /// Parts whose name contains the current search text.
    pub fn search_matches(&self) -> Vec<PartInfo> {
        let query = HighlightQuery::new(&self.search, None);
        self.parts()
            .into_iter()
            .filter(|p| query.matches_name(&p.name))
            .collect()
    }

    // ── transitions ─────────────────────────────────────────────────────────

    /// Switch to the system at `index`. Clears search and selection, keeps
    /// auto-rotate. Any load still running for the previous system is cancelled.
    pub fn set_active_system(&mut self, index: usize) -> bool {
        let Some(system) = self.catalog.systems.get(index) else {
            log::warn!("no system at index {}", index);
            return false;
        };
        let id = system.id.clone();
        let reload = index != self.active || matches!(self.content, Content::Empty | Content::Failed(_));
        self.active = index;
        self.selected = None;
        self.search.clear();
        if reload {
            log::info!("switching to system '{}'", id);
            self.load_active_content();
        } else {
            self.refresh();
        }
        self.emit(ViewerEvent::SystemChanged { index, id });
        true
    }

    pub fn set_active_system_by_id(&mut self, id: &str) -> bool {
        match self.catalog.position(id) {
            Some(index) => self.set_active_system(index),
            None => {
                log::warn!("unknown system '{}'", id);
                false
            }
        }
    }

    /// Select a part of the active scene, replacing any previous selection.
    /// Ids the scene does not contain are ignored.
    pub fn select_part(&mut self, id: PartId) -> Option<PartInfo> {
        if id.is_empty() {
            self.clear_selection();
            return None;
        }
        let info = match self.scene().and_then(|s| s.find_part(&id).and_then(|n| s.part_info(n))) {
            Some(info) => info,
            None => {
                log::warn!("ignoring selection of unknown part {}", id);
                return None;
            }
        };
        self.selected = Some(id);
        self.refresh();
        self.emit(ViewerEvent::SelectionChanged(Some(info.clone())));
        Some(info)
    }

    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.refresh();
            self.emit(ViewerEvent::SelectionChanged(None));
        }
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.search {
            return;
        }
        self.search = text;
        self.refresh();
        let matches = self.search_matches().len();
        self.emit(ViewerEvent::SearchChanged {
            text: self.search.clone(),
            matches,
        });
    }

    pub fn clear_search(&mut self) {
        self.set_search(String::new());
    }

    pub fn toggle_auto_rotate(&mut self) -> bool {
        self.auto_rotate = !self.auto_rotate;
        self.emit(ViewerEvent::AutoRotateChanged(self.auto_rotate));
        self.auto_rotate
    }

    /// Ask the canvas to put the camera back to its initial pose.
    pub fn request_reset_view(&mut self) {
        self.reset_view = true;
        self.emit(ViewerEvent::ResetView);
    }

    /// Consume a pending reset-view request.
    pub fn take_reset_view(&mut self) -> bool {
        std::mem::take(&mut self.reset_view)
    }

    /// Nearest part hit by a world-space ray.
    pub fn pick(&self, origin: Vec3, dir: Vec3) -> Option<PartInfo> {
        let scene = self.scene()?;
        let (node, _) = scene.pick(origin, dir)?;
        scene.part_info(node)
    }

    /// Pick and select in one step, as a canvas click does.
    pub fn click(&mut self, origin: Vec3, dir: Vec3) -> Option<PartInfo> {
        let hit = self.pick(origin, dir)?;
        self.select_part(hit.id)
    }

    /// Ask the running load to stop. The viewer drops to `Empty` once the
    /// worker acknowledges; selecting the system again restarts it.
    pub fn cancel_load(&self) -> bool {
        match &self.load {
            Some(load) => {
                load.cancel();
                true
            }
            None => false,
        }
    }

    /// Integrate events from a running asset load. Call once per frame.
    pub fn poll_load(&mut self) {
        let Some(load) = self.load.as_mut() else {
            return;
        };
        match load.poll() {
            LoadPoll::Pending(p) => {
                if matches!(self.content, Content::Loading(old) if old != p) {
                    self.content = Content::Loading(p);
                    self.emit(ViewerEvent::LoadProgress(p));
                }
            }
            LoadPoll::Done(result) => {
                self.load = None;
                match result {
                    Ok(graph) => {
                        let parts = self.install_scene(graph);
                        self.emit(ViewerEvent::ContentReady { parts });
                    }
                    Err(LoadError::Cancelled) => {
                        let id = self.active_system().map_or("", |s| s.id.as_str());
                        log::info!("load of '{}' cancelled", id);
                        self.content = Content::Empty;
                        self.emit(ViewerEvent::LoadCancelled);
                    }
                    Err(e) => {
                        let message = e.to_string();
                        log::warn!("load failed: {}", message);
                        self.content = Content::Failed(message.clone());
                        self.emit(ViewerEvent::LoadFailed(message));
                    }
                }
            }
        }
    }

    fn load_active_content(&mut self) {
        if let Some(load) = self.load.take() {
            load.cancel();
        }
        let Some(content) = self.catalog.systems.get(self.active).map(|s| s.content.clone()) else {
            self.content = Content::Empty;
            return;
        };
        match content {
            SystemContent::Procedural { kind } => {
                self.install_scene(procedural::build_scene(&kind));
            }
            SystemContent::Asset { path } => {
                let source = (self.make_source)();
                self.load = Some(AssetLoad::spawn(path, source, self.waker.clone()));
                self.content = Content::Loading(Progress::default());
            }
        }
    }

    /// Make `graph` the active scene and return its part count. Procedural
    /// scenes are installed inside a system switch, whose event covers them.
    fn install_scene(&mut self, graph: SceneGraph) -> usize {
        let parts = graph.mesh_nodes().len();
        self.content = Content::Ready(ActiveScene::new(graph));
        self.generation += 1;
        self.refresh();
        parts
    }

    fn refresh(&mut self) {
        if let Content::Ready(scene) = &mut self.content {
            scene.highlight(&self.search, self.selected.as_ref());
        }
    }
}
