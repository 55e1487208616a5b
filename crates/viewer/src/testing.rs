//! In-memory host collaborators for unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use foundation::ViewerName;
use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::future::LocalBoxFuture;
use scene::components::MeshGeometry;
use scene::{CameraPose, PerspectiveCamera, Scene};

use crate::config::ViewerConfig;
use crate::error::{HostError, LoadError};
use crate::fullscreen::FullscreenVariant;
use crate::host::{
    Button, CanvasSurface, GeometryLoader, OrbitControls, ProgressBar, ProgressCallback,
    Renderer, SurfaceSize, ViewerParts, Widget,
};
use crate::instance::ViewerInstance;
use crate::progress::{LoadProgress, ProgressEvent};

pub fn sample_geometry() -> MeshGeometry {
    MeshGeometry::triangles(
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        vec![0, 1, 2],
    )
    .with_colors(vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
}

#[derive(Default)]
pub struct FakeWidget {
    hidden: Cell<bool>,
}

impl FakeWidget {
    pub fn is_hidden_now(&self) -> bool {
        self.hidden.get()
    }
}

impl Widget for FakeWidget {
    fn set_hidden(&self, hidden: bool) {
        self.hidden.set(hidden);
    }

    fn is_hidden(&self) -> bool {
        self.hidden.get()
    }
}

#[derive(Default)]
pub struct FakeButton {
    widget: FakeWidget,
    handlers: RefCell<Vec<Box<dyn FnMut()>>>,
}

impl FakeButton {
    pub fn is_hidden_now(&self) -> bool {
        self.widget.is_hidden_now()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn click(&self) {
        for handler in self.handlers.borrow_mut().iter_mut() {
            handler();
        }
    }
}

impl Widget for FakeButton {
    fn set_hidden(&self, hidden: bool) {
        self.widget.set_hidden(hidden);
    }

    fn is_hidden(&self) -> bool {
        self.widget.is_hidden()
    }
}

impl Button for FakeButton {
    fn on_click(&self, handler: Box<dyn FnMut()>) {
        self.handlers.borrow_mut().push(handler);
    }
}

#[derive(Default)]
pub struct FakeProgressBar {
    labels: RefCell<Vec<String>>,
}

impl FakeProgressBar {
    pub fn labels(&self) -> Vec<String> {
        self.labels.borrow().clone()
    }
}

impl ProgressBar for FakeProgressBar {
    fn show_progress(&self, progress: LoadProgress) {
        self.labels.borrow_mut().push(progress.to_string());
    }
}

pub struct FakeCanvas {
    widget: FakeWidget,
    size: Cell<SurfaceSize>,
    supported: RefCell<Vec<FullscreenVariant>>,
    requests: RefCell<Vec<FullscreenVariant>>,
}

impl FakeCanvas {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            widget: FakeWidget::default(),
            size: Cell::new(size),
            supported: RefCell::new(FullscreenVariant::FALLBACK_ORDER.to_vec()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_fullscreen(variants: &[FullscreenVariant]) -> Self {
        let canvas = Self::new(SurfaceSize::new(640.0, 480.0));
        canvas.set_supported(variants);
        canvas
    }

    pub fn set_supported(&self, variants: &[FullscreenVariant]) {
        *self.supported.borrow_mut() = variants.to_vec();
    }

    pub fn set_client_size(&self, size: SurfaceSize) {
        self.size.set(size);
    }

    pub fn fullscreen_requests(&self) -> Vec<FullscreenVariant> {
        self.requests.borrow().clone()
    }

    pub fn is_hidden_now(&self) -> bool {
        self.widget.is_hidden_now()
    }
}

impl Widget for FakeCanvas {
    fn set_hidden(&self, hidden: bool) {
        self.widget.set_hidden(hidden);
    }

    fn is_hidden(&self) -> bool {
        self.widget.is_hidden()
    }
}

impl CanvasSurface for FakeCanvas {
    fn client_size(&self) -> SurfaceSize {
        self.size.get()
    }

    fn supports_fullscreen(&self, variant: FullscreenVariant) -> bool {
        self.supported.borrow().contains(&variant)
    }

    fn request_fullscreen(&self, variant: FullscreenVariant) -> Result<(), HostError> {
        self.requests.borrow_mut().push(variant);
        Ok(())
    }
}

#[derive(Default)]
struct RendererLog {
    sizes: Vec<SurfaceSize>,
    /// Mesh count and camera aspect at each render call.
    renders: Vec<(usize, f64)>,
    failure: Option<HostError>,
}

/// Renderer handle; clones share one log.
#[derive(Clone, Default)]
pub struct FakeRenderer {
    log: Rc<RefCell<RendererLog>>,
}

impl FakeRenderer {
    pub fn sizes(&self) -> Vec<SurfaceSize> {
        self.log.borrow().sizes.clone()
    }

    pub fn render_count(&self) -> usize {
        self.log.borrow().renders.len()
    }

    pub fn mesh_counts(&self) -> Vec<usize> {
        self.log.borrow().renders.iter().map(|(m, _)| *m).collect()
    }

    pub fn last_aspect(&self) -> Option<f64> {
        self.log.borrow().renders.last().map(|(_, a)| *a)
    }

    pub fn fail_with(&self, err: HostError) {
        self.log.borrow_mut().failure = Some(err);
    }
}

impl Renderer for FakeRenderer {
    fn set_size(&mut self, size: SurfaceSize) {
        self.log.borrow_mut().sizes.push(size);
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), HostError> {
        let mut log = self.log.borrow_mut();
        log.renders.push((scene.mesh_count(), camera.aspect));
        match &log.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Controls handle; `emit` plays the role of a user drag.
#[derive(Clone, Default)]
pub struct FakeControls {
    listeners: Rc<RefCell<Vec<Box<dyn FnMut(CameraPose)>>>>,
}

impl FakeControls {
    pub fn emit(&self, pose: CameraPose) {
        for listener in self.listeners.borrow_mut().iter_mut() {
            listener(pose);
        }
    }
}

impl OrbitControls for FakeControls {
    fn on_change(&mut self, listener: Box<dyn FnMut(CameraPose)>) {
        self.listeners.borrow_mut().push(listener);
    }
}

struct PendingLoad {
    path: String,
    on_progress: ProgressCallback,
    reply: Option<oneshot::Sender<Result<MeshGeometry, LoadError>>>,
}

/// Loader whose requests are completed by the test.
#[derive(Default)]
pub struct ScriptedLoader {
    pending: RefCell<Vec<PendingLoad>>,
}

impl ScriptedLoader {
    pub fn call_count(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn paths(&self) -> Vec<String> {
        self.pending.borrow().iter().map(|p| p.path.clone()).collect()
    }

    pub fn progress(&self, call: usize, loaded: u64, total: Option<u64>) {
        let mut pending = self.pending.borrow_mut();
        (pending[call].on_progress)(ProgressEvent::new(loaded, total));
    }

    pub fn resolve(&self, call: usize, result: Result<MeshGeometry, LoadError>) {
        let reply = self.pending.borrow_mut()[call]
            .reply
            .take()
            .expect("request already resolved");
        // The receiver is gone when the instance was dropped.
        let _ = reply.send(result);
    }
}

impl GeometryLoader for ScriptedLoader {
    fn load(
        &self,
        path: &str,
        on_progress: ProgressCallback,
    ) -> LocalBoxFuture<'static, Result<MeshGeometry, LoadError>> {
        let (reply, receiver) = oneshot::channel();
        self.pending.borrow_mut().push(PendingLoad {
            path: path.to_string(),
            on_progress,
            reply: Some(reply),
        });
        let path = path.to_string();
        Box::pin(async move {
            receiver.await.unwrap_or_else(|_| {
                Err(LoadError::Network {
                    path,
                    message: "request dropped".into(),
                })
            })
        })
    }
}

/// One viewer's worth of fakes plus the executor driving its load.
pub struct Rig {
    pub name: ViewerName,
    pub asset_path: String,
    pub canvas: Rc<FakeCanvas>,
    pub fullscreen: Rc<FakeButton>,
    pub container: Rc<FakeWidget>,
    pub bar: Rc<FakeProgressBar>,
    pub renderer: FakeRenderer,
    pub controls: FakeControls,
    pub loader: Rc<ScriptedLoader>,
    pub config: ViewerConfig,
    pub viewport: SurfaceSize,
    pool: LocalPool,
}

impl Rig {
    pub fn new(name: &str, asset_path: &str) -> Self {
        Self {
            name: ViewerName::new(name).expect("valid viewer name"),
            asset_path: asset_path.to_string(),
            canvas: Rc::new(FakeCanvas::new(SurfaceSize::new(640.0, 480.0))),
            fullscreen: Rc::new(FakeButton::default()),
            container: Rc::new(FakeWidget::default()),
            bar: Rc::new(FakeProgressBar::default()),
            renderer: FakeRenderer::default(),
            controls: FakeControls::default(),
            loader: Rc::new(ScriptedLoader::default()),
            config: ViewerConfig::default(),
            viewport: SurfaceSize::new(1024.0, 768.0),
            pool: LocalPool::new(),
        }
    }

    pub fn with_viewport(mut self, viewport: SurfaceSize) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_fullscreen(self, variants: &[FullscreenVariant]) -> Self {
        self.canvas.set_supported(variants);
        self
    }

    pub fn build(&self) -> ViewerInstance {
        let parts = ViewerParts {
            canvas: self.canvas.clone(),
            fullscreen_button: self.fullscreen.clone(),
            progress_container: self.container.clone(),
            progress_bar: self.bar.clone(),
            renderer: Box::new(self.renderer.clone()),
            controls: Box::new(self.controls.clone()),
            loader: self.loader.clone(),
            spawner: Rc::new(self.pool.spawner()),
            viewport: self.viewport,
        };
        ViewerInstance::new(self.name.clone(), self.asset_path.clone(), parts, &self.config)
    }

    /// Polls spawned loads until none can make progress.
    pub fn run(&mut self) {
        self.pool.run_until_stalled();
    }
}
