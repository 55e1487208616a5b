use std::cell::RefCell;
use std::rc::{Rc, Weak};

use foundation::math::Vec3;
use foundation::{Color, ViewerName};
use futures::future::LocalFutureObj;
use futures::task::LocalSpawn;
use log::Level;
use runtime::{Diagnostic, DiagnosticLog};
use scene::components::{Material, Mesh, MeshGeometry, Transform};
use scene::{PerspectiveCamera, Scene};

use crate::config::ViewerConfig;
use crate::error::LoadError;
use crate::fullscreen::request_fullscreen;
use crate::host::{
    Button, CanvasSurface, GeometryLoader, OrbitControls, ProgressBar, ProgressCallback,
    Renderer, SurfaceSize, ViewerParts, Widget,
};
use crate::progress::LoadProgress;

/// Lifecycle phase, derived from the `loaded` flag and the scene contents.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ViewerPhase {
    /// Not activated yet; nothing fetched, widgets hidden.
    Dormant,
    /// Activated, asset not displayed. Also the terminal phase of a failed load.
    Loading,
    /// Asset displayed.
    Active,
}

/// Result of [`ViewerInstance::activate`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Activation {
    Started,
    AlreadyActivated,
}

/// State touched by render triggers. Owned by exactly one instance.
struct ViewState {
    loaded: bool,
    scene: Scene,
    camera: PerspectiveCamera,
    renderer: Box<dyn Renderer>,
    renders: u64,
}

impl ViewState {
    fn render(&mut self, name: &ViewerName, diagnostics: &RefCell<DiagnosticLog>) {
        self.renders += 1;
        if let Err(err) = self.renderer.render(&self.scene, &self.camera) {
            diagnostics
                .borrow_mut()
                .emit(Level::Warn, name, "render-failed", err.to_string());
        }
    }

    /// Matches camera aspect and drawing buffer to the surface.
    fn fit_to(&mut self, size: SurfaceSize) {
        if let Some(aspect) = size.aspect() {
            self.camera.aspect = aspect;
        }
        self.camera.update_projection_matrix();
        self.renderer.set_size(size);
    }
}

/// One lazily loaded viewer bound to one canvas.
///
/// Construction is cheap and invisible. [`ViewerInstance::activate`] reveals
/// the widgets and starts the single fetch this instance will ever issue;
/// afterwards the instance renders only on camera changes and resizes.
pub struct ViewerInstance {
    name: ViewerName,
    asset_path: String,
    placement: Transform,
    canvas: Rc<dyn CanvasSurface>,
    fullscreen_button: Rc<dyn Button>,
    progress_container: Rc<dyn Widget>,
    progress_bar: Rc<dyn ProgressBar>,
    loader: Rc<dyn GeometryLoader>,
    spawner: Rc<dyn LocalSpawn>,
    state: Rc<RefCell<ViewState>>,
    diagnostics: Rc<RefCell<DiagnosticLog>>,
    _controls: Box<dyn OrbitControls>,
}

impl ViewerInstance {
    pub fn new(
        name: ViewerName,
        asset_path: impl Into<String>,
        parts: ViewerParts,
        config: &ViewerConfig,
    ) -> Self {
        let ViewerParts {
            canvas,
            fullscreen_button,
            progress_container,
            progress_bar,
            renderer,
            mut controls,
            loader,
            spawner,
            viewport,
        } = parts;

        let camera = PerspectiveCamera::new(
            config.camera.fov_y_deg,
            viewport.aspect().unwrap_or(1.0),
            config.camera.near,
            config.camera.far,
        )
        .with_position(Vec3::from_array(config.camera.position));

        let mut scene = Scene::new(Color::from_hex(config.background));
        scene.add_light(config.light.light());

        let state = Rc::new(RefCell::new(ViewState {
            loaded: false,
            scene,
            camera,
            renderer,
            renders: 0,
        }));
        let diagnostics = Rc::new(RefCell::new(DiagnosticLog::new()));

        controls.on_change(Box::new(render_on_change(
            name.clone(),
            Rc::downgrade(&state),
            Rc::clone(&diagnostics),
        )));

        canvas.set_hidden(true);
        fullscreen_button.set_hidden(true);
        progress_container.set_hidden(true);

        Self {
            name,
            asset_path: asset_path.into(),
            placement: config.mesh.transform(),
            canvas,
            fullscreen_button,
            progress_container,
            progress_bar,
            loader,
            spawner,
            state,
            diagnostics,
            _controls: controls,
        }
    }

    pub fn name(&self) -> &ViewerName {
        &self.name
    }

    pub fn asset_path(&self) -> &str {
        &self.asset_path
    }

    /// True once [`ViewerInstance::activate`] has run. Never reset.
    pub fn is_loaded(&self) -> bool {
        self.state.borrow().loaded
    }

    pub fn phase(&self) -> ViewerPhase {
        let state = self.state.borrow();
        if !state.loaded {
            ViewerPhase::Dormant
        } else if state.scene.mesh_count() == 0 {
            ViewerPhase::Loading
        } else {
            ViewerPhase::Active
        }
    }

    /// Transitions dormant → loading. Later calls are no-ops.
    ///
    /// The fetch runs on the host spawner; this returns before any byte
    /// arrives. `loaded` is set here rather than on completion, so a second
    /// activation while the fetch is pending is already rejected.
    pub fn activate(&self) -> Activation {
        if self.state.borrow().loaded {
            return Activation::AlreadyActivated;
        }

        self.fullscreen_button.set_hidden(false);
        self.canvas.set_hidden(false);
        self.progress_container.set_hidden(false);
        self.emit(Level::Info, "activate", format!("loading {}", self.asset_path));

        self.spawn_load();

        let size = self.canvas.client_size();
        self.state.borrow_mut().fit_to(size);

        self.bind_fullscreen_button();

        self.state.borrow_mut().loaded = true;
        Activation::Started
    }

    /// Reacts to a page resize. Returns whether the instance re-rendered.
    pub fn handle_resize(&self) -> bool {
        let mut state = self.state.borrow_mut();
        if !state.loaded {
            return false;
        }
        let size = self.canvas.client_size();
        state.fit_to(size);
        state.render(&self.name, &self.diagnostics);
        true
    }

    /// Number of render calls issued so far.
    pub fn render_count(&self) -> u64 {
        self.state.borrow().renders
    }

    pub fn camera(&self) -> PerspectiveCamera {
        self.state.borrow().camera.clone()
    }

    pub fn with_scene<R>(&self, f: impl FnOnce(&Scene) -> R) -> R {
        f(&self.state.borrow().scene)
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().records().to_vec()
    }

    /// How many diagnostics of `kind` this viewer has emitted.
    pub fn diagnostic_count(&self, kind: &str) -> usize {
        self.diagnostics.borrow().count_kind(kind)
    }

    fn emit(&self, level: Level, kind: &'static str, message: impl Into<String>) {
        self.diagnostics
            .borrow_mut()
            .emit(level, &self.name, kind, message);
    }

    fn spawn_load(&self) {
        let bar = Rc::clone(&self.progress_bar);
        let progress_name = self.name.clone();
        let on_progress: ProgressCallback =
            Box::new(move |event| match LoadProgress::from_event(event) {
                Some(progress) => bar.show_progress(progress),
                None => log::debug!(
                    "[{progress_name}] {} bytes received, total unknown",
                    event.loaded
                ),
            });

        let request = self.loader.load(&self.asset_path, on_progress);
        let completion = LoadCompletion {
            name: self.name.clone(),
            path: self.asset_path.clone(),
            placement: self.placement,
            state: Rc::downgrade(&self.state),
            progress_container: Rc::clone(&self.progress_container),
            diagnostics: Rc::clone(&self.diagnostics),
        };
        let task = async move {
            match request.await {
                Ok(geometry) => completion.finish(geometry),
                Err(err) => completion.fail(err),
            }
        };

        if let Err(err) = self
            .spawner
            .spawn_local_obj(LocalFutureObj::new(Box::pin(task)))
        {
            self.emit(Level::Error, "load-failed", format!("could not spawn load: {err}"));
        }
    }

    fn bind_fullscreen_button(&self) {
        let canvas = Rc::clone(&self.canvas);
        let name = self.name.clone();
        let diagnostics = Rc::clone(&self.diagnostics);
        self.fullscreen_button.on_click(Box::new(move || {
            let (level, kind, message) = match request_fullscreen(canvas.as_ref()) {
                Ok(Some(variant)) => (
                    Level::Debug,
                    "fullscreen",
                    variant.method_name().to_string(),
                ),
                Ok(None) => (
                    Level::Debug,
                    "fullscreen-unavailable",
                    "no fullscreen variant supported".to_string(),
                ),
                Err(err) => (Level::Warn, "fullscreen-failed", err.to_string()),
            };
            diagnostics.borrow_mut().emit(level, &name, kind, message);
        }));
    }
}

/// Listener registered on the orbit controls at construction.
fn render_on_change(
    name: ViewerName,
    state: Weak<RefCell<ViewState>>,
    diagnostics: Rc<RefCell<DiagnosticLog>>,
) -> impl FnMut(scene::CameraPose) + 'static {
    move |pose| {
        let Some(state) = state.upgrade() else {
            return;
        };
        let Ok(mut state) = state.try_borrow_mut() else {
            log::debug!("[{name}] camera change during render ignored");
            return;
        };
        state.camera.apply_pose(pose);
        state.render(&name, &diagnostics);
    }
}

/// Everything the pending fetch needs once it resolves.
struct LoadCompletion {
    name: ViewerName,
    path: String,
    placement: Transform,
    state: Weak<RefCell<ViewState>>,
    progress_container: Rc<dyn Widget>,
    diagnostics: Rc<RefCell<DiagnosticLog>>,
}

impl LoadCompletion {
    fn finish(self, geometry: MeshGeometry) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        let vertices = geometry.vertex_count();
        {
            let mut state = state.borrow_mut();
            let mesh = Mesh::new(geometry, Material::vertex_colored_double_sided())
                .with_transform(self.placement);
            state.scene.add_mesh(mesh);
            state.render(&self.name, &self.diagnostics);
        }
        self.progress_container.set_hidden(true);
        self.diagnostics.borrow_mut().emit(
            Level::Info,
            &self.name,
            "loaded",
            format!("{} ({vertices} vertices)", self.path),
        );
    }

    fn fail(self, err: LoadError) {
        self.diagnostics
            .borrow_mut()
            .emit(Level::Error, &self.name, "load-failed", err.to_string());
    }
}
