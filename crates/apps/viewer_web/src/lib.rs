use console_error_panic_hook::set_once;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use foundation::ViewerName;
use foundation::math::Vec3;
use futures::future::LocalFutureObj;
use futures::task::{LocalSpawn, SpawnError};
use scene::CameraPose;
use viewer::{
    Activation, Button, GeometryLoader, PageConfig, ViewerConfig, ViewerInstance, ViewerParts,
    ViewerRegistry,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

mod controls;
mod dom;
mod loader;
mod wgpu;

use controls::PointerOrbitControls;
use dom::{DomButton, DomCanvas, DomProgressBar};
use loader::FetchLoader;
use crate::wgpu::{WgpuRenderer, init_wgpu_from_canvas};

thread_local! {
    static PAGE: RefCell<ViewerRegistry> = RefCell::new(ViewerRegistry::new());
    static RESIZE_BOUND: Cell<bool> = const { Cell::new(false) };
}

/// Runs spawned loads on the browser's microtask queue.
struct BrowserSpawner;

impl LocalSpawn for BrowserSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    console_log::init_with_level(log::Level::Info).map_err(to_js)?;
    Ok(())
}

/// Builds every configured viewer and wires the page.
///
/// `config_json` is a `PageConfig` document; without it the page gets the
/// default `cave` and `candyhouse` viewers. Each viewer stays dormant until
/// its `{name}-loader` element is clicked or [`activate_viewer`] is called.
#[wasm_bindgen]
pub async fn mount_viewers(config_json: Option<String>) -> Result<(), JsValue> {
    let page = match config_json {
        Some(json) => PageConfig::from_json(&json).map_err(to_js)?,
        None => PageConfig::default(),
    };
    let document = dom::document()?;
    let loader: Rc<dyn GeometryLoader> = Rc::new(FetchLoader);
    let spawner: Rc<dyn LocalSpawn> = Rc::new(BrowserSpawner);

    for entry in &page.viewers {
        let name = ViewerName::new(entry.name.as_str())
            .ok_or_else(|| JsValue::from_str("viewer name must not be blank"))?;
        let instance = build_instance(
            &document,
            name.clone(),
            &entry.asset_path,
            page.config_for(entry),
            loader.clone(),
            spawner.clone(),
        )
        .await?;
        PAGE.with(|registry| registry.borrow_mut().register(instance))
            .map_err(to_js)?;
        bind_loader_button(&document, &name);
    }

    bind_window_resize()?;
    log::info!("mounted {} viewer(s)", page.viewers.len());
    Ok(())
}

/// Activates a viewer by name. Returns `false` when it was already active.
#[wasm_bindgen]
pub fn activate_viewer(name: &str) -> Result<bool, JsValue> {
    let activation = PAGE.with(|registry| registry.borrow().activate(name));
    match activation.map_err(to_js)? {
        Activation::Started => Ok(true),
        Activation::AlreadyActivated => Ok(false),
    }
}

/// Forwards a resize to every viewer. Returns how many re-rendered.
#[wasm_bindgen]
pub fn notify_resize() -> u32 {
    PAGE.with(|registry| match registry.try_borrow() {
        Ok(registry) => registry.notify_resize() as u32,
        Err(_) => 0,
    })
}

async fn build_instance(
    document: &web_sys::Document,
    name: ViewerName,
    asset_path: &str,
    config: &ViewerConfig,
    loader: Rc<dyn GeometryLoader>,
    spawner: Rc<dyn LocalSpawn>,
) -> Result<ViewerInstance, JsValue> {
    let canvas: web_sys::HtmlCanvasElement = dom::element_by_id(document, &name.canvas_id())?;
    let fullscreen: web_sys::HtmlElement = dom::element_by_id(document, &name.fullscreen_id())?;
    let bar = DomProgressBar::new(dom::element_by_id(document, &name.bar_id())?);
    let container = bar.container()?;

    let ctx = init_wgpu_from_canvas(canvas.clone()).await?;
    let renderer = WgpuRenderer::new(ctx, dom::device_pixel_ratio());

    let initial_pose = CameraPose::new(Vec3::from_array(config.camera.position), Vec3::ZERO);
    let controls = PointerOrbitControls::attach(&canvas, initial_pose)?;

    let parts = ViewerParts {
        canvas: Rc::new(DomCanvas::new(canvas)),
        fullscreen_button: Rc::new(DomButton::new(fullscreen)),
        progress_container: Rc::new(container),
        progress_bar: Rc::new(bar),
        renderer: Box::new(renderer),
        controls: Box::new(controls),
        loader,
        spawner,
        viewport: dom::viewport_size(),
    };
    Ok(ViewerInstance::new(name, asset_path, parts, config))
}

fn bind_loader_button(document: &web_sys::Document, name: &ViewerName) {
    let element = match dom::element_by_id::<web_sys::HtmlElement>(document, &name.loader_id()) {
        Ok(element) => element,
        Err(_) => {
            log::debug!("no #{} on the page; {name} activates from script only", name.loader_id());
            return;
        }
    };
    let name = name.clone();
    DomButton::new(element).on_click(Box::new(move || {
        let activation = PAGE.with(|registry| {
            registry
                .try_borrow()
                .map(|registry| registry.activate(name.as_str()))
        });
        match activation {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => log::warn!("{err}"),
            Err(_) => log::debug!("{name}: registry busy, click ignored"),
        }
    }));
}

fn bind_window_resize() -> Result<(), JsValue> {
    if RESIZE_BOUND.with(|bound| bound.replace(true)) {
        return Ok(());
    }
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window missing"))?;
    let closure = Closure::wrap(Box::new(move |_e: web_sys::Event| {
        notify_resize();
    }) as Box<dyn FnMut(_)>);
    window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
