//! `web-sys` implementations of the viewer's widget traits.

use viewer::{Button, CanvasSurface, FullscreenVariant, HostError, LoadProgress, ProgressBar};
use viewer::{SurfaceSize, Widget};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

pub fn document() -> Result<web_sys::Document, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("window missing"))?
        .document()
        .ok_or_else(|| JsValue::from_str("document missing"))
}

pub fn element_by_id<T: JsCast>(document: &web_sys::Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("element #{id} missing")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("element #{id} has an unexpected type")))
}

/// `window.innerWidth` x `window.innerHeight`.
pub fn viewport_size() -> SurfaceSize {
    let Some(window) = web_sys::window() else {
        return SurfaceSize::new(0.0, 0.0);
    };
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    SurfaceSize::new(dim(window.inner_width()), dim(window.inner_height()))
}

pub fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(1.0)
}

fn set_hidden_attr(element: &web_sys::Element, hidden: bool) {
    let result = if hidden {
        element.set_attribute("hidden", "")
    } else {
        element.remove_attribute("hidden")
    };
    if let Err(err) = result {
        log::warn!("toggling hidden on #{} failed: {err:?}", element.id());
    }
}

/// Any element shown or hidden through its `hidden` attribute.
pub struct DomWidget {
    element: web_sys::HtmlElement,
}

impl DomWidget {
    pub fn new(element: web_sys::HtmlElement) -> Self {
        Self { element }
    }
}

impl Widget for DomWidget {
    fn set_hidden(&self, hidden: bool) {
        set_hidden_attr(&self.element, hidden);
    }

    fn is_hidden(&self) -> bool {
        self.element.has_attribute("hidden")
    }
}

/// A widget that also takes click handlers.
pub struct DomButton {
    widget: DomWidget,
}

impl DomButton {
    pub fn new(element: web_sys::HtmlElement) -> Self {
        Self {
            widget: DomWidget::new(element),
        }
    }
}

impl Widget for DomButton {
    fn set_hidden(&self, hidden: bool) {
        self.widget.set_hidden(hidden);
    }

    fn is_hidden(&self) -> bool {
        self.widget.is_hidden()
    }
}

impl Button for DomButton {
    fn on_click(&self, mut handler: Box<dyn FnMut()>) {
        let closure = Closure::wrap(Box::new(move |_e: web_sys::Event| {
            handler();
        }) as Box<dyn FnMut(_)>);
        let element = &self.widget.element;
        if let Err(err) =
            element.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        {
            log::warn!("binding click on #{} failed: {err:?}", element.id());
        }
        // Page-lifetime listener.
        closure.forget();
    }
}

/// The fill element of a progress bar: width and label track the percentage.
pub struct DomProgressBar {
    element: web_sys::HtmlElement,
}

impl DomProgressBar {
    pub fn new(element: web_sys::HtmlElement) -> Self {
        Self { element }
    }

    /// The bar's parent, which is what gets shown and hidden.
    pub fn container(&self) -> Result<DomWidget, JsValue> {
        let parent = self
            .element
            .parent_element()
            .ok_or_else(|| JsValue::from_str("progress bar has no parent"))?
            .dyn_into::<web_sys::HtmlElement>()
            .map_err(|_| JsValue::from_str("progress bar parent is not an HTML element"))?;
        Ok(DomWidget::new(parent))
    }
}

impl ProgressBar for DomProgressBar {
    fn show_progress(&self, progress: LoadProgress) {
        let label = progress.to_string();
        if let Err(err) = self.element.style().set_property("width", &label) {
            log::warn!("progress width update failed: {err:?}");
        }
        self.element.set_inner_text(&label);
    }
}

pub struct DomCanvas {
    canvas: web_sys::HtmlCanvasElement,
}

impl DomCanvas {
    pub fn new(canvas: web_sys::HtmlCanvasElement) -> Self {
        Self { canvas }
    }

    pub fn element(&self) -> &web_sys::HtmlCanvasElement {
        &self.canvas
    }

    fn fullscreen_method(&self, variant: FullscreenVariant) -> Option<js_sys::Function> {
        js_sys::Reflect::get(&self.canvas, &JsValue::from_str(variant.method_name()))
            .ok()?
            .dyn_into::<js_sys::Function>()
            .ok()
    }
}

impl Widget for DomCanvas {
    fn set_hidden(&self, hidden: bool) {
        set_hidden_attr(&self.canvas, hidden);
    }

    fn is_hidden(&self) -> bool {
        self.canvas.has_attribute("hidden")
    }
}

impl CanvasSurface for DomCanvas {
    fn client_size(&self) -> SurfaceSize {
        SurfaceSize::new(
            self.canvas.client_width() as f64,
            self.canvas.client_height() as f64,
        )
    }

    fn supports_fullscreen(&self, variant: FullscreenVariant) -> bool {
        self.fullscreen_method(variant).is_some()
    }

    fn request_fullscreen(&self, variant: FullscreenVariant) -> Result<(), HostError> {
        let method = self.fullscreen_method(variant).ok_or_else(|| {
            HostError::new(format!("{} is not available", variant.method_name()))
        })?;
        method
            .call0(&self.canvas)
            .map(|_| ())
            .map_err(|err| HostError::new(format!("{}: {err:?}", variant.method_name())))
    }
}
