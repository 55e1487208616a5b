//! Seams between the viewer core and the page that hosts it.
//!
//! Everything here is single-threaded: collaborators are shared through
//! `Rc` and callbacks are plain `FnMut` boxes invoked by the host's event
//! loop.

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use futures::task::LocalSpawn;
use scene::components::MeshGeometry;
use scene::{CameraPose, PerspectiveCamera, Scene};

use crate::error::{HostError, LoadError};
use crate::fullscreen::FullscreenVariant;
use crate::progress::{LoadProgress, ProgressEvent};

/// Client-area size of a surface in CSS pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// `width / height`, or `None` for a collapsed or invalid surface.
    pub fn aspect(&self) -> Option<f64> {
        let aspect = self.width / self.height;
        (self.height > 0.0 && aspect.is_finite()).then_some(aspect)
    }
}

/// A page element that can be shown and hidden.
pub trait Widget {
    fn set_hidden(&self, hidden: bool);
    fn is_hidden(&self) -> bool;
}

pub trait Button: Widget {
    /// Registers a handler invoked on every click.
    fn on_click(&self, handler: Box<dyn FnMut()>);
}

/// The fill element of a progress bar.
pub trait ProgressBar {
    /// Sets the fill width and label to the given percentage.
    fn show_progress(&self, progress: LoadProgress);
}

/// The element the renderer draws into.
pub trait CanvasSurface: Widget {
    fn client_size(&self) -> SurfaceSize;
    fn supports_fullscreen(&self, variant: FullscreenVariant) -> bool;
    fn request_fullscreen(&self, variant: FullscreenVariant) -> Result<(), HostError>;
}

pub trait Renderer {
    /// Resizes the drawing buffer to the surface's client size.
    fn set_size(&mut self, size: SurfaceSize);
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), HostError>;
}

/// Camera input handler. Emits the new pose whenever the user moves the
/// camera.
pub trait OrbitControls {
    fn on_change(&mut self, listener: Box<dyn FnMut(CameraPose)>);
}

pub type ProgressCallback = Box<dyn FnMut(ProgressEvent)>;

/// Fetches and decodes an asset.
///
/// `on_progress` is invoked in byte order and never after the returned
/// future resolves.
pub trait GeometryLoader {
    fn load(
        &self,
        path: &str,
        on_progress: ProgressCallback,
    ) -> LocalBoxFuture<'static, Result<MeshGeometry, LoadError>>;
}

/// Host collaborators for one viewer instance.
pub struct ViewerParts {
    pub canvas: Rc<dyn CanvasSurface>,
    pub fullscreen_button: Rc<dyn Button>,
    /// Parent of the progress fill; hidden once the asset is displayed.
    pub progress_container: Rc<dyn Widget>,
    pub progress_bar: Rc<dyn ProgressBar>,
    pub renderer: Box<dyn Renderer>,
    pub controls: Box<dyn OrbitControls>,
    pub loader: Rc<dyn GeometryLoader>,
    pub spawner: Rc<dyn LocalSpawn>,
    /// Page viewport size at construction, used for the initial aspect.
    pub viewport: SurfaceSize,
}

#[cfg(test)]
mod tests {
    use super::SurfaceSize;

    #[test]
    fn aspect_of_collapsed_surface_is_none() {
        assert_eq!(SurfaceSize::new(640.0, 0.0).aspect(), None);
        assert_eq!(SurfaceSize::new(0.0, 0.0).aspect(), None);
        assert_eq!(SurfaceSize::new(640.0, 480.0).aspect(), Some(640.0 / 480.0));
    }
}
