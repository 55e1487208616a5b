//! Lazy-loading mesh viewer core.
//!
//! A [`ViewerInstance`] stays dormant until [`ViewerInstance::activate`] is
//! called. Activation fetches its asset once through the host's
//! [`GeometryLoader`], shows progress, and from then on renders only when the
//! camera controls change or the page is resized. Hosts plug in the DOM,
//! renderer and loader through the traits in [`host`].

pub mod config;
pub mod error;
pub mod fullscreen;
pub mod host;
pub mod instance;
pub mod progress;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use config::*;
pub use error::*;
pub use fullscreen::*;
pub use host::*;
pub use instance::*;
pub use progress::*;
pub use registry::*;
