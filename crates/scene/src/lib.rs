pub mod camera;
pub mod components;
pub mod matrix;
pub mod scene;

pub use camera::*;
pub use scene::*;
