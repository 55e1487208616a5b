pub mod color;
pub mod ids;
pub mod math;

// Foundation crate: small, well-tested primitives only.
pub use color::*;
pub use ids::*;
