pub mod ply;

pub use ply::*;
