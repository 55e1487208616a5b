use std::rc::Rc;

use super::{Material, MeshGeometry, Transform};

/// Geometry, material and placement of one drawable.
///
/// Geometry is reference counted so renderers can keep a handle for GPU
/// upload bookkeeping without copying vertex data.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub geometry: Rc<MeshGeometry>,
    pub material: Material,
    pub transform: Transform,
}

impl Mesh {
    pub fn new(geometry: MeshGeometry, material: Material) -> Self {
        Self {
            geometry: Rc::new(geometry),
            material,
            transform: Transform::identity(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}
