use foundation::Color;

use crate::components::{Light, Mesh};

/// Index of a mesh inside its [`Scene`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

/// Scene graph root: a background colour, lights and meshes.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub background: Color,
    lights: Vec<Light>,
    meshes: Vec<Mesh>,
}

impl Scene {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            lights: Vec::new(),
            meshes: Vec::new(),
        }
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(mesh);
        id
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0 as usize)
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Color::BLACK)
    }
}
