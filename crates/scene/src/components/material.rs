/// Which triangle faces are rasterized.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
    Double,
}

/// Unlit material. Lights in the scene do not affect it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub vertex_colors: bool,
    pub side: Side,
}

impl Material {
    pub fn basic() -> Self {
        Self {
            vertex_colors: false,
            side: Side::Front,
        }
    }

    /// Per-vertex colours, both faces drawn.
    pub fn vertex_colored_double_sided() -> Self {
        Self {
            vertex_colors: true,
            side: Side::Double,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::basic()
    }
}
