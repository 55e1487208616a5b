/// Decoded, renderable geometry.
///
/// `indices` is `None` for point clouds. When present, every three indices
/// form one triangle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshGeometry {
    pub positions: Vec<[f32; 3]>,
    pub colors: Option<Vec<[f32; 3]>>,
    pub indices: Option<Vec<u32>>,
}

impl MeshGeometry {
    pub fn points(positions: Vec<[f32; 3]>) -> Self {
        Self {
            positions,
            colors: None,
            indices: None,
        }
    }

    pub fn triangles(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            colors: None,
            indices: Some(indices),
        }
    }

    /// Attaches per-vertex colours. Ignored when the length does not match.
    pub fn with_colors(mut self, colors: Vec<[f32; 3]>) -> Self {
        if colors.len() == self.positions.len() {
            self.colors = Some(colors);
        }
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.as_ref().map_or(0, |i| i.len() / 3)
    }

    pub fn is_point_cloud(&self) -> bool {
        self.indices.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::MeshGeometry;

    #[test]
    fn points_have_no_triangles() {
        let g = MeshGeometry::points(vec![[0.0; 3], [1.0; 3]]);
        assert!(g.is_point_cloud());
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.triangle_count(), 0);
    }

    #[test]
    fn mismatched_colors_are_dropped() {
        let g = MeshGeometry::triangles(vec![[0.0; 3]; 3], vec![0, 1, 2])
            .with_colors(vec![[1.0, 0.0, 0.0]]);
        assert!(g.colors.is_none());
        assert_eq!(g.triangle_count(), 1);
    }
}
