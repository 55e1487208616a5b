use foundation::math::Vec3;

use crate::matrix::{Mat4, mat4_from_trs};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, applied in XYZ order.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn translate(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Multiplies the current scale by `factor` on every axis.
    pub fn scale_uniform(mut self, factor: f64) -> Self {
        self.scale = self.scale * factor;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        mat4_from_trs(
            self.position.to_array(),
            self.rotation.to_array(),
            self.scale.to_array(),
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::Transform;
    use crate::matrix::IDENTITY;
    use foundation::math::Vec3;

    #[test]
    fn identity_is_origin() {
        let transform = Transform::identity();
        assert_eq!(transform.position, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(transform.matrix(), IDENTITY);
    }

    #[test]
    fn uniform_scale_multiplies() {
        let transform = Transform::identity().scale_uniform(0.006);
        assert_eq!(transform.scale, Vec3::splat(0.006));
        assert_eq!(transform.position, Vec3::ZERO);
        assert_eq!(transform.rotation, Vec3::ZERO);
    }
}
