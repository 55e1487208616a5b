use foundation::math::Vec3;

use crate::matrix::{IDENTITY, Mat4, mat4_look_at_rh, mat4_mul, mat4_perspective_rh_z0};

/// Position and look-at target of a camera, as emitted by orbit controls.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }
}

/// Perspective camera.
///
/// The projection matrix is cached: changing `aspect`, `fov_y_deg`, `near`
/// or `far` has no effect until [`PerspectiveCamera::update_projection_matrix`]
/// is called.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    projection: Mat4,
    projection_updates: u64,
}

impl PerspectiveCamera {
    pub fn new(fov_y_deg: f64, aspect: f64, near: f64, far: f64) -> Self {
        let mut camera = Self {
            fov_y_deg,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: IDENTITY,
            projection_updates: 0,
        };
        camera.recompute_projection();
        camera
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn update_projection_matrix(&mut self) {
        self.recompute_projection();
        self.projection_updates += 1;
    }

    /// Number of explicit projection updates since construction.
    pub fn projection_updates(&self) -> u64 {
        self.projection_updates
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        mat4_look_at_rh(
            self.position.to_array(),
            self.target.to_array(),
            self.up.to_array(),
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        mat4_mul(self.projection, self.view_matrix())
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose::new(self.position, self.target)
    }

    pub fn apply_pose(&mut self, pose: CameraPose) {
        self.position = pose.position;
        self.target = pose.target;
    }

    fn recompute_projection(&mut self) {
        let aspect = if self.aspect.is_finite() && self.aspect > 0.0 {
            self.aspect
        } else {
            1.0
        };
        self.projection =
            mat4_perspective_rh_z0(self.fov_y_deg.to_radians(), aspect, self.near, self.far);
    }
}

#[cfg(test)]
mod tests {
    use super::{CameraPose, PerspectiveCamera};
    use foundation::math::Vec3;

    #[test]
    fn projection_is_cached_until_updated() {
        let mut camera = PerspectiveCamera::new(35.0, 1.0, 1.0, 3000.0);
        let before = camera.projection_matrix();
        camera.aspect = 2.0;
        assert_eq!(camera.projection_matrix(), before);

        camera.update_projection_matrix();
        assert_ne!(camera.projection_matrix(), before);
        assert_eq!(camera.projection_updates(), 1);
        // x scale halves when aspect doubles.
        let ratio = before[0][0] / camera.projection_matrix()[0][0];
        assert!((ratio - 2.0).abs() < 1e-5);
    }

    #[test]
    fn invalid_aspect_falls_back_to_square() {
        let square = PerspectiveCamera::new(35.0, 1.0, 1.0, 3000.0);
        let mut camera = PerspectiveCamera::new(35.0, f64::NAN, 1.0, 3000.0);
        camera.update_projection_matrix();
        assert_eq!(camera.projection_matrix(), square.projection_matrix());
    }

    #[test]
    fn pose_round_trips() {
        let mut camera =
            PerspectiveCamera::new(35.0, 1.0, 1.0, 3000.0).with_position(Vec3::new(0.0, 0.0, 30.0));
        assert_eq!(camera.pose().position, Vec3::new(0.0, 0.0, 30.0));

        let pose = CameraPose::new(Vec3::new(5.0, 1.0, 2.0), Vec3::ZERO);
        camera.apply_pose(pose);
        assert_eq!(camera.pose(), pose);
    }
}
