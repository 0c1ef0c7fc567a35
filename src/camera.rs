use glam::{Mat4, Vec3};

/// A perspective camera for 3D scenes.
///
/// Holds position, orientation and projection parameters. `forward` is the
/// world-space view direction used to pick the background gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub fov: f32, // radians
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: 75f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, position: impl Into<Vec3>) -> Self {
        self.position = position.into();
        self
    }

    pub fn looking_at(mut self, target: impl Into<Vec3>) -> Self {
        self.forward = (target.into() - self.position).normalize_or(Vec3::NEG_Z);
        self
    }

    /// World-space direction the camera is pointing in (unit length).
    pub fn view_direction(&self) -> Vec3 {
        self.forward
    }

    /// Compute the right vector from forward and up.
    pub fn right(&self) -> Vec3 {
        self.forward.cross(self.up).normalize_or_zero()
    }

    /// Recompute up to be orthogonal to forward and right.
    pub fn orthogonal_up(&self) -> Vec3 {
        self.right().cross(self.forward).normalize_or_zero()
    }

    /// World to view space transform (right-handed).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward, self.up)
    }

    /// View to clip space transform with wgpu's [0, 1] depth range.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect.max(f32::EPSILON), self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looking_at_normalizes_direction() {
        let camera = Camera::new().at([0.0, 0.0, 5.0]).looking_at(Vec3::ZERO);
        assert!((camera.view_direction() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn looking_at_own_position_keeps_a_direction() {
        let camera = Camera::new().at(Vec3::ONE).looking_at(Vec3::ONE);
        assert_eq!(camera.view_direction(), Vec3::NEG_Z);
    }

    #[test]
    fn basis_is_orthonormal() {
        let camera = Camera::new().at([20.0, 20.0, 20.0]).looking_at(Vec3::ZERO);
        let right = camera.right();
        let up = camera.orthogonal_up();
        assert!(right.dot(camera.forward).abs() < 1e-5);
        assert!(up.dot(camera.forward).abs() < 1e-5);
        assert!((right.length() - 1.0).abs() < 1e-5);
        assert!(up.y > 0.0);
    }

    #[test]
    fn view_matrix_puts_target_in_front() {
        let camera = Camera::new().at([0.0, 2.0, 10.0]).looking_at(Vec3::ZERO);
        let target_in_view = camera.view_matrix().transform_point3(Vec3::ZERO);
        // right-handed view space looks down -Z
        assert!(target_in_view.z < 0.0);
        assert!(target_in_view.x.abs() < 1e-5);
    }
}
