use glam::Vec3;
use winit::event::MouseButton;

use crate::camera::Camera;
use crate::input::Input;

const ELEVATION_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Default auto-rotate speed: one full turn every 30 seconds.
pub const DEFAULT_AUTO_ROTATE_SPEED: f32 = std::f32::consts::TAU / 30.0;

/// A camera controller that orbits around a target point.
///
/// User input (left drag to rotate, scroll to zoom, right drag to pan) is only
/// applied while `enabled` is set. Auto-rotation is independent of `enabled`:
/// a disabled controller still turns when `auto_rotate` is on.
///
/// # Example
/// ```ignore
/// let mut orbit = OrbitCamera::looking_from(Vec3::splat(20.0), Vec3::ZERO);
/// orbit.auto_rotate = true;
///
/// // In frame loop:
/// orbit.update(&input, dt);
/// let camera = orbit.camera();
/// ```
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Distance from target.
    pub distance: f32,
    /// Horizontal angle in radians (yaw).
    pub azimuth: f32,
    /// Vertical angle in radians (pitch), clamped to avoid gimbal lock.
    pub elevation: f32,
    /// Field of view in radians.
    pub fov: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Whether mouse input moves the camera.
    pub enabled: bool,
    /// Whether the camera turns around the target on its own.
    pub auto_rotate: bool,
    /// Auto-rotation speed in radians per second (positive = counterclockwise from above).
    pub auto_rotate_speed: f32,
    /// Mouse sensitivity for rotation.
    pub sensitivity: f32,
    /// Scroll zoom sensitivity.
    pub zoom_sensitivity: f32,
    /// Pan speed relative to distance.
    pub pan_sensitivity: f32,
    /// Minimum distance from target.
    pub min_distance: f32,
    /// Maximum distance from target.
    pub max_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 5.0,
            azimuth: 0.0,
            elevation: 0.3,
            fov: 75f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            enabled: true,
            auto_rotate: false,
            auto_rotate_speed: DEFAULT_AUTO_ROTATE_SPEED,
            sensitivity: 0.005,
            zoom_sensitivity: 0.5,
            pan_sensitivity: 0.0015,
            min_distance: 0.5,
            max_distance: 200.0,
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a controller whose camera starts at `position` looking at `target`.
    pub fn looking_from(position: impl Into<Vec3>, target: impl Into<Vec3>) -> Self {
        let target = target.into();
        let offset = position.into() - target;
        let mut orbit = Self::default().target(target);

        let distance = offset.length();
        if distance > f32::EPSILON {
            orbit.distance = distance.max(orbit.min_distance);
            orbit.max_distance = orbit.max_distance.max(distance);
            orbit.azimuth = offset.x.atan2(offset.z);
            orbit.elevation = (offset.y / distance)
                .clamp(-1.0, 1.0)
                .asin()
                .clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
        }
        orbit
    }

    /// Set the target point to orbit around.
    pub fn target(mut self, target: impl Into<Vec3>) -> Self {
        self.target = target.into();
        self
    }

    /// Set the distance from target.
    pub fn distance(mut self, distance: f32) -> Self {
        self.distance = distance.clamp(self.min_distance, self.max_distance);
        self
    }

    /// Set the field of view in degrees.
    pub fn fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    /// Set the near and far clip planes.
    pub fn clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Set the initial azimuth (horizontal angle) in radians.
    pub fn azimuth(mut self, azimuth: f32) -> Self {
        self.azimuth = azimuth;
        self
    }

    /// Set the initial elevation (vertical angle) in radians.
    pub fn elevation(mut self, elevation: f32) -> Self {
        self.elevation = elevation.clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
        self
    }

    /// Set the auto-rotation speed in radians per second.
    pub fn auto_rotate_speed(mut self, speed: f32) -> Self {
        self.auto_rotate_speed = speed;
        self
    }

    /// Set distance limits.
    pub fn distance_limits(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max;
        self.distance = self.distance.clamp(min, max);
        self
    }

    /// Update the camera based on input and delta time.
    pub fn update(&mut self, input: &Input, dt: f32) {
        if self.enabled && !input.pointer_captured() {
            self.apply_input(input);
        }

        if self.auto_rotate {
            self.azimuth += self.auto_rotate_speed * dt;
        }
    }

    fn apply_input(&mut self, input: &Input) {
        let delta = input.mouse_delta();

        if input.mouse_down(MouseButton::Left) {
            self.azimuth -= delta.x * self.sensitivity;
            self.elevation = (self.elevation + delta.y * self.sensitivity)
                .clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
        } else if input.mouse_down(MouseButton::Right) {
            let camera = self.camera();
            let scale = self.distance * self.pan_sensitivity;
            self.target += (-camera.right() * delta.x + camera.orthogonal_up() * delta.y) * scale;
        }

        let scroll = input.scroll_delta();
        if scroll.y.abs() > 0.0 {
            self.distance = (self.distance - scroll.y * self.zoom_sensitivity)
                .clamp(self.min_distance, self.max_distance);
        }
    }

    /// Get the current camera state.
    pub fn camera(&self) -> Camera {
        // Spherical to Cartesian conversion
        let offset = Vec3::new(
            self.distance * self.elevation.cos() * self.azimuth.sin(),
            self.distance * self.elevation.sin(),
            self.distance * self.elevation.cos() * self.azimuth.cos(),
        );

        let position = self.target + offset;

        Camera {
            position,
            forward: (self.target - position).normalize_or(Vec3::NEG_Z),
            up: Vec3::Y,
            fov: self.fov,
            near: self.near,
            far: self.far,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn looking_from_reproduces_start_position() {
        let orbit = OrbitCamera::looking_from([20.0, 20.0, 20.0], Vec3::ZERO);
        let camera = orbit.camera();
        assert!(approx(camera.position, Vec3::splat(20.0)));
        assert!(approx(camera.forward, Vec3::splat(-1.0).normalize()));
    }

    #[test]
    fn auto_rotate_turns_the_camera() {
        let mut orbit = OrbitCamera::looking_from([0.0, 0.0, 10.0], Vec3::ZERO);
        orbit.auto_rotate = true;
        orbit.update(&Input::new(), 15.0);
        // half a turn at the default speed
        assert!(approx(orbit.camera().position, Vec3::new(0.0, 0.0, -10.0)));
    }

    #[test]
    fn auto_rotate_runs_while_input_is_disabled() {
        let mut orbit = OrbitCamera::new();
        orbit.enabled = false;
        orbit.auto_rotate = true;
        let before = orbit.azimuth;
        orbit.update(&Input::new(), 1.0);
        assert!(orbit.azimuth > before);
    }

    #[test]
    fn disabled_controller_ignores_drag_and_zoom() {
        let mut orbit = OrbitCamera::new();
        orbit.enabled = false;
        let mut input = Input::new();
        input.press_mouse(MouseButton::Left);
        input.move_mouse(Vec2::new(100.0, 50.0));
        input.scroll(3.0);

        let before = orbit.camera();
        orbit.update(&input, 0.016);
        assert_eq!(orbit.camera(), before);
    }

    #[test]
    fn drag_rotates_and_scroll_zooms() {
        let mut orbit = OrbitCamera::new();
        let mut input = Input::new();
        input.press_mouse(MouseButton::Left);
        input.move_mouse(Vec2::new(100.0, 0.0));
        input.scroll(2.0);

        orbit.update(&input, 0.016);
        assert!((orbit.azimuth + 0.5).abs() < 1e-5);
        assert!((orbit.distance - 4.0).abs() < 1e-5);
    }

    #[test]
    fn captured_pointer_does_not_orbit() {
        let mut orbit = OrbitCamera::new();
        let mut input = Input::new();
        input.press_mouse(MouseButton::Left);
        input.capture_pointer();
        input.move_mouse(Vec2::new(100.0, 0.0));

        orbit.update(&input, 0.016);
        assert_eq!(orbit.azimuth, 0.0);
    }

    #[test]
    fn right_drag_pans_target() {
        let mut orbit = OrbitCamera::new();
        let mut input = Input::new();
        input.press_mouse(MouseButton::Right);
        input.move_mouse(Vec2::new(50.0, 0.0));

        orbit.update(&input, 0.016);
        assert!(orbit.target.length() > 0.0);
        assert_eq!(orbit.distance, 5.0);
    }

    #[test]
    fn elevation_and_distance_are_clamped() {
        let orbit = OrbitCamera::new().elevation(10.0).distance(1_000.0);
        assert!(orbit.elevation < std::f32::consts::FRAC_PI_2);
        assert_eq!(orbit.distance, orbit.max_distance);
    }

    #[test]
    fn distance_limits_bound_zoom() {
        let mut orbit = OrbitCamera::new().distance(20.0).distance_limits(2.0, 8.0);
        assert_eq!(orbit.distance, 8.0);

        let mut input = Input::new();
        input.scroll(100.0);
        orbit.update(&input, 0.0);
        assert_eq!(orbit.distance, 2.0);
    }
}
