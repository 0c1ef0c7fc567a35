use std::path::PathBuf;

use glam::Vec3;

use crate::geometry::LoadOptions;
use crate::gradient::DEFAULT_TEXTURE_SIZE;
use crate::lighting::Lighting;
use crate::orbit_camera::DEFAULT_AUTO_ROTATE_SPEED;
use crate::toggles::ViewerToggles;
use crate::ui::Color;

/// Model opened when none is given on the command line.
pub const DEFAULT_MODEL_PATH: &str = "cubo/cubopv.glb";

/// Everything needed to open the viewer window.
///
/// ```
/// use cubeview::ViewerConfig;
///
/// let config = ViewerConfig::new()
///     .title("Parts")
///     .size(1280, 720)
///     .model("assets/bracket.stl")
///     .gradient_background(true);
/// assert!(config.toggles.gradient_background);
/// ```
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub model_path: PathBuf,
    pub load_options: LoadOptions,
    pub camera_position: Vec3,
    pub camera_target: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub auto_rotate_speed: f32,
    /// Side length of the synthesized gradient texture in pixels.
    pub background_size: u32,
    pub clear_color: Color,
    pub lighting: Lighting,
    pub toggles: ViewerToggles,
    pub font_path: Option<PathBuf>,
    pub font_size: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "cubeview".to_string(),
            width: 1280,
            height: 800,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            load_options: LoadOptions::default(),
            camera_position: Vec3::splat(20.0),
            camera_target: Vec3::ZERO,
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            auto_rotate_speed: DEFAULT_AUTO_ROTATE_SPEED,
            background_size: DEFAULT_TEXTURE_SIZE,
            clear_color: Color::SCENE_BG,
            lighting: Lighting::default(),
            toggles: ViewerToggles::default(),
            font_path: None,
            font_size: 16.0,
        }
    }
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn model(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn load_options(mut self, options: LoadOptions) -> Self {
        self.load_options = options;
        self
    }

    pub fn camera(mut self, position: impl Into<Vec3>, target: impl Into<Vec3>) -> Self {
        self.camera_position = position.into();
        self.camera_target = target.into();
        self
    }

    pub fn fov(mut self, degrees: f32) -> Self {
        self.fov = degrees;
        self
    }

    pub fn clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Auto-rotate speed in radians per second.
    pub fn auto_rotate_speed(mut self, speed: f32) -> Self {
        self.auto_rotate_speed = speed;
        self
    }

    /// Gradient texture edge in pixels. Values outside `1..=MAX_TEXTURE_SIZE`
    /// are clamped when the viewer starts.
    pub fn background_size(mut self, size: u32) -> Self {
        self.background_size = size;
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn lighting(mut self, lighting: Lighting) -> Self {
        self.lighting = lighting;
        self
    }

    pub fn auto_rotate(mut self, enabled: bool) -> Self {
        self.toggles.auto_rotate = enabled;
        self
    }

    pub fn orbit_controls(mut self, enabled: bool) -> Self {
        self.toggles.orbit_enabled = enabled;
        self
    }

    pub fn light_helpers(mut self, visible: bool) -> Self {
        self.toggles.light_helpers_visible = visible;
        self
    }

    pub fn gradient_background(mut self, enabled: bool) -> Self {
        self.toggles.gradient_background = enabled;
        self
    }

    pub fn font(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }

    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_scene() {
        let config = ViewerConfig::default();
        assert_eq!(config.model_path, PathBuf::from("cubo/cubopv.glb"));
        assert_eq!(config.camera_position, Vec3::new(20.0, 20.0, 20.0));
        assert_eq!(config.fov, 75.0);
        assert_eq!((config.near, config.far), (0.1, 1000.0));
        assert_eq!(config.background_size, 512);
        assert_eq!(config.toggles, ViewerToggles::default());
        assert!(config.font_path.is_none());
    }

    #[test]
    fn builder_sets_toggles() {
        let config = ViewerConfig::new()
            .auto_rotate(true)
            .orbit_controls(false)
            .light_helpers(false);
        assert!(config.toggles.auto_rotate);
        assert!(!config.toggles.orbit_enabled);
        assert!(!config.toggles.light_helpers_visible);
        assert!(!config.toggles.gradient_background);
    }
}
