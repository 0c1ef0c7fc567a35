//! Scene background slot and the per-frame gradient update.
//!
//! [`GradientBackground`] is the small state machine behind the
//! "Gradient BG" toggle. While enabled and once a model has loaded, every call
//! to [`GradientBackground::update`] classifies the camera direction, looks up
//! that face's [`GradientSpec`](crate::GradientSpec) and synthesizes a fresh
//! texture. Nothing is cached between frames; the caller replaces whatever
//! the [`SceneBackground`] held before.

use glam::Vec3;
use image::RgbaImage;

use crate::gradient::{DEFAULT_TEXTURE_SIZE, MAX_TEXTURE_SIZE, gradient_for, synthesize};
use crate::orientation::{Face, classify};
use crate::texture::Texture;
use crate::ui::Color;

/// What is drawn behind the 3D content.
#[derive(Debug)]
pub enum SceneBackground {
    /// Flat clear color.
    Color(Color),
    /// A synthesized gradient for the given face, stretched over the viewport.
    Gradient { face: Face, texture: Texture },
}

impl SceneBackground {
    /// Color the frame is cleared to before anything else is drawn.
    pub fn clear_color(&self) -> Color {
        match self {
            SceneBackground::Color(color) => *color,
            SceneBackground::Gradient { .. } => Color::BLACK,
        }
    }

    pub fn face(&self) -> Option<Face> {
        match self {
            SceneBackground::Color(_) => None,
            SceneBackground::Gradient { face, .. } => Some(*face),
        }
    }
}

/// Whether gradient updates run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackgroundState {
    Disabled,
    Enabled,
}

/// A freshly synthesized background.
#[derive(Debug)]
pub struct BackgroundUpdate {
    pub face: Face,
    pub image: RgbaImage,
}

/// Drives the face-keyed gradient background.
#[derive(Debug)]
pub struct GradientBackground {
    state: BackgroundState,
    size: u32,
    last_face: Option<Face>,
}

impl Default for GradientBackground {
    fn default() -> Self {
        Self::new(DEFAULT_TEXTURE_SIZE)
    }
}

impl GradientBackground {
    /// Create a disabled updater producing `size × size` textures. The size
    /// is clamped to `1..=MAX_TEXTURE_SIZE`; GPU textures cannot be empty.
    pub fn new(size: u32) -> Self {
        let clamped = size.clamp(1, MAX_TEXTURE_SIZE);
        if clamped != size {
            log::warn!("background size {size} out of range, using {clamped}");
        }
        Self {
            state: BackgroundState::Disabled,
            size: clamped,
            last_face: None,
        }
    }

    pub fn state(&self) -> BackgroundState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state == BackgroundState::Enabled
    }

    pub fn texture_size(&self) -> u32 {
        self.size
    }

    /// Shrink the texture size to fit a device limit.
    pub fn limit_texture_size(&mut self, max: u32) {
        let limit = max.max(1);
        if self.size > limit {
            log::warn!("background size {} exceeds device limit, using {limit}", self.size);
            self.size = limit;
        }
    }

    /// Face of the most recent update, if any.
    pub fn last_face(&self) -> Option<Face> {
        self.last_face
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.state = if enabled {
            BackgroundState::Enabled
        } else {
            BackgroundState::Disabled
        };
    }

    /// Run one frame of the update.
    ///
    /// Returns `None` while disabled or before the model has loaded; the
    /// background then keeps whatever it was last assigned.
    pub fn update(&mut self, model_loaded: bool, view_direction: Vec3) -> Option<BackgroundUpdate> {
        if self.state == BackgroundState::Disabled || !model_loaded {
            return None;
        }

        let face = classify(view_direction);
        if self.last_face != Some(face) {
            log::debug!("camera now faces {face}");
            self.last_face = Some(face);
        }

        Some(BackgroundUpdate {
            face,
            image: synthesize(gradient_for(face), self.size),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_updater_does_nothing() {
        let mut background = GradientBackground::new(16);
        assert_eq!(background.state(), BackgroundState::Disabled);
        assert!(background.update(true, Vec3::Z).is_none());
    }

    #[test]
    fn waits_for_the_model() {
        let mut background = GradientBackground::new(16);
        background.set_enabled(true);
        assert!(background.update(false, Vec3::Z).is_none());
        assert!(background.update(true, Vec3::Z).is_some());
    }

    #[test]
    fn camera_facing_back_produces_back_gradient() {
        let mut background = GradientBackground::new(DEFAULT_TEXTURE_SIZE);
        background.set_enabled(true);

        let direction = Vec3::new(0.0, 0.0, 5.0).normalize();
        let update = background.update(true, direction).expect("enabled and loaded");

        assert_eq!(update.face, Face::Back);
        let expected = synthesize(gradient_for(Face::Back), DEFAULT_TEXTURE_SIZE);
        assert_eq!(update.image.as_raw(), expected.as_raw());
        assert_eq!(*update.image.get_pixel(0, 0), gradient_for(Face::Back).pairs[0].start);
    }

    #[test]
    fn every_enabled_frame_synthesizes_again() {
        let mut background = GradientBackground::new(8);
        background.set_enabled(true);
        let first = background.update(true, Vec3::X).expect("update");
        let second = background.update(true, Vec3::NEG_Y).expect("update");
        assert_eq!(first.face, Face::Right);
        assert_eq!(second.face, Face::Bottom);
        assert_eq!(background.last_face(), Some(Face::Bottom));
    }

    #[test]
    fn size_is_kept_within_texture_limits() {
        assert_eq!(GradientBackground::new(0).texture_size(), 1);
        assert_eq!(GradientBackground::new(u32::MAX).texture_size(), MAX_TEXTURE_SIZE);
        assert_eq!(GradientBackground::new(300).texture_size(), 300);

        let mut background = GradientBackground::new(2048);
        background.limit_texture_size(1024);
        assert_eq!(background.texture_size(), 1024);
        background.limit_texture_size(0);
        assert_eq!(background.texture_size(), 1);

        background.set_enabled(true);
        let update = background.update(true, Vec3::Z).expect("update");
        assert_eq!(update.image.dimensions(), (1, 1));
    }

    #[test]
    fn disabling_stops_updates_but_remembers_last_face() {
        let mut background = GradientBackground::new(8);
        background.set_enabled(true);
        background.update(true, Vec3::Y);
        background.set_enabled(false);
        assert!(background.update(true, Vec3::X).is_none());
        assert_eq!(background.last_face(), Some(Face::Top));
    }
}
