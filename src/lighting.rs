//! Directional and ambient lights plus their debug helpers.
//!
//! Shading in `shaders/mesh.wgsl` is Lambertian with a 1/π BRDF, so the
//! default intensities of 3 read the same as the original scene. Helpers are
//! drawn unlit: a unit square at each light facing the scene origin and a thin
//! bar pointing from the light at the origin.

use glam::{Quat, Vec3};

use crate::mesh::Transform;
use crate::ui::Color;

/// Maximum number of directional lights the mesh shader accepts.
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;

/// Where every directional light points.
pub const LIGHT_TARGET: Vec3 = Vec3::ZERO;

/// A light shining from `position` toward [`LIGHT_TARGET`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
    /// Carried for parity with the scene description; shadows are not rendered.
    pub cast_shadow: bool,
}

impl DirectionalLight {
    pub fn new(position: impl Into<Vec3>, intensity: f32) -> Self {
        Self {
            position: position.into(),
            color: Color::WHITE,
            intensity,
            cast_shadow: true,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Unit vector from the target toward the light.
    pub fn direction_to_light(&self) -> Vec3 {
        (self.position - LIGHT_TARGET).normalize_or(Vec3::Y)
    }

    /// Transforms for the helper square and the bar toward the target.
    pub fn helper_transforms(&self, size: f32) -> [Transform; 2] {
        let to_target = -self.direction_to_light();
        // the helper cube's local +Z is rotated onto the light direction
        let facing = Quat::from_rotation_arc(Vec3::Z, to_target);
        let length = self.position.distance(LIGHT_TARGET);

        let square = Transform::new()
            .position(self.position)
            .rotation(facing)
            .scale(Vec3::new(size, size, size * 0.02));

        let bar = Transform::new()
            .position(self.position + to_target * (length * 0.5))
            .rotation(facing)
            .scale(Vec3::new(size * 0.02, size * 0.02, length));

        [square, bar]
    }
}

/// Uniform light added to every surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

impl AmbientLight {
    pub fn new(intensity: f32) -> Self {
        Self {
            color: Color::WHITE,
            intensity,
        }
    }
}

/// All lights in the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Lighting {
    pub directional: Vec<DirectionalLight>,
    pub ambient: AmbientLight,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            directional: vec![
                DirectionalLight::new([10.0, 10.0, 10.0], 3.0),
                DirectionalLight::new([-10.0, 10.0, -10.0], 3.0),
            ],
            ambient: AmbientLight::new(3.0),
        }
    }
}

impl Lighting {
    /// Pack the lights into the layout the mesh shader expects. Lights past
    /// [`MAX_DIRECTIONAL_LIGHTS`] are dropped.
    pub fn uniforms(&self) -> LightUniforms {
        let mut uniforms = LightUniforms::zeroed();
        let count = self.directional.len().min(MAX_DIRECTIONAL_LIGHTS);

        for (i, light) in self.directional.iter().take(count).enumerate() {
            uniforms.directions[i] = light.direction_to_light().extend(0.0).to_array();
            uniforms.radiance[i] = scaled(light.color, light.intensity);
        }
        uniforms.ambient = scaled(self.ambient.color, self.ambient.intensity);
        uniforms.count = count as u32;
        uniforms
    }
}

fn scaled(color: Color, intensity: f32) -> [f32; 4] {
    [
        color.r * intensity,
        color.g * intensity,
        color.b * intensity,
        0.0,
    ]
}

/// GPU layout of [`Lighting`].
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniforms {
    /// Direction toward each light (xyz), w unused.
    pub directions: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
    /// Color × intensity of each light (rgb), a unused.
    pub radiance: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
    /// Ambient color × intensity (rgb).
    pub ambient: [f32; 4],
    pub count: u32,
    pub _padding: [u32; 3],
}

impl LightUniforms {
    fn zeroed() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}
