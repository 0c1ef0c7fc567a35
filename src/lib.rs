//! # cubeview
//!
//! A small 3D model viewer. It orbits a camera around a glTF/GLB or STL model
//! and can replace the flat background with a radial gradient chosen by which
//! side of the model the camera is looking at.
//!
//! ```no_run
//! use cubeview::ViewerConfig;
//!
//! fn main() -> Result<(), cubeview::ViewerError> {
//!     cubeview::run(
//!         ViewerConfig::new()
//!             .model("cubo/cubopv.glb")
//!             .gradient_background(true),
//!     )
//! }
//! ```
//!
//! The pieces that decide what is drawn ([`classify`], [`synthesize`],
//! [`ViewerToggles`], [`GradientBackground`], [`ViewerState`]) do not touch
//! the GPU and can be used on their own.

mod assets;
mod background;
mod camera;
mod cli;
mod config;
mod draw2d;
mod error;
mod geometry;
mod gpu;
mod gradient;
mod input;
mod lighting;
mod loader;
mod mesh;
mod mesh_pass;
mod orbit_camera;
mod orientation;
mod texture;
mod toggles;
mod ui;
mod viewer;

pub use assets::{Assets, FontAtlas, FontId};
pub use background::{BackgroundState, BackgroundUpdate, GradientBackground, SceneBackground};
pub use camera::Camera;
pub use cli::Cli;
pub use config::{DEFAULT_MODEL_PATH, ViewerConfig};
pub use draw2d::Draw2d;
pub use error::ViewerError;
pub use geometry::{
    DEFAULT_PART_COLOR, GeometryError, LoadOptions, ModelData, ModelFormat, ModelPart,
    RawGeometry, load_model, parse_glb, parse_model, parse_stl,
};
pub use gpu::GpuContext;
pub use gradient::{
    ColorPair, DEFAULT_TEXTURE_SIZE, FACE_GRADIENTS, GradientSpec, MAX_TEXTURE_SIZE, Quadrant,
    gradient_for,
    synthesize,
};
pub use input::Input;
pub use lighting::{AmbientLight, DirectionalLight, LightUniforms, Lighting};
pub use loader::{LoadEvent, ModelLoader};
pub use mesh::{Mesh, Transform, Vertex3d};
pub use mesh_pass::{DrawCall, MeshPass};
pub use orbit_camera::OrbitCamera;
pub use orientation::{Face, classify};
pub use texture::Texture;
pub use toggles::{Toggle, ToggleChange, ViewerToggles};
pub use ui::{Color, Rect, Toolbar};
pub use viewer::{FrameOutput, ModelStatus, ViewerState, run};

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
