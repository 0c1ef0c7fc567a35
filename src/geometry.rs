//! Model geometry: parsing, inspection and load-time transforms.
//!
//! Models are parsed into [`ModelData`], a list of [`ModelPart`]s that each
//! own CPU-side [`RawGeometry`] and a base color. Nothing here touches the GPU,
//! so parsing can run on the loader thread and be tested without a device.
//!
//! # Supported Formats
//!
//! | Format  | Extensions      | Notes |
//! |---------|-----------------|-------|
//! | glTF    | `.glb`, `.gltf` | Node transforms baked in, base color factor per primitive |
//! | STL     | `.stl`          | Binary and ASCII, no UV coordinates |
//!
//! # Example
//!
//! ```no_run
//! use cubeview::{LoadOptions, load_model};
//!
//! let model = load_model("cubo/cubopv.glb", &LoadOptions::new().centered().normalized())?;
//! println!("{} triangles", model.triangle_count());
//! # Ok::<(), cubeview::GeometryError>(())
//! ```

use std::path::Path;

use glam::{Mat3, Mat4, Quat, Vec3};
use thiserror::Error;

use crate::mesh::Vertex3d;
use crate::ui::Color;

/// Color given to parts whose format carries no material.
pub const DEFAULT_PART_COLOR: Color = Color::rgb(0.8, 0.8, 0.8);

/// Errors that can occur when loading geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("failed to read model: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown model format: '{0}'")]
    UnknownFormat(String),

    #[error("invalid glTF: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("invalid STL: {0}")]
    Stl(String),

    #[error("model contains no triangle geometry")]
    NoGeometry,
}

/// File formats the loader understands, detected from the extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelFormat {
    /// Binary glTF, a single self-contained file.
    Glb,
    /// JSON glTF, possibly with external buffers next to it.
    Gltf,
    Stl,
}

impl ModelFormat {
    pub fn from_path(path: &Path) -> Result<Self, GeometryError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "glb" => Ok(Self::Glb),
            "gltf" => Ok(Self::Gltf),
            "stl" => Ok(Self::Stl),
            _ => Err(GeometryError::UnknownFormat(ext)),
        }
    }
}

/// Raw geometry data before GPU upload.
///
/// This intermediate representation allows geometry transformations
/// (centering, scaling, etc.) before creating the final GPU mesh.
#[derive(Clone, Debug)]
pub struct RawGeometry {
    /// Vertex positions, normals, and UVs.
    pub vertices: Vec<Vertex3d>,
    /// Triangle indices.
    pub indices: Vec<u32>,
}

impl RawGeometry {
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Computes the axis-aligned bounding box as `(min, max)`.
    ///
    /// Empty geometry yields an inverted box (`+inf`, `-inf`).
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }

        (min, max)
    }

    pub fn center(&self) -> Vec3 {
        let (min, max) = self.bounds();
        (min + max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        let (min, max) = self.bounds();
        max - min
    }

    pub fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            v.position = (Vec3::from(v.position) + offset).into();
        }
    }

    /// Scales all vertices uniformly around the origin.
    pub fn scale(&mut self, factor: f32) {
        for v in &mut self.vertices {
            v.position = (Vec3::from(v.position) * factor).into();
        }
    }

    /// Rotates all vertices and normals by the given quaternion.
    pub fn rotate(&mut self, rotation: Quat) {
        for v in &mut self.vertices {
            v.position = (rotation * Vec3::from(v.position)).into();
            v.normal = (rotation * Vec3::from(v.normal)).into();
        }
    }

    /// Applies an affine transform, using the inverse transpose for normals.
    /// Mirroring transforms flip the triangle winding so front faces stay
    /// counter-clockwise.
    pub fn transform(&mut self, matrix: Mat4) {
        let normal_matrix = Mat3::from_mat4(matrix).inverse().transpose();

        for v in &mut self.vertices {
            v.position = matrix.transform_point3(Vec3::from(v.position)).into();
            v.normal = (normal_matrix * Vec3::from(v.normal))
                .normalize_or_zero()
                .into();
        }

        if matrix.determinant() < 0.0 {
            for tri in self.indices.chunks_exact_mut(3) {
                tri.swap(1, 2);
            }
        }
    }

    /// Recalculates vertex normals from face geometry.
    ///
    /// Smooth normals: area-weighted average of the face normals of every
    /// triangle sharing a vertex.
    pub fn recalculate_normals(&mut self) {
        for v in &mut self.vertices {
            v.normal = [0.0, 0.0, 0.0];
        }

        for tri in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if i0.max(i1).max(i2) >= self.vertices.len() {
                continue;
            }

            let p0 = Vec3::from(self.vertices[i0].position);
            let p1 = Vec3::from(self.vertices[i1].position);
            let p2 = Vec3::from(self.vertices[i2].position);
            let face_normal = (p1 - p0).cross(p2 - p0);

            for i in [i0, i1, i2] {
                let n = Vec3::from(self.vertices[i].normal) + face_normal;
                self.vertices[i].normal = n.into();
            }
        }

        for v in &mut self.vertices {
            v.normal = Vec3::from(v.normal).normalize_or_zero().into();
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// One drawable piece of a model.
#[derive(Clone, Debug)]
pub struct ModelPart {
    pub geometry: RawGeometry,
    pub color: Color,
}

/// A parsed model: every mesh primitive found in the file.
#[derive(Clone, Debug, Default)]
pub struct ModelData {
    pub parts: Vec<ModelPart>,
}

impl ModelData {
    /// Bounding box over all parts.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.parts.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), part| {
                let (pmin, pmax) = part.geometry.bounds();
                (min.min(pmin), max.max(pmax))
            },
        )
    }

    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(|p| p.geometry.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(|p| p.geometry.triangle_count()).sum()
    }

    /// Applies the requested transformations to the model as a whole, in order:
    /// center, upright, normalize, scale.
    pub fn apply(&mut self, options: &LoadOptions) {
        if self.parts.is_empty() {
            return;
        }

        if options.center {
            let (min, max) = self.bounds();
            let offset = -(min + max) * 0.5;
            self.for_each(|g| g.translate(offset));
        }

        if options.upright {
            // -90 degrees around X converts Z-up to Y-up
            let rotation = Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);
            self.for_each(|g| g.rotate(rotation));
        }

        if options.normalize {
            let (min, max) = self.bounds();
            let size = max - min;
            let max_dim = size.max_element();
            if max_dim > 0.0 {
                self.for_each(|g| g.scale(1.0 / max_dim));
            }
        }

        if let Some(factor) = options.scale {
            self.for_each(|g| g.scale(factor));
        }
    }

    fn for_each(&mut self, mut f: impl FnMut(&mut RawGeometry)) {
        for part in &mut self.parts {
            f(&mut part.geometry);
        }
    }
}

/// Load-time transformations, applied after parsing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LoadOptions {
    pub center: bool,
    pub normalize: bool,
    pub upright: bool,
    pub scale: Option<f32>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the model so its bounding box center is at the origin.
    pub fn centered(mut self) -> Self {
        self.center = true;
        self
    }

    /// Scales the model to fit within a unit cube, preserving aspect ratio.
    pub fn normalized(mut self) -> Self {
        self.normalize = true;
        self
    }

    /// Reorients the model from Z-up to Y-up.
    pub fn upright(mut self) -> Self {
        self.upright = true;
        self
    }

    pub fn scaled(mut self, factor: f32) -> Self {
        self.scale = Some(factor);
        self
    }
}

/// Read and parse a model file, then apply `options`.
pub fn load_model(path: impl AsRef<Path>, options: &LoadOptions) -> Result<ModelData, GeometryError> {
    let path = path.as_ref();
    let format = ModelFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    let mut model = parse_model(format, path, &bytes)?;
    model.apply(options);
    Ok(model)
}

/// Parse already-read file contents. `path` is only consulted for `.gltf`
/// files, whose buffers may live next to them on disk.
pub fn parse_model(format: ModelFormat, path: &Path, bytes: &[u8]) -> Result<ModelData, GeometryError> {
    let model = match format {
        ModelFormat::Glb => {
            let (document, buffers, _) = gltf::import_slice(bytes)?;
            model_from_gltf(&document, &buffers)
        }
        ModelFormat::Gltf => {
            let (document, buffers, _) = gltf::import(path)?;
            model_from_gltf(&document, &buffers)
        }
        ModelFormat::Stl => parse_stl(bytes)?,
    };

    if model.triangle_count() == 0 {
        return Err(GeometryError::NoGeometry);
    }
    Ok(model)
}

/// Parse binary glTF from memory.
pub fn parse_glb(bytes: &[u8]) -> Result<ModelData, GeometryError> {
    parse_model(ModelFormat::Glb, Path::new(""), bytes)
}

fn model_from_gltf(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> ModelData {
    let mut model = ModelData::default();

    let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
        log::warn!("glTF file has no scenes");
        return model;
    };

    for node in scene.nodes() {
        collect_node(&node, buffers, Mat4::IDENTITY, &mut model.parts);
    }

    model
}

fn collect_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent: Mat4,
    parts: &mut Vec<ModelPart>,
) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "skipping {:?} primitive in mesh {:?}",
                    primitive.mode(),
                    mesh.name()
                );
                continue;
            }
            if let Some(mut geometry) = read_primitive(&primitive, buffers) {
                geometry.transform(world);
                let color = Color::from(primitive.material().pbr_metallic_roughness().base_color_factor());
                parts.push(ModelPart { geometry, color });
            }
        }
    }

    for child in node.children() {
        collect_node(&child, buffers, world, parts);
    }
}

fn read_primitive(primitive: &gltf::Primitive, buffers: &[gltf::buffer::Data]) -> Option<RawGeometry> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let normals: Option<Vec<[f32; 3]>> = reader
        .read_normals()
        .map(|n| n.collect::<Vec<_>>())
        .filter(|n| n.len() == positions.len());
    let uvs: Option<Vec<[f32; 2]>> = reader
        .read_tex_coords(0)
        .map(|t| t.into_f32().collect::<Vec<_>>())
        .filter(|t| t.len() == positions.len());

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            Vertex3d::new(
                position,
                normals.as_ref().map_or([0.0; 3], |n| n[i]),
                uvs.as_ref().map_or([0.0; 2], |t| t[i]),
            )
        })
        .collect::<Vec<_>>();

    let mut indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };
    indices.truncate(indices.len() - indices.len() % 3);

    let mut geometry = RawGeometry::new(vertices, indices);
    if normals.is_none() {
        geometry.recalculate_normals();
    }
    Some(geometry)
}

/// Parse binary or ASCII STL into a single grey part with flat face normals.
pub fn parse_stl(bytes: &[u8]) -> Result<ModelData, GeometryError> {
    let mut cursor = std::io::Cursor::new(bytes);
    let stl = stl_io::read_stl(&mut cursor).map_err(|e| GeometryError::Stl(e.to_string()))?;

    let mut vertices = Vec::with_capacity(stl.faces.len() * 3);
    let mut indices = Vec::with_capacity(stl.faces.len() * 3);

    for face in &stl.faces {
        let normal: [f32; 3] = face.normal.into();

        let base = vertices.len() as u32;
        for &vertex_idx in &face.vertices {
            let position = stl
                .vertices
                .get(vertex_idx)
                .ok_or_else(|| GeometryError::Stl(format!("vertex index {vertex_idx} out of range")))?;
            vertices.push(Vertex3d::new((*position).into(), normal, [0.0, 0.0]));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    let mut geometry = RawGeometry::new(vertices, indices);
    // Some exporters write zero normals
    if geometry.vertices.iter().any(|v| v.normal == [0.0; 3]) {
        geometry.recalculate_normals();
    }

    Ok(ModelData {
        parts: vec![ModelPart {
            geometry,
            color: DEFAULT_PART_COLOR,
        }],
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const TRIANGLE_STL: &str = "solid tri
facet normal 0 0 1
  outer loop
    vertex 0 0 0
    vertex 2 0 0
    vertex 0 4 0
  endloop
endfacet
endsolid tri
";

    /// A single red triangle in a node translated by +1 on X, no normals.
    fn triangle_glb() -> Vec<u8> {
        let json = r#"{"asset":{"version":"2.0"},"scene":0,"scenes":[{"nodes":[0]}],"nodes":[{"mesh":0,"translation":[1,0,0]}],"meshes":[{"primitives":[{"attributes":{"POSITION":0},"material":0}]}],"materials":[{"pbrMetallicRoughness":{"baseColorFactor":[1,0,0,1]}}],"buffers":[{"byteLength":36}],"bufferViews":[{"buffer":0,"byteLength":36}],"accessors":[{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0,0,0],"max":[1,1,0]}]}"#;
        let mut json = json.as_bytes().to_vec();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }

        let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let bin: Vec<u8> = positions.iter().flat_map(|f| f.to_le_bytes()).collect();

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut glb = Vec::with_capacity(total);
        glb.extend_from_slice(b"glTF");
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&(total as u32).to_le_bytes());
        glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"JSON");
        glb.extend_from_slice(&json);
        glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"BIN\0");
        glb.extend_from_slice(&bin);
        glb
    }

    fn vertex(position: [f32; 3]) -> Vertex3d {
        Vertex3d::new(position, [0.0, 1.0, 0.0], [0.0, 0.0])
    }

    #[test]
    fn raw_geometry_bounds() {
        let geom = RawGeometry::new(
            vec![
                vertex([0.0, 0.0, 0.0]),
                vertex([1.0, 2.0, 3.0]),
                vertex([-1.0, -1.0, -1.0]),
            ],
            vec![0, 1, 2],
        );

        let (min, max) = geom.bounds();
        assert_eq!(min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn raw_geometry_center() {
        let geom = RawGeometry::new(vec![vertex([0.0, 0.0, 0.0]), vertex([2.0, 4.0, 6.0])], vec![0, 1, 0]);
        assert_eq!(geom.center(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn recalculated_normals_follow_winding() {
        let mut geom = RawGeometry::new(
            vec![
                vertex([0.0, 0.0, 0.0]),
                vertex([1.0, 0.0, 0.0]),
                vertex([0.0, 1.0, 0.0]),
            ],
            vec![0, 1, 2],
        );
        geom.recalculate_normals();
        for v in &geom.vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn mirroring_transform_keeps_front_faces() {
        let mut geom = RawGeometry::new(
            vec![
                Vertex3d::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
                Vertex3d::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
                Vertex3d::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
            ],
            vec![0, 1, 2],
        );
        geom.transform(Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0)));
        assert_eq!(geom.indices, vec![0, 2, 1]);

        let before = geom.vertices.clone();
        geom.recalculate_normals();
        for (a, b) in before.iter().zip(&geom.vertices) {
            assert!((Vec3::from(a.normal) - Vec3::from(b.normal)).length() < 1e-6);
        }
    }

    #[test]
    fn format_detection_is_case_insensitive() {
        assert_eq!(ModelFormat::from_path(Path::new("a/b.GLB")).ok(), Some(ModelFormat::Glb));
        assert_eq!(ModelFormat::from_path(Path::new("scene.gltf")).ok(), Some(ModelFormat::Gltf));
        assert_eq!(ModelFormat::from_path(Path::new("part.Stl")).ok(), Some(ModelFormat::Stl));
        assert!(matches!(
            ModelFormat::from_path(Path::new("mesh.obj")),
            Err(GeometryError::UnknownFormat(ext)) if ext == "obj"
        ));
        assert!(matches!(
            ModelFormat::from_path(Path::new("noext")),
            Err(GeometryError::UnknownFormat(_))
        ));
    }

    #[test]
    fn parses_ascii_stl() {
        let model = parse_stl(TRIANGLE_STL.as_bytes()).unwrap();
        assert_eq!(model.parts.len(), 1);
        assert_eq!(model.triangle_count(), 1);
        assert_eq!(model.vertex_count(), 3);
        assert_eq!(model.parts[0].color, DEFAULT_PART_COLOR);
        assert_eq!(model.bounds(), (Vec3::ZERO, Vec3::new(2.0, 4.0, 0.0)));
    }

    #[test]
    fn garbage_stl_is_an_error() {
        assert!(matches!(parse_stl(b"not an stl"), Err(GeometryError::Stl(_))));
    }

    #[test]
    fn parses_glb_with_node_transform_and_color() {
        let model = parse_glb(&triangle_glb()).unwrap();
        assert_eq!(model.parts.len(), 1);

        let part = &model.parts[0];
        assert_eq!(part.color, Color::rgba(1.0, 0.0, 0.0, 1.0));
        assert_eq!(part.geometry.indices, vec![0, 1, 2]);
        assert_eq!(part.geometry.vertices[0].position, [1.0, 0.0, 0.0]);
        assert_eq!(part.geometry.vertices[1].position, [2.0, 0.0, 0.0]);
        for v in &part.geometry.vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn invalid_glb_is_an_error() {
        assert!(matches!(parse_glb(b"glTF garbage"), Err(GeometryError::Gltf(_))));
    }

    #[test]
    fn options_apply_to_the_whole_model() {
        let part = |offset: f32| ModelPart {
            geometry: RawGeometry::new(
                vec![vertex([offset, 0.0, 0.0]), vertex([offset + 1.0, 2.0, 0.0])],
                vec![0, 1, 0],
            ),
            color: DEFAULT_PART_COLOR,
        };
        let mut model = ModelData {
            parts: vec![part(0.0), part(3.0)],
        };

        model.apply(&LoadOptions::new().centered().normalized());

        let (min, max) = model.bounds();
        assert!((min - Vec3::new(-0.5, -0.25, 0.0)).length() < 1e-6);
        assert!((max - Vec3::new(0.5, 0.25, 0.0)).length() < 1e-6);
    }

    #[test]
    fn upright_turns_z_up_into_y_up() {
        let mut model = ModelData {
            parts: vec![ModelPart {
                geometry: RawGeometry::new(vec![vertex([0.0, 0.0, 1.0])], vec![]),
                color: DEFAULT_PART_COLOR,
            }],
        };
        model.apply(&LoadOptions::new().upright().scaled(2.0));
        let p = Vec3::from(model.parts[0].geometry.vertices[0].position);
        assert!((p - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn missing_file_is_io_error() {
        let missing = std::env::temp_dir().join("cubeview-definitely-missing.stl");
        assert!(matches!(
            load_model(&missing, &LoadOptions::new()),
            Err(GeometryError::Io(_))
        ));
    }
}
