//! Immediate-mode 2D overlay: solid rectangles and text.
//!
//! Quads are queued during the frame in screen pixels (origin top-left) and
//! flushed by [`Draw2d::render`] into the overlay render pass. Solid quads are
//! drawn first, then text batched per font.

use crate::assets::{Assets, FontId};
use crate::gpu::GpuContext;
use crate::ui::Color;

/// Vertex for 2D overlay rendering.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex2d {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex2d {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex2d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
            // color
            wgpu::VertexAttribute {
                offset: 16,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    };
}

/// Two triangles covering `(x, y, w, h)` with uvs spanning `uv` (u0, v0, u1, v1).
fn quad(x: f32, y: f32, w: f32, h: f32, uv: [f32; 4], color: Color) -> [Vertex2d; 6] {
    let c = color.to_array();
    let [u0, v0, u1, v1] = uv;
    let v = |px: f32, py: f32, u: f32, tv: f32| Vertex2d {
        position: [px, py],
        uv: [u, tv],
        color: c,
    };
    [
        v(x, y, u0, v0),
        v(x + w, y, u1, v0),
        v(x, y + h, u0, v1),
        v(x + w, y, u1, v0),
        v(x + w, y + h, u1, v1),
        v(x, y + h, u0, v1),
    ]
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Draw2dUniforms {
    resolution: [f32; 2],
    _padding: [f32; 2],
}

const MAX_VERTICES: usize = 16384;

/// Batched overlay renderer.
pub struct Draw2d {
    colored_pipeline: wgpu::RenderPipeline,
    textured_pipeline: wgpu::RenderPipeline,

    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,

    // Indexed by FontId
    font_bind_groups: Vec<Option<wgpu::BindGroup>>,

    colored_vertices: Vec<Vertex2d>,
    text_batches: Vec<(FontId, Vec<Vertex2d>)>,
}

impl Draw2d {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Draw2d Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/draw2d.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw2d Uniforms"),
            size: std::mem::size_of::<Draw2dUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Draw2d Uniform Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw2d Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // Font atlas (group 1)
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Draw2d Texture Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let colored_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Draw2d Colored Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let textured_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Draw2d Textured Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout, &texture_bind_group_layout],
                push_constant_ranges: &[],
            });

        let pipeline = |label: &str, layout: &wgpu::PipelineLayout, fs: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs"),
                    buffers: &[Vertex2d::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(fs),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.config.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let colored_pipeline = pipeline(
            "Draw2d Colored Pipeline",
            &colored_pipeline_layout,
            "fs_colored",
        );
        let textured_pipeline = pipeline(
            "Draw2d Textured Pipeline",
            &textured_pipeline_layout,
            "fs_textured",
        );

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw2d Vertex Buffer"),
            size: (MAX_VERTICES * std::mem::size_of::<Vertex2d>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            colored_pipeline,
            textured_pipeline,
            vertex_buffer,
            uniform_buffer,
            uniform_bind_group,
            texture_bind_group_layout,
            font_bind_groups: Vec::new(),
            colored_vertices: Vec::with_capacity(256),
            text_batches: Vec::new(),
        }
    }

    /// Clear all queued quads for the new frame.
    pub fn clear(&mut self) {
        self.colored_vertices.clear();
        self.text_batches.clear();
    }

    /// Queue a solid rectangle.
    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.colored_vertices
            .extend_from_slice(&quad(x, y, w, h, [0.0; 4], color));
    }

    /// Queue a line of text with its top-left corner at `(x, y)`.
    pub fn text(&mut self, assets: &Assets, font_id: FontId, x: f32, y: f32, text: &str, color: Color) {
        let Some(font) = assets.font(font_id) else {
            return;
        };

        let batch_idx = self
            .text_batches
            .iter()
            .position(|(id, _)| *id == font_id)
            .unwrap_or_else(|| {
                self.text_batches.push((font_id, Vec::new()));
                self.text_batches.len() - 1
            });

        let mut cursor_x = x;
        let baseline_y = y + font.size();

        for ch in text.chars() {
            let Some(glyph) = font.glyph(ch) else {
                cursor_x += font.size() * 0.5;
                continue;
            };

            if glyph.width > 0 && glyph.height > 0 {
                // fontdue's ymin is the baseline-to-bottom offset
                let gx = cursor_x + glyph.offset_x;
                let gy = baseline_y - glyph.offset_y - glyph.height as f32;
                let [u, v, uw, vh] = glyph.uv;

                self.text_batches[batch_idx].1.extend_from_slice(&quad(
                    gx,
                    gy,
                    glyph.width as f32,
                    glyph.height as f32,
                    [u, v, u + uw, v + vh],
                    color,
                ));
            }

            cursor_x += glyph.advance;
        }
    }

    /// Create bind groups for fonts loaded since the last call.
    pub(crate) fn update_font_bind_groups(&mut self, gpu: &GpuContext, assets: &Assets) {
        if self.font_bind_groups.len() < assets.fonts.len() {
            self.font_bind_groups.resize_with(assets.fonts.len(), || None);
        }

        for (slot, font) in self.font_bind_groups.iter_mut().zip(&assets.fonts) {
            if slot.is_none() {
                *slot = Some(gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Font Bind Group"),
                    layout: &self.texture_bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&font.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&font.sampler),
                        },
                    ],
                }));
            }
        }
    }

    /// Upload and draw everything queued this frame.
    pub fn render(&self, gpu: &GpuContext, render_pass: &mut wgpu::RenderPass) {
        let uniforms = Draw2dUniforms {
            resolution: [gpu.width() as f32, gpu.height() as f32],
            _padding: [0.0, 0.0],
        };
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let mut budget = Budget::new(MAX_VERTICES);

        let colored = budget.take(self.colored_vertices.len());
        if colored > 0 {
            gpu.queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&self.colored_vertices[..colored]),
            );

            render_pass.set_pipeline(&self.colored_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.draw(0..colored as u32, 0..1);
        }

        for (font_id, vertices) in &self.text_batches {
            let Some(bind_group) = self.font_bind_groups.get(font_id.0).and_then(Option::as_ref)
            else {
                continue;
            };

            let offset = budget.used;
            let count = budget.take(vertices.len());
            if count == 0 {
                continue;
            }

            gpu.queue.write_buffer(
                &self.vertex_buffer,
                (offset * std::mem::size_of::<Vertex2d>()) as u64,
                bytemuck::cast_slice(&vertices[..count]),
            );

            render_pass.set_pipeline(&self.textured_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_bind_group(1, bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.draw(offset as u32..(offset + count) as u32, 0..1);
        }

        if budget.dropped > 0 {
            log::warn!("overlay vertex buffer full, dropped {} vertices", budget.dropped);
        }
    }
}

/// Space left in the shared vertex buffer. Grants whole triangles only.
struct Budget {
    capacity: usize,
    used: usize,
    dropped: usize,
}

impl Budget {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            used: 0,
            dropped: 0,
        }
    }

    fn take(&mut self, wanted: usize) -> usize {
        let free = self.capacity - self.used;
        let granted = wanted.min(free) / 3 * 3;
        self.used += granted;
        self.dropped += wanted - granted;
        granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_covers_the_rectangle() {
        let vertices = quad(10.0, 20.0, 30.0, 40.0, [0.0, 0.0, 1.0, 1.0], Color::WHITE);
        let xs: Vec<f32> = vertices.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = vertices.iter().map(|v| v.position[1]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), 10.0);
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 40.0);
        assert_eq!(ys.iter().cloned().fold(f32::MAX, f32::min), 20.0);
        assert_eq!(ys.iter().cloned().fold(f32::MIN, f32::max), 60.0);
        assert!(vertices.iter().all(|v| v.color == [1.0; 4]));
    }

    #[test]
    fn quad_uvs_follow_corners() {
        let vertices = quad(0.0, 0.0, 1.0, 1.0, [0.25, 0.5, 0.75, 1.0], Color::BLACK);
        for v in vertices {
            let expected = [
                if v.position[0] == 0.0 { 0.25 } else { 0.75 },
                if v.position[1] == 0.0 { 0.5 } else { 1.0 },
            ];
            assert_eq!(v.uv, expected);
        }
    }

    #[test]
    fn budget_grants_whole_triangles() {
        let mut budget = Budget::new(10);
        assert_eq!(budget.take(6), 6);
        assert_eq!(budget.take(6), 3);
        assert_eq!(budget.take(6), 0);
        assert_eq!(budget.used, 9);
        assert_eq!(budget.dropped, 9);
    }
}
