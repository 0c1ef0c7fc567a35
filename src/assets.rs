use fontdue::{Font, FontSettings};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ViewerError;
use crate::gpu::GpuContext;

/// Fonts tried, in order, when no font path is configured.
pub const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Opaque identifier for a loaded font.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FontId(pub(crate) usize);

/// Information about a single glyph in the font atlas.
#[derive(Clone, Copy, Debug)]
pub struct GlyphInfo {
    /// UV coordinates in the atlas (x, y, width, height) normalized to [0, 1].
    pub uv: [f32; 4],
    /// Size of the glyph in pixels.
    pub width: u32,
    pub height: u32,
    /// Offset from the cursor position to where the glyph should be drawn.
    pub offset_x: f32,
    pub offset_y: f32,
    /// How far to advance the cursor after this glyph.
    pub advance: f32,
}

/// Result of packing glyph rectangles into rows.
#[derive(Debug, PartialEq)]
pub(crate) struct AtlasLayout {
    pub width: u32,
    pub height: u32,
    /// Top-left corner of each input rectangle, in input order.
    pub positions: Vec<(u32, u32)>,
}

/// Row-pack `sizes` into the smallest power-of-two atlas (starting at 512×512)
/// that fits, doubling the smaller side until everything fits.
pub(crate) fn pack_rows(sizes: &[(u32, u32)], padding: u32) -> AtlasLayout {
    let mut width = 512u32;
    let mut height = 512u32;

    loop {
        if let Some(positions) = try_pack(sizes, padding, width, height) {
            return AtlasLayout {
                width,
                height,
                positions,
            };
        }
        if width <= height {
            width *= 2;
        } else {
            height *= 2;
        }
    }
}

fn try_pack(sizes: &[(u32, u32)], padding: u32, width: u32, height: u32) -> Option<Vec<(u32, u32)>> {
    let mut positions = Vec::with_capacity(sizes.len());
    let mut x = padding;
    let mut y = padding;
    let mut row_height = 0u32;

    for &(w, h) in sizes {
        if w + 2 * padding > width {
            return None;
        }
        if x + w + padding > width {
            x = padding;
            y += row_height + padding;
            row_height = 0;
        }
        if y + h + padding > height {
            return None;
        }
        positions.push((x, y));
        x += w + padding;
        row_height = row_height.max(h);
    }

    Some(positions)
}

/// A font atlas containing pre-rasterized printable ASCII glyphs.
pub struct FontAtlas {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    glyphs: HashMap<char, GlyphInfo>,
    size: f32,
    line_height: f32,
}

impl FontAtlas {
    /// Create a new font atlas from TTF/OTF data.
    pub fn new(gpu: &GpuContext, font_data: &[u8], size: f32) -> Result<Self, &'static str> {
        let font = Font::from_bytes(font_data, FontSettings::default())?;

        let rasterized: Vec<(char, fontdue::Metrics, Vec<u8>)> = (32u8..=126u8)
            .map(|c| {
                let c = c as char;
                let (metrics, bitmap) = font.rasterize(c, size);
                (c, metrics, bitmap)
            })
            .collect();

        let sizes: Vec<(u32, u32)> = rasterized
            .iter()
            .map(|(_, m, _)| (m.width as u32, m.height as u32))
            .collect();
        let layout = pack_rows(&sizes, 1);
        let (atlas_width, atlas_height) = (layout.width, layout.height);

        let mut atlas_data = vec![0u8; (atlas_width * atlas_height) as usize];
        let mut glyphs = HashMap::new();

        for ((c, metrics, bitmap), &(x, y)) in rasterized.iter().zip(&layout.positions) {
            let glyph_w = metrics.width as u32;
            let glyph_h = metrics.height as u32;

            for gy in 0..glyph_h {
                let src = (gy * glyph_w) as usize;
                let dst = ((y + gy) * atlas_width + x) as usize;
                atlas_data[dst..dst + glyph_w as usize]
                    .copy_from_slice(&bitmap[src..src + glyph_w as usize]);
            }

            glyphs.insert(
                *c,
                GlyphInfo {
                    uv: [
                        x as f32 / atlas_width as f32,
                        y as f32 / atlas_height as f32,
                        glyph_w as f32 / atlas_width as f32,
                        glyph_h as f32 / atlas_height as f32,
                    ],
                    width: glyph_w,
                    height: glyph_h,
                    offset_x: metrics.xmin as f32,
                    offset_y: metrics.ymin as f32,
                    advance: metrics.advance_width,
                },
            );
        }

        let extent = wgpu::Extent3d {
            width: atlas_width,
            height: atlas_height,
            depth_or_array_layers: 1,
        };
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Font Atlas"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &atlas_data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(atlas_width),
                rows_per_image: Some(atlas_height),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Font Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let line_height = font
            .horizontal_line_metrics(size)
            .map(|m| m.new_line_size)
            .unwrap_or(size * 1.2);

        Ok(Self {
            texture,
            view,
            sampler,
            glyphs,
            size,
            line_height,
        })
    }

    /// Get glyph info for a character.
    pub fn glyph(&self, c: char) -> Option<&GlyphInfo> {
        self.glyphs.get(&c)
    }

    /// Get the font size this atlas was created with.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Get the line height for this font.
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Measure the width of a string.
    pub fn measure(&self, text: &str) -> f32 {
        text.chars()
            .map(|c| self.glyphs.get(&c).map_or(self.size * 0.5, |g| g.advance))
            .sum()
    }
}

/// Loaded overlay fonts.
#[derive(Default)]
pub struct Assets {
    pub(crate) fonts: Vec<Arc<FontAtlas>>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a font from a file path.
    pub fn load_font(
        &mut self,
        gpu: &GpuContext,
        path: impl AsRef<Path>,
        size: f32,
    ) -> Result<FontId, ViewerError> {
        let path = path.as_ref();
        let font_error = |reason: String| ViewerError::Font {
            path: path.to_path_buf(),
            reason,
        };

        let data = std::fs::read(path).map_err(|e| font_error(e.to_string()))?;
        let atlas = FontAtlas::new(gpu, &data, size).map_err(|e| font_error(e.to_string()))?;

        let id = FontId(self.fonts.len());
        self.fonts.push(Arc::new(atlas));
        Ok(id)
    }

    /// Load the configured font, or the first usable one from
    /// [`SYSTEM_FONT_PATHS`]. Returns `None` when nothing could be loaded.
    pub fn load_overlay_font(
        &mut self,
        gpu: &GpuContext,
        configured: Option<&Path>,
        size: f32,
    ) -> Option<FontId> {
        if let Some(path) = configured {
            match self.load_font(gpu, path, size) {
                Ok(id) => return Some(id),
                Err(e) => log::warn!("{e}"),
            }
        }

        for candidate in SYSTEM_FONT_PATHS.iter().map(PathBuf::from) {
            if !candidate.is_file() {
                continue;
            }
            match self.load_font(gpu, &candidate, size) {
                Ok(id) => {
                    log::debug!("using overlay font {}", candidate.display());
                    return Some(id);
                }
                Err(e) => log::debug!("{e}"),
            }
        }

        log::warn!("no usable font found; toolbar labels are hidden (pass --font to set one)");
        None
    }

    /// Get a font atlas by ID.
    pub fn font(&self, id: FontId) -> Option<Arc<FontAtlas>> {
        self.fonts.get(id.0).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_respects_padding_and_rows() {
        let layout = pack_rows(&[(300, 10), (300, 20), (10, 10)], 1);
        assert_eq!((layout.width, layout.height), (512, 512));
        assert_eq!(layout.positions[0], (1, 1));
        // second glyph does not fit on the first row
        assert_eq!(layout.positions[1], (1, 12));
        assert_eq!(layout.positions[2], (302, 12));
    }

    #[test]
    fn packing_grows_the_atlas() {
        let sizes = vec![(100, 100); 40];
        let layout = pack_rows(&sizes, 1);
        assert!(layout.width * layout.height > 512 * 512);
        for (&(x, y), &(w, h)) in layout.positions.iter().zip(&sizes) {
            assert!(x + w <= layout.width);
            assert!(y + h <= layout.height);
        }
    }

    #[test]
    fn packing_handles_empty_glyphs() {
        let layout = pack_rows(&[(0, 0), (5, 5)], 1);
        assert_eq!(layout.positions, vec![(1, 1), (2, 1)]);
    }
}
