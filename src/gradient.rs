//! Four-corner radial gradient textures.
//!
//! A [`GradientSpec`] holds one color pair per screen quadrant. [`synthesize`]
//! paints each quadrant with a radial gradient centered on its outer corner and
//! returns the result as an [`RgbaImage`] ready to upload with
//! [`Texture::from_image`](crate::Texture::from_image).
//!
//! The ramp follows canvas radial-gradient rules for concentric circles: the
//! start color fills everything inside the inner radius, the end color fills
//! everything past the outer radius, and the quadrant rectangle is filled
//! completely (no circular clip).
//!
//! ```
//! use cubeview::{Face, gradient_for, synthesize};
//!
//! let image = synthesize(gradient_for(Face::Top), 64);
//! assert_eq!(image.dimensions(), (64, 64));
//! ```

use image::{Rgba, RgbaImage};

use crate::orientation::Face;

/// Edge length of background textures, in pixels.
pub const DEFAULT_TEXTURE_SIZE: u32 = 512;

/// Largest background texture edge the viewer will synthesize.
pub const MAX_TEXTURE_SIZE: u32 = 4096;

/// Inner radius of each quadrant gradient as a fraction of the texture size.
pub const INNER_RADIUS: f32 = 0.2;

/// Outer radius of each quadrant gradient as a fraction of the texture size.
pub const OUTER_RADIUS: f32 = 0.6;

/// One quarter of the texture, named by the corner it touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    /// Quadrants in [`GradientSpec`] order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// Gradient center: the texture corner this quadrant touches.
    pub fn center(self, size: u32) -> (f32, f32) {
        let s = size as f32;
        match self {
            Quadrant::TopLeft => (0.0, 0.0),
            Quadrant::TopRight => (s, 0.0),
            Quadrant::BottomLeft => (0.0, s),
            Quadrant::BottomRight => (s, s),
        }
    }

    /// Pixel range covered by this quadrant as `(x_range, y_range)`.
    ///
    /// With an odd size the right and bottom quadrants take the extra column/row.
    pub fn bounds(self, size: u32) -> (std::ops::Range<u32>, std::ops::Range<u32>) {
        let half = size / 2;
        match self {
            Quadrant::TopLeft => (0..half, 0..half),
            Quadrant::TopRight => (half..size, 0..half),
            Quadrant::BottomLeft => (0..half, half..size),
            Quadrant::BottomRight => (half..size, half..size),
        }
    }
}

/// Start (inner) and end (outer) color of one quadrant gradient.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorPair {
    pub start: Rgba<u8>,
    pub end: Rgba<u8>,
}

impl ColorPair {
    pub const fn new(start: Rgba<u8>, end: Rgba<u8>) -> Self {
        Self { start, end }
    }

    /// Color at ramp position `t` (clamped to [0, 1]).
    pub fn at(&self, t: f32) -> Rgba<u8> {
        let t = t.clamp(0.0, 1.0);
        let mut out = [0u8; 4];
        for (i, channel) in out.iter_mut().enumerate() {
            let a = self.start.0[i] as f32;
            let b = self.end.0[i] as f32;
            *channel = (a + (b - a) * t).round() as u8;
        }
        Rgba(out)
    }
}

/// Four color pairs, ordered top-left, top-right, bottom-left, bottom-right.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GradientSpec {
    pub pairs: [ColorPair; 4],
}

impl GradientSpec {
    pub const fn new(pairs: [ColorPair; 4]) -> Self {
        Self { pairs }
    }

    /// Color pair for a quadrant.
    pub fn pair(&self, quadrant: Quadrant) -> ColorPair {
        match quadrant {
            Quadrant::TopLeft => self.pairs[0],
            Quadrant::TopRight => self.pairs[1],
            Quadrant::BottomLeft => self.pairs[2],
            Quadrant::BottomRight => self.pairs[3],
        }
    }
}

const fn rgb(hex: u32) -> Rgba<u8> {
    Rgba([(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 0xff])
}

const fn pair(start: u32, end: u32) -> ColorPair {
    ColorPair::new(rgb(start), rgb(end))
}

/// Background gradients indexed by [`Face::index`].
pub static FACE_GRADIENTS: [GradientSpec; 6] = [
    // front
    GradientSpec::new([
        pair(0x8ec5fc, 0x1e3c72),
        pair(0xa1c4fd, 0x2a5298),
        pair(0xc2e9fb, 0x203a43),
        pair(0x89f7fe, 0x0f2027),
    ]),
    // back
    GradientSpec::new([
        pair(0xffecd2, 0xfc4a1a),
        pair(0xfcb69f, 0xc0392b),
        pair(0xffd194, 0xd1913c),
        pair(0xf6d365, 0xb24592),
    ]),
    // left
    GradientSpec::new([
        pair(0xd4fc79, 0x134e5e),
        pair(0x96e6a1, 0x11998e),
        pair(0xc1dfc4, 0x0b486b),
        pair(0xa8e063, 0x56ab2f),
    ]),
    // right
    GradientSpec::new([
        pair(0xe0c3fc, 0x5b247a),
        pair(0xfbc2eb, 0x6a3093),
        pair(0xd9afd9, 0x3a1c71),
        pair(0xf3e7e9, 0x8e44ad),
    ]),
    // top
    GradientSpec::new([
        pair(0xe0f7fa, 0x2193b0),
        pair(0xfdfbfb, 0x6dd5ed),
        pair(0xcfd9df, 0x4b79a1),
        pair(0xebf4f5, 0x283e51),
    ]),
    // bottom
    GradientSpec::new([
        pair(0xf5deb3, 0x5d4037),
        pair(0xe6b980, 0x3e2723),
        pair(0xd7ccc8, 0x4e342e),
        pair(0xffe0b2, 0x6d4c41),
    ]),
];

/// Gradient used when the camera faces `face`.
pub fn gradient_for(face: Face) -> &'static GradientSpec {
    &FACE_GRADIENTS[face.index()]
}

/// Paint a `size × size` texture with one radial gradient per quadrant.
pub fn synthesize(spec: &GradientSpec, size: u32) -> RgbaImage {
    let mut image = RgbaImage::new(size, size);
    let inner = INNER_RADIUS * size as f32;
    let outer = OUTER_RADIUS * size as f32;
    let span = outer - inner;

    for quadrant in Quadrant::ALL {
        let pair = spec.pair(quadrant);
        let (cx, cy) = quadrant.center(size);
        let (xs, ys) = quadrant.bounds(size);

        for y in ys {
            let dy = y as f32 + 0.5 - cy;
            for x in xs.clone() {
                let dx = x as f32 + 0.5 - cx;
                let distance = (dx * dx + dy * dy).sqrt();
                let t = if span > 0.0 {
                    (distance - inner) / span
                } else {
                    0.0
                };
                image.put_pixel(x, y, pair.at(t));
            }
        }
    }

    image
}
