//! Overlay widgets: the toggle toolbar and the status line.
//!
//! Layout and hit testing are plain geometry so they can be exercised without
//! a GPU; drawing goes through [`Draw2d`].

use glam::Vec2;

use crate::assets::{Assets, FontId};
use crate::draw2d::Draw2d;
use crate::toggles::{Toggle, ViewerToggles};

/// A rectangle in screen-space pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment test: the right and bottom edges are outside.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }

    /// Shrink by `amount` on every side.
    pub fn inset(&self, amount: f32) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            (self.width - 2.0 * amount).max(0.0),
            (self.height - 2.0 * amount).max(0.0),
        )
    }
}

/// Linear RGBA color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Default scene clear color.
    pub const SCENE_BG: Color = Color::rgb(0.02, 0.02, 0.03);

    const BUTTON_ON: Color = Color::rgba(0.16, 0.45, 0.85, 0.92);
    const BUTTON_OFF: Color = Color::rgba(0.12, 0.12, 0.14, 0.85);
    const BUTTON_BORDER: Color = Color::rgba(0.45, 0.45, 0.5, 1.0);
    const BUTTON_HOVER_BORDER: Color = Color::rgba(0.9, 0.9, 0.95, 1.0);

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

impl From<[f32; 4]> for Color {
    fn from(c: [f32; 4]) -> Self {
        Color::rgba(c[0], c[1], c[2], c[3])
    }
}

/// The row of toggle buttons in the top-left corner.
#[derive(Clone, Copy, Debug)]
pub struct Toolbar {
    pub origin: Vec2,
    pub button_size: Vec2,
    pub spacing: f32,
}

impl Default for Toolbar {
    fn default() -> Self {
        Self {
            origin: Vec2::new(12.0, 12.0),
            button_size: Vec2::new(128.0, 30.0),
            spacing: 8.0,
        }
    }
}

impl Toolbar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Screen rectangle of one button.
    pub fn button_rect(&self, toggle: Toggle) -> Rect {
        let index = Toggle::ALL
            .iter()
            .position(|t| *t == toggle)
            .unwrap_or_default() as f32;
        Rect::new(
            self.origin.x + index * (self.button_size.x + self.spacing),
            self.origin.y,
            self.button_size.x,
            self.button_size.y,
        )
    }

    /// All buttons with their rectangles, in toolbar order.
    pub fn buttons(&self) -> impl Iterator<Item = (Toggle, Rect)> + '_ {
        Toggle::ALL.into_iter().map(|t| (t, self.button_rect(t)))
    }

    /// Area covered by the whole toolbar.
    pub fn bounds(&self) -> Rect {
        let count = Toggle::ALL.len() as f32;
        Rect::new(
            self.origin.x,
            self.origin.y,
            count * self.button_size.x + (count - 1.0) * self.spacing,
            self.button_size.y,
        )
    }

    /// Button under `point`, if any. Gaps between buttons hit nothing.
    pub fn hit(&self, point: Vec2) -> Option<Toggle> {
        self.buttons()
            .find(|(_, rect)| rect.contains(point))
            .map(|(t, _)| t)
    }

    /// Queue the toolbar for drawing.
    pub fn draw(
        &self,
        draw: &mut Draw2d,
        assets: &Assets,
        font: Option<FontId>,
        toggles: &ViewerToggles,
        hovered: Option<Toggle>,
    ) {
        for (toggle, rect) in self.buttons() {
            let border = if hovered == Some(toggle) {
                Color::BUTTON_HOVER_BORDER
            } else {
                Color::BUTTON_BORDER
            };
            let fill = if toggles.get(toggle) {
                Color::BUTTON_ON
            } else {
                Color::BUTTON_OFF
            };

            draw.rect(rect.x, rect.y, rect.width, rect.height, border);
            let inner = rect.inset(1.0);
            draw.rect(inner.x, inner.y, inner.width, inner.height, fill);

            if let Some(font_id) = font {
                let Some(atlas) = assets.font(font_id) else {
                    continue;
                };
                let text = toggle.label();
                let x = rect.x + (rect.width - atlas.measure(text)).max(0.0) * 0.5;
                let y = rect.y + (rect.height - atlas.line_height()).max(0.0) * 0.5;
                draw.text(assets, font_id, x, y, text, Color::WHITE);
            }
        }
    }
}

/// Draw a single line of status text in the bottom-left corner.
pub fn draw_status(
    draw: &mut Draw2d,
    assets: &Assets,
    font: Option<FontId>,
    screen_height: f32,
    text: &str,
) {
    let Some(font_id) = font else {
        return;
    };
    let Some(atlas) = assets.font(font_id) else {
        return;
    };
    let padding = 6.0;
    let height = atlas.line_height() + padding * 2.0;
    let y = screen_height - height - 12.0;
    draw.rect(
        12.0,
        y,
        atlas.measure(text) + padding * 2.0,
        height,
        Color::rgba(0.0, 0.0, 0.0, 0.55),
    );
    draw.text(assets, font_id, 12.0 + padding, y + padding, text, Color::WHITE);
}
