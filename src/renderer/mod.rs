//! Immediate-mode 2D drawing
//!
//! Models draw through the `Surface` trait every frame. The browser host
//! implements it over a Canvas2D context (`CanvasSurface`); tests and the
//! native runner record into a `DrawList`.

pub mod color;
pub mod draw_list;
pub mod image;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use color::Color;
pub use draw_list::{DrawCommand, DrawList};
pub use image::Image;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

use crate::sim::{Rect, Vector2};

/// Line style for strokes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    /// Dash pattern (on, off) in pixels; `None` draws solid
    pub dash: Option<(f32, f32)>,
}

impl Stroke {
    pub const fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub const fn dashed(color: Color, width: f32, on: f32, off: f32) -> Self {
        Self {
            color,
            width,
            dash: Some((on, off)),
        }
    }
}

/// Horizontal text anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    pub size: f32,
    pub align: TextAlign,
    pub monospace: bool,
}

impl TextStyle {
    pub const fn new(color: Color, size: f32) -> Self {
        Self {
            color,
            size,
            align: TextAlign::Left,
            monospace: false,
        }
    }

    pub const fn centered(self) -> Self {
        Self {
            align: TextAlign::Center,
            ..self
        }
    }

    pub const fn mono(self) -> Self {
        Self {
            monospace: true,
            ..self
        }
    }
}

/// Soft glow (shadow blur) applied to subsequent fills and strokes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub blur: f32,
    pub color: Color,
}

/// Host drawing surface
pub trait Surface {
    /// Drawable size in pixels
    fn size(&self) -> (f32, f32);

    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke);
    fn fill_circle(&mut self, center: Vector2, radius: f32, color: Color);
    fn stroke_circle(&mut self, center: Vector2, radius: f32, stroke: Stroke);
    fn line(&mut self, from: Vector2, to: Vector2, stroke: Stroke);
    fn polyline(&mut self, points: &[Vector2], stroke: Stroke);
    fn text(&mut self, text: &str, pos: Vector2, style: TextStyle);

    /// Blit a raster image scaled into `dest`
    fn draw_image(&mut self, image: &Image, dest: Rect);

    fn set_glow(&mut self, glow: Option<Glow>);
    fn set_alpha(&mut self, alpha: f32);
}

/// Draw an arrow from `from` to `to` with a two-stroke head
pub fn arrow(surface: &mut dyn Surface, from: Vector2, to: Vector2, head: f32, stroke: Stroke) {
    surface.line(from, to, stroke);
    let angle = (to - from).angle();
    let spread = std::f32::consts::PI / 6.0;
    for side in [-spread, spread] {
        let tip = to - Vector2::from_angle(angle + side) * head;
        surface.line(to, tip, stroke);
    }
}
